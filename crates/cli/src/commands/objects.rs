//! objects command - List objects in a bucket

use clap::Args;
use s3ops_core::{ObjectInfo, ObjectManager};
use serde::Serialize;

use super::Context;
use crate::exit_code::ExitCode;

/// List objects
#[derive(Args, Debug)]
pub struct ObjectsArgs {
    /// Bucket name
    pub bucket: String,

    /// Only list keys starting with this prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Stop after this many objects
    #[arg(long)]
    pub max_keys: Option<usize>,

    /// Print totals after the listing
    #[arg(long)]
    pub summarize: bool,
}

/// Output structure for objects command (JSON format)
#[derive(Debug, Serialize)]
struct ObjectsOutput {
    bucket: String,
    items: Vec<ObjectInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Summary>,
}

#[derive(Debug, Serialize)]
struct Summary {
    total_objects: usize,
    total_size_bytes: i64,
    total_size_human: String,
}

impl Summary {
    fn of(items: &[ObjectInfo]) -> Self {
        let total_size_bytes: i64 = items.iter().filter_map(|i| i.size_bytes).sum();
        Self {
            total_objects: items.len(),
            total_size_bytes,
            total_size_human: humansize::format_size(
                total_size_bytes.max(0) as u64,
                humansize::BINARY,
            ),
        }
    }
}

fn format_line(item: &ObjectInfo) -> String {
    let date = item
        .last_modified
        .map(|d| d.strftime("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| " ".repeat(19));
    let size = item.size_human.as_deref().unwrap_or("0 B");
    format!("[{date}] {size:>10} {}", item.key)
}

/// Execute the objects command
pub async fn execute(args: ObjectsArgs, ctx: &Context) -> ExitCode {
    let resource = match ctx.resource().await {
        Ok(r) => r,
        Err(e) => return ctx.fail("Failed to create S3 client", &e),
    };

    let manager = match ObjectManager::open(resource, &args.bucket).await {
        Ok(m) => m,
        Err(e) => return ctx.fail(&format!("Cannot use bucket '{}'", args.bucket), &e),
    };

    let items = match manager
        .list_objects(args.prefix.as_deref(), args.max_keys)
        .await
    {
        Ok(items) => items,
        Err(e) => return ctx.fail(&format!("Failed to list objects in '{}'", args.bucket), &e),
    };

    let summary = args.summarize.then(|| Summary::of(&items));

    if ctx.formatter.is_json() {
        ctx.formatter.json(&ObjectsOutput {
            bucket: args.bucket,
            items,
            summary,
        });
        return ExitCode::Success;
    }

    for item in &items {
        ctx.formatter.println(&format_line(item));
    }
    if let Some(summary) = summary {
        ctx.formatter.println(&format!(
            "\nTotal: {} objects, {}",
            summary.total_objects, summary.total_size_human
        ));
    }
    ExitCode::Success
}
