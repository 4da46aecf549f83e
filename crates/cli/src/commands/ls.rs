//! ls command - List buckets
//!
//! Lists bucket names in the order the service returns them.

use clap::Args;
use s3ops_core::BucketManager;
use serde::Serialize;

use super::Context;
use crate::exit_code::ExitCode;

/// List buckets
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Maximum number of buckets to return
    #[arg(long, value_parser = clap::value_parser!(i32).range(1..=10000))]
    pub max_buckets: Option<i32>,

    /// Only list buckets whose name starts with this prefix
    #[arg(long)]
    pub prefix: Option<String>,
}

/// Output structure for ls command (JSON format)
#[derive(Debug, Serialize)]
struct LsOutput {
    buckets: Vec<String>,
    count: usize,
}

/// Execute the ls command
pub async fn execute(args: LsArgs, ctx: &Context) -> ExitCode {
    let resource = match ctx.resource().await {
        Ok(r) => r,
        Err(e) => return ctx.fail("Failed to create S3 client", &e),
    };

    let buckets = match BucketManager::new(resource)
        .list_buckets(args.max_buckets, args.prefix.as_deref())
        .await
    {
        Ok(buckets) => buckets,
        Err(e) => return ctx.fail("Failed to list buckets", &e),
    };

    if ctx.formatter.is_json() {
        ctx.formatter.json(&LsOutput {
            count: buckets.len(),
            buckets,
        });
    } else if buckets.is_empty() {
        ctx.formatter.println("No buckets found.");
    } else {
        for bucket in &buckets {
            ctx.formatter.println(bucket);
        }
    }

    ExitCode::Success
}
