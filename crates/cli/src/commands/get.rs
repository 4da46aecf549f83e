//! get command - Download an object
//!
//! When the destination is an existing directory the file is written inside
//! it under the key's last path segment.

use std::path::{Path, PathBuf};

use clap::Args;
use s3ops_core::{DownloadOptions, ObjectInfo, ObjectManager};
use serde::Serialize;

use super::Context;
use crate::exit_code::ExitCode;

/// Download an object
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Source bucket
    pub bucket: String,

    /// Object key
    pub key: String,

    /// Local destination file or directory
    pub dest: PathBuf,

    /// Download this version instead of the latest
    #[arg(long)]
    pub version_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct GetOutput {
    status: &'static str,
    uri: String,
    path: String,
    object: ObjectInfo,
}

fn resolve_destination(dest: &Path, key: &str) -> PathBuf {
    if dest.is_dir() {
        let name = key.rsplit('/').find(|s| !s.is_empty()).unwrap_or(key);
        dest.join(name)
    } else {
        dest.to_path_buf()
    }
}

/// Execute the get command
pub async fn execute(args: GetArgs, ctx: &Context) -> ExitCode {
    let resource = match ctx.resource().await {
        Ok(r) => r,
        Err(e) => return ctx.fail("Failed to create S3 client", &e),
    };

    let manager = match ObjectManager::open(resource, &args.bucket).await {
        Ok(m) => m,
        Err(e) => return ctx.fail(&format!("Cannot use bucket '{}'", args.bucket), &e),
    };

    let path = resolve_destination(&args.dest, &args.key);
    let options = DownloadOptions {
        version_id: args.version_id,
    };

    let uri = manager.uri(Some(&args.key));
    let object = match manager.download_file(&args.key, &path, options).await {
        Ok(info) => info,
        Err(e) => return ctx.fail(&format!("Failed to download {uri}"), &e),
    };

    if ctx.formatter.is_json() {
        ctx.formatter.json(&GetOutput {
            status: "success",
            uri,
            path: path.display().to_string(),
            object,
        });
    } else {
        ctx.formatter
            .success(&format!("{uri} -> '{}'", path.display()));
    }
    ExitCode::Success
}
