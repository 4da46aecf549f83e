//! rb command - Remove bucket
//!
//! Removes a bucket. With `--force` every object, object version and delete
//! marker is removed first.

use clap::Args;
use s3ops_core::BucketManager;
use serde::Serialize;

use super::Context;
use crate::exit_code::ExitCode;

/// Remove a bucket
#[derive(Args, Debug)]
pub struct RbArgs {
    /// Bucket name
    pub bucket: String,

    /// Empty the bucket (all objects and versions) before removing it
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct RbOutput {
    status: &'static str,
    bucket: String,
    deleted: bool,
}

/// Execute the rb command
pub async fn execute(args: RbArgs, ctx: &Context) -> ExitCode {
    let resource = match ctx.resource().await {
        Ok(r) => r,
        Err(e) => return ctx.fail("Failed to create S3 client", &e),
    };

    let deleted = match BucketManager::new(resource)
        .delete_bucket(&args.bucket, args.force)
        .await
    {
        Ok(deleted) => deleted,
        Err(e) => return ctx.fail(&format!("Failed to remove bucket '{}'", args.bucket), &e),
    };

    let bucket = args.bucket;
    if ctx.formatter.is_json() {
        ctx.formatter.json(&RbOutput {
            status: if deleted { "success" } else { "not_found" },
            bucket,
            deleted,
        });
    } else if deleted {
        ctx.formatter
            .success(&format!("Bucket '{bucket}' removed successfully."));
    } else {
        ctx.formatter
            .warning(&format!("Bucket '{bucket}' does not exist, nothing removed."));
    }

    if deleted {
        ExitCode::Success
    } else {
        ExitCode::NotFound
    }
}
