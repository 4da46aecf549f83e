//! mb command - Make bucket
//!
//! Creates a bucket named `{base}-{uuid}-{timestamp}`, or exactly `base`
//! with `--exact`.

use clap::Args;
use s3ops_core::{BucketManager, CannedAcl};
use serde::Serialize;

use super::Context;
use crate::exit_code::ExitCode;

/// Create a bucket
#[derive(Args, Debug)]
pub struct MbArgs {
    /// Base of the generated bucket name
    pub base: String,

    /// Canned ACL (private, public-read, public-read-write, authenticated-read)
    #[arg(long)]
    pub acl: Option<CannedAcl>,

    /// Use the base as the full bucket name
    #[arg(long)]
    pub exact: bool,
}

#[derive(Debug, Serialize)]
struct MbOutput {
    status: &'static str,
    bucket: String,
    uri: String,
    acl: CannedAcl,
}

/// Execute the mb command
pub async fn execute(args: MbArgs, ctx: &Context) -> ExitCode {
    let resource = match ctx.resource().await {
        Ok(r) => r,
        Err(e) => return ctx.fail("Failed to create S3 client", &e),
    };
    let manager = BucketManager::new(resource);
    let acl = args.acl.unwrap_or(ctx.config.default_acl);

    let created = if args.exact {
        manager
            .create_named_bucket(&args.base, acl)
            .await
            .map(|()| args.base.clone())
    } else {
        manager.create_bucket(&args.base, acl).await
    };

    match created {
        Ok(bucket) => {
            let uri = manager.resource().format_path(&bucket, None);
            if ctx.formatter.is_json() {
                ctx.formatter.json(&MbOutput {
                    status: "success",
                    bucket,
                    uri,
                    acl,
                });
            } else {
                ctx.formatter
                    .success(&format!("Bucket '{bucket}' created ({uri}, acl {acl})."));
            }
            ExitCode::Success
        }
        Err(e) => ctx.fail(&format!("Failed to create bucket '{}'", args.base), &e),
    }
}
