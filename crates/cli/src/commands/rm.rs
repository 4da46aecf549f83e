//! rm command - Remove an object

use clap::Args;
use s3ops_core::ObjectManager;
use serde::Serialize;

use super::Context;
use crate::exit_code::ExitCode;

/// Remove an object
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Bucket name
    pub bucket: String,

    /// Object key
    pub key: String,
}

#[derive(Debug, Serialize)]
struct RmOutput {
    status: &'static str,
    uri: String,
}

/// Execute the rm command
pub async fn execute(args: RmArgs, ctx: &Context) -> ExitCode {
    let resource = match ctx.resource().await {
        Ok(r) => r,
        Err(e) => return ctx.fail("Failed to create S3 client", &e),
    };

    let manager = match ObjectManager::open(resource, &args.bucket).await {
        Ok(m) => m,
        Err(e) => return ctx.fail(&format!("Cannot use bucket '{}'", args.bucket), &e),
    };

    let uri = manager.uri(Some(&args.key));
    if let Err(e) = manager.delete_object(&args.key).await {
        return ctx.fail(&format!("Failed to remove {uri}"), &e);
    }

    if ctx.formatter.is_json() {
        ctx.formatter.json(&RmOutput {
            status: "success",
            uri,
        });
    } else {
        ctx.formatter.success(&format!("Removed {uri}."));
    }
    ExitCode::Success
}
