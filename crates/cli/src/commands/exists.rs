//! exists command - Probe a bucket or object
//!
//! Exits 0 when the resource exists and 5 when it does not; any other
//! failure keeps its own exit code.

use clap::Args;
use s3ops_core::{format_path, ResourceKind};
use serde::Serialize;

use super::Context;
use crate::exit_code::ExitCode;

/// Check whether a bucket or object exists
#[derive(Args, Debug)]
pub struct ExistsArgs {
    /// Resource kind: bucket or object
    pub kind: String,

    /// Bucket name
    pub bucket: String,

    /// Object key (required for objects)
    pub key: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExistsOutput {
    kind: String,
    uri: String,
    exists: bool,
}

impl std::fmt::Display for ExistsOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verdict = if self.exists { "exists" } else { "does not exist" };
        write!(f, "{} {} {verdict}", self.kind, self.uri)
    }
}

/// Execute the exists command
pub async fn execute(args: ExistsArgs, ctx: &Context) -> ExitCode {
    let kind: ResourceKind = match args.kind.parse() {
        Ok(kind) => kind,
        Err(e) => return ctx.fail("Invalid resource kind", &e),
    };

    let resource = match ctx.resource().await {
        Ok(r) => r,
        Err(e) => return ctx.fail("Failed to create S3 client", &e),
    };

    let exists = match resource
        .check_resource_exists(kind, &args.bucket, args.key.as_deref())
        .await
    {
        Ok(exists) => exists,
        Err(e) => return ctx.fail(&format!("Failed to check {kind}"), &e),
    };

    ctx.formatter.output(&ExistsOutput {
        kind: kind.to_string(),
        uri: format_path(&args.bucket, args.key.as_deref()),
        exists,
    });

    if exists {
        ExitCode::Success
    } else {
        ExitCode::NotFound
    }
}
