//! uri command - Format an s3:// URI

use clap::Args;
use s3ops_core::format_path;
use serde::Serialize;

use super::Context;
use crate::exit_code::ExitCode;

/// Print the URI of a bucket and optional prefix
#[derive(Args, Debug)]
pub struct UriArgs {
    /// Bucket name
    pub bucket: String,

    /// Key or prefix inside the bucket
    pub prefix: Option<String>,
}

#[derive(Debug, Serialize)]
struct UriOutput {
    uri: String,
}

impl std::fmt::Display for UriOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}

/// Execute the uri command
pub fn execute(args: UriArgs, ctx: &Context) -> ExitCode {
    ctx.formatter.output(&UriOutput {
        uri: format_path(&args.bucket, args.prefix.as_deref()),
    });
    ExitCode::Success
}
