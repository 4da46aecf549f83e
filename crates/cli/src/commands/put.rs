//! put command - Upload a local file
//!
//! The object key defaults to the file's base name and the content type is
//! guessed from its extension.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::Args;
use s3ops_core::{CannedAcl, ObjectInfo, ObjectManager, UploadOptions};
use serde::Serialize;

use super::Context;
use crate::exit_code::ExitCode;

/// Upload a file
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Destination bucket
    pub bucket: String,

    /// Local file to upload
    pub file: PathBuf,

    /// Object key (defaults to the file name)
    #[arg(long)]
    pub key: Option<String>,

    /// Content type (guessed from the extension when omitted)
    #[arg(long)]
    pub content_type: Option<String>,

    /// Storage class, e.g. STANDARD_IA
    #[arg(long)]
    pub storage_class: Option<String>,

    /// Canned ACL for the object
    #[arg(long)]
    pub acl: Option<CannedAcl>,

    /// Cache-Control header
    #[arg(long)]
    pub cache_control: Option<String>,

    /// User metadata (key=value, repeatable)
    #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_meta)]
    pub metadata: Vec<(String, String)>,

    /// Create the bucket if it does not exist
    #[arg(long)]
    pub create_bucket: bool,
}

impl PutArgs {
    fn to_options(&self) -> UploadOptions {
        UploadOptions {
            content_type: self
                .content_type
                .clone()
                .or_else(|| guess_content_type(&self.file)),
            storage_class: self.storage_class.clone(),
            acl: self.acl,
            cache_control: self.cache_control.clone(),
            metadata: self.metadata.iter().cloned().collect::<BTreeMap<_, _>>(),
        }
    }
}

fn parse_meta(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("invalid metadata '{s}', expected key=value")),
    }
}

fn guess_content_type(path: &Path) -> Option<String> {
    mime_guess::from_path(path).first_raw().map(str::to_string)
}

#[derive(Debug, Serialize)]
struct PutOutput {
    status: &'static str,
    bucket: String,
    uri: String,
    object: ObjectInfo,
}

/// Execute the put command
pub async fn execute(args: PutArgs, ctx: &Context) -> ExitCode {
    let resource = match ctx.resource().await {
        Ok(r) => r,
        Err(e) => return ctx.fail("Failed to create S3 client", &e),
    };

    let opened = if args.create_bucket {
        ObjectManager::open_or_create(resource, &args.bucket, ctx.config.default_acl).await
    } else {
        ObjectManager::open(resource, &args.bucket).await
    };
    let manager = match opened {
        Ok(m) => m,
        Err(e) => return ctx.fail(&format!("Cannot use bucket '{}'", args.bucket), &e),
    };

    let options = args.to_options();
    let object = match manager
        .upload_file(&args.file, args.key.as_deref(), options)
        .await
    {
        Ok(info) => info,
        Err(e) => {
            return ctx.fail(
                &format!("Failed to upload '{}'", args.file.display()),
                &e,
            );
        }
    };

    let uri = manager.uri(Some(&object.key));
    if ctx.formatter.is_json() {
        ctx.formatter.json(&PutOutput {
            status: "success",
            bucket: args.bucket,
            uri,
            object,
        });
    } else {
        let size = object.size_human.as_deref().unwrap_or("0 B");
        ctx.formatter.success(&format!(
            "'{}' -> {uri} ({size})",
            args.file.display()
        ));
    }
    ExitCode::Success
}
