//! S3 URIs, bucket names and object keys
//!
//! Remote locations are written as `s3://bucket/prefix`.

use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};

/// URI scheme for remote locations
pub const SCHEME: &str = "s3";

/// Shortest and longest bucket names the service accepts
pub const MIN_BUCKET_NAME_LEN: usize = 3;
pub const MAX_BUCKET_NAME_LEN: usize = 63;

/// Format a bucket and optional prefix as `s3://bucket/prefix`
///
/// A missing or empty prefix yields the bucket root, `s3://bucket/`.
pub fn format_path(bucket: &str, prefix: Option<&str>) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{SCHEME}://{bucket}/{p}"),
        _ => format!("{SCHEME}://{bucket}/"),
    }
}

/// A parsed `s3://bucket/key` location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Uri {
    /// Bucket name
    pub bucket: String,
    /// Object key or prefix (empty for bucket root)
    pub key: String,
}

impl S3Uri {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse `s3://bucket[/key]`
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("s3://")
            .ok_or_else(|| Error::InvalidPath(format!("'{uri}' must start with s3://")))?;

        let (bucket, key) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(Error::InvalidPath("Bucket name cannot be empty".into()));
        }

        Ok(Self::new(bucket, key))
    }
}

impl fmt::Display for S3Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_path(&self.bucket, Some(&self.key)))
    }
}

/// Check a bucket name against the service naming rules
pub fn validate_bucket_name(name: &str) -> Result<()> {
    if name.len() < MIN_BUCKET_NAME_LEN || name.len() > MAX_BUCKET_NAME_LEN {
        return Err(Error::InvalidArgument(format!(
            "Bucket name '{name}' must be between {MIN_BUCKET_NAME_LEN} and {MAX_BUCKET_NAME_LEN} characters"
        )));
    }

    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.');
    let valid_ends = name
        .chars()
        .next()
        .zip(name.chars().last())
        .is_some_and(|(first, last)| first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric());

    if !valid_chars || !valid_ends || name.contains("..") {
        return Err(Error::InvalidArgument(format!(
            "Bucket name '{name}' may only contain lowercase letters, digits, '-' and '.', and must start and end with a letter or digit"
        )));
    }

    Ok(())
}

/// Object key for a local file: its base name
pub fn object_key_for(local_path: &Path) -> Result<String> {
    local_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| {
            Error::InvalidPath(format!(
                "'{}' has no file name to use as object key",
                local_path.display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_path_root() {
        assert_eq!(format_path("bucket", None), "s3://bucket/");
        assert_eq!(format_path("bucket", Some("")), "s3://bucket/");
    }

    #[test]
    fn test_format_path_prefix() {
        assert_eq!(format_path("bucket", Some("a/b.txt")), "s3://bucket/a/b.txt");
        assert_eq!(format_path("bucket", Some("dir/")), "s3://bucket/dir/");
    }

    #[test]
    fn test_parse_uri() {
        let uri = S3Uri::parse("s3://bucket/dir/file.txt").unwrap();
        assert_eq!(uri.bucket, "bucket");
        assert_eq!(uri.key, "dir/file.txt");

        let uri = S3Uri::parse("s3://bucket").unwrap();
        assert_eq!(uri.key, "");
        assert_eq!(uri.to_string(), "s3://bucket/");
    }

    #[test]
    fn test_parse_uri_errors() {
        assert!(S3Uri::parse("bucket/key").is_err());
        assert!(S3Uri::parse("s3:///key").is_err());
        assert!(S3Uri::parse("").is_err());
    }

    #[test]
    fn test_validate_bucket_name() {
        assert!(validate_bucket_name("my-bucket.v2").is_ok());
        assert!(validate_bucket_name("ab").is_err());
        assert!(validate_bucket_name(&"a".repeat(64)).is_err());
        assert!(validate_bucket_name("Upper").is_err());
        assert!(validate_bucket_name("-leading").is_err());
        assert!(validate_bucket_name("trailing-").is_err());
        assert!(validate_bucket_name("double..dot").is_err());
        assert!(validate_bucket_name("under_score").is_err());
    }

    #[test]
    fn test_object_key_for() {
        assert_eq!(
            object_key_for(Path::new("/tmp/data/report.csv")).unwrap(),
            "report.csv"
        );
        assert_eq!(object_key_for(Path::new("notes.txt")).unwrap(), "notes.txt");
        assert!(object_key_for(Path::new("/")).is_err());
        assert!(object_key_for(Path::new("..")).is_err());
    }
}
