//! ObjectStore trait definition
//!
//! This trait defines the narrow interface the managers need from an
//! S3-compatible service. It keeps s3ops-core independent of the SDK and is
//! the seam tests mock.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::lifecycle::LifecycleRule;

/// Metadata for an object or bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Object key or bucket name
    pub key: String,

    /// Size in bytes (None for buckets)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,

    /// Human-readable size
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_human: Option<String>,

    /// Last modified timestamp (creation date for buckets)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,

    /// ETag (usually MD5 for single-part uploads)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,

    /// Storage class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,

    /// Content type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// Version id, when the bucket is versioned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

impl ObjectInfo {
    /// Create a new ObjectInfo for a file
    pub fn file(key: impl Into<String>, size: i64) -> Self {
        Self {
            key: key.into(),
            size_bytes: Some(size),
            size_human: Some(humansize::format_size(
                size.max(0) as u64,
                humansize::BINARY,
            )),
            last_modified: None,
            etag: None,
            storage_class: None,
            content_type: None,
            version_id: None,
        }
    }

    /// Create a new ObjectInfo for a bucket
    pub fn bucket(name: impl Into<String>) -> Self {
        Self {
            key: name.into(),
            size_bytes: None,
            size_human: None,
            last_modified: None,
            etag: None,
            storage_class: None,
            content_type: None,
            version_id: None,
        }
    }
}

/// Canned ACLs accepted at bucket and object creation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CannedAcl {
    #[default]
    Private,
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
}

impl CannedAcl {
    /// The S3 wire spelling
    pub const fn as_str(self) -> &'static str {
        match self {
            CannedAcl::Private => "private",
            CannedAcl::PublicRead => "public-read",
            CannedAcl::PublicReadWrite => "public-read-write",
            CannedAcl::AuthenticatedRead => "authenticated-read",
        }
    }
}

impl fmt::Display for CannedAcl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CannedAcl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "private" => Ok(CannedAcl::Private),
            "public-read" => Ok(CannedAcl::PublicRead),
            "public-read-write" => Ok(CannedAcl::PublicReadWrite),
            "authenticated-read" => Ok(CannedAcl::AuthenticatedRead),
            other => Err(Error::InvalidArgument(format!(
                "unknown ACL '{other}', expected one of: private, public-read, public-read-write, authenticated-read"
            ))),
        }
    }
}

/// Options for bucket listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketListOptions {
    /// Maximum number of buckets to return
    pub max_buckets: Option<i32>,

    /// Only buckets whose name starts with this prefix
    pub prefix: Option<String>,
}

/// Options for one page of an object listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    /// Maximum number of keys to return per request
    pub max_keys: Option<i32>,

    /// Prefix to filter by
    pub prefix: Option<String>,

    /// Continuation token for pagination
    pub continuation_token: Option<String>,
}

/// Result of a list operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListResult {
    /// Listed objects
    pub items: Vec<ObjectInfo>,

    /// Whether the result is truncated (more items available)
    pub truncated: bool,

    /// Continuation token for pagination
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}

/// A single object version or delete marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectVersion {
    pub key: String,
    pub version_id: String,
    pub is_latest: bool,
    pub is_delete_marker: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<i64>,
}

/// Options for one page of a version listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionListOptions {
    pub prefix: Option<String>,
    pub max_keys: Option<i32>,
    pub key_marker: Option<String>,
    pub version_id_marker: Option<String>,
}

/// One page of versions and delete markers
#[derive(Debug, Clone, Default)]
pub struct VersionListResult {
    pub versions: Vec<ObjectVersion>,
    pub truncated: bool,
    pub next_key_marker: Option<String>,
    pub next_version_id_marker: Option<String>,
}

/// Target of a bulk delete: a key, optionally pinned to one version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

impl ObjectRef {
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version_id: None,
        }
    }

    pub fn version(key: impl Into<String>, version_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            version_id: Some(version_id.into()),
        }
    }
}

/// A key the service refused to delete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteFailure {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    pub code: String,
    pub message: String,
}

/// Outcome of a bulk delete
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteReport {
    pub deleted: Vec<ObjectRef>,
    pub errors: Vec<DeleteFailure>,
}

/// Per-upload options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadOptions {
    pub content_type: Option<String>,
    pub storage_class: Option<String>,
    pub acl: Option<CannedAcl>,
    pub cache_control: Option<String>,
    /// User metadata, sent as `x-amz-meta-*` headers
    pub metadata: BTreeMap<String, String>,
}

/// Per-download options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownloadOptions {
    /// Fetch this version instead of the latest
    pub version_id: Option<String>,
}

/// Trait for S3-compatible storage operations
///
/// This trait is implemented by the S3 adapter and can be mocked for testing.
/// Implementations report a missing bucket or object as [`Error::NotFound`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Probe a bucket; `Ok(false)` only when the service says it is absent
    async fn bucket_exists(&self, bucket: &str) -> Result<bool>;

    /// Get object metadata
    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectInfo>;

    /// Create a bucket with exactly this name
    async fn create_bucket(&self, bucket: &str, acl: CannedAcl) -> Result<()>;

    /// List buckets
    async fn list_buckets(&self, options: BucketListOptions) -> Result<Vec<ObjectInfo>>;

    /// Delete an empty bucket
    async fn delete_bucket(&self, bucket: &str) -> Result<()>;

    /// Replace the bucket lifecycle configuration with a single rule
    async fn put_lifecycle_rule(&self, bucket: &str, rule: LifecycleRule) -> Result<()>;

    /// List one page of objects in a bucket
    async fn list_objects(&self, bucket: &str, options: ListOptions) -> Result<ListResult>;

    /// List one page of object versions and delete markers
    async fn list_object_versions(
        &self,
        bucket: &str,
        options: VersionListOptions,
    ) -> Result<VersionListResult>;

    /// Delete up to 1000 objects in one request
    async fn delete_objects(&self, bucket: &str, objects: Vec<ObjectRef>) -> Result<DeleteReport>;

    /// Delete a single object
    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()>;

    /// Stream a local file to `bucket/key`
    async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        options: UploadOptions,
    ) -> Result<ObjectInfo>;

    /// Stream `bucket/key` into a local file
    async fn download_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        options: DownloadOptions,
    ) -> Result<ObjectInfo>;
}
