//! s3ops-core: bucket, lifecycle and object managers
//!
//! This crate provides the SDK-independent part of s3ops:
//! - Configuration management
//! - The ObjectStore trait the S3 adapter implements
//! - ResourceClient, BucketManager and ObjectManager
//! - Lifecycle rule construction and validation
//!
//! Managers hold a shared [`ResourceClient`] rather than a concrete SDK
//! client, so every operation can be tested against a mock store.

pub mod bucket;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod object;
pub mod path;
pub mod resource;
pub mod traits;

pub use bucket::{create_bucket_name, BucketManager, MAX_DELETE_BATCH};
pub use config::{Config, ConfigManager};
pub use error::{Error, Result};
pub use lifecycle::{
    Expiration, LifecycleFilter, LifecycleOptions, LifecycleRule, NoncurrentVersionTransition,
    RuleStatus, Tag, Transition,
};
pub use object::ObjectManager;
pub use path::{format_path, S3Uri};
pub use resource::{ResourceClient, ResourceKind};
pub use traits::{
    BucketListOptions, CannedAcl, DeleteFailure, DeleteReport, DownloadOptions, ListOptions,
    ListResult, ObjectInfo, ObjectRef, ObjectStore, ObjectVersion, UploadOptions,
    VersionListOptions, VersionListResult,
};
