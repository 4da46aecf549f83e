//! Region-scoped handle shared by the bucket and object managers

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::path::format_path;
use crate::traits::ObjectStore;

/// What an existence probe targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Bucket,
    Object,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Bucket => f.write_str("bucket"),
            ResourceKind::Object => f.write_str("object"),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bucket" => Ok(ResourceKind::Bucket),
            "object" => Ok(ResourceKind::Object),
            other => Err(Error::InvalidArgument(format!(
                "can only check buckets or objects, got '{other}'"
            ))),
        }
    }
}

/// Shared connection state: the store and the region it is bound to
#[derive(Clone)]
pub struct ResourceClient {
    store: Arc<dyn ObjectStore>,
    region: String,
}

impl fmt::Debug for ResourceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl ResourceClient {
    pub fn new(store: Arc<dyn ObjectStore>, region: impl Into<String>) -> Self {
        Self {
            store,
            region: region.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    /// Probe a bucket or an object.
    ///
    /// `Ok(false)` means the service reported the resource absent. Any other
    /// probe failure is returned as an error. `object` is required for
    /// [`ResourceKind::Object`].
    pub async fn check_resource_exists(
        &self,
        kind: ResourceKind,
        bucket: &str,
        object: Option<&str>,
    ) -> Result<bool> {
        match kind {
            ResourceKind::Bucket => {
                let found = self.store.bucket_exists(bucket).await.inspect_err(|e| {
                    tracing::warn!(bucket, error = %e, "Bucket probe failed");
                })?;
                if found {
                    tracing::debug!(bucket, "Bucket found");
                } else {
                    tracing::debug!(bucket, "Bucket does not exist");
                }
                Ok(found)
            }
            ResourceKind::Object => {
                let key = object.filter(|k| !k.is_empty()).ok_or_else(|| {
                    Error::InvalidArgument("object name is required to check an object".into())
                })?;
                match self.store.head_object(bucket, key).await {
                    Ok(_) => {
                        tracing::debug!(bucket, key, "Object found");
                        Ok(true)
                    }
                    Err(Error::NotFound(_)) => {
                        tracing::debug!(bucket, key, "Object does not exist");
                        Ok(false)
                    }
                    Err(e) => {
                        tracing::warn!(bucket, key, error = %e, "Object probe failed");
                        Err(e)
                    }
                }
            }
        }
    }

    /// Shorthand for a bucket probe
    pub async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        self.check_resource_exists(ResourceKind::Bucket, bucket, None)
            .await
    }

    /// `s3://bucket/prefix`, or the bucket root without a prefix
    pub fn format_path(&self, bucket: &str, prefix: Option<&str>) -> String {
        format_path(bucket, prefix)
    }
}
