//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from s3ops-core.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketCannedAcl, BucketLocationConstraint, CreateBucketConfiguration, Delete,
    ObjectCannedAcl, ObjectIdentifier, StorageClass,
};
use aws_smithy_types::DateTime;
use tokio::io::{AsyncRead, AsyncWriteExt};

use s3ops_core::config::DEFAULT_REGION;
use s3ops_core::{
    BucketListOptions, CannedAcl, Config, DeleteFailure, DeleteReport, DownloadOptions, Error,
    LifecycleRule, ListOptions, ListResult, ObjectInfo, ObjectRef, ObjectStore, ObjectVersion,
    Result, UploadOptions, VersionListOptions, VersionListResult,
};

use crate::error::map_sdk_error;
use crate::lifecycle::to_configuration;

/// S3 client wrapper
pub struct S3Client {
    inner: aws_sdk_s3::Client,
    region: String,
}

impl S3Client {
    /// Create a new S3 client from the loaded configuration.
    ///
    /// Credentials come from the SDK's default provider chain.
    pub async fn new(config: &Config) -> Result<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));

        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.force_path_style)
            .build();

        tracing::debug!(
            region = %config.region,
            endpoint = config.endpoint.as_deref().unwrap_or("default"),
            path_style = config.force_path_style,
            "S3 client configured"
        );

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            region: config.region.clone(),
        })
    }

    /// Wrap an already configured SDK client
    pub fn from_client(inner: aws_sdk_s3::Client, region: impl Into<String>) -> Self {
        Self {
            inner,
            region: region.into(),
        }
    }

    /// Get the underlying aws-sdk-s3 client
    pub fn inner(&self) -> &aws_sdk_s3::Client {
        &self.inner
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

fn timestamp(value: Option<&DateTime>) -> Option<jiff::Timestamp> {
    value.and_then(|dt| jiff::Timestamp::from_second(dt.secs()).ok())
}

fn clean_etag(etag: Option<&str>) -> Option<String> {
    etag.map(|e| e.trim_matches('"').to_string())
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        match self.inner.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) => match map_sdk_error(e, bucket) {
                Error::NotFound(_) => Ok(false),
                other => Err(other),
            },
        }
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectInfo> {
        let response = self
            .inner
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &format!("{bucket}/{key}")))?;

        let mut info = ObjectInfo::file(key, response.content_length().unwrap_or(0));
        info.last_modified = timestamp(response.last_modified());
        info.etag = clean_etag(response.e_tag());
        info.content_type = response.content_type().map(str::to_string);
        info.storage_class = response.storage_class().map(|sc| sc.as_str().to_string());
        info.version_id = response.version_id().map(str::to_string);

        Ok(info)
    }

    async fn create_bucket(&self, bucket: &str, acl: CannedAcl) -> Result<()> {
        let mut request = self.inner.create_bucket().bucket(bucket);

        // Private is the service default and the only ACL accepted when
        // object ownership is enforced.
        if acl != CannedAcl::Private {
            request = request.acl(BucketCannedAcl::from(acl.as_str()));
        }

        // us-east-1 rejects an explicit location constraint
        if self.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        request
            .send()
            .await
            .map_err(|e| map_sdk_error(e, bucket))?;

        Ok(())
    }

    async fn list_buckets(&self, options: BucketListOptions) -> Result<Vec<ObjectInfo>> {
        let response = self
            .inner
            .list_buckets()
            .set_max_buckets(options.max_buckets)
            .set_prefix(options.prefix)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, "buckets"))?;

        let buckets = response
            .buckets()
            .iter()
            .map(|b| {
                let mut info = ObjectInfo::bucket(b.name().unwrap_or_default());
                info.last_modified = timestamp(b.creation_date());
                info
            })
            .collect();

        Ok(buckets)
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.inner
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, bucket))?;

        Ok(())
    }

    async fn put_lifecycle_rule(&self, bucket: &str, rule: LifecycleRule) -> Result<()> {
        let configuration = to_configuration(&rule)?;

        self.inner
            .put_bucket_lifecycle_configuration()
            .bucket(bucket)
            .lifecycle_configuration(configuration)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, bucket))?;

        Ok(())
    }

    async fn list_objects(&self, bucket: &str, options: ListOptions) -> Result<ListResult> {
        let response = self
            .inner
            .list_objects_v2()
            .bucket(bucket)
            .set_prefix(options.prefix)
            .set_max_keys(options.max_keys)
            .set_continuation_token(options.continuation_token)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, bucket))?;

        let items = response
            .contents()
            .iter()
            .map(|object| {
                let mut info =
                    ObjectInfo::file(object.key().unwrap_or_default(), object.size().unwrap_or(0));
                info.last_modified = timestamp(object.last_modified());
                info.etag = clean_etag(object.e_tag());
                info.storage_class = object.storage_class().map(|sc| sc.as_str().to_string());
                info
            })
            .collect();

        Ok(ListResult {
            items,
            truncated: response.is_truncated().unwrap_or(false),
            continuation_token: response.next_continuation_token().map(str::to_string),
        })
    }

    async fn list_object_versions(
        &self,
        bucket: &str,
        options: VersionListOptions,
    ) -> Result<VersionListResult> {
        let response = self
            .inner
            .list_object_versions()
            .bucket(bucket)
            .set_prefix(options.prefix)
            .set_max_keys(options.max_keys)
            .set_key_marker(options.key_marker)
            .set_version_id_marker(options.version_id_marker)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, bucket))?;

        let versions = response.versions().iter().map(|v| ObjectVersion {
            key: v.key().unwrap_or_default().to_string(),
            version_id: v.version_id().unwrap_or("null").to_string(),
            is_latest: v.is_latest().unwrap_or(false),
            is_delete_marker: false,
            last_modified: timestamp(v.last_modified()),
            size_bytes: v.size(),
        });

        let markers = response.delete_markers().iter().map(|m| ObjectVersion {
            key: m.key().unwrap_or_default().to_string(),
            version_id: m.version_id().unwrap_or("null").to_string(),
            is_latest: m.is_latest().unwrap_or(false),
            is_delete_marker: true,
            last_modified: timestamp(m.last_modified()),
            size_bytes: None,
        });

        Ok(VersionListResult {
            versions: versions.chain(markers).collect(),
            truncated: response.is_truncated().unwrap_or(false),
            next_key_marker: response.next_key_marker().map(str::to_string),
            next_version_id_marker: response.next_version_id_marker().map(str::to_string),
        })
    }

    async fn delete_objects(&self, bucket: &str, objects: Vec<ObjectRef>) -> Result<DeleteReport> {
        if objects.is_empty() {
            return Ok(DeleteReport::default());
        }

        let identifiers = objects
            .into_iter()
            .map(|o| {
                ObjectIdentifier::builder()
                    .key(o.key)
                    .set_version_id(o.version_id)
                    .build()
                    .map_err(|e| Error::General(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let delete = Delete::builder()
            .set_objects(Some(identifiers))
            .quiet(false)
            .build()
            .map_err(|e| Error::General(e.to_string()))?;

        let response = self
            .inner
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, bucket))?;

        let deleted = response
            .deleted()
            .iter()
            .filter_map(|d| {
                d.key().map(|k| ObjectRef {
                    key: k.to_string(),
                    version_id: d.version_id().map(str::to_string),
                })
            })
            .collect();

        let errors: Vec<DeleteFailure> = response
            .errors()
            .iter()
            .map(|e| DeleteFailure {
                key: e.key().unwrap_or_default().to_string(),
                version_id: e.version_id().map(str::to_string),
                code: e.code().unwrap_or("Unknown").to_string(),
                message: e.message().unwrap_or_default().to_string(),
            })
            .collect();

        if !errors.is_empty() {
            tracing::warn!(bucket, failed = errors.len(), "Failed to delete some objects");
        }

        Ok(DeleteReport { deleted, errors })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.inner
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &format!("{bucket}/{key}")))?;

        Ok(())
    }

    async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        options: UploadOptions,
    ) -> Result<ObjectInfo> {
        let size = tokio::fs::metadata(path).await?.len() as i64;
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;

        let mut request = self
            .inner
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .set_content_type(options.content_type.clone())
            .set_cache_control(options.cache_control)
            .set_storage_class(options.storage_class.as_deref().map(StorageClass::from))
            .set_acl(options.acl.map(|acl| ObjectCannedAcl::from(acl.as_str())));

        if !options.metadata.is_empty() {
            let metadata: HashMap<String, String> = options.metadata.into_iter().collect();
            request = request.set_metadata(Some(metadata));
        }

        let response = request
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &format!("{bucket}/{key}")))?;

        let mut info = ObjectInfo::file(key, size);
        info.etag = clean_etag(response.e_tag());
        info.version_id = response.version_id().map(str::to_string);
        info.content_type = options.content_type;
        info.last_modified = Some(jiff::Timestamp::now());

        Ok(info)
    }

    async fn download_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        options: DownloadOptions,
    ) -> Result<ObjectInfo> {
        let response = self
            .inner
            .get_object()
            .bucket(bucket)
            .key(key)
            .set_version_id(options.version_id)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, &format!("{bucket}/{key}")))?;

        let mut info = ObjectInfo::file(key, response.content_length().unwrap_or(0));
        info.last_modified = timestamp(response.last_modified());
        info.etag = clean_etag(response.e_tag());
        info.content_type = response.content_type().map(str::to_string);
        info.version_id = response.version_id().map(str::to_string);

        let mut reader = response.body.into_async_read();
        let bytes = write_body(&mut reader, path).await?;
        tracing::debug!(bucket, key, bytes, "Object body written");
        Ok(info)
    }
}

/// Stream `reader` into a new file at `path`.
///
/// On failure the partially written file is removed.
async fn write_body<R>(reader: &mut R, path: &Path) -> Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let written = async {
        let mut file = tokio::fs::File::create(path).await?;
        let written = tokio::io::copy(reader, &mut file).await?;
        file.flush().await?;
        Ok::<_, std::io::Error>(written)
    }
    .await;

    match written {
        Ok(bytes) => Ok(bytes),
        Err(e) => {
            let _ = tokio::fs::remove_file(path).await;
            Err(Error::Io(e))
        }
    }
}
