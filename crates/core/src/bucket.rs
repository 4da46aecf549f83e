//! Bucket lifecycle: naming, creation, listing, lifecycle policy, deletion

use crate::error::{Error, Result};
use crate::lifecycle::LifecycleOptions;
use crate::path::validate_bucket_name;
use crate::resource::ResourceClient;
use crate::traits::{
    BucketListOptions, CannedAcl, DeleteReport, ListOptions, ObjectRef, VersionListOptions,
};

/// Most keys a single bulk delete request may carry
pub const MAX_DELETE_BATCH: usize = 1000;

/// Timestamp layout appended to generated bucket names
const NAME_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Append a random UUID and a second-resolution local timestamp to `base`
///
/// The result is `{base}-{uuid}-{YYYYMMDDHHMMSS}`. Uniqueness is
/// probabilistic.
pub fn create_bucket_name(base: &str) -> String {
    let stamp = jiff::Zoned::now().strftime(NAME_TIMESTAMP_FORMAT);
    format!("{base}-{}-{stamp}", uuid::Uuid::new_v4())
}

/// Bucket operations over a shared [`ResourceClient`]
#[derive(Debug, Clone)]
pub struct BucketManager {
    resource: ResourceClient,
}

impl BucketManager {
    pub fn new(resource: ResourceClient) -> Self {
        Self { resource }
    }

    pub fn resource(&self) -> &ResourceClient {
        &self.resource
    }

    /// See [`create_bucket_name`]
    pub fn create_bucket_name(base: &str) -> String {
        create_bucket_name(base)
    }

    /// Create a bucket named after `base` plus a unique suffix.
    ///
    /// Returns the name that was created.
    pub async fn create_bucket(&self, base: &str, acl: CannedAcl) -> Result<String> {
        let name = create_bucket_name(base);
        self.create_named_bucket(&name, acl).await?;
        Ok(name)
    }

    /// Create a bucket with exactly `name`
    pub async fn create_named_bucket(&self, name: &str, acl: CannedAcl) -> Result<()> {
        validate_bucket_name(name)?;

        self.resource
            .store()
            .create_bucket(name, acl)
            .await
            .inspect_err(|e| tracing::warn!(bucket = name, error = %e, "Error creating bucket"))?;

        tracing::info!(bucket = name, %acl, region = self.resource.region(), "Bucket created");
        Ok(())
    }

    /// Bucket names, in the order the service returns them
    pub async fn list_buckets(
        &self,
        max_buckets: Option<i32>,
        prefix: Option<&str>,
    ) -> Result<Vec<String>> {
        let options = BucketListOptions {
            max_buckets,
            prefix: prefix.filter(|p| !p.is_empty()).map(str::to_string),
        };

        let buckets = self
            .resource
            .store()
            .list_buckets(options)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Error listing buckets"))?;

        tracing::debug!(count = buckets.len(), "Listed buckets");
        Ok(buckets.into_iter().map(|b| b.key).collect())
    }

    /// Replace the bucket's lifecycle configuration with one rule.
    ///
    /// The options are validated first, then the bucket is probed; a missing
    /// bucket is [`Error::NotFound`] and no lifecycle request is sent.
    pub async fn set_lifecycle_policy(&self, bucket: &str, options: &LifecycleOptions) -> Result<()> {
        let rule = options.build()?;

        if !self.resource.bucket_exists(bucket).await? {
            tracing::warn!(bucket, "Bucket does not exist, lifecycle policy not set");
            return Err(Error::NotFound(format!("bucket {bucket}")));
        }

        let rule_id = rule.id.clone();
        self.resource
            .store()
            .put_lifecycle_rule(bucket, rule)
            .await
            .inspect_err(|e| {
                tracing::warn!(bucket, error = %e, "Error setting lifecycle policy");
            })?;

        tracing::info!(bucket, rule_id = %rule_id, "Lifecycle policy set");
        Ok(())
    }

    /// Delete a bucket, optionally emptying it first.
    ///
    /// Returns `Ok(false)` without doing anything when the bucket does not
    /// exist. With `force_empty`, current objects and then every remaining
    /// version and delete marker are removed before the bucket itself.
    pub async fn delete_bucket(&self, bucket: &str, force_empty: bool) -> Result<bool> {
        if !self.resource.bucket_exists(bucket).await? {
            tracing::info!(bucket, "Bucket does not exist, nothing to delete");
            return Ok(false);
        }

        if force_empty {
            let objects = self.purge_objects(bucket).await?;
            let versions = self.purge_versions(bucket).await?;
            tracing::info!(bucket, objects, versions, "Bucket emptied");
        }

        self.resource
            .store()
            .delete_bucket(bucket)
            .await
            .inspect_err(|e| tracing::warn!(bucket, error = %e, "Error deleting bucket"))?;

        tracing::info!(bucket, "Bucket deleted");
        Ok(true)
    }

    async fn purge_objects(&self, bucket: &str) -> Result<usize> {
        let store = self.resource.store();
        let mut deleted = 0;
        let mut options = ListOptions {
            max_keys: Some(MAX_DELETE_BATCH as i32),
            ..Default::default()
        };

        loop {
            let page = store.list_objects(bucket, options.clone()).await?;
            let refs: Vec<ObjectRef> = page
                .items
                .into_iter()
                .map(|info| ObjectRef::key(info.key))
                .collect();
            deleted += self.delete_batch(bucket, refs).await?;

            match page.continuation_token {
                Some(token) if page.truncated => options.continuation_token = Some(token),
                _ => break,
            }
        }

        Ok(deleted)
    }

    async fn purge_versions(&self, bucket: &str) -> Result<usize> {
        let store = self.resource.store();
        let mut deleted = 0;
        let mut options = VersionListOptions {
            max_keys: Some(MAX_DELETE_BATCH as i32),
            ..Default::default()
        };

        loop {
            let page = store.list_object_versions(bucket, options.clone()).await?;
            let refs: Vec<ObjectRef> = page
                .versions
                .into_iter()
                .map(|v| ObjectRef::version(v.key, v.version_id))
                .collect();
            deleted += self.delete_batch(bucket, refs).await?;

            if !page.truncated {
                break;
            }
            if page.next_key_marker.is_none() && page.next_version_id_marker.is_none() {
                break;
            }
            options.key_marker = page.next_key_marker;
            options.version_id_marker = page.next_version_id_marker;
        }

        Ok(deleted)
    }

    async fn delete_batch(&self, bucket: &str, refs: Vec<ObjectRef>) -> Result<usize> {
        let mut deleted = 0;
        for chunk in refs.chunks(MAX_DELETE_BATCH) {
            let report: DeleteReport = self
                .resource
                .store()
                .delete_objects(bucket, chunk.to_vec())
                .await?;

            if let Some(failure) = report.errors.first() {
                tracing::warn!(
                    bucket,
                    failed = report.errors.len(),
                    key = %failure.key,
                    code = %failure.code,
                    "Bulk delete refused some keys"
                );
                return Err(Error::Conflict(format!(
                    "could not delete {} object(s) from {bucket}, first: {} ({}: {})",
                    report.errors.len(),
                    failure.key,
                    failure.code,
                    failure.message
                )));
            }
            deleted += report.deleted.len();
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockall::Sequence;

    use super::*;
    use crate::lifecycle::LifecycleFilter;
    use crate::traits::{
        DeleteFailure, ListResult, MockObjectStore, ObjectInfo, ObjectVersion, VersionListResult,
    };

    fn manager(mock: MockObjectStore) -> BucketManager {
        BucketManager::new(ResourceClient::new(Arc::new(mock), "us-east-1"))
    }

    fn report_for(refs: &[ObjectRef]) -> DeleteReport {
        DeleteReport {
            deleted: refs.to_vec(),
            errors: vec![],
        }
    }

    fn is_uuid_then_stamp(suffix: &str) -> bool {
        // 36-char UUID, '-', 14 digits
        suffix.len() == 36 + 1 + 14
            && uuid::Uuid::parse_str(&suffix[..36]).is_ok()
            && &suffix[36..37] == "-"
            && suffix[37..].chars().all(|c| c.is_ascii_digit())
    }

    #[test]
    fn test_create_bucket_name_shape() {
        let name = create_bucket_name("logs");
        assert!(name.starts_with("logs-"));
        assert!(name.len() > "logs".len());
        assert!(is_uuid_then_stamp(&name["logs-".len()..]), "{name}");
    }

    #[test]
    fn test_create_bucket_name_is_unique() {
        assert_ne!(
            BucketManager::create_bucket_name("logs"),
            BucketManager::create_bucket_name("logs")
        );
    }

    #[tokio::test]
    async fn test_create_bucket_uses_generated_name() {
        let mut mock = MockObjectStore::new();
        mock.expect_create_bucket()
            .withf(|name, acl| name.starts_with("logs-") && *acl == CannedAcl::Private)
            .times(1)
            .returning(|_, _| Ok(()));

        let name = manager(mock)
            .create_bucket("logs", CannedAcl::Private)
            .await
            .unwrap();
        assert!(is_uuid_then_stamp(&name["logs-".len()..]));
    }

    #[tokio::test]
    async fn test_create_bucket_propagates_failure() {
        let mut mock = MockObjectStore::new();
        mock.expect_create_bucket()
            .returning(|name, _| Err(Error::Conflict(format!("{name} already exists"))));

        let result = manager(mock).create_bucket("logs", CannedAcl::Private).await;
        assert!(matches!(result, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_bucket_rejects_invalid_base() {
        let mut mock = MockObjectStore::new();
        mock.expect_create_bucket().never();

        let result = manager(mock)
            .create_bucket("Not_Valid", CannedAcl::Private)
            .await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_list_buckets_passes_filters() {
        let mut mock = MockObjectStore::new();
        mock.expect_list_buckets()
            .withf(|options| {
                options.max_buckets == Some(2) && options.prefix.as_deref() == Some("logs")
            })
            .returning(|_| {
                Ok(vec![
                    ObjectInfo::bucket("logs-b"),
                    ObjectInfo::bucket("logs-a"),
                ])
            });

        let names = manager(mock)
            .list_buckets(Some(2), Some("logs"))
            .await
            .unwrap();
        assert_eq!(names, vec!["logs-b", "logs-a"]);
    }

    #[tokio::test]
    async fn test_list_buckets_empty() {
        let mut mock = MockObjectStore::new();
        mock.expect_list_buckets()
            .withf(|options| options.prefix.is_none() && options.max_buckets.is_none())
            .returning(|_| Ok(vec![]));

        let names = manager(mock).list_buckets(None, Some("")).await.unwrap();
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn test_set_lifecycle_policy_missing_bucket() {
        let mut mock = MockObjectStore::new();
        mock.expect_bucket_exists().returning(|_| Ok(false));
        mock.expect_put_lifecycle_rule().never();

        let options = LifecycleOptions::new().expiration_days(30);
        let result = manager(mock).set_lifecycle_policy("gone", &options).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_set_lifecycle_policy_submits_rule() {
        let mut mock = MockObjectStore::new();
        mock.expect_bucket_exists().returning(|_| Ok(true));
        mock.expect_put_lifecycle_rule()
            .withf(|bucket, rule| {
                bucket == "data"
                    && rule.id == "expire-tmp"
                    && rule.filter == LifecycleFilter::Prefix("tmp/".into())
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let options = LifecycleOptions::new()
            .rule_id("expire-tmp")
            .prefix("tmp/")
            .expiration_days(1);
        manager(mock)
            .set_lifecycle_policy("data", &options)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_set_lifecycle_policy_invalid_options_skip_requests() {
        let mut mock = MockObjectStore::new();
        mock.expect_bucket_exists().never();
        mock.expect_put_lifecycle_rule().never();

        let result = manager(mock)
            .set_lifecycle_policy("data", &LifecycleOptions::new())
            .await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_set_lifecycle_policy_service_failure() {
        let mut mock = MockObjectStore::new();
        mock.expect_bucket_exists().returning(|_| Ok(true));
        mock.expect_put_lifecycle_rule().returning(|_, _| {
            Err(Error::Service {
                status: 501,
                code: "NotImplemented".into(),
                message: "lifecycle not supported".into(),
            })
        });

        let options = LifecycleOptions::new().expiration_days(3);
        let result = manager(mock).set_lifecycle_policy("data", &options).await;
        assert!(matches!(result, Err(Error::Service { status: 501, .. })));
    }

    #[tokio::test]
    async fn test_delete_bucket_missing_is_noop() {
        let mut mock = MockObjectStore::new();
        mock.expect_bucket_exists().returning(|_| Ok(false));
        mock.expect_delete_bucket().never();

        assert!(!manager(mock).delete_bucket("gone", true).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_bucket_without_force() {
        let mut mock = MockObjectStore::new();
        mock.expect_bucket_exists().returning(|_| Ok(true));
        mock.expect_list_objects().never();
        mock.expect_delete_objects().never();
        mock.expect_delete_bucket()
            .withf(|bucket| bucket == "data")
            .times(1)
            .returning(|_| Ok(()));

        assert!(manager(mock).delete_bucket("data", false).await.unwrap());
    }

    #[tokio::test]
    async fn test_force_delete_empties_before_deleting_bucket() {
        let mut seq = Sequence::new();
        let mut mock = MockObjectStore::new();

        mock.expect_bucket_exists()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(true));
        mock.expect_list_objects()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Ok(ListResult {
                    items: vec![ObjectInfo::file("a.txt", 1), ObjectInfo::file("b.txt", 2)],
                    truncated: false,
                    continuation_token: None,
                })
            });
        mock.expect_delete_objects()
            .withf(|_, refs| refs.len() == 2 && refs.iter().all(|r| r.version_id.is_none()))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, refs| Ok(report_for(&refs)));
        mock.expect_list_object_versions()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Ok(VersionListResult {
                    versions: vec![ObjectVersion {
                        key: "a.txt".into(),
                        version_id: "v1".into(),
                        is_latest: false,
                        is_delete_marker: true,
                        last_modified: None,
                        size_bytes: None,
                    }],
                    truncated: false,
                    next_key_marker: None,
                    next_version_id_marker: None,
                })
            });
        mock.expect_delete_objects()
            .withf(|_, refs| refs == &vec![ObjectRef::version("a.txt", "v1")])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, refs| Ok(report_for(&refs)));
        mock.expect_delete_bucket()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        assert!(manager(mock).delete_bucket("data", true).await.unwrap());
    }

    #[tokio::test]
    async fn test_force_delete_follows_pages() {
        let mut mock = MockObjectStore::new();
        mock.expect_bucket_exists().returning(|_| Ok(true));
        mock.expect_list_objects()
            .withf(|_, options| options.continuation_token.is_none())
            .times(1)
            .returning(|_, _| {
                Ok(ListResult {
                    items: vec![ObjectInfo::file("page1", 1)],
                    truncated: true,
                    continuation_token: Some("next".into()),
                })
            });
        mock.expect_list_objects()
            .withf(|_, options| options.continuation_token.as_deref() == Some("next"))
            .times(1)
            .returning(|_, _| {
                Ok(ListResult {
                    items: vec![ObjectInfo::file("page2", 1)],
                    truncated: false,
                    continuation_token: None,
                })
            });
        mock.expect_delete_objects()
            .times(2)
            .returning(|_, refs| Ok(report_for(&refs)));
        mock.expect_list_object_versions()
            .returning(|_, _| Ok(VersionListResult::default()));
        mock.expect_delete_bucket().times(1).returning(|_| Ok(()));

        assert!(manager(mock).delete_bucket("data", true).await.unwrap());
    }

    fn version(key: &str, version_id: &str) -> ObjectVersion {
        ObjectVersion {
            key: key.into(),
            version_id: version_id.into(),
            is_latest: false,
            is_delete_marker: false,
            last_modified: None,
            size_bytes: None,
        }
    }

    #[tokio::test]
    async fn test_force_delete_follows_version_markers() {
        let mut seq = Sequence::new();
        let mut mock = MockObjectStore::new();
        mock.expect_bucket_exists().returning(|_| Ok(true));
        mock.expect_list_objects().returning(|_, _| Ok(ListResult::default()));

        mock.expect_list_object_versions()
            .withf(|_, options| options.key_marker.is_none() && options.version_id_marker.is_none())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Ok(VersionListResult {
                    versions: vec![version("a.txt", "v1"), version("a.txt", "v2")],
                    truncated: true,
                    next_key_marker: Some("a.txt".into()),
                    next_version_id_marker: Some("v2".into()),
                })
            });
        mock.expect_delete_objects()
            .withf(|_, refs| {
                refs == &vec![ObjectRef::version("a.txt", "v1"), ObjectRef::version("a.txt", "v2")]
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, refs| Ok(report_for(&refs)));
        mock.expect_list_object_versions()
            .withf(|_, options| {
                options.key_marker.as_deref() == Some("a.txt")
                    && options.version_id_marker.as_deref() == Some("v2")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                Ok(VersionListResult {
                    versions: vec![version("b.txt", "v9")],
                    truncated: false,
                    next_key_marker: None,
                    next_version_id_marker: None,
                })
            });
        mock.expect_delete_objects()
            .withf(|_, refs| refs == &vec![ObjectRef::version("b.txt", "v9")])
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, refs| Ok(report_for(&refs)));
        mock.expect_delete_bucket()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        assert!(manager(mock).delete_bucket("data", true).await.unwrap());
    }

    #[tokio::test]
    async fn test_force_delete_stops_on_refused_keys() {
        let mut mock = MockObjectStore::new();
        mock.expect_bucket_exists().returning(|_| Ok(true));
        mock.expect_list_objects().returning(|_, _| {
            Ok(ListResult {
                items: vec![ObjectInfo::file("locked", 1)],
                truncated: false,
                continuation_token: None,
            })
        });
        mock.expect_delete_objects().returning(|_, _| {
            Ok(DeleteReport {
                deleted: vec![],
                errors: vec![DeleteFailure {
                    key: "locked".into(),
                    version_id: None,
                    code: "AccessDenied".into(),
                    message: "retention".into(),
                }],
            })
        });
        mock.expect_delete_bucket().never();

        let result = manager(mock).delete_bucket("data", true).await;
        assert!(matches!(result, Err(Error::Conflict(_))));
    }
}
