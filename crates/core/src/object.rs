//! Object operations within one bound bucket

use std::path::Path;

use crate::bucket::BucketManager;
use crate::error::{Error, Result};
use crate::path::{format_path, object_key_for};
use crate::resource::ResourceClient;
use crate::traits::{CannedAcl, DownloadOptions, ListOptions, ObjectInfo, UploadOptions};

/// Largest page a single list request returns
const MAX_LIST_PAGE: i32 = 1000;

/// Upload, download, delete and list objects in one bucket
#[derive(Debug, Clone)]
pub struct ObjectManager {
    resource: ResourceClient,
    bucket: String,
}

impl ObjectManager {
    /// Bind to an existing bucket; a missing bucket is [`Error::NotFound`]
    pub async fn open(resource: ResourceClient, bucket: impl Into<String>) -> Result<Self> {
        let bucket = bucket.into();
        if !resource.bucket_exists(&bucket).await? {
            return Err(Error::NotFound(format!("bucket {bucket}")));
        }
        Ok(Self { resource, bucket })
    }

    /// Bind to `bucket`, creating it under exactly that name if it is missing
    pub async fn open_or_create(
        resource: ResourceClient,
        bucket: impl Into<String>,
        acl: CannedAcl,
    ) -> Result<Self> {
        let bucket = bucket.into();
        if !resource.bucket_exists(&bucket).await? {
            tracing::warn!(bucket, "Bucket doesn't exist, creating it");
            BucketManager::new(resource.clone())
                .create_named_bucket(&bucket, acl)
                .await?;
        }
        Ok(Self { resource, bucket })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// `s3://bucket/key`, or the bucket root
    pub fn uri(&self, key: Option<&str>) -> String {
        format_path(&self.bucket, key)
    }

    /// Upload a local file.
    ///
    /// The key defaults to the file's base name.
    pub async fn upload_file(
        &self,
        local_path: &Path,
        object_name: Option<&str>,
        options: UploadOptions,
    ) -> Result<ObjectInfo> {
        let key = match object_name.filter(|k| !k.is_empty()) {
            Some(k) => k.to_string(),
            None => object_key_for(local_path)?,
        };

        if !local_path.is_file() {
            return Err(Error::InvalidPath(format!(
                "'{}' is not a readable file",
                local_path.display()
            )));
        }

        let info = self
            .resource
            .store()
            .upload_file(&self.bucket, &key, local_path, options)
            .await
            .inspect_err(|e| {
                tracing::warn!(bucket = %self.bucket, key, error = %e, "Error uploading file");
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key,
            size = info.size_bytes,
            "File uploaded"
        );
        Ok(info)
    }

    /// Download an object to a local path
    pub async fn download_file(
        &self,
        object_name: &str,
        download_path: &Path,
        options: DownloadOptions,
    ) -> Result<ObjectInfo> {
        if object_name.is_empty() {
            return Err(Error::InvalidArgument("object name cannot be empty".into()));
        }

        let info = self
            .resource
            .store()
            .download_file(&self.bucket, object_name, download_path, options)
            .await
            .inspect_err(|e| {
                tracing::warn!(bucket = %self.bucket, key = object_name, error = %e, "Error downloading file");
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = object_name,
            path = %download_path.display(),
            "File downloaded"
        );
        Ok(info)
    }

    /// Delete one object
    pub async fn delete_object(&self, key: &str) -> Result<()> {
        if key.is_empty() {
            return Err(Error::InvalidArgument("object key cannot be empty".into()));
        }

        self.resource
            .store()
            .delete_object(&self.bucket, key)
            .await
            .inspect_err(|e| {
                tracing::warn!(bucket = %self.bucket, key, error = %e, "Error deleting object");
            })?;

        tracing::info!(bucket = %self.bucket, key, "Object deleted");
        Ok(())
    }

    /// List objects, optionally under a prefix and capped at `max_keys`.
    ///
    /// Pages are followed until the cap is reached or the listing ends.
    /// A cap of 0 means no cap.
    pub async fn list_objects(
        &self,
        prefix: Option<&str>,
        max_keys: Option<usize>,
    ) -> Result<Vec<ObjectInfo>> {
        let max_keys = max_keys.filter(|max| *max > 0);
        let mut items = Vec::new();
        let mut options = ListOptions {
            prefix: prefix.filter(|p| !p.is_empty()).map(str::to_string),
            ..Default::default()
        };

        loop {
            let remaining = max_keys.map(|max| max.saturating_sub(items.len()));
            if remaining == Some(0) {
                break;
            }
            options.max_keys = Some(
                remaining
                    .map(|r| r.min(MAX_LIST_PAGE as usize) as i32)
                    .unwrap_or(MAX_LIST_PAGE),
            );

            let page = self
                .resource
                .store()
                .list_objects(&self.bucket, options.clone())
                .await
                .inspect_err(|e| {
                    tracing::warn!(bucket = %self.bucket, error = %e, "Error listing objects");
                })?;
            items.extend(page.items);

            match page.continuation_token {
                Some(token) if page.truncated => options.continuation_token = Some(token),
                _ => break,
            }
        }

        if let Some(max) = max_keys {
            items.truncate(max);
        }

        tracing::debug!(bucket = %self.bucket, count = items.len(), "Listed objects");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::TempDir;

    use super::*;
    use crate::traits::{ListResult, MockObjectStore};

    fn resource(mock: MockObjectStore) -> ResourceClient {
        ResourceClient::new(Arc::new(mock), "us-east-1")
    }

    fn existing_bucket() -> MockObjectStore {
        let mut mock = MockObjectStore::new();
        mock.expect_bucket_exists().returning(|_| Ok(true));
        mock
    }

    #[tokio::test]
    async fn test_open_missing_bucket() {
        let mut mock = MockObjectStore::new();
        mock.expect_bucket_exists().returning(|_| Ok(false));
        mock.expect_create_bucket().never();

        let result = ObjectManager::open(resource(mock), "gone").await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_open_or_create_uses_requested_name() {
        let mut mock = MockObjectStore::new();
        mock.expect_bucket_exists().returning(|_| Ok(false));
        mock.expect_create_bucket()
            .withf(|name, _| name == "uploads")
            .times(1)
            .returning(|_, _| Ok(()));

        let manager = ObjectManager::open_or_create(resource(mock), "uploads", CannedAcl::Private)
            .await
            .unwrap();
        assert_eq!(manager.bucket(), "uploads");
        assert_eq!(manager.uri(Some("a.txt")), "s3://uploads/a.txt");
    }

    #[tokio::test]
    async fn test_open_or_create_existing_bucket() {
        let mut mock = existing_bucket();
        mock.expect_create_bucket().never();

        let manager = ObjectManager::open_or_create(resource(mock), "uploads", CannedAcl::Private)
            .await
            .unwrap();
        assert_eq!(manager.uri(None), "s3://uploads/");
    }

    #[tokio::test]
    async fn test_upload_defaults_key_to_base_name() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("report.csv");
        std::fs::write(&file, b"a,b\n1,2\n").unwrap();

        let mut mock = existing_bucket();
        mock.expect_upload_file()
            .withf(|bucket, key, _, _| bucket == "data" && key == "report.csv")
            .times(1)
            .returning(|_, key, _, _| Ok(ObjectInfo::file(key, 8)));

        let manager = ObjectManager::open(resource(mock), "data").await.unwrap();
        let info = manager
            .upload_file(&file, None, UploadOptions::default())
            .await
            .unwrap();
        assert_eq!(info.key, "report.csv");
    }

    #[tokio::test]
    async fn test_upload_with_explicit_key_and_options() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("report.csv");
        std::fs::write(&file, b"x").unwrap();

        let mut mock = existing_bucket();
        mock.expect_upload_file()
            .withf(|_, key, _, options| {
                key == "archive/2024.csv" && options.content_type.as_deref() == Some("text/csv")
            })
            .times(1)
            .returning(|_, key, _, _| Ok(ObjectInfo::file(key, 1)));

        let manager = ObjectManager::open(resource(mock), "data").await.unwrap();
        let options = UploadOptions {
            content_type: Some("text/csv".into()),
            ..Default::default()
        };
        manager
            .upload_file(&file, Some("archive/2024.csv"), options)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let mut mock = existing_bucket();
        mock.expect_upload_file().never();

        let manager = ObjectManager::open(resource(mock), "data").await.unwrap();
        let result = manager
            .upload_file(Path::new("/nonexistent/file.bin"), None, UploadOptions::default())
            .await;
        assert!(matches!(result, Err(Error::InvalidPath(_))));
    }

    #[tokio::test]
    async fn test_download_propagates_not_found() {
        let mut mock = existing_bucket();
        mock.expect_download_file()
            .returning(|_, key, _, _| Err(Error::NotFound(key.to_string())));

        let manager = ObjectManager::open(resource(mock), "data").await.unwrap();
        let result = manager
            .download_file("missing", Path::new("/tmp/out"), DownloadOptions::default())
            .await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_object() {
        let mut mock = existing_bucket();
        mock.expect_delete_object()
            .withf(|bucket, key| bucket == "data" && key == "old.log")
            .times(1)
            .returning(|_, _| Ok(()));

        let manager = ObjectManager::open(resource(mock), "data").await.unwrap();
        manager.delete_object("old.log").await.unwrap();
        assert!(matches!(
            manager.delete_object("").await,
            Err(Error::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_list_objects_empty() {
        let mut mock = existing_bucket();
        mock.expect_list_objects()
            .returning(|_, _| Ok(ListResult::default()));

        let manager = ObjectManager::open(resource(mock), "data").await.unwrap();
        assert!(manager.list_objects(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_objects_zero_cap_lists_everything() {
        let mut mock = existing_bucket();
        mock.expect_list_objects()
            .withf(|_, options| options.max_keys == Some(MAX_LIST_PAGE))
            .times(1)
            .returning(|_, _| {
                Ok(ListResult {
                    items: vec![ObjectInfo::file("a", 1), ObjectInfo::file("b", 1)],
                    truncated: false,
                    continuation_token: None,
                })
            });

        let manager = ObjectManager::open(resource(mock), "data").await.unwrap();
        let items = manager.list_objects(None, Some(0)).await.unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_list_objects_respects_cap_across_pages() {
        let mut mock = existing_bucket();
        mock.expect_list_objects()
            .withf(|_, options| {
                options.continuation_token.is_none()
                    && options.max_keys == Some(3)
                    && options.prefix.as_deref() == Some("logs/")
            })
            .times(1)
            .returning(|_, _| {
                Ok(ListResult {
                    items: vec![ObjectInfo::file("logs/1", 1), ObjectInfo::file("logs/2", 1)],
                    truncated: true,
                    continuation_token: Some("t1".into()),
                })
            });
        mock.expect_list_objects()
            .withf(|_, options| {
                options.continuation_token.as_deref() == Some("t1") && options.max_keys == Some(1)
            })
            .times(1)
            .returning(|_, _| {
                Ok(ListResult {
                    items: vec![ObjectInfo::file("logs/3", 1)],
                    truncated: true,
                    continuation_token: Some("t2".into()),
                })
            });

        let manager = ObjectManager::open(resource(mock), "data").await.unwrap();
        let items = manager.list_objects(Some("logs/"), Some(3)).await.unwrap();
        let keys: Vec<_> = items.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["logs/1", "logs/2", "logs/3"]);
    }
}
