use crate::config::Storage;
use crate::error::ObjectStorageError;
use crate::photos::{PhotoHost, PhotoUpload};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use sha2::{Digest, Sha256};

/// S3-compatible bucket that serves as the photo host.
pub struct ObjectStorage {
    pub client: Client,
    bucket: String,
    service: String,
}

impl ObjectStorage {
    pub async fn new(cfg: &Storage) -> Result<Self, ObjectStorageError> {
        let credentials = Credentials::new(
            &cfg.aws_access_key_id,
            &cfg.aws_secret_access_key,
            None,
            None,
            "config",
        );

        let config = aws_config::from_env()
            .region(aws_config::Region::new(cfg.aws_region.clone()))
            .endpoint_url(&cfg.aws_endpoint_url_s3)
            .credentials_provider(credentials)
            .load()
            .await;

        let client = Client::new(&config);

        Ok(Self {
            client,
            bucket: cfg.bucket.clone(),
            service: cfg.service.clone(),
        })
    }

    /// Photos are content addressed, so re-uploading the same bytes lands on the same key.
    pub fn photo_key(upload: &PhotoUpload) -> String {
        let digest = Sha256::digest(&upload.data);
        let signature = hex::encode(&digest[..8]);
        let file_name = upload.file_name.rsplit(['/', '\\']).next().unwrap_or_default();

        format!("photos/{}_{}", signature, file_name)
    }

    pub async fn put(&self, key: &str, content_type: &str, data: Vec<u8>) -> Result<String, ObjectStorageError> {
        tracing::info!(key, bytes = data.len(), "uploading photo");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(data.into())
            .send()
            .await
            .map_err(|e| ObjectStorageError::S3Error(Box::new(e)))?;

        let path = key.split('/').map(urlencoding::encode).collect::<Vec<_>>().join("/");
        Ok(crate::get_s3_url(&self.service, &self.bucket, &path))
    }
}

#[async_trait]
impl PhotoHost for ObjectStorage {
    async fn put_photo(&self, upload: &PhotoUpload) -> Result<String, ObjectStorageError> {
        let key = Self::photo_key(upload);
        self.put(&key, &upload.content_type, upload.data.clone()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_keys_are_content_addressed() {
        let a = PhotoUpload::new("front.jpg", Some("image/jpeg"), vec![1, 2, 3]);
        let b = PhotoUpload::new("front.jpg", Some("image/jpeg"), vec![1, 2, 3]);
        let c = PhotoUpload::new("front.jpg", Some("image/jpeg"), vec![3, 2, 1]);

        assert_eq!(ObjectStorage::photo_key(&a), ObjectStorage::photo_key(&b));
        assert_ne!(ObjectStorage::photo_key(&a), ObjectStorage::photo_key(&c));

        let key = ObjectStorage::photo_key(&a);
        assert!(key.starts_with("photos/"));
        assert!(key.ends_with("_front.jpg"));
        // 16 hex chars of signature between the prefix and the name
        assert_eq!(key.len(), "photos/".len() + 16 + "_front.jpg".len());
    }

    #[test]
    fn photo_keys_drop_client_side_directories() {
        let upload = PhotoUpload::new("C:\\Users\\me\\my car (1).png", None, vec![9]);
        let key = ObjectStorage::photo_key(&upload);
        assert!(key.ends_with("_my car (1).png"), "{key}");
        assert!(!key.contains("Users"));
    }
}
