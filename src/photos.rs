//! Batch photo uploads.
//!
//! Every photo in a batch is pushed to the host concurrently. The batch never
//! fails because one photo did: the caller gets back the URLs that made it and
//! a list of the ones that did not.

use async_trait::async_trait;
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ApiError, ObjectStorageError};
use crate::model::check_picture_count;

#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl PhotoUpload {
    /// Falls back to guessing from the file extension when the sender gave no content type.
    pub fn new(file_name: &str, content_type: Option<&str>, data: Vec<u8>) -> Self {
        let content_type = match content_type {
            Some(ct) if !ct.is_empty() => ct.to_string(),
            _ => mime_guess::from_path(file_name).first_or_octet_stream().to_string(),
        };

        Self {
            file_name: file_name.to_string(),
            content_type,
            data,
        }
    }

    fn check(&self) -> Result<(), ObjectStorageError> {
        if !self.content_type.starts_with("image/") {
            return Err(ObjectStorageError::InvalidContentType(self.content_type.clone()));
        }
        if self.data.is_empty() {
            return Err(ObjectStorageError::EmptyUpload(self.file_name.clone()));
        }
        Ok(())
    }
}

/// Anything that can durably store a photo and hand back a URL for it.
#[async_trait]
pub trait PhotoHost: Send + Sync {
    async fn put_photo(&self, upload: &PhotoUpload) -> Result<String, ObjectStorageError>;
}

pub type SharedPhotoHost = Arc<dyn PhotoHost>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFailure {
    pub file_name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub uploaded: Vec<String>,
    pub failed: Vec<UploadFailure>,
}

/// Uploads a batch on top of `already_attached` photos.
///
/// The cap is checked for the whole batch up front; once it passes, individual
/// failures are collected instead of aborting the rest. Successful URLs keep
/// the order the photos were submitted in.
pub async fn upload_all<H: PhotoHost + ?Sized>(
    host: &H,
    already_attached: usize,
    uploads: Vec<PhotoUpload>,
) -> Result<UploadOutcome, ApiError> {
    if uploads.is_empty() {
        return Err(ApiError::Validation("No photos in request".to_string()));
    }
    check_picture_count(already_attached.saturating_add(uploads.len()))?;

    let results = join_all(uploads.iter().map(|upload| async move {
        match upload.check() {
            Ok(()) => host.put_photo(upload).await,
            Err(e) => Err(e),
        }
    }))
    .await;

    let mut outcome = UploadOutcome::default();
    for (upload, result) in uploads.iter().zip(results) {
        match result {
            Ok(url) => outcome.uploaded.push(url),
            Err(e) => {
                tracing::warn!(file = %upload.file_name, error = %e, "photo upload failed");
                outcome.failed.push(UploadFailure {
                    file_name: upload.file_name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        uploaded = outcome.uploaded.len(),
        failed = outcome.failed.len(),
        "photo batch finished"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails any file whose name starts with "bad", and counts calls.
    #[derive(Default)]
    struct FlakyHost {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PhotoHost for FlakyHost {
        async fn put_photo(&self, upload: &PhotoUpload) -> Result<String, ObjectStorageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if upload.file_name.starts_with("bad") {
                return Err(ObjectStorageError::S3Error("connection reset".into()));
            }
            Ok(format!("https://cdn.example/{}", upload.file_name))
        }
    }

    fn jpeg(name: &str) -> PhotoUpload {
        PhotoUpload::new(name, Some("image/jpeg"), vec![0xff, 0xd8, 0xff])
    }

    #[tokio::test]
    async fn partitions_successes_and_failures() {
        let host = FlakyHost::default();
        let batch = vec![jpeg("a.jpg"), jpeg("bad.jpg"), jpeg("b.jpg")];

        let outcome = upload_all(&host, 0, batch).await.unwrap();

        assert_eq!(
            outcome.uploaded,
            vec!["https://cdn.example/a.jpg", "https://cdn.example/b.jpg"]
        );
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].file_name, "bad.jpg");
        assert!(outcome.failed[0].reason.contains("connection reset"));
    }

    #[tokio::test]
    async fn cap_counts_already_attached_photos() {
        let host = FlakyHost::default();
        let batch = vec![jpeg("a.jpg"), jpeg("b.jpg")];

        let err = upload_all(&host, 9, batch).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(host.calls.load(Ordering::SeqCst), 0);

        let outcome = upload_all(&host, 8, vec![jpeg("a.jpg"), jpeg("b.jpg")]).await.unwrap();
        assert_eq!(outcome.uploaded.len(), 2);
    }

    #[tokio::test]
    async fn absurd_attached_count_is_rejected_not_wrapped() {
        let host = FlakyHost::default();

        let err = upload_all(&host, usize::MAX, vec![jpeg("a.jpg")]).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(host.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_batch_is_rejected() {
        let host = FlakyHost::default();
        assert!(matches!(upload_all(&host, 0, vec![]).await, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn non_images_never_reach_the_host() {
        let host = FlakyHost::default();
        let batch = vec![
            PhotoUpload::new("notes.txt", Some("text/plain"), b"hello".to_vec()),
            PhotoUpload::new("empty.png", None, vec![]),
            jpeg("ok.jpg"),
        ];

        let outcome = upload_all(&host, 0, batch).await.unwrap();
        assert_eq!(outcome.uploaded, vec!["https://cdn.example/ok.jpg"]);
        assert_eq!(outcome.failed.len(), 2);
        assert_eq!(host.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn content_type_is_guessed_from_extension() {
        assert_eq!(PhotoUpload::new("car.png", None, vec![1]).content_type, "image/png");
        assert_eq!(PhotoUpload::new("car.jpg", Some(""), vec![1]).content_type, "image/jpeg");
        assert_eq!(
            PhotoUpload::new("car", None, vec![1]).content_type,
            "application/octet-stream"
        );
    }
}
