//! services/api/src/adapters/storage.rs
//!
//! S3-compatible blob storage adapter implementing the `MediaStorageService`
//! port. The platform never reads media back; it only persists the public
//! URL this adapter returns.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use learnhub_core::ports::{MediaStorageService, PortError, PortResult};
use uuid::Uuid;

#[derive(Clone)]
pub struct S3MediaStorage {
    client: S3Client,
    bucket: String,
    public_base_url: String,
}

impl S3MediaStorage {
    pub fn new(client: S3Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url,
        }
    }
}

/// Joins a public base URL, bucket, and key. Supports custom S3-compatible
/// endpoints whose base already includes the bucket.
pub fn build_public_url(base: &str, bucket: &str, key: &str) -> String {
    let trimmed = base.trim_end_matches('/');
    if trimmed.contains("{bucket}") || trimmed.contains("{key}") {
        return trimmed.replace("{bucket}", bucket).replace("{key}", key);
    }
    if trimmed.contains(bucket) {
        format!("{}/{}", trimmed, key)
    } else {
        format!("{}/{}/{}", trimmed, bucket, key)
    }
}

#[async_trait]
impl MediaStorageService for S3MediaStorage {
    async fn store(
        &self,
        path: &str,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> PortResult<String> {
        // Uuid prefix keeps repeated uploads of the same filename distinct.
        let key = format!("{}/{}-{}", path, Uuid::new_v4(), file_name);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| PortError::Transient(format!("upload failed: {e}")))?;

        Ok(build_public_url(&self.public_base_url, &self.bucket, &key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_base_appends_bucket_and_key() {
        assert_eq!(
            build_public_url("https://s3.example.com", "media", "uploads/a.mp4"),
            "https://s3.example.com/media/uploads/a.mp4"
        );
    }

    #[test]
    fn base_containing_bucket_appends_key_only() {
        assert_eq!(
            build_public_url("https://media.s3.example.com/", "media", "uploads/a.mp4"),
            "https://media.s3.example.com/uploads/a.mp4"
        );
    }

    #[test]
    fn templated_base_is_expanded() {
        assert_eq!(
            build_public_url("https://cdn.example.com/{bucket}/{key}", "media", "a.mp4"),
            "https://cdn.example.com/media/a.mp4"
        );
    }
}
