use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    presigning::PresigningConfig,
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::StorageConfig;

/// Lifetime of links handed out for meal photos.
pub const PHOTO_URL_TTL_SECS: u64 = 30 * 60;

/// Object storage for meal photos.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    async fn delete_object(&self, key: &str) -> anyhow::Result<()>;
    async fn presign_get(&self, key: &str, seconds: u64) -> anyhow::Result<String>;
}

/// Meal photos in an S3-compatible bucket (MinIO in development).
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    pub async fn connect(cfg: &StorageConfig) -> anyhow::Result<Self> {
        let creds = Credentials::new(&cfg.access_key, &cfg.secret_key, None, None, "platewise-env");
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(creds)
            .endpoint_url(&cfg.endpoint)
            .load()
            .await;

        // MinIO serves buckets by path, not by virtual host
        let conf = S3ConfigBuilder::from(&shared).force_path_style(true).build();

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
        })
    }

    /// Create the photo bucket on first start against an empty MinIO.
    pub async fn ensure_bucket(&self) -> anyhow::Result<()> {
        if self.client.head_bucket().bucket(&self.bucket).send().await.is_ok() {
            return Ok(());
        }
        self.client
            .create_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .with_context(|| format!("create bucket {}", self.bucket))?;
        info!(bucket = %self.bucket, "photo bucket created");
        Ok(())
    }
}

/// Photos are only ever reached through presigned links, so caches may keep
/// them private for as long as such a link lives.
pub fn photo_cache_control() -> String {
    format!("private, max-age={PHOTO_URL_TTL_SECS}")
}

#[async_trait]
impl StorageClient for S3Storage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .cache_control(photo_cache_control())
            .send()
            .await
            .with_context(|| format!("upload photo {key}"))?;
        debug!(%key, size, "photo stored");
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("delete photo {key}"))?;
        debug!(%key, "photo deleted");
        Ok(())
    }

    async fn presign_get(&self, key: &str, seconds: u64) -> anyhow::Result<String> {
        let expiry = PresigningConfig::expires_in(Duration::from_secs(seconds))?;
        let link = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(expiry)
            .await
            .with_context(|| format!("presign photo {key}"))?;
        Ok(link.uri().to_string())
    }
}

/// File extension for the image types accepted on upload.
pub fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

/// Object key a meal photo is stored under.
pub fn photo_key(meal_id: Uuid, content_type: &str) -> Option<String> {
    ext_from_mime(content_type).map(|ext| format!("meals/{meal_id}.{ext}"))
}

/// Whether `image_ref` is the key `photo_key` produced for this meal.
/// Anything else (client URLs, other meals' keys) is not ours to touch.
pub fn owns_photo(meal_id: Uuid, image_ref: &str) -> bool {
    let Some((stem, ext)) = image_ref
        .strip_prefix("meals/")
        .and_then(|rest| rest.rsplit_once('.'))
    else {
        return false;
    };
    stem.parse::<Uuid>().is_ok_and(|id| id == meal_id)
        && ["jpg", "png", "gif", "webp"].contains(&ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/jpg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/gif"), Some("gif"));
        assert_eq!(ext_from_mime("image/webp"), Some("webp"));
        assert_eq!(ext_from_mime("image/heic"), None);
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[test]
    fn photo_keys() {
        let id = Uuid::nil();
        assert_eq!(
            photo_key(id, "image/png").as_deref(),
            Some("meals/00000000-0000-0000-0000-000000000000.png")
        );
        assert_eq!(photo_key(id, "text/plain"), None);
    }

    #[test]
    fn photo_cache_matches_link_lifetime() {
        assert_eq!(photo_cache_control(), "private, max-age=1800");
    }

    #[test]
    fn photo_ownership() {
        let id = Uuid::new_v4();
        let other = Uuid::new_v4();
        let key = photo_key(id, "image/webp").unwrap();
        assert!(owns_photo(id, &key));
        assert!(!owns_photo(other, &key));
        assert!(!owns_photo(id, &format!("meals/{id}.exe")));
        assert!(!owns_photo(id, &format!("meals/{id}/../{other}.png")));
        assert!(!owns_photo(id, "https://cdn.example.com/x.png"));
        assert!(!owns_photo(id, ""));
    }
}
