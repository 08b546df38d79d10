//! Media storage capability.
//!
//! The HTTP layer only needs two things from object storage: a listing of the
//! available objects and a time-limited URL for one of them. [`MediaStore`] is
//! that seam; [`s3::S3Store`] implements it against S3-compatible endpoints.

pub mod keys;
pub mod s3;
pub mod sigv4;

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;

pub use self::keys::{file_name, format_file_size, is_valid_video_key};

/// Lifetime of presigned URLs.
pub const PRESIGNED_URL_TTL_SECONDS: u64 = 3600;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("storage responded with status {0}")]
    Status(u16),
    #[error("malformed listing: {0}")]
    Listing(String),
    #[error("signing failed: {0}")]
    Signing(String),
    #[error("invalid storage configuration: {0}")]
    Config(String),
}

/// One object as reported by the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaObject {
    pub key: String,
    pub size: u64,
    pub last_modified: OffsetDateTime,
}

/// How the presigned URL should be served.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Every object in the bucket, unfiltered.
    async fn list_objects(&self) -> Result<Vec<MediaObject>, StorageError>;

    /// A GET URL for `key` valid for [`PRESIGNED_URL_TTL_SECONDS`].
    fn presigned_url(&self, key: &str, disposition: Disposition) -> Result<String, StorageError>;
}

/// Video objects only, newest first.
///
/// # Errors
/// Propagates listing failures from the store.
pub async fn list_videos(store: &dyn MediaStore) -> Result<Vec<MediaObject>, StorageError> {
    let mut videos: Vec<MediaObject> = store
        .list_objects()
        .await?
        .into_iter()
        .filter(|object| keys::has_video_extension(&object.key))
        .collect();
    videos.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
    Ok(videos)
}
