//! Video listing and presigned playback/download URLs.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::{format_description::BorrowedFormatItem, macros::format_description, UtcOffset};
use tracing::{error, instrument, warn};
use utoipa::{IntoParams, ToSchema};

use super::{error_response, ErrorResponse};
use crate::storage::{
    self, file_name, format_file_size, is_valid_video_key, Disposition, MediaObject, MediaStore,
};

const ISO_MILLIS: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
);

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub key: String,
    pub name: String,
    /// Human-readable size, e.g. `1.5 GB`.
    pub size: String,
    pub size_bytes: u64,
    pub last_modified: String,
}

impl Video {
    fn from_object(object: MediaObject) -> Self {
        let last_modified = object
            .last_modified
            .to_offset(UtcOffset::UTC)
            .format(ISO_MILLIS)
            .unwrap_or_default();
        Self {
            name: file_name(&object.key).to_string(),
            size: format_file_size(object.size),
            size_bytes: object.size,
            last_modified,
            key: object.key,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VideoUrlResponse {
    pub url: String,
}

#[derive(IntoParams, Deserialize, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct VideoUrlQuery {
    /// `true` returns a URL that downloads instead of streaming.
    pub download: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/videos",
    responses(
        (status = 200, description = "Video files, newest first", body = [Video]),
        (status = 500, description = "Listing failed", body = ErrorResponse)
    ),
    tag = "videos"
)]
#[instrument(skip_all)]
pub async fn list(store: Extension<Arc<dyn MediaStore>>) -> Response {
    match storage::list_videos(store.0.as_ref()).await {
        Ok(objects) => {
            let videos: Vec<Video> = objects.into_iter().map(Video::from_object).collect();
            (StatusCode::OK, Json(videos)).into_response()
        }
        Err(err) => {
            error!("Error listing videos: {err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to list videos")
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/videos/{key}/url",
    params(
        ("key" = String, Path, description = "URL-encoded object key"),
        VideoUrlQuery
    ),
    responses(
        (status = 200, description = "Presigned URL valid for one hour", body = VideoUrlResponse),
        (status = 400, description = "Key rejected", body = ErrorResponse),
        (status = 500, description = "URL could not be signed", body = ErrorResponse)
    ),
    tag = "videos"
)]
#[instrument(skip_all)]
pub async fn url(
    Path(key): Path<String>,
    Query(query): Query<VideoUrlQuery>,
    store: Extension<Arc<dyn MediaStore>>,
) -> Response {
    if !is_valid_video_key(&key) {
        warn!("rejected video key");
        return error_response(StatusCode::BAD_REQUEST, "Invalid video key");
    }

    let disposition = if query.download.as_deref() == Some("true") {
        Disposition::Attachment
    } else {
        Disposition::Inline
    };

    match store.presigned_url(&key, disposition) {
        Ok(url) => (StatusCode::OK, Json(VideoUrlResponse { url })).into_response(),
        Err(err) => {
            error!("Error generating pre-signed URL: {err}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate URL")
        }
    }
}
