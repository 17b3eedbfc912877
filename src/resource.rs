//! Pass-through upload into the portal's object storage.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{config, Admin, Error, Global};

#[derive(Deserialize)]
pub struct UploadParams {
    pub filename: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UploadResult {
    pub path: String,
    pub public_url: String,
}

/// Store a user-supplied file and hand back its public URL.
pub async fn upload(
    State(state): State<Global>,
    admin: Admin,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResult>, Error> {
    let content_type = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(mime::APPLICATION_OCTET_STREAM.as_ref())
        .to_string();

    let key = object_key(&params.filename, Utc::now().timestamp_millis());
    let bucket = &config::INSTANCE.service.storage_bucket;

    let stored = state
        .provider
        .upload_object(
            &admin.session.access_token,
            bucket,
            &key,
            &content_type,
            body.to_vec(),
        )
        .await?;

    let public_url = state.provider.public_url(bucket, &stored.path);
    tracing::info!("{} uploaded {}", admin.session.email, stored.path);

    Ok(Json(UploadResult {
        path: stored.path,
        public_url,
    }))
}

/// Unique object key: millisecond timestamp plus the filename with
/// whitespace collapsed to underscores.
fn object_key(filename: &str, timestamp_millis: i64) -> String {
    let sanitized = filename.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{timestamp_millis}_{sanitized}")
}
