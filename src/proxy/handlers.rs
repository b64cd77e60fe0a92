//! Handler functions for the proxy routes.
//!
//! Each handler borrows the shared [`SxmClient`] from router state, performs
//! the upstream call, and re-shapes the result for a local HLS player.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use regex::Regex;

use crate::core::client::SxmClient;
use crate::domain::model::Bitrate;
use crate::utils::error::{ErrorCategory, SxmError};

/// Wrapper mapping [`SxmError`] onto HTTP responses.
pub struct ProxyError(SxmError);

impl From<SxmError> for ProxyError {
    fn from(err: SxmError) -> Self {
        ProxyError(err)
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match self.0.category() {
            ErrorCategory::Network
            | ErrorCategory::Authentication
            | ErrorCategory::Contract => StatusCode::BAD_GATEWAY,
            ErrorCategory::Configuration | ErrorCategory::Io => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::error!("Proxy request failed: {}", self.0);
        (
            status,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

/// Get the channels available to the user.
pub async fn get_channels(State(client): State<SxmClient>) -> Result<Response, ProxyError> {
    let channels = client.get_channels().await?;
    Ok(Json(channels).into_response())
}

/// Get the user's library.
pub async fn get_library(State(client): State<SxmClient>) -> Result<Response, ProxyError> {
    let library = client.get_library().await?;
    Ok(Json(library).into_response())
}

/// Get a stream playlist, with its key URI pointed back at this proxy.
pub async fn get_playlist(
    State(client): State<SxmClient>,
    Path((entity_type, entity_id)): Path<(String, String)>,
) -> Result<Response, ProxyError> {
    // Re-tune so the playlist carries fresh signed segment URLs.
    let stream = client.tune(&entity_type, &entity_id).await?;
    let playlist = stream.get_playlist(Bitrate::default()).await?;
    let proxied = rewrite_key_uri(&playlist, &entity_type, &entity_id);
    Ok((
        [(header::CONTENT_TYPE, "application/x-mpegURL")],
        proxied,
    )
        .into_response())
}

/// Get a stream decryption key.
pub async fn get_key(
    State(client): State<SxmClient>,
    Path((entity_type, entity_id)): Path<(String, String)>,
) -> Result<Response, ProxyError> {
    let stream = client.get_stream(&entity_type, &entity_id).await?;
    let key = stream.get_key().await?;
    let decoded = BASE64.decode(&key.key).map_err(SxmError::from)?;
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        decoded,
    )
        .into_response())
}

/// Get a playlist segment. Only `.aac` segment names are served.
pub async fn get_segment(
    State(client): State<SxmClient>,
    Path((entity_type, entity_id, segment_file)): Path<(String, String, String)>,
) -> Result<Response, ProxyError> {
    if !segment_file.ends_with(".aac") {
        return Ok(StatusCode::NOT_FOUND.into_response());
    }
    let stream = client.get_stream(&entity_type, &entity_id).await?;
    let segment = stream.get_segment(&segment_file, Bitrate::default()).await?;
    Ok(([(header::CONTENT_TYPE, "audio/aac")], segment).into_response())
}

/// Replace the upstream `EXT-X-KEY` URI with this proxy's key route, so
/// players never see (or need credentials for) the edge gateway.
fn rewrite_key_uri(playlist: &str, entity_type: &str, entity_id: &str) -> String {
    let re = Regex::new(r#"#EXT-X-KEY:METHOD=AES-128,URI="(.+?)""#).unwrap();
    let replacement = format!(
        r#"#EXT-X-KEY:METHOD=AES-128,URI="/stream/{}/{}/key""#,
        entity_type, entity_id
    );
    re.replace_all(playlist, replacement.as_str()).to_string()
}
