//! HTTP proxy exposing the SiriusXM catalog and HLS streams to local players.
//!
//! The router shares one connected [`SxmClient`]; playlists are rewritten so
//! key lookups come back through the proxy, and segments/keys are fetched
//! with the client's session.

pub mod handlers;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::core::client::SxmClient;

pub fn router(client: SxmClient) -> Router {
    Router::new()
        .route("/channels", get(handlers::get_channels))
        .route("/library", get(handlers::get_library))
        .route(
            "/stream/:entity_type/:entity_id/playlist.m3u8",
            get(handlers::get_playlist),
        )
        .route("/stream/:entity_type/:entity_id/key", get(handlers::get_key))
        .route(
            "/stream/:entity_type/:entity_id/:segment_file",
            get(handlers::get_segment),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(client)
}
