//! Support for streaming audio from SiriusXM.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::core::client::SxmClient;
use crate::core::consts::{LINEAR_CHANNEL_KEY_ID, LINEAR_CHANNEL_TYPE};
use crate::domain::model::{Bitrate, PlaybackKey, TuneSource};
use crate::utils::error::{Result, SxmError};

/// Immutable state captured when an entity is tuned: the stream id, the
/// master playlist location, and the per-bitrate variant URLs found in it.
pub(crate) struct StreamState {
    pub entity_type: String,
    pub entity_id: String,
    pub stream_id: String,
    pub base_url: String,
    pub variants: HashMap<Bitrate, String>,
}

/// A stream from SiriusXM.
#[derive(Clone)]
pub struct SxmStream {
    client: SxmClient,
    state: Arc<StreamState>,
}

impl SxmClient {
    /// The stream for an entity, tuning it first if it is not cached.
    pub async fn get_stream(&self, entity_type: &str, entity_id: &str) -> Result<SxmStream> {
        if let Some(state) = self.cached_stream(entity_type, entity_id).await {
            return Ok(SxmStream {
                client: self.clone(),
                state,
            });
        }
        self.tune(entity_type, entity_id).await
    }

    /// Tune an entity, replacing any cached stream. Tuning re-signs the
    /// short-lived playlist URLs, so players re-requesting a playlist go
    /// through here.
    pub async fn tune(&self, entity_type: &str, entity_id: &str) -> Result<SxmStream> {
        let state = Arc::new(self.tune_source(entity_type, entity_id).await?);
        self.cache_stream(state.clone()).await;
        Ok(SxmStream {
            client: self.clone(),
            state,
        })
    }

    async fn tune_source(&self, entity_type: &str, entity_id: &str) -> Result<StreamState> {
        let tune: TuneSource = self
            .post_json(
                &self.api_url("/playback/play/v1/tuneSource"),
                &serde_json::json!({
                    "id": entity_id,
                    "type": entity_type,
                    "hlsVersion": "V3",
                    "manifestVariant": "FULL",
                    "mtcVersion": "V2",
                }),
            )
            .await?;

        let stream = tune
            .streams
            .into_iter()
            .next()
            .ok_or_else(|| SxmError::ApiContractError {
                context: format!("tune source for {}/{} returned no streams", entity_type, entity_id),
            })?;
        let master_url = stream
            .urls
            .into_iter()
            .next()
            .ok_or_else(|| SxmError::ApiContractError {
                context: format!("stream {} has no playlist URLs", stream.id),
            })?
            .url;

        let master_playlist = self.get_text(&master_url).await?;
        let base_url = parent_url(&master_url).to_string();
        let variants = extract_variants(&base_url, &master_playlist);
        tracing::debug!(
            "Tuned {}/{}: stream {}, {} bitrate variants",
            entity_type,
            entity_id,
            stream.id,
            variants.len()
        );

        Ok(StreamState {
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            stream_id: stream.id,
            base_url,
            variants,
        })
    }
}

impl fmt::Debug for SxmStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SxmStream")
            .field("entity_type", &self.state.entity_type)
            .field("entity_id", &self.state.entity_id)
            .field("stream_id", &self.state.stream_id)
            .finish()
    }
}

impl SxmStream {
    pub fn entity_type(&self) -> &str {
        &self.state.entity_type
    }

    pub fn entity_id(&self) -> &str {
        &self.state.entity_id
    }

    pub fn stream_id(&self) -> &str {
        &self.state.stream_id
    }

    /// The variant playlist URL for a bitrate.
    pub fn playlist_url(&self, bitrate: Bitrate) -> Result<&str> {
        self.state
            .variants
            .get(&bitrate)
            .map(String::as_str)
            .ok_or(SxmError::MissingBitrateError { bitrate })
    }

    /// Fetch the variant playlist for a bitrate.
    pub async fn get_playlist(&self, bitrate: Bitrate) -> Result<String> {
        let url = self.playlist_url(bitrate)?.to_string();
        self.client.get_text(&url).await
    }

    /// Fetch one media segment of the variant playlist.
    pub async fn get_segment(&self, segment_file: &str, bitrate: Bitrate) -> Result<Vec<u8>> {
        let url = self.segment_url(segment_file, bitrate)?;
        self.client.get_bytes(&url).await
    }

    fn segment_url(&self, segment_file: &str, bitrate: Bitrate) -> Result<String> {
        let variant = self.playlist_url(bitrate)?;
        let dir = bitrate_dir(variant).ok_or_else(|| SxmError::ApiContractError {
            context: format!("variant URL has no directory component: {}", variant),
        })?;
        Ok(format!("{}/{}/{}", self.state.base_url, dir, segment_file))
    }

    /// Fetch the playback key record for this stream.
    pub async fn get_key(&self) -> Result<PlaybackKey> {
        let key_id = if self.state.entity_type == LINEAR_CHANNEL_TYPE {
            LINEAR_CHANNEL_KEY_ID
        } else {
            self.state.stream_id.as_str()
        };
        self.client
            .get_json(&self.client.api_url(&format!("/playback/key/v1/{}", key_id)))
            .await
    }
}

fn parent_url(url: &str) -> &str {
    match url.rsplit_once('/') {
        Some((base, _)) => base,
        None => url,
    }
}

/// Scan a master playlist for the known bitrate renditions. A line matches
/// when it names a `_<bitrate>_full_v3.m3u8` file; trailing query strings
/// (the short-lived signatures) are kept.
fn extract_variants(base_url: &str, master_playlist: &str) -> HashMap<Bitrate, String> {
    let mut variants = HashMap::new();
    for bitrate in Bitrate::ALL {
        let pattern = format!(r"(?m)^.*_{}_full_v3\.m3u8.*$", bitrate.as_str());
        let re = Regex::new(&pattern).unwrap();
        if let Some(m) = re.find(master_playlist) {
            variants.insert(bitrate, format!("{}/{}", base_url, m.as_str().trim()));
        }
    }
    variants
}

fn bitrate_dir(variant_url: &str) -> Option<&str> {
    let mut parts = variant_url.rsplit('/');
    parts.next()?;
    parts.next()
}
