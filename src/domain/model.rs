use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audio bitrates offered by the HLS manifests, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Bitrate {
    #[default]
    Kbps256,
    Kbps96,
    Kbps64,
    Kbps32,
}

impl Bitrate {
    pub const ALL: [Bitrate; 4] = [
        Bitrate::Kbps256,
        Bitrate::Kbps96,
        Bitrate::Kbps64,
        Bitrate::Kbps32,
    ];

    /// The token used in manifest file names, e.g. `primary_256k_full_v3.m3u8`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Bitrate::Kbps256 => "256k",
            Bitrate::Kbps96 => "96k",
            Bitrate::Kbps64 => "64k",
            Bitrate::Kbps32 => "32k",
        }
    }
}

impl fmt::Display for Bitrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceSession {
    pub grant: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousSession {
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityStatus {
    pub has_password: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticationGrant {
    pub grant: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedSession {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
}

/// Generic envelope for `relationship/v1/container` responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerResponse<I> {
    pub container: Container<I>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Container<I> {
    pub sets: Vec<ContainerSet<I>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContainerSet<I> {
    pub items: Vec<I>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelItem {
    pub decorations: ChannelDecorations,
    pub entity: ChannelEntity,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDecorations {
    #[serde(default)]
    pub channel_number: serde_json::Value,
    #[serde(default)]
    pub unentitled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub texts: EntityTexts,
    #[serde(default)]
    pub images: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntityTexts {
    pub title: TextVariants,
    pub description: TextVariants,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextVariants {
    pub default: String,
    pub short: Option<String>,
}

/// A flattened channel, serialized with the upstream field names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    #[serde(rename = "channelNumber")]
    pub channel_number: serde_json::Value,
    pub unentitled: bool,
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub title: String,
    pub title_short: Option<String>,
    pub description: String,
    pub images: serde_json::Value,
}

impl From<ChannelItem> for Channel {
    fn from(item: ChannelItem) -> Self {
        Channel {
            channel_number: item.decorations.channel_number,
            unentitled: item.decorations.unentitled,
            kind: item.entity.kind,
            id: item.entity.id,
            title: item.entity.texts.title.default,
            title_short: item.entity.texts.title.short,
            description: item.entity.texts.description.default,
            images: item.entity.images,
        }
    }
}

/// On-demand container item; episode entities pass through untyped.
#[derive(Debug, Clone, Deserialize)]
pub struct AodItem {
    pub entity: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LibraryResponse {
    #[serde(rename = "allDataMap")]
    pub all_data_map: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TuneSource {
    #[serde(default)]
    pub streams: Vec<TuneStream>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TuneStream {
    pub id: String,
    #[serde(default)]
    pub urls: Vec<TuneStreamUrl>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TuneStreamUrl {
    pub url: String,
}

/// Playback key record; `key` is base64-encoded AES-128 key material.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackKey {
    pub key: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
