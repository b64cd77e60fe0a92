//! Catalog operations: channel lineup, on-demand library, podcast episodes.

use crate::core::client::SxmClient;
use crate::domain::model::{AodItem, Channel, ChannelItem, ContainerResponse, LibraryResponse};
use crate::utils::error::{Result, SxmError};

impl SxmClient {
    /// Linear and on-demand channel list, flattened to [`Channel`] records.
    pub async fn get_channels(&self) -> Result<Vec<Channel>> {
        let url = self.api_url(
            "/relationship/v1/container/all-channels?entityType=curated-grouping&entityId=&offset=0&size=1000",
        );
        let resp: ContainerResponse<ChannelItem> = self.get_json(&url).await?;
        let set = resp
            .container
            .sets
            .into_iter()
            .next()
            .ok_or_else(|| SxmError::ApiContractError {
                context: "channel container has no sets".to_string(),
            })?;
        Ok(set.items.into_iter().map(Channel::from).collect())
    }

    /// Entities in the user's library, untyped.
    pub async fn get_library(&self) -> Result<Vec<serde_json::Value>> {
        let url = self.api_url("/ondemand/v1/library/all");
        let resp: LibraryResponse = self.get_json(&url).await?;
        Ok(resp.all_data_map.into_iter().map(|(_, v)| v).collect())
    }

    /// Episodes of a podcast show, untyped.
    pub async fn get_podcast_episodes(
        &self,
        podcast_entity_id: &str,
    ) -> Result<Vec<serde_json::Value>> {
        let url = self.api_url(&format!(
            "/relationship/v1/container/aod?&entityType=show-podcast&entityId={}&offset=0&size=1000&maxResponses=1000",
            podcast_entity_id
        ));
        let resp: ContainerResponse<AodItem> = self.get_json(&url).await?;
        let set = resp
            .container
            .sets
            .into_iter()
            .next()
            .ok_or_else(|| SxmError::ApiContractError {
                context: format!("podcast container for {} has no sets", podcast_entity_id),
            })?;
        Ok(set.items.into_iter().map(|item| item.entity).collect())
    }
}
