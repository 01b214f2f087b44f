// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::ApiConfig;
use crate::episode::Episode;
use crate::error::ApiError;
use crate::http::HttpClient;

use super::wire::ApiEpisode;

/// Read-only client for the episode backend
///
/// Every call is independent: there is no caching, retry or timeout policy.
#[derive(Clone)]
pub struct EpisodeClient<C> {
    http: C,
    config: ApiConfig,
}

impl<C: HttpClient> EpisodeClient<C> {
    pub fn new(http: C, config: ApiConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Fetch the full episode listing
    ///
    /// Items that cannot be decoded or converted are skipped.
    pub async fn list_episodes(&self) -> Result<Vec<Episode>, ApiError> {
        let url = self.config.episodes_url();
        let items: Vec<Value> = self.get_json(&url).await?;
        Ok(convert_all(items))
    }

    /// Fetch the latest releases
    pub async fn latest_episodes(&self) -> Result<Vec<Episode>, ApiError> {
        let url = self.config.latest_url()?;
        let items: Vec<Value> = self.get_json(&url).await?;
        Ok(convert_all(items))
    }

    /// Fetch a single episode by id
    pub async fn get_episode(&self, id: &str) -> Result<Episode, ApiError> {
        let url = self.config.episode_url(id)?;
        let item: ApiEpisode = self.get_json(&url).await?;
        item.into_episode()
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, ApiError> {
        debug!(%url, "fetching");

        let response = self
            .http
            .get(url)
            .await
            .map_err(|e| ApiError::RequestFailed {
                url: url.to_string(),
                source: e,
            })?;

        if !response.is_success() {
            warn!(%url, status = response.status, "backend returned an error status");
            return Err(ApiError::HttpStatus {
                url: url.to_string(),
                status: response.status,
            });
        }

        serde_json::from_slice(&response.body).map_err(|e| ApiError::DecodeFailed {
            url: url.to_string(),
            source: e,
        })
    }
}

fn convert_all(items: Vec<Value>) -> Vec<Episode> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(position, item)| {
            let converted = serde_json::from_value::<ApiEpisode>(item)
                .map_err(|e| e.to_string())
                .and_then(|item| item.into_episode().map_err(|e| e.to_string()));

            match converted {
                Ok(episode) => Some(episode),
                Err(error) => {
                    warn!(position, %error, "skipping episode");
                    None
                }
            }
        })
        .collect()
}
