// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;

use url::Url;

use crate::error::ConfigError;

/// Default backend address used when none is configured
pub const DEFAULT_API_URL: &str = "http://localhost:3333/";

/// Sort direction for the episode listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "asc"),
            SortOrder::Desc => write!(f, "desc"),
        }
    }
}

/// Configuration for the episode backend
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base address; always ends with a slash so paths join beneath it
    pub base_url: Url,
    /// Maximum number of episodes requested for the full listing (None = all)
    pub list_limit: Option<usize>,
    /// Field the listing is sorted by
    pub sort_field: String,
    /// Direction the listing is sorted in
    pub sort_order: SortOrder,
    /// Path of the latest-releases endpoint, relative to the base
    pub latest_path: String,
}

impl ApiConfig {
    /// Create a configuration for the given base address with default options
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            list_limit: None,
            sort_field: "published_at".to_string(),
            sort_order: SortOrder::Desc,
            latest_path: "getThree".to_string(),
        })
    }

    /// Set the listing limit
    pub fn with_list_limit(mut self, limit: Option<usize>) -> Self {
        self.list_limit = limit;
        self
    }

    /// URL of the full listing, including its query parameters
    pub fn episodes_url(&self) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            if let Some(limit) = self.list_limit {
                query.append_pair("_limit", &limit.to_string());
            }
            query.append_pair("_sort", &self.sort_field);
            query.append_pair("_order", &self.sort_order.to_string());
        }
        url
    }

    /// URL of the latest-releases endpoint
    pub fn latest_url(&self) -> Result<Url, url::ParseError> {
        self.base_url.join(&self.latest_path)
    }

    /// URL of a single episode
    pub fn episode_url(&self, id: &str) -> Result<Url, url::ParseError> {
        let mut url = self.base_url.join("episodes/")?;
        url.path_segments_mut()
            .map_err(|_| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(id);
        Ok(url)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            list_limit: None,
            sort_field: "published_at".to_string(),
            sort_order: SortOrder::Desc,
            latest_path: "getThree".to_string(),
        }
    }
}

/// Parse a base URL and make sure its path ends with a slash
fn normalize_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw).map_err(|e| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        source: e,
    })?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::CannotBeABase(raw.to_string()));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);

    Ok(url)
}
