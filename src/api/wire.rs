// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use url::Url;

use crate::episode::{Episode, format_published};
use crate::error::ApiError;
use crate::time::format_duration;

/// Episode as returned by the backend
///
/// Different endpoints name the id and the publication date differently, and
/// some send several spellings at once; each spelling is kept separately and
/// resolved in `into_episode`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEpisode {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default, rename = "_id")]
    pub object_id: Option<RawId>,
    pub title: String,
    #[serde(default)]
    pub members: String,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default, rename = "publishAt")]
    pub publish_at_camel: Option<String>,
    #[serde(default)]
    pub publish_at: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub file: Option<ApiFile>,
    /// Some listings flatten the file fields onto the episode
    #[serde(default)]
    pub duration: Option<RawDuration>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Ids arrive either as strings or as JSON numbers
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// Audio file attached to an episode
#[derive(Debug, Clone, Deserialize)]
pub struct ApiFile {
    pub url: String,
    #[serde(default)]
    pub duration: Option<RawDuration>,
}

/// Durations arrive either as JSON numbers or as numeric strings
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawDuration {
    Number(f64),
    Text(String),
}

impl RawDuration {
    /// Whole seconds, or None if the value is not a non-negative number
    pub fn seconds(&self) -> Option<u64> {
        let value = match self {
            RawDuration::Number(n) => *n,
            RawDuration::Text(s) => s.trim().parse::<f64>().ok()?,
        };

        if value.is_finite() && value >= 0.0 {
            Some(value.floor() as u64)
        } else {
            None
        }
    }
}

impl ApiEpisode {
    /// Convert into the domain episode, validating the audio URL and duration
    pub fn into_episode(self) -> Result<Episode, ApiError> {
        let id = self
            .id
            .or(self.object_id)
            .map(RawId::into_string)
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ApiError::InvalidField {
                id: self.title.clone(),
                field: "id",
                reason: "missing".to_string(),
            })?;

        let (raw_url, raw_duration) = match self.file {
            Some(file) => (Some(file.url), file.duration.or(self.duration)),
            None => (self.url, self.duration),
        };

        let raw_url = raw_url.ok_or_else(|| ApiError::InvalidField {
            id: id.clone(),
            field: "audio url",
            reason: "missing".to_string(),
        })?;
        let url = Url::parse(&raw_url).map_err(|e| ApiError::InvalidField {
            id: id.clone(),
            field: "audio url",
            reason: e.to_string(),
        })?;

        let duration = match raw_duration {
            Some(raw) => raw.seconds().ok_or_else(|| ApiError::InvalidField {
                id: id.clone(),
                field: "duration",
                reason: format!("{:?} is not a non-negative number", raw),
            })?,
            None => 0,
        };

        let published_at = [self.published_at, self.publish_at_camel, self.publish_at]
            .into_iter()
            .flatten()
            .find_map(|raw| parse_published_at(&raw));
        let thumbnail = self.thumbnail.as_deref().and_then(|t| Url::parse(t).ok());

        Ok(Episode {
            published_display: format_published(published_at.as_ref()),
            duration_display: format_duration(duration),
            id,
            title: self.title,
            members: self.members,
            published_at,
            thumbnail,
            duration,
            description: self.description,
            url,
        })
    }
}

/// Parse the ISO-style dates the backend sends
fn parse_published_at(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }

    let utc = FixedOffset::east_opt(0)?;

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return naive.and_local_timezone(utc).single();
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|naive| naive.and_local_timezone(utc).single())
}
