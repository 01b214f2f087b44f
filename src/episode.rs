// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use url::Url;

/// Represents a single podcast episode as shown by the front-end
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Episode {
    pub id: String,
    pub title: String,
    /// Free-form list of people on the episode
    pub members: String,
    pub published_at: Option<DateTime<FixedOffset>>,
    /// Publication date as displayed, e.g. "8 Jan 21"
    pub published_display: String,
    pub thumbnail: Option<Url>,
    /// Duration in whole seconds
    pub duration: u64,
    /// Duration as displayed, e.g. "01:02:03"
    pub duration_display: String,
    /// Description as HTML
    pub description: String,
    /// Audio source
    pub url: Url,
}

/// Format a publication date the way listings display it
pub fn format_published(published_at: Option<&DateTime<FixedOffset>>) -> String {
    published_at
        .map(|dt| dt.format("%-d %b %y").to_string())
        .unwrap_or_default()
}
