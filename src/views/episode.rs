// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt::Write;
use std::sync::Arc;

use colored::Colorize;

use crate::api::EpisodeClient;
use crate::episode::Episode;
use crate::error::ViewError;
use crate::http::HttpClient;
use crate::playback::PlaybackStore;

use super::{Loadable, failure_banner, html_to_text};

/// Detail page for a single episode
#[derive(Debug, Clone)]
pub struct EpisodePage {
    pub id: String,
    pub episode: Loadable<Arc<Episode>>,
}

impl EpisodePage {
    pub async fn load<C: HttpClient>(client: &EpisodeClient<C>, id: &str) -> Self {
        let result = client.get_episode(id).await.map(Arc::new);

        Self {
            id: id.to_string(),
            episode: Loadable::from_result("episode", result),
        }
    }

    pub fn episode(&self) -> Option<&Arc<Episode>> {
        self.episode.ready()
    }

    /// Play this episode on its own
    pub fn play(&self, store: &mut PlaybackStore) -> Result<(), ViewError> {
        match &self.episode {
            Loadable::Ready(episode) => {
                store.play(Arc::clone(episode));
                Ok(())
            }
            Loadable::Failed(reason) => Err(ViewError::SectionUnavailable {
                section: "episode",
                reason: reason.clone(),
            }),
        }
    }

    pub fn render(&self) -> String {
        let episode = match &self.episode {
            Loadable::Ready(episode) => episode,
            Loadable::Failed(reason) => {
                return format!("{}\n", failure_banner(&format!("episode '{}'", self.id), reason));
            }
        };

        let mut out = String::new();
        let _ = writeln!(out, "{}", episode.title.bold().green());
        let _ = writeln!(
            out,
            "{} • {} • {}",
            episode.members,
            episode.published_display,
            episode.duration_display.yellow()
        );
        if let Some(thumbnail) = &episode.thumbnail {
            let _ = writeln!(out, "{}", thumbnail.as_str().dimmed());
        }

        let description = html_to_text(&episode.description);
        if !description.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "{description}");
        }

        out
    }
}
