// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt::Write;
use std::sync::Arc;

use colored::Colorize;
use console::Emoji;

use crate::api::EpisodeClient;
use crate::episode::Episode;
use crate::error::ViewError;
use crate::http::HttpClient;
use crate::playback::PlaybackStore;

use super::{Loadable, failure_banner, truncate_title};

static SPARKLES: Emoji<'_, '_> = Emoji("✨ ", "");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "");

/// The home listing: latest releases plus the full episode table
#[derive(Debug, Clone)]
pub struct HomePage {
    pub latest: Loadable<Vec<Arc<Episode>>>,
    pub all: Loadable<Vec<Arc<Episode>>>,
}

impl HomePage {
    /// Fetch both sections concurrently; a failed section does not fail the page
    pub async fn load<C: HttpClient>(client: &EpisodeClient<C>) -> Self {
        let (latest, all) = tokio::join!(client.latest_episodes(), client.list_episodes());

        Self {
            latest: Loadable::from_result("latest releases", latest.map(share)),
            all: Loadable::from_result("episodes", all.map(share)),
        }
    }

    /// Look up an episode by id in either section
    pub fn find(&self, id: &str) -> Option<&Arc<Episode>> {
        [&self.latest, &self.all]
            .into_iter()
            .filter_map(Loadable::ready)
            .flatten()
            .find(|episode| episode.id == id)
    }

    /// Queue the latest releases and start the one at `index`
    pub fn play_latest(&self, index: usize, store: &mut PlaybackStore) -> Result<(), ViewError> {
        let episodes = section("latest releases", &self.latest)?;
        store.play_list(episodes.clone(), index)?;
        Ok(())
    }

    /// Queue the full listing and start the one at `index`
    pub fn play_from_all(&self, index: usize, store: &mut PlaybackStore) -> Result<(), ViewError> {
        let episodes = section("episodes", &self.all)?;
        store.play_list(episodes.clone(), index)?;
        Ok(())
    }

    /// Render both sections as numbered lists
    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "{SPARKLES}{}", "Latest releases".bold().green());
        match &self.latest {
            Loadable::Ready(episodes) if episodes.is_empty() => {
                let _ = writeln!(out, "  {}", "No episodes yet".dimmed());
            }
            Loadable::Ready(episodes) => {
                for (i, episode) in episodes.iter().enumerate() {
                    let _ = writeln!(
                        out,
                        "  {} {}",
                        format!("[{}]", i + 1).cyan(),
                        truncate_title(&episode.title, 60).bold()
                    );
                    let _ = writeln!(
                        out,
                        "      {} • {} • {}",
                        episode.members,
                        episode.published_display,
                        episode.duration_display.yellow()
                    );
                }
            }
            Loadable::Failed(reason) => {
                let _ = writeln!(out, "  {}", failure_banner("latest releases", reason));
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{HEADPHONES}{}", "All episodes".bold().green());
        match &self.all {
            Loadable::Ready(episodes) if episodes.is_empty() => {
                let _ = writeln!(out, "  {}", "No episodes yet".dimmed());
            }
            Loadable::Ready(episodes) => {
                let _ = writeln!(
                    out,
                    "  {:>4}  {:<40}  {:<24}  {:<9}  {}",
                    "#", "Podcast", "Members", "Date", "Duration"
                );
                for (i, episode) in episodes.iter().enumerate() {
                    let _ = writeln!(
                        out,
                        "  {:>4}  {:<40}  {:<24}  {:<9}  {}",
                        i + 1,
                        truncate_title(&episode.title, 40),
                        truncate_title(&episode.members, 24),
                        episode.published_display,
                        episode.duration_display
                    );
                }
            }
            Loadable::Failed(reason) => {
                let _ = writeln!(out, "  {}", failure_banner("episodes", reason));
            }
        }

        out
    }
}

fn share(episodes: Vec<Episode>) -> Vec<Arc<Episode>> {
    episodes.into_iter().map(Arc::new).collect()
}

fn section<'a>(
    name: &'static str,
    loadable: &'a Loadable<Vec<Arc<Episode>>>,
) -> Result<&'a Vec<Arc<Episode>>, ViewError> {
    match loadable {
        Loadable::Ready(episodes) => Ok(episodes),
        Loadable::Failed(reason) => Err(ViewError::SectionUnavailable {
            section: name,
            reason: reason.clone(),
        }),
    }
}
