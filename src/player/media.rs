// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use url::Url;

use crate::episode::Episode;
use crate::error::MediaError;

/// What the player asks a media element to load
#[derive(Debug, Clone, PartialEq)]
pub struct MediaSource {
    pub url: Url,
    /// Duration advertised by the backend, in seconds
    pub expected_duration: u64,
}

impl From<&Episode> for MediaSource {
    fn from(episode: &Episode) -> Self {
        Self {
            url: episode.url.clone(),
            expected_duration: episode.duration,
        }
    }
}

/// Notifications emitted by a media element
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Metadata for the loaded source is available
    LoadedMetadata,
    /// The playback position moved
    TimeUpdate,
    /// Playback reached the end of the source
    Ended,
    /// The source could not be loaded or played
    Error(String),
}

/// Native audio-playing primitive the player widget drives.
///
/// Implementations report progress back through [`MediaEvent`]s, which the
/// owner feeds into [`Player::handle_event`](super::Player::handle_event).
pub trait MediaElement {
    /// Start loading a new source, replacing any previous one
    fn load(&mut self, source: &MediaSource);

    /// Drop the current source
    fn unload(&mut self);

    fn play(&mut self) -> Result<(), MediaError>;

    fn pause(&mut self);

    /// Move the playback position, in seconds
    fn set_current_time(&mut self, seconds: f64);

    /// Current playback position, in seconds
    fn current_time(&self) -> f64;

    /// Total duration once metadata has loaded
    fn duration(&self) -> Option<f64>;

    /// Whether the element restarts by itself at the end
    fn set_loop(&mut self, looping: bool);
}
