// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::episode::Episode;
use crate::error::PlaybackError;

use super::event::{PlaybackEvent, SharedPlaybackListener};

/// Snapshot of what is playing
///
/// The cursor is either `None` or a valid index into the queue. Only
/// [`PlaybackStore`] actions change it.
#[derive(Debug, Clone, Default)]
pub struct PlaybackState {
    queue: Vec<Arc<Episode>>,
    cursor: Option<usize>,
    is_playing: bool,
    is_looping: bool,
    is_shuffling: bool,
    /// Bumped every time a track is selected, including re-selecting the same index
    generation: u64,
}

impl PlaybackState {
    pub fn queue(&self) -> &[Arc<Episode>] {
        &self.queue
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_looping(&self) -> bool {
        self.is_looping
    }

    pub fn is_shuffling(&self) -> bool {
        self.is_shuffling
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The selected episode, if any
    pub fn current_episode(&self) -> Option<&Arc<Episode>> {
        self.cursor.and_then(|i| self.queue.get(i))
    }

    /// Whether `play_next` would select a track
    pub fn has_next(&self) -> bool {
        let Some(cursor) = self.cursor else {
            return false;
        };
        let len = self.queue.len();

        (self.is_shuffling && len > 1) || cursor + 1 < len || self.is_looping
    }

    /// Whether `play_previous` would select a track
    pub fn has_previous(&self) -> bool {
        let Some(cursor) = self.cursor else {
            return false;
        };
        let len = self.queue.len();

        (self.is_shuffling && len > 1) || cursor > 0 || self.is_looping
    }
}

/// Single source of truth for playback, shared by every page and the player.
///
/// Created once per session and handed to whoever needs it. Each mutating
/// action notifies the subscribed listeners synchronously; actions that turn
/// out to be no-ops notify nobody.
pub struct PlaybackStore {
    state: PlaybackState,
    rng: StdRng,
    listeners: Vec<SharedPlaybackListener>,
}

impl PlaybackStore {
    /// Create an empty store with an entropy-seeded shuffle generator
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an empty store whose shuffle order is reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            state: PlaybackState::default(),
            rng,
            listeners: Vec::new(),
        }
    }

    /// Register a listener for all future changes
    pub fn subscribe(&mut self, listener: SharedPlaybackListener) {
        self.listeners.push(listener);
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn current_episode(&self) -> Option<&Arc<Episode>> {
        self.state.current_episode()
    }

    pub fn has_next(&self) -> bool {
        self.state.has_next()
    }

    pub fn has_previous(&self) -> bool {
        self.state.has_previous()
    }

    /// Replace the queue with a single episode and start playing it
    pub fn play(&mut self, episode: Arc<Episode>) {
        self.state.queue = vec![episode];
        self.select(0);
        self.state.is_playing = true;

        self.notify(PlaybackEvent::QueueReplaced { len: 1, cursor: 0 });
    }

    /// Replace the queue with `episodes` and start playing the one at `index`
    ///
    /// Fails without touching the store if `index` is not a valid position.
    pub fn play_list(
        &mut self,
        episodes: Vec<Arc<Episode>>,
        index: usize,
    ) -> Result<(), PlaybackError> {
        let len = episodes.len();
        if index >= len {
            return Err(PlaybackError::IndexOutOfRange { index, len });
        }

        self.state.queue = episodes;
        self.select(index);
        self.state.is_playing = true;

        self.notify(PlaybackEvent::QueueReplaced { len, cursor: index });
        Ok(())
    }

    pub fn toggle_play(&mut self) {
        let is_playing = !self.state.is_playing;
        self.set_playing_state(is_playing);
    }

    pub fn toggle_loop(&mut self) {
        self.state.is_looping = !self.state.is_looping;
        self.notify(PlaybackEvent::LoopingChanged {
            is_looping: self.state.is_looping,
        });
    }

    pub fn toggle_shuffle(&mut self) {
        self.state.is_shuffling = !self.state.is_shuffling;
        self.notify(PlaybackEvent::ShufflingChanged {
            is_shuffling: self.state.is_shuffling,
        });
    }

    /// Set play/pause directly, e.g. to mirror what the media element did
    pub fn set_playing_state(&mut self, is_playing: bool) {
        if self.state.is_playing == is_playing {
            return;
        }

        self.state.is_playing = is_playing;
        self.notify(PlaybackEvent::PlayingChanged { is_playing });
    }

    /// Select the next track, returning whether one was selected
    ///
    /// Shuffling picks uniformly among the other tracks. Otherwise the cursor
    /// advances, wrapping to the start only while looping.
    pub fn play_next(&mut self) -> bool {
        let Some(cursor) = self.state.cursor else {
            return false;
        };
        let len = self.state.queue.len();

        let next = if self.state.is_shuffling && len > 1 {
            Some(self.shuffle_pick(cursor, len))
        } else if cursor + 1 < len {
            Some(cursor + 1)
        } else if self.state.is_looping {
            Some(0)
        } else {
            None
        };

        self.move_to(next)
    }

    /// Select the previous track, returning whether one was selected
    pub fn play_previous(&mut self) -> bool {
        let Some(cursor) = self.state.cursor else {
            return false;
        };
        let len = self.state.queue.len();

        let previous = if self.state.is_shuffling && len > 1 {
            Some(self.shuffle_pick(cursor, len))
        } else if cursor > 0 {
            Some(cursor - 1)
        } else if self.state.is_looping {
            Some(len - 1)
        } else {
            None
        };

        self.move_to(previous)
    }

    /// Stop and forget the queue; nothing is selected afterwards
    pub fn clear_playing_state(&mut self) {
        self.state.queue.clear();
        self.state.cursor = None;
        self.state.is_playing = false;
        self.state.generation += 1;

        self.notify(PlaybackEvent::Cleared);
    }

    fn move_to(&mut self, index: Option<usize>) -> bool {
        match index {
            Some(index) => {
                self.select(index);
                self.notify(PlaybackEvent::TrackChanged { cursor: index });
                true
            }
            None => false,
        }
    }

    fn select(&mut self, index: usize) {
        self.state.cursor = Some(index);
        self.state.generation += 1;
    }

    /// Uniform pick among `0..len` excluding `current`; requires `len > 1`
    fn shuffle_pick(&mut self, current: usize, len: usize) -> usize {
        let pick = self.rng.gen_range(0..len - 1);
        if pick >= current { pick + 1 } else { pick }
    }

    fn notify(&self, event: PlaybackEvent) {
        for listener in &self.listeners {
            listener.on_change(&event, &self.state);
        }
    }
}

impl Default for PlaybackStore {
    fn default() -> Self {
        Self::new()
    }
}
