// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use tracing::{debug, warn};

use crate::error::PlayerError;
use crate::playback::PlaybackStore;
use crate::time::whole_seconds;

use super::media::{MediaElement, MediaEvent, MediaSource};

/// What the player is currently able to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerStatus {
    /// Nothing selected
    Idle,
    /// A source was handed to the element, metadata not yet known
    Loading,
    /// Metadata loaded, progress is being tracked
    Ready,
    /// The current source could not be played
    Failed(String),
}

/// Binds the playback store to one media element.
///
/// [`sync`](Player::sync) pushes store state into the element and must be
/// called after every store change; [`handle_event`](Player::handle_event)
/// feeds element events back into the store.
pub struct Player<M> {
    media: M,
    status: PlayerStatus,
    /// Whole seconds elapsed in the current track
    progress: u64,
    /// Duration advertised for the current track, used until the element knows better
    track_duration: u64,
    /// Whether time updates are tracked for the current track
    observing: bool,
    loaded_generation: Option<u64>,
    applied_playing: bool,
    applied_looping: bool,
}

impl<M: MediaElement> Player<M> {
    pub fn new(media: M) -> Self {
        Self {
            media,
            status: PlayerStatus::Idle,
            progress: 0,
            track_duration: 0,
            observing: false,
            loaded_generation: None,
            applied_playing: false,
            applied_looping: false,
        }
    }

    pub fn status(&self) -> &PlayerStatus {
        &self.status
    }

    pub fn progress(&self) -> u64 {
        self.progress
    }

    /// Total duration of the current track in whole seconds
    pub fn duration(&self) -> u64 {
        self.media
            .duration()
            .map(whole_seconds)
            .unwrap_or(self.track_duration)
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn media_mut(&mut self) -> &mut M {
        &mut self.media
    }

    fn has_track(&self) -> bool {
        self.status != PlayerStatus::Idle
    }

    /// Apply the store's current state to the media element
    ///
    /// Loads a new source whenever a track was (re)selected, forwards the
    /// loop flag, and issues play/pause whenever the playing flag differs
    /// from what the element was last told.
    pub fn sync(&mut self, store: &mut PlaybackStore) {
        let state = store.state();
        let generation = state.generation();
        let is_playing = state.is_playing();
        let is_looping = state.is_looping();

        if self.loaded_generation != Some(generation) {
            self.loaded_generation = Some(generation);
            self.progress = 0;
            self.observing = false;
            self.applied_playing = false;

            match state.current_episode() {
                Some(episode) => {
                    debug!(id = %episode.id, url = %episode.url, "loading track");
                    self.track_duration = episode.duration;
                    self.media.load(&MediaSource::from(episode.as_ref()));
                    self.status = PlayerStatus::Loading;
                }
                None => {
                    self.track_duration = 0;
                    self.media.unload();
                    self.status = PlayerStatus::Idle;
                }
            }
        }

        if is_looping != self.applied_looping {
            self.media.set_loop(is_looping);
            self.applied_looping = is_looping;
        }

        if !self.has_track() || is_playing == self.applied_playing {
            return;
        }

        if !is_playing {
            self.media.pause();
            self.applied_playing = false;
            return;
        }

        // A broken source stays silent until another track is selected
        if matches!(self.status, PlayerStatus::Failed(_)) {
            store.set_playing_state(false);
            return;
        }

        match self.media.play() {
            Ok(()) => self.applied_playing = true,
            Err(e) => {
                warn!(error = %e, "media element refused to play");
                self.status = PlayerStatus::Failed(e.to_string());
                store.set_playing_state(false);
            }
        }
    }

    /// React to an event emitted by the media element
    pub fn handle_event(&mut self, event: MediaEvent, store: &mut PlaybackStore) {
        match event {
            MediaEvent::LoadedMetadata => {
                self.media.set_current_time(0.0);
                self.progress = 0;
                self.observing = true;
                if self.status == PlayerStatus::Loading {
                    self.status = PlayerStatus::Ready;
                }
            }
            MediaEvent::TimeUpdate => {
                if self.observing {
                    self.progress = whole_seconds(self.media.current_time());
                }
            }
            MediaEvent::Ended => {
                if store.has_next() {
                    store.play_next();
                } else {
                    store.clear_playing_state();
                }
            }
            MediaEvent::Error(reason) => {
                warn!(%reason, "playback failed");
                self.observing = false;
                self.applied_playing = false;
                self.status = PlayerStatus::Failed(reason);
                store.set_playing_state(false);
            }
        }
    }

    /// Move the playback position, clamped to the track bounds
    ///
    /// Progress is updated immediately rather than on the next time update.
    /// Returns the position actually applied.
    pub fn seek(&mut self, position: f64) -> Result<u64, PlayerError> {
        if !self.has_track() {
            return Err(PlayerError::NoTrack);
        }

        let max = self
            .media
            .duration()
            .unwrap_or(self.track_duration as f64)
            .max(0.0);
        let target = if position.is_nan() {
            0.0
        } else {
            position.clamp(0.0, max)
        };

        self.media.set_current_time(target);
        self.progress = whole_seconds(target);
        Ok(self.progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::time::Duration;

    use url::Url;

    use crate::episode::Episode;
    use crate::error::MediaError;
    use crate::player::SimulatedMedia;

    fn make_episode(id: &str, duration: u64) -> Arc<Episode> {
        Arc::new(Episode {
            id: id.to_string(),
            title: format!("Episode {id}"),
            members: "Host".to_string(),
            published_at: None,
            published_display: String::new(),
            thumbnail: None,
            duration,
            duration_display: String::new(),
            description: String::new(),
            url: Url::parse(&format!("https://example.com/{id}.mp3")).unwrap(),
        })
    }

    /// Records every command the player issues
    #[derive(Default)]
    struct RecordingMedia {
        commands: Vec<String>,
        position: f64,
        duration: Option<f64>,
        refuse_play: bool,
    }

    impl MediaElement for RecordingMedia {
        fn load(&mut self, source: &MediaSource) {
            self.commands.push(format!("load {}", source.url));
            self.position = 0.0;
        }

        fn unload(&mut self) {
            self.commands.push("unload".to_string());
        }

        fn play(&mut self) -> Result<(), MediaError> {
            self.commands.push("play".to_string());
            if self.refuse_play {
                Err(MediaError::PlaybackFailed("blocked".to_string()))
            } else {
                Ok(())
            }
        }

        fn pause(&mut self) {
            self.commands.push("pause".to_string());
        }

        fn set_current_time(&mut self, seconds: f64) {
            self.commands.push(format!("seek {seconds}"));
            self.position = seconds;
        }

        fn current_time(&self) -> f64 {
            self.position
        }

        fn duration(&self) -> Option<f64> {
            self.duration
        }

        fn set_loop(&mut self, looping: bool) {
            self.commands.push(format!("loop {looping}"));
        }
    }

    fn take_commands(player: &mut Player<RecordingMedia>) -> Vec<String> {
        std::mem::take(&mut player.media_mut().commands)
    }

    #[test]
    fn selecting_a_track_loads_and_plays_it() {
        let mut store = PlaybackStore::with_seed(1);
        let mut player = Player::new(RecordingMedia::default());

        store.play(make_episode("a", 100));
        player.sync(&mut store);

        assert_eq!(
            take_commands(&mut player),
            vec!["load https://example.com/a.mp3", "play"]
        );
        assert_eq!(player.status(), &PlayerStatus::Loading);
        assert_eq!(player.duration(), 100);
    }

    #[test]
    fn play_pause_follows_every_toggle() {
        let mut store = PlaybackStore::with_seed(1);
        let mut player = Player::new(RecordingMedia::default());
        store.play(make_episode("a", 100));
        player.sync(&mut store);
        take_commands(&mut player);

        store.toggle_play();
        player.sync(&mut store);
        store.toggle_play();
        player.sync(&mut store);
        player.sync(&mut store);

        assert_eq!(take_commands(&mut player), vec!["pause", "play"]);
    }

    #[test]
    fn loop_flag_is_forwarded() {
        let mut store = PlaybackStore::with_seed(1);
        let mut player = Player::new(RecordingMedia::default());
        store.play(make_episode("a", 100));
        player.sync(&mut store);
        take_commands(&mut player);

        store.toggle_loop();
        player.sync(&mut store);

        assert_eq!(take_commands(&mut player), vec!["loop true"]);
    }

    #[test]
    fn time_updates_floor_progress_after_metadata() {
        let mut store = PlaybackStore::with_seed(1);
        let mut player = Player::new(RecordingMedia::default());
        store.play(make_episode("a", 100));
        player.sync(&mut store);

        player.media_mut().position = 4.0;
        player.handle_event(MediaEvent::TimeUpdate, &mut store);
        assert_eq!(player.progress(), 0, "not observing before metadata");

        player.handle_event(MediaEvent::LoadedMetadata, &mut store);
        assert_eq!(player.status(), &PlayerStatus::Ready);
        assert_eq!(player.media().position, 0.0);

        player.media_mut().position = 12.9;
        player.handle_event(MediaEvent::TimeUpdate, &mut store);
        assert_eq!(player.progress(), 12);
    }

    #[test]
    fn new_track_resets_progress() {
        let mut store = PlaybackStore::with_seed(1);
        let mut player = Player::new(RecordingMedia::default());
        store
            .play_list(vec![make_episode("a", 100), make_episode("b", 50)], 0)
            .unwrap();
        player.sync(&mut store);
        player.handle_event(MediaEvent::LoadedMetadata, &mut store);
        player.seek(30.0).unwrap();
        assert_eq!(player.progress(), 30);

        store.play_next();
        player.sync(&mut store);

        assert_eq!(player.progress(), 0);
        assert_eq!(player.status(), &PlayerStatus::Loading);
        assert_eq!(player.duration(), 50);
    }

    #[test]
    fn ended_advances_when_next_exists() {
        let mut store = PlaybackStore::with_seed(1);
        let mut player = Player::new(RecordingMedia::default());
        store
            .play_list(vec![make_episode("a", 100), make_episode("b", 50)], 0)
            .unwrap();
        player.sync(&mut store);

        player.handle_event(MediaEvent::Ended, &mut store);
        player.sync(&mut store);

        assert_eq!(store.state().cursor(), Some(1));
        assert!(
            take_commands(&mut player).contains(&"load https://example.com/b.mp3".to_string())
        );
    }

    #[test]
    fn ended_clears_when_nothing_follows() {
        let mut store = PlaybackStore::with_seed(1);
        let mut player = Player::new(RecordingMedia::default());
        store.play(make_episode("a", 100));
        player.sync(&mut store);
        take_commands(&mut player);

        player.handle_event(MediaEvent::Ended, &mut store);
        player.sync(&mut store);

        assert_eq!(store.state().cursor(), None);
        assert!(!store.state().is_playing());
        assert_eq!(player.status(), &PlayerStatus::Idle);
        assert_eq!(take_commands(&mut player), vec!["unload"]);
    }

    #[test]
    fn seek_clamps_to_duration() {
        let mut store = PlaybackStore::with_seed(1);
        let mut player = Player::new(RecordingMedia::default());
        store.play(make_episode("a", 100));
        player.sync(&mut store);

        assert_eq!(player.seek(250.0), Ok(100));
        assert_eq!(player.progress(), 100);
        assert_eq!(player.media().position, 100.0);

        assert_eq!(player.seek(-3.0), Ok(0));
        assert_eq!(player.seek(f64::NAN), Ok(0));
    }

    #[test]
    fn seek_mid_range_is_applied_immediately() {
        let mut store = PlaybackStore::with_seed(1);
        let mut player = Player::new(RecordingMedia::default());
        store.play(make_episode("a", 100));
        player.sync(&mut store);

        assert_eq!(player.seek(42.5), Ok(42));
        assert_eq!(player.progress(), 42);
        assert_eq!(player.media().position, 42.5);
    }

    #[test]
    fn seek_prefers_element_duration() {
        let mut store = PlaybackStore::with_seed(1);
        let mut player = Player::new(RecordingMedia::default());
        store.play(make_episode("a", 100));
        player.sync(&mut store);
        player.media_mut().duration = Some(80.0);

        assert_eq!(player.seek(90.0), Ok(80));
    }

    #[test]
    fn seek_without_track_fails() {
        let mut player = Player::new(RecordingMedia::default());
        assert_eq!(player.seek(10.0), Err(PlayerError::NoTrack));
    }

    #[test]
    fn media_error_marks_failure_and_pauses_store() {
        let mut store = PlaybackStore::with_seed(1);
        let mut player = Player::new(RecordingMedia::default());
        store.play(make_episode("a", 100));
        player.sync(&mut store);

        player.handle_event(MediaEvent::Error("404".to_string()), &mut store);

        assert_eq!(player.status(), &PlayerStatus::Failed("404".to_string()));
        assert!(!store.state().is_playing());

        // Toggling play again does not hammer the broken source
        take_commands(&mut player);
        store.toggle_play();
        player.sync(&mut store);
        assert!(take_commands(&mut player).is_empty());
        assert!(!store.state().is_playing());
    }

    #[test]
    fn refused_play_marks_failure() {
        let mut store = PlaybackStore::with_seed(1);
        let mut player = Player::new(RecordingMedia {
            refuse_play: true,
            ..Default::default()
        });

        store.play(make_episode("a", 100));
        player.sync(&mut store);

        assert!(matches!(player.status(), PlayerStatus::Failed(_)));
        assert!(!store.state().is_playing());
    }

    #[test]
    fn failure_recovers_when_another_track_is_selected() {
        let mut store = PlaybackStore::with_seed(1);
        let mut player = Player::new(RecordingMedia::default());
        store.play(make_episode("a", 100));
        player.sync(&mut store);
        player.handle_event(MediaEvent::Error("boom".to_string()), &mut store);

        store.play(make_episode("b", 100));
        player.sync(&mut store);

        assert_eq!(player.status(), &PlayerStatus::Loading);
        assert!(player.media().commands.contains(&"play".to_string()));
    }

    #[test]
    fn full_queue_plays_through_on_simulated_media() {
        let mut store = PlaybackStore::with_seed(1);
        let mut player = Player::new(SimulatedMedia::new());
        store
            .play_list(vec![make_episode("a", 3), make_episode("b", 2)], 0)
            .unwrap();
        player.sync(&mut store);

        for _ in 0..20 {
            let events = player.media_mut().advance(Duration::from_secs(1));
            for event in events {
                player.handle_event(event, &mut store);
                player.sync(&mut store);
            }
        }

        assert_eq!(store.state().cursor(), None);
        assert_eq!(player.status(), &PlayerStatus::Idle);
        assert!(player.media().source().is_none());
    }

    #[test]
    fn simulated_progress_tracks_position() {
        let mut store = PlaybackStore::with_seed(1);
        let mut player = Player::new(SimulatedMedia::new());
        store.play(make_episode("a", 60));
        player.sync(&mut store);

        for _ in 0..4 {
            let events = player.media_mut().advance(Duration::from_millis(1500));
            for event in events {
                player.handle_event(event, &mut store);
            }
        }

        // First tick only delivers metadata; three ticks of 1.5s follow
        assert_eq!(player.progress(), 4);
        assert_eq!(player.status(), &PlayerStatus::Ready);
    }
}
