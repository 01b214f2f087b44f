// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::time::Duration;

use crate::error::MediaError;

use super::media::{MediaElement, MediaEvent, MediaSource};

/// Headless media element driven by an external clock.
///
/// It never decodes audio; it only keeps a playback position that moves
/// forward while playing, and emits the events a real element would.
#[derive(Debug, Default)]
pub struct SimulatedMedia {
    source: Option<MediaSource>,
    position: f64,
    duration: Option<f64>,
    playing: bool,
    looping: bool,
    metadata_pending: bool,
    failure: Option<String>,
    fail_next_load: Option<String>,
}

impl SimulatedMedia {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `load` fail with the given reason
    pub fn fail_next_load(&mut self, reason: impl Into<String>) {
        self.fail_next_load = Some(reason.into());
    }

    pub fn source(&self) -> Option<&MediaSource> {
        self.source.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Let `elapsed` time pass and return the resulting events
    pub fn advance(&mut self, elapsed: Duration) -> Vec<MediaEvent> {
        let mut events = Vec::new();

        if self.source.is_none() {
            return events;
        }

        if let Some(reason) = self.failure.take() {
            self.playing = false;
            self.metadata_pending = false;
            events.push(MediaEvent::Error(reason));
            return events;
        }

        if self.metadata_pending {
            self.metadata_pending = false;
            self.duration = self
                .source
                .as_ref()
                .map(|source| source.expected_duration as f64);
            events.push(MediaEvent::LoadedMetadata);
            // Playback starts on the next tick, as with a real element
            return events;
        }

        if !self.playing {
            return events;
        }

        let duration = self.duration.unwrap_or(0.0);
        self.position += elapsed.as_secs_f64();

        if self.position < duration {
            events.push(MediaEvent::TimeUpdate);
        } else if self.looping && duration > 0.0 {
            self.position %= duration;
            events.push(MediaEvent::TimeUpdate);
        } else {
            self.position = duration;
            self.playing = false;
            events.push(MediaEvent::TimeUpdate);
            events.push(MediaEvent::Ended);
        }

        events
    }
}

impl MediaElement for SimulatedMedia {
    fn load(&mut self, source: &MediaSource) {
        self.source = Some(source.clone());
        self.position = 0.0;
        self.duration = None;
        self.playing = false;
        self.metadata_pending = true;
        self.failure = self.fail_next_load.take();
    }

    fn unload(&mut self) {
        self.source = None;
        self.position = 0.0;
        self.duration = None;
        self.playing = false;
        self.metadata_pending = false;
        self.failure = None;
    }

    fn play(&mut self) -> Result<(), MediaError> {
        if self.source.is_none() {
            return Err(MediaError::NoSource);
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn set_current_time(&mut self, seconds: f64) {
        let max = self.duration.unwrap_or(f64::MAX);
        self.position = seconds.clamp(0.0, max);
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }
}
