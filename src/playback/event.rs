// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::debug;

use super::store::PlaybackState;

/// Changes announced by the playback store after each mutating action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// The queue was replaced and a track selected
    QueueReplaced { len: usize, cursor: usize },

    /// A different track in the same queue was selected
    TrackChanged { cursor: usize },

    /// Play/pause state changed
    PlayingChanged { is_playing: bool },

    /// Loop flag changed
    LoopingChanged { is_looping: bool },

    /// Shuffle flag changed
    ShufflingChanged { is_shuffling: bool },

    /// Playback was cleared and nothing is selected
    Cleared,
}

/// Trait for observing the playback store.
///
/// Listeners are called synchronously after the state has been updated.
/// Renderers, the player widget binding and loggers are typical listeners.
pub trait PlaybackListener: Send + Sync {
    /// Called once per change with the state after the change
    fn on_change(&self, event: &PlaybackEvent, state: &PlaybackState);
}

/// A shared reference to a playback listener
pub type SharedPlaybackListener = Arc<dyn PlaybackListener>;

/// A listener that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl PlaybackListener for NoopListener {
    fn on_change(&self, _event: &PlaybackEvent, _state: &PlaybackState) {}
}

impl NoopListener {
    /// Create a new NoopListener wrapped in an Arc
    pub fn shared() -> SharedPlaybackListener {
        Arc::new(Self)
    }
}

/// Logs every change through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingListener;

impl PlaybackListener for TracingListener {
    fn on_change(&self, event: &PlaybackEvent, state: &PlaybackState) {
        debug!(
            ?event,
            cursor = ?state.cursor(),
            queue_len = state.queue().len(),
            is_playing = state.is_playing(),
            "playback changed"
        );
    }
}

/// Forwards events into a channel so an event loop can react to them later
#[derive(Debug, Clone)]
pub struct ChannelListener {
    tx: UnboundedSender<PlaybackEvent>,
}

impl ChannelListener {
    /// Create a listener and the receiving end of its channel
    pub fn channel() -> (Self, UnboundedReceiver<PlaybackEvent>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx }, rx)
    }
}

impl PlaybackListener for ChannelListener {
    fn on_change(&self, event: &PlaybackEvent, _state: &PlaybackState) {
        // A dropped receiver just means nobody is rendering any more
        let _ = self.tx.send(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_listener_forwards_events() {
        let (listener, mut rx) = ChannelListener::channel();
        let state = PlaybackState::default();

        listener.on_change(&PlaybackEvent::PlayingChanged { is_playing: true }, &state);
        listener.on_change(&PlaybackEvent::Cleared, &state);

        assert_eq!(
            rx.try_recv().unwrap(),
            PlaybackEvent::PlayingChanged { is_playing: true }
        );
        assert_eq!(rx.try_recv().unwrap(), PlaybackEvent::Cleared);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn channel_listener_survives_dropped_receiver() {
        let (listener, rx) = ChannelListener::channel();
        drop(rx);

        listener.on_change(&PlaybackEvent::Cleared, &PlaybackState::default());
    }

    #[test]
    fn noop_and_tracing_listeners_accept_events() {
        let state = PlaybackState::default();
        NoopListener.on_change(&PlaybackEvent::Cleared, &state);
        TracingListener.on_change(&PlaybackEvent::TrackChanged { cursor: 0 }, &state);
    }
}
