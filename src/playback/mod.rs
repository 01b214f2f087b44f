mod event;
mod store;

pub use event::{
    ChannelListener, NoopListener, PlaybackEvent, PlaybackListener, SharedPlaybackListener,
    TracingListener,
};
pub use store::{PlaybackState, PlaybackStore};
