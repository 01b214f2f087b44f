pub mod api;
pub mod config;
pub mod episode;
pub mod error;
pub mod http;
pub mod playback;
pub mod player;
pub mod session;
pub mod time;
pub mod views;

// Re-export main types for convenience
pub use api::EpisodeClient;
pub use config::{ApiConfig, DEFAULT_API_URL, SortOrder};
pub use episode::Episode;
pub use error::{
    ApiError, CommandError, ConfigError, MediaError, PlaybackError, PlayerError, ViewError,
};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use playback::{
    ChannelListener, NoopListener, PlaybackEvent, PlaybackListener, PlaybackState, PlaybackStore,
    SharedPlaybackListener, TracingListener,
};
pub use player::{MediaElement, MediaEvent, MediaSource, Player, PlayerStatus, SimulatedMedia};
pub use session::{Outcome, Session, SessionCommand};
pub use time::format_duration;
pub use views::{EpisodePage, HomePage, Loadable};
