mod client;
mod wire;

pub use client::EpisodeClient;
pub use wire::{ApiEpisode, ApiFile, RawDuration};
