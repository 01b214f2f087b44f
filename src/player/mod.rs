mod media;
mod simulated;
mod widget;

pub use media::{MediaElement, MediaEvent, MediaSource};
pub use simulated::SimulatedMedia;
pub use widget::{Player, PlayerStatus};
