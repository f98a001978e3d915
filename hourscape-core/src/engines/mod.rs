//! Engine implementations for scheduling and playback.

mod audio;
mod player;
mod scheduler;

pub use audio::{AudioBackend, KiraBackend, KiraHandle, PlaybackHandle};
pub use player::Player;
pub use scheduler::Scheduler;
