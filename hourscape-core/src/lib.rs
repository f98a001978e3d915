//! Hourscape Core - Core library for the Hourscape ambient music daemon.
//!
//! This library provides:
//! - Configuration loading with the first-run template contract
//! - Weather classification against a Home Assistant instance
//! - The scene model (hour label + weather category) and track library
//! - Scheduler engine emitting scene-change events once per clock hour
//! - Player engine owning continuous playback with inter-track gaps
//!
//! The two engines share nothing but a one-way channel of scene keys:
//!
//! ```rust,no_run
//! use tokio::sync::mpsc;
//! use hourscape_core::prelude::*;
//!
//! # async fn demo(config: Config) -> Result<()> {
//! let weather = HomeAssistant::new(&config.home_assistant);
//! let library = TrackLibrary::new(config.library_root(), config.game());
//! let backend = KiraBackend::new()?;
//!
//! let (tx, rx) = mpsc::unbounded_channel();
//! tokio::spawn(Scheduler::new(weather).run(tx));
//! tokio::spawn(Player::new(backend, library, rx).run());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engines;
pub mod error;
pub mod library;
pub mod scene;
pub mod weather;

pub use error::{Error, Result};

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::config::{AuthConfig, Config, HomeAssistantConfig};
    pub use crate::engines::{
        AudioBackend, KiraBackend, PlaybackHandle, Player, Scheduler,
    };
    pub use crate::error::{Error, Result};
    pub use crate::library::{Game, TrackLibrary};
    pub use crate::scene::{HourLabel, SceneKey, WeatherKind};
    pub use crate::weather::{HomeAssistant, WeatherSource};
}
