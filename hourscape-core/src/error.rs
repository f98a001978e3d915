//! Error types for hourscape-core.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the hourscape-core library.
#[derive(Error, Debug)]
pub enum Error {
    // Config errors
    #[error("Wrote a config template to {}; edit it before running again", .0.display())]
    ConfigTemplateWritten(PathBuf),

    #[error("Could not determine the user config directory")]
    NoConfigDir,

    #[error("Failed to load config '{0}': {1}")]
    ConfigLoad(String, String),

    #[error("Failed to parse config '{0}': {1}")]
    ConfigParse(String, String),

    #[error("Config validation error in '{0}': {1}")]
    ConfigValidation(String, String),

    // Weather errors
    #[error("Weather request failed: {0}")]
    WeatherRequest(String),

    #[error("Weather entity '{0}' query returned {1}")]
    WeatherStatus(String, String),

    // Track library errors
    #[error("Track not found: {}", .0.display())]
    TrackNotFound(PathBuf),

    // Playback errors
    #[error("Failed to initialize audio output: {0}")]
    AudioInit(String),

    #[error("Failed to start playback: {0}")]
    Playback(String),

    // Engine lifecycle
    #[error("The {0} engine stopped")]
    EngineStopped(&'static str),

    // Generic errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
