//! Scene model: the (hour, weather) pair that selects a track.
//!
//! A scene changes at most once per clock hour and whenever the reported
//! weather crosses a category boundary. Keys are small `Copy` values compared
//! by value, so the scheduler can cheaply dedup consecutive samples.

use std::fmt;

use chrono::{DateTime, Local, TimeZone, Timelike};

/// Raw Home Assistant states that count as rain.
const RAIN_STATES: &[&str] = &["hail", "lightning", "lightning-rainy", "pouring", "rainy"];

/// Raw Home Assistant states that count as snow.
const SNOW_STATES: &[&str] = &["snowy", "snowy-rainy"];

/// Weather category used for track selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherKind {
    Sunny,
    Rainy,
    Snowy,
}

impl WeatherKind {
    /// Classifies a raw weather state string, case-insensitively.
    /// Anything outside the rain and snow sets (including unrecognized
    /// states) counts as sunny.
    pub fn classify(raw: &str) -> Self {
        let state = raw.trim().to_ascii_lowercase();
        if RAIN_STATES.contains(&state.as_str()) {
            Self::Rainy
        } else if SNOW_STATES.contains(&state.as_str()) {
            Self::Snowy
        } else {
            Self::Sunny
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::Rainy => "rainy",
            Self::Snowy => "snowy",
        }
    }
}

impl fmt::Display for WeatherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hour of day on a 12-hour clock with am/pm suffix ("3pm", "12am").
///
/// Stored as the 24-hour value; the 12-hour label is a display concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HourLabel(u8);

impl HourLabel {
    /// Builds a label from a 24-hour clock value. Out-of-range values wrap.
    pub fn from_hour(hour: u8) -> Self {
        Self(hour % 24)
    }

    /// The label for a given instant in its own timezone.
    pub fn of<Tz: TimeZone>(time: &DateTime<Tz>) -> Self {
        Self(time.hour() as u8)
    }

    /// The label for the current local time.
    pub fn now() -> Self {
        Self::of(&Local::now())
    }
}

impl fmt::Display for HourLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 0 -> "12am", 12 -> "12pm", 15 -> "3pm"; no leading zero.
        let (hour, suffix) = match self.0 {
            0 => (12, "am"),
            h @ 1..=11 => (h, "am"),
            12 => (12, "pm"),
            h => (h - 12, "pm"),
        };
        write!(f, "{}{}", hour, suffix)
    }
}

/// The (hour, weather) pair identifying which track should be playing.
///
/// Displays as the track file stem, e.g. `9am_rainy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneKey {
    pub hour: HourLabel,
    pub weather: WeatherKind,
}

impl SceneKey {
    pub fn new(hour: HourLabel, weather: WeatherKind) -> Self {
        Self { hour, weather }
    }
}

impl fmt::Display for SceneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.hour, self.weather)
    }
}
