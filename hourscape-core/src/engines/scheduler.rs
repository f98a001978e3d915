//! Scheduler engine: samples clock and weather, emits scene changes.
//!
//! The scheduler wakes once per clock hour (plus one immediate evaluation at
//! startup). Weather is only re-sampled at those wake-ups, so a mid-hour
//! weather change is reflected up to ~59 minutes late. That resolution limit
//! is accepted, not a bug.

use std::time::Duration;

use chrono::{DateTime, Local, Timelike};
use tokio::sync::mpsc;

use crate::error::{Error, Result};
use crate::scene::{HourLabel, SceneKey};
use crate::weather::WeatherSource;

/// Emits a strictly-change-driven stream of scene keys.
pub struct Scheduler<W> {
    weather: W,
    last_sent: Option<SceneKey>,
}

impl<W: WeatherSource> Scheduler<W> {
    pub fn new(weather: W) -> Self {
        Self {
            weather,
            last_sent: None,
        }
    }

    /// Runs forever. Weather lookup failures propagate as fatal; a closed
    /// channel means the player is gone and is equally fatal.
    pub async fn run(mut self, tx: mpsc::UnboundedSender<SceneKey>) -> Result<()> {
        loop {
            let weather = self.weather.current().await?;
            let key = SceneKey::new(HourLabel::now(), weather);

            if let Some(key) = self.observe(key) {
                tracing::info!("Scene changed to {}", key);
                tx.send(key).map_err(|_| Error::EngineStopped("player"))?;
            }

            let pause = until_next_hour(Local::now());
            tracing::debug!("Next weather sample in {}s", pause.as_secs());
            tokio::time::sleep(pause).await;
        }
    }

    /// Dedup step: returns the key only if it differs from the last one
    /// emitted. Never lets two consecutive identical keys through.
    fn observe(&mut self, key: SceneKey) -> Option<SceneKey> {
        if self.last_sent == Some(key) {
            return None;
        }
        self.last_sent = Some(key);
        Some(key)
    }
}

/// Seconds until the next exact hour boundary (14:37:12 -> 15:00:00).
fn until_next_hour(now: DateTime<Local>) -> Duration {
    let into_hour = u64::from(now.minute() * 60 + now.second());
    Duration::from_secs(3600 - into_hour)
}
