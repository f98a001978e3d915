//! Player engine: owns playback and keeps audio running.
//!
//! The player never blocks on the scheduler. Each loop iteration drains any
//! pending scene keys without waiting (only the latest matters), swaps the
//! track on a change, and otherwise watches for natural track completion,
//! which is followed by a randomized silent gap before the same track
//! restarts.

use std::path::PathBuf;
use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::engines::audio::{AudioBackend, PlaybackHandle};
use crate::error::{Error, Result};
use crate::library::TrackLibrary;
use crate::scene::SceneKey;

/// Fixed sleep between loop iterations, bounding CPU usage.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Bounds of the silent gap after a track ends on its own, in seconds.
/// Drawn uniformly from [GAP_MIN_SECS, GAP_MAX_SECS).
const GAP_MIN_SECS: u64 = 30;
const GAP_MAX_SECS: u64 = 120;

/// Owns the single live playback handle and reacts to scene keys and track
/// completion.
pub struct Player<B: AudioBackend> {
    backend: B,
    library: TrackLibrary,
    rx: mpsc::UnboundedReceiver<SceneKey>,
    current: PathBuf,
    handle: Option<B::Handle>,
}

impl<B: AudioBackend> Player<B> {
    pub fn new(backend: B, library: TrackLibrary, rx: mpsc::UnboundedReceiver<SceneKey>) -> Self {
        Self {
            backend,
            library,
            rx,
            current: PathBuf::new(),
            handle: None,
        }
    }

    /// Runs forever. Playback-resource failures propagate as fatal; a closed
    /// channel means the scheduler is gone and is equally fatal.
    pub async fn run(mut self) -> Result<()> {
        // Start with silence to initialize the backend before the first
        // real key arrives.
        let silence = self.library.silence()?;
        self.swap_to(silence)?;

        loop {
            // A scene switch always wins over a completion restart.
            if let Some(key) = self.drain_latest()? {
                self.switch_scene(key)?;
            } else if !self.is_playing() {
                self.wait_out_gap().await?;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Drains every pending key without blocking and keeps only the newest;
    /// stale intermediate scenes are coalesced.
    fn drain_latest(&mut self) -> Result<Option<SceneKey>> {
        let mut latest = None;
        loop {
            match self.rx.try_recv() {
                Ok(key) => latest = Some(key),
                Err(TryRecvError::Empty) => return Ok(latest),
                Err(TryRecvError::Disconnected) => {
                    return Err(Error::EngineStopped("scheduler"))
                }
            }
        }
    }

    fn switch_scene(&mut self, key: SceneKey) -> Result<()> {
        let track = self.library.resolve(&key)?;
        if track == self.current {
            tracing::debug!("Scene {} resolves to the current track, keeping it", key);
            return Ok(());
        }
        tracing::info!("Switching to {}", key);
        self.swap_to(track)
    }

    /// Stops the previous handle (if any) and starts `track`. This is the
    /// only place a handle is created, keeping at most one live.
    fn swap_to(&mut self, track: PathBuf) -> Result<()> {
        if let Some(mut old) = self.handle.take() {
            old.stop();
        }
        self.handle = Some(self.backend.start(&track)?);
        self.current = track;
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| h.is_playing())
    }

    /// The track ended on its own: stay silent for a random gap, then
    /// restart the same track. A scene key arriving mid-gap wins and
    /// switches immediately instead.
    async fn wait_out_gap(&mut self) -> Result<()> {
        let gap = {
            let mut rng = rand::thread_rng();
            Duration::from_secs(rng.gen_range(GAP_MIN_SECS..GAP_MAX_SECS))
        };
        tracing::info!("Track finished, restarting after {}s", gap.as_secs());

        tokio::select! {
            _ = tokio::time::sleep(gap) => {
                let track = self.current.clone();
                self.swap_to(track)
            }
            key = self.rx.recv() => match key {
                Some(key) => self.switch_scene(key),
                None => Err(Error::EngineStopped("scheduler")),
            },
        }
    }
}

impl<B: AudioBackend> Drop for Player<B> {
    /// Shutdown cancels the run loop at an await point; stopping the live
    /// handle here keeps the backend out of an undefined state.
    fn drop(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::Game;
    use crate::scene::{HourLabel, WeatherKind};
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use tokio::time::Instant;

    #[derive(Debug, Clone)]
    enum MockEvent {
        Start(PathBuf, Instant),
        Stop(Instant),
        /// `is_playing` returned false.
        FinishedPoll(Instant),
    }

    type EventLog = Arc<Mutex<Vec<MockEvent>>>;

    /// Backend that records every call with a (paused-clock) timestamp.
    /// `start` flips the shared playing flag back on; tests flip it off to
    /// simulate a track ending.
    struct MockBackend {
        events: EventLog,
        playing: Arc<AtomicBool>,
    }

    struct MockHandle {
        events: EventLog,
        playing: Arc<AtomicBool>,
    }

    impl AudioBackend for MockBackend {
        type Handle = MockHandle;

        fn start(&mut self, path: &Path) -> Result<MockHandle> {
            self.playing.store(true, Ordering::SeqCst);
            self.events
                .lock()
                .unwrap()
                .push(MockEvent::Start(path.to_path_buf(), Instant::now()));
            Ok(MockHandle {
                events: self.events.clone(),
                playing: self.playing.clone(),
            })
        }
    }

    impl PlaybackHandle for MockHandle {
        fn is_playing(&self) -> bool {
            let playing = self.playing.load(Ordering::SeqCst);
            if !playing {
                self.events
                    .lock()
                    .unwrap()
                    .push(MockEvent::FinishedPoll(Instant::now()));
            }
            playing
        }

        fn stop(&mut self) {
            self.events.lock().unwrap().push(MockEvent::Stop(Instant::now()));
        }
    }

    struct Fixture {
        _dir: TempDir,
        library: TrackLibrary,
        events: EventLog,
        playing: Arc<AtomicBool>,
        backend: MockBackend,
    }

    /// Library on disk with a silence placeholder and the given track stems.
    fn fixture(tracks: &[&str]) -> Fixture {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("silence.mp3"), b"").unwrap();
        let game_dir = dir.path().join("new-horizons");
        std::fs::create_dir_all(&game_dir).unwrap();
        for stem in tracks {
            std::fs::write(game_dir.join(format!("{}.mp3", stem)), b"").unwrap();
        }

        let library = TrackLibrary::new(dir.path(), Game::NewHorizons);
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let playing = Arc::new(AtomicBool::new(false));
        let backend = MockBackend {
            events: events.clone(),
            playing: playing.clone(),
        };
        Fixture {
            _dir: dir,
            library,
            events,
            playing,
            backend,
        }
    }

    fn key(hour: u8, weather: WeatherKind) -> SceneKey {
        SceneKey::new(HourLabel::from_hour(hour), weather)
    }

    fn starts(events: &[MockEvent]) -> Vec<PathBuf> {
        events
            .iter()
            .filter_map(|e| match e {
                MockEvent::Start(path, _) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    /// Walks the log counting live handles; the count must never exceed one
    /// and every start after the first must be preceded by a stop.
    fn assert_single_handle_invariant(events: &[MockEvent]) {
        let mut live = 0i32;
        for event in events {
            match event {
                MockEvent::Start(_, _) => {
                    live += 1;
                    assert!(live <= 1, "two handles live at once: {:?}", events);
                }
                MockEvent::Stop(_) => live -= 1,
                MockEvent::FinishedPoll(_) => {}
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_plays_silence_placeholder() {
        let f = fixture(&[]);
        let silence = f.library.silence().unwrap();
        let (_tx, rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(Player::new(f.backend, f.library, rx).run());
        tokio::time::sleep(Duration::from_secs(1)).await;
        task.abort();

        assert_eq!(starts(&f.events.lock().unwrap()), vec![silence]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latest_key_wins_when_events_pile_up() {
        let f = fixture(&["9am_sunny", "9am_rainy", "10am_snowy"]);
        let expected = f
            .library
            .resolve(&key(10, WeatherKind::Snowy))
            .unwrap();
        let (tx, rx) = mpsc::unbounded_channel();

        // All three arrive before the player's first poll; the two stale
        // scenes must be coalesced away.
        tx.send(key(9, WeatherKind::Sunny)).unwrap();
        tx.send(key(9, WeatherKind::Rainy)).unwrap();
        tx.send(key(10, WeatherKind::Snowy)).unwrap();

        let task = tokio::spawn(Player::new(f.backend, f.library, rx).run());
        tokio::time::sleep(Duration::from_secs(5)).await;
        task.abort();

        let events = f.events.lock().unwrap();
        let started = starts(&events);
        assert_eq!(started.len(), 2, "silence + latest only: {:?}", started);
        assert_eq!(started[1], expected);
        assert_single_handle_invariant(&events);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_track_key_does_not_restart() {
        let f = fixture(&["9am_sunny"]);
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(key(9, WeatherKind::Sunny)).unwrap();
        let task = tokio::spawn(Player::new(f.backend, f.library, rx).run());
        tokio::time::sleep(Duration::from_secs(5)).await;

        // The same scene again must not touch the handle.
        tx.send(key(9, WeatherKind::Sunny)).unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;
        task.abort();

        assert_eq!(starts(&f.events.lock().unwrap()).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_track_restarts_within_gap_window() {
        let f = fixture(&[]);
        let silence = f.library.silence().unwrap();
        let (_tx, rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(Player::new(f.backend, f.library, rx).run());
        tokio::time::sleep(Duration::from_secs(1)).await;

        // Simulate the track ending on its own.
        f.playing.store(false, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(200)).await;
        task.abort();

        let events = f.events.lock().unwrap();
        let finished_at = events
            .iter()
            .find_map(|e| match e {
                MockEvent::FinishedPoll(at) => Some(*at),
                _ => None,
            })
            .expect("player observed completion");
        let (restarted, restarted_at) = events
            .iter()
            .find_map(|e| match e {
                MockEvent::Start(path, at) if *at > finished_at => Some((path.clone(), *at)),
                _ => None,
            })
            .expect("player restarted after the gap");

        let gap = restarted_at - finished_at;
        assert!(gap >= Duration::from_secs(30), "gap too short: {:?}", gap);
        assert!(gap < Duration::from_secs(120), "gap too long: {:?}", gap);
        assert_eq!(restarted, silence, "restart must replay the same track");
        assert_single_handle_invariant(&events);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scene_key_arriving_mid_gap_wins_over_restart() {
        let f = fixture(&["2pm_snowy"]);
        let expected = f.library.resolve(&key(14, WeatherKind::Snowy)).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(Player::new(f.backend, f.library, rx).run());
        tokio::time::sleep(Duration::from_secs(1)).await;

        f.playing.store(false, Ordering::SeqCst);
        // Well inside the gap (which is at least 30s long).
        tokio::time::sleep(Duration::from_secs(6)).await;
        tx.send(key(14, WeatherKind::Snowy)).unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        task.abort();

        let events = f.events.lock().unwrap();
        let finished_at = events
            .iter()
            .find_map(|e| match e {
                MockEvent::FinishedPoll(at) => Some(*at),
                _ => None,
            })
            .unwrap();
        let (switched, switched_at) = events
            .iter()
            .find_map(|e| match e {
                MockEvent::Start(path, at) if *at > finished_at => Some((path.clone(), *at)),
                _ => None,
            })
            .expect("player switched during the gap");

        assert_eq!(switched, expected);
        assert!(
            switched_at - finished_at < Duration::from_secs(30),
            "switch should not have waited for the gap to elapse"
        );
        assert_single_handle_invariant(&events);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_loss_is_fatal() {
        let f = fixture(&[]);
        let (tx, rx) = mpsc::unbounded_channel::<SceneKey>();
        drop(tx);

        let result = Player::new(f.backend, f.library, rx).run().await;
        assert!(matches!(result, Err(Error::EngineStopped("scheduler"))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_track_for_new_scene_is_fatal() {
        let f = fixture(&[]);
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(key(9, WeatherKind::Rainy)).unwrap();

        let task = tokio::spawn(Player::new(f.backend, f.library, rx).run());
        tokio::time::sleep(Duration::from_secs(5)).await;

        let result = task.await.expect("player task finished");
        assert!(matches!(result, Err(Error::TrackNotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_silence_is_fatal_at_startup() {
        let dir = TempDir::new().unwrap();
        let library = TrackLibrary::new(dir.path(), Game::NewHorizons);
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let backend = MockBackend {
            events,
            playing: Arc::new(AtomicBool::new(false)),
        };
        let (_tx, rx) = mpsc::unbounded_channel();

        let result = Player::new(backend, library, rx).run().await;
        assert!(matches!(result, Err(Error::TrackNotFound(_))));
    }
}
