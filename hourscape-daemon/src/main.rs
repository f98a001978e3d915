//! Hourscape daemon: plays looping ambient music picked by the current hour
//! and the weather reported by Home Assistant.
//!
//! Two engine tasks run for the process lifetime, joined by a one-way
//! channel: the scheduler samples clock and weather once per hour and emits
//! scene changes; the player keeps audio running and reacts to them. Loss of
//! either engine takes the whole process down — there is no degraded
//! half-running mode.

use std::process::ExitCode;

use tokio::signal;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tracing_subscriber::EnvFilter;

use hourscape_core::config::{self, Config};
use hourscape_core::engines::{KiraBackend, Player, Scheduler};
use hourscape_core::library::TrackLibrary;
use hourscape_core::weather::HomeAssistant;
use hourscape_core::Error;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e @ Error::ConfigTemplateWritten(_)) => {
            tracing::error!("{}", e);
            return ExitCode::from(2);
        }
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> hourscape_core::Result<Config> {
    let path = config::default_config_path()?;
    config::load(&path)
}

async fn run(config: Config) -> anyhow::Result<()> {
    let game = config.game();
    let library = TrackLibrary::new(config.library_root(), game);
    let weather = HomeAssistant::new(&config.home_assistant);
    let backend = KiraBackend::new()?;

    let (tx, rx) = mpsc::unbounded_channel();
    let mut scheduler = tokio::spawn(Scheduler::new(weather).run(tx));
    let mut player = tokio::spawn(Player::new(backend, library, rx).run());
    tracing::info!("Hourscape started, playing from {}", game);

    let outcome = tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("Interrupted, shutting down");
            Ok(())
        }
        res = &mut scheduler => engine_outcome("scheduler", res),
        res = &mut player => engine_outcome("player", res),
    };

    // Cancel whatever is still running. The tasks are dropped when the
    // runtime shuts down, which stops any live playback handle.
    scheduler.abort();
    player.abort();
    outcome
}

fn engine_outcome(
    name: &'static str,
    res: Result<hourscape_core::Result<()>, JoinError>,
) -> anyhow::Result<()> {
    match res {
        // The engine loops are endless; returning at all is a failure.
        Ok(Ok(())) => Err(anyhow::anyhow!("{} engine exited unexpectedly", name)),
        Ok(Err(e)) => Err(anyhow::Error::new(e).context(format!("{} engine failed", name))),
        Err(e) => Err(anyhow::anyhow!("{} engine panicked: {}", name, e)),
    }
}
