//! Track library: resolves a scene key to an audio file on disk.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::scene::SceneKey;

/// Track file extension used throughout a library.
const TRACK_EXT: &str = "mp3";

/// Filename of the placeholder played while no real track is known yet.
const SILENCE_FILE: &str = "silence.mp3";

/// Which game's soundtrack directory to play from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Game {
    NewHorizons,
    NewLeaf,
    WildWorld,
    AnimalCrossing,
}

impl Game {
    /// Parses a library name from the config file. Unrecognized names fall
    /// back to New Horizons with a warning rather than failing.
    pub fn from_name(name: &str) -> Self {
        match name {
            "new-horizons" => Self::NewHorizons,
            "new-leaf" => Self::NewLeaf,
            "wild-world" => Self::WildWorld,
            "animal-crossing" => Self::AnimalCrossing,
            other => {
                tracing::warn!("Game '{}' not recognized, choosing new-horizons", other);
                Self::NewHorizons
            }
        }
    }

    /// Directory name of this game's tracks under the library root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::NewHorizons => "new-horizons",
            Self::NewLeaf => "new-leaf",
            Self::WildWorld => "wild-world",
            Self::AnimalCrossing => "animal-crossing",
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// A named collection of tracks keyed by scene, laid out as
/// `<root>/<game>/<hour>_<weather>.mp3`.
pub struct TrackLibrary {
    root: PathBuf,
    game: Game,
}

impl TrackLibrary {
    pub fn new<P: AsRef<Path>>(root: P, game: Game) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            game,
        }
    }

    pub fn game(&self) -> Game {
        self.game
    }

    /// Resolves a scene key to its track path. A missing file is fatal:
    /// there is no fallback track to substitute.
    pub fn resolve(&self, key: &SceneKey) -> Result<PathBuf> {
        let path = self
            .root
            .join(self.game.dir_name())
            .join(format!("{}.{}", key, TRACK_EXT));
        if !path.exists() {
            return Err(Error::TrackNotFound(path));
        }
        Ok(path)
    }

    /// Path of the silence placeholder used to initialize the audio backend
    /// before the first scene key arrives.
    pub fn silence(&self) -> Result<PathBuf> {
        let path = self.root.join(SILENCE_FILE);
        if !path.exists() {
            return Err(Error::TrackNotFound(path));
        }
        Ok(path)
    }
}
