use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LyricError {
    #[error("SRT file '{}' not found.", path.display())]
    FileNotFound { path: PathBuf },

    #[error("{0}")]
    Parse(String),

    #[error("Failed to read subtitle file: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid subtitle pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Reasons audio playback could not be started.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Audio file '{}' not found.", path.display())]
    AudioMissing { path: PathBuf },

    #[error("Could not find a command-line audio player (ffplay/afplay/vlc/mpg123).")]
    Unavailable,

    #[error("Failed to start {player}: {source}")]
    Spawn {
        player: &'static str,
        #[source]
        source: io::Error,
    },
}
