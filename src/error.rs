use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::day_key::DayKey;

/// Everything that can go wrong between loading word lists and scoring a guess.
#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("puzzle is locked; the live puzzle is {server_day_key} slot 0")]
    LockedPuzzle { server_day_key: DayKey },
    #[error("guess must be exactly {expected} lowercase letters")]
    BadFormat { expected: usize },
    #[error("'{0}' is not in the word list")]
    NotInWordList(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to read word source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PuzzleError {
    /// Configuration and I/O failures make the service unusable until fixed.
    pub fn is_configuration(&self) -> bool {
        matches!(self, PuzzleError::Configuration(_) | PuzzleError::Io { .. })
    }
}

pub type Result<T> = std::result::Result<T, PuzzleError>;
