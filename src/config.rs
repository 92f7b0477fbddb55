use std::path::PathBuf;

use crate::error::{PuzzleError, Result};

pub const DEFAULT_WORD_LENGTH: usize = 5;
pub const MAX_WORD_LENGTH: usize = 15;
pub const DEV_SECRET: &str = "dev-secret-change-me";

const DATA_DIR_NAME: &str = "daily-word";
const ANSWERS_FILE: &str = "answers.txt";
const GUESSES_FILE: &str = "guesses.txt";

/// How much the service trusts its environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Mode {
    /// Word lists load once and are cached; out-of-list guesses are rejected.
    #[default]
    Trusted,
    /// Word lists reload on every call; out-of-list guesses are scored with a warning.
    Permissive,
}

impl Mode {
    pub fn caches_wordlists(self) -> bool {
        self == Mode::Trusted
    }

    pub fn strict_membership(self) -> bool {
        self == Mode::Trusted
    }
}

#[derive(Clone)]
pub struct PuzzleConfig {
    pub secret: String,
    pub word_length: usize,
    pub answers_path: PathBuf,
    pub guesses_path: PathBuf,
    pub mode: Mode,
}

impl std::fmt::Debug for PuzzleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PuzzleConfig")
            .field("secret", &"<redacted>")
            .field("word_length", &self.word_length)
            .field("answers_path", &self.answers_path)
            .field("guesses_path", &self.guesses_path)
            .field("mode", &self.mode)
            .finish()
    }
}

/// Directory holding `answers.txt` and `guesses.txt` when no path is given.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(DATA_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl PuzzleConfig {
    /// Development defaults: built-in secret, default paths, permissive mode.
    pub fn development() -> Self {
        let dir = default_data_dir();
        Self {
            secret: DEV_SECRET.to_string(),
            word_length: DEFAULT_WORD_LENGTH,
            answers_path: dir.join(ANSWERS_FILE),
            guesses_path: dir.join(GUESSES_FILE),
            mode: Mode::Permissive,
        }
    }

    pub fn default_answers_path() -> PathBuf {
        default_data_dir().join(ANSWERS_FILE)
    }

    pub fn default_guesses_path() -> PathBuf {
        default_data_dir().join(GUESSES_FILE)
    }

    pub fn validate(&self) -> Result<()> {
        if self.secret.is_empty() {
            return Err(PuzzleError::Configuration("secret must not be empty".into()));
        }
        if self.mode == Mode::Trusted && self.secret == DEV_SECRET {
            return Err(PuzzleError::Configuration(
                "trusted mode needs its own secret, not the development default".into(),
            ));
        }
        if self.word_length == 0 || self.word_length > MAX_WORD_LENGTH {
            return Err(PuzzleError::Configuration(format!(
                "word length must be between 1 and {MAX_WORD_LENGTH}, got {}",
                self.word_length
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trusted(secret: &str) -> PuzzleConfig {
        PuzzleConfig {
            secret: secret.to_string(),
            mode: Mode::Trusted,
            ..PuzzleConfig::development()
        }
    }

    #[test]
    fn test_development_config_is_valid() {
        assert!(PuzzleConfig::development().validate().is_ok());
    }

    #[test]
    fn test_trusted_rejects_dev_secret() {
        let err = trusted(DEV_SECRET).validate().unwrap_err();
        assert!(err.is_configuration());
        assert!(trusted("prod-secret").validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_secret() {
        let config = PuzzleConfig {
            secret: String::new(),
            ..PuzzleConfig::development()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_word_length_bounds() {
        for (len, ok) in [(0, false), (1, true), (5, true), (15, true), (16, false)] {
            let config = PuzzleConfig {
                word_length: len,
                ..PuzzleConfig::development()
            };
            assert_eq!(config.validate().is_ok(), ok, "word length {len}");
        }
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", trusted("super-secret-value"));
        assert!(!rendered.contains("super-secret-value"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_mode_policies() {
        assert!(Mode::Trusted.caches_wordlists());
        assert!(Mode::Trusted.strict_membership());
        assert!(!Mode::Permissive.caches_wordlists());
        assert!(!Mode::Permissive.strict_membership());
        assert_eq!(Mode::default(), Mode::Trusted);
    }
}
