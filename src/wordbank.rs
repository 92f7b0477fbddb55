//! Word list loading.
//!
//! Two line-delimited sources feed a [`WordSet`]: the answers pool (the only
//! words ever selected) and the allowed guesses. Lines are trimmed and
//! lowercased; anything that is not exactly `word_length` ASCII letters is
//! dropped.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::{Mode, PuzzleConfig};
use crate::debug_log;
use crate::error::{PuzzleError, Result};

/// Where a word list comes from.
pub trait WordSource: Send + Sync {
    /// Human-readable location, used in logs and error messages.
    fn describe(&self) -> String;

    /// Full text of the source, or `None` if it does not exist.
    fn read(&self) -> Result<Option<String>>;
}

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl WordSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PuzzleError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

/// In-memory word list.
#[derive(Debug, Clone)]
pub struct StaticSource(pub String);

impl StaticSource {
    pub fn from_words(words: &[&str]) -> Self {
        Self(words.join("\n"))
    }
}

impl WordSource for StaticSource {
    fn describe(&self) -> String {
        "<in-memory>".to_string()
    }

    fn read(&self) -> Result<Option<String>> {
        Ok(Some(self.0.clone()))
    }
}

/// Exactly `word_length` lowercase ASCII letters.
pub fn is_word_of_length(word: &str, word_length: usize) -> bool {
    word.len() == word_length && word.bytes().all(|b| b.is_ascii_lowercase())
}

/// Normalize raw text into unique words, keeping first-occurrence order.
pub fn load_words_from_str(data: &str, word_length: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    data.lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|word| is_word_of_length(word, word_length))
        .filter(|word| seen.insert(word.clone()))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordCounts {
    pub answers: usize,
    pub guesses: usize,
    pub total_allowed: usize,
}

/// Immutable, validated pair of word lists.
#[derive(Debug, Clone)]
pub struct WordSet {
    answers: Vec<String>,
    guesses: Vec<String>,
    allowed: HashSet<String>,
    word_length: usize,
}

impl WordSet {
    /// Build from raw source text. Fails if no usable answers remain.
    pub fn from_texts(answers_text: &str, guesses_text: &str, word_length: usize) -> Result<Self> {
        let answers = load_words_from_str(answers_text, word_length);
        if answers.is_empty() {
            return Err(PuzzleError::Configuration(format!(
                "answers list has no {word_length}-letter words"
            )));
        }
        let guesses = load_words_from_str(guesses_text, word_length);
        // every answer is always a legal guess
        let allowed = answers.iter().chain(guesses.iter()).cloned().collect();
        Ok(Self {
            answers,
            guesses,
            allowed,
            word_length,
        })
    }

    /// Answers in source order. Selection indexes into this order.
    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn guesses(&self) -> &[String] {
        &self.guesses
    }

    pub fn is_allowed(&self, word: &str) -> bool {
        self.allowed.contains(word)
    }

    pub fn word_length(&self) -> usize {
        self.word_length
    }

    pub fn counts(&self) -> WordCounts {
        WordCounts {
            answers: self.answers.len(),
            guesses: self.guesses.len(),
            total_allowed: self.allowed.len(),
        }
    }
}

/// Loads a [`WordSet`] and, in trusted mode, keeps it for the life of the loader.
pub struct WordlistLoader {
    answers: Box<dyn WordSource>,
    guesses: Box<dyn WordSource>,
    word_length: usize,
    mode: Mode,
    cache: RwLock<Option<Arc<WordSet>>>,
}

impl WordlistLoader {
    pub fn new(
        answers: Box<dyn WordSource>,
        guesses: Box<dyn WordSource>,
        word_length: usize,
        mode: Mode,
    ) -> Self {
        Self {
            answers,
            guesses,
            word_length,
            mode,
            cache: RwLock::new(None),
        }
    }

    pub fn from_config(config: &PuzzleConfig) -> Self {
        Self::new(
            Box::new(FileSource::new(&config.answers_path)),
            Box::new(FileSource::new(&config.guesses_path)),
            config.word_length,
            config.mode,
        )
    }

    pub fn word_length(&self) -> usize {
        self.word_length
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn sources(&self) -> (String, String) {
        (self.answers.describe(), self.guesses.describe())
    }

    /// Current word set. Permissive mode rebuilds on every call.
    pub fn load(&self) -> Result<Arc<WordSet>> {
        if !self.mode.caches_wordlists() {
            return self.build().map(Arc::new);
        }
        if let Some(cached) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Ok(Arc::clone(cached));
        }
        let mut slot = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = slot.as_ref() {
            return Ok(Arc::clone(cached));
        }
        let words = Arc::new(self.build()?);
        *slot = Some(Arc::clone(&words));
        Ok(words)
    }

    /// Rebuild from the sources and replace the cache, whatever the mode.
    pub fn reload(&self) -> Result<Arc<WordSet>> {
        let words = Arc::new(self.build()?);
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&words));
        Ok(words)
    }

    fn build(&self) -> Result<WordSet> {
        let answers_text = self.answers.read()?.ok_or_else(|| {
            PuzzleError::Configuration(format!(
                "answers source {} is missing",
                self.answers.describe()
            ))
        })?;
        let guesses_text = self.guesses.read()?.unwrap_or_default();
        let words = WordSet::from_texts(&answers_text, &guesses_text, self.word_length)?;
        let counts = words.counts();
        if self.mode.caches_wordlists() {
            log::info!(
                "loaded word lists: {} answers, {} guesses, {} allowed",
                counts.answers,
                counts.guesses,
                counts.total_allowed
            );
        } else {
            debug_log!(
                "reloaded word lists: {} answers, {} guesses, {} allowed",
                counts.answers,
                counts.guesses,
                counts.total_allowed
            );
        }
        Ok(words)
    }
}
