// Library interface for daily-word
// The binary and the integration tests both go through this surface

pub mod api;
pub mod cli;
pub mod config;
pub mod day_key;
pub mod error;
pub mod evaluator;
pub mod logging;
pub mod selector;
pub mod service;
pub mod wordbank;

// Re-export commonly used items for easier testing
pub use api::{AnswersOutcome, AnswersRequest, GuessOutcome, GuessRequest, Request, Response};
pub use config::{Mode, PuzzleConfig};
pub use day_key::{Clock, DayKey, FixedClock, SystemClock};
pub use error::{PuzzleError, Result};
pub use evaluator::{GuessVerdict, LetterVerdict, evaluate};
pub use selector::{puzzle_id, select_answer};
pub use service::PuzzleService;
pub use wordbank::{FileSource, StaticSource, WordSet, WordSource, WordlistLoader, load_words_from_str};
