//! The puzzle service: the only place request-level policy lives.
//!
//! Exactly one puzzle is live at a time: today's (server UTC day) slot 0.
//! Guesses for any other slot are refused without scoring, and past answers
//! are only revealed for days strictly before today.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::{
    AnswersOutcome, AnswersRequest, Failure, FailureReason, GuessOutcome, GuessRequest,
    PastAnswers, RejectReason, Rejection, Reloaded, Request, Response, ScoredGuess,
};
use crate::config::PuzzleConfig;
use crate::day_key::{Clock, DayKey, SystemClock};
use crate::error::{PuzzleError, Result};
use crate::evaluator::evaluate;
use crate::selector::{puzzle_id, select_answer};
use crate::wordbank::{WordSet, WordlistLoader, is_word_of_length};
use crate::{debug_log, info_log};

/// The only slot index open for play.
pub const LIVE_IDX: u32 = 0;
/// Most day keys served by one past-answers request; extras are dropped.
pub const MAX_DAY_KEYS: usize = 20;
/// Advisory attached to out-of-list guesses scored in permissive mode.
pub const DEV_SCORED_WARNING: &str = "not_in_word_list_dev_scored";

pub struct PuzzleService {
    config: PuzzleConfig,
    loader: WordlistLoader,
    clock: Box<dyn Clock>,
}

impl PuzzleService {
    /// Service reading the configured word files against the system clock.
    ///
    /// In trusted mode the word lists are loaded here, so a broken
    /// configuration fails at startup instead of on the first request.
    pub fn new(config: PuzzleConfig) -> Result<Self> {
        let loader = WordlistLoader::from_config(&config);
        Self::with_parts(config, loader, Box::new(SystemClock))
    }

    pub fn with_parts(
        config: PuzzleConfig,
        loader: WordlistLoader,
        clock: Box<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        if loader.word_length() != config.word_length || loader.mode() != config.mode {
            return Err(PuzzleError::Configuration(format!(
                "word list loader ({} letters, {:?}) does not match the configuration ({} letters, {:?})",
                loader.word_length(),
                loader.mode(),
                config.word_length,
                config.mode
            )));
        }
        let service = Self {
            config,
            loader,
            clock,
        };
        if service.config.mode.caches_wordlists() {
            service.loader.load()?;
        }
        info_log!("puzzle service ready in {:?} mode", service.config.mode);
        Ok(service)
    }

    pub fn config(&self) -> &PuzzleConfig {
        &self.config
    }

    /// Today's day key according to the server clock.
    pub fn server_day_key(&self) -> DayKey {
        self.clock.today()
    }

    pub fn wordlists(&self) -> Result<Arc<WordSet>> {
        self.loader.load()
    }

    pub fn reload_wordlists(&self) -> Result<Arc<WordSet>> {
        self.loader.reload()
    }

    pub fn wordlist_sources(&self) -> (String, String) {
        self.loader.sources()
    }

    fn answer_for(&self, words: &WordSet, day: &DayKey, idx: u32) -> Result<String> {
        select_answer(day, idx, self.config.secret.as_bytes(), words.answers()).map(str::to_owned)
    }

    /// Check and score one guess, reporting refusals as typed errors.
    pub fn check_guess(&self, day_key: &str, idx: i64, guess_raw: &str) -> Result<ScoredGuess> {
        let server_day = self.server_day_key();
        if day_key.trim() != server_day.to_string() || idx != i64::from(LIVE_IDX) {
            return Err(PuzzleError::LockedPuzzle {
                server_day_key: server_day,
            });
        }

        let guess = guess_raw.trim().to_lowercase();
        if !is_word_of_length(&guess, self.config.word_length) {
            return Err(PuzzleError::BadFormat {
                expected: self.config.word_length,
            });
        }

        let words = self.loader.load()?;
        let mut warning = String::new();
        if !words.is_allowed(&guess) {
            if self.config.mode.strict_membership() {
                return Err(PuzzleError::NotInWordList(guess));
            }
            warning = DEV_SCORED_WARNING.to_string();
        }

        let answer = self.answer_for(&words, &server_day, LIVE_IDX)?;
        let result = evaluate(&guess, &answer)?;
        let id = puzzle_id(&server_day, LIVE_IDX);
        debug_log!("scored guess for {}: {}", id, result);
        Ok(ScoredGuess {
            ok: true,
            valid: true,
            warning,
            day_key: server_day,
            idx: LIVE_IDX,
            puzzle_id: id,
            is_solved: guess == answer,
            guess,
            result,
        })
    }

    /// Loose request fields are coerced first: a day key that is not text
    /// and an idx that is not a whole number both end up locked.
    pub fn submit_guess(&self, request: &GuessRequest) -> GuessOutcome {
        let Some(idx) = request.idx_number() else {
            return GuessOutcome::Failed(Failure::new(
                FailureReason::LockedTodayIdx0,
                Some(self.server_day_key()),
            ));
        };
        match self.check_guess(&request.day_key_text(), idx, &request.guess_text()) {
            Ok(scored) => GuessOutcome::Scored(scored),
            Err(PuzzleError::BadFormat { .. }) => {
                GuessOutcome::Rejected(Rejection::new(RejectReason::BadFormat))
            }
            Err(PuzzleError::NotInWordList(_)) => {
                GuessOutcome::Rejected(Rejection::new(RejectReason::NotInWordList))
            }
            Err(err) => GuessOutcome::Failed(self.failure_from(err)),
        }
    }

    /// Answers for the requested days that are strictly before today.
    ///
    /// Malformed, duplicate and non-past day keys are dropped; only the
    /// first [`MAX_DAY_KEYS`] well-formed keys are considered.
    pub fn past_answers_for<S: AsRef<str>>(&self, idx: i64, day_keys: &[S]) -> Result<PastAnswers> {
        let server_day = self.server_day_key();
        if idx != i64::from(LIVE_IDX) {
            return Err(PuzzleError::LockedPuzzle {
                server_day_key: server_day,
            });
        }

        let wanted: Vec<DayKey> = day_keys
            .iter()
            .filter_map(|raw| raw.as_ref().parse::<DayKey>().ok())
            .take(MAX_DAY_KEYS)
            .collect();

        let mut answers = BTreeMap::new();
        let past: Vec<DayKey> = wanted
            .into_iter()
            .filter(|day| day.is_before(&server_day))
            .collect();
        if !past.is_empty() {
            let words = self.loader.load()?;
            for day in past {
                let answer = self.answer_for(&words, &day, LIVE_IDX)?;
                answers.insert(day, answer);
            }
        }
        debug_log!("revealed {} past answers", answers.len());
        Ok(PastAnswers {
            ok: true,
            server_day_key: server_day,
            idx: LIVE_IDX,
            answers,
        })
    }

    pub fn past_answers(&self, request: &AnswersRequest) -> AnswersOutcome {
        let day_keys: Vec<&str> = match &request.day_keys {
            None => Vec::new(),
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            Some(_) => {
                return AnswersOutcome::Failed(Failure::new(
                    FailureReason::BadFormatDayKeys,
                    Some(self.server_day_key()),
                ));
            }
        };
        let Some(idx) = request.idx_number() else {
            return AnswersOutcome::Failed(Failure::new(
                FailureReason::LockedIdx0,
                Some(self.server_day_key()),
            ));
        };
        match self.past_answers_for(idx, &day_keys) {
            Ok(past) => AnswersOutcome::Answers(past),
            Err(PuzzleError::LockedPuzzle { server_day_key }) => AnswersOutcome::Failed(
                Failure::new(FailureReason::LockedIdx0, Some(server_day_key)),
            ),
            Err(err) => AnswersOutcome::Failed(self.failure_from(err)),
        }
    }

    pub fn handle(&self, request: &Request) -> Response {
        match request {
            Request::Guess(guess) => Response::Guess(self.submit_guess(guess)),
            Request::Answers(answers) => Response::Answers(self.past_answers(answers)),
            Request::Reload => match self.reload_wordlists() {
                Ok(words) => {
                    log::info!("word lists reloaded on request");
                    Response::Reloaded(Reloaded {
                        ok: true,
                        counts: words.counts(),
                    })
                }
                Err(err) => Response::Failed(self.failure_from(err)),
            },
        }
    }

    /// Opaque failure for the caller; the detail only goes to the log.
    fn failure_from(&self, err: PuzzleError) -> Failure {
        match err {
            PuzzleError::LockedPuzzle { server_day_key } => {
                Failure::new(FailureReason::LockedTodayIdx0, Some(server_day_key))
            }
            err if err.is_configuration() => {
                log::error!("word lists unavailable: {err}");
                Failure::new(FailureReason::ServiceUnavailable, None)
            }
            err => {
                log::error!("puzzle request failed: {err}");
                Failure::new(FailureReason::ServerError, None)
            }
        }
    }
}
