//! JSON request and response shapes exchanged with the HTTP layer.
//!
//! Every response carries `ok`; guess responses that reached the format or
//! word-list checks also carry `valid`. Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::day_key::DayKey;
use crate::evaluator::GuessVerdict;
use crate::wordbank::WordCounts;

/// Guess submission. Fields stay loose JSON and are coerced by the accessors,
/// so a stale or sloppy client still gets a locked or bad-format answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuessRequest {
    pub day_key: Value,
    pub idx: Value,
    pub guess: Value,
}

impl GuessRequest {
    pub fn new(day_key: &str, idx: i64, guess: &str) -> Self {
        Self {
            day_key: Value::from(day_key),
            idx: Value::from(idx),
            guess: Value::from(guess),
        }
    }

    /// The requested day as text; anything but a string or number is empty.
    pub fn day_key_text(&self) -> String {
        loose_text(&self.day_key)
    }

    /// The requested slot, or `None` when it is not a whole number.
    pub fn idx_number(&self) -> Option<i64> {
        loose_integer(&self.idx)
    }

    /// The guess as text; null and non-scalar values are empty.
    pub fn guess_text(&self) -> String {
        loose_text(&self.guess)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnswersRequest {
    pub idx: Value,
    /// Expected to be an array of day-key strings; anything else is rejected.
    pub day_keys: Option<Value>,
}

impl AnswersRequest {
    pub fn new(idx: i64, day_keys: Value) -> Self {
        Self {
            idx: Value::from(idx),
            day_keys: Some(day_keys),
        }
    }

    pub fn idx_number(&self) -> Option<i64> {
        loose_integer(&self.idx)
    }
}

fn loose_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Whole-number reading of a loose value. Null, missing and blank strings
/// count as 0; fractional, non-numeric and compound values have none.
fn loose_integer(value: &Value) -> Option<i64> {
    let number = match value {
        Value::Null => return Some(0),
        Value::Bool(b) => return Some(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            n.as_f64()?
        }
        Value::String(s) if s.trim().is_empty() => return Some(0),
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Array(_) | Value::Object(_) => return None,
    };
    if number.is_finite() && number.fract() == 0.0 && number.abs() < 9.0e15 {
        Some(number as i64)
    } else {
        None
    }
}

/// One line of the request stream, tagged by `op`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Request {
    Guess(GuessRequest),
    Answers(AnswersRequest),
    /// Re-read the word sources, replacing any cached lists.
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    BadFormat,
    NotInWordList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    #[serde(rename = "locked_today_idx0")]
    LockedTodayIdx0,
    #[serde(rename = "locked_idx0")]
    LockedIdx0,
    #[serde(rename = "bad_format_dayKeys")]
    BadFormatDayKeys,
    #[serde(rename = "bad_request")]
    BadRequest,
    #[serde(rename = "service_unavailable")]
    ServiceUnavailable,
    #[serde(rename = "server_error")]
    ServerError,
}

impl FailureReason {
    /// HTTP status the web layer should answer with.
    pub fn status(self) -> u16 {
        match self {
            Self::LockedTodayIdx0 | Self::LockedIdx0 => 403,
            Self::BadFormatDayKeys => 200,
            Self::BadRequest => 400,
            Self::ServiceUnavailable => 503,
            Self::ServerError => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    pub ok: bool,
    pub reason: FailureReason,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub server_day_key: Option<DayKey>,
}

impl Failure {
    pub fn new(reason: FailureReason, server_day_key: Option<DayKey>) -> Self {
        Self {
            ok: false,
            reason,
            server_day_key,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub ok: bool,
    pub valid: bool,
    pub reason: RejectReason,
}

impl Rejection {
    pub fn new(reason: RejectReason) -> Self {
        Self {
            ok: true,
            valid: false,
            reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredGuess {
    pub ok: bool,
    pub valid: bool,
    /// Empty, or an advisory such as a dev-mode out-of-list guess.
    pub warning: String,
    pub day_key: DayKey,
    pub idx: u32,
    pub puzzle_id: String,
    pub guess: String,
    pub result: GuessVerdict,
    pub is_solved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PastAnswers {
    pub ok: bool,
    pub server_day_key: DayKey,
    pub idx: u32,
    pub answers: BTreeMap<DayKey, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reloaded {
    pub ok: bool,
    pub counts: WordCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GuessOutcome {
    Scored(ScoredGuess),
    Rejected(Rejection),
    Failed(Failure),
}

impl GuessOutcome {
    pub fn status(&self) -> u16 {
        match self {
            Self::Scored(_) | Self::Rejected(_) => 200,
            Self::Failed(failure) => failure.reason.status(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AnswersOutcome {
    Answers(PastAnswers),
    Failed(Failure),
}

impl AnswersOutcome {
    pub fn status(&self) -> u16 {
        match self {
            Self::Answers(_) => 200,
            Self::Failed(failure) => failure.reason.status(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Guess(GuessOutcome),
    Answers(AnswersOutcome),
    Reloaded(Reloaded),
    Failed(Failure),
}

impl Response {
    pub fn status(&self) -> u16 {
        match self {
            Self::Guess(outcome) => outcome.status(),
            Self::Answers(outcome) => outcome.status(),
            Self::Reloaded(_) => 200,
            Self::Failed(failure) => failure.reason.status(),
        }
    }
}
