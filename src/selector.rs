//! Deterministic daily answer selection.
//!
//! The answer for a puzzle slot is `answers[seed % answers.len()]`, where
//! `seed` is the first 48 bits of `HMAC-SHA256(secret, "<dayKey>:<idx>")`.
//! Nothing is stored: the same inputs always give the same word, and nobody
//! without the secret can work out tomorrow's word. Reordering or resizing
//! the answers list changes past answers too.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::day_key::DayKey;
use crate::error::{PuzzleError, Result};

type HmacSha256 = Hmac<Sha256>;

pub const PUZZLE_NAMESPACE: &str = "wordle";

/// Bytes of digest used for the seed (48 bits).
const SEED_BYTES: usize = 6;

/// Opaque correlation token for a puzzle slot. Never used as entropy.
pub fn puzzle_id(day: &DayKey, idx: u32) -> String {
    format!("{PUZZLE_NAMESPACE}:{day}:{idx}")
}

/// First 48 bits of the keyed digest of `"<day>:<idx>"`, big-endian.
pub fn slot_seed(day: &DayKey, idx: u32, secret: &[u8]) -> Result<u64> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|_| PuzzleError::Configuration("secret is not a usable HMAC key".into()))?;
    mac.update(format!("{day}:{idx}").as_bytes());
    let digest = mac.finalize().into_bytes();
    Ok(digest[..SEED_BYTES]
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)))
}

/// Index into an answers pool of `pool_size` words.
pub fn select_index(day: &DayKey, idx: u32, secret: &[u8], pool_size: usize) -> Result<usize> {
    if pool_size == 0 {
        return Err(PuzzleError::InvalidInput("no answers configured".into()));
    }
    Ok((slot_seed(day, idx, secret)? % pool_size as u64) as usize)
}

/// The answer for `(day, idx)`.
pub fn select_answer<'a>(
    day: &DayKey,
    idx: u32,
    secret: &[u8],
    answers: &'a [String],
) -> Result<&'a str> {
    let index = select_index(day, idx, secret, answers.len())?;
    Ok(answers[index].as_str())
}
