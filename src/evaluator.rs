use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PuzzleError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterVerdict {
    /// Right letter, right position (green).
    Correct,
    /// Letter occurs elsewhere in the answer (yellow).
    Present,
    /// No unclaimed copy of the letter left in the answer (gray).
    Absent,
}

impl LetterVerdict {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'G' => Some(Self::Correct),
            'Y' => Some(Self::Present),
            'X' => Some(Self::Absent),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Self::Correct => 'G',
            Self::Present => 'Y',
            Self::Absent => 'X',
        }
    }

    pub fn emoji(self) -> char {
        match self {
            Self::Correct => '🟩',
            Self::Present => '🟨',
            Self::Absent => '⬛',
        }
    }
}

/// Per-letter verdicts, aligned with the guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuessVerdict(pub Vec<LetterVerdict>);

impl GuessVerdict {
    pub fn letters(&self) -> &[LetterVerdict] {
        &self.0
    }

    pub fn is_solved(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|v| *v == LetterVerdict::Correct)
    }

    /// Compact `G`/`Y`/`X` rendering, e.g. `GYXXG`.
    pub fn pattern(&self) -> String {
        self.0.iter().map(|v| v.to_char()).collect()
    }

    pub fn emoji_row(&self) -> String {
        self.0.iter().map(|v| v.emoji()).collect()
    }
}

impl fmt::Display for GuessVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern())
    }
}

fn letter_slot(b: u8) -> usize {
    (b - b'a') as usize
}

/// Score `guess` against `answer` with Wordle duplicate-letter rules.
///
/// Exact matches are claimed first; the remaining copies of each answer
/// letter are then handed out left to right as `Present`. A letter is never
/// credited more times than it occurs in the answer.
pub fn evaluate(guess: &str, answer: &str) -> Result<GuessVerdict> {
    let guess = guess.as_bytes();
    let answer = answer.as_bytes();
    if guess.len() != answer.len() {
        return Err(PuzzleError::InvalidInput(format!(
            "guess has {} letters but the answer has {}",
            guess.len(),
            answer.len()
        )));
    }
    if !guess.iter().chain(answer).all(u8::is_ascii_lowercase) {
        return Err(PuzzleError::InvalidInput(
            "guess and answer must be lowercase ASCII letters".into(),
        ));
    }

    let mut remaining = [0usize; 26];
    for &b in answer {
        remaining[letter_slot(b)] += 1;
    }

    // First pass: greens
    let mut verdict = vec![LetterVerdict::Absent; guess.len()];
    for (i, (&g, &a)) in guess.iter().zip(answer).enumerate() {
        if g == a {
            verdict[i] = LetterVerdict::Correct;
            remaining[letter_slot(g)] -= 1;
        }
    }
    // Second pass: yellows from whatever copies are left
    for (i, &g) in guess.iter().enumerate() {
        if verdict[i] == LetterVerdict::Correct {
            continue;
        }
        let left = &mut remaining[letter_slot(g)];
        if *left > 0 {
            verdict[i] = LetterVerdict::Present;
            *left -= 1;
        }
    }
    Ok(GuessVerdict(verdict))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(guess: &str, answer: &str) -> String {
        evaluate(guess, answer).unwrap().pattern()
    }

    #[test]
    fn test_exact_match_is_all_correct() {
        let verdict = evaluate("mango", "mango").unwrap();
        assert!(verdict.is_solved());
        assert_eq!(verdict.pattern(), "GGGGG");
    }

    #[test]
    fn test_disjoint_letters_all_absent() {
        assert_eq!(pattern("crwth", "mango"), "XXXXX");
    }

    #[test]
    fn test_mixed_feedback() {
        assert_eq!(pattern("crane", "trace"), "YGGXG");
    }

    #[test]
    fn test_duplicate_guess_letter_single_in_answer() {
        // one 'o' in mango, so only one 'o' in oomph may score
        assert_eq!(pattern("oomph", "mango"), "YXYXX");
    }

    #[test]
    fn test_duplicates_limited_by_answer_multiplicity() {
        assert_eq!(pattern("asses", "sassy"), "YYGXY");
        assert_eq!(pattern("sassy", "aspen"), "YYXXX");
    }

    #[test]
    fn test_correct_claims_before_present() {
        // both l's in hello are taken by the greens
        assert_eq!(pattern("lolly", "hello"), "XYGGX");
        assert_eq!(pattern("speed", "abide"), "XXYXY");
    }

    #[test]
    fn test_letter_credit_never_exceeds_answer_count() {
        let cases = [("eerie", "beret"), ("geese", "these"), ("aaaaa", "banal")];
        for (guess, answer) in cases {
            let verdict = evaluate(guess, answer).unwrap();
            for letter in b'a'..=b'z' {
                let credited = guess
                    .bytes()
                    .zip(verdict.letters())
                    .filter(|(g, v)| *g == letter && **v != LetterVerdict::Absent)
                    .count();
                let available = answer.bytes().filter(|a| *a == letter).count();
                assert!(credited <= available, "{guess} vs {answer}: letter {}", letter as char);
            }
        }
    }

    #[test]
    fn test_other_word_lengths() {
        assert_eq!(pattern("cat", "act"), "YYG");
        assert_eq!(pattern("planets", "planets"), "GGGGGGG");
    }

    #[test]
    fn test_length_mismatch_is_invalid_input() {
        assert!(matches!(evaluate("ab", "mango"), Err(PuzzleError::InvalidInput(_))));
    }

    #[test]
    fn test_non_lowercase_is_invalid_input() {
        assert!(evaluate("MANGO", "mango").is_err());
        assert!(evaluate("man3o", "mango").is_err());
    }

    #[test]
    fn test_from_char_round_trip() {
        for c in ['G', 'Y', 'X', 'g', 'y', 'x'] {
            let v = LetterVerdict::from_char(c).unwrap();
            assert_eq!(v.to_char(), c.to_ascii_uppercase());
        }
        assert!(LetterVerdict::from_char('A').is_none());
    }

    #[test]
    fn test_serializes_as_lowercase_tags() {
        let verdict = evaluate("oomph", "mango").unwrap();
        let json = serde_json::to_string(&verdict).unwrap();
        assert_eq!(json, r#"["present","absent","present","absent","absent"]"#);
    }

    #[test]
    fn test_emoji_row() {
        assert_eq!(evaluate("lolly", "hello").unwrap().emoji_row(), "⬛🟨🟩🟩⬛");
    }
}
