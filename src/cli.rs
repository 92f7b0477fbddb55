use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::api::{AnswersRequest, Failure, FailureReason, GuessRequest, Request, Response};
use crate::config::{DEFAULT_WORD_LENGTH, DEV_SECRET, Mode, PuzzleConfig};
use crate::debug_log;
use crate::service::{LIVE_IDX, MAX_DAY_KEYS, PuzzleService};

/// Daily word puzzle engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Key for the daily answer digest; required in trusted mode
    #[arg(long, env = "WORDLE_SECRET", hide_env_values = true, global = true)]
    pub secret: Option<String>,

    /// Letters per word
    #[arg(long, env = "WORDLE_WORD_LENGTH", default_value_t = DEFAULT_WORD_LENGTH, global = true)]
    pub word_length: usize,

    /// Path to a newline-delimited answers file
    #[arg(short = 'a', long = "answers", env = "WORDLE_ANSWERS_PATH", global = true)]
    pub answers_path: Option<PathBuf>,

    /// Path to a newline-delimited allowed-guesses file
    #[arg(short = 'g', long = "guesses", env = "WORDLE_GUESSES_PATH", global = true)]
    pub guesses_path: Option<PathBuf>,

    /// trusted: cache word lists, strict word list; permissive: reload and score anything
    #[arg(long, value_enum, env = "WORDLE_MODE", default_value_t = Mode::Trusted, global = true)]
    pub mode: Mode,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print today's day key and puzzle id
    Today,
    /// Submit a guess for today's puzzle
    Guess {
        word: String,
        /// Day the guess is for; defaults to the server's today
        #[arg(long)]
        day_key: Option<String>,
        #[arg(long, default_value_t = 0)]
        idx: i64,
    },
    /// Reveal answers for days before today
    Answers {
        /// Day keys (YYYY-MM-DD)
        days: Vec<String>,
        /// Also request the N days before today
        #[arg(long)]
        last: Option<usize>,
        #[arg(long, default_value_t = 0)]
        idx: i64,
    },
    /// Load the word lists and print their sizes
    Wordlists,
    /// Answer newline-delimited JSON requests from stdin
    Serve,
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

impl Cli {
    pub fn config(&self) -> PuzzleConfig {
        PuzzleConfig {
            secret: self.secret.clone().unwrap_or_else(|| DEV_SECRET.to_string()),
            word_length: self.word_length,
            answers_path: self
                .answers_path
                .clone()
                .unwrap_or_else(PuzzleConfig::default_answers_path),
            guesses_path: self
                .guesses_path
                .clone()
                .unwrap_or_else(PuzzleConfig::default_guesses_path),
            mode: self.mode,
        }
    }
}

/// Explicit days followed by `last` days before today, never more than the
/// service would consider.
fn requested_day_keys(
    service: &PuzzleService,
    days: &[String],
    last: Option<usize>,
) -> Vec<String> {
    let mut day_keys = days.to_vec();
    if let Some(count) = last {
        day_keys.extend(
            service
                .server_day_key()
                .preceding(count.min(MAX_DAY_KEYS))
                .iter()
                .map(|d| d.to_string()),
        );
    }
    day_keys
}

fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *writer, value)?;
    writeln!(writer)
}

/// Run one command against `service`, reading requests from `reader` when serving.
pub fn run<R: BufRead, W: Write>(
    command: &Command,
    service: &PuzzleService,
    reader: R,
    mut writer: W,
) -> io::Result<()> {
    match command {
        Command::Today => {
            let today = service.server_day_key();
            write_json(
                &mut writer,
                &json!({
                    "serverDayKey": today,
                    "puzzleId": crate::selector::puzzle_id(&today, LIVE_IDX),
                }),
            )
        }
        Command::Guess { word, day_key, idx } => {
            let day_key = day_key
                .clone()
                .unwrap_or_else(|| service.server_day_key().to_string());
            let request = GuessRequest::new(&day_key, *idx, word);
            write_json(&mut writer, &service.submit_guess(&request))
        }
        Command::Answers { days, last, idx } => {
            let day_keys = requested_day_keys(service, days, *last);
            let request = AnswersRequest::new(*idx, json!(day_keys));
            write_json(&mut writer, &service.past_answers(&request))
        }
        Command::Wordlists => match service.wordlists() {
            Ok(words) => {
                let (answers, guesses) = service.wordlist_sources();
                write_json(
                    &mut writer,
                    &json!({
                        "ok": true,
                        "wordLength": words.word_length(),
                        "counts": words.counts(),
                        "paths": { "answers": answers, "guesses": guesses },
                    }),
                )
            }
            Err(e) => {
                log::error!("failed to load word lists: {e}");
                write_json(&mut writer, &Failure::new(FailureReason::ServiceUnavailable, None))
            }
        },
        Command::Serve => serve(service, reader, writer).map(|handled| {
            log::info!("request stream closed after {handled} requests");
        }),
    }
}

/// Answer one JSON request per input line with one JSON response per output line.
///
/// Returns the number of requests answered. Blank lines are skipped.
pub fn serve<R: BufRead, W: Write>(
    service: &PuzzleService,
    reader: R,
    mut writer: W,
) -> io::Result<usize> {
    let mut handled = 0;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => service.handle(&request),
            Err(e) => {
                log::warn!("rejecting malformed request: {e}");
                Response::Failed(Failure::new(FailureReason::BadRequest, None))
            }
        };
        debug_log!("status {} for request {}", response.status(), handled + 1);
        write_json(&mut writer, &response)?;
        writer.flush()?;
        handled += 1;
    }
    Ok(handled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::day_key::{DayKey, FixedClock};
    use crate::wordbank::{StaticSource, WordlistLoader};
    use serde_json::Value;
    use std::io::Cursor;

    fn test_service() -> PuzzleService {
        let config = PuzzleConfig {
            secret: "k1".to_string(),
            mode: Mode::Trusted,
            ..PuzzleConfig::development()
        };
        let loader = WordlistLoader::new(
            Box::new(StaticSource::from_words(&["apple", "mango", "grape"])),
            Box::new(StaticSource::from_words(&["crane", "slate"])),
            5,
            Mode::Trusted,
        );
        let today: DayKey = "2026-01-06".parse().unwrap();
        PuzzleService::with_parts(config, loader, Box::new(FixedClock::on(today))).unwrap()
    }

    fn run_lines(command: &Command, input: &str) -> Vec<Value> {
        let mut out = Vec::new();
        run(command, &test_service(), Cursor::new(input), &mut out).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_parse_guess_command() {
        let cli = Cli::try_parse_from(["daily-word", "guess", "crane", "--idx", "0"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Guess {
                word: "crane".to_string(),
                day_key: None,
                idx: 0
            }
        );
    }

    #[test]
    fn test_parse_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "daily-word",
            "wordlists",
            "--mode",
            "permissive",
            "--answers",
            "/tmp/answers.txt",
            "--word-length",
            "6",
        ])
        .unwrap();
        assert_eq!(cli.mode, Mode::Permissive);
        let config = cli.config();
        assert_eq!(config.answers_path, PathBuf::from("/tmp/answers.txt"));
        assert_eq!(config.word_length, 6);
    }

    #[test]
    fn test_parse_answers_with_last() {
        let cli = Cli::try_parse_from(["daily-word", "answers", "2026-01-01", "--last", "3"]).unwrap();
        match cli.command {
            Command::Answers { days, last, .. } => {
                assert_eq!(days, vec!["2026-01-01"]);
                assert_eq!(last, Some(3));
            }
            other => panic!("expected answers command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["daily-word", "today", "--mode", "yolo"]).is_err());
    }

    #[test]
    fn test_today_command() {
        let out = run_lines(&Command::Today, "");
        assert_eq!(out[0]["serverDayKey"], "2026-01-06");
        assert_eq!(out[0]["puzzleId"], "wordle:2026-01-06:0");
    }

    #[test]
    fn test_guess_command_defaults_to_today() {
        let command = Command::Guess {
            word: "GRAPE".to_string(),
            day_key: None,
            idx: 0,
        };
        let out = run_lines(&command, "");
        assert_eq!(out[0]["valid"], true);
        assert_eq!(out[0]["isSolved"], true);
        assert_eq!(
            out[0]["result"],
            serde_json::json!(["correct", "correct", "correct", "correct", "correct"])
        );
    }

    #[test]
    fn test_answers_command_with_last() {
        let command = Command::Answers {
            days: vec!["2026-01-06".to_string()],
            last: Some(2),
            idx: 0,
        };
        let out = run_lines(&command, "");
        let answers = out[0]["answers"].as_object().unwrap();
        let mut keys: Vec<&String> = answers.keys().collect();
        keys.sort();
        assert_eq!(keys, vec!["2026-01-04", "2026-01-05"]);
    }

    #[test]
    fn test_answers_command_caps_large_last() {
        let service = test_service();
        let keys = requested_day_keys(&service, &[], Some(100_000_000));
        assert_eq!(keys.len(), MAX_DAY_KEYS);
        assert_eq!(keys[0], "2026-01-05");

        let command = Command::Answers {
            days: Vec::new(),
            last: Some(usize::MAX),
            idx: 0,
        };
        let out = run_lines(&command, "");
        assert_eq!(out[0]["answers"].as_object().unwrap().len(), MAX_DAY_KEYS);
    }

    #[test]
    fn test_wordlists_command() {
        let out = run_lines(&Command::Wordlists, "");
        assert_eq!(out[0]["counts"]["answers"], 3);
        assert_eq!(out[0]["counts"]["totalAllowed"], 5);
        assert_eq!(out[0]["wordLength"], 5);
    }

    #[test]
    fn test_serve_answers_each_line() {
        let input = concat!(
            r#"{"op":"guess","dayKey":"2026-01-06","idx":0,"guess":"crane"}"#,
            "\n\n",
            r#"{"op":"guess","dayKey":"2026-01-05","idx":0,"guess":"crane"}"#,
            "\n",
            "not json\n",
            r#"{"op":"answers","idx":0,"dayKeys":["2026-01-05","2026-01-06"]}"#,
            "\n",
            r#"{"op":"reload"}"#,
            "\n",
        );
        let out = run_lines(&Command::Serve, input);
        assert_eq!(out.len(), 5);
        assert_eq!(out[0]["valid"], true);
        assert_eq!(out[1]["reason"], "locked_today_idx0");
        assert_eq!(out[1]["serverDayKey"], "2026-01-06");
        assert_eq!(out[2]["reason"], "bad_request");
        assert!(out[3]["answers"].get("2026-01-05").is_some());
        assert!(out[3]["answers"].get("2026-01-06").is_none());
        assert_eq!(out[4]["counts"]["answers"], 3);
    }

    #[test]
    fn test_serve_coerces_loose_fields() {
        let input = concat!(
            r#"{"op":"guess","dayKey":null,"idx":0,"guess":"grape"}"#,
            "\n",
            r#"{"op":"guess","dayKey":"2026-01-06","idx":0,"guess":null}"#,
            "\n",
            r#"{"op":"guess","dayKey":"2026-01-06","idx":0,"guess":12345}"#,
            "\n",
            r#"{"op":"guess","dayKey":"2026-01-06","idx":"0","guess":"grape"}"#,
            "\n",
            r#"{"op":"answers","idx":null,"dayKeys":["2026-01-05"]}"#,
            "\n",
        );
        let out = run_lines(&Command::Serve, input);
        assert_eq!(out.len(), 5);
        assert_eq!(out[0]["reason"], "locked_today_idx0");
        assert_eq!(out[0]["serverDayKey"], "2026-01-06");
        assert_eq!(out[1]["valid"], false);
        assert_eq!(out[1]["reason"], "bad_format");
        assert_eq!(out[2]["valid"], false);
        assert_eq!(out[2]["reason"], "bad_format");
        assert_eq!(out[3]["valid"], true);
        assert_eq!(out[3]["isSolved"], true);
        assert!(out[4]["answers"].get("2026-01-05").is_some());
    }

    #[test]
    fn test_serve_counts_requests() {
        let mut out = Vec::new();
        let input = "{\"op\":\"reload\"}\n\n{\"op\":\"reload\"}\n";
        let handled = serve(&test_service(), Cursor::new(input), &mut out).unwrap();
        assert_eq!(handled, 2);
    }
}
