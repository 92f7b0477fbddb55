use daily_word::cli::{parse_cli, run};
use daily_word::{PuzzleService, logging};
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    logging::init();
    let cli = parse_cli();
    let config = cli.config();
    log::info!(
        "starting in {:?} mode with answers from {}",
        config.mode,
        config.answers_path.display()
    );

    let service = match PuzzleService::new(config) {
        Ok(service) => service,
        Err(e) => {
            log::error!("Failed to start puzzle service: {e}");
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    match run(&cli.command, &service, stdin.lock(), stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("I/O error: {e}");
            ExitCode::FAILURE
        }
    }
}
