mod args;
mod commands;
mod report;

use std::fs::OpenOptions;
use std::process::ExitCode;

use clap::Parser;

use cornwall_core::config::Config;
use cornwall_core::paths;
use cornwall_core::store::StateStore;

use args::Cli;
use commands::Context;

fn init_logging(verbose: bool) {
    use simplelog::{LevelFilter, WriteLogger};

    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };

    let log_path = paths::log_path();
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    // No log file, no logging. Commands still run.
    let Ok(log_file) = OpenOptions::new().create(true).append(true).open(&log_path) else {
        return;
    };
    if WriteLogger::init(log_level, simplelog::Config::default(), log_file).is_err() {
        return;
    }

    log::info!("cornwall starting (log level: {:?})", log_level);
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version print to stdout and succeed
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    init_logging(cli.verbose);

    let config = Config::load();
    let home = paths::resolve_home(cli.home.as_deref(), &config);
    log::debug!("home: {}", home.display());

    let ctx = Context::new(config, StateStore::new(home));
    match commands::run(&ctx, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
