//! `harris`: Harris Matrix command-line front-end
//!
//! Loads a site fixture, runs the analysis pipeline, logs diagnostics to
//! stderr and writes GraphML (and optionally DOT) documents.

mod cli;
mod commands;

use commands::Outcome;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let matches = cli::command().get_matches();
    init_tracing(matches.get_flag("verbose"));

    match commands::run(&matches) {
        Ok(Outcome::Clean) => ExitCode::SUCCESS,
        Ok(Outcome::Findings) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
