//! wasabi - Entry Point
//!
//! Exits non-zero when configuration, construction, startup or shutdown
//! fails.

use clap::Parser;
use std::process::ExitCode;
use wasabi::{Cli, run};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.config.as_deref()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("wasabi: {e:#}");
            ExitCode::FAILURE
        }
    }
}
