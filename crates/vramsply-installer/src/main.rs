//! vramsply-install - verified bootstrap installer for the vramsply CLI

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use vramsply_installer::Cli;
use vramsply_installer::cmd;

#[tokio::main]
async fn main() -> ExitCode {
    // Diagnostics go to stderr so stdout stays the user-facing narration
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cmd::install::install(&cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
