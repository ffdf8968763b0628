//! keytier CLI
//!
//! Resolves a credential from the most secure tier that holds it
//! (environment, OS keychain, config file, system parameters) and records
//! which tier answered in the audit trail.

use clap::Parser;
use std::process::ExitCode;

use keytier_cli::Args;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logs go to stderr so command output stays pipeable
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = std::io::stdout();
    let ok = keytier_cli::run(args, &mut stdout).await?;

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
