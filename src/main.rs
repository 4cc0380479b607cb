mod cli;
mod manifest;
mod render;
mod scaffold;
mod show;
mod status;
mod theme;
mod writer;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Settings, parse_flags};
use scaffold::RunStatus;
use tracing_subscriber::EnvFilter;
use writer::StdinPrompt;

fn main() {
    if let Err(err) = run() {
        status::error(&format!("error: {err:#}"));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::from_options(&parse_flags(&cli.flags));
    init_tracing(settings.verbose);

    let root = std::env::current_dir().context("reading current directory")?;
    match scaffold::run(&root, &settings, &mut StdinPrompt)? {
        RunStatus::Cancelled => tracing::debug!("cancelled by user"),
        RunStatus::Completed | RunStatus::Shown | RunStatus::DryRun => {}
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
