use clap::Parser;
use mkit_logger::{LevelFilter, Logger};
use mkit_setup::args::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    let _log = Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .console(true)
        .level(level)
        .init()?;

    let report = mkit_setup::run(&cli)?;
    tracing::info!(
        changed = report.artifacts_changed,
        total = report.artifacts_total,
        decision = %report.decision,
        "Setup finished"
    );
    Ok(())
}
