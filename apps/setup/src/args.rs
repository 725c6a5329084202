//! Command-line interface of the setup binary.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "mkit-setup")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reconciles this host's monitoring-agent configuration in one idempotent run")]
pub struct Cli {
    /// TOML configuration file; built-in platform defaults apply when omitted.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Alternative os-release document for platform detection.
    #[arg(long, default_value = "/etc/os-release", hide = true)]
    pub os_release: PathBuf,

    /// Enable debug-level logging.
    #[arg(long)]
    pub verbose: bool,
}
