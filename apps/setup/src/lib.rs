//! # Setup
//!
//! The host-facing binary: loads configuration, probes the platform and
//! agent endpoint, then hands one reconciliation run to `mkit-reconcile`.
//! Exit code 0 on success, 1 on unsupported platform, validation failure
//! or retry exhaustion.

pub mod args;

use crate::args::Cli;
use anyhow::{Context, Result, bail};
use mkit_domain::{
    AgentEndpoint, Paths, PlatformKind, ProtocolVersion, SetupConfig, load_config, resolve_port,
};
use mkit_exec::{ProcessRunner, RetryExecutor, RetryPolicy};
use mkit_platform::{ServiceManager, SystemdService, detect_from, package_manager};
use mkit_reconcile::{Reconciler, RunReport, assemble_artifacts, purge_stale};
use std::time::Duration;
use tracing::{info, warn};

/// Runs one full reconciliation.
///
/// # Errors
/// Any failure is returned as `anyhow::Error`; `main` maps it to exit 1.
pub fn run(cli: &Cli) -> Result<RunReport> {
    let config: SetupConfig =
        load_config(cli.config.as_ref()).context("Critical: Configuration is malformed")?;

    let kind = detect_from(&cli.os_release)?;
    if kind == PlatformKind::Unsupported {
        bail!("Unsupported platform family, refusing to touch this host");
    }

    let paths = Paths::resolve(&config.paths, kind);
    sweep_stale_temps(&paths);

    let runner = ProcessRunner;
    let retry = RetryExecutor::new(
        &runner,
        RetryPolicy::new(config.retry.max_attempts, Duration::from_secs(config.retry.wait_secs)),
    );
    let packages = package_manager(kind, retry)?;
    let service =
        SystemdService::new(&runner, &config.agent.service, &config.agent.service, &paths.config_file);

    let endpoint = resolve_endpoint(&config, &service)?;
    info!(url = %endpoint.push_url(), "Resolved agent push endpoint");

    let mut artifacts = assemble_artifacts(&config, &paths, &endpoint);
    let report = Reconciler::new(packages.as_ref(), &service).run(&config, &mut artifacts)?;
    Ok(report)
}

/// A crashed prior run may have left temp files next to any target.
fn sweep_stale_temps(paths: &Paths) {
    purge_stale(&paths.fragment_dir);
    if let Some(parent) = paths.config_file.parent() {
        purge_stale(parent);
    }
    if let Some(parent) = paths.collection_file.parent() {
        purge_stale(parent);
    }
}

/// Resolves the push endpoint: port from its secret sources, protocol
/// generation from an explicit override or the installed agent's version
/// string. A failed probe (agent not installed yet) falls back to v1,
/// which every agent generation accepts.
fn resolve_endpoint(
    config: &SetupConfig,
    service: &dyn ServiceManager,
) -> Result<AgentEndpoint> {
    let port = resolve_port(&config.endpoint)?;

    let version = match config.endpoint.protocol {
        Some(value) => ProtocolVersion::from_override(value),
        None => match service.version() {
            Ok(output) => ProtocolVersion::from_version_output(&output),
            Err(error) => {
                warn!(%error, "Agent version probe failed, assuming protocol v1");
                ProtocolVersion::V1
            },
        },
    };

    Ok(AgentEndpoint { port, namespace: config.endpoint.namespace.clone(), version })
}
