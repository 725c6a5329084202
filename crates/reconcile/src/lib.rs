//! # Reconcile
//!
//! Idempotent reconciliation of one host's monitoring-agent
//! configuration. Desired file contents are rendered in memory, installed
//! only when their checksum differs from what is on disk (atomic
//! temp-write + rename, timestamped backup of the prior version), and the
//! aggregated change state drives exactly one service action per run,
//! with a syntax validation gate in front of any restart.
//!
//! [`Reconciler::run`] is the single entry point; everything else is the
//! machinery it composes.

mod checksum;
pub mod content;
mod error;
pub mod fragment;
mod install;
mod registry;
mod service;

pub use self::{
    error::{ReconcileError, ReconcileErrorExt},
    install::AtomicFileInstaller,
    registry::{TempFileRegistry, purge_stale},
    service::{ServiceDecision, decide, reconcile_service},
};

use mkit_domain::{AgentEndpoint, Paths, SetupConfig};
use mkit_platform::{PackageManager, ServiceManager};
use std::path::PathBuf;
use tracing::info;

/// One file the run wants on disk. `changed` is set by the installer and
/// read back when deciding the service action.
#[derive(Debug)]
pub struct ConfigArtifact {
    pub path: PathBuf,
    pub content: Vec<u8>,
    pub changed: bool,
}

impl ConfigArtifact {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, content: Vec<u8>) -> Self {
        Self { path: path.into(), content, changed: false }
    }
}

/// Builds the full artifact set for one run: main config, collection
/// config, thresholds template, one fragment per enabled plugin and the
/// push fragment targeting the local agent endpoint.
#[must_use]
pub fn assemble_artifacts(
    config: &SetupConfig,
    paths: &Paths,
    endpoint: &AgentEndpoint,
) -> Vec<ConfigArtifact> {
    let mut artifacts = vec![
        ConfigArtifact::new(&paths.config_file, content::main_config(&config.agent, paths)),
        ConfigArtifact::new(&paths.collection_file, content::collection_config(paths)),
        ConfigArtifact::new(&paths.thresholds_file, content::thresholds_config()),
    ];

    for plugin in &config.plugins {
        artifacts.push(ConfigArtifact::new(
            paths.fragment_dir.join(format!("{}.conf", plugin.name)),
            fragment::build(plugin),
        ));
    }

    let push = fragment::push_target(endpoint);
    artifacts.push(ConfigArtifact::new(
        paths.fragment_dir.join(format!("{}.conf", push.name)),
        fragment::build(&push),
    ));

    artifacts
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub artifacts_changed: usize,
    pub artifacts_total: usize,
    pub decision: ServiceDecision,
}

/// Drives one reconciliation run over borrowed platform capabilities.
pub struct Reconciler<'r> {
    packages: &'r dyn PackageManager,
    service: &'r dyn ServiceManager,
}

impl std::fmt::Debug for Reconciler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler").finish_non_exhaustive()
    }
}

impl<'r> Reconciler<'r> {
    #[must_use]
    pub fn new(packages: &'r dyn PackageManager, service: &'r dyn ServiceManager) -> Self {
        Self { packages, service }
    }

    /// Runs the full sequence: install every artifact, converge packages,
    /// then take exactly one service action.
    ///
    /// Not transactional across artifacts: files installed before a
    /// failing step stay installed. Temp files are swept on every exit
    /// path by the registry's drop.
    ///
    /// # Errors
    /// Any [`ReconcileError`] aborts the run; a validation failure
    /// guarantees the service was not restarted.
    pub fn run(
        &self,
        config: &SetupConfig,
        artifacts: &mut [ConfigArtifact],
    ) -> Result<RunReport, ReconcileError> {
        let mut registry = TempFileRegistry::new();
        let installer = AtomicFileInstaller::new();

        for artifact in artifacts.iter_mut() {
            artifact.changed =
                installer.install(&artifact.path, &artifact.content, &mut registry)?;
        }
        let changed = artifacts.iter().filter(|a| a.changed).count();
        let any_changed = changed > 0;

        self.converge_packages(config)?;

        let decision = reconcile_service(self.service, any_changed)?;
        let report = RunReport {
            artifacts_changed: changed,
            artifacts_total: artifacts.len(),
            decision,
        };
        info!(
            changed = report.artifacts_changed,
            total = report.artifacts_total,
            decision = %report.decision,
            "Reconciliation complete"
        );
        Ok(report)
    }

    /// Conflicting packages out, repository bootstrapped, agent package in.
    /// Every call already retries transient failures internally.
    fn converge_packages(&self, config: &SetupConfig) -> Result<(), ReconcileError> {
        if !config.agent.conflicts.is_empty() {
            let conflicts: Vec<&str> = config.agent.conflicts.iter().map(String::as_str).collect();
            self.packages.remove(&conflicts)?;
        }
        self.packages.bootstrap_repo()?;
        self.packages.install(&[config.agent.package.as_str()])?;
        Ok(())
    }
}
