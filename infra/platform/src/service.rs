use crate::error::PlatformError;
use mkit_exec::{Cmd, CommandRunner};
use std::path::PathBuf;
use tracing::{debug, info};

/// Marker emitted by the agent's config parser on a syntax error.
const PARSE_ERROR_MARKER: &str = "parse error";

/// Result of running the agent's configuration syntax check.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Raw diagnostics (stdout + stderr) from the validator.
    pub diagnostics: String,
    pub ok: bool,
}

impl ValidationReport {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.ok
    }
}

/// Capability interface over the host's service manager.
pub trait ServiceManager {
    /// Probes whether the agent service is currently running.
    ///
    /// # Errors
    /// Returns [`PlatformError::Exec`] if the probe cannot be spawned.
    fn status(&self) -> Result<bool, PlatformError>;

    /// Starts the agent service.
    ///
    /// # Errors
    /// Returns [`PlatformError::Exec`] if the start command fails.
    fn start(&self) -> Result<(), PlatformError>;

    /// Restarts the agent service.
    ///
    /// # Errors
    /// Returns [`PlatformError::Exec`] if the restart command fails.
    fn restart(&self) -> Result<(), PlatformError>;

    /// Runs the agent's configuration syntax check without applying
    /// anything, returning its textual diagnostics.
    ///
    /// # Errors
    /// Returns [`PlatformError::Exec`] if the validator cannot be spawned.
    fn validate(&self) -> Result<ValidationReport, PlatformError>;

    /// Returns the installed agent's version string, used for the wire
    /// protocol probe.
    ///
    /// # Errors
    /// Returns [`PlatformError::Exec`] if the agent binary cannot be run.
    fn version(&self) -> Result<String, PlatformError>;
}

/// systemd-backed [`ServiceManager`] for the monitoring agent.
pub struct SystemdService<'r> {
    runner: &'r dyn CommandRunner,
    unit: String,
    binary: String,
    config_file: PathBuf,
}

impl std::fmt::Debug for SystemdService<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemdService")
            .field("unit", &self.unit)
            .field("binary", &self.binary)
            .field("config_file", &self.config_file)
            .finish_non_exhaustive()
    }
}

impl<'r> SystemdService<'r> {
    pub fn new(
        runner: &'r dyn CommandRunner,
        unit: impl Into<String>,
        binary: impl Into<String>,
        config_file: impl Into<PathBuf>,
    ) -> Self {
        Self { runner, unit: unit.into(), binary: binary.into(), config_file: config_file.into() }
    }
}

impl ServiceManager for SystemdService<'_> {
    fn status(&self) -> Result<bool, PlatformError> {
        let cmd = Cmd::new("systemctl").args(["is-active", "--quiet"]).arg(&self.unit);
        let out = self.runner.capture(&cmd)?;
        debug!(unit = %self.unit, running = out.success, "Probed service state");
        Ok(out.success)
    }

    fn start(&self) -> Result<(), PlatformError> {
        info!(unit = %self.unit, "Starting service");
        let cmd = Cmd::new("systemctl").arg("start").arg(&self.unit);
        self.runner.run(&cmd).map_err(PlatformError::from)
    }

    fn restart(&self) -> Result<(), PlatformError> {
        info!(unit = %self.unit, "Restarting service");
        let cmd = Cmd::new("systemctl").arg("restart").arg(&self.unit);
        self.runner.run(&cmd).map_err(PlatformError::from)
    }

    fn validate(&self) -> Result<ValidationReport, PlatformError> {
        let cmd =
            Cmd::new(&self.binary).args(["-t", "-C"]).arg(self.config_file.display().to_string());
        let out = self.runner.capture(&cmd)?;

        let diagnostics = format!("{}{}", out.stdout, out.stderr);
        let has_parse_error = diagnostics
            .lines()
            .any(|line| line.to_ascii_lowercase().contains(PARSE_ERROR_MARKER));

        Ok(ValidationReport { ok: out.success && !has_parse_error, diagnostics })
    }

    fn version(&self) -> Result<String, PlatformError> {
        let out = self.runner.capture(&Cmd::new(&self.binary).arg("--version"))?;
        // Some agents print the version banner on stderr.
        Ok(if out.stdout.trim().is_empty() { out.stderr } else { out.stdout })
    }
}
