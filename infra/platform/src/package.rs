use crate::error::PlatformError;
use mkit_domain::PlatformKind;
use mkit_exec::{Cmd, RetryExecutor};
use tracing::{debug, info};

/// Capability interface over the host's package manager.
///
/// Implementations are selected once at startup from the detected
/// [`PlatformKind`]; every operation runs through the caller-supplied
/// [`RetryExecutor`] because package-index fetches are the one class of
/// external call that is expected to fail transiently.
pub trait PackageManager: std::fmt::Debug {
    /// Installs the given packages.
    ///
    /// # Errors
    /// Returns [`PlatformError::Exec`] once the retry budget is exhausted.
    fn install(&self, packages: &[&str]) -> Result<(), PlatformError>;

    /// Removes (purges where the family supports it) the given packages.
    ///
    /// # Errors
    /// Returns [`PlatformError::Exec`] once the retry budget is exhausted.
    fn remove(&self, packages: &[&str]) -> Result<(), PlatformError>;

    /// Installs whatever repository bootstrap the family needs before the
    /// agent package is available. A no-op on families whose default
    /// repositories already carry the agent.
    ///
    /// # Errors
    /// Returns [`PlatformError::Exec`] once the retry budget is exhausted.
    fn bootstrap_repo(&self) -> Result<(), PlatformError>;
}

/// Selects the package manager implementation for a platform family.
///
/// # Errors
/// Returns [`PlatformError::Unsupported`] for unknown families.
pub fn package_manager<'r>(
    kind: PlatformKind,
    exec: RetryExecutor<'r>,
) -> Result<Box<dyn PackageManager + 'r>, PlatformError> {
    match kind {
        PlatformKind::Debian => Ok(Box::new(AptManager { exec })),
        PlatformKind::RedHat => Ok(Box::new(DnfManager { exec })),
        PlatformKind::Unsupported => Err(PlatformError::Unsupported {
            message: "no package manager for this platform family".into(),
            context: None,
        }),
    }
}

/// Debian-family implementation shelling out to `apt-get`.
#[derive(Debug)]
struct AptManager<'r> {
    exec: RetryExecutor<'r>,
}

impl PackageManager for AptManager<'_> {
    fn install(&self, packages: &[&str]) -> Result<(), PlatformError> {
        info!(?packages, "Installing packages via apt-get");
        let cmd = Cmd::new("apt-get").args(["-y", "-q", "install"]).args(packages.iter().copied());
        self.exec.execute(&cmd).map_err(PlatformError::from)
    }

    fn remove(&self, packages: &[&str]) -> Result<(), PlatformError> {
        info!(?packages, "Purging packages via apt-get");
        let cmd = Cmd::new("apt-get").args(["-y", "-q", "purge"]).args(packages.iter().copied());
        self.exec.execute(&cmd).map_err(PlatformError::from)
    }

    fn bootstrap_repo(&self) -> Result<(), PlatformError> {
        // Default Debian/Ubuntu repositories already carry the agent.
        debug!("No repository bootstrap needed on the Debian family");
        Ok(())
    }
}

/// RedHat-family implementation shelling out to `dnf`.
#[derive(Debug)]
struct DnfManager<'r> {
    exec: RetryExecutor<'r>,
}

impl DnfManager<'_> {
    const BOOTSTRAP_PACKAGE: &'static str = "epel-release";
}

impl PackageManager for DnfManager<'_> {
    fn install(&self, packages: &[&str]) -> Result<(), PlatformError> {
        info!(?packages, "Installing packages via dnf");
        let cmd = Cmd::new("dnf").args(["-y", "-q", "install"]).args(packages.iter().copied());
        self.exec.execute(&cmd).map_err(PlatformError::from)
    }

    fn remove(&self, packages: &[&str]) -> Result<(), PlatformError> {
        info!(?packages, "Removing packages via dnf");
        let cmd = Cmd::new("dnf").args(["-y", "-q", "remove"]).args(packages.iter().copied());
        self.exec.execute(&cmd).map_err(PlatformError::from)
    }

    fn bootstrap_repo(&self) -> Result<(), PlatformError> {
        info!(package = Self::BOOTSTRAP_PACKAGE, "Bootstrapping repository package");
        let cmd = Cmd::new("dnf").args(["-y", "-q", "install", Self::BOOTSTRAP_PACKAGE]);
        self.exec.execute(&cmd).map_err(PlatformError::from)
    }
}
