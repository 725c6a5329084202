use crate::error::{PlatformError, PlatformErrorExt};
use mkit_domain::{PlatformKind, classify_os_release};
use std::path::Path;
use tracing::info;

const OS_RELEASE: &str = "/etc/os-release";

/// Detects the host platform family from `/etc/os-release`.
///
/// # Errors
/// Returns [`PlatformError::Probe`] if the file cannot be read.
pub fn detect() -> Result<PlatformKind, PlatformError> {
    detect_from(Path::new(OS_RELEASE))
}

/// Like [`detect`], reading an explicit os-release document path.
///
/// # Errors
/// Returns [`PlatformError::Probe`] if the file cannot be read.
pub fn detect_from(path: &Path) -> Result<PlatformKind, PlatformError> {
    let content = std::fs::read_to_string(path)
        .context(format!("Reading {}", path.display()))?;

    let kind = classify_os_release(&content);
    info!(platform = %kind, "Detected host platform family");
    Ok(kind)
}
