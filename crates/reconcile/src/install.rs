use crate::checksum;
use crate::error::{ReconcileError, ReconcileErrorExt};
use crate::registry::{TMP_MARKER, TempFileRegistry};
use chrono::Utc;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Conventional mode for installed configuration files: owner read/write,
/// group/other read.
#[cfg(unix)]
const ARTIFACT_MODE: u32 = 0o644;

/// Backup suffix format: sortable UTC timestamp, no separators.
const BACKUP_TIMESTAMP: &str = "%Y%m%d%H%M%S";

/// Installs configuration artifacts atomically.
///
/// Each install writes a uniquely named temp file in the target's own
/// directory (so the final replace is a same-filesystem atomic rename),
/// backs up any prior version under a timestamped name, then renames the
/// temp file over the target. A reader observes either the fully-prior or
/// the fully-new content, never a partial write.
#[derive(Debug, Default)]
pub struct AtomicFileInstaller {
    tmp_counter: AtomicU64,
}

impl AtomicFileInstaller {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `content` at `target`, reporting whether the file changed.
    ///
    /// Returns `Ok(false)` with zero filesystem mutation when the target
    /// already holds exactly this content.
    ///
    /// # Errors
    /// Returns [`ReconcileError::Io`] on any filesystem failure; such
    /// failures are systemic and are never retried.
    pub fn install(
        &self,
        target: &Path,
        content: &[u8],
        registry: &mut TempFileRegistry,
    ) -> Result<bool, ReconcileError> {
        if !checksum::needs_write(target, content)? {
            debug!(path = %target.display(), "Artifact unchanged, skipping install");
            return Ok(false);
        }

        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Creating directory {}", parent.display()))?;
        }

        let temp = self.unique_tmp_path(target);
        registry.register(&temp);

        {
            let mut file = std::fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .context(format!("Creating temp file {}", temp.display()))?;
            file.write_all(content).context("Writing temp file")?;
            file.sync_all().context("Syncing temp file")?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&temp, std::fs::Permissions::from_mode(ARTIFACT_MODE))
                .context(format!("Setting mode on {}", temp.display()))?;
        }

        if target.exists() {
            let backup = backup_path(target);
            std::fs::copy(target, &backup).context(format!(
                "Backing up {} to {}",
                target.display(),
                backup.display()
            ))?;
            copy_file_times(target, &backup)
                .context(format!("Carrying timestamps to {}", backup.display()))?;
            info!(path = %target.display(), backup = %backup.display(), "Backed up prior artifact");
        }

        std::fs::rename(&temp, target).context(format!(
            "Replacing {} with {}",
            target.display(),
            temp.display()
        ))?;
        registry.resolve(&temp);

        info!(path = %target.display(), bytes = content.len(), "Installed artifact");
        Ok(true)
    }

    /// Same-directory temp name with a per-call unique suffix, so even
    /// accidentally concurrent runs cannot collide.
    fn unique_tmp_path(&self, target: &Path) -> PathBuf {
        let counter = self.tmp_counter.fetch_add(1, Ordering::Relaxed);
        let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("artifact");
        let tmp_name = format!("{file_name}{TMP_MARKER}{}.{counter}", std::process::id());
        target.with_file_name(tmp_name)
    }
}

/// `fs::copy` keeps permissions but stamps the copy with the current
/// time; the backup should carry the prior file's own timestamps.
fn copy_file_times(source: &Path, dest: &Path) -> std::io::Result<()> {
    let metadata = std::fs::metadata(source)?;
    let mut times = std::fs::FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    std::fs::File::options().write(true).open(dest)?.set_times(times)
}

fn backup_path(target: &Path) -> PathBuf {
    let stamp = Utc::now().format(BACKUP_TIMESTAMP);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("artifact");
    target.with_file_name(format!("{file_name}.{stamp}"))
}
