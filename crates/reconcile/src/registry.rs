use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Marker embedded in every temporary file name this tool creates.
pub(crate) const TMP_MARKER: &str = ".mkittmp.";

/// Stale threshold for the startup purge; anything older than this cannot
/// belong to a live run.
const STALE_AFTER: Duration = Duration::from_secs(300);

/// Per-run registry of not-yet-installed temporary files.
///
/// Constructed explicitly once per reconciliation run and passed to every
/// component that creates temp files; there is deliberately no global
/// equivalent. Each registered path is either consumed by exactly one
/// successful rename ([`TempFileRegistry::resolve`]) or force-removed by
/// the sweep. The sweep runs from [`Drop`], so success, error return, and
/// panic unwind all clean up.
#[derive(Debug, Default)]
pub struct TempFileRegistry {
    pending: Vec<PathBuf>,
}

impl TempFileRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks a freshly created temporary file.
    pub fn register(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        debug!(path = %path.display(), "Registered temp file");
        self.pending.push(path);
    }

    /// Marks a temp file as consumed by a successful rename; the sweep
    /// will no longer touch it.
    pub fn resolve(&mut self, path: &Path) {
        self.pending.retain(|p| p != path);
    }

    /// Number of paths the sweep would still remove.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Force-removes every still-registered path, ignoring files already
    /// gone. Runs automatically on drop; calling it earlier is harmless.
    pub fn sweep(&mut self) {
        for path in self.pending.drain(..) {
            match std::fs::remove_file(&path) {
                Ok(()) => debug!(path = %path.display(), "Swept temp file"),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {},
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "Failed to sweep temp file");
                },
            }
        }
    }
}

impl Drop for TempFileRegistry {
    fn drop(&mut self) {
        self.sweep();
    }
}

/// Removes stale temp files a crashed or killed prior run left behind in
/// `dir`. Self-healing only; failures are logged and never fatal.
pub fn purge_stale(dir: &Path) {
    if !dir.is_dir() {
        return;
    }

    let now = SystemTime::now();
    let mut removed = 0usize;

    WalkDir::new(dir)
        .into_iter()
        .flatten()
        .filter(|entry| entry.file_type().is_file() && is_tmp(entry) && is_stale(entry, now))
        .for_each(|entry| match std::fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(err) => {
                warn!(path = %entry.path().display(), error = %err, "Stale temp removal failed");
            },
        });

    if removed > 0 {
        debug!(dir = %dir.display(), removed, "Purged stale temp files");
    }
}

fn is_tmp(entry: &DirEntry) -> bool {
    entry
        .path()
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.contains(TMP_MARKER))
}

fn is_stale(entry: &DirEntry, now: SystemTime) -> bool {
    entry
        .metadata()
        .ok()
        .and_then(|m| m.modified().ok())
        .and_then(|modified| now.duration_since(modified).ok())
        .is_none_or(|age| age > STALE_AFTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_removes_registered_files() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("cpu.conf.mkittmp.1");
        std::fs::write(&path, b"partial").unwrap();

        let mut registry = TempFileRegistry::new();
        registry.register(&path);
        registry.sweep();

        assert!(!path.exists());
        assert_eq!(registry.pending(), 0);
    }

    #[test]
    fn resolved_files_survive_the_sweep() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("cpu.conf.mkittmp.2");
        std::fs::write(&path, b"installed").unwrap();

        let mut registry = TempFileRegistry::new();
        registry.register(&path);
        registry.resolve(&path);
        registry.sweep();

        assert!(path.exists(), "resolved handle must not be swept");
    }

    #[test]
    fn drop_sweeps_pending_files() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("df.conf.mkittmp.3");
        std::fs::write(&path, b"partial").unwrap();

        {
            let mut registry = TempFileRegistry::new();
            registry.register(&path);
        }

        assert!(!path.exists(), "drop must sweep unresolved handles");
    }

    #[test]
    fn sweep_ignores_already_gone_files() {
        let mut registry = TempFileRegistry::new();
        registry.register("/nonexistent/dir/gone.mkittmp.4");
        registry.sweep();
        assert_eq!(registry.pending(), 0);
    }

    #[test]
    fn purge_skips_fresh_and_foreign_files() {
        let tmp = tempfile::tempdir().unwrap();
        let fresh_tmp = tmp.path().join("load.conf.mkittmp.5");
        let foreign = tmp.path().join("load.conf");
        std::fs::write(&fresh_tmp, b"x").unwrap();
        std::fs::write(&foreign, b"y").unwrap();

        purge_stale(tmp.path());

        assert!(fresh_tmp.exists(), "fresh temp files belong to a live run");
        assert!(foreign.exists(), "non-temp files are never touched");
    }

    #[test]
    fn purge_missing_dir_is_a_noop() {
        purge_stale(Path::new("/nonexistent/fragments"));
    }
}
