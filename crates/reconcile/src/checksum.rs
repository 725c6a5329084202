use crate::error::{ReconcileError, ReconcileErrorExt};
use sha2::{Digest, Sha256};
use std::path::Path;
use tracing::debug;

/// Decides whether installing `candidate` at `existing` would change the
/// file, by comparing SHA-256 digests. A missing target always needs a
/// write. Change detection only; this is not a security boundary, but a
/// collision-resistant hash rules out spurious treat-as-unchanged outcomes.
///
/// # Errors
/// Returns [`ReconcileError::Io`] if the existing file cannot be read for
/// a reason other than absence.
pub(crate) fn needs_write(existing: &Path, candidate: &[u8]) -> Result<bool, ReconcileError> {
    let current = match std::fs::read(existing) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %existing.display(), "Target absent, write needed");
            return Ok(true);
        },
        Err(err) => {
            return Err(err).context(format!("Reading {}", existing.display()));
        },
    };

    let current_digest = Sha256::digest(&current);
    let candidate_digest = Sha256::digest(candidate);
    let differs = current_digest != candidate_digest;

    debug!(
        path = %existing.display(),
        current = %hex::encode(current_digest),
        candidate = %hex::encode(candidate_digest),
        differs,
        "Compared artifact digests"
    );

    Ok(differs)
}
