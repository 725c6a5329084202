//! # Platform
//!
//! The capability layer between the reconciliation logic and the host:
//! platform family detection, a [`PackageManager`] per family (apt / dnf),
//! and a systemd-backed [`ServiceManager`] including the agent's
//! config-syntax validation.
//!
//! Dispatch on the platform family happens exactly once, when the
//! implementations are selected at startup; call sites only ever see the
//! traits.

mod detect;
mod error;
mod package;
mod service;

pub use crate::detect::{detect, detect_from};
pub use crate::error::{PlatformError, PlatformErrorExt};
pub use crate::package::{PackageManager, package_manager};
pub use crate::service::{ServiceManager, SystemdService, ValidationReport};
