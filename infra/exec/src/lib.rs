//! # Exec
//!
//! External command execution for the workspace: the [`CommandRunner`]
//! seam over [`std::process::Command`], and the [`RetryExecutor`] that
//! wraps flaky privileged operations (package installs, repository
//! bootstraps) in a fixed, bounded retry budget.
//!
//! Execution is synchronous and blocking: a reconciliation run is one
//! linear pass, and the inter-attempt delay is a plain thread sleep
//! rather than a scheduled timer.

mod error;
mod retry;
mod runner;

pub use crate::error::{ExecError, ExecErrorExt};
pub use crate::retry::{RetryExecutor, RetryPolicy};
pub use crate::runner::{Cmd, CmdOutput, CommandRunner, ProcessRunner};
