use std::borrow::Cow;

/// Errors raised during a reconciliation run.
#[mkit_derive::mkit_error]
pub enum ReconcileError {
    /// Permission or storage failure during install, backup, or temp-file
    /// handling. Never retried: a failing disk is not transient flakiness.
    #[error("I/O failure{}: {source}", context_suffix(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// The composed configuration failed the agent's syntax check. Always
    /// fatal, and explicitly prevents any service restart.
    #[error("Configuration validation failed{}: {message}", context_suffix(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A platform capability (package manager, service manager) failed.
    #[error("Platform operation failed{}: {source}", context_suffix(.context))]
    Platform { source: mkit_platform::PlatformError, context: Option<Cow<'static, str>> },

    /// Internal logic errors.
    #[error("Internal reconcile error{}: {message}", context_suffix(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
