use std::borrow::Cow;

/// Errors raised by the platform capability layer.
#[mkit_derive::mkit_error]
pub enum PlatformError {
    /// The host does not belong to a supported platform family. Raised
    /// before any filesystem or package mutation is attempted.
    #[error("Unsupported platform{}: {message}", context_suffix(.context))]
    Unsupported { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Probing the host (os-release, service state) failed.
    #[error("Platform probe failed{}: {source}", context_suffix(.context))]
    Probe { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// An external command failed beyond its retry budget.
    #[error("Platform command failed{}: {source}", context_suffix(.context))]
    Exec { source: mkit_exec::ExecError, context: Option<Cow<'static, str>> },

    /// Internal logic errors.
    #[error("Internal platform error{}: {message}", context_suffix(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
