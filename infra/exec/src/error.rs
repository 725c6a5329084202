use std::borrow::Cow;

/// Errors that can occur while running external commands.
#[mkit_derive::mkit_error]
pub enum ExecError {
    /// The process could not be spawned at all (missing binary, permissions).
    #[error("Failed to spawn command{}: {source}", context_suffix(.context))]
    Spawn { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// A single invocation exited with a non-zero status.
    #[error("Command failed{}: `{command}` ({status})", context_suffix(.context))]
    CommandFailed { command: String, status: String, context: Option<Cow<'static, str>> },

    /// Every attempt within the retry budget failed.
    #[error("Retries exhausted{}: `{command}` failed {attempts} time(s)", context_suffix(.context))]
    RetriesExhausted { command: String, attempts: u32, context: Option<Cow<'static, str>> },

    /// Internal logic errors.
    #[error("Internal exec error{}: {message}", context_suffix(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
