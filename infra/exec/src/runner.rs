use crate::error::ExecError;
use std::fmt;
use std::process::{Command, Stdio};

/// A fully assembled external command invocation.
///
/// Holds the program and its arguments as plain strings; rendering via
/// [`fmt::Display`] is used for logging and for naming the command in errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(), args: Vec::new() }
    }

    #[must_use = "arg() returns the extended command"]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use = "args() returns the extended command"]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn argv(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Captured output of a finished command.
#[derive(Debug, Clone)]
pub struct CmdOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Seam between the reconciliation logic and the operating system.
///
/// Production code uses [`ProcessRunner`]; tests substitute scripted
/// implementations to observe invocation counts and inject failures.
pub trait CommandRunner {
    /// Runs the command to completion, inheriting the parent's stdio.
    ///
    /// # Errors
    /// Returns [`ExecError::Spawn`] if the process cannot start and
    /// [`ExecError::CommandFailed`] on a non-zero exit status.
    fn run(&self, cmd: &Cmd) -> Result<(), ExecError>;

    /// Runs the command and captures its stdout/stderr.
    ///
    /// A non-zero exit status is not an error here; callers inspecting
    /// diagnostics (version probes, config validation) decide what the
    /// status means.
    ///
    /// # Errors
    /// Returns [`ExecError::Spawn`] if the process cannot start.
    fn capture(&self, cmd: &Cmd) -> Result<CmdOutput, ExecError>;
}

/// [`CommandRunner`] backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, cmd: &Cmd) -> Result<(), ExecError> {
        let status = Command::new(cmd.program())
            .args(cmd.argv())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| ExecError::Spawn {
                source,
                context: Some(format!("Is `{}` installed and in PATH?", cmd.program()).into()),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ExecError::CommandFailed {
                command: cmd.to_string(),
                status: status.to_string(),
                context: None,
            })
        }
    }

    fn capture(&self, cmd: &Cmd) -> Result<CmdOutput, ExecError> {
        let output =
            Command::new(cmd.program()).args(cmd.argv()).output().map_err(|source| {
                ExecError::Spawn {
                    source,
                    context: Some(format!("Is `{}` installed and in PATH?", cmd.program()).into()),
                }
            })?;

        Ok(CmdOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmd_display_includes_args() {
        let cmd = Cmd::new("apt-get").args(["-y", "-q", "install", "collectd"]);
        assert_eq!(cmd.to_string(), "apt-get -y -q install collectd");
    }

    #[test]
    fn run_missing_binary_is_spawn_error() {
        let err = ProcessRunner::new()
            .run(&Cmd::new("definitely-not-a-binary-mkit"))
            .expect_err("expected spawn failure");
        assert!(matches!(err, ExecError::Spawn { .. }));
    }

    #[test]
    fn capture_reports_failure_without_error() {
        // `false` exists on any POSIX host the suite runs on.
        let out = ProcessRunner::new().capture(&Cmd::new("false")).expect("spawn should work");
        assert!(!out.success);
    }
}
