use crate::error::ExecError;
use crate::runner::{Cmd, CommandRunner};
use std::time::Duration;
use tracing::{debug, warn};

/// Fixed retry budget for flaky external commands.
///
/// The backoff is deliberately constant, not exponential: the retried
/// operations are package-index fetches where a short fixed pause is the
/// established convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    wait: Duration,
}

impl RetryPolicy {
    /// Creates a policy with at least one attempt.
    ///
    /// A `max_attempts` of zero is clamped to one so that `execute` always
    /// invokes the command at least once.
    #[must_use]
    pub const fn new(max_attempts: u32, wait: Duration) -> Self {
        Self { max_attempts: if max_attempts == 0 { 1 } else { max_attempts }, wait }
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub const fn wait(&self) -> Duration {
        self.wait
    }
}

impl Default for RetryPolicy {
    /// Matches the conventional package-manager budget: five attempts,
    /// fifteen seconds apart.
    fn default() -> Self {
        Self::new(5, Duration::from_secs(15))
    }
}

/// Runs commands through a [`CommandRunner`] under a [`RetryPolicy`].
pub struct RetryExecutor<'r> {
    runner: &'r dyn CommandRunner,
    policy: RetryPolicy,
}

impl std::fmt::Debug for RetryExecutor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryExecutor").field("policy", &self.policy).finish_non_exhaustive()
    }
}

impl<'r> RetryExecutor<'r> {
    pub fn new(runner: &'r dyn CommandRunner, policy: RetryPolicy) -> Self {
        Self { runner, policy }
    }

    #[must_use]
    pub const fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Runs `cmd`, retrying on failure with a fixed inter-attempt delay.
    ///
    /// A command that fails `k` times then succeeds (`k < max_attempts`)
    /// is invoked exactly `k + 1` times. A command that never succeeds is
    /// invoked exactly `max_attempts` times and surfaces as
    /// [`ExecError::RetriesExhausted`] naming the command.
    ///
    /// # Errors
    /// Returns [`ExecError::RetriesExhausted`] once the budget is spent.
    pub fn execute(&self, cmd: &Cmd) -> Result<(), ExecError> {
        let max = self.policy.max_attempts();

        for attempt in 1..=max {
            match self.runner.run(cmd) {
                Ok(()) => {
                    debug!(command = %cmd, attempt, "Command succeeded");
                    return Ok(());
                },
                Err(err) if attempt < max => {
                    warn!(
                        command = %cmd,
                        attempt,
                        max_attempts = max,
                        error = %err,
                        "Command failed, retrying after fixed delay"
                    );
                    std::thread::sleep(self.policy.wait());
                },
                Err(err) => {
                    warn!(command = %cmd, attempts = max, error = %err, "Retry budget exhausted");
                },
            }
        }

        Err(ExecError::RetriesExhausted {
            command: cmd.to_string(),
            attempts: max,
            context: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::CmdOutput;
    use std::cell::Cell;

    /// Fails the first `failures` invocations, then succeeds.
    struct FlakyRunner {
        failures: u32,
        calls: Cell<u32>,
    }

    impl FlakyRunner {
        fn new(failures: u32) -> Self {
            Self { failures, calls: Cell::new(0) }
        }
    }

    impl CommandRunner for FlakyRunner {
        fn run(&self, cmd: &Cmd) -> Result<(), ExecError> {
            let call = self.calls.get() + 1;
            self.calls.set(call);
            if call <= self.failures {
                Err(ExecError::CommandFailed {
                    command: cmd.to_string(),
                    status: "exit status: 100".into(),
                    context: None,
                })
            } else {
                Ok(())
            }
        }

        fn capture(&self, _cmd: &Cmd) -> Result<CmdOutput, ExecError> {
            unreachable!("retry tests only use run()")
        }
    }

    fn policy(max: u32) -> RetryPolicy {
        RetryPolicy::new(max, Duration::ZERO)
    }

    #[test]
    fn first_attempt_success_invokes_once() {
        let runner = FlakyRunner::new(0);
        RetryExecutor::new(&runner, policy(5)).execute(&Cmd::new("pkg")).unwrap();
        assert_eq!(runner.calls.get(), 1);
    }

    #[test]
    fn k_failures_then_success_invokes_k_plus_one_times() {
        let runner = FlakyRunner::new(2);
        RetryExecutor::new(&runner, policy(5)).execute(&Cmd::new("pkg")).unwrap();
        assert_eq!(runner.calls.get(), 3);
    }

    #[test]
    fn always_failing_invokes_exactly_max_and_names_command() {
        let runner = FlakyRunner::new(u32::MAX);
        let err = RetryExecutor::new(&runner, policy(3))
            .execute(&Cmd::new("apt-get").args(["-y", "install", "collectd"]))
            .unwrap_err();

        assert_eq!(runner.calls.get(), 3);
        match err {
            ExecError::RetriesExhausted { command, attempts, .. } => {
                assert_eq!(attempts, 3);
                assert!(command.contains("apt-get"), "command should be named: {command}");
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_attempts_is_clamped_to_one() {
        let runner = FlakyRunner::new(u32::MAX);
        let err = RetryExecutor::new(&runner, policy(0)).execute(&Cmd::new("pkg")).unwrap_err();
        assert_eq!(runner.calls.get(), 1);
        assert!(matches!(err, ExecError::RetriesExhausted { attempts: 1, .. }));
    }
}
