use crate::error::ReconcileError;
use mkit_platform::ServiceManager;
use strum_macros::Display;
use tracing::{info, warn};

/// Action the run takes on the agent service, derived once per run from
/// the probed run-state and the aggregated artifact change flag.
#[derive(Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "kebab-case")]
pub enum ServiceDecision {
    Start,
    Restart,
    NoAction,
}

/// Transition table: a stopped service is always started, a running one is
/// restarted only when some artifact changed, otherwise left alone.
#[must_use]
pub const fn decide(running: bool, any_changed: bool) -> ServiceDecision {
    match (running, any_changed) {
        (false, _) => ServiceDecision::Start,
        (true, true) => ServiceDecision::Restart,
        (true, false) => ServiceDecision::NoAction,
    }
}

/// Probes the service, decides, and executes at most one action.
///
/// A restart is gated behind a configuration-syntax validation pass.
/// Restarting into a broken configuration must never happen, so on a
/// validation failure the run aborts and the running instance keeps
/// serving its prior, syntactically valid configuration.
pub fn reconcile_service(
    service: &dyn ServiceManager,
    any_changed: bool,
) -> Result<ServiceDecision, ReconcileError> {
    let running = service.status()?;
    let decision = decide(running, any_changed);
    info!(running, any_changed, %decision, "Service reconciliation");

    match decision {
        ServiceDecision::Start => service.start()?,
        ServiceDecision::Restart => {
            let report = service.validate()?;
            if !report.is_ok() {
                warn!(diagnostics = %report.diagnostics, "Configuration validation failed");
                return Err(ReconcileError::Validation {
                    message: format!(
                        "Refusing to restart on invalid configuration: {}",
                        report.diagnostics.trim()
                    )
                    .into(),
                    context: None,
                });
            }
            service.restart()?;
        }
        ServiceDecision::NoAction => {}
    }

    Ok(decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mkit_platform::{PlatformError, ValidationReport};
    use std::cell::RefCell;

    /// Service double recording every capability call.
    struct Probe {
        running: bool,
        valid: bool,
        calls: RefCell<Vec<&'static str>>,
    }

    impl Probe {
        fn new(running: bool, valid: bool) -> Self {
            Self { running, valid, calls: RefCell::new(Vec::new()) }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.borrow().clone()
        }
    }

    impl ServiceManager for Probe {
        fn status(&self) -> Result<bool, PlatformError> {
            self.calls.borrow_mut().push("status");
            Ok(self.running)
        }

        fn start(&self) -> Result<(), PlatformError> {
            self.calls.borrow_mut().push("start");
            Ok(())
        }

        fn restart(&self) -> Result<(), PlatformError> {
            self.calls.borrow_mut().push("restart");
            Ok(())
        }

        fn validate(&self) -> Result<ValidationReport, PlatformError> {
            self.calls.borrow_mut().push("validate");
            Ok(ValidationReport {
                ok: self.valid,
                diagnostics: if self.valid {
                    String::new()
                } else {
                    "parse error in collectd.conf".to_owned()
                },
            })
        }

        fn version(&self) -> Result<String, PlatformError> {
            Ok("collectd 5.12.0".to_owned())
        }
    }

    #[test]
    fn stopped_service_is_started_exactly_once() {
        for any_changed in [false, true] {
            let probe = Probe::new(false, true);
            let decision = reconcile_service(&probe, any_changed).unwrap();
            assert_eq!(decision, ServiceDecision::Start);
            assert_eq!(probe.calls(), ["status", "start"]);
        }
    }

    #[test]
    fn running_unchanged_service_is_left_alone() {
        let probe = Probe::new(true, true);
        let decision = reconcile_service(&probe, false).unwrap();
        assert_eq!(decision, ServiceDecision::NoAction);
        assert_eq!(probe.calls(), ["status"]);
    }

    #[test]
    fn running_changed_service_is_validated_then_restarted() {
        let probe = Probe::new(true, true);
        let decision = reconcile_service(&probe, true).unwrap();
        assert_eq!(decision, ServiceDecision::Restart);
        assert_eq!(probe.calls(), ["status", "validate", "restart"]);
    }

    #[test]
    fn invalid_configuration_aborts_before_any_restart() {
        let probe = Probe::new(true, false);
        let error = reconcile_service(&probe, true).unwrap_err();

        assert!(matches!(error, ReconcileError::Validation { .. }));
        assert_eq!(probe.calls(), ["status", "validate"], "restart must not run");
    }
}
