//! Resolution of the single status value published per reconciliation pass.

use std::fmt;

/// How a status is surfaced by the runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Transient, self-resolving condition.
    Maintenance,
    /// Needs operator intervention (or removal of a conflicting relation).
    Blocked,
    Active,
}

/// The closed set of statuses the hub may report. Exactly one is live per
/// pass; see [`resolve`] for the precedence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    WaitingForWorkload,
    NotTrusted,
    MultipleStorageBackends,
    InvalidS3Credentials,
    NotRunning,
    Active,
}

impl Status {
    pub fn severity(&self) -> Severity {
        match self {
            Status::WaitingForWorkload => Severity::Maintenance,
            Status::NotTrusted
            | Status::MultipleStorageBackends
            | Status::InvalidS3Credentials
            | Status::NotRunning => Severity::Blocked,
            Status::Active => Severity::Active,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::WaitingForWorkload => write!(f, "Waiting for Pebble"),
            Status::NotTrusted => {
                write!(f, "Integration Hub is not trusted! Please check logs.")
            }
            Status::MultipleStorageBackends => write!(
                f,
                "Integration Hub can be related to only one storage backend at a time."
            ),
            Status::InvalidS3Credentials => write!(f, "Invalid S3 credentials"),
            Status::NotRunning => {
                write!(f, "Integration Hub is not running. Please check logs.")
            }
            Status::Active => Ok(()),
        }
    }
}

/// Independent health/validity signals gathered fresh at resolution time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusSignals {
    pub workload_ready: bool,
    pub trusted: bool,
    pub storage_conflict: bool,
    pub s3_credentials_invalid: bool,
    pub workload_active: bool,
}

/// Map the current signals to exactly one status, first match wins.
pub fn resolve(app_name: &str, signals: StatusSignals) -> Status {
    if !signals.workload_ready {
        return Status::WaitingForWorkload;
    }
    if !signals.trusted {
        tracing::warn!(app = app_name, "application is not trusted");
        return Status::NotTrusted;
    }
    if signals.storage_conflict {
        return Status::MultipleStorageBackends;
    }
    if signals.s3_credentials_invalid {
        return Status::InvalidS3Credentials;
    }
    if !signals.workload_active {
        return Status::NotRunning;
    }
    Status::Active
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn healthy() -> StatusSignals {
        StatusSignals {
            workload_ready: true,
            trusted: true,
            storage_conflict: false,
            s3_credentials_invalid: false,
            workload_active: true,
        }
    }

    #[test]
    fn test_all_healthy_is_active() {
        assert_eq!(resolve("hub", healthy()), Status::Active);
        assert_eq!(resolve("hub", healthy()).severity(), Severity::Active);
    }

    #[rstest]
    // not-ready outranks everything
    #[case(
        StatusSignals { workload_ready: false, trusted: false, storage_conflict: true, s3_credentials_invalid: true, workload_active: false },
        Status::WaitingForWorkload
    )]
    // trust outranks storage signals
    #[case(
        StatusSignals { trusted: false, storage_conflict: true, s3_credentials_invalid: true, ..healthy() },
        Status::NotTrusted
    )]
    // conflict outranks invalid credentials
    #[case(
        StatusSignals { storage_conflict: true, s3_credentials_invalid: true, workload_active: false, ..healthy() },
        Status::MultipleStorageBackends
    )]
    // invalid credentials outrank the running check
    #[case(
        StatusSignals { s3_credentials_invalid: true, workload_active: false, ..healthy() },
        Status::InvalidS3Credentials
    )]
    #[case(
        StatusSignals { workload_active: false, ..healthy() },
        Status::NotRunning
    )]
    fn test_precedence(#[case] signals: StatusSignals, #[case] expected: Status) {
        assert_eq!(resolve("hub", signals), expected);
    }

    #[test]
    fn test_invalid_credentials_outrank_active() {
        let signals = StatusSignals {
            s3_credentials_invalid: true,
            ..healthy()
        };
        assert_eq!(resolve("hub", signals), Status::InvalidS3Credentials);
        assert_eq!(resolve("hub", signals).severity(), Severity::Blocked);
    }

    #[test]
    fn test_not_trusted_message_does_not_depend_on_the_app_name() {
        let signals = StatusSignals {
            trusted: false,
            ..healthy()
        };
        let status = resolve("some-deployment", signals);
        assert_eq!(
            status.to_string(),
            "Integration Hub is not trusted! Please check logs."
        );
    }

    #[test]
    fn test_waiting_is_maintenance_not_blocked() {
        assert_eq!(Status::WaitingForWorkload.severity(), Severity::Maintenance);
    }
}
