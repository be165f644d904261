//! Report lifecycle as observed by this service.
//!
//! The external analysis worker drives every transition after creation; the
//! service only creates rows in `Pending` and reads the rest.

use serde::{Deserialize, Serialize};

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ReportStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Processing => "processing",
            ReportStatus::Completed => "completed",
            ReportStatus::Failed => "failed",
        }
    }

    /// `Completed` and `Failed` are final; pollers stop once they see one.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, ReportStatus::Completed | ReportStatus::Failed)
    }

    /// Whether the worker is allowed to move a report from `self` to `next`.
    ///
    /// The worker may skip the `Processing` write for fast runs, so
    /// `Pending -> Completed` is accepted.
    #[must_use]
    pub fn can_transition_to(self, next: ReportStatus) -> bool {
        use ReportStatus::{Completed, Failed, Pending, Processing};
        matches!(
            (self, next),
            (Pending, Processing | Completed | Failed) | (Processing, Completed | Failed)
        )
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReportStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ReportStatus::Pending),
            "processing" => Ok(ReportStatus::Processing),
            "completed" => Ok(ReportStatus::Completed),
            "failed" => Ok(ReportStatus::Failed),
            _ => Err(CoreError::InvalidStatus(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!ReportStatus::Pending.is_terminal());
        assert!(!ReportStatus::Processing.is_terminal());
        assert!(ReportStatus::Completed.is_terminal());
        assert!(ReportStatus::Failed.is_terminal());
    }

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(ReportStatus::Pending.can_transition_to(ReportStatus::Processing));
        assert!(ReportStatus::Pending.can_transition_to(ReportStatus::Completed));
        assert!(ReportStatus::Processing.can_transition_to(ReportStatus::Completed));
        assert!(ReportStatus::Processing.can_transition_to(ReportStatus::Failed));
    }

    #[test]
    fn terminal_states_never_transition() {
        for next in [
            ReportStatus::Pending,
            ReportStatus::Processing,
            ReportStatus::Completed,
            ReportStatus::Failed,
        ] {
            assert!(!ReportStatus::Completed.can_transition_to(next));
            assert!(!ReportStatus::Failed.can_transition_to(next));
        }
    }

    #[test]
    fn backwards_and_self_transitions_are_rejected() {
        assert!(!ReportStatus::Processing.can_transition_to(ReportStatus::Pending));
        assert!(!ReportStatus::Pending.can_transition_to(ReportStatus::Pending));
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(
            "Completed".parse::<ReportStatus>().unwrap(),
            ReportStatus::Completed
        );
        assert!("done".parse::<ReportStatus>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&ReportStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
    }
}
