//! Domain errors for the grant reconciler.

use grant_reconciler_sdk::GrantError;

/// Internal domain errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid grant: {0}")]
    InvalidGrant(GrantError),

    #[error("invalid reconciler configuration: {0}")]
    InvalidConfig(GrantError),

    #[error("grant observer unavailable: {0}")]
    ObserverUnavailable(String),

    #[error("statement '{statement}' failed after {applied} applied: {reason}")]
    StatementFailed {
        statement: String,
        reason: String,
        applied: usize,
    },
}

impl DomainError {
    /// Whether retrying the same input can never succeed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::InvalidGrant(_) | Self::InvalidConfig(_))
    }
}

impl From<GrantError> for DomainError {
    fn from(e: GrantError) -> Self {
        match e {
            GrantError::UnknownPrivilege(_)
            | GrantError::UnknownRole(_)
            | GrantError::InvalidOption { .. } => Self::InvalidGrant(e),
            GrantError::UnknownPolicy(_) | GrantError::NilObservation => Self::InvalidConfig(e),
            GrantError::Observation(reason) => Self::ObserverUnavailable(reason),
            GrantError::Execution { statement, reason } => Self::StatementFailed {
                statement,
                reason,
                applied: 0,
            },
        }
    }
}

impl From<DomainError> for GrantError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidGrant(e) | DomainError::InvalidConfig(e) => e,
            DomainError::ObserverUnavailable(reason) => Self::Observation(reason),
            DomainError::StatementFailed {
                statement, reason, ..
            } => Self::Execution { statement, reason },
        }
    }
}
