//! Error types for the grant reconciler.

use thiserror::Error;

use crate::models::GrantOption;

/// Errors that can occur while reconciling grants.
///
/// Grammar and policy errors are caused by the resource specification or
/// configuration and never resolve on retry. Observation and execution errors
/// come from the SQL side and are expected to clear up on a later pass.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GrantError {
    /// The string matches no privilege rule.
    #[error("unknown privilege: '{0}'")]
    UnknownPrivilege(String),

    /// The string is not a valid role reference.
    #[error("unknown role: '{0}'")]
    UnknownRole(String),

    /// The option suffix does not fit the entity kind.
    #[error("invalid {option} option in '{input}'")]
    InvalidOption { input: String, option: GrantOption },

    /// The policy name is neither `strict` nor `lax`.
    #[error("unknown privilege management policy: '{0}'")]
    UnknownPolicy(String),

    /// No observed grant set was supplied.
    #[error("observed grants are required for filtering")]
    NilObservation,

    /// Reading the grantee's current grants failed.
    #[error("failed to observe grants: {0}")]
    Observation(String),

    /// A statement was rejected by the database.
    #[error("failed to execute '{statement}': {reason}")]
    Execution { statement: String, reason: String },
}

impl GrantError {
    /// Whether retrying the same input can never succeed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::UnknownPrivilege(_)
            | Self::UnknownRole(_)
            | Self::InvalidOption { .. }
            | Self::UnknownPolicy(_)
            | Self::NilObservation => true,
            Self::Observation(_) | Self::Execution { .. } => false,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn grammar_and_policy_errors_are_terminal() {
        assert!(GrantError::UnknownPrivilege("x".to_owned()).is_terminal());
        assert!(GrantError::UnknownRole("x".to_owned()).is_terminal());
        assert!(
            GrantError::InvalidOption {
                input: "SELECT ON T WITH ADMIN OPTION".to_owned(),
                option: GrantOption::Admin,
            }
            .is_terminal()
        );
        assert!(GrantError::UnknownPolicy("bogus".to_owned()).is_terminal());
        assert!(GrantError::NilObservation.is_terminal());
    }

    #[test]
    fn sql_side_errors_are_transient() {
        assert!(!GrantError::Observation("timeout".to_owned()).is_terminal());
        assert!(
            !GrantError::Execution {
                statement: "GRANT SELECT TO \"U\"".to_owned(),
                reason: "connection reset".to_owned(),
            }
            .is_terminal()
        );
    }

    #[test]
    fn invalid_option_message_names_the_option() {
        let err = GrantError::InvalidOption {
            input: "CREATE ANY TABLE WITH GRANT OPTION".to_owned(),
            option: GrantOption::Grant,
        };
        assert_eq!(
            err.to_string(),
            "invalid grant option in 'CREATE ANY TABLE WITH GRANT OPTION'"
        );
    }
}
