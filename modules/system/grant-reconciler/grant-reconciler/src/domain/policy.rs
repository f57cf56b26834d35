//! Ownership policy: which observed grants take part in diffing.
//!
//! Under `strict` every observed grant is owned and is driven to match the
//! desired state. Under `lax` only grants that are desired now, or were
//! managed on the previous pass, are owned; anything else the grantee holds
//! was granted by someone else and is never revoked.

use std::collections::HashSet;

use grant_reconciler_sdk::{GrantError, ManagementPolicy, default_privilege};

/// Narrow observed privileges to the ones this pass owns.
///
/// `observed` is borrowed and never modified, so on error the caller still
/// holds the original set.
///
/// # Errors
///
/// - `UnknownPolicy` if `policy` is neither `strict` nor `lax`
/// - `NilObservation` if `observed` is `None`
pub fn filter_observed(
    observed: Option<&[String]>,
    desired: &[String],
    previously_managed: &[String],
    policy: &str,
    default_schema: &str,
) -> Result<Vec<String>, GrantError> {
    let policy: ManagementPolicy = policy.parse()?;
    let observed = observed.ok_or(GrantError::NilObservation)?;

    Ok(match policy {
        ManagementPolicy::Strict => observed.to_vec(),
        ManagementPolicy::Lax => {
            let baseline = default_privilege(default_schema);
            owned(observed, desired, previously_managed, Some(baseline.as_str()))
        }
    })
}

/// Narrow observed roles to the ones this pass owns.
///
/// Roles have no implicit baseline grant.
///
/// # Errors
///
/// - `UnknownPolicy` if `policy` is neither `strict` nor `lax`
/// - `NilObservation` if `observed` is `None`
pub fn filter_observed_roles(
    observed: Option<&[String]>,
    desired: &[String],
    previously_managed: &[String],
    policy: &str,
) -> Result<Vec<String>, GrantError> {
    let policy: ManagementPolicy = policy.parse()?;
    let observed = observed.ok_or(GrantError::NilObservation)?;

    Ok(match policy {
        ManagementPolicy::Strict => observed.to_vec(),
        ManagementPolicy::Lax => owned(observed, desired, previously_managed, None),
    })
}

fn owned(
    observed: &[String],
    desired: &[String],
    previously_managed: &[String],
    excluded: Option<&str>,
) -> Vec<String> {
    let claimed: HashSet<&str> = desired
        .iter()
        .chain(previously_managed)
        .map(String::as_str)
        .collect();

    observed
        .iter()
        .filter(|entry| excluded != Some(entry.as_str()))
        .filter(|entry| claimed.contains(entry.as_str()))
        .cloned()
        .collect()
}
