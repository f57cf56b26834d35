//! Pure planning: desired + observed grants in, grouped statements out.
//!
//! `parse desired -> filter observed -> diff -> group`. Nothing here blocks
//! or keeps state between calls.

use grant_reconciler_sdk::{
    GrantError, GrantSet, ManagementPolicy, ReconcilePlan, default_privilege,
};

use super::diff::{diff, unique};
use super::grammar::{canonicalize_privileges, canonicalize_roles, parse_privileges, parse_roles};
use super::group::{group_privileges, group_roles};
use super::policy::{filter_observed, filter_observed_roles};

/// Everything one planning pass needs.
#[derive(Debug, Clone, Copy)]
pub struct PlanInput<'a> {
    pub grantee: &'a str,
    pub default_schema: &'a str,
    /// `strict` or `lax`.
    pub policy: &'a str,
    pub desired: &'a GrantSet,
    /// `None` when the grantee could not be observed.
    pub observed: Option<&'a GrantSet>,
    pub previously_managed: &'a GrantSet,
}

/// Compute the statements that converge the grantee onto the desired state.
///
/// Desired entries are canonicalized first, so any malformed entry aborts the
/// whole pass. Observed and previously-managed entries are expected in
/// canonical form already.
///
/// # Errors
///
/// - Grammar errors for the first malformed desired entry
/// - `UnknownPolicy`, `NilObservation` from the ownership filter
/// - Grammar errors if an observed grant that must be revoked cannot be parsed
pub fn plan(input: &PlanInput<'_>) -> Result<ReconcilePlan, GrantError> {
    let schema = input.default_schema;
    let policy: ManagementPolicy = input.policy.parse()?;

    let desired_privileges = unique(&canonicalize_privileges(&input.desired.privileges, schema)?);
    let desired_roles = unique(&canonicalize_roles(&input.desired.roles)?);

    let observed_privileges = filter_observed(
        input.observed.map(|o| o.privileges.as_slice()),
        &desired_privileges,
        &input.previously_managed.privileges,
        input.policy,
        schema,
    )?;
    let observed_roles = filter_observed_roles(
        input.observed.map(|o| o.roles.as_slice()),
        &desired_roles,
        &input.previously_managed.roles,
        input.policy,
    )?;

    // Under lax the baseline grant is never observed, so asking for it must
    // not produce a GRANT on every pass.
    let mut comparable_privileges = desired_privileges.clone();
    if policy == ManagementPolicy::Lax {
        let baseline = default_privilege(schema);
        comparable_privileges.retain(|p| *p != baseline);
    }

    let privileges = diff(&comparable_privileges, &observed_privileges);
    let roles = diff(&desired_roles, &observed_roles);

    let mut plan = ReconcilePlan {
        grantee: input.grantee.to_owned(),
        default_schema: schema.to_owned(),
        managed: GrantSet::new(desired_privileges, desired_roles),
        ..ReconcilePlan::default()
    };

    if !privileges.equal {
        plan.revoke_privileges =
            group_privileges(&parse_privileges(&privileges.to_remove, schema)?);
        plan.grant_privileges = group_privileges(&parse_privileges(&privileges.to_add, schema)?);
    }
    if !roles.equal {
        plan.revoke_roles = group_roles(&parse_roles(&roles.to_remove)?);
        plan.grant_roles = group_roles(&parse_roles(&roles.to_add)?);
    }

    Ok(plan)
}
