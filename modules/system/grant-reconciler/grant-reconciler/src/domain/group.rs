//! Statement batching.
//!
//! `GRANT a, b ON x` is equivalent to two single grants but costs one round
//! trip. The option suffix applies to the whole statement, so entries that
//! differ in grant option are never merged.

use grant_reconciler_sdk::{Privilege, PrivilegeGroup, PrivilegeKind, Role, RoleGroup};

/// Group privileges by `(kind, target, grantable)`.
///
/// Groups appear in the order their key is first seen and names keep their
/// first-seen order; a name repeated within a group is kept once.
#[must_use]
pub fn group_privileges(privileges: &[Privilege]) -> Vec<PrivilegeGroup> {
    let mut groups: Vec<PrivilegeGroup> = Vec::new();

    for privilege in privileges {
        let key = (privilege.kind, privilege.target.as_str(), privilege.grantable);
        match groups.iter().position(|g| group_key(g) == key) {
            Some(idx) => {
                let names = &mut groups[idx].names;
                if !names.contains(&privilege.name) {
                    names.push(privilege.name.clone());
                }
            }
            None => groups.push(PrivilegeGroup {
                kind: privilege.kind,
                target: privilege.target.clone(),
                grantable: privilege.grantable,
                names: vec![privilege.name.clone()],
            }),
        }
    }

    groups
}

/// Group roles by grant option, in the order each option is first seen.
#[must_use]
pub fn group_roles(roles: &[Role]) -> Vec<RoleGroup> {
    let mut groups: Vec<RoleGroup> = Vec::new();

    for role in roles {
        match groups.iter().position(|g| g.grantable == role.grantable) {
            Some(idx) => {
                let names = &mut groups[idx].names;
                if !names.contains(&role.name) {
                    names.push(role.name.clone());
                }
            }
            None => groups.push(RoleGroup {
                grantable: role.grantable,
                names: vec![role.name.clone()],
            }),
        }
    }

    groups
}

fn group_key(group: &PrivilegeGroup) -> (PrivilegeKind, &str, bool) {
    (group.kind, group.target.as_str(), group.grantable)
}
