//! Domain models for the grant reconciler.
//!
//! Grants are modelled the way the database spells them: a privilege verb,
//! an optional target clause and an optional re-grant option. Every model
//! renders back to its canonical statement fragment, which is also the form
//! used to compare desired and observed grants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GrantError;

/// Re-grant option suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantOption {
    /// `WITH ADMIN OPTION` - system privileges and roles.
    Admin,
    /// `WITH GRANT OPTION` - every other privilege kind.
    Grant,
}

impl GrantOption {
    /// The statement suffix, e.g. `WITH ADMIN OPTION`.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Admin => "WITH ADMIN OPTION",
            Self::Grant => "WITH GRANT OPTION",
        }
    }
}

impl fmt::Display for GrantOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => f.write_str("admin"),
            Self::Grant => f.write_str("grant"),
        }
    }
}

/// Privilege classification, decided by the target clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivilegeKind {
    /// Bare verb, no `ON` clause.
    System,
    /// `ON SCHEMA <schema>`.
    Schema,
    /// `ON <schema>.<object>`.
    Object,
    /// `ON REMOTE SOURCE <source>`.
    Source,
    /// `USERGROUP OPERATOR ON USERGROUP <group>`.
    UserGroup,
    /// `USAGE ON CLIENTSIDE ENCRYPTION COLUMN KEY <key>`.
    ColumnKey,
    /// `STRUCTURED PRIVILEGE <name>`.
    Structured,
}

impl PrivilegeKind {
    /// The option suffix this kind accepts.
    #[must_use]
    pub fn grant_option(self) -> GrantOption {
        match self {
            Self::System => GrantOption::Admin,
            _ => GrantOption::Grant,
        }
    }

    /// Render `body` (one verb or a comma-joined list) with this kind's target clause.
    fn fragment(self, body: &str, target: &str, default_schema: &str) -> String {
        match self {
            Self::System => body.to_owned(),
            Self::Structured => format!("{body} {target}"),
            Self::Schema => format!("{body} ON SCHEMA {target}"),
            Self::Object => format!("{body} ON {}", qualify(target, default_schema)),
            Self::Source => format!("{body} ON REMOTE SOURCE {target}"),
            Self::UserGroup => format!("{body} ON USERGROUP {target}"),
            Self::ColumnKey => format!("{body} ON CLIENTSIDE ENCRYPTION COLUMN KEY {target}"),
        }
    }
}

/// A single privilege held by, or to be granted to, a grantee.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Privilege {
    pub kind: PrivilegeKind,
    /// Privilege verb, e.g. `SELECT` or `CREATE ANY TABLE`.
    pub name: String,
    /// Empty for system privileges.
    pub target: String,
    /// Whether the grantee may pass the privilege on.
    pub grantable: bool,
}

impl Privilege {
    #[must_use]
    pub fn new(
        kind: PrivilegeKind,
        name: impl Into<String>,
        target: impl Into<String>,
        grantable: bool,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            target: target.into(),
            grantable,
        }
    }

    /// The option suffix this privilege uses when grantable.
    #[must_use]
    pub fn grant_option(&self) -> GrantOption {
        self.kind.grant_option()
    }

    /// Render the canonical statement fragment.
    ///
    /// Object targets without a schema are qualified with `default_schema`.
    #[must_use]
    pub fn render(&self, default_schema: &str) -> String {
        let fragment = self.kind.fragment(&self.name, &self.target, default_schema);
        with_suffix(fragment, self.grantable, self.grant_option())
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(""))
    }
}

/// A role held by, or to be granted to, a grantee.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    /// Role name, possibly `schema.role`.
    pub name: String,
    /// `WITH ADMIN OPTION`.
    pub grantable: bool,
}

impl Role {
    #[must_use]
    pub fn new(name: impl Into<String>, grantable: bool) -> Self {
        Self {
            name: name.into(),
            grantable,
        }
    }

    /// Render the canonical role reference.
    #[must_use]
    pub fn render(&self) -> String {
        with_suffix(self.name.clone(), self.grantable, GrantOption::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Privileges sharing kind, target and grant option, batched into one statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegeGroup {
    pub kind: PrivilegeKind,
    pub target: String,
    pub grantable: bool,
    /// Privilege verbs in first-seen order.
    pub names: Vec<String>,
}

impl PrivilegeGroup {
    /// Verbs joined with `", "`.
    #[must_use]
    pub fn body(&self) -> String {
        self.names.join(", ")
    }

    #[must_use]
    pub fn is_grantable(&self) -> bool {
        self.grantable
    }

    /// Fragment for a `GRANT` statement, including the option suffix.
    #[must_use]
    pub fn render(&self, default_schema: &str) -> String {
        with_suffix(
            self.render_revoke(default_schema),
            self.grantable,
            self.kind.grant_option(),
        )
    }

    /// Fragment for a `REVOKE` statement. Revokes never carry an option suffix.
    #[must_use]
    pub fn render_revoke(&self, default_schema: &str) -> String {
        self.kind.fragment(&self.body(), &self.target, default_schema)
    }
}

/// Roles sharing a grant option, batched into one statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGroup {
    pub grantable: bool,
    pub names: Vec<String>,
}

impl RoleGroup {
    #[must_use]
    pub fn body(&self) -> String {
        self.names.join(", ")
    }

    #[must_use]
    pub fn is_grantable(&self) -> bool {
        self.grantable
    }
}

/// How much of the observed grant set this system owns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagementPolicy {
    /// Every observed grant is owned; anything not desired is revoked.
    #[default]
    Strict,
    /// Only grants that are desired now or were managed on the previous pass
    /// are owned; everything else is left alone.
    Lax,
}

impl ManagementPolicy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lax => "lax",
        }
    }
}

impl FromStr for ManagementPolicy {
    type Err = GrantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("strict") {
            Ok(Self::Strict)
        } else if s.eq_ignore_ascii_case("lax") {
            Ok(Self::Lax)
        } else {
            Err(GrantError::UnknownPolicy(s.to_owned()))
        }
    }
}

impl fmt::Display for ManagementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Privilege and role strings for one grantee.
///
/// Used for the desired state, the observed state and the managed set that
/// is carried from one pass to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantSet {
    #[serde(default)]
    pub privileges: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl GrantSet {
    #[must_use]
    pub fn new(privileges: Vec<String>, roles: Vec<String>) -> Self {
        Self { privileges, roles }
    }
}

/// Input of one reconciliation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileRequest {
    /// Principal receiving the grants.
    pub grantee: String,
    /// Schema qualifying unqualified object names.
    /// Falls back to the configured schema, then to the grantee name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_schema: Option<String>,
    /// `strict` or `lax`. Falls back to the configured policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    /// Grants as written in the resource specification.
    #[serde(default)]
    pub desired: GrantSet,
    /// Managed set recorded by the last successful pass.
    #[serde(default)]
    pub previously_managed: GrantSet,
}

/// Statements needed to converge one grantee, grouped for batching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilePlan {
    pub grantee: String,
    pub default_schema: String,
    pub revoke_privileges: Vec<PrivilegeGroup>,
    pub revoke_roles: Vec<RoleGroup>,
    pub grant_privileges: Vec<PrivilegeGroup>,
    pub grant_roles: Vec<RoleGroup>,
    /// Managed set to record once the plan has been applied.
    pub managed: GrantSet,
}

impl ReconcilePlan {
    /// Whether the grantee already matches the desired state.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.revoke_privileges.is_empty()
            && self.revoke_roles.is_empty()
            && self.grant_privileges.is_empty()
            && self.grant_roles.is_empty()
    }

    /// Render the plan as DDL, revokes first.
    ///
    /// Revoking before granting lets a privilege change its grant option:
    /// the old variant is dropped and the new one granted in the same pass.
    #[must_use]
    pub fn statements(&self) -> Vec<String> {
        let grantee = quote_identifier(&self.grantee);
        let schema = self.default_schema.as_str();

        let revoke_privileges = self
            .revoke_privileges
            .iter()
            .map(|g| format!("REVOKE {} FROM {grantee}", g.render_revoke(schema)));
        let revoke_roles = self
            .revoke_roles
            .iter()
            .map(|g| format!("REVOKE {} FROM {grantee}", g.body()));
        let grant_privileges = self
            .grant_privileges
            .iter()
            .map(|g| format!("GRANT {} TO {grantee}", g.render(schema)));
        let grant_roles = self.grant_roles.iter().map(|g| {
            with_suffix(
                format!("GRANT {} TO {grantee}", g.body()),
                g.grantable,
                GrantOption::Admin,
            )
        });

        revoke_privileges
            .chain(revoke_roles)
            .chain(grant_privileges)
            .chain(grant_roles)
            .collect()
    }
}

/// Result of a successful reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    /// Statements issued, in execution order. Empty when nothing changed.
    pub executed: Vec<String>,
    /// Managed set to persist as the next pass's `previously_managed`.
    pub managed: GrantSet,
}

/// Double-quote an identifier, doubling embedded quotes.
#[must_use]
pub fn quote_identifier(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// The grant every user implicitly holds on its own default schema.
///
/// It is never managed under [`ManagementPolicy::Lax`].
#[must_use]
pub fn default_privilege(default_schema: &str) -> String {
    Privilege::new(PrivilegeKind::Schema, "CREATE ANY", default_schema, true).render(default_schema)
}

fn with_suffix(fragment: String, grantable: bool, option: GrantOption) -> String {
    if grantable {
        format!("{fragment} {}", option.suffix())
    } else {
        fragment
    }
}

fn qualify(target: &str, default_schema: &str) -> String {
    if default_schema.is_empty() || has_schema_qualifier(target) {
        target.to_owned()
    } else {
        format!("{default_schema}.{target}")
    }
}

/// Whether `ident` contains a dot outside double quotes.
fn has_schema_qualifier(ident: &str) -> bool {
    let mut quoted = false;
    for c in ident.chars() {
        match c {
            '"' => quoted = !quoted,
            '.' if !quoted => return true,
            _ => {}
        }
    }
    false
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn renders_each_kind() {
        let cases = [
            (
                Privilege::new(PrivilegeKind::System, "CREATE ANY TABLE", "", false),
                "CREATE ANY TABLE",
            ),
            (
                Privilege::new(PrivilegeKind::Schema, "SELECT", "X", false),
                "SELECT ON SCHEMA X",
            ),
            (
                Privilege::new(PrivilegeKind::Object, "SELECT", "S.T", false),
                "SELECT ON S.T",
            ),
            (
                Privilege::new(PrivilegeKind::Source, "CREATE VIRTUAL TABLE", "SRC", false),
                "CREATE VIRTUAL TABLE ON REMOTE SOURCE SRC",
            ),
            (
                Privilege::new(PrivilegeKind::UserGroup, "USERGROUP OPERATOR", "G", false),
                "USERGROUP OPERATOR ON USERGROUP G",
            ),
            (
                Privilege::new(PrivilegeKind::ColumnKey, "USAGE", "K", false),
                "USAGE ON CLIENTSIDE ENCRYPTION COLUMN KEY K",
            ),
            (
                Privilege::new(PrivilegeKind::Structured, "STRUCTURED PRIVILEGE", "AP", false),
                "STRUCTURED PRIVILEGE AP",
            ),
        ];

        for (privilege, expected) in cases {
            assert_eq!(privilege.render("S"), expected);
        }
    }

    #[test]
    fn suffix_follows_kind() {
        let system = Privilege::new(PrivilegeKind::System, "AUDIT ADMIN", "", true);
        assert_eq!(system.render("S"), "AUDIT ADMIN WITH ADMIN OPTION");

        let object = Privilege::new(PrivilegeKind::Object, "SELECT", "S.T", true);
        assert_eq!(object.render("S"), "SELECT ON S.T WITH GRANT OPTION");
    }

    #[test]
    fn unqualified_object_takes_default_schema() {
        let p = Privilege::new(PrivilegeKind::Object, "SELECT", "T", false);
        assert_eq!(p.render("APP"), "SELECT ON APP.T");
        assert_eq!(p.to_string(), "SELECT ON T");

        let quoted = Privilege::new(PrivilegeKind::Object, "SELECT", "\"a.b\"", false);
        assert_eq!(quoted.render("APP"), "SELECT ON APP.\"a.b\"");
    }

    #[test]
    fn group_revoke_drops_suffix() {
        let group = PrivilegeGroup {
            kind: PrivilegeKind::Object,
            target: "S.T".to_owned(),
            grantable: true,
            names: vec!["SELECT".to_owned(), "INSERT".to_owned()],
        };
        assert_eq!(group.body(), "SELECT, INSERT");
        assert_eq!(group.render("S"), "SELECT, INSERT ON S.T WITH GRANT OPTION");
        assert_eq!(group.render_revoke("S"), "SELECT, INSERT ON S.T");
    }

    #[test]
    fn role_render() {
        assert_eq!(Role::new("S.R", false).render(), "S.R");
        assert_eq!(Role::new("R", true).to_string(), "R WITH ADMIN OPTION");
    }

    #[test]
    fn default_privilege_is_schema_scoped() {
        assert_eq!(
            default_privilege("S"),
            "CREATE ANY ON SCHEMA S WITH GRANT OPTION"
        );
    }

    #[test]
    fn policy_parsing() {
        assert_eq!("strict".parse::<ManagementPolicy>(), Ok(ManagementPolicy::Strict));
        assert_eq!("LAX".parse::<ManagementPolicy>(), Ok(ManagementPolicy::Lax));
        assert_eq!(
            "bogus".parse::<ManagementPolicy>(),
            Err(GrantError::UnknownPolicy("bogus".to_owned()))
        );
    }

    #[test]
    fn plan_statements_revoke_before_grant() {
        let plan = ReconcilePlan {
            grantee: "APP_USER".to_owned(),
            default_schema: "APP".to_owned(),
            revoke_privileges: vec![PrivilegeGroup {
                kind: PrivilegeKind::Object,
                target: "APP.T".to_owned(),
                grantable: true,
                names: vec!["SELECT".to_owned()],
            }],
            revoke_roles: vec![RoleGroup {
                grantable: false,
                names: vec!["OLD_ROLE".to_owned()],
            }],
            grant_privileges: vec![PrivilegeGroup {
                kind: PrivilegeKind::Object,
                target: "APP.T".to_owned(),
                grantable: false,
                names: vec!["SELECT".to_owned(), "INSERT".to_owned()],
            }],
            grant_roles: vec![RoleGroup {
                grantable: true,
                names: vec!["R1".to_owned(), "S.R2".to_owned()],
            }],
            managed: GrantSet::default(),
        };

        assert!(!plan.is_noop());
        assert_eq!(
            plan.statements(),
            vec![
                "REVOKE SELECT ON APP.T FROM \"APP_USER\"",
                "REVOKE OLD_ROLE FROM \"APP_USER\"",
                "GRANT SELECT, INSERT ON APP.T TO \"APP_USER\"",
                "GRANT R1, S.R2 TO \"APP_USER\" WITH ADMIN OPTION",
            ]
        );
    }

    #[test]
    fn empty_plan_is_noop() {
        let plan = ReconcilePlan::default();
        assert!(plan.is_noop());
        assert!(plan.statements().is_empty());
    }

    #[test]
    fn quote_identifier_escapes_quotes() {
        assert_eq!(quote_identifier("user"), "\"user\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn policy_serde_uses_lowercase() {
        let json = serde_json::to_string(&ManagementPolicy::Lax).unwrap();
        assert_eq!(json, "\"lax\"");
        let back: ManagementPolicy = serde_json::from_str("\"strict\"").unwrap();
        assert_eq!(back, ManagementPolicy::Strict);
    }
}
