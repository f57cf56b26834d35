//! Configuration for the grant reconciler.

use std::path::Path;

use anyhow::Context;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use grant_reconciler_sdk::ManagementPolicy;
use serde::{Deserialize, Serialize};

/// Environment variables with this prefix override file values.
pub const ENV_PREFIX: &str = "GRANT_RECONCILER_";

/// Configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GrantReconcilerConfig {
    /// Ownership policy for requests that don't name one.
    pub policy: ManagementPolicy,
    /// Schema for requests that don't name one. When unset the grantee name is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_schema: Option<String>,
}

impl GrantReconcilerConfig {
    /// Load defaults, then the optional YAML file, then `GRANT_RECONCILER_*` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or a value has the wrong shape.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .context("failed to load grant reconciler configuration")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_to_strict_without_schema() {
        Jail::expect_with(|_jail| {
            let cfg = GrantReconcilerConfig::load(None).unwrap();
            assert_eq!(cfg, GrantReconcilerConfig::default());
            assert_eq!(cfg.policy, ManagementPolicy::Strict);
            assert!(cfg.default_schema.is_none());
            Ok(())
        });
    }

    #[test]
    fn reads_yaml_file() {
        Jail::expect_with(|jail| {
            jail.create_file("grants.yaml", "policy: lax\ndefault_schema: APP\n")?;
            let cfg = GrantReconcilerConfig::load(Some(Path::new("grants.yaml"))).unwrap();
            assert_eq!(cfg.policy, ManagementPolicy::Lax);
            assert_eq!(cfg.default_schema.as_deref(), Some("APP"));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("grants.yaml", "policy: lax\n")?;
            jail.set_env("GRANT_RECONCILER_POLICY", "strict");
            jail.set_env("GRANT_RECONCILER_DEFAULT_SCHEMA", "OPS");
            let cfg = GrantReconcilerConfig::load(Some(Path::new("grants.yaml"))).unwrap();
            assert_eq!(cfg.policy, ManagementPolicy::Strict);
            assert_eq!(cfg.default_schema.as_deref(), Some("OPS"));
            Ok(())
        });
    }

    #[test]
    fn unknown_fields_are_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("grants.yaml", "policy: strict\nvendor: other\n")?;
            assert!(GrantReconcilerConfig::load(Some(Path::new("grants.yaml"))).is_err());
            Ok(())
        });
    }

    #[test]
    fn unknown_policy_is_rejected() {
        Jail::expect_with(|jail| {
            jail.create_file("grants.yaml", "policy: relaxed\n")?;
            assert!(GrantReconcilerConfig::load(Some(Path::new("grants.yaml"))).is_err());
            Ok(())
        });
    }
}
