#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Grant Reconciler SDK
//!
//! This crate provides the public contract of the `grant_reconciler` module:
//!
//! - [`Privilege`], [`Role`] - Typed grant entities with canonical rendering
//! - [`PrivilegeGroup`], [`RoleGroup`] - Statement batching units
//! - [`ManagementPolicy`] - Strict vs lax ownership of observed grants
//! - [`ReconcileRequest`], [`ReconcilePlan`], [`ReconcileOutcome`] - One reconciliation pass
//! - [`GrantReconcilerClient`] - Public API trait for consumers
//! - [`GrantObserver`], [`GrantExecutor`] - Collaborator traits for the SQL side
//! - [`GrantError`] - Error taxonomy
//!
//! ## Usage
//!
//! ```ignore
//! use grant_reconciler_sdk::{GrantReconcilerClient, GrantSet, ReconcileRequest};
//!
//! let request = ReconcileRequest {
//!     grantee: "APP_USER".to_owned(),
//!     policy: Some("lax".to_owned()),
//!     desired: GrantSet::new(vec!["SELECT ON SCHEMA SALES".to_owned()], vec![]),
//!     previously_managed: status.managed.clone(),
//!     ..Default::default()
//! };
//!
//! let outcome = client.reconcile(request).await?;
//! status.managed = outcome.managed;
//! ```

pub mod api;
pub mod error;
pub mod models;

pub use api::{GrantExecutor, GrantObserver, GrantReconcilerClient};
pub use error::GrantError;
pub use models::{
    GrantOption, GrantSet, ManagementPolicy, Privilege, PrivilegeGroup, PrivilegeKind,
    ReconcileOutcome, ReconcilePlan, ReconcileRequest, Role, RoleGroup, default_privilege,
    quote_identifier,
};
