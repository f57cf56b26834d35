//! Grant Reconciler Module
//!
//! Converges the privileges and roles held by a database principal onto a
//! declared set. Grant strings are parsed and canonicalized, observed grants
//! are narrowed by the ownership policy, and the difference is issued as
//! batched `GRANT`/`REVOKE` statements through a host-supplied executor.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod module;

pub use config::GrantReconcilerConfig;
pub use module::GrantReconciler;
