//! Public API and collaborator traits for the grant reconciler.
//!
//! Connection management and authentication live entirely behind
//! [`GrantObserver`] and [`GrantExecutor`]; the reconciler only reads grant
//! strings and hands over statements.

use async_trait::async_trait;

use crate::error::GrantError;
use crate::models::{GrantSet, ReconcileOutcome, ReconcilePlan, ReconcileRequest};

/// Public API trait for the grant reconciler.
///
/// Callers must not run two passes for the same grantee concurrently.
#[async_trait]
pub trait GrantReconcilerClient: Send + Sync {
    /// Observe the grantee and compute the statements needed to converge,
    /// without executing them.
    ///
    /// # Errors
    ///
    /// - Grammar errors for malformed desired entries
    /// - `UnknownPolicy` for an unrecognized policy name
    /// - `Observation` if the current grants cannot be read
    async fn plan(&self, request: ReconcileRequest) -> Result<ReconcilePlan, GrantError>;

    /// Observe, plan and execute one pass.
    ///
    /// Statements run sequentially and the pass stops at the first failure;
    /// statements already executed stay applied.
    ///
    /// # Errors
    ///
    /// - Everything [`GrantReconcilerClient::plan`] can return
    /// - `Execution` for the first statement the database rejects
    async fn reconcile(&self, request: ReconcileRequest) -> Result<ReconcileOutcome, GrantError>;
}

/// Reads the grants a principal currently holds.
#[async_trait]
pub trait GrantObserver: Send + Sync {
    /// Return the grantee's privileges and roles in canonical form
    /// (schema-qualified objects, explicit option suffixes).
    ///
    /// # Errors
    ///
    /// - `Observation` if the grants cannot be read
    async fn observe(&self, grantee: &str) -> Result<GrantSet, GrantError>;
}

/// Runs a single DDL statement.
#[async_trait]
pub trait GrantExecutor: Send + Sync {
    /// Execute `statement` and wait for it to complete.
    ///
    /// # Errors
    ///
    /// - `Execution` if the database rejects the statement
    async fn execute(&self, statement: &str) -> Result<(), GrantError>;
}
