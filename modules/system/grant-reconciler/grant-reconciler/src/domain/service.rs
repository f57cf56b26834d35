//! Domain service for the grant reconciler.

use std::sync::Arc;

use grant_reconciler_sdk::{
    GrantError, GrantExecutor, GrantObserver, GrantSet, ReconcileOutcome, ReconcilePlan,
    ReconcileRequest,
};
use tracing::{debug, info};

use super::error::DomainError;
use super::planner::{self, PlanInput};
use crate::config::GrantReconcilerConfig;

/// Grant reconciler service.
pub struct Service {
    observer: Arc<dyn GrantObserver>,
    executor: Arc<dyn GrantExecutor>,
    config: GrantReconcilerConfig,
}

impl Service {
    #[must_use]
    pub fn new(
        observer: Arc<dyn GrantObserver>,
        executor: Arc<dyn GrantExecutor>,
        config: GrantReconcilerConfig,
    ) -> Self {
        Self {
            observer,
            executor,
            config,
        }
    }

    fn default_schema<'a>(&'a self, request: &'a ReconcileRequest) -> &'a str {
        request
            .default_schema
            .as_deref()
            .or(self.config.default_schema.as_deref())
            .unwrap_or(&request.grantee)
    }

    fn policy<'a>(&'a self, request: &'a ReconcileRequest) -> &'a str {
        request
            .policy
            .as_deref()
            .unwrap_or(self.config.policy.as_str())
    }

    /// Plan against an already observed grant set. Never touches collaborators.
    ///
    /// # Errors
    ///
    /// - `InvalidGrant` for malformed desired entries
    /// - `InvalidConfig` for an unknown policy
    pub fn plan_with(
        &self,
        request: &ReconcileRequest,
        observed: &GrantSet,
    ) -> Result<ReconcilePlan, DomainError> {
        let plan = planner::plan(&PlanInput {
            grantee: &request.grantee,
            default_schema: self.default_schema(request),
            policy: self.policy(request),
            desired: &request.desired,
            observed: Some(observed),
            previously_managed: &request.previously_managed,
        })?;

        debug!(
            revoke_privileges = plan.revoke_privileges.len(),
            revoke_roles = plan.revoke_roles.len(),
            grant_privileges = plan.grant_privileges.len(),
            grant_roles = plan.grant_roles.len(),
            "Computed grant plan"
        );
        Ok(plan)
    }

    /// Observe the grantee and plan the statements that converge it.
    ///
    /// # Errors
    ///
    /// - `ObserverUnavailable` if the observer fails
    /// - Planning errors, see [`Service::plan_with`]
    #[tracing::instrument(skip_all, fields(grantee = %request.grantee))]
    pub async fn plan(&self, request: &ReconcileRequest) -> Result<ReconcilePlan, DomainError> {
        let observed = self.observer.observe(&request.grantee).await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to observe grants");
            DomainError::from(e)
        })?;
        self.plan_with(request, &observed)
    }

    /// Execute the plan's statements one at a time, revokes first.
    ///
    /// Stops at the first failure. Statements already executed stay applied;
    /// the next pass observes them and plans from there.
    ///
    /// # Errors
    ///
    /// `StatementFailed` naming the failing statement and how many ran before it.
    #[tracing::instrument(
        skip_all,
        fields(grantee = %plan.grantee, statements = tracing::field::Empty)
    )]
    pub async fn apply(&self, plan: &ReconcilePlan) -> Result<Vec<String>, DomainError> {
        let statements = plan.statements();
        tracing::Span::current().record("statements", statements.len());

        let mut executed = Vec::with_capacity(statements.len());
        for statement in statements {
            if let Err(e) = self.executor.execute(&statement).await {
                tracing::error!(
                    statement = %statement,
                    applied = executed.len(),
                    error = %e,
                    "Grant statement failed"
                );
                return Err(DomainError::StatementFailed {
                    statement,
                    reason: failure_reason(e),
                    applied: executed.len(),
                });
            }
            debug!(statement = %statement, "Executed grant statement");
            executed.push(statement);
        }

        Ok(executed)
    }

    /// Run one full pass: observe, plan, apply.
    ///
    /// # Errors
    ///
    /// Any error from [`Service::plan`] or [`Service::apply`]. No managed set
    /// is returned on error.
    #[tracing::instrument(skip_all, fields(grantee = %request.grantee))]
    pub async fn reconcile(
        &self,
        request: &ReconcileRequest,
    ) -> Result<ReconcileOutcome, DomainError> {
        let plan = self.plan(request).await?;
        if plan.is_noop() {
            debug!("Grants already converged");
            return Ok(ReconcileOutcome {
                executed: Vec::new(),
                managed: plan.managed,
            });
        }

        let executed = self.apply(&plan).await?;
        info!(executed = executed.len(), "Reconciled grants");

        Ok(ReconcileOutcome {
            executed,
            managed: plan.managed,
        })
    }
}

fn failure_reason(e: GrantError) -> String {
    match e {
        GrantError::Execution { reason, .. } => reason,
        other => other.to_string(),
    }
}
