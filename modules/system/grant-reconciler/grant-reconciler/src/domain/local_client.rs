//! Local (in-process) client for the grant reconciler.

use std::sync::Arc;

use async_trait::async_trait;
use grant_reconciler_sdk::{
    GrantError, GrantReconcilerClient, ReconcileOutcome, ReconcilePlan, ReconcileRequest,
};

use super::{DomainError, Service};

/// Local client wrapping the service.
pub struct GrantReconcilerLocalClient {
    svc: Arc<Service>,
}

impl GrantReconcilerLocalClient {
    #[must_use]
    pub fn new(svc: Arc<Service>) -> Self {
        Self { svc }
    }
}

/// Terminal errors come from bad input, not from the database, and are logged one level lower.
fn log_and_convert(op: &str, e: DomainError) -> GrantError {
    if e.is_terminal() {
        tracing::warn!(operation = op, error = ?e, "grant_reconciler call rejected");
    } else {
        tracing::error!(operation = op, error = ?e, "grant_reconciler call failed");
    }
    e.into()
}

#[async_trait]
impl GrantReconcilerClient for GrantReconcilerLocalClient {
    async fn plan(&self, request: ReconcileRequest) -> Result<ReconcilePlan, GrantError> {
        self.svc
            .plan(&request)
            .await
            .map_err(|e| log_and_convert("plan", e))
    }

    async fn reconcile(&self, request: ReconcileRequest) -> Result<ReconcileOutcome, GrantError> {
        self.svc
            .reconcile(&request)
            .await
            .map_err(|e| log_and_convert("reconcile", e))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use grant_reconciler_sdk::{GrantExecutor, GrantObserver, GrantSet};
    use tracing_test::traced_test;

    use super::*;
    use crate::config::GrantReconcilerConfig;

    struct Unreachable;

    #[async_trait]
    impl GrantObserver for Unreachable {
        async fn observe(&self, _grantee: &str) -> Result<GrantSet, GrantError> {
            Err(GrantError::Observation("connection refused".to_owned()))
        }
    }

    struct Empty;

    #[async_trait]
    impl GrantObserver for Empty {
        async fn observe(&self, _grantee: &str) -> Result<GrantSet, GrantError> {
            Ok(GrantSet::default())
        }
    }

    #[async_trait]
    impl GrantExecutor for Empty {
        async fn execute(&self, _statement: &str) -> Result<(), GrantError> {
            Ok(())
        }
    }

    fn client(observer: Arc<dyn GrantObserver>) -> GrantReconcilerLocalClient {
        let svc = Service::new(observer, Arc::new(Empty), GrantReconcilerConfig::default());
        GrantReconcilerLocalClient::new(Arc::new(svc))
    }

    fn request(privileges: &[&str]) -> ReconcileRequest {
        ReconcileRequest {
            grantee: "U".to_owned(),
            desired: GrantSet::new(privileges.iter().map(|s| (*s).to_owned()).collect(), vec![]),
            ..ReconcileRequest::default()
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn terminal_error_is_logged_as_rejection() {
        let err = client(Arc::new(Empty))
            .plan(request(&["SELECT ON"]))
            .await
            .unwrap_err();

        assert_eq!(err, GrantError::UnknownPrivilege("SELECT ON".to_owned()));
        assert!(logs_contain("grant_reconciler call rejected"));
        assert!(!logs_contain("grant_reconciler call failed"));
    }

    #[tokio::test]
    #[traced_test]
    async fn transient_error_is_logged_as_failure() {
        let err = client(Arc::new(Unreachable))
            .reconcile(request(&["SELECT"]))
            .await
            .unwrap_err();

        assert_eq!(err, GrantError::Observation("connection refused".to_owned()));
        assert!(logs_contain("grant_reconciler call failed"));
        assert!(!logs_contain("grant_reconciler call rejected"));
    }
}
