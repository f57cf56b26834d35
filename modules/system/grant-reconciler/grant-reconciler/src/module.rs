//! Grant reconciler module.

use std::sync::{Arc, OnceLock};

use grant_reconciler_sdk::{GrantExecutor, GrantObserver, GrantReconcilerClient};
use tracing::info;

use crate::config::GrantReconcilerConfig;
use crate::domain::{GrantReconcilerLocalClient, Service};

/// Grant reconciler module.
///
/// Owns the single [`Service`] instance and hands out clients for it. The
/// observer and executor are supplied by the host, which owns the database
/// connection.
#[derive(Default)]
pub struct GrantReconciler {
    service: OnceLock<Arc<Service>>,
}

impl GrantReconciler {
    pub const MODULE_NAME: &str = "grant-reconciler";

    /// Build the service and return a client for it.
    ///
    /// # Errors
    ///
    /// Returns an error if the module was already initialized.
    #[tracing::instrument(skip_all, fields(policy = %cfg.policy))]
    pub fn init(
        &self,
        cfg: GrantReconcilerConfig,
        observer: Arc<dyn GrantObserver>,
        executor: Arc<dyn GrantExecutor>,
    ) -> anyhow::Result<Arc<dyn GrantReconcilerClient>> {
        info!(
            default_schema = cfg.default_schema.as_deref().unwrap_or("<grantee>"),
            "Initializing {} module",
            Self::MODULE_NAME
        );

        let svc = Arc::new(Service::new(observer, executor, cfg));
        self.service
            .set(svc.clone())
            .map_err(|_| anyhow::anyhow!("{} module already initialized", Self::MODULE_NAME))?;

        let api: Arc<dyn GrantReconcilerClient> = Arc::new(GrantReconcilerLocalClient::new(svc));

        info!("{} module initialized successfully", Self::MODULE_NAME);
        Ok(api)
    }

    /// The service, once [`GrantReconciler::init`] has run.
    #[must_use]
    pub fn service(&self) -> Option<Arc<Service>> {
        self.service.get().cloned()
    }
}
