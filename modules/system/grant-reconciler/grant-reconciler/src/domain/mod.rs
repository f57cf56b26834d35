//! Domain layer for the grant reconciler.

pub mod diff;
pub mod error;
pub mod grammar;
pub mod group;
pub mod local_client;
pub mod planner;
pub mod policy;
pub mod service;

pub use error::DomainError;
pub use local_client::GrantReconcilerLocalClient;
pub use service::Service;
