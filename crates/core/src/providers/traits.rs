use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::customer::CustomerIdentity;
use crate::models::raw::{RawPolicyBundle, RawRow};
use crate::models::session::Session;

/// What a backend generation can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendCapability {
    /// Investment record, ETF allocations and snapshots for the dashboard
    PolicyBundle,
    /// Policy list and single policy detail
    Policies,
    Documents,
    Profile,
}

impl std::fmt::Display for BackendCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendCapability::PolicyBundle => write!(f, "policy bundle"),
            BackendCapability::Policies => write!(f, "policies"),
            BackendCapability::Documents => write!(f, "documents"),
            BackendCapability::Profile => write!(f, "profile"),
        }
    }
}

/// A backend generation the portal can read customer data from.
///
/// Implementations are thin adapters: they fetch and return raw rows and
/// leave all interpretation to the normalizer. Operations outside
/// `capabilities()` answer `CoreError::NoBackend`.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait PortalBackend: Send + Sync {
    /// Human-readable name of this backend (for logs/errors).
    fn name(&self) -> &str;

    fn capabilities(&self) -> Vec<BackendCapability>;

    async fn fetch_policy_bundle(
        &self,
        _identity: &CustomerIdentity,
        _session: &Session,
    ) -> Result<RawPolicyBundle, CoreError> {
        Err(CoreError::NoBackend(BackendCapability::PolicyBundle.to_string()))
    }

    async fn fetch_policies(&self, _session: &Session) -> Result<Vec<RawRow>, CoreError> {
        Err(CoreError::NoBackend(BackendCapability::Policies.to_string()))
    }

    async fn fetch_policy(&self, _session: &Session, _policy_id: &str) -> Result<RawRow, CoreError> {
        Err(CoreError::NoBackend(BackendCapability::Policies.to_string()))
    }

    async fn fetch_documents(&self, _session: &Session) -> Result<Vec<RawRow>, CoreError> {
        Err(CoreError::NoBackend(BackendCapability::Documents.to_string()))
    }

    async fn fetch_profile(&self, _session: &Session) -> Result<RawRow, CoreError> {
        Err(CoreError::NoBackend(BackendCapability::Profile.to_string()))
    }
}
