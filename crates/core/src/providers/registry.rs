use std::future::Future;

use log::warn;

use crate::errors::CoreError;
use crate::models::customer::CustomerIdentity;
use crate::models::raw::{RawPolicyBundle, RawRow};
use crate::models::session::Session;
use crate::models::settings::BackendSettings;

use super::functions::FunctionsBackend;
use super::postgrest::PostgrestBackend;
use super::traits::{BackendCapability, PortalBackend};

/// Registry of the configured backend generations.
///
/// Routes each request to the backends that declare the capability, in
/// registration order. If one fails, the next is tried; an authorization
/// failure ends the search because another backend would reject the same
/// token.
pub struct BackendRegistry {
    backends: Vec<Box<dyn PortalBackend>>,
}

impl BackendRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            backends: Vec::new(),
        }
    }

    /// Create a registry with the backends the settings describe.
    pub fn new_with_defaults(settings: &BackendSettings) -> Self {
        let mut registry = Self::new();

        // PostgREST: current generation, only when configured
        if let (Some(url), Some(key)) = (&settings.supabase_url, &settings.supabase_anon_key) {
            registry.register(Box::new(PostgrestBackend::new(
                url.clone(),
                key.clone(),
                settings.request_timeout_secs,
            )));
        }

        // REST functions: always present, public default URL
        registry.register(Box::new(FunctionsBackend::new(
            settings.functions_url.clone(),
            settings.request_timeout_secs,
        )));

        registry
    }

    /// Register a new backend.
    pub fn register(&mut self, backend: Box<dyn PortalBackend>) {
        self.backends.push(backend);
    }

    /// Return ALL backends that support the capability, ordered by registration priority.
    pub fn backends_for(&self, capability: BackendCapability) -> Vec<&dyn PortalBackend> {
        self.backends
            .iter()
            .filter(|b| b.capabilities().contains(&capability))
            .map(|b| b.as_ref())
            .collect()
    }

    pub fn has_backend_for(&self, capability: BackendCapability) -> bool {
        !self.backends_for(capability).is_empty()
    }

    /// Names of all registered backends, in priority order.
    pub fn backend_names(&self) -> Vec<String> {
        self.backends.iter().map(|b| b.name().to_string()).collect()
    }

    pub async fn fetch_policy_bundle(
        &self,
        identity: &CustomerIdentity,
        session: &Session,
    ) -> Result<RawPolicyBundle, CoreError> {
        self.with_fallback(BackendCapability::PolicyBundle, |b| {
            b.fetch_policy_bundle(identity, session)
        })
        .await
    }

    pub async fn fetch_policies(&self, session: &Session) -> Result<Vec<RawRow>, CoreError> {
        self.with_fallback(BackendCapability::Policies, |b| b.fetch_policies(session))
            .await
    }

    pub async fn fetch_policy(&self, session: &Session, policy_id: &str) -> Result<RawRow, CoreError> {
        self.with_fallback(BackendCapability::Policies, |b| {
            b.fetch_policy(session, policy_id)
        })
        .await
    }

    pub async fn fetch_documents(&self, session: &Session) -> Result<Vec<RawRow>, CoreError> {
        self.with_fallback(BackendCapability::Documents, |b| b.fetch_documents(session))
            .await
    }

    pub async fn fetch_profile(&self, session: &Session) -> Result<RawRow, CoreError> {
        self.with_fallback(BackendCapability::Profile, |b| b.fetch_profile(session))
            .await
    }

    async fn with_fallback<'a, T, F, Fut>(
        &'a self,
        capability: BackendCapability,
        op: F,
    ) -> Result<T, CoreError>
    where
        F: Fn(&'a dyn PortalBackend) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let backends = self.backends_for(capability);
        if backends.is_empty() {
            return Err(CoreError::NoBackend(capability.to_string()));
        }

        let mut last_error = None;
        for backend in backends {
            match op(backend).await {
                Ok(value) => return Ok(value),
                Err(e @ CoreError::Unauthorized { .. }) => return Err(e),
                Err(e) => {
                    warn!("{} failed for {capability}: {e}", backend.name());
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CoreError::NoBackend(capability.to_string())))
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
