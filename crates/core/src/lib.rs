pub mod errors;
pub mod models;
pub mod normalize;
pub mod providers;
pub mod services;
pub mod storage;

use std::sync::Arc;

use log::{info, warn};
use models::{
    chart::{ChartLayout, PlottedChart},
    customer::{CustomerIdentity, CustomerProfile},
    dashboard::Dashboard,
    document::{Document, DocumentCategory},
    investment::PolicyBundle,
    policy::{Policy, PolicyCategory},
    session::Session,
    settings::BackendSettings,
};
use providers::registry::BackendRegistry;
use services::{
    bundle_service::BundleService,
    chart_service::ChartService,
    document_service::DocumentService,
    metrics_service::MetricsService,
    policy_service::{PolicyService, PolicyTotals},
    session_service::{Clock, SessionStore, SystemClock},
};
use storage::kv::KeyValueStore;

use errors::CoreError;

/// Main entry point for the policy portal core library.
/// Holds the backends, the session store and all services operating on
/// fetched data.
#[must_use]
pub struct PolicyPortal {
    settings: BackendSettings,
    registry: BackendRegistry,
    sessions: SessionStore,
    clock: Arc<dyn Clock>,
    bundle_service: BundleService,
    metrics_service: MetricsService,
    chart_service: ChartService,
    policy_service: PolicyService,
    document_service: DocumentService,
}

impl std::fmt::Debug for PolicyPortal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyPortal")
            .field("settings", &self.settings)
            .field("backends", &self.registry.backend_names())
            .finish()
    }
}

impl PolicyPortal {
    /// Create a portal with the default backends for `settings`, storing the
    /// session in `store` sealed with `device_secret`.
    pub fn new(
        settings: BackendSettings,
        store: Arc<dyn KeyValueStore>,
        device_secret: &str,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        let registry = BackendRegistry::new_with_defaults(&settings);
        let sessions = SessionStore::new(store, device_secret);
        Ok(Self::with_parts(settings, registry, sessions, Arc::new(SystemClock)))
    }

    /// Assemble a portal from explicit parts (custom backends, a fixed clock).
    pub fn with_parts(
        settings: BackendSettings,
        registry: BackendRegistry,
        sessions: SessionStore,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            registry,
            sessions,
            clock,
            bundle_service: BundleService::new(),
            metrics_service: MetricsService::new(),
            chart_service: ChartService::new(),
            policy_service: PolicyService::new(),
            document_service: DocumentService::new(),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    // ── Session ─────────────────────────────────────────────────────

    /// Store the session handed over by the sign-in flow.
    pub fn sign_in(&self, session: Session) -> Result<(), CoreError> {
        let identity = CustomerIdentity::parse(&session.email)?;
        if session.is_expired(self.clock.now()) {
            return Err(CoreError::ValidationError(format!(
                "Session for {identity} already expired at {}",
                session.expires_at
            )));
        }
        self.sessions.save(&Session {
            email: identity.email().to_string(),
            ..session
        })?;
        info!("Signed in as {identity}");
        Ok(())
    }

    pub fn sign_out(&self) -> Result<(), CoreError> {
        self.sessions.clear()
    }

    /// The stored, unexpired session.
    pub fn current_session(&self) -> Result<Session, CoreError> {
        self.sessions
            .load(self.clock.now())?
            .ok_or(CoreError::NotAuthenticated)
    }

    // ── Dashboard ───────────────────────────────────────────────────

    /// Fetch and normalize the signed-in customer's bundle.
    pub async fn fetch_policy_bundle(&self) -> Result<PolicyBundle, CoreError> {
        let session = self.current_session()?;
        let identity = CustomerIdentity::parse(&session.email)?;
        let raw = self
            .signed_out_on_auth_failure(self.registry.fetch_policy_bundle(&identity, &session).await)?;
        Ok(self.bundle_service.normalize(&raw))
    }

    /// Fetch the bundle and derive KPIs, chart series and value range.
    pub async fn load_dashboard(&self) -> Result<Dashboard, CoreError> {
        let bundle = self.fetch_policy_bundle().await?;
        Ok(self.dashboard_for(bundle))
    }

    /// Derive the dashboard for an already-normalized bundle.
    pub fn dashboard_for(&self, bundle: PolicyBundle) -> Dashboard {
        let now = self.clock.now();
        let metrics = self.metrics_service.resolve(&bundle, now);
        let chart = self.chart_service.build_chart_series(&bundle, &metrics, now);
        let value_range = self.chart_service.value_range(&chart);
        Dashboard {
            bundle,
            metrics,
            chart,
            value_range,
        }
    }

    /// Lay out the dashboard chart; `None` when there is nothing to draw.
    #[must_use]
    pub fn plot_dashboard(&self, dashboard: &Dashboard, layout: &ChartLayout) -> Option<PlottedChart> {
        self.chart_service.plot(&dashboard.chart, layout)
    }

    // ── Policies & documents ────────────────────────────────────────

    /// The customer's policies matching `query`, optionally in one category.
    pub async fn policies(
        &self,
        query: &str,
        category: Option<PolicyCategory>,
    ) -> Result<Vec<Policy>, CoreError> {
        let session = self.current_session()?;
        let rows = self.signed_out_on_auth_failure(self.registry.fetch_policies(&session).await)?;
        let policies = self.policy_service.map_rows(&rows);
        Ok(self
            .policy_service
            .filter(&policies, query, category)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Totals over a policy list (as shown above the list).
    #[must_use]
    pub fn policy_totals(&self, policies: &[Policy]) -> PolicyTotals {
        self.policy_service.totals(policies)
    }

    pub async fn policy(&self, policy_id: &str) -> Result<Policy, CoreError> {
        let session = self.current_session()?;
        let row = self
            .signed_out_on_auth_failure(self.registry.fetch_policy(&session, policy_id).await)?;
        let policy = Policy::from_row(&row);
        if policy.id.is_empty() {
            return Err(CoreError::NotFound(format!("policy {policy_id}")));
        }
        Ok(policy)
    }

    pub async fn documents(
        &self,
        query: &str,
        category: Option<DocumentCategory>,
    ) -> Result<Vec<Document>, CoreError> {
        let session = self.current_session()?;
        let rows = self.signed_out_on_auth_failure(self.registry.fetch_documents(&session).await)?;
        let documents = self.document_service.map_rows(&rows);
        Ok(self
            .document_service
            .filter(&documents, query, category)
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn profile(&self) -> Result<CustomerProfile, CoreError> {
        let session = self.current_session()?;
        let row = self.signed_out_on_auth_failure(self.registry.fetch_profile(&session).await)?;
        Ok(CustomerProfile::from_row(&row))
    }

    // ── Internal ────────────────────────────────────────────────────

    /// A rejected token logs the customer out.
    fn signed_out_on_auth_failure<T>(&self, result: Result<T, CoreError>) -> Result<T, CoreError> {
        if let Err(e @ CoreError::Unauthorized { .. }) = &result {
            warn!("{e}; clearing stored session");
            if let Err(clear_err) = self.sessions.clear() {
                warn!("Failed to clear session: {clear_err}");
            }
        }
        result
    }
}
