use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Url};
use serde_json::Value;

use crate::errors::CoreError;
use crate::models::customer::CustomerIdentity;
use crate::models::raw::{rows_from_value, RawPolicyBundle, RawRow};
use crate::models::session::Session;

use super::http::{build_client, read_json};
use super::traits::{BackendCapability, PortalBackend};

const NAME: &str = "PostgREST";

/// The Postgres generation: three tables keyed by the customer's e-mail,
/// read through the PostgREST API.
///
/// - `investments`: at most one row per customer
/// - `investment_etfs`: fund allocations, heaviest first
/// - `portfolio_snapshots`: recorded values, oldest first
pub struct PostgrestBackend {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl PostgrestBackend {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: build_client(timeout_secs),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    pub fn investments_url(&self, identity: &CustomerIdentity) -> Result<Url, CoreError> {
        self.table_url(
            "investments",
            &[
                ("select", "*".to_string()),
                ("kunde_email", eq(identity)),
                ("limit", "1".to_string()),
            ],
        )
    }

    pub fn etfs_url(&self, identity: &CustomerIdentity) -> Result<Url, CoreError> {
        self.table_url(
            "investment_etfs",
            &[
                ("select", "isin,name,prozent".to_string()),
                ("kunde_email", eq(identity)),
                ("order", "prozent.desc".to_string()),
            ],
        )
    }

    pub fn snapshots_url(&self, identity: &CustomerIdentity) -> Result<Url, CoreError> {
        self.table_url(
            "portfolio_snapshots",
            &[
                (
                    "select",
                    "datum,portfolio_wert,eingezahlt_bis_dahin,rendite_prozent".to_string(),
                ),
                ("kunde_email", eq(identity)),
                ("order", "datum.asc".to_string()),
            ],
        )
    }

    fn table_url(&self, table: &str, params: &[(&str, String)]) -> Result<Url, CoreError> {
        let base = format!("{}/rest/v1/{table}", self.base_url);
        Url::parse_with_params(&base, params)
            .map_err(|e| CoreError::Config(format!("Invalid PostgREST URL '{base}': {e}")))
    }

    async fn get_rows(&self, url: Url, session: &Session) -> Result<Vec<RawRow>, CoreError> {
        debug!("{NAME}: GET {}", url.path());
        let response = self
            .client
            .get(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .header("Accept", "application/json")
            .send()
            .await?;
        let body: Value = read_json(NAME, response).await?;
        Ok(rows_from_value(body))
    }
}

fn eq(identity: &CustomerIdentity) -> String {
    format!("eq.{}", identity.email())
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl PortalBackend for PostgrestBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn capabilities(&self) -> Vec<BackendCapability> {
        vec![BackendCapability::PolicyBundle]
    }

    async fn fetch_policy_bundle(
        &self,
        identity: &CustomerIdentity,
        session: &Session,
    ) -> Result<RawPolicyBundle, CoreError> {
        let investment = self
            .get_rows(self.investments_url(identity)?, session)
            .await?
            .into_iter()
            .next();
        let etfs = self.get_rows(self.etfs_url(identity)?, session).await?;
        let snapshots = self.get_rows(self.snapshots_url(identity)?, session).await?;

        debug!(
            "{NAME}: bundle has investment={} etfs={} snapshots={}",
            investment.is_some(),
            etfs.len(),
            snapshots.len()
        );

        Ok(RawPolicyBundle {
            email: identity.email().to_string(),
            investment,
            etfs,
            snapshots,
        })
    }
}
