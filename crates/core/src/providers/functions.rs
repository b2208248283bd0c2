use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

use crate::errors::CoreError;
use crate::models::raw::{rows_from_value, RawRow};
use crate::models::session::Session;

use super::http::{build_client, read_json};
use super::traits::{BackendCapability, PortalBackend};

const NAME: &str = "Functions";

pub const GET_USER: &str = "api_getUser";
pub const GET_USER_POLICIES: &str = "api_getUserPolicies";
pub const GET_POLICY: &str = "api_getPolicy";
pub const GET_USER_DOCUMENTS: &str = "api_getUserDocuments";

/// The REST function generation: one authenticated POST per call,
/// JSON in and out, errors as `{"error": "..."}`.
pub struct FunctionsBackend {
    client: Client,
    base_url: String,
}

impl FunctionsBackend {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            client: build_client(timeout_secs),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Full URL of a named function.
    #[must_use]
    pub fn function_url(&self, function: &str) -> String {
        format!("{}/{function}", self.base_url)
    }

    async fn call(&self, function: &str, session: &Session, body: Value) -> Result<Value, CoreError> {
        debug!("{NAME}: POST {function}");
        let response = self
            .client
            .post(self.function_url(function))
            .bearer_auth(&session.access_token)
            .json(&body)
            .send()
            .await?;
        read_json(NAME, response).await
    }
}

fn single_row(value: Value, what: &str) -> Result<RawRow, CoreError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(CoreError::NotFound(what.to_string())),
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl PortalBackend for FunctionsBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn capabilities(&self) -> Vec<BackendCapability> {
        vec![
            BackendCapability::Policies,
            BackendCapability::Documents,
            BackendCapability::Profile,
        ]
    }

    async fn fetch_policies(&self, session: &Session) -> Result<Vec<RawRow>, CoreError> {
        let body = self.call(GET_USER_POLICIES, session, json!({})).await?;
        let rows = rows_from_value(body);
        debug!("{NAME}: {} policies", rows.len());
        Ok(rows)
    }

    async fn fetch_policy(&self, session: &Session, policy_id: &str) -> Result<RawRow, CoreError> {
        let body = self
            .call(GET_POLICY, session, json!({ "policy_id": policy_id }))
            .await?;
        single_row(body, &format!("policy {policy_id}"))
    }

    async fn fetch_documents(&self, session: &Session) -> Result<Vec<RawRow>, CoreError> {
        let body = self.call(GET_USER_DOCUMENTS, session, json!({})).await?;
        Ok(rows_from_value(body))
    }

    async fn fetch_profile(&self, session: &Session) -> Result<RawRow, CoreError> {
        let body = self.call(GET_USER, session, json!({})).await?;
        single_row(body, "user profile")
    }
}
