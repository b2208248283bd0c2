use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;

/// Build an HTTP client with the configured timeout (ignored on WASM,
/// where the browser owns timeouts).
pub(crate) fn build_client(timeout_secs: u64) -> Client {
    let builder = Client::builder();
    #[cfg(not(target_arch = "wasm32"))]
    let builder = builder.timeout(Duration::from_secs(timeout_secs));
    #[cfg(target_arch = "wasm32")]
    let _ = timeout_secs;
    builder.build().unwrap_or_else(|_| Client::new())
}

/// Check the status and decode the JSON body.
///
/// 401/403 become `Unauthorized`; any other failure status becomes `Api`
/// carrying the backend's `error`/`message` field when it sent one.
pub(crate) async fn read_json(backend: &str, response: Response) -> Result<Value, CoreError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(CoreError::Unauthorized {
            backend: backend.to_string(),
            status: status.as_u16(),
        });
    }

    if !status.is_success() {
        let body: Value = response.json().await.unwrap_or(Value::Null);
        return Err(CoreError::Api {
            backend: backend.to_string(),
            message: error_message(&body).unwrap_or_else(|| format!("HTTP {status}")),
        });
    }

    // An empty body is a valid "nothing" answer.
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| CoreError::Api {
        backend: backend.to_string(),
        message: format!("Failed to parse response: {e}"),
    })
}

/// Extract the human-readable message from an error body
/// (`{"error": ".."}` or PostgREST's `{"message": ".."}`).
pub fn error_message(body: &Value) -> Option<String> {
    ["error", "message"].iter().find_map(|key| {
        body.get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}
