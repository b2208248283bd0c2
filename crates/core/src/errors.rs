use thiserror::Error;

/// Unified error type for the policy-portal-core library.
///
/// The normalization, metric and chart layers never produce errors; they
/// degrade to defaults. Everything that talks to a backend, the session
/// store or the configuration returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Sealed session envelope ─────────────────────────────────────
    #[error("Invalid session envelope: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported envelope version: {0}")]
    UnsupportedVersion(u16),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed — wrong device secret or corrupted session")]
    Decryption,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Key/value store I/O ─────────────────────────────────────────
    #[error("Store I/O error: {0}")]
    FileIO(String),

    // ── Backend / Network ───────────────────────────────────────────
    #[error("API error ({backend}): {message}")]
    Api {
        backend: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized ({backend}): HTTP {status}")]
    Unauthorized {
        backend: String,
        status: u16,
    },

    #[error("No backend available for: {0}")]
    NoBackend(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // ── Session ─────────────────────────────────────────────────────
    #[error("Not authenticated — please sign in again")]
    NotAuthenticated,

    #[error("Session has no e-mail address — please sign in again")]
    MissingEmail,

    // ── Configuration / Validation ──────────────────────────────────
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl CoreError {
    /// `true` for errors that mean the stored session is no longer usable.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            CoreError::Unauthorized { .. } | CoreError::NotAuthenticated | CoreError::MissingEmail
        )
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<bincode::Error> for CoreError {
    fn from(e: bincode::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // PostgREST filters carry the customer's e-mail in the query string.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}

impl From<aes_gcm::Error> for CoreError {
    fn from(_: aes_gcm::Error) -> Self {
        CoreError::Decryption
    }
}
