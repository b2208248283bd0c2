use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated session as handed over by the sign-in flow.
///
/// The core treats the tokens as opaque strings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// E-mail of the signed-in customer (normalized on use)
    pub email: String,

    /// Bearer token for backend requests
    pub access_token: String,

    /// Token to obtain a new access token, if the auth provider issued one
    pub refresh_token: Option<String>,

    /// When the access token stops being accepted
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        email: impl Into<String>,
        access_token: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            email: email.into(),
            access_token: access_token.into(),
            refresh_token: None,
            expires_at,
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("email", &self.email)
            .field("access_token", &"<redacted>")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
