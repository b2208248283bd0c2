use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

pub const DEFAULT_FUNCTIONS_URL: &str = "https://rosenfeld-consulting.base44.dev/functions";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
pub const ENV_SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";
pub const ENV_FUNCTIONS_URL: &str = "BASE44_API_URL";
pub const ENV_REQUEST_TIMEOUT: &str = "PORTAL_REQUEST_TIMEOUT_SECS";

/// Where the two backend generations live and how to reach them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL of the Postgres/PostgREST project (e.g., "https://xyz.supabase.co").
    /// The PostgREST backend is only registered when this and the anon key are set.
    #[serde(default)]
    pub supabase_url: Option<String>,

    /// Public anon key sent as `apikey` header to PostgREST
    #[serde(default)]
    pub supabase_anon_key: Option<String>,

    /// Base URL of the REST function backend
    #[serde(default = "default_functions_url")]
    pub functions_url: String,

    /// Per-request timeout (native targets only)
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            supabase_url: None,
            supabase_anon_key: None,
            functions_url: default_functions_url(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl BackendSettings {
    /// Read settings from the process environment, falling back to defaults.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (environment, app config, tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let request_timeout_secs = match non_blank(ENV_REQUEST_TIMEOUT) {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                CoreError::Config(format!("{ENV_REQUEST_TIMEOUT} must be a whole number of seconds, got '{raw}'"))
            })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let settings = Self {
            supabase_url: non_blank(ENV_SUPABASE_URL),
            supabase_anon_key: non_blank(ENV_SUPABASE_ANON_KEY),
            functions_url: non_blank(ENV_FUNCTIONS_URL).unwrap_or_else(default_functions_url),
            request_timeout_secs,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a JSON document; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| CoreError::Config(format!("Invalid settings JSON: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check URLs and timeout for obvious mistakes.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(url) = &self.supabase_url {
            check_url(ENV_SUPABASE_URL, url)?;
        }
        match (&self.supabase_url, &self.supabase_anon_key) {
            (Some(_), None) => {
                return Err(CoreError::Config(format!(
                    "{ENV_SUPABASE_URL} is set but {ENV_SUPABASE_ANON_KEY} is missing"
                )))
            }
            (None, Some(_)) => {
                return Err(CoreError::Config(format!(
                    "{ENV_SUPABASE_ANON_KEY} is set but {ENV_SUPABASE_URL} is missing"
                )))
            }
            _ => {}
        }
        check_url(ENV_FUNCTIONS_URL, &self.functions_url)?;
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config("Request timeout must be at least 1 second".into()));
        }
        Ok(())
    }

    /// `true` when the PostgREST generation can be used.
    #[must_use]
    pub fn has_postgrest(&self) -> bool {
        self.supabase_url.is_some() && self.supabase_anon_key.is_some()
    }
}

fn check_url(name: &str, url: &str) -> Result<(), CoreError> {
    if url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        Err(CoreError::Config(format!("{name} must be an http(s) URL, got '{url}'")))
    }
}

fn default_functions_url() -> String {
    DEFAULT_FUNCTIONS_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
