use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::errors::CoreError;
use crate::models::session::Session;
use crate::storage::kv::KeyValueStore;
use crate::storage::manager::SessionVault;

/// Storage key the sealed session is written under.
pub const SESSION_KEY: &str = "portal_session";

/// Source of "now". Every time-dependent computation takes its instant from
/// here so tests can pin it.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that always answers the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Persists the signed-in session, encrypted, in a key/value store.
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    vault: SessionVault,
    device_secret: String,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>, device_secret: impl Into<String>) -> Self {
        Self::with_vault(store, device_secret, SessionVault::new())
    }

    pub fn with_vault(
        store: Arc<dyn KeyValueStore>,
        device_secret: impl Into<String>,
        vault: SessionVault,
    ) -> Self {
        Self {
            store,
            vault,
            device_secret: device_secret.into(),
        }
    }

    pub fn save(&self, session: &Session) -> Result<(), CoreError> {
        let sealed = self.vault.seal(session, &self.device_secret)?;
        self.store.set(SESSION_KEY, &sealed)?;
        info!("Session stored for {}", session.email);
        Ok(())
    }

    /// Load the stored session if there is a valid one.
    ///
    /// An expired session is removed and reported as absent. A session that
    /// cannot be opened (wrong secret, corrupted bytes, unknown version) is
    /// an error and stays in place.
    pub fn load(&self, now: DateTime<Utc>) -> Result<Option<Session>, CoreError> {
        let Some(bytes) = self.store.get(SESSION_KEY)? else {
            return Ok(None);
        };
        let session = self.vault.open(&bytes, &self.device_secret)?;
        if session.is_expired(now) {
            warn!("Stored session for {} expired at {}", session.email, session.expires_at);
            self.store.remove(SESSION_KEY)?;
            return Ok(None);
        }
        Ok(Some(session))
    }

    pub fn clear(&self) -> Result<(), CoreError> {
        self.store.remove(SESSION_KEY)?;
        info!("Session cleared");
        Ok(())
    }
}
