use crate::errors::CoreError;
use crate::models::session::Session;

use super::encryption::{self, KdfParams, SALT_LEN};
use super::format::{Envelope, CURRENT_VERSION};

/// Seals sessions for storage at rest and opens them again.
///
/// Flow: Session → bincode → AES-256-GCM(Argon2id(device secret)) → envelope bytes
pub struct SessionVault {
    kdf_params: KdfParams,
}

impl SessionVault {
    pub fn new() -> Self {
        Self::with_params(KdfParams::default())
    }

    /// Use custom KDF costs (cheap ones in tests, stronger ones on desktop).
    pub fn with_params(kdf_params: KdfParams) -> Self {
        Self { kdf_params }
    }

    pub fn seal(&self, session: &Session, secret: &str) -> Result<Vec<u8>, CoreError> {
        let plaintext = bincode::serialize(session)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize session: {e}")))?;

        let salt = encryption::random_bytes::<SALT_LEN>()?;
        let key = encryption::derive_key(secret, &salt, &self.kdf_params)?;
        let (nonce, ciphertext) = encryption::seal(&plaintext, &key)?;

        Ok(Envelope {
            version: CURRENT_VERSION,
            kdf_params: self.kdf_params,
            salt,
            nonce,
            ciphertext,
        }
        .encode())
    }

    pub fn open(&self, data: &[u8], secret: &str) -> Result<Session, CoreError> {
        let envelope = Envelope::decode(data)?;
        // The stored params win: they are what the session was sealed with.
        let key = encryption::derive_key(secret, &envelope.salt, &envelope.kdf_params)?;
        let plaintext = encryption::open(&envelope.ciphertext, &key, &envelope.nonce)?;

        bincode::deserialize(&plaintext)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize session: {e}")))
    }
}

impl Default for SessionVault {
    fn default() -> Self {
        Self::new()
    }
}
