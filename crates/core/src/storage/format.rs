use crate::errors::CoreError;

use super::encryption::{KdfParams, NONCE_LEN, SALT_LEN};

/// Magic bytes of a sealed session envelope ("Policy Portal Session Vault").
pub const MAGIC: &[u8; 4] = b"PPSV";

/// Current envelope version.
pub const CURRENT_VERSION: u16 = 1;

/// magic(4) + version(2) + kdf(12) + salt(16) + nonce(12) + ciphertext_len(4)
pub const HEADER_SIZE: usize = 50;

/// Upper bound for a sealed session; anything larger is not ours.
pub const MAX_CIPHERTEXT_LEN: u32 = 64 * 1024;

/// A sealed payload with everything needed to reopen it except the secret.
///
/// Layout, all integers little-endian:
/// ```text
/// [PPSV: 4B] [version: 2B] [memory_cost: 4B] [time_cost: 4B] [parallelism: 4B]
/// [salt: 16B] [nonce: 12B] [ciphertext_len: 4B] [ciphertext]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub version: u16,
    pub kdf_params: KdfParams,
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE + self.ciphertext.len());
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(&self.kdf_params.memory_cost.to_le_bytes());
        buf.extend_from_slice(&self.kdf_params.time_cost.to_le_bytes());
        buf.extend_from_slice(&self.kdf_params.parallelism.to_le_bytes());
        buf.extend_from_slice(&self.salt);
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&(self.ciphertext.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.ciphertext);
        buf
    }

    /// Parse and sanity-check an envelope. KDF parameters are bounded so a
    /// crafted file cannot make key derivation exhaust the device.
    pub fn decode(data: &[u8]) -> Result<Self, CoreError> {
        if data.len() < HEADER_SIZE {
            return Err(CoreError::InvalidFileFormat(
                "Too small to be a sealed session".into(),
            ));
        }
        let mut reader = Reader { data, offset: 0 };

        if reader.take::<4>()? != *MAGIC {
            return Err(CoreError::InvalidFileFormat(
                "Invalid magic bytes — not a sealed session".into(),
            ));
        }

        let version = u16::from_le_bytes(reader.take()?);
        if version == 0 || version > CURRENT_VERSION {
            return Err(CoreError::UnsupportedVersion(version));
        }

        let kdf_params = KdfParams {
            memory_cost: u32::from_le_bytes(reader.take()?),
            time_cost: u32::from_le_bytes(reader.take()?),
            parallelism: u32::from_le_bytes(reader.take()?),
        };
        check_range("memory_cost", kdf_params.memory_cost, 8, 1_048_576)?;
        check_range("time_cost", kdf_params.time_cost, 1, 20)?;
        check_range("parallelism", kdf_params.parallelism, 1, 16)?;

        let salt = reader.take::<SALT_LEN>()?;
        let nonce = reader.take::<NONCE_LEN>()?;

        let len = u32::from_le_bytes(reader.take()?);
        if len > MAX_CIPHERTEXT_LEN {
            return Err(CoreError::InvalidFileFormat(format!(
                "Ciphertext length {len} exceeds {MAX_CIPHERTEXT_LEN} bytes"
            )));
        }
        let remaining = data.len() - reader.offset;
        if remaining < len as usize {
            return Err(CoreError::InvalidFileFormat(format!(
                "Truncated: expected {len} bytes of ciphertext, got {remaining}"
            )));
        }
        let ciphertext = data[reader.offset..reader.offset + len as usize].to_vec();

        Ok(Self {
            version,
            kdf_params,
            salt,
            nonce,
            ciphertext,
        })
    }
}

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], CoreError> {
        let bytes: [u8; N] = self
            .data
            .get(self.offset..self.offset + N)
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| CoreError::InvalidFileFormat("Unexpected end of header".into()))?;
        self.offset += N;
        Ok(bytes)
    }
}

fn check_range(name: &str, value: u32, min: u32, max: u32) -> Result<(), CoreError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::InvalidFileFormat(format!(
            "KDF {name} out of safe range: {value} (expected {min}..{max})"
        )))
    }
}
