//! Secret wrapping and lazy decryption.
//!
//! Responsibilities:
//! - Provide AES-256-GCM encryption and decryption for `ENC(...)` values.
//! - Handle key derivation using Argon2id for passphrase key sources.
//! - Replace marker scalars in a tree with deferred-decryption handles.
//!
//! Does NOT handle:
//! - Tree traversal ordering or merging (see `loader` and `merge`).
//! - Serialization-time redaction policy (see `value` and `facade`).
//!
//! Invariants:
//! - Decryption is never eager: a `SecretHandle` decrypts at most once, on
//!   the first `reveal()`, and caches the plaintext until `zeroize()`.
//! - Token layout is hex(salt[16] || nonce[12] || ciphertext+tag).
//! - `Debug` output and default rendering never contain plaintext or key
//!   material.

use std::sync::{Mutex, MutexGuard};

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use argon2::Argon2;
use rand::RngExt;
use secrecy::{ExposeSecret, SecretString};

use crate::constants::{
    ENV_SECRET_KEY, ENV_SECRET_PASSPHRASE, REDACTED_PLACEHOLDER, SECRET_MARKER_PREFIX,
};
use crate::error::ConfigError;
use crate::loader::env_var_or_none;
use crate::value::Value;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// How secret values are rendered during serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretRendering {
    /// Substitute the redaction placeholder (default everywhere).
    Redact,
    /// Decrypt and emit plaintext; fails loudly if decryption is impossible.
    Reveal,
}

/// Sources for the secret decryption key.
#[derive(Clone)]
pub enum SecretKeySource {
    /// Hex-encoded 32-byte key from `STRATA_SECRET_KEY`.
    Env,
    /// Key derived from `STRATA_SECRET_PASSPHRASE` via Argon2id, using the
    /// salt embedded in each token.
    Passphrase,
    /// An explicit key (API and test use).
    Key([u8; 32]),
}

impl SecretKeySource {
    /// Pick a key source from the process environment, preferring the raw
    /// key variable over the passphrase variable.
    pub fn from_env() -> Option<Self> {
        if env_var_or_none(ENV_SECRET_KEY).is_some() {
            Some(SecretKeySource::Env)
        } else if env_var_or_none(ENV_SECRET_PASSPHRASE).is_some() {
            Some(SecretKeySource::Passphrase)
        } else {
            None
        }
    }

    /// Resolve the key source into a 32-byte key.
    pub(crate) fn resolve(&self, salt: &[u8]) -> Result<[u8; 32], ConfigError> {
        match self {
            Self::Env => {
                let value = env_var_or_none(ENV_SECRET_KEY).ok_or(ConfigError::SecretKey {
                    detail: format!("{ENV_SECRET_KEY} is not set"),
                })?;
                let bytes = hex::decode(&value).map_err(|_| ConfigError::SecretKey {
                    detail: format!("{ENV_SECRET_KEY} is not valid hex"),
                })?;
                let key: [u8; 32] = bytes.try_into().map_err(|_| ConfigError::SecretKey {
                    detail: format!("{ENV_SECRET_KEY} must decode to exactly 32 bytes"),
                })?;
                Ok(key)
            }
            Self::Passphrase => {
                let value =
                    env_var_or_none(ENV_SECRET_PASSPHRASE).ok_or(ConfigError::SecretKey {
                        detail: format!("{ENV_SECRET_PASSPHRASE} is not set"),
                    })?;
                let passphrase = SecretString::new(value.into());
                Encryptor::derive_key(&passphrase, salt)
            }
            Self::Key(key) => Ok(*key),
        }
    }
}

impl std::fmt::Debug for SecretKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Env => f.write_str("SecretKeySource::Env"),
            Self::Passphrase => f.write_str("SecretKeySource::Passphrase"),
            Self::Key(_) => f.write_str("SecretKeySource::Key(..)"),
        }
    }
}

/// Core cryptographic logic for AES-256-GCM.
pub struct Encryptor;

impl Encryptor {
    /// Encrypts data using AES-256-GCM.
    /// Returns (ciphertext + tag, nonce).
    pub fn encrypt(data: &[u8], key: &[u8; 32]) -> Result<(Vec<u8>, [u8; NONCE_LEN]), ConfigError> {
        let cipher = Aes256Gcm::new(key.into());
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rng().fill(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, data)
            .map_err(|e| ConfigError::SecretEncrypt {
                detail: e.to_string(),
            })?;

        Ok((ciphertext, nonce_bytes))
    }

    /// Decrypts data using AES-256-GCM. An authentication failure means a
    /// wrong key or tampered ciphertext.
    pub fn decrypt(
        ciphertext: &[u8],
        key: &[u8; 32],
        nonce: &[u8; NONCE_LEN],
    ) -> Result<Vec<u8>, ConfigError> {
        let cipher = Aes256Gcm::new(key.into());
        let nonce = Nonce::from_slice(nonce);

        cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| ConfigError::SecretDecrypt {
                detail: "authentication failed (wrong key or tampered ciphertext)".to_string(),
            })
    }

    /// Derives a 32-byte key from a passphrase and salt using Argon2id.
    pub fn derive_key(passphrase: &SecretString, salt: &[u8]) -> Result<[u8; 32], ConfigError> {
        let argon2 = Argon2::default();
        let mut key = [0u8; 32];
        argon2
            .hash_password_into(passphrase.expose_secret().as_bytes(), salt, &mut key)
            .map_err(|e| ConfigError::SecretKey {
                detail: format!("key derivation failed: {e}"),
            })?;
        Ok(key)
    }

    /// Generates a random 16-byte salt for key derivation.
    pub fn generate_salt() -> [u8; SALT_LEN] {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill(&mut salt);
        salt
    }
}

/// Encrypt a plaintext into the `ENC(<token>)` marker form.
pub fn encrypt_value(plaintext: &str, key: &SecretKeySource) -> Result<String, ConfigError> {
    let salt = Encryptor::generate_salt();
    let key_bytes = key.resolve(&salt)?;
    let (ciphertext, nonce) = Encryptor::encrypt(plaintext.as_bytes(), &key_bytes)?;

    let mut payload = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
    payload.extend_from_slice(&salt);
    payload.extend_from_slice(&nonce);
    payload.extend_from_slice(&ciphertext);

    Ok(format!("{SECRET_MARKER_PREFIX}{})", hex::encode(payload)))
}

/// Decrypt a bare token (the hex payload inside `ENC(...)`).
pub(crate) fn decrypt_token(
    token: &str,
    key: &SecretKeySource,
) -> Result<SecretString, ConfigError> {
    let payload = hex::decode(token).map_err(|_| ConfigError::SecretToken {
        detail: "token is not valid hex".to_string(),
    })?;
    if payload.len() <= SALT_LEN + NONCE_LEN {
        return Err(ConfigError::SecretToken {
            detail: "token is too short".to_string(),
        });
    }

    let (salt, rest) = payload.split_at(SALT_LEN);
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);
    let nonce: [u8; NONCE_LEN] = nonce.try_into().map_err(|_| ConfigError::SecretToken {
        detail: "token nonce is malformed".to_string(),
    })?;

    let key_bytes = key.resolve(salt)?;
    let plaintext = Encryptor::decrypt(ciphertext, &key_bytes, &nonce)?;
    let plaintext = String::from_utf8(plaintext).map_err(|_| ConfigError::SecretToken {
        detail: "decrypted plaintext is not valid UTF-8".to_string(),
    })?;

    Ok(SecretString::new(plaintext.into()))
}

/// A deferred-decryption wrapper around an encrypted scalar.
///
/// The handle owns the ciphertext token and, optionally, a key source.
/// `reveal()` decrypts at most once and caches the plaintext; the cache is
/// not documented as thread-safe beyond the internal lock, and `zeroize()`
/// drops it (the backing buffer is zeroized on drop via `secrecy`).
pub struct SecretHandle {
    token: String,
    key: Option<SecretKeySource>,
    plaintext: Mutex<Option<SecretString>>,
}

impl SecretHandle {
    pub(crate) fn new(token: String, key: Option<SecretKeySource>) -> Self {
        Self {
            token,
            key,
            plaintext: Mutex::new(None),
        }
    }

    /// Parse an `ENC(...)` marker string into a handle.
    pub fn from_marker(marker: &str, key: Option<SecretKeySource>) -> Option<Self> {
        let token = marker
            .strip_prefix(SECRET_MARKER_PREFIX)?
            .strip_suffix(')')?;
        Some(Self::new(token.to_string(), key))
    }

    /// The raw ciphertext token (hex payload without the marker).
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Decrypt the token, caching the plaintext after the first success.
    pub fn reveal(&self) -> Result<SecretString, ConfigError> {
        let mut cache = self.lock();
        if let Some(plaintext) = cache.as_ref() {
            return Ok(plaintext.clone());
        }

        let key = self.key.as_ref().ok_or_else(|| ConfigError::SecretKey {
            detail: format!(
                "no key source configured; set {ENV_SECRET_KEY} or {ENV_SECRET_PASSPHRASE}"
            ),
        })?;
        let plaintext = decrypt_token(&self.token, key)?;
        *cache = Some(plaintext.clone());
        Ok(plaintext)
    }

    /// Drop the cached plaintext. The backing buffer is overwritten on drop.
    pub fn zeroize(&self) {
        self.lock().take();
    }

    fn lock(&self) -> MutexGuard<'_, Option<SecretString>> {
        self.plaintext.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clone for SecretHandle {
    fn clone(&self) -> Self {
        // The plaintext cache is deliberately not carried over.
        Self {
            token: self.token.clone(),
            key: self.key.clone(),
            plaintext: Mutex::new(None),
        }
    }
}

impl PartialEq for SecretHandle {
    fn eq(&self, other: &Self) -> bool {
        self.token == other.token
    }
}

impl std::fmt::Debug for SecretHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretHandle({REDACTED_PLACEHOLDER})")
    }
}

/// Recursively replace every `ENC(...)` scalar in the tree with a
/// [`SecretHandle`]. Non-matching scalars pass through unchanged.
pub(crate) fn wrap_secrets(value: &mut Value, key: Option<&SecretKeySource>) {
    match value {
        Value::String(s) => {
            if let Some(handle) = SecretHandle::from_marker(s, key.cloned()) {
                *value = Value::Secret(handle);
            }
        }
        Value::Mapping(map) => {
            for (_, child) in map.iter_mut() {
                wrap_secrets(child, key);
            }
        }
        Value::Sequence(items) => {
            for child in items {
                wrap_secrets(child, key);
            }
        }
        _ => {}
    }
}
