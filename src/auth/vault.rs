//! Persistent credential storage.
//!
//! The session store persists exactly two values between launches: the bearer
//! token and the cached profile JSON. `SealedFileStore` keeps them encrypted
//! at rest under a key held in the OS keychain; `MemoryStore` backs tests and
//! embedded frontends.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{ChaCha20Poly1305, Key, Nonce};
use keyring::Entry;
use rand::rngs::OsRng;
use rand::RngCore;

/// Keychain service name.
const SERVICE_NAME: &str = "fillup";

/// Keychain entry holding the vault sealing key.
const VAULT_KEY_ENTRY: &str = "vault-key";

/// Fixed key for the persisted bearer token.
pub const TOKEN_KEY: &str = "auth_token";

/// Fixed key for the cached profile JSON.
pub const PROFILE_KEY: &str = "user_profile";

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Scoped key-value store for session credentials.
pub trait CredentialStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, keys: &[&str]) -> Result<()>;
}

impl<S: CredentialStore> CredentialStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.as_ref().get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.as_ref().set(key, value)
    }

    fn remove(&self, keys: &[&str]) -> Result<()> {
        self.as_ref().remove(keys)
    }
}

/// File-backed store sealing each value with ChaCha20-Poly1305.
///
/// Values are written as `nonce || ciphertext`; the sealing key is generated
/// on first use and lives in the OS keychain, never on disk.
pub struct SealedFileStore {
    dir: PathBuf,
    cipher: ChaCha20Poly1305,
}

impl SealedFileStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        let key = Self::load_or_create_key()?;
        Self::with_key(dir, key)
    }

    fn with_key(dir: PathBuf, key: [u8; KEY_LEN]) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create vault directory {}", dir.display()))?;
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&key));
        Ok(Self { dir, cipher })
    }

    fn load_or_create_key() -> Result<[u8; KEY_LEN]> {
        let entry = Entry::new(SERVICE_NAME, VAULT_KEY_ENTRY)
            .context("Failed to create keyring entry")?;

        match entry.get_password() {
            Ok(encoded) => {
                let bytes = hex_decode(&encoded)?;
                bytes
                    .try_into()
                    .map_err(|_| anyhow!("Stored vault key has the wrong length"))
            }
            Err(keyring::Error::NoEntry) => {
                let mut key = [0u8; KEY_LEN];
                OsRng.fill_bytes(&mut key);
                entry
                    .set_password(&hex_encode(&key))
                    .context("Failed to store vault key in keychain")?;
                Ok(key)
            }
            Err(e) => Err(anyhow!(e).context("Failed to read vault key from keychain")),
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.bin", key))
    }
}

impl CredentialStore for SealedFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }

        let sealed = std::fs::read(&path)
            .with_context(|| format!("Failed to read vault entry {}", key))?;
        if sealed.len() <= NONCE_LEN {
            return Err(anyhow!("Vault entry {} is truncated", key));
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| anyhow!("Failed to unseal vault entry {}", key))?;

        Ok(Some(
            String::from_utf8(plaintext).context("Vault entry is not valid UTF-8")?,
        ))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), value.as_bytes())
            .map_err(|_| anyhow!("Failed to seal vault entry {}", key))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);

        std::fs::write(self.path(key), sealed)
            .with_context(|| format!("Failed to write vault entry {}", key))?;
        Ok(())
    }

    fn remove(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            let path = self.path(key);
            if path.exists() {
                std::fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove vault entry {}", key))?;
            }
        }
        Ok(())
    }
}

/// In-memory store for tests and embedded frontends.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, keys: &[&str]) -> Result<()> {
        let mut entries = self.entries.lock().unwrap();
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn hex_decode(s: &str) -> Result<Vec<u8>> {
    if s.len() % 2 != 0 {
        return Err(anyhow!("Odd-length hex string"));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).context("Invalid hex digit"))
        .collect()
}
