use std::fmt::Debug;

use crate::crypto::{PublicKey, SecretKey};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum KeyStoreError {
    #[error("key store holds no keys")]
    Empty,
}

/// Source of the owner keys the gateway acts for
///
/// Passed to the [`Gateway`](crate::gateway::Gateway) explicitly; nothing
///  in this crate keeps keys in global state.
pub trait KeyStore: Send + Sync + Debug {
    /// Public keys of every held keypair, default key first
    fn public_keys(&self) -> Vec<PublicKey>;

    /// The keys an operation should act for
    ///
    /// An explicit key is used as-is, whether or not the store holds
    ///  its secret half. Without one every held key is returned.
    fn resolve(&self, key: Option<&PublicKey>) -> Result<Vec<PublicKey>, KeyStoreError> {
        if let Some(key) = key {
            return Ok(vec![*key]);
        }
        let keys = self.public_keys();
        if keys.is_empty() {
            return Err(KeyStoreError::Empty);
        }
        Ok(keys)
    }

    /// The key to act for when none is given
    fn default_key(&self, key: Option<&PublicKey>) -> Result<PublicKey, KeyStoreError> {
        self.resolve(key)?
            .into_iter()
            .next()
            .ok_or(KeyStoreError::Empty)
    }
}

/// Keypairs held in memory, in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyStore {
    keys: Vec<SecretKey>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(keys: impl IntoIterator<Item = SecretKey>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// Add a key unless one with the same public half is already held
    pub fn insert(&mut self, key: SecretKey) -> PublicKey {
        let public = key.public();
        if !self.keys.iter().any(|held| held.public() == public) {
            self.keys.push(key);
        }
        public
    }

    /// Generate and hold a fresh keypair
    pub fn generate(&mut self) -> PublicKey {
        self.insert(SecretKey::generate())
    }

    pub fn secret(&self, key: &PublicKey) -> Option<&SecretKey> {
        self.keys.iter().find(|held| held.public() == *key)
    }
}

impl KeyStore for MemoryKeyStore {
    fn public_keys(&self) -> Vec<PublicKey> {
        self.keys.iter().map(SecretKey::public).collect()
    }
}
