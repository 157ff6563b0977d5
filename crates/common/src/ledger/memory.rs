use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::provider::{LedgerError, LedgerProvider};
use crate::crypto::Address;
use crate::shard::{RawItem, RecordMetadata, RecordRef};

/// In-memory ledger using HashMaps
///
/// Refs are the hex SHA-256 of a mint counter, the owner and the
///  metadata, standing in for transaction hashes.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    inner: Arc<RwLock<MemoryLedgerInner>>,
}

#[derive(Debug, Default)]
struct MemoryLedgerInner {
    /// Items held per address: address -> ref -> item
    items: HashMap<Address, HashMap<RecordRef, RawItem>>,
    /// Number of records minted so far
    minted: u64,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryLedgerError {
    #[error("memory ledger error: {0}")]
    Internal(String),
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place an item under an address as-is, bypassing minting.
    ///  Lets callers seed the ledger with records of foreign schemas.
    pub fn insert_raw(
        &self,
        address: Address,
        self_ref: RecordRef,
        item: RawItem,
    ) -> Result<(), MemoryLedgerError> {
        let mut inner = self.write()?;
        inner
            .items
            .entry(address)
            .or_default()
            .insert(self_ref, item);
        Ok(())
    }

    /// Number of records minted through [`LedgerProvider::persist`]
    pub fn minted(&self) -> Result<u64, MemoryLedgerError> {
        Ok(self.read()?.minted)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryLedgerInner>, MemoryLedgerError> {
        self.inner.read().map_err(|e| {
            MemoryLedgerError::Internal(format!("failed to acquire read lock: {}", e))
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryLedgerInner>, MemoryLedgerError> {
        self.inner.write().map_err(|e| {
            MemoryLedgerError::Internal(format!("failed to acquire write lock: {}", e))
        })
    }
}

#[async_trait]
impl LedgerProvider for MemoryLedger {
    type Error = MemoryLedgerError;

    async fn persist(
        &self,
        owner: &Address,
        metadata: &RecordMetadata,
        amount: u64,
    ) -> Result<RecordRef, LedgerError<Self::Error>> {
        if amount == 0 {
            return Err(LedgerError::Rejected(
                owner.clone(),
                "mint amount must be positive".to_string(),
            ));
        }
        let encoded = metadata.to_json().map_err(|e| {
            MemoryLedgerError::Internal(format!("failed to encode metadata: {}", e))
        })?;

        let mut inner = self.write()?;

        let mut hasher = Sha256::new();
        hasher.update(inner.minted.to_be_bytes());
        hasher.update(owner.as_str().as_bytes());
        hasher.update(encoded.as_bytes());
        let self_ref = RecordRef::new(hex::encode(hasher.finalize()));

        inner.minted += 1;
        inner.items.entry(owner.clone()).or_default().insert(
            self_ref.clone(),
            RawItem {
                amount,
                metadata: encoded,
                address: owner.clone(),
            },
        );

        tracing::trace!("minted {} to {}", self_ref, owner);
        Ok(self_ref)
    }

    async fn discover_address(
        &self,
        address: &Address,
    ) -> Result<HashMap<RecordRef, RawItem>, LedgerError<Self::Error>> {
        let inner = self.read()?;

        Ok(inner.items.get(address).cloned().unwrap_or_default())
    }
}
