//! Shared test utilities for gateway integration tests
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use common::config::GatewayConfig;
use common::crypto::{Address, PublicKey};
use common::gateway::Gateway;
use common::keystore::MemoryKeyStore;
use common::ledger::{LedgerError, LedgerProvider, MemoryLedger, MemoryLedgerError};
use common::shard::{RawItem, RecordMetadata, RecordRef};
use tracing_subscriber::EnvFilter;

/// Install a test log subscriber; honours `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Config with 100 byte shards, leaving the other limits at their defaults
pub fn test_config() -> GatewayConfig {
    GatewayConfig {
        shard_size: 100,
        ..GatewayConfig::default()
    }
}

/// Set up a gateway over a fresh memory ledger with `owners` generated keys
pub fn setup_gateway(owners: usize) -> (Gateway<MemoryLedger, MemoryKeyStore>, Vec<PublicKey>) {
    init_tracing();
    let mut keys = MemoryKeyStore::new();
    let public_keys = (0..owners).map(|_| keys.generate()).collect();
    (
        Gateway::new(test_config(), MemoryLedger::new(), keys),
        public_keys,
    )
}

/// Payload of `len` incrementing bytes
pub fn incrementing(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 256) as u8).collect()
}

#[derive(Debug, thiserror::Error)]
pub enum FlakyLedgerError {
    #[error("ledger unavailable")]
    Unavailable,
    #[error(transparent)]
    Memory(#[from] MemoryLedgerError),
}

/// Memory ledger that starts failing every mint after a budget is spent
#[derive(Debug, Clone)]
pub struct FlakyLedger {
    pub inner: MemoryLedger,
    remaining: Arc<AtomicUsize>,
}

impl FlakyLedger {
    pub fn new(successful_mints: usize) -> Self {
        Self {
            inner: MemoryLedger::new(),
            remaining: Arc::new(AtomicUsize::new(successful_mints)),
        }
    }
}

fn lift(e: LedgerError<MemoryLedgerError>) -> LedgerError<FlakyLedgerError> {
    match e {
        LedgerError::Provider(e) => LedgerError::Provider(e.into()),
        LedgerError::Rejected(owner, reason) => LedgerError::Rejected(owner, reason),
    }
}

#[async_trait]
impl LedgerProvider for FlakyLedger {
    type Error = FlakyLedgerError;

    async fn persist(
        &self,
        owner: &Address,
        metadata: &RecordMetadata,
        amount: u64,
    ) -> Result<RecordRef, LedgerError<Self::Error>> {
        let spent = self
            .remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if spent.is_err() {
            return Err(LedgerError::Provider(FlakyLedgerError::Unavailable));
        }
        self.inner
            .persist(owner, metadata, amount)
            .await
            .map_err(lift)
    }

    async fn discover_address(
        &self,
        address: &Address,
    ) -> Result<HashMap<RecordRef, RawItem>, LedgerError<Self::Error>> {
        self.inner.discover_address(address).await.map_err(lift)
    }
}
