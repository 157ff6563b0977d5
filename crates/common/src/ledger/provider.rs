use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;

use crate::crypto::Address;
use crate::shard::{RawItem, RecordMetadata, RecordRef};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError<T> {
    #[error("unhandled ledger provider error: {0}")]
    Provider(#[from] T),
    /// The ledger refused to mint a record --
    ///  owner, reason
    #[error("ledger rejected record for {0}: {1}")]
    Rejected(Address, String),
}

/// The store shard records are minted to and discovered from
///
/// Implementations talk to the actual ledger. Failures are opaque to the
///  gateway and never retried by it; retry policy belongs to the
///  implementation or its caller.
#[async_trait]
pub trait LedgerProvider: Send + Sync + Debug + Clone + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Mint a record to an address
    ///
    /// # Arguments
    /// * `owner` - The address the record is minted to
    /// * `metadata` - The record, encoded as its schema tagged metadata
    /// * `amount` - The item amount to mint
    ///
    /// # Returns
    /// * `Ok(RecordRef)` - The ref the ledger assigned to the record
    /// * `Err(LedgerError)` - The record was not minted
    async fn persist(
        &self,
        owner: &Address,
        metadata: &RecordMetadata,
        amount: u64,
    ) -> Result<RecordRef, LedgerError<Self::Error>>;

    /// List every item held by an address
    ///
    /// Items are returned undecoded, whatever their schema. An address
    ///  the ledger has never seen holds no items.
    async fn discover_address(
        &self,
        address: &Address,
    ) -> Result<HashMap<RecordRef, RawItem>, LedgerError<Self::Error>>;

    /// List the items held by several addresses
    ///
    /// Issues one lookup per distinct address, concurrently.
    async fn discover(
        &self,
        addresses: &[Address],
    ) -> Result<HashMap<Address, HashMap<RecordRef, RawItem>>, LedgerError<Self::Error>> {
        let mut distinct: Vec<&Address> = addresses.iter().collect();
        distinct.sort();
        distinct.dedup();

        let lookups = distinct.into_iter().map(|address| async move {
            let items = self.discover_address(address).await?;
            Ok::<_, LedgerError<Self::Error>>((address.clone(), items))
        });
        let found = futures::future::try_join_all(lookups).await?;

        Ok(found.into_iter().collect())
    }
}
