use std::collections::HashMap;

use super::provider::{LedgerError, LedgerProvider};
use crate::chain::{reconstruct_chain, ChainError};
use crate::crypto::{Address, ByteMap};
use crate::shard::{GroupId, RawItem, RecordMetadata, RecordRef, ShardRecord};

#[derive(thiserror::Error, Debug)]
pub enum DiscoveryError<T> {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError<T>),
    #[error("integrity error: {0}")]
    Integrity(#[from] ChainError),
}

/// A byte map an address published on the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedByteMap {
    pub self_ref: RecordRef,
    pub byte_map: ByteMap,
}

/// Shard records found across one or more addresses
///
/// Built once per pull and dropped afterwards. Records are keyed by
///  the ref the ledger assigned them, which is assumed to be unique
///  across every address.
#[derive(Debug, Clone, Default)]
pub struct DiscoveredItems {
    records: HashMap<RecordRef, ShardRecord>,
    /// Distinct byte maps published per address, in ref order
    byte_maps: HashMap<Address, Vec<PublishedByteMap>>,
}

impl DiscoveredItems {
    /// Query `addresses` on the ledger and aggregate what they hold
    pub async fn discover<L: LedgerProvider>(
        ledger: &L,
        addresses: &[Address],
    ) -> Result<Self, DiscoveryError<L::Error>> {
        let found = ledger.discover(addresses).await?;
        tracing::debug!(
            "discovered items under {} of {} addresses",
            found.values().filter(|items| !items.is_empty()).count(),
            addresses.len()
        );
        Ok(Self::aggregate(found)?)
    }

    /// Union per-address item maps into one set
    ///
    /// Items that are not JSON, or that carry a schema other than shard
    ///  or byte map, are skipped.
    ///
    /// # Errors
    ///
    /// * `ChainError::DuplicateRef` - One ref was found under two addresses
    /// * `ChainError::MalformedRecord` - A shard or byte map tagged item failed to decode
    pub fn aggregate<I>(per_address: I) -> Result<Self, ChainError>
    where
        I: IntoIterator<Item = (Address, HashMap<RecordRef, RawItem>)>,
    {
        // sorted so conflicts are reported the same way on every run
        let mut per_address: Vec<_> = per_address.into_iter().collect();
        per_address.sort_by(|a, b| a.0.cmp(&b.0));

        let mut found = Self::default();
        let mut seen: HashMap<RecordRef, Address> = HashMap::new();

        for (address, items) in per_address {
            let mut items: Vec<_> = items.into_iter().collect();
            items.sort_by(|a, b| a.0.cmp(&b.0));

            for (self_ref, item) in items {
                if let Some(first) = seen.get(&self_ref) {
                    if *first != address {
                        return Err(ChainError::DuplicateRef {
                            self_ref,
                            first: first.clone(),
                            second: address,
                        });
                    }
                    continue;
                }
                seen.insert(self_ref.clone(), address.clone());
                found.insert(self_ref, &address, &item)?;
            }
        }

        Ok(found)
    }

    fn insert(
        &mut self,
        self_ref: RecordRef,
        address: &Address,
        item: &RawItem,
    ) -> Result<(), ChainError> {
        match RecordMetadata::from_json(&item.metadata) {
            Ok(RecordMetadata::Shard(metadata)) => {
                let record =
                    ShardRecord::from_metadata(self_ref.clone(), address.clone(), metadata);
                self.records.insert(self_ref, record);
            }
            Ok(RecordMetadata::ByteMap(metadata)) => {
                let published = self.byte_maps.entry(address.clone()).or_default();
                if !published.iter().any(|p| p.byte_map == metadata.byte_map) {
                    published.push(PublishedByteMap {
                        self_ref,
                        byte_map: metadata.byte_map,
                    });
                }
            }
            Ok(RecordMetadata::Unknown) => {
                tracing::trace!("skipping item {} with foreign schema", self_ref);
            }
            Err(e) => match RecordMetadata::schema_tag(&item.metadata) {
                Some(schema) if RecordMetadata::is_known_schema(&schema) => {
                    return Err(ChainError::MalformedRecord {
                        self_ref,
                        schema,
                        reason: e.to_string(),
                    });
                }
                _ => {
                    tracing::warn!(
                        "skipping unparseable item {} under {}: {}",
                        self_ref,
                        address,
                        e
                    );
                }
            },
        }
        Ok(())
    }

    pub fn records(&self) -> &HashMap<RecordRef, ShardRecord> {
        &self.records
    }

    /// The byte map published by `address`, if it published one
    ///
    /// # Errors
    ///
    /// * `ChainError::ConflictingByteMaps` - The address published more than one distinct map
    pub fn byte_map(&self, address: &Address) -> Result<Option<&PublishedByteMap>, ChainError> {
        match self.byte_maps.get(address).map(Vec::as_slice) {
            None | Some([]) => Ok(None),
            Some([published]) => Ok(Some(published)),
            Some([first, second, ..]) => Err(ChainError::ConflictingByteMaps {
                address: address.clone(),
                first: first.self_ref.clone(),
                second: second.self_ref.clone(),
            }),
        }
    }

    /// Order the records of one group; see [`reconstruct_chain`]
    pub fn reconstruct(&self, group_id: &GroupId) -> Result<Vec<&ShardRecord>, ChainError> {
        reconstruct_chain(&self.records, group_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
