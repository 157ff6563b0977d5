//! # Gateway
//!
//! Push and pull payloads through a ledger on behalf of the keys in a
//! [`KeyStore`].
//!
//! ## Push
//!
//! The payload is split into shards, each substituted through the owner's
//! [`ByteMap`], and minted to the owner's address one at a time. Every
//! shard's `prevRef` is the ref the ledger returned for the shard before it,
//! so minting within one group is strictly sequential. If a mint fails the
//! push stops there: the shards minted so far still form a valid chain,
//! just a shorter one.
//!
//! ## Pull
//!
//! Every address of interest is queried, the items are aggregated, and the
//! group's chain is reconstructed. A chain may span several addresses; the
//! whole chain is decoded with the map of the address holding its genesis
//! record, which is the owner it was pushed for.
//!
//! ## Byte maps
//!
//! Push and pull both derive the map from the owner's public key. A map the
//! owner published with [`Gateway::mint_byte_map`] is only checked against
//! the derived one, and a mismatch fails the pull rather than decoding with
//! either of them.

use std::collections::HashMap;

use crate::chain::ChainError;
use crate::config::GatewayConfig;
use crate::crypto::{Address, ByteMap, PublicKey};
use crate::keystore::{KeyStore, KeyStoreError};
use crate::ledger::{DiscoveredItems, DiscoveryError, LedgerError, LedgerProvider};
use crate::shard::{
    join, split, ByteMapMetadata, GroupId, RecordMetadata, RecordRef, ShardError, ShardMetadata,
};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError<T> {
    #[error("shard error: {0}")]
    Shard(#[from] ShardError),
    #[error("key store error: {0}")]
    KeyStore(#[from] KeyStoreError),
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError<T>),
    #[error("discovery error: {0}")]
    Discovery(#[from] DiscoveryError<T>),
    #[error("chain error: {0}")]
    Chain(#[from] ChainError),
    #[error("payload of {size} bytes exceeds the limit of {limit}")]
    PayloadTooLarge { size: usize, limit: usize },
    #[error("payload needs {count} shards, more than the limit of {limit}")]
    TooManyShards { count: usize, limit: usize },
    /// Minting stopped part way; the first `persisted` shards are on the ledger
    #[error("push interrupted after {persisted} of {total} shards: {cause}")]
    PartialPush {
        persisted: usize,
        total: usize,
        cause: LedgerError<T>,
    },
    /// The owner published a byte map other than the one derived from its key
    #[error("byte map {published} published by {owner} does not match its key")]
    ByteMapMismatch { owner: Address, published: RecordRef },
    #[error("no key known for owner {0}")]
    UnknownOwner(Address),
}

impl<T> GatewayError<T> {
    /// Whether the discovered records were inconsistent, as opposed to
    ///  the input being invalid or the ledger failing
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            GatewayError::Chain(_)
                | GatewayError::Discovery(DiscoveryError::Integrity(_))
                | GatewayError::ByteMapMismatch { .. }
                | GatewayError::UnknownOwner(_)
        )
    }
}

/// What a push left on the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReceipt {
    pub group_id: GroupId,
    pub owner: Address,
    /// Refs of the minted shards, genesis first
    pub refs: Vec<RecordRef>,
}

#[derive(Debug, Clone)]
pub struct Gateway<L, K> {
    config: GatewayConfig,
    ledger: L,
    keys: K,
}

impl<L, K> Gateway<L, K>
where
    L: LedgerProvider,
    K: KeyStore,
{
    pub fn new(config: GatewayConfig, ledger: L, keys: K) -> Self {
        Self {
            config,
            ledger,
            keys,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn keys(&self) -> &K {
        &self.keys
    }

    /// Shard `data` and mint it under `group_id`
    ///
    /// # Arguments
    /// * `data` - The payload to push
    /// * `group_id` - The group every shard is tagged with
    /// * `owner` - The key to mint to; the store's default key when `None`
    pub async fn push(
        &self,
        data: &[u8],
        group_id: &GroupId,
        owner: Option<&PublicKey>,
    ) -> Result<PushReceipt, GatewayError<L::Error>> {
        if data.len() > self.config.file_size_limit {
            return Err(GatewayError::PayloadTooLarge {
                size: data.len(),
                limit: self.config.file_size_limit,
            });
        }

        let owner = self.keys.default_key(owner)?;
        let address = owner.address();
        let byte_map = ByteMap::from_public_key(&owner);

        let shards = split(data, self.config.shard_size, Some(&byte_map))?;
        if shards.len() > self.config.max_shards {
            return Err(GatewayError::TooManyShards {
                count: shards.len(),
                limit: self.config.max_shards,
            });
        }

        tracing::debug!(
            "pushing {} bytes as {} shards of group {} to {}",
            data.len(),
            shards.len(),
            group_id,
            address
        );

        let total = shards.len();
        let mut refs: Vec<RecordRef> = Vec::with_capacity(total);
        for shard in shards {
            let metadata = RecordMetadata::Shard(ShardMetadata {
                group_id: group_id.clone(),
                prev_ref: refs.last().cloned(),
                payload: shard.into_inner(),
            });

            match self
                .ledger
                .persist(&address, &metadata, self.config.mint_amount)
                .await
            {
                Ok(self_ref) => {
                    tracing::trace!(
                        "minted shard {} of group {}: {}",
                        refs.len(),
                        group_id,
                        self_ref
                    );
                    refs.push(self_ref);
                }
                Err(e) => {
                    tracing::warn!(
                        "push of group {} stopped after {} of {} shards: {}",
                        group_id,
                        refs.len(),
                        total,
                        e
                    );
                    return Err(GatewayError::PartialPush {
                        persisted: refs.len(),
                        total,
                        cause: e,
                    });
                }
            }
        }

        tracing::info!("pushed group {} ({} shards) to {}", group_id, total, address);
        Ok(PushReceipt {
            group_id: group_id.clone(),
            owner: address,
            refs,
        })
    }

    /// Rebuild the payload of `group_id`
    ///
    /// Queries the address of `owner`, or of every key in the store when
    ///  `None`.
    ///
    /// # Returns
    /// * `Ok(Some(data))` - The reconstructed payload
    /// * `Ok(None)` - No shard of the group was found
    /// * `Err(GatewayError)` - The ledger failed or the shards found are inconsistent
    pub async fn pull(
        &self,
        group_id: &GroupId,
        owner: Option<&PublicKey>,
    ) -> Result<Option<Vec<u8>>, GatewayError<L::Error>> {
        let keys: HashMap<Address, PublicKey> = self
            .keys
            .resolve(owner)?
            .into_iter()
            .map(|key| (key.address(), key))
            .collect();
        let addresses: Vec<Address> = keys.keys().cloned().collect();

        let discovered = DiscoveredItems::discover(&self.ledger, &addresses).await?;
        let chain = discovered.reconstruct(group_id)?;

        let Some(genesis) = chain.first() else {
            tracing::debug!("no shards of group {} found", group_id);
            return Ok(None);
        };
        let owner_address = &genesis.owner;
        let owner = keys
            .get(owner_address)
            .ok_or_else(|| GatewayError::UnknownOwner(owner_address.clone()))?;

        let byte_map = ByteMap::from_public_key(owner);
        if let Some(published) = discovered.byte_map(owner_address)? {
            if published.byte_map != byte_map {
                return Err(GatewayError::ByteMapMismatch {
                    owner: owner_address.clone(),
                    published: published.self_ref.clone(),
                });
            }
        }

        let data = join(
            chain.iter().map(|record| record.payload.as_slice()),
            Some(&byte_map.invert()),
        );

        tracing::info!(
            "pulled group {} ({} shards, {} bytes) from {}",
            group_id,
            chain.len(),
            data.len(),
            owner_address
        );
        Ok(Some(data))
    }

    /// Publish the byte map of `owner` as a ledger record
    pub async fn mint_byte_map(
        &self,
        owner: Option<&PublicKey>,
    ) -> Result<RecordRef, GatewayError<L::Error>> {
        let owner = self.keys.default_key(owner)?;
        let metadata = RecordMetadata::ByteMap(ByteMapMetadata {
            byte_map: ByteMap::from_public_key(&owner),
        });

        let self_ref = self
            .ledger
            .persist(&owner.address(), &metadata, self.config.mint_amount)
            .await?;
        tracing::debug!("published byte map of {} as {}", owner.address(), self_ref);
        Ok(self_ref)
    }
}
