/**
 * Chain reconstruction.
 *  Puts discovered shard records back into
 *  the order they were minted in.
 */
pub mod chain;
pub mod config;
/**
 * Owner keys and the byte substitution
 *  derived from them.
 */
pub mod crypto;
/**
 * Push/pull orchestration over a ledger
 *  and a key store.
 */
pub mod gateway;
pub mod keystore;
/**
 * The ledger boundary: minting records,
 *  listing what an address holds, and
 *  aggregating discovered items.
 */
pub mod ledger;
/**
 * Shard splitting and recombination, and
 *  the schema shards are minted with.
 */
pub mod shard;

pub mod prelude {
    pub use crate::chain::{reconstruct_chain, ChainError};
    pub use crate::config::GatewayConfig;
    pub use crate::crypto::{Address, ByteMap, InverseByteMap, PublicKey, SecretKey, Substitution};
    pub use crate::gateway::{Gateway, GatewayError, PushReceipt};
    pub use crate::keystore::{KeyStore, MemoryKeyStore};
    pub use crate::ledger::{DiscoveredItems, LedgerProvider, MemoryLedger};
    pub use crate::shard::{join, split, GroupId, RecordRef, Shard, ShardRecord};
}
