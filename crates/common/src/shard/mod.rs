//! Shard splitting, recombination and the record schema shards are minted with
//!
//! - **[`split`]** / **[`join`]**: pure transforms between a payload and its ordered shards
//! - **[`ShardRecord`]**: a minted shard plus its chain linkage
//! - **[`RecordMetadata`]**: the schema tagged union stored on the ledger

mod codec;
mod record;

pub use codec::{join, split, Shard, ShardError};
pub use record::{
    ByteMapMetadata, GroupId, RawItem, RecordMetadata, RecordRef, ShardMetadata, ShardRecord,
    BYTE_MAP_SCHEMA, SHARD_SCHEMA,
};
