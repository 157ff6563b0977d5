//! Chain reconstruction
//!
//! Shards of one payload are minted one after another, each pointing at the
//! [`RecordRef`](crate::shard::RecordRef) of the shard before it. Discovery hands
//! them back in no particular order, possibly spread across several addresses.
//! [`reconstruct_chain`] puts a group back into minting order:
//!
//! ```text
//!   r0 (prev: none) <-- r1 (prev: r0) <-- r2 (prev: r1)
//! ```
//!
//! A group must form exactly one chain. Forks, a missing or duplicated
//! genesis, and unreachable records are reported as [`ChainError`]s; no
//! partial or guessed order is ever returned.

mod reconstruct;

pub use reconstruct::{reconstruct_chain, ChainError};
