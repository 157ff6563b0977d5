//! The ledger boundary
//!
//! Shards are minted to a ledger one record at a time and discovered again
//! by listing what an address holds. This module defines that boundary and
//! everything the gateway needs on its side of it:
//!
//! - **[`LedgerProvider`]**: async mint/list interface implemented by a ledger client
//! - **[`MemoryLedger`]**: in-memory provider for tests and local use
//! - **[`DiscoveredItems`]**: decodes and unions the items found under many addresses

mod discovery;
mod memory;
mod provider;

pub use discovery::{DiscoveredItems, DiscoveryError, PublishedByteMap};
pub use memory::{MemoryLedger, MemoryLedgerError};
pub use provider::{LedgerError, LedgerProvider};
