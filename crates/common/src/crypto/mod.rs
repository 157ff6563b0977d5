//! Key material and byte substitution for the XGP gateway
//!
//! - **Identity**: Ed25519 keypairs (`SecretKey`/`PublicKey`) identify record owners.
//!   A public key maps to a ledger [`Address`] that records are minted to.
//! - **Substitution**: every owner has a [`ByteMap`] derived from their public key.
//!   Shard payloads are passed through it before they are minted, and through the
//!   [`InverseByteMap`] when they are read back.
//!
//! The substitution only obfuscates payloads. It is keyed by public material and
//!  offers no confidentiality.

mod byte_map;
mod keys;

pub use byte_map::{ByteMap, ByteMapError, InverseByteMap, Substitution, BYTE_MAP_SIZE};
pub use keys::{Address, PublicKey, SecretKey, PRIVATE_KEY_SIZE, PUBLIC_KEY_SIZE};
