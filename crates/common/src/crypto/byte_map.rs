//! Byte substitution tables keyed by an owner's public key
//!
//! A [`ByteMap`] is a permutation of `0..=255` derived deterministically
//! from a seed. Applying it to a buffer replaces every byte `b` with
//! `map[b]`; applying the matching [`InverseByteMap`] undoes it.
//!
//! This is a reversible obfuscation, not encryption. Anyone who knows
//! the owner's public key can rebuild the table.
//!
//! # Derivation
//!
//! ```text
//! digest = SHA-256(seed)
//! map    = [0, 1, ..., 255]
//! for i in 255..=1:
//!     j = digest[i % 32] % (i + 1)
//!     swap(map[i], map[j])
//! ```
//!
//! The derivation must stay bit-for-bit stable: shards minted by one
//! process are decoded by another.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::keys::PublicKey;

/// Number of entries in a substitution table
pub const BYTE_MAP_SIZE: usize = 256;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ByteMapError {
    #[error("byte map seed must not be empty")]
    EmptySeed,
    #[error("invalid byte map length, expected 256, got {0}")]
    InvalidLength(usize),
    /// The value appears more than once, so the table is
    ///  not a permutation and cannot be inverted
    #[error("byte map is not a permutation: {0} appears more than once")]
    NotBijective(u8),
}

/// Shared behaviour of forward and inverse tables
pub trait Substitution {
    fn table(&self) -> &[u8; BYTE_MAP_SIZE];

    /// Substitute every byte of `bytes` through the table.
    ///  The output has the same length as the input.
    fn apply(&self, bytes: &[u8]) -> Vec<u8> {
        let table = self.table();
        bytes.iter().map(|b| table[*b as usize]).collect()
    }
}

/// Forward substitution table
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct ByteMap([u8; BYTE_MAP_SIZE]);

/// Inverse of a [`ByteMap`]; only ever built in memory
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct InverseByteMap([u8; BYTE_MAP_SIZE]);

impl ByteMap {
    /// Derive a byte map from an arbitrary non-empty seed
    pub fn derive(seed: &[u8]) -> Result<Self, ByteMapError> {
        if seed.is_empty() {
            return Err(ByteMapError::EmptySeed);
        }
        Ok(Self::shuffle(&Sha256::digest(seed)))
    }

    /// Derive the byte map owned by `key`
    pub fn from_public_key(key: &PublicKey) -> Self {
        Self::shuffle(&Sha256::digest(key.to_bytes()))
    }

    fn shuffle(digest: &[u8]) -> Self {
        let mut table = [0u8; BYTE_MAP_SIZE];
        for (i, entry) in table.iter_mut().enumerate() {
            *entry = i as u8;
        }
        for i in (1..BYTE_MAP_SIZE).rev() {
            let j = digest[i % digest.len()] as usize % (i + 1);
            table.swap(i, j);
        }
        Self(table)
    }

    pub fn invert(&self) -> InverseByteMap {
        let mut inverse = [0u8; BYTE_MAP_SIZE];
        for (i, value) in self.0.iter().enumerate() {
            inverse[*value as usize] = i as u8;
        }
        InverseByteMap(inverse)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Substitution for ByteMap {
    fn table(&self) -> &[u8; BYTE_MAP_SIZE] {
        &self.0
    }
}

impl Substitution for InverseByteMap {
    fn table(&self) -> &[u8; BYTE_MAP_SIZE] {
        &self.0
    }
}

impl TryFrom<&[u8]> for ByteMap {
    type Error = ByteMapError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != BYTE_MAP_SIZE {
            return Err(ByteMapError::InvalidLength(bytes.len()));
        }
        let mut seen = [false; BYTE_MAP_SIZE];
        for value in bytes {
            if seen[*value as usize] {
                return Err(ByteMapError::NotBijective(*value));
            }
            seen[*value as usize] = true;
        }
        let mut table = [0u8; BYTE_MAP_SIZE];
        table.copy_from_slice(bytes);
        Ok(Self(table))
    }
}

impl TryFrom<Vec<u8>> for ByteMap {
    type Error = ByteMapError;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        Self::try_from(bytes.as_slice())
    }
}

impl From<ByteMap> for Vec<u8> {
    fn from(map: ByteMap) -> Self {
        map.0.to_vec()
    }
}

// 256 entries drown out everything else in debug output
impl fmt::Debug for ByteMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteMap({}..)", hex::encode(&self.0[..8]))
    }
}

impl fmt::Debug for InverseByteMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InverseByteMap({}..)", hex::encode(&self.0[..8]))
    }
}
