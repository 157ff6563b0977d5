use std::ops::Deref;

use crate::crypto::{ByteMap, InverseByteMap, Substitution};

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ShardError {
    #[error("shard size must be greater than zero")]
    InvalidShardSize,
}

/// A bounded chunk of a larger payload
///
/// Carries no identity of its own; it only gets a
///  [`RecordRef`](super::RecordRef) once minted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Shard(Vec<u8>);

impl Shard {
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl Deref for Shard {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for Shard {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Shard {
    fn from(bytes: Vec<u8>) -> Self {
        Shard(bytes)
    }
}

/// Split `data` into consecutive shards of at most `shard_size` bytes
///
/// The last shard may be shorter; empty input yields no shards.
///  When a `byte_map` is given every shard is substituted through it.
///  The returned order is the order [`join`] expects back.
///
/// # Errors
///
/// * `ShardError::InvalidShardSize` - `shard_size` is zero
pub fn split(
    data: &[u8],
    shard_size: usize,
    byte_map: Option<&ByteMap>,
) -> Result<Vec<Shard>, ShardError> {
    if shard_size == 0 {
        return Err(ShardError::InvalidShardSize);
    }

    let shards = data
        .chunks(shard_size)
        .map(|chunk| match byte_map {
            Some(map) => Shard(map.apply(chunk)),
            None => Shard(chunk.to_vec()),
        })
        .collect();

    Ok(shards)
}

/// Concatenate shard payloads in the order given
///
/// Ordering is the caller's responsibility; see
///  [`reconstruct_chain`](crate::chain::reconstruct_chain).
pub fn join<I, S>(shards: I, inverse: Option<&InverseByteMap>) -> Vec<u8>
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let mut data = Vec::new();
    for shard in shards {
        match inverse {
            Some(inverse) => data.extend(inverse.apply(shard.as_ref())),
            None => data.extend_from_slice(shard.as_ref()),
        }
    }
    data
}
