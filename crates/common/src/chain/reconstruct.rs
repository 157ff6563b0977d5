use std::collections::HashMap;

use crate::crypto::Address;
use crate::shard::{GroupId, RecordRef, ShardRecord};

/// The discovered records do not form a single valid chain
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// Two records claim the same predecessor --
    ///  predecessor, first successor, second successor
    #[error("fork after {prev_ref}: both {first} and {second} follow it")]
    Fork {
        prev_ref: RecordRef,
        first: RecordRef,
        second: RecordRef,
    },
    #[error("no genesis record for group {0}")]
    MissingGenesis(GroupId),
    #[error("more than one genesis record: {first} and {second}")]
    AmbiguousGenesis { first: RecordRef, second: RecordRef },
    /// Some records could not be reached by walking from the genesis
    #[error("broken chain: reached {reachable} of {total} records")]
    BrokenChain { reachable: usize, total: usize },
    /// Walking the chain came back around to an already visited record
    #[error("chain revisits {0}")]
    Cycle(RecordRef),
    /// The same ref was discovered under two different addresses
    #[error("record {self_ref} discovered under both {first} and {second}")]
    DuplicateRef {
        self_ref: RecordRef,
        first: Address,
        second: Address,
    },
    /// The record carries a known schema tag but its body does not decode
    #[error("record {self_ref} tagged {schema} is malformed: {reason}")]
    MalformedRecord {
        self_ref: RecordRef,
        schema: String,
        reason: String,
    },
    /// One address published two different byte maps
    #[error("{address} published conflicting byte maps {first} and {second}")]
    ConflictingByteMaps {
        address: Address,
        first: RecordRef,
        second: RecordRef,
    },
}

/// Order the records of `group_id` from genesis to tail
///
/// # Arguments
/// * `items` - Discovered records keyed by their ref
/// * `group_id` - The group to reconstruct
///
/// # Returns
/// * `Ok(vec![])` - No record belongs to the group
/// * `Ok(records)` - Every record of the group, in minting order
/// * `Err(ChainError)` - The group does not form exactly one chain
///
/// The result depends only on the `prev_ref` links, never on the
///  iteration order of `items`.
pub fn reconstruct_chain<'a>(
    items: &'a HashMap<RecordRef, ShardRecord>,
    group_id: &GroupId,
) -> Result<Vec<&'a ShardRecord>, ChainError> {
    let mut group: Vec<&ShardRecord> = items
        .values()
        .filter(|record| &record.group_id == group_id)
        .collect();
    if group.is_empty() {
        return Ok(Vec::new());
    }
    // sorted so the reported error does not depend on map order
    group.sort_by(|a, b| a.self_ref.cmp(&b.self_ref));

    let mut by_prev: HashMap<Option<&RecordRef>, &ShardRecord> =
        HashMap::with_capacity(group.len());
    for &record in &group {
        if let Some(existing) = by_prev.insert(record.prev_ref.as_ref(), record) {
            let first = existing.self_ref.clone();
            let second = record.self_ref.clone();
            return Err(match &record.prev_ref {
                Some(prev_ref) => ChainError::Fork {
                    prev_ref: prev_ref.clone(),
                    first,
                    second,
                },
                None => ChainError::AmbiguousGenesis { first, second },
            });
        }
    }

    let mut current = *by_prev
        .get(&None)
        .ok_or_else(|| ChainError::MissingGenesis(group_id.clone()))?;

    let mut ordered = Vec::with_capacity(group.len());
    ordered.push(current);
    while let Some(&next) = by_prev.get(&Some(&current.self_ref)) {
        // only possible when a ref appears on more than one record
        if ordered.len() == group.len() {
            return Err(ChainError::Cycle(next.self_ref.clone()));
        }
        ordered.push(next);
        current = next;
    }

    if ordered.len() != group.len() {
        return Err(ChainError::BrokenChain {
            reachable: ordered.len(),
            total: group.len(),
        });
    }

    tracing::debug!(
        "reconstructed group {} from {} records",
        group_id,
        ordered.len()
    );
    Ok(ordered)
}
