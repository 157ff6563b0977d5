//! Integration tests for splitting, linking and reconstructing shard chains

mod common;

use std::collections::HashMap;

use ::common::chain::{reconstruct_chain, ChainError};
use ::common::crypto::{Address, ByteMap};
use ::common::shard::{join, split, GroupId, RecordRef, ShardRecord};
use rand::seq::SliceRandom;
use rand::Rng;

/// Link shards the way a push would, assigning refs `{prefix}0`, `{prefix}1`, ..
fn link(group: &GroupId, prefix: &str, payloads: Vec<Vec<u8>>) -> Vec<ShardRecord> {
    let mut prev_ref = None;
    payloads
        .into_iter()
        .enumerate()
        .map(|(i, payload)| {
            let self_ref = RecordRef::new(format!("{}{}", prefix, i));
            ShardRecord {
                group_id: group.clone(),
                prev_ref: prev_ref.replace(self_ref.clone()),
                self_ref,
                payload,
                owner: Address::from("owner"),
            }
        })
        .collect()
}

fn shuffled(records: &[ShardRecord]) -> HashMap<RecordRef, ShardRecord> {
    let mut records = records.to_vec();
    records.shuffle(&mut rand::rng());
    records
        .into_iter()
        .map(|record| (record.self_ref.clone(), record))
        .collect()
}

#[test]
fn test_end_to_end_three_shards() {
    common::init_tracing();

    let data = common::incrementing(250);
    let seed: [u8; 32] = std::array::from_fn(|i| i as u8);
    let byte_map = ByteMap::derive(&seed).unwrap();

    let shards = split(&data, 100, Some(&byte_map)).unwrap();
    let lengths: Vec<usize> = shards.iter().map(|s| s.len()).collect();
    assert_eq!(lengths, vec![100, 100, 50]);

    let group = GroupId::new("file-250");
    let records = link(
        &group,
        "r",
        shards.into_iter().map(|s| s.into_inner()).collect(),
    );
    assert_eq!(records[0].prev_ref, None);
    assert_eq!(records[1].prev_ref, Some(RecordRef::new("r0")));
    assert_eq!(records[2].prev_ref, Some(RecordRef::new("r1")));

    for _ in 0..20 {
        let items = shuffled(&records);
        let chain = reconstruct_chain(&items, &group).unwrap();

        let refs: Vec<&str> = chain.iter().map(|r| r.self_ref.as_str()).collect();
        assert_eq!(refs, vec!["r0", "r1", "r2"]);

        let recovered = join(
            chain.iter().map(|r| r.payload.as_slice()),
            Some(&byte_map.invert()),
        );
        assert_eq!(recovered, data);
    }
}

#[test]
fn test_long_chain_independent_of_discovery_order() {
    let group = GroupId::generate();
    let payloads: Vec<Vec<u8>> = (0..64u8).map(|i| vec![i; 3]).collect();
    let records = link(&group, "tx", payloads.clone());

    for _ in 0..10 {
        let items = shuffled(&records);
        let chain = reconstruct_chain(&items, &group).unwrap();
        let recovered: Vec<Vec<u8>> = chain.iter().map(|r| r.payload.clone()).collect();
        assert_eq!(recovered, payloads);
    }
}

#[test]
fn test_interleaved_groups_reconstruct_independently() {
    let first = GroupId::new("first");
    let second = GroupId::new("second");
    let mut records = link(&first, "a", vec![b"hello ".to_vec(), b"world".to_vec()]);
    records.extend(link(&second, "b", vec![b"foo".to_vec(), b"bar".to_vec(), b"baz".to_vec()]));

    let items = shuffled(&records);
    let chain = reconstruct_chain(&items, &first).unwrap();
    assert_eq!(join(chain.iter().map(|r| r.payload.as_slice()), None), b"hello world");

    let chain = reconstruct_chain(&items, &second).unwrap();
    assert_eq!(join(chain.iter().map(|r| r.payload.as_slice()), None), b"foobarbaz");

    let chain = reconstruct_chain(&items, &GroupId::new("third")).unwrap();
    assert!(chain.is_empty());
}

#[test]
fn test_missing_middle_shard_is_detected() {
    let group = GroupId::new("g");
    let mut records = link(&group, "r", vec![vec![1], vec![2], vec![3], vec![4]]);
    records.remove(2);

    let items = shuffled(&records);
    assert_eq!(
        reconstruct_chain(&items, &group),
        Err(ChainError::BrokenChain {
            reachable: 2,
            total: 3
        })
    );
}

#[test]
fn test_missing_last_shard_leaves_a_valid_prefix() {
    let group = GroupId::new("g");
    let mut records = link(&group, "r", vec![vec![1], vec![2], vec![3]]);
    records.pop();

    let items = shuffled(&records);
    let chain = reconstruct_chain(&items, &group).unwrap();
    assert_eq!(join(chain.iter().map(|r| r.payload.as_slice()), None), vec![1, 2]);
}

#[test]
fn test_random_roundtrips() {
    let mut rng = rand::rng();

    for _ in 0..50 {
        let len = rng.random_range(0..2048);
        let mut data = vec![0u8; len];
        rng.fill(&mut data[..]);
        let shard_size = rng.random_range(1..300);
        let seed: [u8; 32] = rng.random();

        let byte_map = ByteMap::derive(&seed).unwrap();
        let shards = split(&data, shard_size, Some(&byte_map)).unwrap();
        assert!(shards.iter().all(|s| s.len() <= shard_size));

        let group = GroupId::generate();
        let records = link(
            &group,
            "r",
            shards.into_iter().map(|s| s.into_inner()).collect(),
        );
        let items = shuffled(&records);
        let chain = reconstruct_chain(&items, &group).unwrap();
        let recovered = join(
            chain.iter().map(|r| r.payload.as_slice()),
            Some(&byte_map.invert()),
        );
        assert_eq!(recovered, data);
    }
}
