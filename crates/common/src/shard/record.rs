//! # Shard records
//!
//! Every minted shard is stored on the ledger as an item whose metadata is a
//! schema tagged JSON object. The same ledger also holds records of other
//! shapes, so decoding always goes through [`RecordMetadata`] and only the
//! `XGP_V1_SHARD` variant turns into a [`ShardRecord`].
//!
//! ## Wire Format
//!
//! ```text
//! { "schemaTag": "XGP_V1_SHARD", "groupId": "..", "prevRef": ".." | null, "payload": [u8, ..] }
//! { "schemaTag": "XGP_V1_BYTE_MAP", "byteMap": [u8; 256] }
//! ```
//!
//! ## Linkage
//!
//! A record learns its own [`RecordRef`] only after the ledger accepts it,
//! so each record points backwards at its predecessor through `prevRef`.
//! The first shard of a group has no predecessor.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::{Address, ByteMap};

/// Schema tag of a minted shard
pub const SHARD_SCHEMA: &str = "XGP_V1_SHARD";
/// Schema tag of a published byte map
pub const BYTE_MAP_SCHEMA: &str = "XGP_V1_BYTE_MAP";

/// Correlates every shard of one original payload
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        GroupId(id.into())
    }

    /// A fresh random group id
    pub fn generate() -> Self {
        GroupId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier the ledger assigns to a record once minted
///  (a transaction or genesis hash). Assumed globally unique.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordRef(String);

impl RecordRef {
    pub fn new(id: impl Into<String>) -> Self {
        RecordRef(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata of a minted shard, as stored on the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShardMetadata {
    pub group_id: GroupId,
    pub prev_ref: Option<RecordRef>,
    pub payload: Vec<u8>,
}

/// Metadata of a published byte map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByteMapMetadata {
    pub byte_map: ByteMap,
}

/// Every record shape this gateway knows how to read
///
/// Anything carrying a different `schemaTag` decodes to `Unknown`
///  and is ignored by discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "schemaTag")]
pub enum RecordMetadata {
    #[serde(rename = "XGP_V1_SHARD")]
    Shard(ShardMetadata),
    #[serde(rename = "XGP_V1_BYTE_MAP")]
    ByteMap(ByteMapMetadata),
    #[serde(other)]
    Unknown,
}

impl RecordMetadata {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// The `schemaTag` of a metadata blob, without decoding the rest of it
    pub fn schema_tag(raw: &str) -> Option<String> {
        #[derive(Deserialize)]
        struct Tagged {
            #[serde(rename = "schemaTag")]
            schema_tag: String,
        }
        serde_json::from_str::<Tagged>(raw)
            .ok()
            .map(|tagged| tagged.schema_tag)
    }

    /// Whether `schema` names a record shape this crate decodes
    pub fn is_known_schema(schema: &str) -> bool {
        schema == SHARD_SCHEMA || schema == BYTE_MAP_SCHEMA
    }
}

/// An item as returned by the ledger for one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    pub amount: u64,
    /// Undecoded metadata blob
    pub metadata: String,
    pub address: Address,
}

/// A minted shard together with its chain linkage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardRecord {
    pub group_id: GroupId,
    pub prev_ref: Option<RecordRef>,
    pub self_ref: RecordRef,
    pub payload: Vec<u8>,
    /// The address the record was discovered under
    pub owner: Address,
}

impl ShardRecord {
    pub fn from_metadata(self_ref: RecordRef, owner: Address, metadata: ShardMetadata) -> Self {
        Self {
            group_id: metadata.group_id,
            prev_ref: metadata.prev_ref,
            self_ref,
            payload: metadata.payload,
            owner,
        }
    }

    pub fn is_genesis(&self) -> bool {
        self.prev_ref.is_none()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_shard_wire_format() {
        let metadata = RecordMetadata::Shard(ShardMetadata {
            group_id: GroupId::new("file-1"),
            prev_ref: None,
            payload: vec![1, 2, 255],
        });

        let json: serde_json::Value = serde_json::from_str(&metadata.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "schemaTag": SHARD_SCHEMA,
                "groupId": "file-1",
                "prevRef": null,
                "payload": [1, 2, 255],
            })
        );
    }

    #[test]
    fn test_decode_linked_shard() {
        let raw = r#"{"schemaTag":"XGP_V1_SHARD","groupId":"g","prevRef":"r0","payload":[7,8]}"#;
        let metadata = RecordMetadata::from_json(raw).unwrap();

        let RecordMetadata::Shard(shard) = metadata else {
            panic!("expected shard metadata");
        };
        let record = ShardRecord::from_metadata(RecordRef::new("r1"), Address::from("a"), shard);
        assert_eq!(record.prev_ref, Some(RecordRef::new("r0")));
        assert_eq!(record.payload, vec![7, 8]);
        assert!(!record.is_genesis());
    }

    #[test]
    fn test_unknown_schema_decodes_as_unknown() {
        let raw = r#"{"schemaTag":"XGP_V1_IPFS_PINATA","ipfsHash":"Qm..","timestamp":"now"}"#;
        assert_eq!(RecordMetadata::from_json(raw).unwrap(), RecordMetadata::Unknown);
    }

    #[test]
    fn test_malformed_shard_is_an_error() {
        // payload byte out of range
        let raw = r#"{"schemaTag":"XGP_V1_SHARD","groupId":"g","prevRef":null,"payload":[256]}"#;
        assert!(RecordMetadata::from_json(raw).is_err());

        // no schema tag at all
        assert!(RecordMetadata::from_json(r#"{"groupId":"g"}"#).is_err());
        assert!(RecordMetadata::from_json("not json").is_err());
    }

    #[test]
    fn test_schema_tag_of_malformed_body() {
        let raw = r#"{"schemaTag":"XGP_V1_SHARD","groupId":7}"#;
        assert!(RecordMetadata::from_json(raw).is_err());
        assert_eq!(RecordMetadata::schema_tag(raw).as_deref(), Some(SHARD_SCHEMA));
        assert!(RecordMetadata::is_known_schema(SHARD_SCHEMA));
        assert!(!RecordMetadata::is_known_schema("XGP_V1_DYNAMODB"));

        assert_eq!(RecordMetadata::schema_tag("not json"), None);
        assert_eq!(RecordMetadata::schema_tag(r#"{"schemaTag":3}"#), None);
    }

    #[test]
    fn test_byte_map_record_roundtrip() {
        let map = ByteMap::derive(b"published").unwrap();
        let metadata = RecordMetadata::ByteMap(ByteMapMetadata {
            byte_map: map.clone(),
        });
        let decoded = RecordMetadata::from_json(&metadata.to_json().unwrap()).unwrap();
        assert_eq!(decoded, metadata);
    }
}
