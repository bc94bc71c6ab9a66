//! snapshot/meta - meta.json snapshot metadata.
//!
//! Схема фиксированная (serde struct, без доступа к полям через untyped map):
//! - обязательные: ID, Size, Index, Term, Version;
//! - необязательные поля raft SnapshotMeta: Peers, Configuration, ConfigurationIndex;
//! - любое другое поле - ошибка декодирования.

use serde::{Deserialize, Deserializer, Serialize};

/// Metadata of one snapshot, decoded once from meta.json and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotMetadata {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Size")]
    pub size: i64,
    #[serde(rename = "Index")]
    pub index: u64,
    #[serde(rename = "Term")]
    pub term: u64,
    #[serde(rename = "Version")]
    pub version: i64,

    // Legacy peer list (base64 in JSON); accepted, not interpreted.
    #[serde(rename = "Peers", default, skip_serializing_if = "Option::is_none")]
    pub peers: Option<String>,
    #[serde(rename = "Configuration", default, skip_serializing_if = "Option::is_none")]
    pub configuration: Option<RaftConfiguration>,
    #[serde(rename = "ConfigurationIndex", default, skip_serializing_if = "Option::is_none")]
    pub configuration_index: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RaftConfiguration {
    // Go-кодировщик пишет nil-срез как null
    #[serde(rename = "Servers", default, deserialize_with = "null_as_empty")]
    pub servers: Vec<RaftServer>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<RaftServer>, D::Error> {
    Ok(Option::<Vec<RaftServer>>::deserialize(d)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RaftServer {
    #[serde(rename = "Suffrage")]
    pub suffrage: i64,
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Address")]
    pub address: String,
}

impl SnapshotMetadata {
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Number of servers in the embedded raft configuration, if any.
    pub fn server_count(&self) -> Option<usize> {
        self.configuration.as_ref().map(|c| c.servers.len())
    }
}
