use serde::Deserialize;
use std::collections::BTreeMap;

/// `/_recovery`: index name to its shard recoveries.
pub type Recovery = BTreeMap<String, IndexRecovery>;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct IndexRecovery {
    pub shards: Vec<ShardRecovery>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShardRecovery {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub stage: String,
    pub primary: bool,
    pub start_time_in_millis: i64,
    pub total_time_in_millis: i64,
    pub source: RecoveryPeer,
    pub target: RecoveryPeer,
    pub index: IndexRecoveryState,
    pub translog: RecoveryTranslog,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecoveryPeer {
    pub id: String,
    pub host: String,
    pub transport_address: String,
    pub ip: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct IndexRecoveryState {
    pub size: RecoverySize,
    pub files: RecoveryFiles,
    pub total_time_in_millis: i64,
    pub source_throttle_time_in_millis: i64,
    pub target_throttle_time_in_millis: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecoverySize {
    pub total_in_bytes: i64,
    pub reused_in_bytes: i64,
    pub recovered_in_bytes: i64,
    pub percent: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecoveryFiles {
    pub total: i64,
    pub reused: i64,
    pub recovered: i64,
    pub percent: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecoveryTranslog {
    pub recovered: i64,
    pub total: i64,
    pub percent: String,
    pub total_on_start: i64,
    pub total_time_in_millis: i64,
}
