//! Request and reply types exchanged with the external capabilities.
//!
//! These mirror the shapes the transport, trigger, and report capabilities
//! accept; they carry no behaviour beyond small conveniences.

use alloy_primitives::{Address, Bytes, B256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The ledger position a read is evaluated at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockTag {
    Latest,
    Safe,
    Finalized,
    Number(u64),
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockTag::Latest => write!(f, "latest"),
            BlockTag::Safe => write!(f, "safe"),
            BlockTag::Finalized => write!(f, "finalized"),
            BlockTag::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<u64> for BlockTag {
    fn from(n: u64) -> Self {
        BlockTag::Number(n)
    }
}

/// How settled the chain must be before a log is delivered to a trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    #[default]
    Latest,
    Safe,
    Finalized,
}

/// A read-only message call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallMsg {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContractRequest {
    pub call: CallMsg,
    pub block_number: BlockTag,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContractReply {
    pub data: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderByNumberRequest {
    pub block_number: BlockTag,
}

/// A block header. Only the fields this layer consumes are modelled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub block_number: Option<u64>,
    pub hash: B256,
    pub parent_hash: B256,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderByNumberReply {
    pub header: Option<Header>,
}

impl HeaderByNumberReply {
    /// Reply carrying a header at the given height.
    pub fn at(block_number: u64) -> Self {
        Self {
            header: Some(Header {
                block_number: Some(block_number),
                ..Header::default()
            }),
        }
    }
}

/// A raw event log as emitted by a contract.
///
/// `topics[0]` is the event's topic-0 hash; `topics[1..]` hold the indexed
/// fields; `data` holds the ABI-encoded non-indexed fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<B256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<B256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_index: Option<u32>,
    #[serde(default)]
    pub removed: bool,
}

impl Log {
    /// Returns topics[0], the event signature hash, if present.
    pub fn event_signature(&self) -> Option<&B256> {
        self.topics.first()
    }
}

/// A raw log together with the typed event decoded from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedLog<E> {
    pub log: Log,
    pub data: E,
}

/// Admissible values for one topic position. An empty list matches any value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicValues {
    pub values: Vec<B256>,
}

impl TopicValues {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn exact(value: B256) -> Self {
        Self {
            values: vec![value],
        }
    }

    /// Returns `true` if this position places no constraint on the log.
    pub fn is_wildcard(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns `true` if `topic` is admissible at this position.
    pub fn matches(&self, topic: Option<&B256>) -> bool {
        match topic {
            _ if self.is_wildcard() => true,
            Some(t) => self.values.contains(t),
            None => false,
        }
    }
}

/// Returns `true` if `log` satisfies every topic position of `filter`.
pub fn topics_match(filter: &[TopicValues], log: &Log) -> bool {
    filter
        .iter()
        .enumerate()
        .all(|(i, values)| values.matches(log.topics.get(i)))
}

/// Registration request for a log trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterLogTriggerRequest {
    pub chain_selector: u64,
    pub addresses: Vec<Address>,
    pub topics: Vec<TopicValues>,
    pub confidence: ConfidenceLevel,
}

/// Historical log query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterQuery {
    pub addresses: Vec<Address>,
    pub topics: Vec<TopicValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<B256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_block: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterLogsRequest {
    pub filter_query: FilterQuery,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterLogsReply {
    pub logs: Vec<Log>,
}

/// Block range options for a historical event query.
/// The default is unbounded with no block-hash pin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<B256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_block: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_block: Option<u64>,
}

/// Request for the consensus capability to sign an encoded payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub encoded_payload: Bytes,
    pub encoder_name: String,
    pub signing_algo: String,
    pub hashing_algo: String,
}

impl ReportRequest {
    /// An EVM report signed with ECDSA over a keccak256 digest.
    pub fn evm(encoded_payload: impl Into<Bytes>) -> Self {
        Self {
            encoded_payload: encoded_payload.into(),
            encoder_name: "evm".into(),
            signing_algo: "ecdsa".into(),
            hashing_algo: "keccak256".into(),
        }
    }
}

/// A consensus report ready to be delivered to a receiver contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub raw_report: Bytes,
    #[serde(default)]
    pub signatures: Vec<Bytes>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasConfig {
    pub gas_limit: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteReportRequest {
    pub receiver: Address,
    pub report: Report,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_config: Option<GasConfig>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    #[default]
    Success,
    Reverted,
    Fatal,
}

/// Write acknowledgment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteReportReply {
    pub tx_status: TxStatus,
    pub tx_hash: B256,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// An outbound HTTP request issued through the HTTP capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(default)]
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".into(),
            url: url.into(),
            headers: vec![],
            body: vec![],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_matches_anything() {
        assert!(TopicValues::any().matches(None));
        assert!(TopicValues::any().matches(Some(&B256::repeat_byte(1))));
    }

    #[test]
    fn exact_topic_matching() {
        let t = TopicValues::exact(B256::repeat_byte(1));
        assert!(t.matches(Some(&B256::repeat_byte(1))));
        assert!(!t.matches(Some(&B256::repeat_byte(2))));
        assert!(!t.matches(None));
    }

    #[test]
    fn filter_matches_log_topics() {
        let log = Log {
            topics: vec![B256::repeat_byte(0xaa), B256::repeat_byte(0xbb)],
            ..Log::default()
        };
        let filter = vec![TopicValues::exact(B256::repeat_byte(0xaa)), TopicValues::any()];
        assert!(topics_match(&filter, &log));
        let filter = vec![TopicValues::exact(B256::repeat_byte(0xbb))];
        assert!(!topics_match(&filter, &log));
    }

    #[test]
    fn block_tag_display() {
        assert_eq!(BlockTag::Finalized.to_string(), "finalized");
        assert_eq!(BlockTag::from(100).to_string(), "100");
    }
}
