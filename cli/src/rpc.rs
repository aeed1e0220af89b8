//! `EvmClient` over HTTP JSON-RPC, backed by `reqwest`.
//!
//! Reads map onto `eth_call`, `eth_getBlockByNumber` and `eth_getLogs`.
//! A plain node cannot sign consensus reports, so `write_report` is
//! unsupported.

use alloy_primitives::{Address, Bytes, B256, U64};
use async_trait::async_trait;
use chainbind_core::types::{
    CallContractReply, CallContractRequest, FilterLogsReply, FilterLogsRequest, FilterQuery,
    Header, HeaderByNumberReply, HeaderByNumberRequest, WriteReportReply, WriteReportRequest,
};
use chainbind_core::{BlockTag, EvmClient, Log, TopicValues, TransportError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: Vec<Value>,
    id: u64,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcHeader {
    number: Option<U64>,
    hash: B256,
    parent_hash: B256,
    timestamp: U64,
}

impl From<RpcHeader> for Header {
    fn from(h: RpcHeader) -> Self {
        Header {
            block_number: h.number.map(|n| n.to::<u64>()),
            hash: h.hash,
            parent_hash: h.parent_hash,
            timestamp: h.timestamp.to::<u64>(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcLog {
    address: Address,
    topics: Vec<B256>,
    data: Bytes,
    block_number: Option<U64>,
    block_hash: Option<B256>,
    transaction_hash: Option<B256>,
    log_index: Option<U64>,
    #[serde(default)]
    removed: bool,
}

impl TryFrom<RpcLog> for Log {
    type Error = TransportError;

    fn try_from(l: RpcLog) -> Result<Self, Self::Error> {
        let log_index = l
            .log_index
            .map(|n| {
                u32::try_from(n.to::<u64>()).map_err(|_| {
                    TransportError::Deserialization(format!("logIndex {n} exceeds u32"))
                })
            })
            .transpose()?;
        Ok(Log {
            address: l.address,
            topics: l.topics,
            data: l.data,
            block_number: l.block_number.map(|n| n.to::<u64>()),
            block_hash: l.block_hash,
            tx_hash: l.transaction_hash,
            log_index,
            removed: l.removed,
        })
    }
}

/// JSON-RPC transport for one chain.
pub struct JsonRpcEvmClient {
    url: String,
    chain_selector: u64,
    http: reqwest::Client,
    request_timeout: Duration,
    next_id: AtomicU64,
}

impl JsonRpcEvmClient {
    pub fn new(
        url: impl Into<String>,
        chain_selector: u64,
        request_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(Self {
            url: url.into(),
            chain_selector,
            http,
            request_timeout,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, TransportError> {
        let req = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };
        tracing::debug!(method, id = req.id, url = %self.url, "rpc request");

        let resp = self
            .http
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(method, status, url = %self.url, "rpc request rejected");
            return Err(TransportError::Http(format!("HTTP {status}: {body}")));
        }

        let resp: JsonRpcResponse = resp
            .json()
            .await
            .map_err(|e| TransportError::Deserialization(e.to_string()))?;
        if let Some(err) = resp.error {
            return Err(TransportError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        Ok(serde_json::from_value(resp.result.unwrap_or(Value::Null))?)
    }

    fn send_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                ms: self.request_timeout.as_millis() as u64,
            }
        } else {
            TransportError::Http(e.to_string())
        }
    }
}

#[async_trait]
impl EvmClient for JsonRpcEvmClient {
    fn chain_selector(&self) -> u64 {
        self.chain_selector
    }

    async fn call_contract(
        &self,
        req: CallContractRequest,
    ) -> Result<CallContractReply, TransportError> {
        let data: Bytes = self
            .request("eth_call", vec![json!(req.call), block_param(req.block_number)])
            .await?;
        Ok(CallContractReply { data })
    }

    async fn header_by_number(
        &self,
        req: HeaderByNumberRequest,
    ) -> Result<HeaderByNumberReply, TransportError> {
        let header: Option<RpcHeader> = self
            .request(
                "eth_getBlockByNumber",
                vec![block_param(req.block_number), Value::Bool(false)],
            )
            .await?;
        Ok(HeaderByNumberReply {
            header: header.map(Header::from),
        })
    }

    async fn filter_logs(&self, req: FilterLogsRequest) -> Result<FilterLogsReply, TransportError> {
        let logs: Vec<RpcLog> = self
            .request("eth_getLogs", vec![filter_param(&req.filter_query)])
            .await?;
        Ok(FilterLogsReply {
            logs: logs
                .into_iter()
                .map(Log::try_from)
                .collect::<Result<_, _>>()?,
        })
    }

    async fn write_report(
        &self,
        _req: WriteReportRequest,
    ) -> Result<WriteReportReply, TransportError> {
        Err(TransportError::Unsupported(
            "write_report requires a report-signing runtime".into(),
        ))
    }
}

fn block_param(tag: BlockTag) -> Value {
    match tag {
        BlockTag::Number(n) => Value::String(format!("{n:#x}")),
        other => Value::String(other.to_string()),
    }
}

fn topics_param(topics: &[TopicValues]) -> Value {
    Value::Array(
        topics
            .iter()
            .map(|t| match t.values.as_slice() {
                [] => Value::Null,
                [single] => json!(single),
                many => json!(many),
            })
            .collect(),
    )
}

fn filter_param(query: &FilterQuery) -> Value {
    let mut filter = serde_json::Map::new();
    filter.insert("address".into(), json!(query.addresses));
    filter.insert("topics".into(), topics_param(&query.topics));
    if let Some(hash) = query.block_hash {
        filter.insert("blockHash".into(), json!(hash));
    } else {
        if let Some(from) = query.from_block {
            filter.insert("fromBlock".into(), block_param(BlockTag::Number(from)));
        }
        if let Some(to) = query.to_block {
            filter.insert("toBlock".into(), block_param(BlockTag::Number(to)));
        }
    }
    Value::Object(filter)
}
