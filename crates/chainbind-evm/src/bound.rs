//! A contract address bound to the chain transport that reaches it.
//!
//! Every generated facade delegates here, so block resolution, report
//! delivery, and log queries behave identically across bindings.

use alloy_primitives::{Address, Bytes, B256};
use chainbind_core::types::{
    CallContractRequest, CallMsg, FilterLogTriggerRequest, FilterLogsReply, FilterLogsRequest,
    FilterOptions, FilterQuery, GasConfig, HeaderByNumberRequest, Report, ReportRequest,
    WriteReportReply, WriteReportRequest,
};
use chainbind_core::{
    BlockTag, ConfidenceLevel, ContractError, DecodeError, EncodeError, EvmClient, Pending,
    ReportGenerator, TopicValues,
};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct BoundContract {
    address: Address,
    client: Arc<dyn EvmClient>,
}

impl BoundContract {
    pub fn new(client: Arc<dyn EvmClient>, address: Address) -> Self {
        Self { address, client }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn client(&self) -> &Arc<dyn EvmClient> {
        &self.client
    }

    /// The block a read should run at.
    ///
    /// An explicit tag resolves immediately. Without one, the finalized
    /// header is fetched and its number used.
    pub fn resolve_block(&self, block: Option<BlockTag>) -> Pending<BlockTag> {
        if let Some(tag) = block {
            return Pending::from_value(tag);
        }
        let client = self.client.clone();
        Pending::new(async move {
            let reply = client
                .header_by_number(HeaderByNumberRequest {
                    block_number: BlockTag::Finalized,
                })
                .await?;
            let number = reply
                .header
                .and_then(|h| h.block_number)
                .ok_or(ContractError::MissingHeader)?;
            Ok(BlockTag::Number(number))
        })
    }

    /// Issue a read-only call with `calldata` at `block` and return the raw
    /// reply bytes.
    pub fn call(&self, calldata: Bytes, block: Option<BlockTag>) -> Pending<Bytes> {
        let client = self.client.clone();
        let to = self.address;
        self.resolve_block(block).flat_map(move |block_number| {
            Pending::new(async move {
                debug!(
                    to = %to,
                    block = %block_number,
                    selector = %hex::encode(calldata.get(..4).unwrap_or_default()),
                    "call_contract"
                );
                let reply = client
                    .call_contract(CallContractRequest {
                        call: CallMsg {
                            from: None,
                            to,
                            data: calldata,
                        },
                        block_number,
                    })
                    .await?;
                Ok(reply.data)
            })
        })
    }

    /// Encode, call, and decode in one step. An encoding failure yields an
    /// already-failed result without touching the transport.
    pub fn read<T, F>(
        &self,
        calldata: Result<Bytes, EncodeError>,
        block: Option<BlockTag>,
        decode: F,
    ) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce(&[u8]) -> Result<T, DecodeError> + Send + 'static,
    {
        match calldata {
            Ok(calldata) => self.call(calldata, block).map(move |data| decode(&data)),
            Err(e) => Pending::from_error(e),
        }
    }

    /// Deliver an already-generated report to this contract.
    pub fn write_report(&self, report: Report, gas_config: Option<GasConfig>) -> Pending<WriteReportReply> {
        let client = self.client.clone();
        let receiver = self.address;
        Pending::new(async move {
            debug!(receiver = %receiver, bytes = report.raw_report.len(), "write_report");
            Ok(client
                .write_report(WriteReportRequest {
                    receiver,
                    report,
                    gas_config,
                })
                .await?)
        })
    }

    /// Turn `payload` into a consensus report, then deliver it here.
    pub fn write_payload(
        &self,
        reports: Arc<dyn ReportGenerator>,
        payload: Result<Bytes, EncodeError>,
        gas_config: Option<GasConfig>,
    ) -> Pending<WriteReportReply> {
        let payload = match payload {
            Ok(p) => p,
            Err(e) => return Pending::from_error(e),
        };
        let generated = Pending::new(async move {
            Ok(reports.generate_report(ReportRequest::evm(payload)).await?)
        });
        let this = self.clone();
        generated.flat_map(move |report| this.write_report(report, gas_config))
    }

    /// Query historical logs of this contract carrying `topic0`.
    pub fn filter_logs(&self, topic0: B256, options: Option<FilterOptions>) -> Pending<FilterLogsReply> {
        let options = options.unwrap_or_default();
        let client = self.client.clone();
        let query = FilterQuery {
            addresses: vec![self.address],
            topics: vec![TopicValues::exact(topic0)],
            block_hash: options.block_hash,
            from_block: options.from_block,
            to_block: options.to_block,
        };
        Pending::new(async move {
            Ok(client
                .filter_logs(FilterLogsRequest {
                    filter_query: query,
                })
                .await?)
        })
    }

    /// Trigger registration for logs of this contract matching `topics`.
    pub fn log_trigger_request(
        &self,
        topics: Vec<TopicValues>,
        confidence: ConfidenceLevel,
    ) -> FilterLogTriggerRequest {
        FilterLogTriggerRequest {
            chain_selector: self.client.chain_selector(),
            addresses: vec![self.address],
            topics,
            confidence,
        }
    }
}

impl fmt::Debug for BoundContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundContract")
            .field("address", &self.address)
            .field("chain_selector", &self.client.chain_selector())
            .finish()
    }
}
