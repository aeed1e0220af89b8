//! In-memory transport for tests.
//!
//! [`MockEvmClient`] dispatches `call_contract` to handlers registered per
//! (contract address, 4-byte selector) and records every request it sees, so
//! tests can assert both results and the exact calls issued.

use alloy_primitives::{Address, Bytes};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::capability::{EvmClient, ReportGenerator};
use crate::error::TransportError;
use crate::types::{
    topics_match, CallContractReply, CallContractRequest, FilterLogsReply, FilterLogsRequest,
    HeaderByNumberReply, HeaderByNumberRequest, Log, Report, ReportRequest, WriteReportReply,
    WriteReportRequest,
};

/// Handles the argument bytes of one contract method (selector stripped) and
/// returns the ABI-encoded output.
pub type CallHandler = Arc<dyn Fn(&[u8]) -> Result<Vec<u8>, TransportError> + Send + Sync>;
type HeaderHandler =
    Arc<dyn Fn(&HeaderByNumberRequest) -> Result<HeaderByNumberReply, TransportError> + Send + Sync>;
type WriteHandler =
    Arc<dyn Fn(&WriteReportRequest) -> Result<WriteReportReply, TransportError> + Send + Sync>;

#[derive(Default)]
struct MockState {
    handlers: HashMap<(Address, [u8; 4]), CallHandler>,
    header: Option<HeaderHandler>,
    write_report: Option<WriteHandler>,
    logs: Vec<Log>,
    finalized_block: u64,
    calls: Vec<CallContractRequest>,
    header_requests: Vec<HeaderByNumberRequest>,
    writes: Vec<WriteReportRequest>,
}

/// A scriptable [`EvmClient`].
pub struct MockEvmClient {
    chain_selector: u64,
    state: Mutex<MockState>,
}

impl MockEvmClient {
    pub fn new(chain_selector: u64) -> Arc<Self> {
        Arc::new(Self {
            chain_selector,
            state: Mutex::new(MockState::default()),
        })
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Route calls to `address` whose payload starts with `selector`.
    pub fn add_contract_handler<F>(&self, address: Address, selector: [u8; 4], handler: F)
    where
        F: Fn(&[u8]) -> Result<Vec<u8>, TransportError> + Send + Sync + 'static,
    {
        self.state()
            .handlers
            .insert((address, selector), Arc::new(handler));
    }

    /// Height reported for the default finalized-header reply.
    pub fn set_finalized_block(&self, number: u64) {
        self.state().finalized_block = number;
    }

    /// Override header replies entirely.
    pub fn on_header<F>(&self, f: F)
    where
        F: Fn(&HeaderByNumberRequest) -> Result<HeaderByNumberReply, TransportError>
            + Send
            + Sync
            + 'static,
    {
        self.state().header = Some(Arc::new(f));
    }

    pub fn on_write_report<F>(&self, f: F)
    where
        F: Fn(&WriteReportRequest) -> Result<WriteReportReply, TransportError>
            + Send
            + Sync
            + 'static,
    {
        self.state().write_report = Some(Arc::new(f));
    }

    /// Logs served by `filter_logs`, matched against the query's address and
    /// topic constraints.
    pub fn push_log(&self, log: Log) {
        self.state().logs.push(log);
    }

    pub fn calls(&self) -> Vec<CallContractRequest> {
        self.state().calls.clone()
    }

    pub fn header_requests(&self) -> Vec<HeaderByNumberRequest> {
        self.state().header_requests.clone()
    }

    pub fn writes(&self) -> Vec<WriteReportRequest> {
        self.state().writes.clone()
    }
}

#[async_trait]
impl EvmClient for MockEvmClient {
    fn chain_selector(&self) -> u64 {
        self.chain_selector
    }

    async fn call_contract(
        &self,
        req: CallContractRequest,
    ) -> Result<CallContractReply, TransportError> {
        let data = req.call.data.clone();
        let to = req.call.to;
        let handler = {
            let mut state = self.state();
            state.calls.push(req);
            let selector: Option<[u8; 4]> = data.get(..4).and_then(|s| s.try_into().ok());
            selector.and_then(|sel| state.handlers.get(&(to, sel)).cloned())
        };
        let Some(handler) = handler else {
            let selector = hex::encode(data.get(..4).unwrap_or(&[]));
            warn!(chain = self.chain_selector, to = %to, selector = %selector, "no mock handler");
            return Err(TransportError::NotMocked {
                target: format!("{to:#x} with calldata 0x{selector}"),
            });
        };
        debug!(chain = self.chain_selector, to = %to, len = data.len(), "mock call dispatched");
        let out = handler(&data[4..])?;
        Ok(CallContractReply {
            data: Bytes::from(out),
        })
    }

    async fn header_by_number(
        &self,
        req: HeaderByNumberRequest,
    ) -> Result<HeaderByNumberReply, TransportError> {
        let (handler, finalized) = {
            let mut state = self.state();
            state.header_requests.push(req.clone());
            (state.header.clone(), state.finalized_block)
        };
        match handler {
            Some(h) => h(&req),
            None => Ok(HeaderByNumberReply::at(finalized)),
        }
    }

    async fn filter_logs(&self, req: FilterLogsRequest) -> Result<FilterLogsReply, TransportError> {
        let query = req.filter_query;
        let logs = self
            .state()
            .logs
            .iter()
            .filter(|log| query.addresses.is_empty() || query.addresses.contains(&log.address))
            .filter(|log| topics_match(&query.topics, log))
            .filter(|log| match (log.block_number, query.from_block) {
                (Some(n), Some(from)) => n >= from,
                _ => true,
            })
            .filter(|log| match (log.block_number, query.to_block) {
                (Some(n), Some(to)) => n <= to,
                _ => true,
            })
            .cloned()
            .collect();
        Ok(FilterLogsReply { logs })
    }

    async fn write_report(
        &self,
        req: WriteReportRequest,
    ) -> Result<WriteReportReply, TransportError> {
        let handler = {
            let mut state = self.state();
            state.writes.push(req.clone());
            state.write_report.clone()
        };
        debug!(chain = self.chain_selector, receiver = %req.receiver, "mock write_report");
        match handler {
            Some(h) => h(&req),
            None => Err(TransportError::NotMocked {
                target: "write_report".into(),
            }),
        }
    }
}

/// Report generator that wraps the payload unsigned.
#[derive(Debug, Default, Clone)]
pub struct MockReportGenerator;

#[async_trait]
impl ReportGenerator for MockReportGenerator {
    async fn generate_report(&self, req: ReportRequest) -> Result<Report, TransportError> {
        Ok(Report {
            raw_report: req.encoded_payload,
            signatures: vec![],
        })
    }
}
