//! The capabilities this layer consumes. Implementations live outside the
//! crate (a node runtime, a JSON-RPC endpoint, or [`crate::mock`] in tests).

use async_trait::async_trait;

use crate::error::TransportError;
use crate::types::{
    CallContractReply, CallContractRequest, FilterLogsReply, FilterLogsRequest,
    HeaderByNumberReply, HeaderByNumberRequest, HttpRequest, HttpResponse, Report, ReportRequest,
    WriteReportReply, WriteReportRequest,
};

/// Remote-call transport for one EVM chain.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so facades can hold them as
/// `Arc<dyn EvmClient>` and move them into pending results.
#[async_trait]
pub trait EvmClient: Send + Sync + 'static {
    /// The chain selector this client is bound to.
    fn chain_selector(&self) -> u64;

    /// Execute a read-only call against a contract.
    async fn call_contract(
        &self,
        req: CallContractRequest,
    ) -> Result<CallContractReply, TransportError>;

    /// Fetch a block header by number or tag.
    async fn header_by_number(
        &self,
        req: HeaderByNumberRequest,
    ) -> Result<HeaderByNumberReply, TransportError>;

    /// Query historical logs.
    async fn filter_logs(&self, req: FilterLogsRequest) -> Result<FilterLogsReply, TransportError>;

    /// Deliver a consensus report to a receiver contract.
    async fn write_report(&self, req: WriteReportRequest)
        -> Result<WriteReportReply, TransportError>;
}

/// Turns an encoded payload into a signed consensus report.
#[async_trait]
pub trait ReportGenerator: Send + Sync + 'static {
    async fn generate_report(&self, req: ReportRequest) -> Result<Report, TransportError>;
}

/// Outbound HTTP fetch.
#[async_trait]
pub trait HttpFetcher: Send + Sync + 'static {
    async fn send_request(&self, req: HttpRequest) -> Result<HttpResponse, TransportError>;
}
