//! Bindings for the `ReserveManager` receiver contract.
//!
//! The contract accepts `UpdateReserves` reports through `onReport`; this
//! binding encodes the struct as a report payload and delivers it.

use alloy_primitives::{Address, Bytes, FixedBytes, B256, U256};
use chainbind_core::mock::MockEvmClient;
use chainbind_core::types::{FilterLogsReply, FilterOptions, GasConfig, Report, WriteReportReply};
use chainbind_core::{
    BlockTag, ConfidenceLevel, ContractError, DecodeError, DescriptorError, EncodeError, EvmClient,
    Log, Pending, ReportGenerator, TopicValues, TransportError,
};
use chainbind_evm::mock::{register_method, MockFn};
use chainbind_evm::value::kind;
use chainbind_evm::{
    unpack_error, AbiArgs, AbiCodec, BoundContract, DecodedError, DynSolValue, FieldReader,
    FromAbiValue, IntoAbiValue, LogAdapter, LogTrigger, TopicFilter,
};
use std::sync::Arc;

pub const RESERVE_MANAGER_ABI: &str = r#"[
  {"type":"function","name":"lastTotalMinted","inputs":[],
   "outputs":[{"name":"","type":"uint256","internalType":"uint256"}],"stateMutability":"view"},
  {"type":"function","name":"lastTotalReserve","inputs":[],
   "outputs":[{"name":"","type":"uint256","internalType":"uint256"}],"stateMutability":"view"},
  {"type":"function","name":"onReport",
   "inputs":[{"name":"","type":"bytes","internalType":"bytes"},
             {"name":"report","type":"bytes","internalType":"bytes"}],
   "outputs":[],"stateMutability":"nonpayable"},
  {"type":"function","name":"supportsInterface",
   "inputs":[{"name":"interfaceId","type":"bytes4","internalType":"bytes4"}],
   "outputs":[{"name":"","type":"bool","internalType":"bool"}],"stateMutability":"pure"},
  {"type":"event","name":"RequestReserveUpdate","anonymous":false,"inputs":[
    {"name":"u","type":"tuple","indexed":false,
     "internalType":"struct ReserveManager.UpdateReserves",
     "components":[
       {"name":"totalMinted","type":"uint256","internalType":"uint256"},
       {"name":"totalReserve","type":"uint256","internalType":"uint256"}]}]}
]"#;

/// ABI type of [`UpdateReserves`].
pub const UPDATE_RESERVES_TYPE: &str = "(uint256,uint256)";

/// The report payload accepted by `onReport`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReserves {
    pub total_minted: U256,
    pub total_reserve: U256,
}

impl IntoAbiValue for UpdateReserves {
    fn to_abi_value(&self) -> DynSolValue {
        DynSolValue::Tuple(vec![
            self.total_minted.to_abi_value(),
            self.total_reserve.to_abi_value(),
        ])
    }
}

impl FromAbiValue for UpdateReserves {
    fn from_abi_value(value: DynSolValue) -> Result<Self, DecodeError> {
        match value {
            DynSolValue::Tuple(fields) => {
                let mut r = FieldReader::new(fields);
                Ok(Self {
                    total_minted: r.next("totalMinted")?,
                    total_reserve: r.next("totalReserve")?,
                })
            }
            other => Err(DecodeError::shape("UpdateReserves tuple", kind(&other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnReportInput {
    pub metadata: Bytes,
    pub report: Bytes,
}

impl AbiArgs for OnReportInput {
    fn to_args(&self) -> Vec<DynSolValue> {
        vec![self.metadata.to_abi_value(), self.report.to_abi_value()]
    }

    fn from_args(values: Vec<DynSolValue>) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new(values);
        Ok(Self {
            metadata: r.next("metadata")?,
            report: r.next("report")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportsInterfaceInput {
    pub interface_id: FixedBytes<4>,
}

impl AbiArgs for SupportsInterfaceInput {
    fn to_args(&self) -> Vec<DynSolValue> {
        vec![self.interface_id.to_abi_value()]
    }

    fn from_args(values: Vec<DynSolValue>) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new(values);
        Ok(Self {
            interface_id: r.next("interfaceId")?,
        })
    }
}

/// `RequestReserveUpdate` has no indexed fields, so a filter record only
/// ever pins topic-0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestReserveUpdateTopics;

impl TopicFilter for RequestReserveUpdateTopics {
    fn topic_args(&self) -> Vec<Option<DynSolValue>> {
        Vec::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestReserveUpdateDecoded {
    pub u: UpdateReserves,
}

impl AbiArgs for RequestReserveUpdateDecoded {
    fn to_args(&self) -> Vec<DynSolValue> {
        vec![self.u.to_abi_value()]
    }

    fn from_args(values: Vec<DynSolValue>) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new(values);
        Ok(Self { u: r.next("u")? })
    }
}

#[derive(Debug, Clone)]
pub struct ReserveManagerCodec {
    abi: AbiCodec,
    request_reserve_update: B256,
}

impl ReserveManagerCodec {
    pub fn new() -> Result<Self, DescriptorError> {
        let abi = AbiCodec::from_json(RESERVE_MANAGER_ABI)?;
        Ok(Self {
            request_reserve_update: abi.require_event_topic("RequestReserveUpdate")?,
            abi,
        })
    }

    pub fn abi(&self) -> &AbiCodec {
        &self.abi
    }

    pub fn encode_last_total_minted_call(&self) -> Result<Bytes, EncodeError> {
        self.abi.encode_call("lastTotalMinted", &())
    }

    pub fn decode_last_total_minted_output(&self, data: &[u8]) -> Result<U256, DecodeError> {
        self.abi.decode_output("lastTotalMinted", data)
    }

    pub fn encode_last_total_reserve_call(&self) -> Result<Bytes, EncodeError> {
        self.abi.encode_call("lastTotalReserve", &())
    }

    pub fn decode_last_total_reserve_output(&self, data: &[u8]) -> Result<U256, DecodeError> {
        self.abi.decode_output("lastTotalReserve", data)
    }

    pub fn encode_on_report_call(&self, input: &OnReportInput) -> Result<Bytes, EncodeError> {
        self.abi.encode_call("onReport", input)
    }

    pub fn encode_supports_interface_call(
        &self,
        input: &SupportsInterfaceInput,
    ) -> Result<Bytes, EncodeError> {
        self.abi.encode_call("supportsInterface", input)
    }

    pub fn decode_supports_interface_output(&self, data: &[u8]) -> Result<bool, DecodeError> {
        self.abi.decode_output("supportsInterface", data)
    }

    /// `abi.encode(UpdateReserves)`, the payload `onReport` expects.
    pub fn encode_update_reserves_struct(&self, input: &UpdateReserves) -> Result<Bytes, EncodeError> {
        self.abi.encode_struct(UPDATE_RESERVES_TYPE, input)
    }

    pub fn request_reserve_update_log_hash(&self) -> B256 {
        self.request_reserve_update
    }

    pub fn encode_request_reserve_update_topics(
        &self,
        filters: &[RequestReserveUpdateTopics],
    ) -> Result<Vec<TopicValues>, EncodeError> {
        self.abi.encode_topics("RequestReserveUpdate", filters)
    }

    pub fn decode_request_reserve_update(
        &self,
        log: &Log,
    ) -> Result<RequestReserveUpdateDecoded, DecodeError> {
        self.abi.decode_event("RequestReserveUpdate", log)
    }
}

#[derive(Debug, Clone)]
pub struct RequestReserveUpdateAdapter {
    codec: ReserveManagerCodec,
}

impl LogAdapter for RequestReserveUpdateAdapter {
    type Event = RequestReserveUpdateDecoded;

    fn adapt(&self, log: &Log) -> Result<RequestReserveUpdateDecoded, DecodeError> {
        self.codec.decode_request_reserve_update(log)
    }
}

pub type RequestReserveUpdateTrigger = LogTrigger<RequestReserveUpdateAdapter>;

#[derive(Debug, Clone)]
pub struct ReserveManager {
    codec: ReserveManagerCodec,
    contract: BoundContract,
}

impl ReserveManager {
    pub fn new(client: Arc<dyn EvmClient>, address: Address) -> Result<Self, DescriptorError> {
        Ok(Self {
            codec: ReserveManagerCodec::new()?,
            contract: BoundContract::new(client, address),
        })
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    pub fn codec(&self) -> &ReserveManagerCodec {
        &self.codec
    }

    pub fn last_total_minted(&self, block: Option<BlockTag>) -> Pending<U256> {
        let codec = self.codec.clone();
        self.contract.read(
            self.codec.encode_last_total_minted_call(),
            block,
            move |data| codec.decode_last_total_minted_output(data),
        )
    }

    pub fn last_total_reserve(&self, block: Option<BlockTag>) -> Pending<U256> {
        let codec = self.codec.clone();
        self.contract.read(
            self.codec.encode_last_total_reserve_call(),
            block,
            move |data| codec.decode_last_total_reserve_output(data),
        )
    }

    pub fn supports_interface(
        &self,
        input: SupportsInterfaceInput,
        block: Option<BlockTag>,
    ) -> Pending<bool> {
        let codec = self.codec.clone();
        self.contract.read(
            self.codec.encode_supports_interface_call(&input),
            block,
            move |data| codec.decode_supports_interface_output(data),
        )
    }

    /// Encode `input`, have it signed into a report, and deliver it here.
    pub fn write_report_from_update_reserves(
        &self,
        reports: Arc<dyn ReportGenerator>,
        input: &UpdateReserves,
        gas_config: Option<GasConfig>,
    ) -> Pending<WriteReportReply> {
        self.contract.write_payload(
            reports,
            self.codec.encode_update_reserves_struct(input),
            gas_config,
        )
    }

    pub fn write_report(&self, report: Report, gas_config: Option<GasConfig>) -> Pending<WriteReportReply> {
        self.contract.write_report(report, gas_config)
    }

    pub fn unpack_error(&self, data: &[u8]) -> Result<DecodedError, ContractError> {
        unpack_error(self.codec.abi().abi(), data)
    }

    pub fn log_trigger_request_reserve_update(
        &self,
        confidence: ConfidenceLevel,
        filters: &[RequestReserveUpdateTopics],
    ) -> Result<RequestReserveUpdateTrigger, EncodeError> {
        let topics = self.codec.encode_request_reserve_update_topics(filters)?;
        Ok(LogTrigger::new(
            self.contract.log_trigger_request(topics, confidence),
            RequestReserveUpdateAdapter {
                codec: self.codec.clone(),
            },
        ))
    }

    pub fn filter_logs_request_reserve_update(
        &self,
        options: Option<FilterOptions>,
    ) -> Pending<FilterLogsReply> {
        self.contract
            .filter_logs(self.codec.request_reserve_update_log_hash(), options)
    }
}

#[derive(Clone, Default)]
pub struct ReserveManagerMock {
    pub last_total_minted: Option<MockFn<(), U256>>,
    pub last_total_reserve: Option<MockFn<(), U256>>,
    pub supports_interface: Option<MockFn<SupportsInterfaceInput, bool>>,
}

impl ReserveManagerMock {
    pub fn on_last_total_minted<F>(mut self, f: F) -> Self
    where
        F: Fn(()) -> Result<U256, TransportError> + Send + Sync + 'static,
    {
        self.last_total_minted = Some(Arc::new(f));
        self
    }

    pub fn on_last_total_reserve<F>(mut self, f: F) -> Self
    where
        F: Fn(()) -> Result<U256, TransportError> + Send + Sync + 'static,
    {
        self.last_total_reserve = Some(Arc::new(f));
        self
    }

    pub fn on_supports_interface<F>(mut self, f: F) -> Self
    where
        F: Fn(SupportsInterfaceInput) -> Result<bool, TransportError> + Send + Sync + 'static,
    {
        self.supports_interface = Some(Arc::new(f));
        self
    }

    pub fn register(self, address: Address, client: &MockEvmClient) -> Result<(), DescriptorError> {
        let codec = ReserveManagerCodec::new()?;
        let abi = codec.abi();
        register_method(client, address, abi, "lastTotalMinted", self.last_total_minted)?;
        register_method(client, address, abi, "lastTotalReserve", self.last_total_reserve)?;
        register_method(client, address, abi, "supportsInterface", self.supports_interface)?;
        Ok(())
    }
}
