//! Bindings for the `MessageEmitter` contract.

use alloy_primitives::{Address, Bytes, B256, U256};
use chainbind_core::mock::MockEvmClient;
use chainbind_core::types::{FilterLogsReply, FilterOptions, GasConfig, Report, WriteReportReply};
use chainbind_core::{
    BlockTag, ConfidenceLevel, ContractError, DecodeError, DescriptorError, EncodeError, EvmClient,
    Log, Pending, TopicValues, TransportError,
};
use chainbind_evm::mock::{register_method, MockFn};
use chainbind_evm::{
    unpack_error, AbiArgs, AbiCodec, BoundContract, DecodedError, DynSolValue, FieldReader,
    IntoAbiValue, LogAdapter, LogTrigger, TopicFilter,
};
use std::sync::Arc;

pub const MESSAGE_EMITTER_ABI: &str = r#"[
  {"anonymous":false,"inputs":[
    {"indexed":true,"internalType":"address","name":"emitter","type":"address"},
    {"indexed":true,"internalType":"uint256","name":"timestamp","type":"uint256"},
    {"indexed":false,"internalType":"string","name":"message","type":"string"}],
   "name":"MessageEmitted","type":"event"},
  {"inputs":[{"internalType":"string","name":"message","type":"string"}],
   "name":"emitMessage","outputs":[],"stateMutability":"nonpayable","type":"function"},
  {"inputs":[{"internalType":"address","name":"emitter","type":"address"}],
   "name":"getLastMessage","outputs":[{"internalType":"string","name":"","type":"string"}],
   "stateMutability":"view","type":"function"},
  {"inputs":[{"internalType":"address","name":"emitter","type":"address"},
             {"internalType":"uint256","name":"timestamp","type":"uint256"}],
   "name":"getMessage","outputs":[{"internalType":"string","name":"","type":"string"}],
   "stateMutability":"view","type":"function"},
  {"inputs":[],"name":"typeAndVersion",
   "outputs":[{"internalType":"string","name":"","type":"string"}],
   "stateMutability":"view","type":"function"}
]"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitMessageInput {
    pub message: String,
}

impl AbiArgs for EmitMessageInput {
    fn to_args(&self) -> Vec<DynSolValue> {
        vec![self.message.to_abi_value()]
    }

    fn from_args(values: Vec<DynSolValue>) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new(values);
        Ok(Self {
            message: r.next("message")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetLastMessageInput {
    pub emitter: Address,
}

impl AbiArgs for GetLastMessageInput {
    fn to_args(&self) -> Vec<DynSolValue> {
        vec![self.emitter.to_abi_value()]
    }

    fn from_args(values: Vec<DynSolValue>) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new(values);
        Ok(Self {
            emitter: r.next("emitter")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetMessageInput {
    pub emitter: Address,
    pub timestamp: U256,
}

impl AbiArgs for GetMessageInput {
    fn to_args(&self) -> Vec<DynSolValue> {
        vec![self.emitter.to_abi_value(), self.timestamp.to_abi_value()]
    }

    fn from_args(values: Vec<DynSolValue>) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new(values);
        Ok(Self {
            emitter: r.next("emitter")?,
            timestamp: r.next("timestamp")?,
        })
    }
}

/// One `MessageEmitted` filter record. `None` leaves the position open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageEmittedTopics {
    pub emitter: Option<Address>,
    pub timestamp: Option<U256>,
}

impl TopicFilter for MessageEmittedTopics {
    fn topic_args(&self) -> Vec<Option<DynSolValue>> {
        vec![
            self.emitter.as_ref().map(IntoAbiValue::to_abi_value),
            self.timestamp.as_ref().map(IntoAbiValue::to_abi_value),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEmittedDecoded {
    pub emitter: Address,
    pub timestamp: U256,
    pub message: String,
}

impl AbiArgs for MessageEmittedDecoded {
    fn to_args(&self) -> Vec<DynSolValue> {
        vec![
            self.emitter.to_abi_value(),
            self.timestamp.to_abi_value(),
            self.message.to_abi_value(),
        ]
    }

    fn from_args(values: Vec<DynSolValue>) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new(values);
        Ok(Self {
            emitter: r.next("emitter")?,
            timestamp: r.next("timestamp")?,
            message: r.next("message")?,
        })
    }
}

/// Pure encode/decode operations for `MessageEmitter`.
#[derive(Debug, Clone)]
pub struct MessageEmitterCodec {
    abi: AbiCodec,
    message_emitted: B256,
}

impl MessageEmitterCodec {
    pub fn new() -> Result<Self, DescriptorError> {
        let abi = AbiCodec::from_json(MESSAGE_EMITTER_ABI)?;
        let message_emitted = abi.require_event_topic("MessageEmitted")?;
        Ok(Self {
            abi,
            message_emitted,
        })
    }

    pub fn abi(&self) -> &AbiCodec {
        &self.abi
    }

    pub fn encode_emit_message_call(&self, input: &EmitMessageInput) -> Result<Bytes, EncodeError> {
        self.abi.encode_call("emitMessage", input)
    }

    pub fn encode_get_last_message_call(
        &self,
        input: &GetLastMessageInput,
    ) -> Result<Bytes, EncodeError> {
        self.abi.encode_call("getLastMessage", input)
    }

    pub fn decode_get_last_message_output(&self, data: &[u8]) -> Result<String, DecodeError> {
        self.abi.decode_output("getLastMessage", data)
    }

    pub fn encode_get_message_call(&self, input: &GetMessageInput) -> Result<Bytes, EncodeError> {
        self.abi.encode_call("getMessage", input)
    }

    pub fn decode_get_message_output(&self, data: &[u8]) -> Result<String, DecodeError> {
        self.abi.decode_output("getMessage", data)
    }

    pub fn encode_type_and_version_call(&self) -> Result<Bytes, EncodeError> {
        self.abi.encode_call("typeAndVersion", &())
    }

    pub fn decode_type_and_version_output(&self, data: &[u8]) -> Result<String, DecodeError> {
        self.abi.decode_output("typeAndVersion", data)
    }

    pub fn message_emitted_log_hash(&self) -> B256 {
        self.message_emitted
    }

    pub fn encode_message_emitted_topics(
        &self,
        filters: &[MessageEmittedTopics],
    ) -> Result<Vec<TopicValues>, EncodeError> {
        self.abi.encode_topics("MessageEmitted", filters)
    }

    pub fn decode_message_emitted(&self, log: &Log) -> Result<MessageEmittedDecoded, DecodeError> {
        self.abi.decode_event("MessageEmitted", log)
    }
}

/// Decodes delivered `MessageEmitted` logs.
#[derive(Debug, Clone)]
pub struct MessageEmittedAdapter {
    codec: MessageEmitterCodec,
}

impl LogAdapter for MessageEmittedAdapter {
    type Event = MessageEmittedDecoded;

    fn adapt(&self, log: &Log) -> Result<MessageEmittedDecoded, DecodeError> {
        self.codec.decode_message_emitted(log)
    }
}

pub type MessageEmittedTrigger = LogTrigger<MessageEmittedAdapter>;

/// A deployed `MessageEmitter` reachable through an EVM client.
#[derive(Debug, Clone)]
pub struct MessageEmitter {
    codec: MessageEmitterCodec,
    contract: BoundContract,
}

impl MessageEmitter {
    pub fn new(client: Arc<dyn EvmClient>, address: Address) -> Result<Self, DescriptorError> {
        Ok(Self {
            codec: MessageEmitterCodec::new()?,
            contract: BoundContract::new(client, address),
        })
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    pub fn codec(&self) -> &MessageEmitterCodec {
        &self.codec
    }

    pub fn get_last_message(
        &self,
        input: GetLastMessageInput,
        block: Option<BlockTag>,
    ) -> Pending<String> {
        let codec = self.codec.clone();
        self.contract.read(
            self.codec.encode_get_last_message_call(&input),
            block,
            move |data| codec.decode_get_last_message_output(data),
        )
    }

    pub fn get_message(&self, input: GetMessageInput, block: Option<BlockTag>) -> Pending<String> {
        let codec = self.codec.clone();
        self.contract.read(
            self.codec.encode_get_message_call(&input),
            block,
            move |data| codec.decode_get_message_output(data),
        )
    }

    pub fn type_and_version(&self, block: Option<BlockTag>) -> Pending<String> {
        let codec = self.codec.clone();
        self.contract.read(
            self.codec.encode_type_and_version_call(),
            block,
            move |data| codec.decode_type_and_version_output(data),
        )
    }

    pub fn write_report(&self, report: Report, gas_config: Option<GasConfig>) -> Pending<WriteReportReply> {
        self.contract.write_report(report, gas_config)
    }

    pub fn unpack_error(&self, data: &[u8]) -> Result<DecodedError, ContractError> {
        unpack_error(self.codec.abi().abi(), data)
    }

    pub fn log_trigger_message_emitted(
        &self,
        confidence: ConfidenceLevel,
        filters: &[MessageEmittedTopics],
    ) -> Result<MessageEmittedTrigger, EncodeError> {
        let topics = self.codec.encode_message_emitted_topics(filters)?;
        Ok(LogTrigger::new(
            self.contract.log_trigger_request(topics, confidence),
            MessageEmittedAdapter {
                codec: self.codec.clone(),
            },
        ))
    }

    pub fn filter_logs_message_emitted(&self, options: Option<FilterOptions>) -> Pending<FilterLogsReply> {
        self.contract
            .filter_logs(self.codec.message_emitted_log_hash(), options)
    }
}

/// Scripted `MessageEmitter` for [`MockEvmClient`]. Methods left unset fail
/// with "not mocked".
#[derive(Clone, Default)]
pub struct MessageEmitterMock {
    pub get_last_message: Option<MockFn<GetLastMessageInput, String>>,
    pub get_message: Option<MockFn<GetMessageInput, String>>,
    pub type_and_version: Option<MockFn<(), String>>,
}

impl MessageEmitterMock {
    pub fn on_get_last_message<F>(mut self, f: F) -> Self
    where
        F: Fn(GetLastMessageInput) -> Result<String, TransportError> + Send + Sync + 'static,
    {
        self.get_last_message = Some(Arc::new(f));
        self
    }

    pub fn on_get_message<F>(mut self, f: F) -> Self
    where
        F: Fn(GetMessageInput) -> Result<String, TransportError> + Send + Sync + 'static,
    {
        self.get_message = Some(Arc::new(f));
        self
    }

    pub fn on_type_and_version<F>(mut self, f: F) -> Self
    where
        F: Fn(()) -> Result<String, TransportError> + Send + Sync + 'static,
    {
        self.type_and_version = Some(Arc::new(f));
        self
    }

    /// Install the handlers on `client` for the contract at `address`.
    pub fn register(self, address: Address, client: &MockEvmClient) -> Result<(), DescriptorError> {
        let codec = MessageEmitterCodec::new()?;
        let abi = codec.abi();
        register_method(client, address, abi, "getLastMessage", self.get_last_message)?;
        register_method(client, address, abi, "getMessage", self.get_message)?;
        register_method(client, address, abi, "typeAndVersion", self.type_and_version)?;
        Ok(())
    }
}
