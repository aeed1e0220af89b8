//! Bindings for the `IERC20` token interface.
//!
//! View methods get typed reads. State-changing methods only get encoders:
//! writes reach the chain through consensus reports, not transactions.

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

pub const IERC20_ABI: &str = r#"[
  {"anonymous":false,"inputs":[
    {"indexed":true,"internalType":"address","name":"owner","type":"address"},
    {"indexed":true,"internalType":"address","name":"spender","type":"address"},
    {"indexed":false,"internalType":"uint256","name":"value","type":"uint256"}],
   "name":"Approval","type":"event"},
  {"anonymous":false,"inputs":[
    {"indexed":true,"internalType":"address","name":"from","type":"address"},
    {"indexed":true,"internalType":"address","name":"to","type":"address"},
    {"indexed":false,"internalType":"uint256","name":"value","type":"uint256"}],
   "name":"Transfer","type":"event"},
  {"inputs":[{"internalType":"address","name":"owner","type":"address"},
             {"internalType":"address","name":"spender","type":"address"}],
   "name":"allowance","outputs":[{"internalType":"uint256","name":"","type":"uint256"}],
   "stateMutability":"view","type":"function"},
  {"inputs":[{"internalType":"address","name":"spender","type":"address"},
             {"internalType":"uint256","name":"amount","type":"uint256"}],
   "name":"approve","outputs":[{"internalType":"bool","name":"","type":"bool"}],
   "stateMutability":"nonpayable","type":"function"},
  {"inputs":[{"internalType":"address","name":"account","type":"address"}],
   "name":"balanceOf","outputs":[{"internalType":"uint256","name":"","type":"uint256"}],
   "stateMutability":"view","type":"function"},
  {"inputs":[],"name":"totalSupply",
   "outputs":[{"internalType":"uint256","name":"","type":"uint256"}],
   "stateMutability":"view","type":"function"},
  {"inputs":[{"internalType":"address","name":"recipient","type":"address"},
             {"internalType":"uint256","name":"amount","type":"uint256"}],
   "name":"transfer","outputs":[{"internalType":"bool","name":"","type":"bool"}],
   "stateMutability":"nonpayable","type":"function"},
  {"inputs":[{"internalType":"address","name":"sender","type":"address"},
             {"internalType":"address","name":"recipient","type":"address"},
             {"internalType":"uint256","name":"amount","type":"uint256"}],
   "name":"transferFrom","outputs":[{"internalType":"bool","name":"","type":"bool"}],
   "stateMutability":"nonpayable","type":"function"}
]"#;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowanceInput {
    pub owner: Address,
    pub spender: Address,
}

impl AbiArgs for AllowanceInput {
    fn to_args(&self) -> Vec<DynSolValue> {
        vec![self.owner.to_abi_value(), self.spender.to_abi_value()]
    }

    fn from_args(values: Vec<DynSolValue>) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new(values);
        Ok(Self {
            owner: r.next("owner")?,
            spender: r.next("spender")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproveInput {
    pub spender: Address,
    pub amount: U256,
}

impl AbiArgs for ApproveInput {
    fn to_args(&self) -> Vec<DynSolValue> {
        vec![self.spender.to_abi_value(), self.amount.to_abi_value()]
    }

    fn from_args(values: Vec<DynSolValue>) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new(values);
        Ok(Self {
            spender: r.next("spender")?,
            amount: r.next("amount")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceOfInput {
    pub account: Address,
}

impl AbiArgs for BalanceOfInput {
    fn to_args(&self) -> Vec<DynSolValue> {
        vec![self.account.to_abi_value()]
    }

    fn from_args(values: Vec<DynSolValue>) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new(values);
        Ok(Self {
            account: r.next("account")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferInput {
    pub recipient: Address,
    pub amount: U256,
}

impl AbiArgs for TransferInput {
    fn to_args(&self) -> Vec<DynSolValue> {
        vec![self.recipient.to_abi_value(), self.amount.to_abi_value()]
    }

    fn from_args(values: Vec<DynSolValue>) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new(values);
        Ok(Self {
            recipient: r.next("recipient")?,
            amount: r.next("amount")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferFromInput {
    pub sender: Address,
    pub recipient: Address,
    pub amount: U256,
}

impl AbiArgs for TransferFromInput {
    fn to_args(&self) -> Vec<DynSolValue> {
        vec![
            self.sender.to_abi_value(),
            self.recipient.to_abi_value(),
            self.amount.to_abi_value(),
        ]
    }

    fn from_args(values: Vec<DynSolValue>) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new(values);
        Ok(Self {
            sender: r.next("sender")?,
            recipient: r.next("recipient")?,
            amount: r.next("amount")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovalTopics {
    pub owner: Option<Address>,
    pub spender: Option<Address>,
}

impl TopicFilter for ApprovalTopics {
    fn topic_args(&self) -> Vec<Option<DynSolValue>> {
        vec![
            self.owner.as_ref().map(IntoAbiValue::to_abi_value),
            self.spender.as_ref().map(IntoAbiValue::to_abi_value),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalDecoded {
    pub owner: Address,
    pub spender: Address,
    pub value: U256,
}

impl AbiArgs for ApprovalDecoded {
    fn to_args(&self) -> Vec<DynSolValue> {
        vec![
            self.owner.to_abi_value(),
            self.spender.to_abi_value(),
            self.value.to_abi_value(),
        ]
    }

    fn from_args(values: Vec<DynSolValue>) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new(values);
        Ok(Self {
            owner: r.next("owner")?,
            spender: r.next("spender")?,
            value: r.next("value")?,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferTopics {
    pub from: Option<Address>,
    pub to: Option<Address>,
}

impl TopicFilter for TransferTopics {
    fn topic_args(&self) -> Vec<Option<DynSolValue>> {
        vec![
            self.from.as_ref().map(IntoAbiValue::to_abi_value),
            self.to.as_ref().map(IntoAbiValue::to_abi_value),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferDecoded {
    pub from: Address,
    pub to: Address,
    pub value: U256,
}

impl AbiArgs for TransferDecoded {
    fn to_args(&self) -> Vec<DynSolValue> {
        vec![
            self.from.to_abi_value(),
            self.to.to_abi_value(),
            self.value.to_abi_value(),
        ]
    }

    fn from_args(values: Vec<DynSolValue>) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new(values);
        Ok(Self {
            from: r.next("from")?,
            to: r.next("to")?,
            value: r.next("value")?,
        })
    }
}

/// Pure encode/decode operations for `IERC20`.
#[derive(Debug, Clone)]
pub struct Ierc20Codec {
    abi: AbiCodec,
    approval: B256,
    transfer: B256,
}

impl Ierc20Codec {
    pub fn new() -> Result<Self, DescriptorError> {
        let abi = AbiCodec::from_json(IERC20_ABI)?;
        Ok(Self {
            approval: abi.require_event_topic("Approval")?,
            transfer: abi.require_event_topic("Transfer")?,
            abi,
        })
    }

    pub fn abi(&self) -> &AbiCodec {
        &self.abi
    }

    pub fn encode_allowance_call(&self, input: &AllowanceInput) -> Result<Bytes, EncodeError> {
        self.abi.encode_call("allowance", input)
    }

    pub fn decode_allowance_output(&self, data: &[u8]) -> Result<U256, DecodeError> {
        self.abi.decode_output("allowance", data)
    }

    pub fn encode_approve_call(&self, input: &ApproveInput) -> Result<Bytes, EncodeError> {
        self.abi.encode_call("approve", input)
    }

    pub fn decode_approve_output(&self, data: &[u8]) -> Result<bool, DecodeError> {
        self.abi.decode_output("approve", data)
    }

    pub fn encode_balance_of_call(&self, input: &BalanceOfInput) -> Result<Bytes, EncodeError> {
        self.abi.encode_call("balanceOf", input)
    }

    pub fn decode_balance_of_output(&self, data: &[u8]) -> Result<U256, DecodeError> {
        self.abi.decode_output("balanceOf", data)
    }

    pub fn encode_total_supply_call(&self) -> Result<Bytes, EncodeError> {
        self.abi.encode_call("totalSupply", &())
    }

    pub fn decode_total_supply_output(&self, data: &[u8]) -> Result<U256, DecodeError> {
        self.abi.decode_output("totalSupply", data)
    }

    pub fn encode_transfer_call(&self, input: &TransferInput) -> Result<Bytes, EncodeError> {
        self.abi.encode_call("transfer", input)
    }

    pub fn decode_transfer_output(&self, data: &[u8]) -> Result<bool, DecodeError> {
        self.abi.decode_output("transfer", data)
    }

    pub fn encode_transfer_from_call(&self, input: &TransferFromInput) -> Result<Bytes, EncodeError> {
        self.abi.encode_call("transferFrom", input)
    }

    pub fn decode_transfer_from_output(&self, data: &[u8]) -> Result<bool, DecodeError> {
        self.abi.decode_output("transferFrom", data)
    }

    pub fn approval_log_hash(&self) -> B256 {
        self.approval
    }

    pub fn encode_approval_topics(
        &self,
        filters: &[ApprovalTopics],
    ) -> Result<Vec<TopicValues>, EncodeError> {
        self.abi.encode_topics("Approval", filters)
    }

    pub fn decode_approval(&self, log: &Log) -> Result<ApprovalDecoded, DecodeError> {
        self.abi.decode_event("Approval", log)
    }

    pub fn transfer_log_hash(&self) -> B256 {
        self.transfer
    }

    pub fn encode_transfer_topics(
        &self,
        filters: &[TransferTopics],
    ) -> Result<Vec<TopicValues>, EncodeError> {
        self.abi.encode_topics("Transfer", filters)
    }

    pub fn decode_transfer(&self, log: &Log) -> Result<TransferDecoded, DecodeError> {
        self.abi.decode_event("Transfer", log)
    }
}

#[derive(Debug, Clone)]
pub struct ApprovalAdapter {
    codec: Ierc20Codec,
}

impl LogAdapter for ApprovalAdapter {
    type Event = ApprovalDecoded;

    fn adapt(&self, log: &Log) -> Result<ApprovalDecoded, DecodeError> {
        self.codec.decode_approval(log)
    }
}

pub type ApprovalTrigger = LogTrigger<ApprovalAdapter>;

#[derive(Debug, Clone)]
pub struct TransferAdapter {
    codec: Ierc20Codec,
}

impl LogAdapter for TransferAdapter {
    type Event = TransferDecoded;

    fn adapt(&self, log: &Log) -> Result<TransferDecoded, DecodeError> {
        self.codec.decode_transfer(log)
    }
}

pub type TransferTrigger = LogTrigger<TransferAdapter>;

/// A deployed ERC-20 token reachable through an EVM client.
#[derive(Debug, Clone)]
pub struct Ierc20 {
    codec: Ierc20Codec,
    contract: BoundContract,
}

impl Ierc20 {
    pub fn new(client: Arc<dyn EvmClient>, address: Address) -> Result<Self, DescriptorError> {
        Ok(Self {
            codec: Ierc20Codec::new()?,
            contract: BoundContract::new(client, address),
        })
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    pub fn codec(&self) -> &Ierc20Codec {
        &self.codec
    }

    pub fn allowance(&self, input: AllowanceInput, block: Option<BlockTag>) -> Pending<U256> {
        let codec = self.codec.clone();
        self.contract.read(
            self.codec.encode_allowance_call(&input),
            block,
            move |data| codec.decode_allowance_output(data),
        )
    }

    pub fn balance_of(&self, input: BalanceOfInput, block: Option<BlockTag>) -> Pending<U256> {
        let codec = self.codec.clone();
        self.contract.read(
            self.codec.encode_balance_of_call(&input),
            block,
            move |data| codec.decode_balance_of_output(data),
        )
    }

    pub fn total_supply(&self, block: Option<BlockTag>) -> Pending<U256> {
        let codec = self.codec.clone();
        self.contract.read(
            self.codec.encode_total_supply_call(),
            block,
            move |data| codec.decode_total_supply_output(data),
        )
    }

    pub fn write_report(&self, report: Report, gas_config: Option<GasConfig>) -> Pending<WriteReportReply> {
        self.contract.write_report(report, gas_config)
    }

    pub fn unpack_error(&self, data: &[u8]) -> Result<DecodedError, ContractError> {
        unpack_error(self.codec.abi().abi(), data)
    }

    pub fn log_trigger_approval(
        &self,
        confidence: ConfidenceLevel,
        filters: &[ApprovalTopics],
    ) -> Result<ApprovalTrigger, EncodeError> {
        let topics = self.codec.encode_approval_topics(filters)?;
        Ok(LogTrigger::new(
            self.contract.log_trigger_request(topics, confidence),
            ApprovalAdapter {
                codec: self.codec.clone(),
            },
        ))
    }

    pub fn filter_logs_approval(&self, options: Option<FilterOptions>) -> Pending<FilterLogsReply> {
        self.contract.filter_logs(self.codec.approval_log_hash(), options)
    }

    pub fn log_trigger_transfer(
        &self,
        confidence: ConfidenceLevel,
        filters: &[TransferTopics],
    ) -> Result<TransferTrigger, EncodeError> {
        let topics = self.codec.encode_transfer_topics(filters)?;
        Ok(LogTrigger::new(
            self.contract.log_trigger_request(topics, confidence),
            TransferAdapter {
                codec: self.codec.clone(),
            },
        ))
    }

    pub fn filter_logs_transfer(&self, options: Option<FilterOptions>) -> Pending<FilterLogsReply> {
        self.contract.filter_logs(self.codec.transfer_log_hash(), options)
    }
}

/// Scripted `IERC20` for [`MockEvmClient`].
#[derive(Clone, Default)]
pub struct Ierc20Mock {
    pub allowance: Option<MockFn<AllowanceInput, U256>>,
    pub balance_of: Option<MockFn<BalanceOfInput, U256>>,
    pub total_supply: Option<MockFn<(), U256>>,
}

impl Ierc20Mock {
    pub fn on_allowance<F>(mut self, f: F) -> Self
    where
        F: Fn(AllowanceInput) -> Result<U256, TransportError> + Send + Sync + 'static,
    {
        self.allowance = Some(Arc::new(f));
        self
    }

    pub fn on_balance_of<F>(mut self, f: F) -> Self
    where
        F: Fn(BalanceOfInput) -> Result<U256, TransportError> + Send + Sync + 'static,
    {
        self.balance_of = Some(Arc::new(f));
        self
    }

    pub fn on_total_supply<F>(mut self, f: F) -> Self
    where
        F: Fn(()) -> Result<U256, TransportError> + Send + Sync + 'static,
    {
        self.total_supply = Some(Arc::new(f));
        self
    }

    pub fn register(self, address: Address, client: &MockEvmClient) -> Result<(), DescriptorError> {
        let codec = Ierc20Codec::new()?;
        let abi = codec.abi();
        register_method(client, address, abi, "allowance", self.allowance)?;
        register_method(client, address, abi, "balanceOf", self.balance_of)?;
        register_method(client, address, abi, "totalSupply", self.total_supply)?;
        Ok(())
    }
}
