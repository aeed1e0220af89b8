//! Bindings for the `BalanceReader` helper contract, which batches native
//! balance lookups into one call.

use alloy_primitives::{Address, Bytes, U256};
use chainbind_core::mock::MockEvmClient;
use chainbind_core::types::{GasConfig, Report, WriteReportReply};
use chainbind_core::{
    BlockTag, ContractError, DecodeError, DescriptorError, EncodeError, EvmClient, Pending,
    TransportError,
};
use chainbind_evm::mock::{register_method, MockFn};
use chainbind_evm::{
    unpack_error, AbiArgs, AbiCodec, BoundContract, DecodedError, DynSolValue, FieldReader,
    IntoAbiValue,
};
use std::sync::Arc;

pub const BALANCE_READER_ABI: &str = r#"[
  {"inputs":[{"internalType":"address[]","name":"addresses","type":"address[]"}],
   "name":"getNativeBalances",
   "outputs":[{"internalType":"uint256[]","name":"","type":"uint256[]"}],
   "stateMutability":"view","type":"function"},
  {"inputs":[],"name":"typeAndVersion",
   "outputs":[{"internalType":"string","name":"","type":"string"}],
   "stateMutability":"view","type":"function"}
]"#;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetNativeBalancesInput {
    pub addresses: Vec<Address>,
}

impl AbiArgs for GetNativeBalancesInput {
    fn to_args(&self) -> Vec<DynSolValue> {
        vec![self.addresses.to_abi_value()]
    }

    fn from_args(values: Vec<DynSolValue>) -> Result<Self, DecodeError> {
        let mut r = FieldReader::new(values);
        Ok(Self {
            addresses: r.next("addresses")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct BalanceReaderCodec {
    abi: AbiCodec,
}

impl BalanceReaderCodec {
    pub fn new() -> Result<Self, DescriptorError> {
        Ok(Self {
            abi: AbiCodec::from_json(BALANCE_READER_ABI)?,
        })
    }

    pub fn abi(&self) -> &AbiCodec {
        &self.abi
    }

    pub fn encode_get_native_balances_call(
        &self,
        input: &GetNativeBalancesInput,
    ) -> Result<Bytes, EncodeError> {
        self.abi.encode_call("getNativeBalances", input)
    }

    pub fn decode_get_native_balances_output(&self, data: &[u8]) -> Result<Vec<U256>, DecodeError> {
        self.abi.decode_output("getNativeBalances", data)
    }

    pub fn encode_type_and_version_call(&self) -> Result<Bytes, EncodeError> {
        self.abi.encode_call("typeAndVersion", &())
    }

    pub fn decode_type_and_version_output(&self, data: &[u8]) -> Result<String, DecodeError> {
        self.abi.decode_output("typeAndVersion", data)
    }
}

#[derive(Debug, Clone)]
pub struct BalanceReader {
    codec: BalanceReaderCodec,
    contract: BoundContract,
}

impl BalanceReader {
    pub fn new(client: Arc<dyn EvmClient>, address: Address) -> Result<Self, DescriptorError> {
        Ok(Self {
            codec: BalanceReaderCodec::new()?,
            contract: BoundContract::new(client, address),
        })
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    pub fn codec(&self) -> &BalanceReaderCodec {
        &self.codec
    }

    /// Native balances of `input.addresses`, in the same order.
    pub fn get_native_balances(
        &self,
        input: GetNativeBalancesInput,
        block: Option<BlockTag>,
    ) -> Pending<Vec<U256>> {
        let codec = self.codec.clone();
        self.contract.read(
            self.codec.encode_get_native_balances_call(&input),
            block,
            move |data| codec.decode_get_native_balances_output(data),
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
}

#[derive(Clone, Default)]
pub struct BalanceReaderMock {
    pub get_native_balances: Option<MockFn<GetNativeBalancesInput, Vec<U256>>>,
    pub type_and_version: Option<MockFn<(), String>>,
}

impl BalanceReaderMock {
    pub fn on_get_native_balances<F>(mut self, f: F) -> Self
    where
        F: Fn(GetNativeBalancesInput) -> Result<Vec<U256>, TransportError> + Send + Sync + 'static,
    {
        self.get_native_balances = Some(Arc::new(f));
        self
    }

    pub fn on_type_and_version<F>(mut self, f: F) -> Self
    where
        F: Fn(()) -> Result<String, TransportError> + Send + Sync + 'static,
    {
        self.type_and_version = Some(Arc::new(f));
        self
    }

    pub fn register(self, address: Address, client: &MockEvmClient) -> Result<(), DescriptorError> {
        let codec = BalanceReaderCodec::new()?;
        let abi = codec.abi();
        register_method(client, address, abi, "getNativeBalances", self.get_native_balances)?;
        register_method(client, address, abi, "typeAndVersion", self.type_and_version)?;
        Ok(())
    }
}
