//! ABI codec for one contract: call payloads, outputs, events, and struct
//! payloads for consensus reports.
//!
//! # Usage
//! ```ignore
//! let codec = AbiCodec::from_json(ERC20_ABI)?;
//! let calldata = codec.encode_call("balanceOf", &BalanceOfInput { account })?;
//! let balance: U256 = codec.decode_output("balanceOf", &reply.data)?;
//! ```

use alloy_core::dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Bytes, B256};
use chainbind_core::{DecodeError, DescriptorError, EncodeError, Log, TopicValues};
use std::sync::Arc;

use crate::descriptor::{ContractAbi, EventDescriptor, Field, MethodDescriptor};
use crate::log::decode_log;
use crate::topics::{build_topics, TopicFilter};
use crate::value::{AbiArgs, FromAbiValue, IntoAbiValue};

/// Encoder/decoder bound to one contract's descriptor table.
///
/// Cloning is cheap; the descriptors are shared.
#[derive(Debug, Clone)]
pub struct AbiCodec {
    abi: Arc<ContractAbi>,
}

impl AbiCodec {
    pub fn new(abi: ContractAbi) -> Self {
        Self { abi: Arc::new(abi) }
    }

    /// Parse and resolve a standard Ethereum ABI JSON string.
    pub fn from_json(abi_json: &str) -> Result<Self, DescriptorError> {
        ContractAbi::from_json(abi_json).map(Self::new)
    }

    pub fn abi(&self) -> &ContractAbi {
        &self.abi
    }

    pub fn method(&self, name: &str) -> Result<&MethodDescriptor, EncodeError> {
        self.abi.method(name).ok_or_else(|| EncodeError::UnknownMethod {
            name: name.to_string(),
        })
    }

    pub fn event(&self, name: &str) -> Result<&EventDescriptor, EncodeError> {
        self.abi.event(name).ok_or_else(|| EncodeError::UnknownEvent {
            name: name.to_string(),
        })
    }

    /// 4-byte selector of `method`, if declared.
    pub fn selector(&self, method: &str) -> Option<[u8; 4]> {
        self.abi.method(method).map(|m| m.selector)
    }

    /// topics[0] of `event`, if declared.
    pub fn event_topic(&self, event: &str) -> Option<B256> {
        self.abi.event(event).map(|e| e.topic0)
    }

    /// topics[0] of an event the binding requires to be declared.
    pub fn require_event_topic(&self, event: &str) -> Result<B256, DescriptorError> {
        self.event_topic(event).ok_or_else(|| DescriptorError::Missing {
            name: event.to_string(),
        })
    }

    /// Encode a method call: `selector ‖ abi_encode_params(args)`.
    pub fn encode_call<A: AbiArgs>(&self, method: &str, args: &A) -> Result<Bytes, EncodeError> {
        let descriptor = self.method(method)?;
        let params = encode_params(method, &descriptor.inputs, args.to_args())?;
        let mut calldata = Vec::with_capacity(4 + params.len());
        calldata.extend_from_slice(&descriptor.selector);
        calldata.extend_from_slice(&params);
        Ok(Bytes::from(calldata))
    }

    /// Decode every output of `method` into generic values.
    pub fn decode_outputs(&self, method: &str, data: &[u8]) -> Result<Vec<DynSolValue>, DecodeError> {
        let descriptor = self.abi.method(method).ok_or_else(|| DecodeError::UnknownMethod {
            name: method.to_string(),
        })?;
        decode_params(&format!("{method} output"), &descriptor.outputs, data)
    }

    /// Decode a single-output method's return data into `T`.
    pub fn decode_output<T: FromAbiValue>(&self, method: &str, data: &[u8]) -> Result<T, DecodeError> {
        let value = self
            .decode_outputs(method, data)?
            .into_iter()
            .next()
            .ok_or_else(|| DecodeError::shape(format!("{method} output"), "no outputs"))?;
        T::from_abi_value(value)
    }

    /// Decode call arguments (selector already stripped) into generic values.
    pub fn decode_args(&self, method: &str, data: &[u8]) -> Result<Vec<DynSolValue>, DecodeError> {
        let descriptor = self.abi.method(method).ok_or_else(|| DecodeError::UnknownMethod {
            name: method.to_string(),
        })?;
        decode_params(&format!("{method} input"), &descriptor.inputs, data)
    }

    /// Decode full calldata (selector included) into typed arguments.
    pub fn decode_call<A: AbiArgs>(&self, method: &str, calldata: &[u8]) -> Result<A, DecodeError> {
        let descriptor = self.abi.method(method).ok_or_else(|| DecodeError::UnknownMethod {
            name: method.to_string(),
        })?;
        match calldata.get(..4) {
            Some(sel) if *sel == descriptor.selector => {}
            Some(sel) => {
                return Err(DecodeError::shape(
                    format!("selector 0x{}", hex::encode(descriptor.selector)),
                    format!("0x{}", hex::encode(sel)),
                ))
            }
            None => return Err(DecodeError::truncated(method, "calldata shorter than selector")),
        }
        A::from_args(self.decode_args(method, &calldata[4..])?)
    }

    /// Encode return values of `method`, as a contract would.
    pub fn encode_output(&self, method: &str, values: Vec<DynSolValue>) -> Result<Bytes, EncodeError> {
        let descriptor = self.method(method)?;
        encode_params(method, &descriptor.outputs, values).map(Bytes::from)
    }

    /// Encode a struct as the sole parameter of a report payload:
    /// `abi.encode(value)` where `value` has the tuple type `ty`.
    pub fn encode_struct<T: IntoAbiValue>(&self, ty: &str, value: &T) -> Result<Bytes, EncodeError> {
        let sol_type: DynSolType = ty.parse().map_err(|e: alloy_core::dyn_abi::Error| {
            EncodeError::InvalidType {
                ty: ty.to_string(),
                reason: e.to_string(),
            }
        })?;
        let value = value.to_abi_value();
        if !sol_type.matches(&value) {
            return Err(EncodeError::ShapeMismatch {
                field: ty.to_string(),
                expected: sol_type.to_string(),
            });
        }
        Ok(Bytes::from(DynSolValue::Tuple(vec![value]).abi_encode_params()))
    }

    /// Build the topic filter for `event` from typed filter records.
    pub fn encode_topics<F: TopicFilter>(
        &self,
        event: &str,
        filters: &[F],
    ) -> Result<Vec<TopicValues>, EncodeError> {
        build_topics(self.event(event)?, filters)
    }

    /// Decode a raw log of `event` into its typed form.
    pub fn decode_event<E: AbiArgs>(&self, event: &str, log: &Log) -> Result<E, DecodeError> {
        let descriptor = self.abi.event(event).ok_or_else(|| DecodeError::UnknownEvent {
            name: event.to_string(),
        })?;
        E::from_args(decode_log(descriptor, log)?)
    }
}

/// Type-check `values` against `fields` and encode them as a parameter list.
pub(crate) fn encode_params(
    item: &str,
    fields: &[Field],
    values: Vec<DynSolValue>,
) -> Result<Vec<u8>, EncodeError> {
    if values.len() != fields.len() {
        return Err(EncodeError::ArgumentCount {
            method: item.to_string(),
            expected: fields.len(),
            got: values.len(),
        });
    }
    for (field, value) in fields.iter().zip(&values) {
        if !field.ty.matches(value) {
            return Err(EncodeError::ShapeMismatch {
                field: field.name.clone(),
                expected: field.ty.to_string(),
            });
        }
    }
    Ok(DynSolValue::Tuple(values).abi_encode_params())
}

/// Decode a parameter list of `fields` from `data`.
///
/// Any failure inside the ABI decoder (short head, out-of-range offset,
/// bad length) is reported as a truncated payload.
pub(crate) fn decode_params(
    context: &str,
    fields: &[Field],
    data: &[u8],
) -> Result<Vec<DynSolValue>, DecodeError> {
    if fields.is_empty() {
        return Ok(Vec::new());
    }
    let head = 32 * fields.iter().map(|f| head_words(&f.ty)).sum::<usize>();
    if data.len() < head {
        return Err(DecodeError::truncated(
            context,
            format!("need at least {head} bytes, got {}", data.len()),
        ));
    }
    let ty = DynSolType::Tuple(fields.iter().map(|f| f.ty.clone()).collect());
    match ty.abi_decode_params(data) {
        Ok(DynSolValue::Tuple(values)) => Ok(values),
        Ok(other) => Ok(vec![other]),
        Err(e) => Err(DecodeError::truncated(context, e)),
    }
}

/// Number of 32-byte head slots a parameter of type `ty` occupies.
fn head_words(ty: &DynSolType) -> usize {
    if is_dynamic(ty) {
        return 1;
    }
    match ty {
        DynSolType::Tuple(inner) => inner.iter().map(head_words).sum(),
        DynSolType::FixedArray(inner, len) => len * head_words(inner),
        _ => 1,
    }
}

/// Whether `ty` is encoded out of line behind an offset word.
fn is_dynamic(ty: &DynSolType) -> bool {
    match ty {
        DynSolType::String | DynSolType::Bytes | DynSolType::Array(_) => true,
        DynSolType::Tuple(inner) => inner.iter().any(is_dynamic),
        DynSolType::FixedArray(inner, _) => is_dynamic(inner),
        _ => false,
    }
}
