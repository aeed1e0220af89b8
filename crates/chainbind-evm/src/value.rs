//! Coercion between typed Rust values and alloy's generic `DynSolValue`.
//!
//! Decoding always goes raw bytes → `DynSolValue` → typed value. The second
//! hop is [`FromAbiValue`], which has one rule per type tag and reports a
//! `ShapeMismatch` when the generic value has the wrong shape.

use alloy_core::dyn_abi::DynSolValue;
use alloy_primitives::{Address, Bytes, FixedBytes, B256, U256};
use chainbind_core::DecodeError;

/// Convert a typed value into a generic ABI value.
pub trait IntoAbiValue {
    fn to_abi_value(&self) -> DynSolValue;
}

/// Coerce a generic ABI value into a typed value.
pub trait FromAbiValue: Sized {
    fn from_abi_value(value: DynSolValue) -> Result<Self, DecodeError>;
}

/// A record whose fields map positionally onto an ABI parameter list:
/// method inputs, event fields in declared order, or struct components.
pub trait AbiArgs: Sized {
    fn to_args(&self) -> Vec<DynSolValue>;
    fn from_args(values: Vec<DynSolValue>) -> Result<Self, DecodeError>;
}

impl AbiArgs for () {
    fn to_args(&self) -> Vec<DynSolValue> {
        Vec::new()
    }

    fn from_args(_values: Vec<DynSolValue>) -> Result<Self, DecodeError> {
        Ok(())
    }
}

/// Short name of a value's shape, for error messages.
pub fn kind(value: &DynSolValue) -> &'static str {
    match value {
        DynSolValue::Bool(_) => "bool",
        DynSolValue::Int(..) => "int",
        DynSolValue::Uint(..) => "uint",
        DynSolValue::FixedBytes(..) => "fixed bytes",
        DynSolValue::Address(_) => "address",
        DynSolValue::Function(_) => "function",
        DynSolValue::Bytes(_) => "bytes",
        DynSolValue::String(_) => "string",
        DynSolValue::Array(_) => "array",
        DynSolValue::FixedArray(_) => "fixed array",
        DynSolValue::Tuple(_) => "tuple",
        #[allow(unreachable_patterns)]
        _ => "value",
    }
}

/// Reads positional values off a decoded parameter list, coercing each one.
pub struct FieldReader {
    values: std::vec::IntoIter<DynSolValue>,
}

impl FieldReader {
    pub fn new(values: Vec<DynSolValue>) -> Self {
        Self {
            values: values.into_iter(),
        }
    }

    /// Take the next value as `T`. `field` names it in the error.
    pub fn next<T: FromAbiValue>(&mut self, field: &str) -> Result<T, DecodeError> {
        let value = self
            .values
            .next()
            .ok_or_else(|| DecodeError::shape(field, "end of values"))?;
        T::from_abi_value(value)
    }
}

impl IntoAbiValue for Address {
    fn to_abi_value(&self) -> DynSolValue {
        DynSolValue::Address(*self)
    }
}

impl FromAbiValue for Address {
    fn from_abi_value(value: DynSolValue) -> Result<Self, DecodeError> {
        match value {
            DynSolValue::Address(a) => Ok(a),
            other => Err(DecodeError::shape("address", kind(&other))),
        }
    }
}

impl IntoAbiValue for U256 {
    fn to_abi_value(&self) -> DynSolValue {
        DynSolValue::Uint(*self, 256)
    }
}

impl FromAbiValue for U256 {
    fn from_abi_value(value: DynSolValue) -> Result<Self, DecodeError> {
        match value {
            DynSolValue::Uint(u, _) => Ok(u),
            other => Err(DecodeError::shape("uint", kind(&other))),
        }
    }
}

impl IntoAbiValue for bool {
    fn to_abi_value(&self) -> DynSolValue {
        DynSolValue::Bool(*self)
    }
}

impl FromAbiValue for bool {
    fn from_abi_value(value: DynSolValue) -> Result<Self, DecodeError> {
        match value {
            DynSolValue::Bool(b) => Ok(b),
            other => Err(DecodeError::shape("bool", kind(&other))),
        }
    }
}

impl IntoAbiValue for String {
    fn to_abi_value(&self) -> DynSolValue {
        DynSolValue::String(self.clone())
    }
}

impl FromAbiValue for String {
    fn from_abi_value(value: DynSolValue) -> Result<Self, DecodeError> {
        match value {
            DynSolValue::String(s) => Ok(s),
            other => Err(DecodeError::shape("string", kind(&other))),
        }
    }
}

impl IntoAbiValue for Bytes {
    fn to_abi_value(&self) -> DynSolValue {
        DynSolValue::Bytes(self.to_vec())
    }
}

impl FromAbiValue for Bytes {
    fn from_abi_value(value: DynSolValue) -> Result<Self, DecodeError> {
        match value {
            DynSolValue::Bytes(b) => Ok(Bytes::from(b)),
            other => Err(DecodeError::shape("bytes", kind(&other))),
        }
    }
}

impl<const N: usize> IntoAbiValue for FixedBytes<N> {
    fn to_abi_value(&self) -> DynSolValue {
        let mut word = B256::ZERO;
        word[..N].copy_from_slice(self.as_slice());
        DynSolValue::FixedBytes(word, N)
    }
}

impl<const N: usize> FromAbiValue for FixedBytes<N> {
    fn from_abi_value(value: DynSolValue) -> Result<Self, DecodeError> {
        match value {
            DynSolValue::FixedBytes(word, size) if size == N => {
                Ok(FixedBytes::from_slice(&word[..N]))
            }
            other => Err(DecodeError::shape(format!("bytes{N}"), kind(&other))),
        }
    }
}

impl<T: IntoAbiValue> IntoAbiValue for Vec<T> {
    fn to_abi_value(&self) -> DynSolValue {
        DynSolValue::Array(self.iter().map(IntoAbiValue::to_abi_value).collect())
    }
}

impl<T: FromAbiValue> FromAbiValue for Vec<T> {
    fn from_abi_value(value: DynSolValue) -> Result<Self, DecodeError> {
        match value {
            DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
                items.into_iter().map(T::from_abi_value).collect()
            }
            other => Err(DecodeError::shape("array", kind(&other))),
        }
    }
}
