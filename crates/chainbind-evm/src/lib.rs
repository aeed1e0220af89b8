//! # chainbind-evm
//!
//! EVM ABI support for ChainBind bindings.
//!
//! Uses `alloy-core` for ABI type resolution, encoding and decoding; adds
//! descriptor tables, typed value coercion, topic filter construction, log
//! decoding, and the shared plumbing every contract facade delegates to.

pub mod bound;
pub mod codec;
pub mod descriptor;
pub mod errors;
pub mod log;
pub mod mock;
pub mod selector;
pub mod topics;
pub mod trigger;
pub mod value;

pub use bound::BoundContract;
pub use codec::AbiCodec;
pub use descriptor::{ContractAbi, EventDescriptor, Field, MethodDescriptor};
pub use errors::{unpack_error, DecodedError};
pub use topics::TopicFilter;
pub use trigger::{LogAdapter, LogTrigger};
pub use value::{AbiArgs, FieldReader, FromAbiValue, IntoAbiValue};

pub use alloy_core::dyn_abi::DynSolValue;
