//! Revert-data decoding against the custom errors a contract declares.

use alloy_core::dyn_abi::DynSolValue;
use chainbind_core::ContractError;

use crate::codec::decode_params;
use crate::descriptor::ContractAbi;

/// A custom error decoded from revert data.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedError {
    pub name: String,
    pub selector: [u8; 4],
    pub args: Vec<DynSolValue>,
}

/// Match the first four bytes of `data` against the declared errors and
/// decode the arguments.
///
/// Data whose selector matches nothing, or that is shorter than a selector,
/// yields [`ContractError::UnknownSelector`].
pub fn unpack_error(abi: &ContractAbi, data: &[u8]) -> Result<DecodedError, ContractError> {
    let selector: [u8; 4] = data
        .get(..4)
        .and_then(|s| s.try_into().ok())
        .ok_or_else(|| ContractError::UnknownSelector {
            selector: hex::encode(data),
        })?;
    let descriptor = abi
        .error_by_selector(selector)
        .ok_or_else(|| ContractError::UnknownSelector {
            selector: hex::encode(selector),
        })?;
    let args = decode_params(&descriptor.name, &descriptor.inputs, &data[4..])?;
    Ok(DecodedError {
        name: descriptor.name.clone(),
        selector,
        args,
    })
}
