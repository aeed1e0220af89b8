//! Typed method handlers for [`MockEvmClient`].
//!
//! Bindings use [`register_method`] to expose per-method closures that take
//! typed arguments and return typed outputs; the ABI plumbing in between is
//! handled here.

use alloy_primitives::Address;
use chainbind_core::mock::MockEvmClient;
use chainbind_core::{DescriptorError, TransportError};
use std::sync::Arc;

use crate::codec::AbiCodec;
use crate::value::{AbiArgs, IntoAbiValue};

/// A mocked method body.
pub type MockFn<A, O> = Arc<dyn Fn(A) -> Result<O, TransportError> + Send + Sync>;

/// Route calls of `method` on `address` to `handler`.
///
/// With no handler, calls fail with [`TransportError::NotMocked`].
pub fn register_method<A, O>(
    client: &MockEvmClient,
    address: Address,
    codec: &AbiCodec,
    method: &'static str,
    handler: Option<MockFn<A, O>>,
) -> Result<(), DescriptorError>
where
    A: AbiArgs + 'static,
    O: IntoAbiValue + 'static,
{
    let selector = codec.selector(method).ok_or_else(|| DescriptorError::Missing {
        name: method.to_string(),
    })?;
    let codec = codec.clone();
    client.add_contract_handler(address, selector, move |args: &[u8]| {
        let handler = handler.as_ref().ok_or_else(|| TransportError::NotMocked {
            target: format!("{method} method"),
        })?;
        let values = codec
            .decode_args(method, args)
            .and_then(A::from_args)
            .map_err(|e| TransportError::Other(format!("failed to unpack {method} payload: {e}")))?;
        let output = handler(values)?;
        codec
            .encode_output(method, vec![output.to_abi_value()])
            .map(|b| b.to_vec())
            .map_err(|e| TransportError::Other(format!("failed to pack {method} result: {e}")))
    });
    Ok(())
}
