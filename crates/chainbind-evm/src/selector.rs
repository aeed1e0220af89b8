//! Keccak-256 identifiers derived from canonical ABI signatures.
//!
//! - function / error selector: `keccak256("name(type1,type2)")[..4]`
//! - event topic-0: the full 32-byte `keccak256("Name(type1,type2)")`

use alloy_primitives::B256;
use tiny_keccak::{Hasher, Keccak};

/// Keccak-256 of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> B256 {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    B256::from(output)
}

/// 4-byte selector of a canonical function or error signature.
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Topic-0 hash of a canonical event signature.
pub fn event_topic(signature: &str) -> B256 {
    keccak256(signature.as_bytes())
}
