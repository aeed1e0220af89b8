//! Error types for the contract-interaction pipeline.
//!
//! Every stage reports its own error kind; [`ContractError`] is what a
//! pending result finally carries back to the caller.

use thiserror::Error;

/// Errors raised while packing typed arguments into a call payload,
/// a report payload, or a topic filter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("method '{name}' not found in ABI")]
    UnknownMethod { name: String },

    #[error("event '{name}' not found in ABI")]
    UnknownEvent { name: String },

    #[error("argument count mismatch for '{method}': ABI has {expected}, got {got}")]
    ArgumentCount {
        method: String,
        expected: usize,
        got: usize,
    },

    #[error("argument '{field}' does not match ABI type {expected}")]
    ShapeMismatch { field: String, expected: String },

    #[error("invalid ABI type '{ty}': {reason}")]
    InvalidType { ty: String, reason: String },
}

/// Errors raised while turning raw bytes back into typed values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The payload is too short or malformed for the declared schema.
    #[error("truncated payload for {context}: {reason}")]
    Truncated { context: String, reason: String },

    /// A generic ABI value could not be coerced into the declared type.
    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    #[error("event '{event}' expects {expected} indexed topics, log has {got}")]
    TopicCount {
        event: String,
        expected: usize,
        got: usize,
    },

    #[error("method '{name}' not found in ABI")]
    UnknownMethod { name: String },

    #[error("event '{name}' not found in ABI")]
    UnknownEvent { name: String },
}

impl DecodeError {
    pub fn truncated(context: impl Into<String>, reason: impl ToString) -> Self {
        Self::Truncated {
            context: context.into(),
            reason: reason.to_string(),
        }
    }

    pub fn shape(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    /// Returns `true` if the raw payload itself was too short or malformed.
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated { .. })
    }
}

/// Errors surfaced by an external capability (transport, report, HTTP).
/// Passed through this layer unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// HTTP request failed (connection refused, timeout, bad status).
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON-RPC protocol-level error returned by the node.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Request timed out inside the capability.
    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// The reply could not be parsed.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// The capability does not implement this operation.
    #[error("operation not supported: {0}")]
    Unsupported(String),

    /// No handler is registered for the target of a call.
    #[error("no handler for {target}")]
    NotMocked { target: String },

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Returns `true` if this error is transient and a higher layer may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout { .. })
    }

    /// Returns `true` if the node executed the request and rejected it.
    pub fn is_execution_error(&self) -> bool {
        matches!(self, Self::Rpc { .. })
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(e: serde_json::Error) -> Self {
        Self::Deserialization(e.to_string())
    }
}

/// Errors from combining values contributed by independent executions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsensusError {
    #[error("no observations to aggregate")]
    NoObservations,

    #[error("observations disagree on field '{field}'")]
    Disagreement { field: String },
}

/// The error carried by every pending result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractError {
    #[error("encode failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("failed to get finalized block header")]
    MissingHeader,

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("unknown error selector 0x{selector}")]
    UnknownSelector { selector: String },

    #[error("consensus failed: {0}")]
    Consensus(#[from] ConsensusError),
}

/// Errors raised while building a descriptor table from ABI JSON.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("invalid ABI JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("unsupported ABI type in '{item}': {reason}")]
    UnsupportedType { item: String, reason: String },

    #[error("duplicate ABI entry '{name}'")]
    Duplicate { name: String },

    #[error("ABI entry '{name}' is not declared")]
    Missing { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_pass_through_contract_error() {
        let err: ContractError = TransportError::Rpc {
            code: -32000,
            message: "execution reverted".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "transport error: RPC error -32000: execution reverted"
        );
    }

    #[test]
    fn retryable_classification() {
        assert!(TransportError::Http("connection reset".into()).is_retryable());
        assert!(TransportError::Timeout { ms: 500 }.is_retryable());
        assert!(!TransportError::Unsupported("write".into()).is_retryable());
    }

    #[test]
    fn missing_header_message() {
        assert_eq!(
            ContractError::MissingHeader.to_string(),
            "failed to get finalized block header"
        );
    }
}
