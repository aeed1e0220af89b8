//! Workflow-level errors.

use chainbind_core::types::TxStatus;
use chainbind_core::{ConsensusError, ContractError, DescriptorError};
use thiserror::Error;

/// Errors raised while loading or validating workflow configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown chain name '{name}'")]
    UnknownChain { name: String },

    #[error("config lists no EVM chains")]
    NoChains,

    #[error("invalid config field '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

/// Errors that abort a workflow invocation.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build contract binding: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    Contract(#[from] ContractError),

    /// A read against one chain failed; `chain` names the target.
    #[error("could not read from contract on {chain}: {source}")]
    ChainRead {
        chain: String,
        #[source]
        source: ContractError,
    },

    #[error("no EVM client registered for chain selector {selector}")]
    NoClient { selector: u64 },

    #[error("HTTP request failed with status {status}")]
    HttpStatus { status: u16 },

    #[error("invalid proof-of-reserve response: {0}")]
    InvalidResponse(String),

    #[error("ripcord is true")]
    Ripcord,

    #[error("no balances returned from contract for chain {chain}")]
    NoBalances { chain: String },

    #[error("total supply across chains overflows uint256")]
    SupplyOverflow,

    #[error("failed to scale reserve '{value}': {reason}")]
    Scale { value: String, reason: String },

    #[error("consensus failed: {0}")]
    Consensus(#[from] ConsensusError),

    #[error("failed to write report: {0}")]
    WriteReport(#[source] ContractError),

    #[error("report write finished with status {status:?}: {message}")]
    ReportRejected { status: TxStatus, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainbind_core::TransportError;

    #[test]
    fn chain_read_names_the_chain() {
        let err = WorkflowError::ChainRead {
            chain: "ethereum-testnet-sepolia".into(),
            source: ContractError::Transport(TransportError::Timeout { ms: 100 }),
        };
        assert_eq!(
            err.to_string(),
            "could not read from contract on ethereum-testnet-sepolia: transport error: Request timed out after 100ms"
        );
    }

    #[test]
    fn config_errors_are_transparent() {
        let err: WorkflowError = ConfigError::NoChains.into();
        assert_eq!(err.to_string(), "config lists no EVM chains");
    }
}
