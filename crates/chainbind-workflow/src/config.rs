//! Workflow configuration.

use alloy_primitives::Address;
use chainbind_core::chain::selector_from_name;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Per-chain contract deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmConfig {
    pub token_address: Address,
    pub reserve_manager_address: Address,
    pub balance_reader_address: Address,
    pub message_emitter_address: Address,
    /// Chain name, e.g. "ethereum-testnet-sepolia".
    pub chain_name: String,
    /// Gas limit for report delivery on this chain.
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
}

fn default_gas_limit() -> u64 {
    1_000_000
}

impl EvmConfig {
    pub fn chain_selector(&self) -> Result<u64, ConfigError> {
        selector_from_name(&self.chain_name).ok_or_else(|| ConfigError::UnknownChain {
            name: self.chain_name.clone(),
        })
    }
}

/// Top-level workflow configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfig {
    /// Cron expression for the proof-of-reserve handler.
    pub schedule: String,
    /// Proof-of-reserve endpoint.
    pub url: String,
    pub evms: Vec<EvmConfig>,
}

impl WorkflowConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schedule.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "schedule".into(),
                reason: "must not be empty".into(),
            });
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                field: "url".into(),
                reason: format!("'{}' is not an http(s) URL", self.url),
            });
        }
        if self.evms.is_empty() {
            return Err(ConfigError::NoChains);
        }
        for evm in &self.evms {
            evm.chain_selector()?;
        }
        Ok(())
    }

    /// The chain that hosts the balance reader and reserve manager.
    pub fn primary(&self) -> Result<&EvmConfig, ConfigError> {
        self.evms.first().ok_or(ConfigError::NoChains)
    }
}
