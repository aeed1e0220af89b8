//! CLI configuration: the workflow config plus an RPC endpoint per chain
//! and logging options.

use anyhow::{anyhow, Context, Result};
use chainbind_workflow::{EvmConfig, LogConfig, WorkflowConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    #[serde(flatten)]
    pub workflow: WorkflowConfig,
    /// Chain name → JSON-RPC endpoint.
    pub rpc_urls: BTreeMap<String, String>,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.workflow.validate().context("invalid workflow config")?;
        for evm in &config.workflow.evms {
            config.rpc_url(evm)?;
        }
        Ok(config)
    }

    pub fn rpc_url(&self, evm: &EvmConfig) -> Result<&str> {
        self.rpc_urls
            .get(&evm.chain_name)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("no rpcUrls entry for chain '{}'", evm.chain_name))
    }
}
