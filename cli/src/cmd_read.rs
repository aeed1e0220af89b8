//! Read-only workflow commands run against live JSON-RPC endpoints.

use alloy_primitives::Address;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chainbind_contracts::{GetLastMessageInput, MessageEmitter};
use chainbind_core::types::{FilterOptions, Report, ReportRequest};
use chainbind_core::{BlockTag, ReportGenerator, TransportError};
use chainbind_workflow::por::fetch_por;
use chainbind_workflow::workflow::{fetch_native_token_balance, get_total_supply, scale_reserve};
use chainbind_workflow::Runtime;
use std::sync::Arc;
use std::time::Duration;

use crate::config::CliConfig;
use crate::fetch::ReqwestFetcher;
use crate::rpc::JsonRpcEvmClient;

/// Report generation needs a signing runtime; reads never reach it.
struct NoReports;

#[async_trait]
impl ReportGenerator for NoReports {
    async fn generate_report(&self, _req: ReportRequest) -> Result<Report, TransportError> {
        Err(TransportError::Unsupported(
            "report generation requires a signing runtime".into(),
        ))
    }
}

fn build_runtime(config: &CliConfig) -> Result<Runtime> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let mut runtime = Runtime::new(Arc::new(NoReports), Arc::new(ReqwestFetcher::new(timeout)?));
    for evm in &config.workflow.evms {
        let client = JsonRpcEvmClient::new(config.rpc_url(evm)?, evm.chain_selector()?, timeout)?;
        tracing::debug!(chain = %evm.chain_name, url = client.url(), "registered rpc client");
        runtime = runtime.with_client(Arc::new(client));
    }
    Ok(runtime)
}

fn primary_emitter(config: &CliConfig, runtime: &Runtime) -> Result<MessageEmitter> {
    let evm = config.workflow.primary()?;
    let client = runtime.client(evm.chain_selector()?)?;
    Ok(MessageEmitter::new(client, evm.message_emitter_address)?)
}

pub async fn total_supply(config: &CliConfig) -> Result<()> {
    let runtime = build_runtime(config)?;
    let total = get_total_supply(&config.workflow, &runtime).await?;
    for evm in &config.workflow.evms {
        println!("  {:<40} {}", evm.chain_name, evm.token_address);
    }
    println!("Total supply (finalized): {total}");
    Ok(())
}

/// Everything the cron handler computes, without the report write.
pub async fn por(config: &CliConfig) -> Result<()> {
    let runtime = build_runtime(config)?;
    let url = &config.workflow.url;
    let reserve = runtime
        .run_in_node_mode(|http| async move { fetch_por(http.as_ref(), url).await })
        .await
        .context("fetching proof of reserve")?;
    let total_supply = get_total_supply(&config.workflow, &runtime).await?;
    let scaled = scale_reserve(reserve.total_reserve)?;
    let primary = config.workflow.primary()?;
    let balance = fetch_native_token_balance(&runtime, primary, primary.token_address).await?;

    println!("Reserve updated at:   {}", reserve.last_updated);
    println!("Total reserve:        {}", reserve.total_reserve);
    println!("Total reserve (wei):  {scaled}");
    println!("Total supply:         {total_supply}");
    println!("Native token balance: {balance}");
    Ok(())
}

pub async fn last_message(config: &CliConfig, emitter: &str, block: Option<u64>) -> Result<()> {
    let emitter: Address = emitter
        .parse()
        .with_context(|| format!("invalid emitter address '{emitter}'"))?;
    let runtime = build_runtime(config)?;
    let contract = primary_emitter(config, &runtime)?;

    let message = contract
        .get_last_message(GetLastMessageInput { emitter }, block.map(BlockTag::Number))
        .await
        .context("getLastMessage")?;
    println!("{message}");
    Ok(())
}

pub async fn logs(config: &CliConfig, from_block: Option<u64>, to_block: Option<u64>) -> Result<()> {
    let runtime = build_runtime(config)?;
    let contract = primary_emitter(config, &runtime)?;

    let reply = contract
        .filter_logs_message_emitted(Some(FilterOptions {
            from_block,
            to_block,
            ..FilterOptions::default()
        }))
        .await
        .context("eth_getLogs")?;

    for log in &reply.logs {
        match contract.codec().decode_message_emitted(log) {
            Ok(event) => println!(
                "block {:>10}  {}  t={}  {}",
                log.block_number.unwrap_or_default(),
                event.emitter,
                event.timestamp,
                event.message
            ),
            Err(e) => eprintln!("✗ undecodable log in block {:?}: {e}", log.block_number),
        }
    }
    println!("{} MessageEmitted log(s)", reply.logs.len());
    Ok(())
}
