//! The proof-of-reserve workflow: one cron handler that refreshes on-chain
//! reserves and one `MessageEmitted` log handler per configured chain.

use alloy_primitives::utils::parse_ether;
use alloy_primitives::{Address, U256};
use chainbind_contracts::{
    BalanceReader, GetLastMessageInput, GetNativeBalancesInput, Ierc20, MessageEmittedDecoded,
    MessageEmittedTrigger, MessageEmitter, ReserveManager, UpdateReserves,
};
use chainbind_core::types::{topics_match, GasConfig, TxStatus, WriteReportReply};
use chainbind_core::{
    try_fold_ordered, BlockTag, ConfidenceLevel, ContractError, DecodedLog, Log,
};
use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::config::{EvmConfig, WorkflowConfig};
use crate::error::WorkflowError;
use crate::por::fetch_por;
use crate::runtime::Runtime;

/// Cron trigger registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronTrigger {
    pub schedule: String,
}

/// Delivered to the cron handler on each tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CronPayload {
    pub scheduled_execution_time: Option<DateTime<Utc>>,
}

/// A trigger paired with the handler it drives.
#[derive(Debug, Clone)]
pub enum Handler {
    /// Runs [`on_por_cron_trigger`].
    Cron(CronTrigger),
    /// Runs [`on_log_trigger`] for logs matching the trigger.
    MessageEmitted(MessageEmittedTrigger),
}

impl Handler {
    pub fn kind(&self) -> &'static str {
        match self {
            Handler::Cron(_) => "cron",
            Handler::MessageEmitted(_) => "log",
        }
    }
}

/// The registered handlers, cron first.
#[derive(Debug, Clone)]
pub struct Workflow {
    pub handlers: Vec<Handler>,
}

impl Workflow {
    /// Route a delivered log to the first trigger registered for its chain,
    /// address and topics. Returns `None` when no trigger matches.
    pub async fn handle_log(
        &self,
        config: &WorkflowConfig,
        runtime: &Runtime,
        chain_selector: u64,
        log: Log,
    ) -> Result<Option<String>, WorkflowError> {
        let trigger = self.handlers.iter().find_map(|h| match h {
            Handler::MessageEmitted(t) => {
                let req = t.request();
                let matches = req.chain_selector == chain_selector
                    && (req.addresses.is_empty() || req.addresses.contains(&log.address))
                    && topics_match(&req.topics, &log);
                matches.then_some(t)
            }
            Handler::Cron(_) => None,
        });
        let Some(trigger) = trigger else {
            return Ok(None);
        };
        let decoded = trigger.adapt(log).map_err(ContractError::from)?;
        on_log_trigger(config, runtime, decoded).await.map(Some)
    }
}

/// Build the cron handler plus one `MessageEmitted` trigger per chain.
pub fn init_workflow(config: &WorkflowConfig, runtime: &Runtime) -> Result<Workflow, WorkflowError> {
    let mut handlers = vec![Handler::Cron(CronTrigger {
        schedule: config.schedule.clone(),
    })];

    for evm in &config.evms {
        let emitter = message_emitter(runtime, evm)?;
        let trigger = emitter
            .log_trigger_message_emitted(ConfidenceLevel::Latest, &[])
            .map_err(ContractError::from)?;
        handlers.push(Handler::MessageEmitted(trigger));
    }

    Ok(Workflow { handlers })
}

pub async fn on_por_cron_trigger(
    config: &WorkflowConfig,
    runtime: &Runtime,
    _payload: &CronPayload,
) -> Result<String, WorkflowError> {
    do_por(config, runtime).await
}

pub async fn on_log_trigger(
    config: &WorkflowConfig,
    runtime: &Runtime,
    payload: DecodedLog<MessageEmittedDecoded>,
) -> Result<String, WorkflowError> {
    info!(message = %payload.data.message, "Message retrieved from the event log");

    let evm = config.primary()?;
    let emitter = message_emitter(runtime, evm)?;

    // Indexed address topics decode to the value itself, not a hash.
    let input = GetLastMessageInput {
        emitter: payload.data.emitter,
    };
    info!(block_number = ?payload.log.block_number, "Block number of event log");

    let message = emitter
        .get_last_message(input, payload.log.block_number.map(BlockTag::Number))
        .await
        .map_err(|e| read_failed(evm, e))?;
    info!(message = %message, "Message retrieved from the contract");

    Ok(message)
}

async fn do_por(config: &WorkflowConfig, runtime: &Runtime) -> Result<String, WorkflowError> {
    info!(url = %config.url, chains = config.evms.len(), "fetching por");
    let reserve_info = match runtime
        .run_in_node_mode(|http| async move { fetch_por(http.as_ref(), &config.url).await })
        .await
    {
        Ok(info) => info,
        Err(e) => {
            error!(error = %e, "error fetching por");
            return Err(e);
        }
    };
    info!(
        last_updated = %reserve_info.last_updated,
        total_reserve = reserve_info.total_reserve,
        "ReserveInfo"
    );

    let total_supply = get_total_supply(config, runtime).await?;
    info!(total_supply = %total_supply, "TotalSupply");

    let total_reserve_scaled = scale_reserve(reserve_info.total_reserve)?;
    info!(total_reserve_scaled = %total_reserve_scaled, "TotalReserveScaled");

    let primary = config.primary()?;
    let balance = fetch_native_token_balance(runtime, primary, primary.token_address).await?;
    info!(token = %primary.token_address, balance = %balance, "Native token balance");

    update_reserves(config, runtime, total_supply, total_reserve_scaled).await?;

    Ok(reserve_info.total_reserve.to_string())
}

/// Read `totalSupply` at the finalized block on every configured chain and
/// sum the results. All reads are issued before any is awaited; the first
/// failure in configuration order aborts the sum.
pub async fn get_total_supply(
    config: &WorkflowConfig,
    runtime: &Runtime,
) -> Result<U256, WorkflowError> {
    let mut reads = Vec::with_capacity(config.evms.len());
    for evm in &config.evms {
        let client = runtime.client(evm.chain_selector()?)?;
        let token = Ierc20::new(client, evm.token_address)?;
        reads.push(token.total_supply(Some(BlockTag::Finalized)));
    }

    let total = try_fold_ordered(reads, Some(U256::ZERO), |total, supply| {
        total.and_then(|t| t.checked_add(supply))
    })
    .await
    .map_err(|failed| {
        let chain = config
            .evms
            .get(failed.index)
            .map(|evm| evm.chain_name.clone())
            .unwrap_or_default();
        error!(contract_chain = %chain, error = %failed.source, "Could not read from contract");
        WorkflowError::ChainRead {
            chain,
            source: failed.source,
        }
    })?;
    total.ok_or(WorkflowError::SupplyOverflow)
}

/// Native balance of `holder` via the chain's balance reader, at the
/// finalized block.
pub async fn fetch_native_token_balance(
    runtime: &Runtime,
    evm: &EvmConfig,
    holder: Address,
) -> Result<U256, WorkflowError> {
    let client = runtime.client(evm.chain_selector()?)?;
    let reader = BalanceReader::new(client, evm.balance_reader_address)?;

    info!(
        address = %evm.balance_reader_address,
        token_address = %holder,
        "Getting native balances"
    );
    let balances = reader
        .get_native_balances(
            GetNativeBalancesInput {
                addresses: vec![holder],
            },
            Some(BlockTag::Finalized),
        )
        .await
        .map_err(|e| read_failed(evm, e))?;

    balances.into_iter().next().ok_or_else(|| {
        error!(contract_chain = %evm.chain_name, "No balances returned from contract");
        WorkflowError::NoBalances {
            chain: evm.chain_name.clone(),
        }
    })
}

/// Sign `UpdateReserves` into a report and deliver it to the reserve manager
/// on the primary chain.
pub async fn update_reserves(
    config: &WorkflowConfig,
    runtime: &Runtime,
    total_supply: U256,
    total_reserve_scaled: U256,
) -> Result<WriteReportReply, WorkflowError> {
    let evm = config.primary()?;
    info!(
        total_supply = %total_supply,
        total_reserve_scaled = %total_reserve_scaled,
        "Updating reserves"
    );

    let client = runtime.client(evm.chain_selector()?)?;
    let manager = ReserveManager::new(client, evm.reserve_manager_address)?;
    let reply = manager
        .write_report_from_update_reserves(
            runtime.reports(),
            &UpdateReserves {
                total_minted: total_supply,
                total_reserve: total_reserve_scaled,
            },
            Some(GasConfig {
                gas_limit: evm.gas_limit,
            }),
        )
        .await
        .map_err(|e| {
            error!(error = %e, "WriteReport await failed");
            WorkflowError::WriteReport(e)
        })?;

    if reply.tx_status != TxStatus::Success {
        error!(status = ?reply.tx_status, "Write report transaction failed");
        return Err(WorkflowError::ReportRejected {
            status: reply.tx_status,
            message: reply.error_message.clone().unwrap_or_default(),
        });
    }
    info!(tx_hash = %reply.tx_hash, "Write report transaction succeeded");
    Ok(reply)
}

/// Convert a reserve in whole tokens to 18-decimal base units.
pub fn scale_reserve(total_reserve: f64) -> Result<U256, WorkflowError> {
    let text = total_reserve.to_string();
    if !total_reserve.is_finite() || total_reserve < 0.0 {
        return Err(WorkflowError::Scale {
            value: text,
            reason: "must be finite and non-negative".into(),
        });
    }
    parse_ether(&text).map_err(|e| WorkflowError::Scale {
        reason: e.to_string(),
        value: text,
    })
}

fn message_emitter(runtime: &Runtime, evm: &EvmConfig) -> Result<MessageEmitter, WorkflowError> {
    let client = runtime.client(evm.chain_selector()?)?;
    MessageEmitter::new(client, evm.message_emitter_address).map_err(|e| {
        error!(address = %evm.message_emitter_address, error = %e, "failed to create message emitter");
        e.into()
    })
}

fn read_failed(evm: &EvmConfig, source: ContractError) -> WorkflowError {
    error!(contract_chain = %evm.chain_name, error = %source, "Could not read from contract");
    WorkflowError::ChainRead {
        chain: evm.chain_name.clone(),
        source,
    }
}
