//! # chainbind-workflow
//!
//! A sample proof-of-reserve workflow written against the ChainBind
//! bindings. On each cron tick it fetches an off-chain reserve figure, sums
//! token supply across chains, and writes both to a reserve manager
//! contract through the report path. A second handler reacts to
//! `MessageEmitted` logs.
//!
//! The host supplies every capability through [`Runtime`], so the same
//! handlers run against [`chainbind_core::mock::MockEvmClient`] in tests.

pub mod config;
pub mod error;
pub mod por;
pub mod runtime;
pub mod telemetry;
pub mod workflow;

pub use config::{EvmConfig, WorkflowConfig};
pub use error::{ConfigError, WorkflowError};
pub use por::{PorResponse, ReserveInfo};
pub use runtime::Runtime;
pub use telemetry::{init_tracing, LogConfig};
pub use workflow::{
    init_workflow, on_log_trigger, on_por_cron_trigger, CronPayload, CronTrigger, Handler,
    Workflow,
};
