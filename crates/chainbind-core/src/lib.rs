//! # chainbind-core
//!
//! Chain-agnostic building blocks shared by every ChainBind crate: the
//! pending-result runtime used to chain remote calls, the capability traits a
//! host runtime provides, the request/reply wire types, and the error taxonomy.

pub mod capability;
pub mod chain;
pub mod consensus;
pub mod error;
pub mod mock;
pub mod pending;
pub mod types;

pub use capability::{EvmClient, HttpFetcher, ReportGenerator};
pub use consensus::{AggregationStrategy, ConsensusAggregate};
pub use error::{
    ConsensusError, ContractError, DecodeError, DescriptorError, EncodeError, TransportError,
};
pub use pending::{try_fold_ordered, try_join_ordered, IndexedError, Pending, SharedPending};
pub use types::{BlockTag, ConfidenceLevel, DecodedLog, Log, TopicValues};
