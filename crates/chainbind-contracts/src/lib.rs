//! # chainbind-contracts
//!
//! Typed bindings for the contracts the sample workflow talks to. Each
//! binding embeds its ABI and exposes three layers:
//!
//! - a codec with pure encode/decode operations per method and event
//! - a facade bound to an [`chainbind_core::EvmClient`] and contract address,
//!   whose reads return [`chainbind_core::Pending`] results
//! - a mock that scripts the contract on a [`chainbind_core::mock::MockEvmClient`]

pub mod balance_reader;
pub mod ierc20;
pub mod message_emitter;
pub mod reserve_manager;

pub use balance_reader::{BalanceReader, BalanceReaderMock, GetNativeBalancesInput};
pub use ierc20::{Ierc20, Ierc20Mock};
pub use message_emitter::{
    GetLastMessageInput, MessageEmittedDecoded, MessageEmittedTopics, MessageEmittedTrigger,
    MessageEmitter, MessageEmitterMock,
};
pub use reserve_manager::{ReserveManager, ReserveManagerMock, UpdateReserves};
