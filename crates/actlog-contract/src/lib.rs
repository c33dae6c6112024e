//! The reducer contract: persisted slots plus the transitions callers invoke.
//!
//! Three ways to account for dispatched actions, all landing on the same
//! `totalSum`:
//!
//! - **reduceBounded** folds the unprocessed range in-transaction, when it
//!   fits the work budget;
//! - **customReduce** accepts one terminal reduce certificate built off-path;
//! - **createSnapshot → flatSnapshot → snapshotReduce\*** freezes the head,
//!   accepts a flattened list over it and drains that list in fixed-size
//!   batches across as many transactions as needed.
//!
//! ```no_run
//! use actlog_contract::{Contract, Method};
//! use actlog_core::MemoryLedger;
//! use actlog_field::Field;
//! use actlog_fold::MacBackend;
//!
//! # fn main() -> actlog_core::Result<()> {
//! let mut ledger = MemoryLedger::new();
//! let mut contract = Contract::new(MacBackend::default());
//! contract.call(&mut ledger, Method::Submit(Field::from_u64(7)))?;
//! let state = contract.call(&mut ledger, Method::ReduceBounded)?;
//! assert_eq!(state.total_sum, Field::from_u64(7));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

/// Contract configuration and environment overrides.
pub mod config;
/// Contract object and method table.
pub mod contract;
/// Persisted slots.
pub mod state;
/// Pure state transitions.
pub mod transitions;

pub use crate::config::{config_from_env, ContractConfig, ENV_BOUNDED_BUDGET};
pub use crate::contract::{Contract, Method, METHOD_NAMES};
pub use crate::state::{initialize, ContractState, Phase, StateSlot};
