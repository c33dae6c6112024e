//! actlog-core: data model, ledger interface, certificates and bounded replay.
//!
//! This crate defines the **stable boundary** used across ACTLOG crates:
//! - canonical data types (`ActionBatch`, `FlatListLink`, `DrainBatch`),
//! - the error kinds every transition can raise ([`ReduceError`]),
//! - the [`Ledger`] the engine consumes and an in-memory implementation,
//! - the proof-backend boundary ([`ProofBackend`], [`Claim`], [`Certificate`]),
//! - the bounded in-transaction fold, and JSON/CBOR I/O.
//!
//! ```no_run
//! use actlog_core::prelude::*;
//! # fn main() -> actlog_core::Result<()> {
//! let mut ledger = MemoryLedger::new();
//! let from = ledger.authenticated_head();
//! ledger.append_action_batch(&[Field::from_u64(1), Field::from_u64(2)])?;
//! let out = BoundedFold::default().reduce_range(
//!     &ledger,
//!     Field::zero(),
//!     from,
//!     ledger.authenticated_head(),
//! )?;
//! assert_eq!(out.total, Field::from_u64(3));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Proof-backend trait and the claim interface.
pub mod backend;
/// Claim + tag values passed between transitions.
pub mod certificate;
/// Error kinds raised by transitions.
pub mod error;
/// JSON/CBOR helpers and auto-detecting read/write APIs.
pub mod io;
/// Ledger interface and in-memory ledger.
pub mod ledger;
/// Bounded in-transaction fold.
pub mod replay;
/// Canonical data types shared across the workspace.
pub mod types;

pub use backend::*;
pub use certificate::*;
pub use error::*;
pub use ledger::*;
pub use replay::*;
pub use types::*;

pub use actlog_field::Field;

/// Commonly-used items for quick imports.
///
/// ```rust
/// use actlog_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        backend::{Claim, ProofBackend},
        certificate::Certificate,
        error::{ReduceError, Result},
        ledger::{Ledger, MemoryLedger},
        replay::{BoundedFold, ReplayConfig},
        types::*,
    };
    pub use actlog_field::Field;
}
