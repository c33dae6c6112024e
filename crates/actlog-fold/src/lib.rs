//! Off-path certificate line for the action-log reducer.
//!
//! This crate ties together:
//! - the public claims of the two programs ([`ReduceClaim`], [`FlatClaim`]),
//! - the recursive reduce chain and the flatten chain, each as pure claim
//!   transitions plus a certificate-issuing program wrapper,
//! - the off-chain [`FlatList`] that produces drain batches,
//! - push-based builders that replay ledger batches through either chain,
//! - a keyed MAC [`MacBackend`] and bincode certificate I/O.
//!
//! Every step consumes the previous certificate by value and verifies it
//! before issuing the next, so only a linear chain of valid steps can end in
//! a valid terminal certificate.

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

/// Claim types and program labels.
pub mod api;
/// Builders replaying ledger batches into terminal certificates.
pub mod driver;
/// Flatten chain and the off-chain flattened list.
pub mod flat;
/// Certificate envelope (bincode / JSON).
pub mod io;
/// Keyed MAC proof backend.
pub mod mac;
/// Recursive reduce chain.
pub mod reduce;

pub use crate::api::{FlatClaim, FlattenCertificate, ReduceCertificate, ReduceClaim};
pub use crate::driver::{
    build_flat_certificate, build_reduce_certificate, flat_certificate_from_ledger,
    reduce_certificate_from_ledger, FlatBuilder, ReduceBuilder,
};
pub use crate::flat::{FlatList, FlatProgram};
pub use crate::mac::MacBackend;
pub use crate::reduce::ReduceProgram;
