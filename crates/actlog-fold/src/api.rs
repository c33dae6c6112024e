//! Public claims of the two certificate programs.
//!
//! Field order in [`Claim::fields`] is part of the wire format: the MAC
//! backend binds exactly this sequence, so reordering invalidates every
//! stored certificate.

use actlog_core::{Certificate, Claim};
use actlog_field::Field;
use serde::{Deserialize, Serialize};

/// Program label of the recursive reduce chain.
pub const DS_REDUCE: &str = "actlog/reduce";
/// Program label of the flatten chain.
pub const DS_FLAT: &str = "actlog/flat";

/// "Starting from `initial_sum` at head `initial_action_state`, folding the
/// actions seen so far yields `total`."
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReduceClaim {
    /// Running fold result.
    pub total: Field,
    /// Sum the chain started from.
    pub initial_sum: Field,
    /// Head the chain started from.
    pub initial_action_state: Field,
    /// Hash of the batch currently being folded (not yet merged).
    pub action_sub_list_state: Field,
    /// Head reached by the merged batches.
    pub action_list_state: Field,
}

impl Claim for ReduceClaim {
    const PROGRAM: &'static str = DS_REDUCE;

    fn fields(&self) -> Vec<(&'static str, Field)> {
        vec![
            ("total", self.total),
            ("initialSum", self.initial_sum),
            ("initialActionState", self.initial_action_state),
            ("actionSubListState", self.action_sub_list_state),
            ("actionListState", self.action_list_state),
        ]
    }
}

/// Same head bookkeeping as [`ReduceClaim`], plus a LIFO commitment over
/// every action seen.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FlatClaim {
    /// Head the chain started from.
    pub initial_action_state: Field,
    /// Hash of the batch currently being folded (not yet merged).
    pub action_sub_list_state: Field,
    /// Head reached by the merged batches.
    pub action_list_state: Field,
    /// Flattened-list hash over every action added so far.
    pub flat_list_state: Field,
}

impl Claim for FlatClaim {
    const PROGRAM: &'static str = DS_FLAT;

    fn fields(&self) -> Vec<(&'static str, Field)> {
        vec![
            ("initialActionState", self.initial_action_state),
            ("actionSubListState", self.action_sub_list_state),
            ("actionListState", self.action_list_state),
            ("flatListState", self.flat_list_state),
        ]
    }
}

/// Certificate produced by the reduce chain.
pub type ReduceCertificate = Certificate<ReduceClaim>;
/// Certificate produced by the flatten chain.
pub type FlattenCertificate = Certificate<FlatClaim>;
