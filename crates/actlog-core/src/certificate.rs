//! Certificates: a claim bundled with an opaque backend tag.
//!
//! A [`Certificate`] is a value. Transitions take the previous certificate by
//! value and hand back a new one; nothing edits a certificate in place.
//!
//! ## Backward/forward compatibility
//! - No `#[serde(deny_unknown_fields)]`, so newer producers with extra fields
//!   stay readable.
//! - `tag` is raw bytes (CBOR/bincode friendly).

use serde::{Deserialize, Serialize};

use crate::backend::Claim;

/// A claim and the tag that authenticates it.
///
/// **Invariants**
/// - `tag` is meaningful only together with the backend that produced it.
/// - `claim` is what the contract checks against persisted state; the tag is
///   what binds the claim to a valid chain of transitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(bound = "C: Claim")]
pub struct Certificate<C> {
    claim: C,
    tag: [u8; 32],
}

impl<C: Claim> Certificate<C> {
    /// Pair a claim with a tag. Backends call this from `issue`.
    #[inline]
    #[must_use]
    pub const fn from_parts(claim: C, tag: [u8; 32]) -> Self {
        Self { claim, tag }
    }

    /// The public claim.
    #[inline]
    #[must_use]
    pub const fn claim(&self) -> &C {
        &self.claim
    }

    /// The backend tag.
    #[inline]
    #[must_use]
    pub const fn tag(&self) -> &[u8; 32] {
        &self.tag
    }

    /// Program label of the claim type.
    #[inline]
    #[must_use]
    pub const fn program(&self) -> &'static str {
        C::PROGRAM
    }

    /// Split into claim and tag.
    #[inline]
    #[must_use]
    pub fn into_parts(self) -> (C, [u8; 32]) {
        (self.claim, self.tag)
    }
}
