//! Recursive reduce chain: `init → add* → cut_actions`, repeatable.
//!
//! The claim transitions are pure functions; [`ReduceProgram`] wraps them so
//! every step verifies the certificate it extends and issues the next one.
//! A chain replaying the ledger's batch boundaries ends with
//! `action_list_state` equal to the real head.

use actlog_core::{validate_action, ProofBackend, Result};
use actlog_crypto::chain::{action_list_add, empty_action_list_hash, list_add};
use actlog_field::Field;

use crate::api::{ReduceCertificate, ReduceClaim};

/// Claim of a fresh chain at `(start_sum, start_head)`.
#[must_use]
pub fn init_claim(start_sum: Field, start_head: Field) -> ReduceClaim {
    ReduceClaim {
        total: start_sum,
        initial_sum: start_sum,
        initial_action_state: start_head,
        action_sub_list_state: empty_action_list_hash(),
        action_list_state: start_head,
    }
}

/// Fold one action into the pending batch.
#[must_use]
pub fn add_claim(prev: &ReduceClaim, action: Field) -> ReduceClaim {
    ReduceClaim {
        total: prev.total + action,
        action_sub_list_state: action_list_add(prev.action_sub_list_state, action),
        ..*prev
    }
}

/// Merge the pending batch into the head and start a new one.
#[must_use]
pub fn cut_claim(prev: &ReduceClaim) -> ReduceClaim {
    ReduceClaim {
        action_sub_list_state: empty_action_list_hash(),
        action_list_state: list_add(prev.action_list_state, prev.action_sub_list_state),
        ..*prev
    }
}

/// Certificate-issuing wrapper around the reduce transitions.
#[derive(Debug, Clone)]
pub struct ReduceProgram<B> {
    backend: B,
}

impl<B: ProofBackend> ReduceProgram<B> {
    /// Program issuing through `backend`.
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Borrow the backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Start a chain.
    pub fn init(&self, start_sum: Field, start_head: Field) -> ReduceCertificate {
        self.backend.issue(init_claim(start_sum, start_head))
    }

    /// Extend `prev` by one action.
    ///
    /// # Errors
    /// [`CertificateInvalid`](actlog_core::ReduceError::CertificateInvalid)
    /// if `prev` does not verify; `InvalidAction` for the zero action.
    pub fn add(&self, prev: ReduceCertificate, action: Field) -> Result<ReduceCertificate> {
        self.backend.require(&prev)?;
        let action = validate_action(action)?;
        Ok(self.backend.issue(add_claim(prev.claim(), action)))
    }

    /// Close the pending batch of `prev`.
    ///
    /// # Errors
    /// [`CertificateInvalid`](actlog_core::ReduceError::CertificateInvalid)
    /// if `prev` does not verify.
    pub fn cut_actions(&self, prev: ReduceCertificate) -> Result<ReduceCertificate> {
        self.backend.require(&prev)?;
        Ok(self.backend.issue(cut_claim(prev.claim())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mac::MacBackend;
    use actlog_core::{Certificate, ReduceError};
    use actlog_crypto::chain::{batch_hash, initial_action_state};

    #[test]
    fn chain_tracks_sum_and_head() {
        let p = ReduceProgram::new(MacBackend::default());
        let g = initial_action_state();
        let mut c = p.init(Field::from_u64(10), g);
        for a in [1u64, 2, 3] {
            c = p.add(c, Field::from_u64(a)).unwrap();
        }
        c = p.cut_actions(c).unwrap();
        let claim = c.claim();
        assert_eq!(claim.total, Field::from_u64(16));
        assert_eq!(claim.initial_sum, Field::from_u64(10));
        assert_eq!(claim.initial_action_state, g);
        assert_eq!(claim.action_sub_list_state, empty_action_list_hash());
        let expect = list_add(
            g,
            batch_hash(&[Field::from_u64(1), Field::from_u64(2), Field::from_u64(3)]),
        );
        assert_eq!(claim.action_list_state, expect);
    }

    #[test]
    fn forged_predecessor_is_rejected() {
        let p = ReduceProgram::new(MacBackend::default());
        let (mut claim, tag) = p.init(Field::zero(), initial_action_state()).into_parts();
        claim.total = Field::from_u64(100);
        let forged = Certificate::from_parts(claim, tag);
        assert_eq!(
            p.add(forged.clone(), Field::one()),
            Err(ReduceError::CertificateInvalid {
                program: crate::api::DS_REDUCE
            })
        );
        assert!(p.cut_actions(forged).is_err());
    }

    #[test]
    fn zero_action_is_rejected() {
        let p = ReduceProgram::new(MacBackend::default());
        let c = p.init(Field::zero(), initial_action_state());
        assert_eq!(p.add(c, Field::zero()), Err(ReduceError::InvalidAction));
    }
}
