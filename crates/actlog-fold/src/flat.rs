//! Flatten chain and the off-chain flattened list it commits to.
//!
//! The flatten chain keeps the same head bookkeeping as the reduce chain so
//! its terminal certificate proves it covered exactly the snapshotted range.
//! Alongside, every action is pushed onto a LIFO list whose hash ends up in
//! `flat_list_state`. [`FlatList`] is the matching off-chain structure the
//! drain submitter pops links from.

use actlog_core::{validate_action, DrainBatch, FlatListLink, ProofBackend, Result};
use actlog_crypto::chain::{
    action_list_add, empty_action_list_hash, empty_flat_list_hash, flat_list_add, list_add,
};
use actlog_field::Field;

use crate::api::{FlatClaim, FlattenCertificate};

/// Claim of a fresh flatten chain at `start_head`.
#[must_use]
pub fn init_claim(start_head: Field) -> FlatClaim {
    FlatClaim {
        initial_action_state: start_head,
        action_sub_list_state: empty_action_list_hash(),
        action_list_state: start_head,
        flat_list_state: empty_flat_list_hash(),
    }
}

/// Fold one action into the pending batch and push it onto the flat list.
#[must_use]
pub fn add_claim(prev: &FlatClaim, action: Field) -> FlatClaim {
    FlatClaim {
        action_sub_list_state: action_list_add(prev.action_sub_list_state, action),
        flat_list_state: flat_list_add(prev.flat_list_state, action),
        ..*prev
    }
}

/// Merge the pending batch into the head. The flat list is untouched.
#[must_use]
pub fn cut_claim(prev: &FlatClaim) -> FlatClaim {
    FlatClaim {
        action_sub_list_state: empty_action_list_hash(),
        action_list_state: list_add(prev.action_list_state, prev.action_sub_list_state),
        ..*prev
    }
}

/// Certificate-issuing wrapper around the flatten transitions.
#[derive(Debug, Clone)]
pub struct FlatProgram<B> {
    backend: B,
}

impl<B: ProofBackend> FlatProgram<B> {
    /// Program issuing through `backend`.
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Start a chain.
    pub fn init(&self, start_head: Field) -> FlattenCertificate {
        self.backend.issue(init_claim(start_head))
    }

    /// Extend `prev` by one action.
    ///
    /// # Errors
    /// `CertificateInvalid` if `prev` does not verify; `InvalidAction` for
    /// the zero action, which would be indistinguishable from padding.
    pub fn add(&self, prev: FlattenCertificate, action: Field) -> Result<FlattenCertificate> {
        self.backend.require(&prev)?;
        let action = validate_action(action)?;
        Ok(self.backend.issue(add_claim(prev.claim(), action)))
    }

    /// Close the pending batch of `prev`.
    ///
    /// # Errors
    /// `CertificateInvalid` if `prev` does not verify.
    pub fn cut_actions(&self, prev: FlattenCertificate) -> Result<FlattenCertificate> {
        self.backend.require(&prev)?;
        Ok(self.backend.issue(cut_claim(prev.claim())))
    }
}

/// Off-chain LIFO list mirroring `flat_list_state`.
///
/// The top link is the most recently pushed action; popping it exposes the
/// hash it was pushed onto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatList {
    links: Vec<FlatListLink>,
    head: Field,
}

impl Default for FlatList {
    fn default() -> Self {
        Self::new()
    }
}

impl FlatList {
    /// Empty list, hashing to [`empty_flat_list_hash`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            links: Vec::new(),
            head: empty_flat_list_hash(),
        }
    }

    /// Current list hash.
    #[must_use]
    pub const fn hash(&self) -> Field {
        self.head
    }

    /// Number of real links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether no link remains.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Push `action`, returning the new hash.
    pub fn push(&mut self, action: Field) -> Field {
        let link = FlatListLink::new(self.head, action);
        self.head = link.head();
        self.links.push(link);
        self.head
    }

    /// Pop the most recent link.
    pub fn pop(&mut self) -> Option<FlatListLink> {
        let link = self.links.pop()?;
        self.head = link.tail;
        Some(link)
    }

    /// Pop up to [`BATCH_SIZE`](actlog_core::BATCH_SIZE) links, padding with
    /// dummies. `None` once the list is empty.
    pub fn next_drain_batch(&mut self) -> Option<DrainBatch> {
        if self.is_empty() {
            return None;
        }
        let mut batch = DrainBatch::empty();
        for slot in &mut batch.links {
            match self.pop() {
                Some(link) => *slot = link,
                None => break,
            }
        }
        Some(batch)
    }

    /// Every remaining drain batch, in submission order.
    pub fn drain_batches(&mut self) -> impl Iterator<Item = DrainBatch> + '_ {
        std::iter::from_fn(move || self.next_drain_batch())
    }
}
