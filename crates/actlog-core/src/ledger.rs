//! The authenticated, append-only action log the reducer consumes.
//!
//! The hosting environment owns the real log; the engine only needs three
//! operations on it ([`Ledger`]). [`MemoryLedger`] is an in-process
//! implementation that chains heads with the same functions every builder
//! uses, so heads computed on either side compare equal.

use actlog_crypto::chain::{initial_action_state, list_add};
use actlog_field::Field;

use crate::error::{ReduceError, Result};
use crate::types::ActionBatch;

/// Operations the engine consumes from the hosting ledger.
pub trait Ledger {
    /// Current head over every appended batch.
    fn authenticated_head(&self) -> Field;

    /// Append one batch and return the new head. An empty batch leaves the
    /// head unchanged.
    fn append_action_batch(&mut self, actions: &[Field]) -> Result<Field>;

    /// Batches appended after `from_head`, oldest first.
    ///
    /// # Errors
    /// [`ReduceError::UnknownActionState`] if the ledger never had `from_head`
    /// as its head.
    fn fetch_actions(&self, from_head: Field) -> Result<Vec<ActionBatch>>;

    /// Batches strictly between heads `from` and `to`, oldest first.
    ///
    /// # Errors
    /// [`ReduceError::UnknownActionState`] if either head is not on the
    /// chain, or `to` is not reachable from `from`.
    fn fetch_range(&self, from: Field, to: Field) -> Result<Vec<ActionBatch>> {
        let mut head = from;
        let mut out = Vec::new();
        if head == to {
            return Ok(out);
        }
        for batch in self.fetch_actions(from)? {
            head = list_add(head, batch.hash());
            out.push(batch);
            if head == to {
                return Ok(out);
            }
        }
        Err(ReduceError::UnknownActionState(to))
    }
}

/// In-process ledger.
///
/// `heads[i]` is the head after the first `i` batches; `heads[0]` is the
/// genesis head.
#[derive(Clone, Debug)]
pub struct MemoryLedger {
    batches: Vec<ActionBatch>,
    heads: Vec<Field>,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedger {
    /// Fresh ledger at [`initial_action_state`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            batches: Vec::new(),
            heads: vec![initial_action_state()],
        }
    }

    /// Rebuild a ledger from persisted batches, recomputing every head.
    /// Empty batches are dropped.
    #[must_use]
    pub fn from_batches<I>(batches: I) -> Self
    where
        I: IntoIterator<Item = ActionBatch>,
    {
        let mut ledger = Self::new();
        for b in batches {
            ledger.push(b);
        }
        ledger
    }

    /// Every recorded batch, oldest first.
    #[must_use]
    pub fn batches(&self) -> &[ActionBatch] {
        &self.batches
    }

    /// Number of recorded batches.
    #[must_use]
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// Total number of actions across all batches.
    #[must_use]
    pub fn action_count(&self) -> usize {
        self.batches.iter().map(ActionBatch::len).sum()
    }

    /// Batch index right after which the ledger had head `head`.
    #[must_use]
    pub fn position_of(&self, head: Field) -> Option<usize> {
        self.heads.iter().position(|h| *h == head)
    }

    fn push(&mut self, batch: ActionBatch) -> Field {
        let head = self.authenticated_head();
        if batch.is_empty() {
            return head;
        }
        let next = list_add(head, batch.hash());
        self.batches.push(batch);
        self.heads.push(next);
        next
    }
}

impl Ledger for MemoryLedger {
    fn authenticated_head(&self) -> Field {
        // `heads` always holds the genesis head.
        self.heads
            .last()
            .copied()
            .unwrap_or_else(initial_action_state)
    }

    fn append_action_batch(&mut self, actions: &[Field]) -> Result<Field> {
        Ok(self.push(ActionBatch::new(actions.to_vec())))
    }

    fn fetch_actions(&self, from_head: Field) -> Result<Vec<ActionBatch>> {
        let pos = self
            .position_of(from_head)
            .ok_or(ReduceError::UnknownActionState(from_head))?;
        Ok(self.batches[pos..].to_vec())
    }
}
