//! Bounded in-transaction fold.
//!
//! - [`BoundedFold::fold`]: sum a run of batches and replay their head chain,
//!   refusing ranges larger than the configured work budget.
//! - [`BoundedFold::reduce_range`]: fetch `[from, to)` from a ledger and fold it.
//!
//! Folding an empty range is a no-op: the total and head come back unchanged.

use actlog_crypto::chain::list_add;
use actlog_field::Field;
use serde::{Deserialize, Serialize};

use crate::error::{ReduceError, Result};
use crate::ledger::Ledger;
use crate::types::ActionBatch;

/// Default per-transaction work budget, in actions.
pub const DEFAULT_BOUNDED_BUDGET: usize = 32;

/// Knobs for the bounded fold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReplayConfig {
    /// Most actions one fold may touch.
    pub max_actions: usize,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            max_actions: DEFAULT_BOUNDED_BUDGET,
        }
    }
}

/// Result of a bounded fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldOutcome {
    /// Running total after the fold.
    pub total: Field,
    /// Head reached by replaying the folded batches.
    pub head: Field,
    /// Actions folded.
    pub actions: usize,
}

/// Fallible fold engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoundedFold {
    /// Budget configuration.
    pub cfg: ReplayConfig,
}

impl BoundedFold {
    /// Engine with the given budget.
    #[must_use]
    pub const fn new(cfg: ReplayConfig) -> Self {
        Self { cfg }
    }

    /// Fold `batches` onto `(start_sum, start_head)`.
    ///
    /// # Errors
    /// [`ReduceError::WorkBudgetExceeded`] if the batches hold more actions
    /// than the budget allows. Nothing is summed in that case.
    pub fn fold(
        &self,
        start_sum: Field,
        start_head: Field,
        batches: &[ActionBatch],
    ) -> Result<FoldOutcome> {
        let actions: usize = batches.iter().map(ActionBatch::len).sum();
        if actions > self.cfg.max_actions {
            return Err(ReduceError::WorkBudgetExceeded {
                actions,
                budget: self.cfg.max_actions,
            });
        }

        let mut total = start_sum;
        let mut head = start_head;
        for b in batches.iter().filter(|b| !b.is_empty()) {
            total += b.sum();
            head = list_add(head, b.hash());
        }
        Ok(FoldOutcome {
            total,
            head,
            actions,
        })
    }

    /// Fetch the batches between heads `from` and `to` and fold them.
    ///
    /// # Errors
    /// - [`ReduceError::UnknownActionState`] if the range is not on the ledger.
    /// - [`ReduceError::WorkBudgetExceeded`] as in [`fold`](Self::fold).
    /// - [`ReduceError::PreconditionMismatch`] if the replayed head does not
    ///   land on `to`.
    pub fn reduce_range<L: Ledger + ?Sized>(
        &self,
        ledger: &L,
        start_sum: Field,
        from: Field,
        to: Field,
    ) -> Result<FoldOutcome> {
        let batches = ledger.fetch_range(from, to)?;
        let out = self.fold(start_sum, from, &batches)?;
        if out.head != to {
            return Err(ReduceError::PreconditionMismatch {
                slot: "actionListState",
                expected: to,
                actual: out.head,
            });
        }
        Ok(out)
    }
}
