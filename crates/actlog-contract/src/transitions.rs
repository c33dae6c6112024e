//! Pure state transitions.
//!
//! Each function reads a state, checks its preconditions and returns the
//! next state. Nothing here writes; the caller commits the returned value
//! only when the whole transition succeeded.

use actlog_core::{
    validate_action, BoundedFold, DrainBatch, Ledger, ProofBackend, ReduceError, Result,
};
use actlog_crypto::chain::{empty_action_list_hash, empty_flat_list_hash};
use actlog_field::Field;
use actlog_fold::{FlattenCertificate, ReduceCertificate};
use tracing::debug;

use crate::config::ContractConfig;
use crate::state::{ContractState, StateSlot};

fn ensure_no_drain(state: &ContractState) -> Result<()> {
    if state.snapshot.is_zero() {
        Ok(())
    } else {
        Err(ReduceError::AlreadyInProgress(StateSlot::Snapshot.name()))
    }
}

fn ensure_eq(slot: &'static str, expected: Field, actual: Field) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ReduceError::PreconditionMismatch {
            slot,
            expected,
            actual,
        })
    }
}

/// Validate every action of one dispatch, before anything is appended.
pub fn validate_dispatch(actions: &[Field]) -> Result<()> {
    actions.iter().try_for_each(|&a| validate_action(a).map(drop))
}

/// Fold everything after `lastProcessedActionState` in-transaction.
pub fn reduce_bounded<L: Ledger + ?Sized>(
    state: &ContractState,
    ledger: &L,
    cfg: &ContractConfig,
) -> Result<ContractState> {
    ensure_no_drain(state)?;
    let head = ledger.authenticated_head();
    let out = BoundedFold::new(cfg.replay()).reduce_range(
        ledger,
        state.total_sum,
        state.last_processed_action_state,
        head,
    )?;
    Ok(ContractState {
        total_sum: out.total,
        last_processed_action_state: out.head,
        ..*state
    })
}

/// Accept a terminal reduce certificate.
pub fn custom_reduce<B, L>(
    state: &ContractState,
    ledger: &L,
    backend: &B,
    cert: &ReduceCertificate,
) -> Result<ContractState>
where
    B: ProofBackend,
    L: Ledger + ?Sized,
{
    ensure_no_drain(state)?;
    backend.require(cert)?;
    let c = cert.claim();
    ensure_eq(
        StateSlot::LastProcessedActionState.name(),
        c.initial_action_state,
        state.last_processed_action_state,
    )?;
    ensure_eq(StateSlot::TotalSum.name(), c.initial_sum, state.total_sum)?;
    ensure_eq(
        "actionSubListState",
        empty_action_list_hash(),
        c.action_sub_list_state,
    )?;
    ensure_eq(
        "actionListState",
        c.action_list_state,
        ledger.authenticated_head(),
    )?;
    Ok(ContractState {
        total_sum: c.total,
        last_processed_action_state: c.action_list_state,
        ..*state
    })
}

/// Freeze the current ledger head.
pub fn create_snapshot<L: Ledger + ?Sized>(
    state: &ContractState,
    ledger: &L,
) -> Result<ContractState> {
    ensure_no_drain(state)?;
    if !state.flatten_snapshot.is_zero() {
        return Err(ReduceError::AlreadyInProgress(
            StateSlot::FlattenSnapshot.name(),
        ));
    }
    Ok(ContractState {
        snapshot: ledger.authenticated_head(),
        ..*state
    })
}

/// Accept a terminal flatten certificate over the snapshotted range.
///
/// An empty flattened list has nothing to drain, so the cycle completes here.
pub fn flat_snapshot<B: ProofBackend>(
    state: &ContractState,
    backend: &B,
    cert: &FlattenCertificate,
) -> Result<ContractState> {
    if !state.flatten_snapshot.is_zero() {
        return Err(ReduceError::AlreadyInProgress(
            StateSlot::FlattenSnapshot.name(),
        ));
    }
    if state.snapshot.is_zero() {
        return Err(ReduceError::NotReady {
            method: "flatSnapshot",
            slot: StateSlot::Snapshot.name(),
        });
    }
    backend.require(cert)?;
    let c = cert.claim();
    ensure_eq(
        StateSlot::LastProcessedActionState.name(),
        c.initial_action_state,
        state.last_processed_action_state,
    )?;
    ensure_eq(
        "actionSubListState",
        empty_action_list_hash(),
        c.action_sub_list_state,
    )?;
    ensure_eq(StateSlot::Snapshot.name(), c.action_list_state, state.snapshot)?;

    if c.flat_list_state == empty_flat_list_hash() {
        return Ok(complete_cycle(state));
    }
    Ok(ContractState {
        flatten_snapshot: c.flat_list_state,
        ..*state
    })
}

/// Consume one drain batch.
pub fn snapshot_reduce(state: &ContractState, batch: &DrainBatch) -> Result<ContractState> {
    if state.flatten_snapshot.is_zero() {
        return Err(ReduceError::NotReady {
            method: "snapshotReduce",
            slot: StateSlot::FlattenSnapshot.name(),
        });
    }

    let mut pointer = state.flatten_snapshot;
    let mut total = state.total_sum;
    for (index, link) in batch.iter().enumerate() {
        if link.is_dummy() {
            continue;
        }
        if link.head() != pointer {
            return Err(ReduceError::DecompositionMismatch { index });
        }
        pointer = link.tail;
        total += link.action;
        debug!(index, action = %link.action, "drain: link consumed");
    }

    let next = ContractState {
        total_sum: total,
        flatten_snapshot: pointer,
        ..*state
    };
    if pointer == empty_flat_list_hash() {
        Ok(complete_cycle(&next))
    } else {
        Ok(next)
    }
}

fn complete_cycle(state: &ContractState) -> ContractState {
    ContractState {
        last_processed_action_state: state.snapshot,
        snapshot: Field::zero(),
        flatten_snapshot: Field::zero(),
        ..*state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::initialize;
    use actlog_core::{FlatListLink, MemoryLedger};
    use actlog_fold::{flat_certificate_from_ledger, MacBackend};

    fn ledger(actions: &[u64]) -> MemoryLedger {
        let mut l = MemoryLedger::new();
        for &a in actions {
            l.append_action_batch(&[Field::from_u64(a)]).unwrap();
        }
        l
    }

    #[test]
    fn dummy_only_batch_is_neutral() {
        let l = ledger(&[4, 5]);
        let b = MacBackend::default();
        let s = create_snapshot(&initialize(), &l).unwrap();
        let (c, _) = flat_certificate_from_ledger(
            &b,
            &l,
            s.last_processed_action_state,
            s.snapshot,
        )
        .unwrap();
        let s = flat_snapshot(&s, &b, &c).unwrap();
        let after = snapshot_reduce(&s, &DrainBatch::empty()).unwrap();
        assert_eq!(after, s);
    }

    #[test]
    fn wrong_link_reports_its_index() {
        let l = ledger(&[4, 5]);
        let b = MacBackend::default();
        let s = create_snapshot(&initialize(), &l).unwrap();
        let (c, mut list) = flat_certificate_from_ledger(
            &b,
            &l,
            s.last_processed_action_state,
            s.snapshot,
        )
        .unwrap();
        let s = flat_snapshot(&s, &b, &c).unwrap();
        let top = list.pop().unwrap();
        let forged = FlatListLink::new(top.tail, Field::from_u64(99));
        let batch = DrainBatch::try_from(&[FlatListLink::dummy(), forged][..]).unwrap();
        assert_eq!(
            snapshot_reduce(&s, &batch),
            Err(ReduceError::DecompositionMismatch { index: 1 })
        );
    }

    #[test]
    fn drain_requires_flattened_list() {
        assert_eq!(
            snapshot_reduce(&initialize(), &DrainBatch::empty()),
            Err(ReduceError::NotReady {
                method: "snapshotReduce",
                slot: "flattenSnapshot"
            })
        );
    }

    #[test]
    fn zero_in_dispatch_rejects_whole_batch() {
        let batch = [Field::one(), Field::zero()];
        assert_eq!(validate_dispatch(&batch), Err(ReduceError::InvalidAction));
        assert!(validate_dispatch(&[Field::one()]).is_ok());
    }
}
