//! Ledger head chaining and bounded-fold invariants.
//!
//! The in-memory ledger must chain heads exactly like the hash-chain scheme,
//! and the bounded fold must agree with a plain sum whenever it accepts.

use actlog_core::{ActionBatch, BoundedFold, Ledger, MemoryLedger, ReduceError, ReplayConfig};
use actlog_crypto::chain::{chain_batches, initial_action_state};
use actlog_field::Field;
use proptest::prelude::*;

fn arb_batches() -> impl Strategy<Value = Vec<Vec<u64>>> {
    prop::collection::vec(prop::collection::vec(1u64..1_000, 0..4), 0..8)
}

fn to_fields(b: &[u64]) -> Vec<Field> {
    b.iter().copied().map(Field::from_u64).collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    // Property: the ledger head is the chain fold over every batch, empty ones skipped.
    #[test]
    fn head_is_chain_fold(batches in arb_batches()) {
        let mut l = MemoryLedger::new();
        let fields: Vec<Vec<Field>> = batches.iter().map(|b| to_fields(b)).collect();
        for b in &fields {
            l.append_action_batch(b).unwrap();
        }
        let expect = chain_batches(initial_action_state(), fields.iter().map(Vec::as_slice));
        prop_assert_eq!(l.authenticated_head(), expect);
        prop_assert_eq!(
            l.batch_count(),
            fields.iter().filter(|b| !b.is_empty()).count()
        );
    }

    // Property: a fold over any suffix lands on the current head with the plain sum.
    #[test]
    fn fold_from_any_checkpoint(batches in arb_batches(), cut in 0usize..8) {
        let mut l = MemoryLedger::new();
        let mut checkpoint = l.authenticated_head();
        let mut expect = 0u64;
        for (i, b) in batches.iter().enumerate() {
            if i == cut {
                checkpoint = l.authenticated_head();
                expect = 0;
            }
            l.append_action_batch(&to_fields(b)).unwrap();
            expect += b.iter().sum::<u64>();
        }
        if cut >= batches.len() {
            checkpoint = l.authenticated_head();
            expect = 0;
        }

        let engine = BoundedFold::new(ReplayConfig { max_actions: usize::MAX });
        let out = engine
            .reduce_range(&l, Field::zero(), checkpoint, l.authenticated_head())
            .unwrap();
        prop_assert_eq!(out.total, Field::from_u64(expect));
        prop_assert_eq!(out.head, l.authenticated_head());
    }
}

#[test]
fn budget_applies_to_whole_range() {
    let mut l = MemoryLedger::new();
    let g = l.authenticated_head();
    for _ in 0..3 {
        l.append_action_batch(&to_fields(&[1, 1])).unwrap();
    }
    let engine = BoundedFold::new(ReplayConfig { max_actions: 5 });
    let err = engine
        .reduce_range(&l, Field::zero(), g, l.authenticated_head())
        .unwrap_err();
    assert_eq!(
        err,
        ReduceError::WorkBudgetExceeded {
            actions: 6,
            budget: 5
        }
    );
}

#[test]
fn fetch_returns_batches_in_order() {
    let l = MemoryLedger::from_batches(vec![
        ActionBatch::from(&[1u64][..]),
        ActionBatch::from(&[2u64, 3][..]),
    ]);
    let got = l.fetch_actions(initial_action_state()).unwrap();
    let sums: Vec<u64> = got.iter().map(|b| b.sum().as_u64()).collect();
    assert_eq!(sums, vec![1, 5]);
}
