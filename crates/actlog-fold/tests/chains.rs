//! End-to-end properties of the reduce and flatten chains against a ledger.

use actlog_core::{Ledger, MemoryLedger, ProofBackend, BATCH_SIZE};
use actlog_field::Field;
use actlog_fold::{
    flat_certificate_from_ledger, reduce_certificate_from_ledger, MacBackend, ReduceBuilder,
};
use proptest::prelude::*;

fn arb_batches() -> impl Strategy<Value = Vec<Vec<u64>>> {
    prop::collection::vec(prop::collection::vec(1u64..10_000, 1..6), 0..8)
}

fn ledger_with(batches: &[Vec<u64>]) -> MemoryLedger {
    let mut l = MemoryLedger::new();
    for b in batches {
        let fs: Vec<Field> = b.iter().copied().map(Field::from_u64).collect();
        l.append_action_batch(&fs).unwrap();
    }
    l
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 48,
        .. ProptestConfig::default()
    })]

    // Property: the reduce chain reproduces the ledger head and the plain sum.
    #[test]
    fn reduce_chain_matches_ledger(batches in arb_batches(), start in 0u64..100) {
        let l = ledger_with(&batches);
        let g = actlog_crypto::chain::initial_action_state();
        let backend = MacBackend::default();
        let c = reduce_certificate_from_ledger(&backend, &l, Field::from_u64(start), g).unwrap();
        let sum: u64 = batches.iter().flatten().sum();
        prop_assert!(backend.verify(&c));
        prop_assert_eq!(c.claim().total, Field::from_u64(start + sum));
        prop_assert_eq!(c.claim().action_list_state, l.authenticated_head());
    }

    // Property: draining the flat list yields every action exactly once, newest first,
    // in ceil(len / BATCH_SIZE) batches.
    #[test]
    fn flat_list_drains_in_reverse(batches in arb_batches()) {
        let l = ledger_with(&batches);
        let g = actlog_crypto::chain::initial_action_state();
        let (c, mut list) =
            flat_certificate_from_ledger(MacBackend::default(), &l, g, l.authenticated_head()).unwrap();
        prop_assert_eq!(c.claim().flat_list_state, list.hash());

        let n = list.len();
        let drained: Vec<_> = list.drain_batches().collect();
        prop_assert_eq!(drained.len(), n.div_ceil(BATCH_SIZE));

        let got: Vec<u64> = drained
            .iter()
            .flat_map(|b| b.iter())
            .filter(|link| !link.is_dummy())
            .map(|link| link.action.as_u64())
            .collect();
        let mut expect: Vec<u64> = batches.iter().flatten().copied().collect();
        expect.reverse();
        prop_assert_eq!(got, expect);
    }
}

#[test]
fn builder_keeps_last_good_certificate_on_error() {
    let backend = MacBackend::default();
    let g = actlog_crypto::chain::initial_action_state();
    let mut b = ReduceBuilder::new(&backend, Field::zero(), g);
    b.push_batch(&actlog_core::ActionBatch::from(&[1u64, 2][..]))
        .unwrap();
    let bad = actlog_core::ActionBatch::from(&[3u64, 0][..]);
    assert!(b.push_batch(&bad).is_err());
    let c = b.finish();
    assert_eq!(c.claim().total, Field::from_u64(3));
    assert!(backend.verify(&c));
}
