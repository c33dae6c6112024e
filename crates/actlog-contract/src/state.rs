//! Persisted contract state: four fixed-width field slots.
//!
//! `snapshot` and `flatten_snapshot` double as a two-phase lock; zero means
//! idle. [`Phase`] reads the drain-cycle position off those two slots.

use std::fmt;

use actlog_core::{ReduceError, Result};
use actlog_crypto::chain::initial_action_state;
use actlog_field::Field;
use serde::{Deserialize, Serialize};

/// Named slot of [`ContractState`], in layout order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StateSlot {
    /// Running fold result.
    TotalSum,
    /// Head already fully accounted for.
    LastProcessedActionState,
    /// Head frozen for the current drain cycle (0 when idle).
    Snapshot,
    /// Flattened-list pointer being drained (0 when idle).
    FlattenSnapshot,
}

impl StateSlot {
    /// All slots in layout order.
    pub const ALL: [Self; 4] = [
        Self::TotalSum,
        Self::LastProcessedActionState,
        Self::Snapshot,
        Self::FlattenSnapshot,
    ];

    /// External slot name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TotalSum => "totalSum",
            Self::LastProcessedActionState => "lastProcessedActionState",
            Self::Snapshot => "snapshot",
            Self::FlattenSnapshot => "flattenSnapshot",
        }
    }
}

impl fmt::Display for StateSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where the drain cycle stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No cycle in flight.
    Idle,
    /// Head frozen, waiting for a flatten certificate.
    Snapshotted,
    /// Flattened list accepted; drain batches are consumed here. A
    /// partially drained list is indistinguishable from the persisted slots,
    /// so draining has no phase of its own.
    Flattened,
}

/// The four persisted slots.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContractState {
    /// Running fold result.
    pub total_sum: Field,
    /// Head already fully accounted for.
    pub last_processed_action_state: Field,
    /// Frozen head being drained (0 when idle).
    pub snapshot: Field,
    /// Flattened-list pointer being drained (0 when idle).
    pub flatten_snapshot: Field,
}

/// State of a freshly deployed contract.
#[must_use]
pub fn initialize() -> ContractState {
    ContractState {
        total_sum: Field::zero(),
        last_processed_action_state: initial_action_state(),
        snapshot: Field::zero(),
        flatten_snapshot: Field::zero(),
    }
}

impl Default for ContractState {
    fn default() -> Self {
        initialize()
    }
}

impl ContractState {
    /// Read one slot.
    #[must_use]
    pub const fn get(&self, slot: StateSlot) -> Field {
        match slot {
            StateSlot::TotalSum => self.total_sum,
            StateSlot::LastProcessedActionState => self.last_processed_action_state,
            StateSlot::Snapshot => self.snapshot,
            StateSlot::FlattenSnapshot => self.flatten_snapshot,
        }
    }

    /// Fixed-width layout, in [`StateSlot::ALL`] order.
    #[must_use]
    pub const fn to_slots(&self) -> [Field; 4] {
        [
            self.total_sum,
            self.last_processed_action_state,
            self.snapshot,
            self.flatten_snapshot,
        ]
    }

    /// Inverse of [`to_slots`](Self::to_slots).
    #[must_use]
    pub const fn from_slots(slots: [Field; 4]) -> Self {
        Self {
            total_sum: slots[0],
            last_processed_action_state: slots[1],
            snapshot: slots[2],
            flatten_snapshot: slots[3],
        }
    }

    /// Drain-cycle position.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        if self.snapshot.is_zero() {
            Phase::Idle
        } else if self.flatten_snapshot.is_zero() {
            Phase::Snapshotted
        } else {
            Phase::Flattened
        }
    }

    /// Fail with `PreconditionMismatch` unless `slot` holds `expected`.
    pub fn expect(&self, slot: StateSlot, expected: Field) -> Result<()> {
        let actual = self.get(slot);
        if actual == expected {
            Ok(())
        } else {
            Err(ReduceError::PreconditionMismatch {
                slot: slot.name(),
                expected,
                actual,
            })
        }
    }
}

impl fmt::Display for ContractState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in StateSlot::ALL.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{:<26} {}", slot.name(), self.get(*slot))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_idle_at_genesis() {
        let s = initialize();
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.total_sum, Field::zero());
        assert_eq!(s.last_processed_action_state, initial_action_state());
    }

    #[test]
    fn slots_roundtrip_in_layout_order() {
        let s = ContractState::from_slots([1, 2, 3, 4].map(Field::from_u64));
        assert_eq!(s.snapshot, Field::from_u64(3));
        for (i, slot) in StateSlot::ALL.iter().enumerate() {
            assert_eq!(s.get(*slot), s.to_slots()[i]);
        }
        assert_eq!(s.phase(), Phase::Flattened);
    }

    #[test]
    fn phase_follows_lock_slots() {
        let idle = initialize();
        let snapped = ContractState {
            snapshot: Field::from_u64(9),
            ..idle
        };
        assert_eq!(snapped.phase(), Phase::Snapshotted);
        // Fresh and partly drained lists differ only in the pointer value.
        let fresh = ContractState {
            flatten_snapshot: Field::from_u64(11),
            ..snapped
        };
        let drained = ContractState {
            flatten_snapshot: Field::from_u64(12),
            total_sum: Field::from_u64(5),
            ..snapped
        };
        assert_eq!(fresh.phase(), Phase::Flattened);
        assert_eq!(drained.phase(), Phase::Flattened);
    }

    #[test]
    fn expect_reports_slot_name() {
        let s = initialize();
        assert!(s.expect(StateSlot::TotalSum, Field::zero()).is_ok());
        let err = s.expect(StateSlot::TotalSum, Field::one()).unwrap_err();
        assert_eq!(
            err,
            ReduceError::PreconditionMismatch {
                slot: "totalSum",
                expected: Field::one(),
                actual: Field::zero(),
            }
        );
    }

    #[test]
    fn json_uses_external_slot_names() {
        let v = serde_json::to_value(initialize()).unwrap();
        assert_eq!(v["totalSum"], 0);
        assert_eq!(v["flattenSnapshot"], 0);
    }
}
