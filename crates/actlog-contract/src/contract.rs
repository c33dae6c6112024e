//! The contract object and its externally callable method table.

use actlog_core::{DrainBatch, Ledger, ProofBackend, Result};
use actlog_field::Field;
use actlog_fold::{FlattenCertificate, ReduceCertificate};
use tracing::{info, warn};

use crate::config::ContractConfig;
use crate::state::{initialize, ContractState, StateSlot};
use crate::transitions;

/// Externally callable methods, with their arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Method {
    /// Dispatch one action.
    Submit(Field),
    /// Dispatch several actions as one ledger batch.
    SubmitBatch(Vec<Field>),
    /// In-transaction fold of everything unprocessed.
    ReduceBounded,
    /// Accept a terminal reduce certificate.
    CustomReduce(ReduceCertificate),
    /// Freeze the ledger head.
    CreateSnapshot,
    /// Accept a terminal flatten certificate.
    FlatSnapshot(FlattenCertificate),
    /// Consume one drain batch.
    SnapshotReduce(DrainBatch),
}

/// Names of every callable method, in declaration order.
pub const METHOD_NAMES: [&str; 7] = [
    "submit",
    "submitBatch",
    "reduceBounded",
    "customReduce",
    "createSnapshot",
    "flatSnapshot",
    "snapshotReduce",
];

impl Method {
    /// External name of the method.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Submit(_) => METHOD_NAMES[0],
            Self::SubmitBatch(_) => METHOD_NAMES[1],
            Self::ReduceBounded => METHOD_NAMES[2],
            Self::CustomReduce(_) => METHOD_NAMES[3],
            Self::CreateSnapshot => METHOD_NAMES[4],
            Self::FlatSnapshot(_) => METHOD_NAMES[5],
            Self::SnapshotReduce(_) => METHOD_NAMES[6],
        }
    }
}

/// Contract instance: persisted state, the verifying backend and config.
///
/// Every transition computes the next state on a copy and commits it only
/// on success, so a failed call leaves [`state`](Self::state) untouched.
#[derive(Debug, Clone)]
pub struct Contract<B> {
    state: ContractState,
    backend: B,
    config: ContractConfig,
}

impl<B: ProofBackend> Contract<B> {
    /// Freshly initialized contract.
    pub fn new(backend: B) -> Self {
        Self::with_state(initialize(), backend, ContractConfig::default())
    }

    /// Contract resumed from persisted state.
    pub const fn with_state(state: ContractState, backend: B, config: ContractConfig) -> Self {
        Self {
            state,
            backend,
            config,
        }
    }

    /// Replace the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ContractConfig) -> Self {
        self.config = config;
        self
    }

    /// Committed state.
    pub const fn state(&self) -> &ContractState {
        &self.state
    }

    /// Consume the contract, returning its committed state.
    pub fn into_state(self) -> ContractState {
        self.state
    }

    /// Verifying backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Active configuration.
    pub const fn config(&self) -> &ContractConfig {
        &self.config
    }

    /// Optimistic check that `slot` still holds a value read earlier.
    pub fn expect_state(&self, slot: StateSlot, expected: Field) -> Result<()> {
        self.state.expect(slot, expected)
    }

    fn commit(&mut self, method: &'static str, next: Result<ContractState>) -> Result<()> {
        match next {
            Ok(s) => {
                self.state = s;
                info!(
                    method,
                    total = %s.total_sum,
                    last = %s.last_processed_action_state,
                    phase = ?s.phase(),
                    "transition committed"
                );
                Ok(())
            }
            Err(e) => {
                warn!(method, error = %e, "transition rejected");
                Err(e)
            }
        }
    }

    /// Dispatch one action. Returns the new ledger head.
    pub fn submit<L: Ledger + ?Sized>(&self, ledger: &mut L, action: Field) -> Result<Field> {
        self.submit_batch(ledger, &[action])
    }

    /// Dispatch several actions as one batch; nothing is appended unless
    /// every action is valid.
    pub fn submit_batch<L: Ledger + ?Sized>(
        &self,
        ledger: &mut L,
        actions: &[Field],
    ) -> Result<Field> {
        if let Err(e) = transitions::validate_dispatch(actions) {
            warn!(method = "submit", error = %e, "dispatch rejected");
            return Err(e);
        }
        let head = ledger.append_action_batch(actions)?;
        info!(actions = actions.len(), head = %head, "dispatched");
        Ok(head)
    }

    /// Fold every unprocessed action in this transaction. Returns the new total.
    pub fn reduce_bounded<L: Ledger + ?Sized>(&mut self, ledger: &L) -> Result<Field> {
        let next = transitions::reduce_bounded(&self.state, ledger, &self.config);
        self.commit("reduceBounded", next)?;
        Ok(self.state.total_sum)
    }

    /// Accept a terminal reduce certificate. Returns the new total.
    pub fn custom_reduce<L: Ledger + ?Sized>(
        &mut self,
        ledger: &L,
        cert: &ReduceCertificate,
    ) -> Result<Field> {
        let next = transitions::custom_reduce(&self.state, ledger, &self.backend, cert);
        self.commit("customReduce", next)?;
        Ok(self.state.total_sum)
    }

    /// Freeze the ledger head. Returns the snapshot.
    pub fn create_snapshot<L: Ledger + ?Sized>(&mut self, ledger: &L) -> Result<Field> {
        let next = transitions::create_snapshot(&self.state, ledger);
        self.commit("createSnapshot", next)?;
        Ok(self.state.snapshot)
    }

    /// Accept a terminal flatten certificate. Returns the flattened-list
    /// pointer (zero if the cycle completed because there was nothing to drain).
    pub fn flat_snapshot(&mut self, cert: &FlattenCertificate) -> Result<Field> {
        let next = transitions::flat_snapshot(&self.state, &self.backend, cert);
        self.commit("flatSnapshot", next)?;
        Ok(self.state.flatten_snapshot)
    }

    /// Consume one drain batch. Returns `true` once the cycle completed.
    pub fn snapshot_reduce(&mut self, batch: &DrainBatch) -> Result<bool> {
        let next = transitions::snapshot_reduce(&self.state, batch);
        self.commit("snapshotReduce", next)?;
        Ok(self.state.snapshot.is_zero())
    }

    /// Dispatch `method` through the method table, returning the committed state.
    pub fn call<L: Ledger + ?Sized>(
        &mut self,
        ledger: &mut L,
        method: Method,
    ) -> Result<ContractState> {
        match method {
            Method::Submit(a) => {
                self.submit(ledger, a)?;
            }
            Method::SubmitBatch(actions) => {
                self.submit_batch(ledger, &actions)?;
            }
            Method::ReduceBounded => {
                self.reduce_bounded(&*ledger)?;
            }
            Method::CustomReduce(cert) => {
                self.custom_reduce(&*ledger, &cert)?;
            }
            Method::CreateSnapshot => {
                self.create_snapshot(&*ledger)?;
            }
            Method::FlatSnapshot(cert) => {
                self.flat_snapshot(&cert)?;
            }
            Method::SnapshotReduce(batch) => {
                self.snapshot_reduce(&batch)?;
            }
        }
        Ok(self.state)
    }
}
