//! Error kinds raised by reducer transitions.
//!
//! Every transition either commits all of its writes or returns one of these
//! with nothing applied. None of them is retried internally; callers re-read
//! the persisted state and resubmit when [`ReduceError::is_retryable`] says so.

use actlog_field::Field;
use thiserror::Error;

/// Errors surfaced by the dispatcher, the reducers and the drain protocol.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReduceError {
    /// A persisted slot does not hold the value the transition was built against.
    #[error("precondition mismatch on {slot}: expected {expected}, found {actual}")]
    PreconditionMismatch {
        /// Name of the slot (or ledger head) that was checked.
        slot: &'static str,
        /// Value the caller or certificate expected.
        expected: Field,
        /// Value currently committed.
        actual: Field,
    },

    /// The transition needs a phase the contract is not in (e.g. draining before flattening).
    #[error("{method} requires {slot} to be set")]
    NotReady {
        /// Method that was called.
        method: &'static str,
        /// Slot that is still idle.
        slot: &'static str,
    },

    /// A lock slot is already held.
    #[error("{0} is already in progress")]
    AlreadyInProgress(&'static str),

    /// The proof backend rejected a certificate.
    #[error("{program} certificate failed verification")]
    CertificateInvalid {
        /// Program label of the rejected certificate.
        program: &'static str,
    },

    /// A non-dummy drain link does not hash to the current flattened-list pointer.
    #[error("drain link {index} does not decompose against the current flattened list")]
    DecompositionMismatch {
        /// Position of the offending link inside the batch.
        index: usize,
    },

    /// Zero is reserved as the padding sentinel.
    #[error("action value 0 is reserved for padding")]
    InvalidAction,

    /// The unprocessed range does not fit one transaction.
    #[error("bounded reduce over {actions} actions exceeds the per-transaction budget of {budget}")]
    WorkBudgetExceeded {
        /// Actions in the requested range.
        actions: usize,
        /// Configured budget.
        budget: usize,
    },

    /// The ledger has never produced this head.
    #[error("unknown action state {0}")]
    UnknownActionState(Field),

    /// More links than a drain batch holds.
    #[error("drain batch holds {len} links; at most {max} fit")]
    BatchTooLarge {
        /// Links supplied.
        len: usize,
        /// Batch capacity.
        max: usize,
    },
}

impl ReduceError {
    /// Whether re-reading committed state and resubmitting can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::PreconditionMismatch { .. } | Self::NotReady { .. } | Self::AlreadyInProgress(_)
        )
    }
}

/// Result alias for reducer transitions.
pub type Result<T> = std::result::Result<T, ReduceError>;
