//! Canonical data model shared across the ACTLOG workspace.
//!
//! Everything here is a plain value: batches of actions as the ledger stores
//! them, links of the flattened LIFO list, and the fixed-size drain batch the
//! contract consumes. Serialized forms stay conservative (serde, field
//! elements as canonical `u64`).

use std::fmt;

use actlog_crypto::chain::{batch_hash, flat_list_add};
use actlog_field::Field;
use serde::{Deserialize, Serialize};

use crate::error::{ReduceError, Result};

/// Number of links consumed by one drain transaction.
pub const BATCH_SIZE: usize = 5;

/// Reject the reserved padding sentinel.
///
/// # Errors
/// [`ReduceError::InvalidAction`] when `action` is zero.
#[inline]
pub const fn validate_action(action: Field) -> Result<Field> {
    if action.is_zero() {
        Err(ReduceError::InvalidAction)
    } else {
        Ok(action)
    }
}

/// Actions submitted in one external transaction, in submission order.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ActionBatch {
    /// The actions, oldest first.
    pub actions: Vec<Field>,
}

impl ActionBatch {
    /// Wrap a vector of actions (no validation).
    #[inline]
    #[must_use]
    pub const fn new(actions: Vec<Field>) -> Self {
        Self { actions }
    }

    /// Number of actions.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the batch holds no actions.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Borrow the actions.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Field] {
        &self.actions
    }

    /// Sub-list hash the ledger folds into its head for this batch.
    #[must_use]
    pub fn hash(&self) -> Field {
        batch_hash(&self.actions)
    }

    /// Plain sum of the batch.
    #[must_use]
    pub fn sum(&self) -> Field {
        self.actions.iter().copied().sum()
    }
}

impl From<Vec<Field>> for ActionBatch {
    fn from(actions: Vec<Field>) -> Self {
        Self::new(actions)
    }
}

impl From<&[u64]> for ActionBatch {
    fn from(xs: &[u64]) -> Self {
        Self::new(xs.iter().copied().map(Field::from_u64).collect())
    }
}

/// One node of the flattened list: `action` plus the commitment of
/// everything pushed before it.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlatListLink {
    /// Flattened-list hash before `action` was pushed.
    pub tail: Field,
    /// The action carried by this node (zero marks a dummy).
    pub action: Field,
}

impl FlatListLink {
    /// Construct a link.
    #[inline]
    #[must_use]
    pub const fn new(tail: Field, action: Field) -> Self {
        Self { tail, action }
    }

    /// The padding link `{tail: 0, action: 0}`.
    #[inline]
    #[must_use]
    pub const fn dummy() -> Self {
        Self::new(Field::zero(), Field::zero())
    }

    /// Dummy links carry the zero action.
    #[inline]
    #[must_use]
    pub const fn is_dummy(&self) -> bool {
        self.action.is_zero()
    }

    /// Flattened-list hash this link decomposes.
    #[inline]
    #[must_use]
    pub fn head(&self) -> Field {
        flat_list_add(self.tail, self.action)
    }
}

impl fmt::Display for FlatListLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dummy() {
            f.write_str("<dummy>")
        } else {
            write!(f, "{} <- {}", self.action, self.tail)
        }
    }
}

/// Exactly [`BATCH_SIZE`] links, right-padded with dummies.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrainBatch {
    /// Links in pop order.
    pub links: [FlatListLink; BATCH_SIZE],
}

impl DrainBatch {
    /// A batch of dummies only.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            links: [FlatListLink::dummy(); BATCH_SIZE],
        }
    }

    /// Number of non-dummy links.
    #[must_use]
    pub fn real_count(&self) -> usize {
        self.links.iter().filter(|l| !l.is_dummy()).count()
    }

    /// Iterate the links in order.
    pub fn iter(&self) -> impl Iterator<Item = &FlatListLink> {
        self.links.iter()
    }
}

impl Default for DrainBatch {
    fn default() -> Self {
        Self::empty()
    }
}

impl TryFrom<&[FlatListLink]> for DrainBatch {
    type Error = ReduceError;

    fn try_from(links: &[FlatListLink]) -> Result<Self> {
        if links.len() > BATCH_SIZE {
            return Err(ReduceError::BatchTooLarge {
                len: links.len(),
                max: BATCH_SIZE,
            });
        }
        let mut out = Self::empty();
        out.links[..links.len()].copy_from_slice(links);
        Ok(out)
    }
}
