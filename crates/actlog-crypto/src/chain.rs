//! Hash-chain scheme for the action log.
//!
//! Three levels of commitment:
//!
//! - an **action** hashes under [`Domain::Action`];
//! - a **batch** (the actions of one transaction) folds action hashes into a
//!   sub-list hash starting from [`empty_action_list_hash`];
//! - the **head** folds completed sub-list hashes, starting from
//!   [`initial_action_state`] for a fresh ledger.
//!
//! Separately, [`flat_list_add`] builds a single-level LIFO list over the
//! same actions, terminated by [`empty_flat_list_hash`].
//!
//! Every combinator is `Blake3(salt(prefix) || inputs)` squeezed to 16 bytes
//! and reduced into the field. The salt is the prefix right-padded with zero
//! bytes to [`SALT_WIDTH`]; salted states are computed once per process and
//! cloned per call. Outputs are wire-stable: changing a prefix or the
//! encoding changes every head.

use std::sync::OnceLock;

use actlog_field::Field;
use blake3::Hasher;

/// Width every prefix is padded to before it seeds a hash.
pub const SALT_WIDTH: usize = 32;

/// Domain-separation prefixes of the hash-chain scheme.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Domain {
    /// Single action hash.
    Action,
    /// Fold of one action hash into a sub-list (batch) hash.
    SubList,
    /// Fold of a completed sub-list hash into the outer head.
    List,
    /// Empty sub-list sentinel.
    ActionsEmpty,
    /// Genesis head of a fresh ledger.
    ActionStateGenesis,
    /// Fold of one action into the flattened LIFO list.
    FlatList,
    /// Empty flattened-list sentinel.
    FlatListEmpty,
}

/// Number of [`Domain`] variants.
pub const DOMAIN_COUNT: usize = 7;

impl Domain {
    /// All domains, in table order.
    pub const ALL: [Self; DOMAIN_COUNT] = [
        Self::Action,
        Self::SubList,
        Self::List,
        Self::ActionsEmpty,
        Self::ActionStateGenesis,
        Self::FlatList,
        Self::FlatListEmpty,
    ];

    /// Borrow the canonical prefix string.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Action => "actlog/event",
            Self::SubList => "actlog/sub-list",
            Self::List => "actlog/list",
            Self::ActionsEmpty => "actlog/actions-empty",
            Self::ActionStateGenesis => "actlog/action-state-genesis",
            Self::FlatList => "actlog/flat-list",
            Self::FlatListEmpty => "actlog/flat-list-empty",
        }
    }

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

// Every prefix must leave at least one zero byte of padding.
const _: () = {
    let mut i = 0;
    while i < DOMAIN_COUNT {
        assert!(Domain::ALL[i].as_str().len() < SALT_WIDTH);
        i += 1;
    }
};

static SALTS: OnceLock<[Hasher; DOMAIN_COUNT]> = OnceLock::new();

fn salt_for(domain: Domain) -> Hasher {
    let mut buf = [0u8; SALT_WIDTH];
    let p = domain.as_str().as_bytes();
    buf[..p.len()].copy_from_slice(p);
    let mut h = Hasher::new();
    h.update(&buf);
    h
}

#[inline]
fn salted(domain: Domain) -> Hasher {
    SALTS.get_or_init(|| Domain::ALL.map(salt_for))[domain.index()].clone()
}

#[inline]
fn squeeze(h: &Hasher) -> Field {
    let mut out = [0u8; 16];
    h.finalize_xof().fill(&mut out);
    Field::from_u128(u128::from_le_bytes(out))
}

/// Hash `inputs` under `domain`.
#[must_use]
pub fn hash_with_prefix(domain: Domain, inputs: &[Field]) -> Field {
    let mut h = salted(domain);
    for x in inputs {
        h.update(&x.to_le_bytes());
    }
    squeeze(&h)
}

/// Hash of the zero-length input under `domain`.
#[must_use]
pub fn empty_hash_with_prefix(domain: Domain) -> Field {
    squeeze(&salted(domain))
}

/// Commitment to a single action.
#[inline]
#[must_use]
pub fn action_hash(action: Field) -> Field {
    hash_with_prefix(Domain::Action, &[action])
}

/// Fold one action hash into a sub-list hash.
#[inline]
#[must_use]
pub fn sub_list_add(hash: Field, action_hash: Field) -> Field {
    hash_with_prefix(Domain::SubList, &[hash, action_hash])
}

/// Fold one raw action into a sub-list hash.
#[inline]
#[must_use]
pub fn action_list_add(hash: Field, action: Field) -> Field {
    sub_list_add(hash, action_hash(action))
}

/// Fold a completed sub-list hash into the outer head.
#[inline]
#[must_use]
pub fn list_add(head: Field, sub_list_hash: Field) -> Field {
    hash_with_prefix(Domain::List, &[head, sub_list_hash])
}

/// Push one action onto the flattened LIFO list whose current hash is `tail`.
#[inline]
#[must_use]
pub fn flat_list_add(tail: Field, action: Field) -> Field {
    hash_with_prefix(Domain::FlatList, &[tail, action])
}

/// Empty sub-list sentinel.
#[must_use]
pub fn empty_action_list_hash() -> Field {
    empty_hash_with_prefix(Domain::ActionsEmpty)
}

/// Head of a ledger that has never accepted a batch.
#[must_use]
pub fn initial_action_state() -> Field {
    empty_hash_with_prefix(Domain::ActionStateGenesis)
}

/// Empty flattened-list sentinel.
#[must_use]
pub fn empty_flat_list_hash() -> Field {
    empty_hash_with_prefix(Domain::FlatListEmpty)
}

/// Sub-list hash of one batch.
#[must_use]
pub fn batch_hash(actions: &[Field]) -> Field {
    actions
        .iter()
        .fold(empty_action_list_hash(), |h, &a| action_list_add(h, a))
}

/// Extend `head` by a sequence of batches.
///
/// Empty batches leave the head unchanged, matching a ledger that never
/// records a batch without actions.
#[must_use]
pub fn chain_batches<'a, I>(head: Field, batches: I) -> Field
where
    I: IntoIterator<Item = &'a [Field]>,
{
    batches
        .into_iter()
        .filter(|b| !b.is_empty())
        .fold(head, |h, b| list_add(h, batch_hash(b)))
}
