// crates/actlog-crypto/src/lib.rs

//! Crypto substrate: the action-log hash-chain scheme and a Blake3 transcript.
//!
//! - [`chain`] defines how actions, batches of actions and sequences of
//!   batches collapse into single [`Field`] commitments. The ledger and every
//!   off-path builder use the same functions, so heads computed on either
//!   side compare equal.
//! - [`Blake3Transcript`] is a labelled absorb/challenge transcript used to
//!   bind certificate claims.
//!
//! ⚠️ **Security note:** the transcript models a domain-separated random
//! oracle using Blake3 and is scaffolding, **not** a final protocol design.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

pub mod chain;

pub use actlog_field::Field;
pub use chain::Domain;

use blake3::Hasher;

/// Fixed domain prefix to seed transcripts.
const TRANSCRIPT_PREFIX: &[u8] = b"actlog.transcript.v0";

/// Transcript interface used by proof backends.
///
/// Implementations should apply domain separation for both absorbs and challenges.
pub trait Transcript {
    /// Add raw bytes under a label (domain-separated).
    fn absorb(&mut self, label: &str, bytes: &[u8]);

    /// Convenience: absorb an unsigned 64-bit value (LE).
    fn absorb_u64(&mut self, label: &str, x: u64) {
        self.absorb(label, &x.to_le_bytes());
    }

    /// Convenience: absorb a field element by its canonical LE encoding.
    fn absorb_field(&mut self, label: &str, x: Field) {
        self.absorb(label, &x.to_le_bytes());
    }

    /// Squeeze `n` bytes as a challenge under `label`.
    ///
    /// Implementations should be deterministic with respect to the transcript state.
    #[must_use]
    fn challenge_bytes(&mut self, label: &str, n: usize) -> Vec<u8>;

    /// Squeeze a 32-byte challenge (tags, MACs).
    #[must_use]
    fn challenge_32(&mut self, label: &str) -> [u8; 32] {
        let v = self.challenge_bytes(label, 32);
        let mut out = [0u8; 32];
        out.copy_from_slice(&v);
        out
    }
}

/// Blake3-based transcript.
///
/// Deterministic, domain-separated random-oracle model suitable for scaffolding.
#[derive(Clone, Debug)]
pub struct Blake3Transcript {
    st: Hasher,
}

impl Blake3Transcript {
    /// Create a new transcript with a domain separation prefix.
    #[must_use]
    pub fn new(domain_sep: &str) -> Self {
        let mut st = Hasher::new();
        st.update(TRANSCRIPT_PREFIX);
        st.update(&(domain_sep.len() as u32).to_le_bytes());
        st.update(domain_sep.as_bytes());
        Self { st }
    }
}

impl Transcript for Blake3Transcript {
    fn absorb(&mut self, label: &str, bytes: &[u8]) {
        // tag "absorb", label length+bytes, payload length+bytes.
        self.st.update(b"absorb");
        self.st.update(&(label.len() as u32).to_le_bytes());
        self.st.update(label.as_bytes());
        self.st.update(&(bytes.len() as u32).to_le_bytes());
        self.st.update(bytes);
    }

    fn challenge_bytes(&mut self, label: &str, n: usize) -> Vec<u8> {
        let mut st = self.st.clone();
        st.update(b"challenge");
        st.update(&(label.len() as u32).to_le_bytes());
        st.update(label.as_bytes());

        let mut out = vec![0u8; n];
        st.finalize_xof().fill(&mut out);

        // Forward progress after a challenge.
        self.st.update(b"after_challenge");
        self.st.update(&(label.len() as u32).to_le_bytes());
        self.st.update(label.as_bytes());

        out
    }
}
