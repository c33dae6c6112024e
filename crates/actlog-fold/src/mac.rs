//! Keyed transcript MAC standing in for a succinct proof system.
//!
//! The tag binds the program label and every claim field, in order, under a
//! secret key. Anyone holding the key can issue, so this is scaffolding for
//! a real recursive prover, **not** a zero-knowledge backend.

use std::fmt;

use actlog_core::{Certificate, Claim, ProofBackend};
use actlog_crypto::{Blake3Transcript, Transcript};
use anyhow::{ensure, Context, Result};

/// Transcript domain for certificate tags.
pub const DS_MAC: &str = "actlog/mac/v1";

/// Key used when none is configured.
pub const DEFAULT_KEY: [u8; 32] = *b"actlog-mac-backend-default-key!!";

/// MAC-based [`ProofBackend`].
#[derive(Clone, PartialEq, Eq)]
pub struct MacBackend {
    key: [u8; 32],
}

impl MacBackend {
    /// Backend keyed with `key`.
    #[must_use]
    pub const fn new(key: [u8; 32]) -> Self {
        Self { key }
    }

    /// Parse a 32-byte key from hex (64 digits, optional `0x`).
    pub fn from_hex(s: &str) -> Result<Self> {
        let t = s.trim();
        let t = t.strip_prefix("0x").unwrap_or(t);
        let bytes = hex::decode(t).context("backend key is not valid hex")?;
        ensure!(
            bytes.len() == 32,
            "backend key must be 32 bytes, got {}",
            bytes.len()
        );
        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        Ok(Self::new(key))
    }

    /// Short public fingerprint of the key, safe to log.
    #[must_use]
    pub fn key_id(&self) -> String {
        hex::encode(&blake3::hash(&self.key).as_bytes()[..4])
    }

    fn tag<C: Claim>(&self, claim: &C) -> [u8; 32] {
        let mut tr = Blake3Transcript::new(DS_MAC);
        tr.absorb("key", &self.key);
        tr.absorb("program", C::PROGRAM.as_bytes());
        let fields = claim.fields();
        tr.absorb_u64("arity", fields.len() as u64);
        for (label, x) in fields {
            tr.absorb_field(label, x);
        }
        tr.challenge_32("tag")
    }
}

impl Default for MacBackend {
    fn default() -> Self {
        Self::new(DEFAULT_KEY)
    }
}

impl fmt::Debug for MacBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacBackend")
            .field("key_id", &self.key_id())
            .finish()
    }
}

impl ProofBackend for MacBackend {
    fn issue<C: Claim>(&self, claim: C) -> Certificate<C> {
        let tag = self.tag(&claim);
        Certificate::from_parts(claim, tag)
    }

    fn verify<C: Claim>(&self, cert: &Certificate<C>) -> bool {
        self.tag(cert.claim()) == *cert.tag()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FlatClaim, ReduceClaim};
    use actlog_field::Field;

    fn claim(total: u64) -> ReduceClaim {
        let z = Field::zero();
        ReduceClaim {
            total: Field::from_u64(total),
            initial_sum: z,
            initial_action_state: z,
            action_sub_list_state: z,
            action_list_state: z,
        }
    }

    #[test]
    fn issued_certificates_verify() {
        let b = MacBackend::default();
        let c = b.issue(claim(5));
        assert!(b.verify(&c));
        assert!(b.require(&c).is_ok());
    }

    #[test]
    fn tampered_claim_or_tag_fails() {
        let b = MacBackend::default();
        let (mut cl, tag) = b.issue(claim(5)).into_parts();
        cl.total = Field::from_u64(6);
        assert!(!b.verify(&Certificate::from_parts(cl, tag)));

        let (cl, mut tag) = b.issue(claim(5)).into_parts();
        tag[0] ^= 1;
        assert!(!b.verify(&Certificate::from_parts(cl, tag)));
    }

    #[test]
    fn key_and_program_are_bound() {
        let a = MacBackend::default();
        let b = MacBackend::new([9u8; 32]);
        assert!(!b.verify(&a.issue(claim(1))));
        assert_ne!(a.key_id(), b.key_id());

        // Same field values under the other program label must not verify.
        let z = Field::zero();
        let flat = FlatClaim {
            initial_action_state: z,
            action_sub_list_state: z,
            action_list_state: z,
            flat_list_state: z,
        };
        let (_, tag) = a.issue(flat).into_parts();
        let red = ReduceClaim {
            total: z,
            initial_sum: z,
            initial_action_state: z,
            action_sub_list_state: z,
            action_list_state: z,
        };
        assert!(!a.verify(&Certificate::from_parts(red, tag)));
    }

    #[test]
    fn hex_keys() {
        let k = "0x".to_owned() + &"ab".repeat(32);
        assert_eq!(MacBackend::from_hex(&k).unwrap(), MacBackend::new([0xab; 32]));
        assert!(MacBackend::from_hex("abcd").is_err());
        assert!(MacBackend::from_hex("zz").is_err());
        assert!(!format!("{:?}", MacBackend::default()).contains("actlog-mac"));
    }
}
