//! Proof-backend abstraction.
//!
//! A backend turns a public [`Claim`] into a [`Certificate`] off-path
//! ([`ProofBackend::issue`]) and checks certificates on the validated path
//! ([`ProofBackend::verify`]). Verification is a pure function of the claim,
//! the tag and whatever key material the backend was constructed with; there
//! is no ambient verifier state.
//!
//! ## Contracts implementors should uphold
//! - `verify(&issue(c))` holds for every claim `c`.
//! - Changing any field reported by [`Claim::fields`], or the program label,
//!   must make `verify` fail.
//! - Neither method panics on malformed input.

use actlog_field::Field;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::certificate::Certificate;
use crate::error::{ReduceError, Result};

/// Public statement carried by a certificate.
pub trait Claim: Clone + Serialize + DeserializeOwned {
    /// Stable label of the program that produces this claim.
    const PROGRAM: &'static str;

    /// Canonical, fixed-order field encoding bound by the certificate tag.
    fn fields(&self) -> Vec<(&'static str, Field)>;
}

/// Issue and verify certificates.
///
/// ```ignore
/// let cert = backend.issue(claim);
/// backend.require(&cert)?;
/// ```
pub trait ProofBackend {
    /// Produce a certificate for `claim`.
    fn issue<C: Claim>(&self, claim: C) -> Certificate<C>;

    /// Whether `cert` carries a valid tag for its claim.
    #[must_use]
    fn verify<C: Claim>(&self, cert: &Certificate<C>) -> bool;

    /// [`verify`](Self::verify), mapped to [`ReduceError::CertificateInvalid`].
    fn require<C: Claim>(&self, cert: &Certificate<C>) -> Result<()> {
        if self.verify(cert) {
            Ok(())
        } else {
            Err(ReduceError::CertificateInvalid {
                program: C::PROGRAM,
            })
        }
    }
}

impl<B: ProofBackend + ?Sized> ProofBackend for &B {
    fn issue<C: Claim>(&self, claim: C) -> Certificate<C> {
        (**self).issue(claim)
    }

    fn verify<C: Claim>(&self, cert: &Certificate<C>) -> bool {
        (**self).verify(cert)
    }
}
