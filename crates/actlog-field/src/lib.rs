//! Small prime field used for every value the reducer touches.
//!
//! - `Fp64<P>`: prime field modulo a 64-bit prime `P` (const generic).
//! - [`Field`]: the Goldilocks instantiation `p = 2^64 - 2^32 + 1`. Actions,
//!   running sums, hash-chain heads and flattened-list pointers are all
//!   `Field` values.
//! - Wide reduction ([`Fp64::from_u128`]) so hash outputs can be mapped into
//!   the field without bias worth worrying about at this width.
//!
//! Serialization is the canonical `u64` representative. Decoding rejects
//! non-canonical values so two encodings never name the same element.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::doc_markdown
)]

use core::fmt;
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 64-bit prime field element (const generic modulus).
///
/// The representative is always canonical (`< P`); construct through
/// [`Fp64::from_u64`], [`Fp64::from_le_bytes`], parsing or serde.
///
/// ```compile_fail
/// let x = actlog_field::Field(actlog_field::GOLDILOCKS);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fp64<const P: u64>(u64);

impl<const P: u64> Fp64<P> {
    /// Zero.
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// One.
    #[inline]
    #[must_use]
    pub const fn one() -> Self {
        Self(1 % P)
    }

    /// Whether this is the zero element (the reserved padding sentinel).
    #[inline]
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Add two raw residues modulo `P` without overflow (via u128).
    #[inline]
    #[must_use]
    pub fn add_raw(a: u64, b: u64) -> u64 {
        let s = u128::from(a) + u128::from(b);
        let s = if s >= u128::from(P) { s - u128::from(P) } else { s };
        s as u64
    }

    /// Subtract two raw residues modulo `P` without overflow (via u128).
    #[inline]
    #[must_use]
    pub fn sub_raw(a: u64, b: u64) -> u64 {
        if a >= b {
            a - b
        } else {
            (u128::from(a) + u128::from(P) - u128::from(b)) as u64
        }
    }

    /// From `u64` reduced mod `P`.
    #[inline]
    #[must_use]
    pub const fn from_u64(x: u64) -> Self {
        Self(x % P)
    }

    /// From `u128` reduced mod `P` (hash-to-field).
    #[inline]
    #[must_use]
    pub const fn from_u128(x: u128) -> Self {
        Self((x % P as u128) as u64)
    }

    /// Canonical `u64` representative.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Into little-endian 8 bytes (canonical for this field).
    #[inline]
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    /// From little-endian bytes; `None` if the value is not canonical.
    #[inline]
    #[must_use]
    pub const fn from_le_bytes(bytes: [u8; 8]) -> Option<Self> {
        let v = u64::from_le_bytes(bytes);
        if v < P {
            Some(Self(v))
        } else {
            None
        }
    }

    /// Additive inverse.
    #[inline]
    #[must_use]
    pub const fn neg(self) -> Self {
        if self.0 == 0 {
            self
        } else {
            Self(P - self.0)
        }
    }
}

impl<const P: u64> Default for Fp64<P> {
    #[inline]
    fn default() -> Self {
        Self::zero()
    }
}

impl<const P: u64> From<u64> for Fp64<P> {
    #[inline]
    fn from(x: u64) -> Self {
        Self::from_u64(x)
    }
}

impl<const P: u64> Add for Fp64<P> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(Self::add_raw(self.0, rhs.0))
    }
}
impl<const P: u64> Sub for Fp64<P> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(Self::sub_raw(self.0, rhs.0))
    }
}
impl<const P: u64> AddAssign for Fp64<P> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}
impl<const P: u64> SubAssign for Fp64<P> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
impl<const P: u64> Neg for Fp64<P> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::neg(self)
    }
}

impl<const P: u64> core::iter::Sum for Fp64<P> {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, x| acc + x)
    }
}

impl<const P: u64> fmt::Display for Fp64<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when parsing a decimal field element fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseFieldError {
    /// Not a decimal `u64`.
    NotANumber(String),
    /// Parsed fine but is `>= P`.
    NonCanonical(u64),
}

impl fmt::Display for ParseFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotANumber(s) => write!(f, "not a decimal field element: {s:?}"),
            Self::NonCanonical(v) => write!(f, "value {v} is not below the field modulus"),
        }
    }
}

impl std::error::Error for ParseFieldError {}

impl<const P: u64> FromStr for Fp64<P> {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let v: u64 = t
            .parse()
            .map_err(|_| ParseFieldError::NotANumber(t.to_owned()))?;
        if v >= P {
            return Err(ParseFieldError::NonCanonical(v));
        }
        Ok(Self(v))
    }
}

impl<const P: u64> Serialize for Fp64<P> {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(self.0)
    }
}

impl<'de, const P: u64> Deserialize<'de> for Fp64<P> {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let v = u64::deserialize(d)?;
        if v >= P {
            return Err(serde::de::Error::custom(format!(
                "non-canonical field element {v}"
            )));
        }
        Ok(Self(v))
    }
}

/* ---------------- Goldilocks ---------------- */

/// Goldilocks prime `p = 2^64 - 2^32 + 1`.
pub const GOLDILOCKS: u64 = 0xffff_ffff_0000_0001;

/// Goldilocks field element type.
pub type Goldilocks = Fp64<GOLDILOCKS>;

/// The field every action, sum and commitment lives in.
pub type Field = Goldilocks;
