//! Certificate (de)serialization.
//!
//! Certificates travel in a small envelope carrying a wire version and the
//! program label, so a flatten certificate is never decoded as a reduce one.
//! Files default to **bincode**; a `.json` extension selects pretty JSON.

use std::fs;
use std::path::Path;

use actlog_core::{io as core_io, Certificate, Claim};
use anyhow::{ensure, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Current envelope version.
pub const CERT_WIRE_VERSION: u16 = 1;

/// Envelope prefix, decodable without knowing the claim type.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CertificateHeader {
    /// Wire version.
    pub ver: u16,
    /// Program label of the enclosed claim.
    pub program: String,
}

#[derive(Serialize, Deserialize)]
#[serde(bound = "C: Claim")]
struct CertificateFile<C> {
    ver: u16,
    program: String,
    certificate: Certificate<C>,
}

/// Serialize to a compact binary vector using `bincode`.
#[inline]
pub fn to_vec_bin<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(bincode::serialize(value)?)
}

/// Deserialize from a `bincode` slice (trailing bytes are ignored).
#[inline]
pub fn from_slice_bin<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(bincode::deserialize(bytes)?)
}

fn envelope<C: Claim>(cert: &Certificate<C>) -> CertificateFile<C> {
    CertificateFile {
        ver: CERT_WIRE_VERSION,
        program: C::PROGRAM.to_owned(),
        certificate: cert.clone(),
    }
}

fn open<C: Claim>(file: CertificateFile<C>) -> Result<Certificate<C>> {
    ensure!(
        file.ver == CERT_WIRE_VERSION,
        "unsupported certificate wire version {}",
        file.ver
    );
    ensure!(
        file.program == C::PROGRAM,
        "certificate is for program {:?}, expected {:?}",
        file.program,
        C::PROGRAM
    );
    Ok(file.certificate)
}

/// Encode a certificate envelope with bincode.
pub fn encode_certificate<C: Claim>(cert: &Certificate<C>) -> Result<Vec<u8>> {
    to_vec_bin(&envelope(cert)).context("encode certificate")
}

/// Decode a bincode certificate envelope, checking version and program.
pub fn decode_certificate<C: Claim>(bytes: &[u8]) -> Result<Certificate<C>> {
    let file: CertificateFile<C> = from_slice_bin(bytes).context("decode certificate")?;
    open(file)
}

/// Write a certificate (`.json` → JSON, anything else → bincode).
pub fn write_certificate<C: Claim, P: AsRef<Path>>(path: P, cert: &Certificate<C>) -> Result<()> {
    let path = path.as_ref();
    if is_json(path) {
        return core_io::write_json(path, &envelope(cert));
    }
    let bytes = encode_certificate(cert)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating parent directory {}", dir.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("write {}", path.display()))
}

/// Read a certificate written by [`write_certificate`].
pub fn read_certificate<C: Claim, P: AsRef<Path>>(path: P) -> Result<Certificate<C>> {
    let path = path.as_ref();
    if is_json(path) {
        return open(core_io::read_json(path)?);
    }
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    decode_certificate(&bytes)
}

/// Read only the envelope header of a certificate file.
pub fn read_certificate_header<P: AsRef<Path>>(path: P) -> Result<CertificateHeader> {
    let path = path.as_ref();
    if is_json(path) {
        return core_io::read_json(path);
    }
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    from_slice_bin(&bytes).context("decode certificate header")
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FlatClaim, ReduceClaim, DS_REDUCE};
    use crate::flat::init_claim as flat_init;
    use crate::mac::MacBackend;
    use crate::reduce::init_claim;
    use actlog_core::ProofBackend;
    use actlog_field::Field;

    #[test]
    fn bincode_and_json_files_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let b = MacBackend::default();
        let c = b.issue(init_claim(Field::from_u64(3), Field::from_u64(4)));
        for name in ["cert.bin", "cert.json"] {
            let p = dir.path().join(name);
            write_certificate(&p, &c).unwrap();
            let back: Certificate<ReduceClaim> = read_certificate(&p).unwrap();
            assert_eq!(back, c);
            assert!(b.verify(&back));
            assert_eq!(read_certificate_header(&p).unwrap().program, DS_REDUCE);
        }
    }

    #[test]
    fn program_mismatch_is_rejected() {
        let b = MacBackend::default();
        let c = b.issue(flat_init(Field::from_u64(1)));
        let bytes = encode_certificate(&c).unwrap();
        assert!(decode_certificate::<FlatClaim>(&bytes).is_ok());
        assert!(decode_certificate::<ReduceClaim>(&bytes).is_err());
    }
}
