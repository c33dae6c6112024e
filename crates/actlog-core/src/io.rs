//! Serialization helpers for ledger batches and persisted state.
//!
//! JSON and CBOR read/write utilities with extension-based auto-detection.
//! Unknown/missing extensions are rejected for reads and default to JSON
//! for writes. The generic helpers work for any serde type; the ledger has
//! typed wrappers because the CLI persists it as `Vec<ActionBatch>`.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::ledger::MemoryLedger;
use crate::types::ActionBatch;

/// Ensure the parent directory for a file exists (no-op if none).
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", display(path)))?;
        }
    }
    Ok(())
}

/// Read any `T` from **JSON**.
pub fn read_json<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("deserialize JSON {}", display(path_ref)))
}

/// Write any `T` to **JSON** (pretty).
pub fn write_json<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, v: &T) -> Result<()> {
    let path_ref = path.as_ref();
    ensure_parent_dir(path_ref)?;
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    serde_json::to_writer_pretty(BufWriter::new(f), v)
        .with_context(|| format!("serialize JSON {}", display(path_ref)))
}

/// Read any `T` from **CBOR**.
pub fn read_cbor<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    let mut rdr = BufReader::new(f);
    ciborium::de::from_reader(&mut rdr)
        .with_context(|| format!("deserialize CBOR {}", display(path_ref)))
}

/// Write any `T` to **CBOR**.
pub fn write_cbor<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, v: &T) -> Result<()> {
    let path_ref = path.as_ref();
    ensure_parent_dir(path_ref)?;
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    let mut w = BufWriter::new(f);
    ciborium::ser::into_writer(v, &mut w)
        .with_context(|| format!("serialize CBOR {}", display(path_ref)))
}

/// Auto-detect read by extension `.json` / `.cbor` (case-insensitive).
pub fn read_auto<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("json") => read_json(path),
        Some("cbor") => read_cbor(path),
        Some(other) => Err(anyhow!(
            "unsupported extension: {} (supported: .json, .cbor)",
            other
        )),
        None => Err(anyhow!("path has no extension (expected .json or .cbor)")),
    }
}

/// Auto-detect write (defaults to **JSON** if unknown or missing).
pub fn write_auto<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, v: &T) -> Result<()> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("cbor") => write_cbor(path, v),
        _ => write_json(path, v),
    }
}

/// Load a ledger persisted as a list of batches. A missing file is an empty ledger.
pub fn read_ledger_auto<P: AsRef<Path>>(path: P) -> Result<MemoryLedger> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        return Ok(MemoryLedger::new());
    }
    let batches: Vec<ActionBatch> = read_auto(path_ref)?;
    Ok(MemoryLedger::from_batches(batches))
}

/// Persist a ledger as its list of batches.
pub fn write_ledger_auto<P: AsRef<Path>>(path: P, ledger: &MemoryLedger) -> Result<()> {
    write_auto(path, ledger.batches())
}

/// Return the lowercase extension (without dot) if present.
fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Human-friendly path display for error messages.
fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;
    use actlog_field::Field;

    #[test]
    fn ledger_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/ledger.json");
        let mut l = MemoryLedger::new();
        l.append_action_batch(&[Field::from_u64(1), Field::from_u64(2)])
            .unwrap();
        write_ledger_auto(&path, &l).unwrap();
        let back = read_ledger_auto(&path).unwrap();
        assert_eq!(back.authenticated_head(), l.authenticated_head());
    }

    #[test]
    fn ledger_cbor_roundtrip_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.cbor");
        assert_eq!(read_ledger_auto(&path).unwrap().batch_count(), 0);
        let l = MemoryLedger::from_batches([ActionBatch::from(&[3u64, 4][..])]);
        write_ledger_auto(&path, &l).unwrap();
        assert_eq!(
            read_ledger_auto(&path).unwrap().authenticated_head(),
            l.authenticated_head()
        );
    }

    #[test]
    fn unknown_extension_is_rejected_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.txt");
        std::fs::write(&path, "{}").unwrap();
        assert!(read_auto::<serde_json::Value, _>(&path).is_err());
    }
}
