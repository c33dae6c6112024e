//! Off-path builders: replay fetched batches through the certificate chains.
//!
//! - [`ReduceBuilder`] / [`build_reduce_certificate`]: `init`, then per batch
//!   `add*` and one `cut_actions`.
//! - [`FlatBuilder`] / [`build_flat_certificate`]: the same for the flatten
//!   chain, also pushing every action onto a [`FlatList`].
//!
//! Builders are push-based so a caller can stream batches from the ledger
//! without holding the whole range. Batch boundaries must match the ledger's
//! exactly; empty batches are skipped because the ledger never records them.

use actlog_core::{ActionBatch, Ledger, ProofBackend, Result};
use actlog_field::Field;
use tracing::debug;

use crate::api::{FlattenCertificate, ReduceCertificate};
use crate::flat::{FlatList, FlatProgram};
use crate::reduce::ReduceProgram;

/// Push-based builder for the reduce chain.
#[derive(Debug)]
pub struct ReduceBuilder<B> {
    program: ReduceProgram<B>,
    cert: ReduceCertificate,
    batches: usize,
}

impl<B: ProofBackend> ReduceBuilder<B> {
    /// Start at `(start_sum, start_head)`.
    pub fn new(backend: B, start_sum: Field, start_head: Field) -> Self {
        let program = ReduceProgram::new(backend);
        let cert = program.init(start_sum, start_head);
        Self {
            program,
            cert,
            batches: 0,
        }
    }

    /// Fold one ledger batch.
    ///
    /// On error the builder keeps the last good certificate.
    pub fn push_batch(&mut self, batch: &ActionBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut cert = self.cert.clone();
        for &a in batch.as_slice() {
            cert = self.program.add(cert, a)?;
        }
        self.cert = self.program.cut_actions(cert)?;
        self.batches += 1;
        debug!(
            batch = self.batches,
            actions = batch.len(),
            total = %self.cert.claim().total,
            "reduce: batch folded"
        );
        Ok(())
    }

    /// Terminal certificate.
    pub fn finish(self) -> ReduceCertificate {
        self.cert
    }
}

/// Push-based builder for the flatten chain.
#[derive(Debug)]
pub struct FlatBuilder<B> {
    program: FlatProgram<B>,
    cert: FlattenCertificate,
    list: FlatList,
}

impl<B: ProofBackend> FlatBuilder<B> {
    /// Start at `start_head` with an empty flat list.
    pub fn new(backend: B, start_head: Field) -> Self {
        let program = FlatProgram::new(backend);
        let cert = program.init(start_head);
        Self {
            program,
            cert,
            list: FlatList::new(),
        }
    }

    /// Fold one ledger batch and push its actions onto the list.
    ///
    /// On error neither the certificate nor the list changes.
    pub fn push_batch(&mut self, batch: &ActionBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut cert = self.cert.clone();
        for &a in batch.as_slice() {
            cert = self.program.add(cert, a)?;
        }
        self.cert = self.program.cut_actions(cert)?;
        for &a in batch.as_slice() {
            self.list.push(a);
        }
        debug!(
            actions = batch.len(),
            flat_len = self.list.len(),
            "flatten: batch folded"
        );
        Ok(())
    }

    /// Terminal certificate and the list it commits to.
    pub fn finish(self) -> (FlattenCertificate, FlatList) {
        (self.cert, self.list)
    }
}

/// Build the terminal reduce certificate over `batches`.
pub fn build_reduce_certificate<B: ProofBackend>(
    backend: B,
    start_sum: Field,
    start_head: Field,
    batches: &[ActionBatch],
) -> Result<ReduceCertificate> {
    let mut b = ReduceBuilder::new(backend, start_sum, start_head);
    for batch in batches {
        b.push_batch(batch)?;
    }
    Ok(b.finish())
}

/// Build the terminal flatten certificate over `batches`, with its list.
pub fn build_flat_certificate<B: ProofBackend>(
    backend: B,
    start_head: Field,
    batches: &[ActionBatch],
) -> Result<(FlattenCertificate, FlatList)> {
    let mut b = FlatBuilder::new(backend, start_head);
    for batch in batches {
        b.push_batch(batch)?;
    }
    Ok(b.finish())
}

/// Reduce certificate covering everything the ledger holds after `from`.
pub fn reduce_certificate_from_ledger<B, L>(
    backend: B,
    ledger: &L,
    start_sum: Field,
    from: Field,
) -> Result<ReduceCertificate>
where
    B: ProofBackend,
    L: Ledger + ?Sized,
{
    let batches = ledger.fetch_actions(from)?;
    build_reduce_certificate(backend, start_sum, from, &batches)
}

/// Flatten certificate covering exactly the ledger range `[from, to)`.
pub fn flat_certificate_from_ledger<B, L>(
    backend: B,
    ledger: &L,
    from: Field,
    to: Field,
) -> Result<(FlattenCertificate, FlatList)>
where
    B: ProofBackend,
    L: Ledger + ?Sized,
{
    let batches = ledger.fetch_range(from, to)?;
    build_flat_certificate(backend, from, &batches)
}
