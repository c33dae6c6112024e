// crates/actlog-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use actlog_contract::{config_from_env, initialize, Contract, ContractState, Phase};
use actlog_core::{
    io::{read_auto, read_ledger_auto, write_auto, write_ledger_auto},
    Ledger, MemoryLedger,
};
use actlog_field::Field;
use actlog_fold::{
    api::{DS_FLAT, DS_REDUCE},
    flat_certificate_from_ledger,
    io::{read_certificate, read_certificate_header, write_certificate},
    reduce_certificate_from_ledger, FlatList, FlattenCertificate, MacBackend, ReduceCertificate,
};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the hex backend key.
const ENV_BACKEND_KEY: &str = "ACTLOG_BACKEND_KEY";

#[derive(Parser, Debug)]
#[command(
    name = "actlog",
    about = "Action-log reducer CLI",
    long_about = "Action-log reducer CLI.\n\nDispatch actions to a file-backed ledger, account for them with any of the three reduce strategies, and build or inspect certificates.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Append actions to the ledger
    Dispatch {
        /// Ledger file (JSON/CBOR); created if missing
        #[arg(long)]
        ledger: PathBuf,

        /// Comma-separated non-zero actions, e.g. `1,2,3`
        #[arg(long, value_delimiter = ',', required = true)]
        actions: Vec<Field>,

        /// Actions per ledger batch (default: all in one batch)
        #[arg(long)]
        per_tx: Option<usize>,
    },

    /// Account for unprocessed actions
    Reduce {
        /// Ledger file (JSON/CBOR)
        #[arg(long)]
        ledger: PathBuf,

        /// Contract state file (JSON/CBOR); initialized if missing
        #[arg(long)]
        state: PathBuf,

        /// Which reduce path to take
        #[arg(long, value_enum, default_value_t = StrategyOpt::Bounded)]
        strategy: StrategyOpt,

        /// Pre-built certificate for `custom` (reduce) or `snapshot` (flat);
        /// built from the ledger when omitted
        #[arg(long)]
        cert: Option<PathBuf>,
    },

    /// Build a certificate off-path without touching the state
    BuildCert {
        /// Ledger file (JSON/CBOR)
        #[arg(long)]
        ledger: PathBuf,

        /// Contract state file (JSON/CBOR); initialized if missing
        #[arg(long)]
        state: PathBuf,

        /// Certificate kind
        #[arg(long, value_enum)]
        kind: KindOpt,

        /// Output path (`.json` for JSON, anything else for bincode)
        #[arg(long)]
        out: PathBuf,
    },

    /// Print the contract state and, optionally, a certificate
    Inspect {
        /// Contract state file (JSON/CBOR)
        #[arg(long)]
        state: PathBuf,

        /// Certificate file to describe and verify
        #[arg(long)]
        cert: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum StrategyOpt {
    /// In-transaction fold under the work budget
    Bounded,
    /// One terminal reduce certificate
    Custom,
    /// Snapshot, flatten and drain in fixed-size batches
    Snapshot,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum KindOpt {
    /// Reduce certificate from `lastProcessedActionState` to the ledger head
    Reduce,
    /// Flatten certificate over the snapshotted range
    Flat,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Dispatch {
            ledger,
            actions,
            per_tx,
        } => dispatch(&ledger, &actions, per_tx),

        Cmd::Reduce {
            ledger,
            state,
            strategy,
            cert,
        } => reduce(&ledger, &state, strategy, cert.as_deref()),

        Cmd::BuildCert {
            ledger,
            state,
            kind,
            out,
        } => build_cert(&ledger, &state, kind, &out),

        Cmd::Inspect { state, cert } => inspect(&state, cert.as_deref()),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Ensure the parent directory for a file exists.
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", dir.display()))?;
        }
    }
    Ok(())
}

/// Backend keyed from `ACTLOG_BACKEND_KEY`, or the built-in default key.
fn backend_from_env() -> Result<MacBackend> {
    let backend = match std::env::var(ENV_BACKEND_KEY) {
        Ok(hex) => {
            MacBackend::from_hex(&hex).with_context(|| format!("parsing {ENV_BACKEND_KEY}"))?
        }
        Err(_) => MacBackend::default(),
    };
    info!(key_id = %backend.key_id(), "backend ready");
    Ok(backend)
}

fn load_state(path: &Path) -> Result<ContractState> {
    if !path.exists() {
        info!(state=%path.display(), "no state file, starting from initialize()");
        return Ok(initialize());
    }
    read_auto(path).with_context(|| format!("reading state {}", path.display()))
}

fn save_state(path: &Path, state: &ContractState) -> Result<()> {
    ensure_parent_dir(path)?;
    write_auto(path, state).with_context(|| format!("writing state {}", path.display()))
}

fn load_ledger(path: &Path) -> Result<MemoryLedger> {
    read_ledger_auto(path).with_context(|| format!("reading ledger {}", path.display()))
}

fn dispatch(ledger_path: &Path, actions: &[Field], per_tx: Option<usize>) -> Result<()> {
    let chunk = match per_tx {
        Some(0) => bail!("--per-tx must be positive"),
        Some(n) => n,
        None => actions.len().max(1),
    };

    let mut ledger = load_ledger(ledger_path)?;
    let contract = Contract::new(MacBackend::default());
    let mut head = ledger.authenticated_head();
    for (i, batch) in actions.chunks(chunk).enumerate() {
        head = contract
            .submit_batch(&mut ledger, batch)
            .with_context(|| format!("dispatching batch #{i}"))?;
    }

    // Nothing reaches disk unless every batch was accepted.
    ensure_parent_dir(ledger_path)?;
    write_ledger_auto(ledger_path, &ledger)
        .with_context(|| format!("writing ledger {}", ledger_path.display()))?;

    println!(
        "Dispatched {} actions in {} batches → head {head} ({})",
        actions.len(),
        actions.len().div_ceil(chunk),
        ledger_path.display()
    );
    Ok(())
}

fn reduce(
    ledger_path: &Path,
    state_path: &Path,
    strategy: StrategyOpt,
    cert_path: Option<&Path>,
) -> Result<()> {
    let ledger = load_ledger(ledger_path)?;
    let state = load_state(state_path)?;
    let backend = backend_from_env()?;
    let config = config_from_env()?;
    let mut contract = Contract::with_state(state, backend, config);

    info!(?strategy, phase = ?state.phase(), "reducing");
    match strategy {
        StrategyOpt::Bounded => {
            contract.reduce_bounded(&ledger).context("reduceBounded")?;
        }
        StrategyOpt::Custom => {
            let cert: ReduceCertificate = match cert_path {
                Some(p) => read_certificate(p)?,
                None => reduce_certificate_from_ledger(
                    contract.backend(),
                    &ledger,
                    state.total_sum,
                    state.last_processed_action_state,
                )
                .context("building reduce certificate")?,
            };
            contract
                .custom_reduce(&ledger, &cert)
                .context("customReduce")?;
        }
        StrategyOpt::Snapshot => run_snapshot_cycle(&mut contract, &ledger, cert_path)?,
    }

    let next = contract.into_state();
    save_state(state_path, &next)?;
    println!("{next}");
    Ok(())
}

/// Drive a snapshot cycle to completion, resuming from whichever phase the
/// persisted state is in.
fn run_snapshot_cycle(
    contract: &mut Contract<MacBackend>,
    ledger: &MemoryLedger,
    cert_path: Option<&Path>,
) -> Result<()> {
    if contract.state().phase() == Phase::Idle {
        let snapshot = contract.create_snapshot(ledger).context("createSnapshot")?;
        info!(%snapshot, "snapshot created");
    }

    let s = *contract.state();
    let (cert, mut list) = flat_certificate_from_ledger(
        contract.backend(),
        ledger,
        s.last_processed_action_state,
        s.snapshot,
    )
    .context("building flatten certificate")?;

    if s.phase() == Phase::Snapshotted {
        let cert: FlattenCertificate = match cert_path {
            Some(p) => read_certificate(p)?,
            None => cert,
        };
        contract.flat_snapshot(&cert).context("flatSnapshot")?;
    }

    if contract.state().phase() == Phase::Idle {
        println!("Snapshot range was empty, cycle complete");
        return Ok(());
    }

    resume_flat_list(&mut list, contract.state().flatten_snapshot)?;
    let mut n = 0usize;
    for batch in list.drain_batches() {
        n += 1;
        if contract
            .snapshot_reduce(&batch)
            .with_context(|| format!("snapshotReduce #{n}"))?
        {
            break;
        }
    }
    if contract.state().phase() != Phase::Idle {
        bail!("drain stopped before the cycle completed");
    }
    println!("Drained in {n} snapshotReduce calls");
    Ok(())
}

/// Pop already-drained links until the list hash matches `pointer`.
fn resume_flat_list(list: &mut FlatList, pointer: Field) -> Result<()> {
    while list.hash() != pointer {
        if list.pop().is_none() {
            bail!("flattenSnapshot {pointer} is not a prefix of the rebuilt flat list");
        }
    }
    Ok(())
}

fn build_cert(ledger_path: &Path, state_path: &Path, kind: KindOpt, out: &Path) -> Result<()> {
    let ledger = load_ledger(ledger_path)?;
    let state = load_state(state_path)?;
    let backend = backend_from_env()?;

    ensure_parent_dir(out)?;
    match kind {
        KindOpt::Reduce => {
            let cert = reduce_certificate_from_ledger(
                &backend,
                &ledger,
                state.total_sum,
                state.last_processed_action_state,
            )
            .context("building reduce certificate")?;
            write_certificate(out, &cert)?;
            println!(
                "reduce certificate: total {} over [{}, {}) → {}",
                cert.claim().total,
                cert.claim().initial_action_state,
                cert.claim().action_list_state,
                out.display()
            );
        }
        KindOpt::Flat => {
            if state.phase() != Phase::Snapshotted {
                bail!(
                    "flat certificates cover a snapshot; state is {:?} (run createSnapshot first)",
                    state.phase()
                );
            }
            let (cert, list) = flat_certificate_from_ledger(
                &backend,
                &ledger,
                state.last_processed_action_state,
                state.snapshot,
            )
            .context("building flatten certificate")?;
            write_certificate(out, &cert)?;
            println!(
                "flatten certificate: {} links, flatList {} → {}",
                list.len(),
                cert.claim().flat_list_state,
                out.display()
            );
        }
    }
    Ok(())
}

fn inspect(state_path: &Path, cert_path: Option<&Path>) -> Result<()> {
    let state = load_state(state_path)?;
    println!("phase: {:?}", state.phase());
    println!("{state}");

    if let Some(p) = cert_path {
        let header = read_certificate_header(p)?;
        println!("certificate v{} ({})", header.ver, header.program);
        let backend = backend_from_env()?;
        if header.program == DS_REDUCE {
            let cert: ReduceCertificate = read_certificate(p)?;
            describe(&backend, &cert)?;
        } else if header.program == DS_FLAT {
            let cert: FlattenCertificate = read_certificate(p)?;
            describe(&backend, &cert)?;
        } else {
            bail!("unknown certificate program {:?}", header.program);
        }
    }
    Ok(())
}

fn describe<C: actlog_core::Claim>(
    backend: &MacBackend,
    cert: &actlog_core::Certificate<C>,
) -> Result<()> {
    use actlog_core::ProofBackend;

    let claim = serde_json::to_string_pretty(cert.claim()).context("serialize claim")?;
    println!("{claim}");
    println!("tag: {}", hex::encode(cert.tag()));
    println!(
        "verifies under key {}: {}",
        backend.key_id(),
        backend.verify(cert)
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn actions_parse_from_comma_list() {
        let cli = Cli::try_parse_from(["actlog", "dispatch", "--ledger", "l.json", "--actions", "1,2,3"])
            .unwrap();
        match cli.cmd {
            Cmd::Dispatch { actions, per_tx, .. } => {
                assert_eq!(actions, vec![Field::from_u64(1), Field::from_u64(2), Field::from_u64(3)]);
                assert_eq!(per_tx, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Cli::try_parse_from(["actlog", "dispatch", "--ledger", "l.json", "--actions", "x"]).is_err());
    }

    #[test]
    fn snapshot_cycle_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = dir.path().join("ledger.json");
        let state = dir.path().join("state.json");
        let actions: Vec<Field> = (1..=12).map(Field::from_u64).collect();

        dispatch(&ledger, &actions, Some(4)).unwrap();
        assert_eq!(load_ledger(&ledger).unwrap().batch_count(), 3);

        reduce(&ledger, &state, StrategyOpt::Snapshot, None).unwrap();
        let s = load_state(&state).unwrap();
        assert_eq!(s.total_sum, Field::from_u64(78));
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.last_processed_action_state, load_ledger(&ledger).unwrap().authenticated_head());
    }

    #[test]
    fn rejected_dispatch_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = dir.path().join("ledger.cbor");
        dispatch(&ledger, &[Field::from_u64(5)], None).unwrap();
        let err = dispatch(&ledger, &[Field::one(), Field::zero()], Some(1));
        assert!(err.is_err());
        assert_eq!(load_ledger(&ledger).unwrap().action_count(), 1);
    }

    #[test]
    fn resume_skips_drained_links() {
        let mut list = FlatList::new();
        for a in 1..=7 {
            list.push(Field::from_u64(a));
        }
        let mut probe = list.clone();
        probe.pop();
        probe.pop();
        resume_flat_list(&mut list, probe.hash()).unwrap();
        assert_eq!(list.len(), 5);
        assert!(resume_flat_list(&mut list, Field::from_u64(123)).is_err());
    }

    #[test]
    fn custom_and_bounded_agree() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = dir.path().join("ledger.json");
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");
        dispatch(&ledger, &[Field::from_u64(3), Field::from_u64(4)], None).unwrap();
        reduce(&ledger, &a, StrategyOpt::Bounded, None).unwrap();
        reduce(&ledger, &b, StrategyOpt::Custom, None).unwrap();
        assert_eq!(load_state(&a).unwrap(), load_state(&b).unwrap());
    }
}
