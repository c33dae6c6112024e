//! Contract configuration.

use actlog_core::{ReplayConfig, DEFAULT_BOUNDED_BUDGET};
use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding [`ContractConfig::bounded_budget`].
pub const ENV_BOUNDED_BUDGET: &str = "ACTLOG_BOUNDED_BUDGET";

/// Tunables of the contract.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContractConfig {
    /// Most actions `reduceBounded` may fold in one transaction.
    pub bounded_budget: usize,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            bounded_budget: DEFAULT_BOUNDED_BUDGET,
        }
    }
}

impl ContractConfig {
    /// Replay knobs for the bounded fold.
    #[must_use]
    pub const fn replay(&self) -> ReplayConfig {
        ReplayConfig {
            max_actions: self.bounded_budget,
        }
    }
}

/// Defaults, overridden by `ACTLOG_BOUNDED_BUDGET` when set.
pub fn config_from_env() -> Result<ContractConfig> {
    config_from_lookup(|k| std::env::var(k).ok())
}

fn config_from_lookup<F>(lookup: F) -> Result<ContractConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut cfg = ContractConfig::default();
    if let Some(raw) = lookup(ENV_BOUNDED_BUDGET) {
        let budget: usize = raw
            .trim()
            .parse()
            .with_context(|| format!("{ENV_BOUNDED_BUDGET}={raw:?} is not a count"))?;
        ensure!(budget > 0, "{ENV_BOUNDED_BUDGET} must be positive");
        cfg.bounded_budget = budget;
    }
    Ok(cfg)
}
