//! Match configuration
//!
//! A match needs a seed and an energy budget for team building. Both normally
//! come from an external provider. When the provider fails, or the run is
//! explicitly offline, the seed is drawn locally and the budget derived from
//! it, so a match can always be reproduced from its seed alone.

use crate::{BattleError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Smallest energy budget a derived cap can have
pub const MIN_ENERGY_CAP: u32 = 11;

/// Largest energy budget a derived cap can have
pub const MAX_ENERGY_CAP: u32 = 88;

/// Budget used in staging when the provider omits one
pub const STAGING_ENERGY_CAP: u32 = 22;

/// Configuration as delivered by a provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchConfig {
    pub match_id: String,
    pub seed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_cap: Option<u32>,
}

impl MatchConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Production,
    Staging,
    #[default]
    Offline,
}

/// Where a resolved setup came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupSource {
    Provider { match_id: String },
    /// Local seed; `reason` says why the provider was not used
    Offline { reason: String },
}

/// Resolved seed and budget for one match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSetup {
    pub seed: u64,
    pub energy_cap: u32,
    pub source: SetupSource,
}

impl MatchSetup {
    /// Setup for a known seed with the budget derived from it
    pub fn from_seed(seed: u64) -> Self {
        MatchSetup {
            seed,
            energy_cap: derive_energy_cap(seed),
            source: SetupSource::Offline {
                reason: "seed supplied".to_string(),
            },
        }
    }

    pub fn is_offline(&self) -> bool {
        matches!(self.source, SetupSource::Offline { .. })
    }
}

/// Deterministic budget for `seed`, in `MIN_ENERGY_CAP..=MAX_ENERGY_CAP`
pub fn derive_energy_cap(seed: u64) -> u32 {
    let mut rng = ChaCha12Rng::seed_from_u64(seed);
    rng.gen_range(MIN_ENERGY_CAP..=MAX_ENERGY_CAP)
}

/// Source of match configuration (a service, a file, a test double)
pub trait ConfigProvider {
    fn fetch(&self) -> Result<MatchConfig>;
}

/// Reads a [`MatchConfig`] from a JSON file
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl AsRef<Path>) -> Self {
        JsonFileProvider {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ConfigProvider for JsonFileProvider {
    fn fetch(&self) -> Result<MatchConfig> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            BattleError::ConfigUnavailable(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        MatchConfig::from_json(&text)
    }
}

/// Provider that is never reachable
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProvider;

impl ConfigProvider for NoProvider {
    fn fetch(&self) -> Result<MatchConfig> {
        Err(BattleError::ConfigUnavailable("no configuration provider".to_string()))
    }
}

/// Resolve the seed and budget for a match
///
/// Provider failures never escape: they fall back to offline setup with the
/// reason recorded in [`SetupSource::Offline`].
pub fn resolve_setup(mode: RunMode, provider: &dyn ConfigProvider) -> MatchSetup {
    let default_cap = match mode {
        RunMode::Offline => return offline_setup("offline mode".to_string()),
        RunMode::Production => None,
        RunMode::Staging => Some(STAGING_ENERGY_CAP),
    };

    match provider.fetch() {
        Ok(config) => MatchSetup {
            seed: config.seed,
            energy_cap: config
                .energy_cap
                .or(default_cap)
                .unwrap_or_else(|| derive_energy_cap(config.seed)),
            source: SetupSource::Provider {
                match_id: config.match_id,
            },
        },
        Err(e) => offline_setup(e.to_string()),
    }
}

fn offline_setup(reason: String) -> MatchSetup {
    let seed = rand::random::<u64>();
    MatchSetup {
        seed,
        energy_cap: derive_energy_cap(seed),
        source: SetupSource::Offline { reason },
    }
}
