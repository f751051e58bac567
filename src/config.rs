use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants::{
    DEFAULT_ADMISSION_DOMINANCE, DEFAULT_ADMISSION_MIN_UPDATES, DEFAULT_CACHE_CAPACITY,
    DEFAULT_FILTER_WORDS, DEFAULT_SATURATE_COUNT,
};
use crate::error::CacheError;

/// Construction parameters for a [`SeedCache`](crate::SeedCache).
///
/// Every threshold of the admission/renewal policy is a named field with a
/// production default, so tuning runs and tests can shrink them instead of
/// relying on magic numbers baked into the cache.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheParams {
    /// Number of direct-mapped slots.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Minimizer k-mer length, needed to re-derive coordinates for
    /// reverse-complement hits. Owned by the caller's index configuration;
    /// may also be supplied later via `set_kmer_length`.
    #[serde(default)]
    pub kmer_length: u32,

    /// Minimum update attempts at a slot before the admission gate can pass.
    #[serde(default = "default_admission_min_updates")]
    pub admission_min_updates: u32,

    /// A fingerprint passes the gate only when
    /// `count * admission_dominance >= total`.
    #[serde(default = "default_admission_dominance")]
    pub admission_dominance: u32,

    /// Update-attempt total beyond which a slot ignores further updates.
    #[serde(default = "default_saturate_count")]
    pub saturate_count: u32,

    /// 64-bit words backing the presence filter; must be a power of two.
    #[serde(default = "default_filter_words")]
    pub filter_words: usize,
}

fn default_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_admission_min_updates() -> u32 {
    DEFAULT_ADMISSION_MIN_UPDATES
}

fn default_admission_dominance() -> u32 {
    DEFAULT_ADMISSION_DOMINANCE
}

fn default_saturate_count() -> u32 {
    DEFAULT_SATURATE_COUNT
}

fn default_filter_words() -> usize {
    DEFAULT_FILTER_WORDS
}

impl Default for CacheParams {
    fn default() -> Self {
        CacheParams {
            capacity: DEFAULT_CACHE_CAPACITY,
            kmer_length: 0,
            admission_min_updates: DEFAULT_ADMISSION_MIN_UPDATES,
            admission_dominance: DEFAULT_ADMISSION_DOMINANCE,
            saturate_count: DEFAULT_SATURATE_COUNT,
            filter_words: DEFAULT_FILTER_WORDS,
        }
    }
}

impl CacheParams {
    /// Production defaults with an explicit slot capacity.
    pub fn new(capacity: usize) -> Self {
        CacheParams {
            capacity,
            ..CacheParams::default()
        }
    }

    /// Reject parameter combinations the cache cannot operate under.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::validation("capacity must be nonzero"));
        }
        if self.filter_words == 0 || !self.filter_words.is_power_of_two() {
            return Err(CacheError::validation(format!(
                "filter_words must be a nonzero power of two (got {})",
                self.filter_words
            )));
        }
        if self.admission_dominance < 2 {
            return Err(CacheError::validation(format!(
                "admission_dominance must be at least 2 (got {})",
                self.admission_dominance
            )));
        }
        if self.admission_min_updates == 0 {
            return Err(CacheError::validation(
                "admission_min_updates must be nonzero",
            ));
        }
        if self.saturate_count < self.admission_min_updates {
            return Err(CacheError::validation(format!(
                "saturate_count ({}) below admission_min_updates ({}) would gate every update",
                self.saturate_count, self.admission_min_updates
            )));
        }
        Ok(())
    }
}

/// File shape for TOML parameter files: a single `[cache]` table.
#[derive(Debug, Deserialize)]
struct ParamsFile {
    cache: CacheParams,
}

/// Load and validate cache parameters from a TOML file.
///
/// Absent keys take their production defaults, so a file can override just
/// the thresholds under study.
pub fn parse_params_file(path: &Path) -> Result<CacheParams> {
    let contents = fs::read_to_string(path)
        .context(format!("Failed to read params file: {}", path.display()))?;

    let parsed: ParamsFile =
        toml::from_str(&contents).context("Failed to parse TOML params")?;

    parsed.cache.validate()?;

    Ok(parsed.cache)
}
