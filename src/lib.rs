//! seedcache: a fixed-capacity, direct-mapped cache for minimizer-sketch
//! candidate lookups.
//!
//! Alignment pipelines extract an ordered minimizer sketch per read and
//! run an expensive candidate search to place it on the genome. Duplicate
//! fragments and dense coverage make many sketches repeat, identically or
//! as reverse complements. This crate remembers, per hash bucket, the most
//! recently trusted sketch and its candidate positions, and serves
//! repeats in either orientation with coordinates re-derived for the
//! querying read.
//!
//! The flow is caller-driven: [`SeedCache::query_into`] either fills the
//! caller's candidate buffers (hit) or returns `None` (miss); after a miss
//! the caller runs its own candidate search and offers the result back via
//! [`SeedCache::update`], where a fingerprint-gated weight policy decides
//! whether to reinforce, ignore, or replace the bucket's pattern.
//! [`SeedCache::adjust_weight`] lets a caller that verified a served
//! result feed that judgment back directly.
//!
//! The cache is heuristic by contract: collisions can cause silent misses
//! and the presence filter has false positives. It has no internal
//! locking; one logical accessor per slot at a time is assumed.

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
mod filter;
pub mod logging;
pub mod orientation;
mod remap;
mod slot;
pub mod stats;
pub mod types;

pub use cache::SeedCache;
pub use config::{parse_params_file, CacheParams};
pub use constants::FINGERPRINT_BUCKETS;
pub use error::{CacheError, Result};
pub use orientation::Orientation;
pub use stats::SlotStats;
pub use types::{read_position, strand_bit, Candidate, Minimizer};
