//! Default tuning constants for the minimizer cache.
//!
//! Centralizing these keeps the admission policy, filter sizing, and slot
//! defaults in one place. All thresholds are also exposed as fields on
//! [`CacheParams`](crate::config::CacheParams) so tests and tuning runs can
//! shrink them without recompiling.

// ============================================================================
// Fingerprint Histogram
// ============================================================================

/// Number of buckets in each slot's fingerprint histogram.
///
/// A prime modulus spreads fingerprint collisions evenly; any prime larger
/// than the expected distinct-pattern fan-in per slot works.
pub const FINGERPRINT_BUCKETS: usize = 103;

// ============================================================================
// Admission / Renewal Policy Defaults
// ============================================================================

/// Minimum update attempts a slot must have seen before the admission gate
/// can pass.
pub(crate) const DEFAULT_ADMISSION_MIN_UPDATES: u32 = 10;

/// Dominance factor: a fingerprint passes the gate only when
/// `count * DOMINANCE >= total`, i.e. it accounts for at least a
/// `1/DOMINANCE` share of all updates seen at the slot.
pub(crate) const DEFAULT_ADMISSION_DOMINANCE: u32 = 5;

/// Update-attempt total beyond which a slot stops accepting updates.
pub(crate) const DEFAULT_SATURATE_COUNT: u32 = 100;

// ============================================================================
// Presence Filter Sizing
// ============================================================================

/// Default number of 64-bit words backing the presence filter (2^22 words,
/// 32 MiB). Sized to the hash-derived address space, independent of the
/// slot capacity.
pub(crate) const DEFAULT_FILTER_WORDS: usize = 1 << 22;

// ============================================================================
// Slot Store Sizing
// ============================================================================

/// Default slot capacity. Prime, so the endpoint-sum bucket hash uses more
/// than the low bits of the key.
pub(crate) const DEFAULT_CACHE_CAPACITY: usize = 1_000_003;

// ============================================================================
// Tests
// ============================================================================
