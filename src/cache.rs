//! Direct-mapped cache of minimizer patterns and their candidate positions.
//!
//! Repeated reads in a sequencing run share identical or
//! reverse-complementary minimizer sketches; the expensive candidate
//! search only needs to run once per distinct pattern. The cache keeps one
//! remembered pattern per bucket and serves matching reads in either
//! orientation with their candidates re-anchored into the query's
//! coordinate frame.
//!
//! The cache is probabilistic by design: endpoint-hash buckets collide and
//! the presence filter has false positives, so a miss is always possible
//! and callers fall back to the full search. There is no internal
//! synchronization; callers sharing an instance across threads must
//! serialize access per bucket.

use log::{debug, trace};

use crate::config::CacheParams;
use crate::constants::FINGERPRINT_BUCKETS;
use crate::error::Result;
use crate::filter::PresenceFilter;
use crate::orientation::Orientation;
use crate::remap::{reverse_frame_shift, shift_positions};
use crate::slot::CacheSlot;
use crate::stats::SlotStats;
use crate::types::{read_position, Candidate, Minimizer};

/// Bucket key: the endpoint-hash sum, O(1) in pattern length.
///
/// Wraparound is intentional; the direction matcher resolves the resulting
/// collisions structurally.
#[inline]
fn bucket_key(query: &[Minimizer]) -> u64 {
    let first = query[0].0;
    let last = query[query.len() - 1].0;
    if query.len() == 1 {
        first
    } else {
        first.wrapping_add(last)
    }
}

/// Fingerprint key: the endpoint-hash xor, distinct from the bucket key so
/// patterns that collide on one rarely collide on both.
#[inline]
fn fingerprint_key(query: &[Minimizer]) -> u64 {
    let first = query[0].0;
    let last = query[query.len() - 1].0;
    if query.len() == 1 {
        first
    } else {
        first ^ last
    }
}

/// Fixed-capacity, direct-mapped cache of minimizer sketches.
pub struct SeedCache {
    slots: Vec<CacheSlot>,
    filter: PresenceFilter,
    params: CacheParams,
}

impl SeedCache {
    /// Create a cache with `capacity` slots and production thresholds.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_params(CacheParams::new(capacity))
    }

    /// Create a cache from explicit parameters.
    ///
    /// Parameter validation is the only fallible step; the slot store and
    /// presence filter are allocated once and live for the cache's
    /// lifetime.
    pub fn with_params(params: CacheParams) -> Result<Self> {
        params.validate()?;
        let mut slots = Vec::with_capacity(params.capacity);
        slots.resize_with(params.capacity, CacheSlot::default);
        let filter = PresenceFilter::new(params.filter_words);
        Ok(SeedCache {
            slots,
            filter,
            params,
        })
    }

    /// Supply the minimizer k-mer length used by the aligner's index.
    ///
    /// Must be set before any query that can hit a reverse-complement
    /// match; the reverse coordinate formula depends on it.
    pub fn set_kmer_length(&mut self, kmer_length: u32) {
        self.params.kmer_length = kmer_length;
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The parameters this cache was built with.
    pub fn params(&self) -> &CacheParams {
        &self.params
    }

    /// Look up a read's minimizer sketch.
    ///
    /// On a hit, fills `positive_out` / `negative_out` with the stored
    /// candidates re-anchored into the read's coordinate frame, stores the
    /// remembered repetitive-seed length, and returns the slot index so
    /// the caller can later [`adjust_weight`](Self::adjust_weight). On a
    /// miss returns `None` and leaves the output buffers untouched;
    /// callers fall back to the full candidate search.
    pub fn query_into(
        &self,
        query: &[Minimizer],
        read_len: u32,
        positive_out: &mut Vec<Candidate>,
        negative_out: &mut Vec<Candidate>,
        repetitive_seed_length: &mut u32,
    ) -> Option<usize> {
        let (&first, &last) = match (query.first(), query.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return None,
        };
        if !self.filter.may_contain(first.0) {
            return None;
        }

        let index = (bucket_key(query) % self.slots.len() as u64) as usize;
        let slot = &self.slots[index];

        match slot.matches(query)? {
            Orientation::Forward => {
                // Stored lists are anchored at pattern start = 0; shift
                // them to where this read actually begins.
                let shift = read_position(first);
                positive_out.clear();
                positive_out.extend_from_slice(&slot.positive_candidates);
                shift_positions(positive_out, -shift);
                negative_out.clear();
                negative_out.extend_from_slice(&slot.negative_candidates);
                shift_positions(negative_out, shift);
            }
            Orientation::ReverseComplement => {
                debug_assert!(
                    self.params.kmer_length > 0,
                    "set_kmer_length must precede reverse-orientation queries"
                );
                // The read is the reverse complement of the stored
                // pattern, so strand roles swap and coordinates flip
                // around the read's 3' end in the stored frame.
                let shift =
                    reverse_frame_shift(read_len, read_position(last), self.params.kmer_length);
                positive_out.clear();
                positive_out.extend_from_slice(&slot.negative_candidates);
                shift_positions(positive_out, shift - read_len as i64 + 1);
                negative_out.clear();
                negative_out.extend_from_slice(&slot.positive_candidates);
                shift_positions(negative_out, read_len as i64 - 1 - shift);
            }
        }
        *repetitive_seed_length = slot.repetitive_seed_length;
        Some(index)
    }

    /// Offer a freshly searched result to the admission/renewal policy.
    ///
    /// Called after a miss led to a full candidate search. Every call is
    /// counted in the slot's fingerprint histogram; whether it reaches the
    /// weight step is decided by the saturation cutoff and the dominance
    /// gate. A slot whose weight drops below zero is renewed wholesale
    /// with this call's pattern and candidates.
    pub fn update(
        &mut self,
        query: &[Minimizer],
        positive: &[Candidate],
        negative: &[Candidate],
        repetitive_seed_length: u32,
    ) {
        let (&first, &last) = match (query.first(), query.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return,
        };

        let index = (bucket_key(query) % self.slots.len() as u64) as usize;
        let fingerprint = (fingerprint_key(query) % FINGERPRINT_BUCKETS as u64) as usize;
        let slot = &mut self.slots[index];

        slot.record_update_attempt(fingerprint);

        // Saturated slots have accumulated enough evidence; leave them be.
        if slot.fingerprint_total > self.params.saturate_count {
            trace!("slot {} saturated ({} attempts)", index, slot.fingerprint_total);
            return;
        }

        // Admission gate: this fingerprint must account for a large enough
        // share of the slot's update traffic. Suppresses churn from
        // transient one-off patterns.
        if slot.fingerprint_total < self.params.admission_min_updates
            || (slot.fingerprint_counts[fingerprint] as u64)
                * (self.params.admission_dominance as u64)
                < slot.fingerprint_total as u64
        {
            return;
        }

        if slot.matches(query).is_some() {
            slot.weight = slot.weight.saturating_add(1);
        } else {
            slot.weight = slot.weight.saturating_sub(1);
        }
        slot.activated = true;

        if slot.weight >= 0 {
            return;
        }

        // Renewal: replace the pattern and candidates wholesale and anchor
        // the lists so the pattern's first minimizer sits at position 0.
        slot.weight = 1;
        slot.store_pattern(query);
        let shift = read_position(first);
        slot.positive_candidates.clear();
        slot.positive_candidates.extend_from_slice(positive);
        shift_positions(&mut slot.positive_candidates, shift);
        slot.negative_candidates.clear();
        slot.negative_candidates.extend_from_slice(negative);
        shift_positions(&mut slot.negative_candidates, -shift);
        slot.repetitive_seed_length = repetitive_seed_length;
        slot.clear_fingerprints();

        debug!(
            "slot {} renewed: {} minimizers, {} candidates",
            index,
            query.len(),
            positive.len() + negative.len()
        );

        self.filter.insert(first.0);
        self.filter.insert(last.0);
    }

    /// Add `delta` to a slot's weight directly, bypassing the fingerprint
    /// gate.
    ///
    /// For callers that externally verified a cached result was useful or
    /// harmful; `slot_index` is a value previously returned by
    /// [`query_into`](Self::query_into). Out-of-range indices are ignored.
    pub fn adjust_weight(&mut self, slot_index: usize, delta: i32) {
        if let Some(slot) = self.slots.get_mut(slot_index) {
            slot.weight = slot.weight.saturating_add(delta);
        }
    }

    /// Bytes held by the slot store (including spare vector capacity) and
    /// the presence filter.
    pub fn memory_bytes(&self) -> u64 {
        let slots: u64 = self.slots.iter().map(CacheSlot::memory_bytes).sum();
        slots + self.filter.memory_bytes()
    }

    /// Per-slot diagnostic snapshot, for offline tuning.
    pub fn slot_stats(&self) -> Vec<SlotStats> {
        self.slots.iter().map(SlotStats::from_slot).collect()
    }

    /// Write one stats line per slot to `writer`.
    pub fn write_stats<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for slot in &self.slots {
            SlotStats::from_slot(slot).write_line(writer)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(pos: u64, strand: u64) -> u64 {
        (pos << 1) | strand
    }

    /// Thresholds small enough that a single update admits and renews.
    fn eager_params(capacity: usize) -> CacheParams {
        let mut params = CacheParams::new(capacity);
        params.admission_min_updates = 1;
        params.admission_dominance = 103;
        params.saturate_count = 1000;
        params.kmer_length = 4;
        params.filter_words = 1 << 10;
        params
    }

    fn query_now(
        cache: &SeedCache,
        query: &[Minimizer],
        read_len: u32,
    ) -> Option<(usize, Vec<Candidate>, Vec<Candidate>, u32)> {
        let mut pos = Vec::new();
        let mut neg = Vec::new();
        let mut rep = 0;
        cache
            .query_into(query, read_len, &mut pos, &mut neg, &mut rep)
            .map(|idx| (idx, pos, neg, rep))
    }

    #[test]
    fn test_construction_rejects_zero_capacity() {
        assert!(SeedCache::new(0).is_err());
    }

    #[test]
    fn test_empty_query_misses() {
        let cache = SeedCache::with_params(eager_params(7)).unwrap();
        assert!(query_now(&cache, &[], 100).is_none());
    }

    #[test]
    fn test_cold_cache_misses_at_filter() {
        let cache = SeedCache::with_params(eager_params(7)).unwrap();
        let q = vec![(11, enc(0, 0)), (22, enc(5, 0))];
        assert!(query_now(&cache, &q, 20).is_none());
    }

    #[test]
    fn test_empty_update_is_noop() {
        let mut cache = SeedCache::with_params(eager_params(7)).unwrap();
        cache.update(&[], &[], &[], 0);
        assert!(cache.slot_stats().iter().all(|s| s.update_attempts == 0));
    }

    #[test]
    fn test_update_then_forward_hit() {
        let mut cache = SeedCache::with_params(eager_params(7)).unwrap();
        let q = vec![(11, enc(0, 0)), (22, enc(5, 0))];
        let pos = vec![Candidate::new(500)];
        let neg = vec![Candidate::new(800)];
        // One eager update: gate passes, empty slot mismatches, weight
        // goes negative, the slot renews.
        cache.update(&q, &pos, &neg, 9);

        let (idx, got_pos, got_neg, rep) = query_now(&cache, &q, 20).expect("hit");
        assert_eq!(got_pos, pos);
        assert_eq!(got_neg, neg);
        assert_eq!(rep, 9);
        assert!(idx < cache.capacity());
    }

    #[test]
    fn test_bucket_key_uses_endpoints_only() {
        let a = vec![(3, enc(0, 0)), (9, enc(4, 0)), (5, enc(8, 0))];
        let b = vec![(3, enc(0, 0)), (1, enc(4, 0)), (5, enc(8, 0))];
        assert_eq!(bucket_key(&a), bucket_key(&b));
        // The fingerprint also ignores the middle, but differs from the
        // bucket key's sum.
        assert_eq!(fingerprint_key(&a), fingerprint_key(&b));
    }

    #[test]
    fn test_bucket_key_wraps() {
        let q = vec![(u64::MAX, enc(0, 0)), (2, enc(5, 0))];
        assert_eq!(bucket_key(&q), 1);
    }

    #[test]
    fn test_single_minimizer_keys() {
        let q = vec![(42, enc(3, 0))];
        assert_eq!(bucket_key(&q), 42);
        assert_eq!(fingerprint_key(&q), 42);
    }

    #[test]
    fn test_weight_decrements_on_conflict() {
        let mut cache = SeedCache::with_params(eager_params(1)).unwrap();
        let a = vec![(11, enc(0, 0)), (22, enc(5, 0))];
        let b = vec![(33, enc(0, 0)), (44, enc(6, 0))];
        cache.update(&a, &[Candidate::new(1)], &[], 0);
        let w_after_store = cache.slot_stats()[0].weight;
        assert_eq!(w_after_store, 1);

        // A conflicting pattern admitted by the eager gate decrements,
        // then renews once the weight goes negative.
        cache.update(&b, &[Candidate::new(2)], &[], 0);
        assert_eq!(cache.slot_stats()[0].weight, 0);
        cache.update(&b, &[Candidate::new(2)], &[], 0);
        assert_eq!(cache.slot_stats()[0].weight, 1);
        let (_, got_pos, _, _) = query_now(&cache, &b, 20).expect("renewed to b");
        assert_eq!(got_pos, vec![Candidate::new(2)]);
    }

    #[test]
    fn test_adjust_weight_bypasses_gate() {
        let mut cache = SeedCache::with_params(eager_params(3)).unwrap();
        let q = vec![(11, enc(0, 0)), (22, enc(5, 0))];
        cache.update(&q, &[Candidate::new(1)], &[], 0);
        let idx = query_now(&cache, &q, 20).expect("hit").0;

        cache.adjust_weight(idx, 5);
        assert_eq!(cache.slot_stats()[idx].weight, 6);
        cache.adjust_weight(idx, -2);
        assert_eq!(cache.slot_stats()[idx].weight, 4);
    }

    #[test]
    fn test_adjust_weight_ignores_out_of_range() {
        let mut cache = SeedCache::with_params(eager_params(3)).unwrap();
        cache.adjust_weight(999, 1);
    }

    #[test]
    fn test_memory_bytes_grows_after_renewal() {
        let mut cache = SeedCache::with_params(eager_params(3)).unwrap();
        let base = cache.memory_bytes();
        let q = vec![(11, enc(0, 0)), (22, enc(5, 0))];
        cache.update(&q, &[Candidate::new(1)], &[Candidate::new(2)], 0);
        assert!(cache.memory_bytes() > base);
    }
}
