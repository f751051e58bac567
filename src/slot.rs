//! One remembered minimizer pattern and its candidate lists.
//!
//! A slot owns everything the cache knows about one bucket: the stored
//! pattern (hashes, strand bits, consecutive-position offsets), the two
//! anchored candidate lists, the reinforcement weight, and the
//! fingerprint histogram that gates admission. Slots are only ever
//! replaced wholesale; between calls a slot is either the old pattern in
//! full or the new one in full.

use crate::constants::FINGERPRINT_BUCKETS;
use crate::orientation::{classify_match, Orientation};
use crate::types::{read_position, strand_bit, Candidate, Minimizer};

/// One direct-mapped cache slot.
pub(crate) struct CacheSlot {
    /// Stored pattern hashes, in storage orientation.
    pub hashes: Vec<u64>,
    /// Strand bit per stored minimizer.
    pub strands: Vec<u8>,
    /// Position delta from minimizer `i` to `i + 1`; empty when the
    /// pattern has fewer than two minimizers.
    pub offsets: Vec<i32>,
    /// Candidates on the pattern's forward strand, anchored at pattern
    /// start = 0.
    pub positive_candidates: Vec<Candidate>,
    /// Candidates on the opposite strand, same anchoring.
    pub negative_candidates: Vec<Candidate>,
    /// Repetitive-seed accumulator captured with the candidates.
    pub repetitive_seed_length: u32,
    /// Signed reinforcement counter; dropping below zero triggers renewal.
    pub weight: i32,
    /// Histogram of pattern fingerprints seen in update attempts.
    pub fingerprint_counts: [u16; FINGERPRINT_BUCKETS],
    /// Total update attempts counted in the histogram.
    pub fingerprint_total: u32,
    /// Set once the slot's weight has been adjusted at least once.
    pub activated: bool,
}

impl Default for CacheSlot {
    fn default() -> Self {
        CacheSlot {
            hashes: Vec::new(),
            strands: Vec::new(),
            offsets: Vec::new(),
            positive_candidates: Vec::new(),
            negative_candidates: Vec::new(),
            repetitive_seed_length: 0,
            weight: 0,
            fingerprint_counts: [0; FINGERPRINT_BUCKETS],
            fingerprint_total: 0,
            activated: false,
        }
    }
}

impl CacheSlot {
    /// Compare a query sketch against this slot's stored pattern.
    #[inline]
    pub fn matches(&self, query: &[Minimizer]) -> Option<Orientation> {
        classify_match(&self.hashes, &self.strands, &self.offsets, query)
    }

    /// Count one update attempt under `fingerprint`.
    ///
    /// The bucket and the total move together so that
    /// `fingerprint_total == sum(fingerprint_counts)` holds after every
    /// update; once a bucket pins at `u16::MAX` both stop.
    #[inline]
    pub fn record_update_attempt(&mut self, fingerprint: usize) {
        let count = &mut self.fingerprint_counts[fingerprint];
        if *count < u16::MAX {
            *count += 1;
            self.fingerprint_total += 1;
        }
    }

    /// Replace the stored pattern with the query sketch.
    pub fn store_pattern(&mut self, query: &[Minimizer]) {
        self.hashes.clear();
        self.hashes.extend(query.iter().map(|m| m.0));
        self.strands.clear();
        self.strands.extend(query.iter().map(|&m| strand_bit(m)));
        self.offsets.clear();
        self.offsets.extend(
            query
                .windows(2)
                .map(|w| (read_position(w[1]) - read_position(w[0])) as i32),
        );
    }

    /// Drop all fingerprint evidence. Called on renewal so the new pattern
    /// accumulates support from a clean slate.
    pub fn clear_fingerprints(&mut self) {
        self.fingerprint_counts = [0; FINGERPRINT_BUCKETS];
        self.fingerprint_total = 0;
    }

    /// Candidates stored across both strands.
    pub fn candidate_count(&self) -> usize {
        self.positive_candidates.len() + self.negative_candidates.len()
    }

    /// Bytes held by this slot, including spare vector capacity.
    pub fn memory_bytes(&self) -> u64 {
        (std::mem::size_of::<CacheSlot>()
            + self.hashes.capacity() * std::mem::size_of::<u64>()
            + self.strands.capacity() * std::mem::size_of::<u8>()
            + self.offsets.capacity() * std::mem::size_of::<i32>()
            + self.positive_candidates.capacity() * std::mem::size_of::<Candidate>()
            + self.negative_candidates.capacity() * std::mem::size_of::<Candidate>())
            as u64
    }
}
