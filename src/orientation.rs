//! Direction matching between a query sketch and a stored slot pattern.
//!
//! A stored pattern and a query can relate three ways: the query repeats
//! the pattern in the same orientation, it is the pattern's reverse
//! complement, or it is unrelated. The comparison is byte-exact structural
//! equality over hashes, strand bits, and consecutive position deltas,
//! not a similarity test. Any single differing element disqualifies that
//! direction, which is what makes endpoint-hash bucket collisions safe.

use crate::types::{read_position, strand_bit, Minimizer};

/// Orientation of a query sketch relative to the stored pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Forward,
    ReverseComplement,
}

/// Compare a query sketch against a stored pattern.
///
/// `hashes`, `strands`, and `offsets` are the slot's stored pattern in
/// storage orientation (`offsets[i]` is the position delta from minimizer
/// `i` to `i + 1`). Returns `None` on any structural difference.
///
/// Forward is tested first; a pattern cannot match both ways unless it is
/// its own reverse complement, in which case forward wins.
pub(crate) fn classify_match(
    hashes: &[u64],
    strands: &[u8],
    offsets: &[i32],
    query: &[Minimizer],
) -> Option<Orientation> {
    if hashes.len() != query.len() || query.is_empty() {
        return None;
    }
    if forward_match(hashes, strands, offsets, query) {
        Some(Orientation::Forward)
    } else if reverse_match(hashes, strands, offsets, query) {
        Some(Orientation::ReverseComplement)
    } else {
        None
    }
}

/// Same-orientation repeat: hashes, strand bits, and deltas all equal.
fn forward_match(hashes: &[u64], strands: &[u8], offsets: &[i32], query: &[Minimizer]) -> bool {
    let n = query.len();
    let elements_match =
        (0..n).all(|i| hashes[i] == query[i].0 && strands[i] == strand_bit(query[i]));
    if !elements_match {
        return false;
    }
    (0..n - 1).all(|i| {
        offsets[i] as i64 == read_position(query[i + 1]) - read_position(query[i])
    })
}

/// Reverse-complement repeat: the query walked back-to-front lines up with
/// the pattern front-to-back, with every strand bit complemented. The
/// deltas of the reversed walk must equal the stored offsets.
fn reverse_match(hashes: &[u64], strands: &[u8], offsets: &[i32], query: &[Minimizer]) -> bool {
    let n = query.len();
    let elements_match = (0..n).all(|i| {
        let j = n - 1 - i;
        hashes[i] == query[j].0 && strands[i] != strand_bit(query[j])
    });
    if !elements_match {
        return false;
    }
    (0..n - 1).all(|i| {
        let j = n - 1 - i;
        offsets[i] as i64 == read_position(query[j]) - read_position(query[j - 1])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pack (position, strand) the way extraction emits them.
    fn enc(pos: u64, strand: u64) -> u64 {
        (pos << 1) | strand
    }

    /// Stored-pattern view of a query sketch (same orientation).
    fn store(query: &[Minimizer]) -> (Vec<u64>, Vec<u8>, Vec<i32>) {
        let hashes: Vec<u64> = query.iter().map(|m| m.0).collect();
        let strands: Vec<u8> = query.iter().map(|&m| strand_bit(m)).collect();
        let offsets: Vec<i32> = query
            .windows(2)
            .map(|w| (read_position(w[1]) - read_position(w[0])) as i32)
            .collect();
        (hashes, strands, offsets)
    }

    #[test]
    fn test_forward_exact() {
        let q = vec![(10, enc(0, 0)), (20, enc(7, 1)), (30, enc(15, 0))];
        let (h, s, o) = store(&q);
        assert_eq!(classify_match(&h, &s, &o, &q), Some(Orientation::Forward));
    }

    #[test]
    fn test_single_minimizer_forward() {
        let q = vec![(42, enc(3, 1))];
        let (h, s, o) = store(&q);
        assert_eq!(classify_match(&h, &s, &o, &q), Some(Orientation::Forward));
    }

    #[test]
    fn test_single_minimizer_reverse() {
        let stored = vec![(42, enc(3, 1))];
        let (h, s, o) = store(&stored);
        // Same hash, complemented strand, any position.
        let q = vec![(42, enc(90, 0))];
        assert_eq!(
            classify_match(&h, &s, &o, &q),
            Some(Orientation::ReverseComplement)
        );
    }

    #[test]
    fn test_size_mismatch_is_no_match() {
        let stored = vec![(10, enc(0, 0)), (20, enc(7, 1))];
        let (h, s, o) = store(&stored);
        let q = vec![(10, enc(0, 0))];
        assert_eq!(classify_match(&h, &s, &o, &q), None);
        assert_eq!(classify_match(&h, &s, &o, &[]), None);
    }

    #[test]
    fn test_hash_mismatch_is_no_match() {
        let stored = vec![(10, enc(0, 0)), (20, enc(7, 1))];
        let (h, s, o) = store(&stored);
        let q = vec![(10, enc(0, 0)), (21, enc(7, 1))];
        assert_eq!(classify_match(&h, &s, &o, &q), None);
    }

    #[test]
    fn test_strand_mismatch_is_no_match() {
        let stored = vec![(10, enc(0, 0)), (20, enc(7, 1))];
        let (h, s, o) = store(&stored);
        // Hashes and positions repeat but one strand bit flips: neither a
        // forward repeat nor a full reverse complement.
        let q = vec![(10, enc(0, 1)), (20, enc(7, 1))];
        assert_eq!(classify_match(&h, &s, &o, &q), None);
    }

    #[test]
    fn test_offset_mismatch_is_no_match() {
        let stored = vec![(10, enc(0, 0)), (20, enc(7, 1))];
        let (h, s, o) = store(&stored);
        // Same hashes and strands, shifted spacing.
        let q = vec![(10, enc(0, 0)), (20, enc(8, 1))];
        assert_eq!(classify_match(&h, &s, &o, &q), None);
    }

    #[test]
    fn test_reverse_complement_match() {
        // Stored from a read with minimizers at 0 and 5, both forward.
        let stored = vec![(1, enc(0, 0)), (2, enc(5, 0))];
        let (h, s, o) = store(&stored);
        // RC read: hashes appear in reverse order, strands complemented,
        // spacing preserved (14 -> 19 gives the stored delta 5 when walked
        // back-to-front).
        let q = vec![(2, enc(14, 1)), (1, enc(19, 1))];
        assert_eq!(
            classify_match(&h, &s, &o, &q),
            Some(Orientation::ReverseComplement)
        );
    }

    #[test]
    fn test_reverse_requires_complemented_strands() {
        let stored = vec![(1, enc(0, 0)), (2, enc(5, 0))];
        let (h, s, o) = store(&stored);
        // Reversed hash order but strands NOT complemented.
        let q = vec![(2, enc(14, 0)), (1, enc(19, 0))];
        assert_eq!(classify_match(&h, &s, &o, &q), None);
    }

    #[test]
    fn test_reverse_offset_mismatch() {
        let stored = vec![(1, enc(0, 0)), (2, enc(5, 0))];
        let (h, s, o) = store(&stored);
        // Reversed and complemented, but the spacing shrank to 4.
        let q = vec![(2, enc(14, 1)), (1, enc(18, 1))];
        assert_eq!(classify_match(&h, &s, &o, &q), None);
    }

    #[test]
    fn test_mixed_strand_reverse() {
        // Stored pattern with mixed strand bits at positions 0, 6, 13.
        let stored = vec![(7, enc(0, 0)), (8, enc(6, 1)), (9, enc(13, 0))];
        let (h, s, o) = store(&stored);
        // RC read of length 20 with k = 4: positions reverse, strands flip.
        // Walked back-to-front the deltas are 6 and 7, matching storage.
        let q = vec![(9, enc(3, 1)), (8, enc(10, 0)), (7, enc(16, 1))];
        assert_eq!(
            classify_match(&h, &s, &o, &q),
            Some(Orientation::ReverseComplement)
        );
    }

    #[test]
    fn test_bucket_collision_stays_distinct() {
        // Two sketches that share endpoints (hence the same bucket key)
        // but differ in the middle must never match each other.
        let stored = vec![(5, enc(0, 0)), (6, enc(4, 0)), (7, enc(9, 0))];
        let (h, s, o) = store(&stored);
        let q = vec![(5, enc(0, 0)), (99, enc(4, 0)), (7, enc(9, 0))];
        assert_eq!(classify_match(&h, &s, &o, &q), None);
    }
}
