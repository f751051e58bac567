//! Per-slot diagnostics for offline tuning.
//!
//! Not part of the cache's functional contract: the snapshot exists so a
//! tuning run can see which slots activate, how update traffic distributes
//! over fingerprints, and where the saturation cutoff lands.

use std::io::Write;

use crate::slot::CacheSlot;

/// Diagnostic snapshot of one slot.
#[derive(Debug, Clone)]
pub struct SlotStats {
    /// Reinforcement weight.
    pub weight: i32,
    /// Update attempts counted in the fingerprint histogram.
    pub update_attempts: u32,
    /// Candidates stored across both strands.
    pub candidates: usize,
    /// Whether the slot's weight was ever adjusted by the policy.
    pub activated: bool,
    /// Largest single fingerprint bucket.
    pub max_fingerprint_count: u16,
    /// The full fingerprint histogram.
    pub fingerprint_counts: Vec<u16>,
}

impl SlotStats {
    pub(crate) fn from_slot(slot: &CacheSlot) -> Self {
        SlotStats {
            weight: slot.weight,
            update_attempts: slot.fingerprint_total,
            candidates: slot.candidate_count(),
            activated: slot.activated,
            max_fingerprint_count: slot.fingerprint_counts.iter().copied().max().unwrap_or(0),
            fingerprint_counts: slot.fingerprint_counts.to_vec(),
        }
    }

    /// Write this slot as one whitespace-separated line: weight, update
    /// attempts, candidate count, activation flag, max histogram bucket,
    /// then the full histogram.
    pub fn write_line<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        write!(
            writer,
            "{} {} {} {} {}",
            self.weight,
            self.update_attempts,
            self.candidates,
            self.activated as u8,
            self.max_fingerprint_count
        )?;
        for count in &self.fingerprint_counts {
            write!(writer, " {}", count)?;
        }
        writeln!(writer)
    }
}
