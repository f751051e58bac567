//! Probe tool for tuning the minimizer cache on a synthetic workload.
//!
//! Replays a deterministic stream of duplicate-heavy reads (a fraction of
//! them reverse complements) against a cache, standing in for the
//! aligner's candidate search on every miss, then reports hit rates,
//! memory, and the busiest slots.

use anyhow::Result;
use seedcache::{parse_params_file, CacheParams, Candidate, Minimizer, SeedCache};
use std::path::PathBuf;

const READ_LEN: u32 = 150;
const KMER_LENGTH: u32 = 15;

struct ProbeOptions {
    params_file: Option<PathBuf>,
    reads: usize,
    patterns: usize,
    verbosity: u8,
}

fn parse_args() -> Result<ProbeOptions> {
    let mut opts = ProbeOptions {
        params_file: None,
        reads: 200_000,
        patterns: 5_000,
        verbosity: 0,
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--params" => {
                i += 1;
                opts.params_file = Some(PathBuf::from(args.get(i).ok_or_else(|| {
                    anyhow::anyhow!("--params requires a file path")
                })?));
            }
            "--reads" => {
                i += 1;
                opts.reads = args
                    .get(i)
                    .ok_or_else(|| anyhow::anyhow!("--reads requires a count"))?
                    .parse()?;
            }
            "--patterns" => {
                i += 1;
                opts.patterns = args
                    .get(i)
                    .ok_or_else(|| anyhow::anyhow!("--patterns requires a count"))?
                    .parse()?;
            }
            "-v" => opts.verbosity = 1,
            "-vv" => opts.verbosity = 2,
            other => {
                eprintln!("Usage: cache_probe [--params <file.toml>] [--reads <n>] [--patterns <n>] [-v|-vv]");
                anyhow::bail!("unknown argument: {}", other);
            }
        }
        i += 1;
    }
    if opts.patterns == 0 || opts.reads == 0 {
        anyhow::bail!("--reads and --patterns must be nonzero");
    }
    Ok(opts)
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e3779b97f4a7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// One synthetic fragment: a forward sketch plus the candidates the full
/// search would produce for it.
struct Fragment {
    sketch: Vec<Minimizer>,
    positive: Vec<Candidate>,
    negative: Vec<Candidate>,
}

fn build_fragments(count: usize) -> Vec<Fragment> {
    let mut state = 0x5eed_cace_u64;
    (0..count)
        .map(|id| {
            let len = 4 + (splitmix64(&mut state) % 5) as usize;
            let mut pos = splitmix64(&mut state) % 8;
            let sketch: Vec<Minimizer> = (0..len)
                .map(|_| {
                    let hash = splitmix64(&mut state);
                    let strand = splitmix64(&mut state) & 1;
                    let m = (hash, (pos << 1) | strand);
                    // Keep the sketch inside the read so the RC view of
                    // every fragment stays in-bounds for READ_LEN.
                    pos += 5 + splitmix64(&mut state) % 12;
                    m
                })
                .collect();
            let anchor = 10_000 * id as u64;
            Fragment {
                positive: vec![Candidate::new(anchor)],
                negative: vec![Candidate::new(anchor + 500)],
                sketch,
            }
        })
        .collect()
}

/// Reverse-complement view of a forward sketch for a read of `read_len`.
fn reverse_complement_sketch(sketch: &[Minimizer], read_len: u32, k: u32) -> Vec<Minimizer> {
    sketch
        .iter()
        .rev()
        .map(|&(hash, encoded)| {
            let pos = encoded >> 1;
            let strand = encoded & 1;
            let rc_pos = read_len as u64 - pos - k as u64;
            (hash, (rc_pos << 1) | (strand ^ 1))
        })
        .collect()
}

fn main() -> Result<()> {
    let opts = parse_args()?;
    seedcache::logging::init_logger(opts.verbosity);

    let mut params = match &opts.params_file {
        Some(path) => parse_params_file(path)?,
        None => {
            let mut p = CacheParams::new(65_537);
            p.filter_words = 1 << 18;
            p
        }
    };
    if params.kmer_length == 0 {
        params.kmer_length = KMER_LENGTH;
    }

    println!("=== Workload ===");
    println!("Reads: {}", opts.reads);
    println!("Distinct fragments: {}", opts.patterns);
    println!("Read length: {}, k: {}", READ_LEN, params.kmer_length);
    println!(
        "Cache: {} slots, gate {}/{}x, saturate {}",
        params.capacity,
        params.admission_min_updates,
        params.admission_dominance,
        params.saturate_count
    );

    let mut cache = SeedCache::with_params(params)?;
    let fragments = build_fragments(opts.patterns);

    let mut positive = Vec::new();
    let mut negative = Vec::new();
    let mut repetitive_seed_length = 0u32;
    let (mut hits, mut misses) = (0u64, 0u64);
    let mut rc_sketch;

    let mut state = 0x0dd5_eedu64;
    for _ in 0..opts.reads {
        let fragment = &fragments[(splitmix64(&mut state) as usize) % fragments.len()];
        let reverse = splitmix64(&mut state) % 3 == 0;
        let sketch: &[Minimizer] = if reverse {
            rc_sketch =
                reverse_complement_sketch(&fragment.sketch, READ_LEN, cache.params().kmer_length);
            &rc_sketch
        } else {
            &fragment.sketch
        };

        let hit = cache.query_into(
            sketch,
            READ_LEN,
            &mut positive,
            &mut negative,
            &mut repetitive_seed_length,
        );
        match hit {
            Some(_) => hits += 1,
            None => {
                // Stand-in for the full candidate search, then offer the
                // result to the admission policy.
                misses += 1;
                let (pos, neg) = if reverse {
                    // The search works in the read's own frame; flip the
                    // fragment's lists the way a real search would see them.
                    (fragment.negative.clone(), fragment.positive.clone())
                } else {
                    (fragment.positive.clone(), fragment.negative.clone())
                };
                cache.update(sketch, &pos, &neg, 0);
            }
        }
    }

    println!("\n=== Results ===");
    let total = hits + misses;
    println!("Queries: {}", total);
    println!(
        "Hits: {} ({:.1}%)",
        hits,
        100.0 * hits as f64 / total.max(1) as f64
    );
    println!("Misses: {}", misses);
    println!(
        "Cache memory: {:.1} MiB",
        cache.memory_bytes() as f64 / (1024.0 * 1024.0)
    );

    let stats = cache.slot_stats();
    let activated = stats.iter().filter(|s| s.activated).count();
    println!("Activated slots: {} / {}", activated, cache.capacity());

    println!("\n=== Busiest slots ===");
    let mut by_traffic: Vec<_> = stats
        .iter()
        .enumerate()
        .filter(|(_, s)| s.update_attempts > 0)
        .collect();
    by_traffic.sort_by(|a, b| b.1.update_attempts.cmp(&a.1.update_attempts));
    for (index, slot) in by_traffic.iter().take(10) {
        println!(
            "slot {}: weight={} attempts={} candidates={} max_fp={}",
            index, slot.weight, slot.update_attempts, slot.candidates, slot.max_fingerprint_count
        );
    }

    Ok(())
}
