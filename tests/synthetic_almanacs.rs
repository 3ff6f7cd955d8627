#![allow(dead_code)]
/// Synthetic almanac generation for tests
///
/// Builds random but reproducible almanac text: a handful of stages whose
/// entries are disjoint within each stage, and seed ranges small enough for a
/// brute-force scan to finish quickly.
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct SyntheticSpec {
    pub stages: usize,
    pub entries_per_stage: usize,
    pub domain: u64,
    pub seed_ranges: usize,
    pub max_range_len: u64,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        SyntheticSpec {
            stages: 4,
            entries_per_stage: 6,
            domain: 10_000,
            seed_ranges: 4,
            max_range_len: 1_500,
        }
    }
}

const DOMAINS: [&str; 8] = [
    "seed",
    "soil",
    "fertilizer",
    "water",
    "light",
    "temperature",
    "humidity",
    "location",
];

fn domain_name(stage: usize) -> String {
    DOMAINS
        .get(stage)
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("stage{stage}"))
}

/// Generate almanac text with seed values written as `start length` pairs.
pub fn generate_almanac(rng_seed: u64, spec: &SyntheticSpec) -> String {
    let mut rng = StdRng::seed_from_u64(rng_seed);
    let mut text = String::from("seeds:");

    for _ in 0..spec.seed_ranges {
        let start = rng.gen_range(0..spec.domain);
        let len = rng.gen_range(0..=spec.max_range_len);
        text.push_str(&format!(" {start} {len}"));
    }
    text.push('\n');

    for stage in 0..spec.stages {
        text.push_str(&format!(
            "\n{}-to-{} map:\n",
            domain_name(stage),
            domain_name(stage + 1)
        ));

        // Walk the domain left to right so entries never overlap
        let slot = (spec.domain / spec.entries_per_stage.max(1) as u64).max(2);
        let mut pos = 0u64;
        for _ in 0..spec.entries_per_stage {
            let gap = rng.gen_range(0..slot / 2);
            let len = rng.gen_range(1..slot / 2 + 1);
            let dest = rng.gen_range(0..spec.domain);
            pos += gap;
            text.push_str(&format!("{dest} {pos} {len}\n"));
            pos += len;
        }
    }

    text
}
