//! The full map chain: seed ranges plus every stage in declaration order.

use std::io::{self, Write};

use crate::error::ParseErrorKind;
use crate::range_map::RangeMap;

/// Half-open interval `[start, start + length)` of seed values. The range may
/// reach `u64::MAX` itself, so its exclusive end can be `2^64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedRange {
    pub start: u64,
    pub length: u64,
}

impl SeedRange {
    pub fn new(start: u64, length: u64) -> Result<Self, ParseErrorKind> {
        if let Some(span) = length.checked_sub(1) {
            if start.checked_add(span).is_none() {
                return Err(ParseErrorKind::SeedRangeOverflow);
            }
        }
        Ok(SeedRange { start, length })
    }

    /// Exclusive end, widened so a range ending at `u64::MAX` can be shown.
    pub fn end(&self) -> u128 {
        u128::from(self.start) + u128::from(self.length)
    }

    /// Last seed in the range, `None` when empty.
    pub fn last(&self) -> Option<u64> {
        self.length
            .checked_sub(1)
            .and_then(|span| self.start.checked_add(span))
    }

    /// Every seed in the range, in order.
    pub fn seeds(&self) -> impl Iterator<Item = u64> {
        let start = self.start;
        (0..self.length).map(move |offset| start + offset)
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Almanac {
    seed_ranges: Vec<SeedRange>,
    maps: Vec<RangeMap>,
}

impl Almanac {
    pub fn new(seed_ranges: Vec<SeedRange>, maps: Vec<RangeMap>) -> Self {
        Almanac { seed_ranges, maps }
    }

    pub fn seed_ranges(&self) -> &[SeedRange] {
        &self.seed_ranges
    }

    /// Stages in pipeline order
    pub fn maps(&self) -> &[RangeMap] {
        &self.maps
    }

    /// Name of the final domain, `location` for well-formed input.
    pub fn final_domain(&self) -> Option<&str> {
        self.maps.last().map(|m| m.output())
    }

    /// Sum of all seed range lengths, saturating at `u64::MAX`.
    ///
    /// Only used for reporting and estimates; overlapping ranges count twice.
    pub fn total_seed_count(&self) -> u64 {
        self.seed_ranges
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.length))
    }

    /// Fold a value through every stage.
    pub fn lookup(&self, seed: u64) -> u64 {
        self.maps.iter().fold(seed, |value, map| map.lookup(value))
    }

    /// Same as [`lookup`](Self::lookup), writing one trace line to `log`:
    /// `seed: 79 soil: 81 fertilizer: 81 ...`
    pub fn lookup_traced(&self, seed: u64, log: &mut dyn Write) -> io::Result<u64> {
        write!(log, "seed: {seed}")?;
        let mut value = seed;
        for map in &self.maps {
            value = map.lookup(value);
            write!(log, " {}: {value}", map.output())?;
        }
        writeln!(log)?;
        Ok(value)
    }

    /// Lowest location over the `length` seeds from `start`, and the first
    /// seed reaching it.
    pub fn lowest_location_in(&self, start: u64, length: u64) -> Option<(u64, u64)> {
        let mut best: Option<(u64, u64)> = None;
        for seed in (0..length).map(|offset| start + offset) {
            let location = self.lookup(seed);
            if best.map_or(true, |(lowest, _)| location < lowest) {
                best = Some((location, seed));
            }
        }
        best
    }
}
