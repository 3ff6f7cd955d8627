//! Interval propagation: push whole seed ranges through each stage instead of
//! evaluating seeds one by one.
//!
//! Every stage splits an interval at its entry boundaries, and each piece
//! shifts by a single offset, so a piece keeps track of the seed its first
//! value came from. The lowest location of a range is the lowest piece start
//! after the last stage. Cost grows with the number of pieces, not seeds.

use rayon::prelude::*;

use crate::almanac::{Almanac, SeedRange};
use crate::error::{AlmanacError, Result};
use crate::search::SearchOutcome;

/// A run of consecutive values in some domain, with the seed of its first value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Piece {
    start: u64,
    len: u64,
    seed: u64,
}

/// Lowest `(location, seed)` reachable from one seed range, plus the piece
/// count after the final stage.
pub fn lowest_in_range(almanac: &Almanac, range: &SeedRange) -> Option<((u64, u64), usize)> {
    if range.is_empty() {
        return None;
    }

    let mut pieces = vec![Piece {
        start: range.start,
        len: range.length,
        seed: range.start,
    }];
    for map in almanac.maps() {
        pieces = pieces
            .iter()
            .flat_map(|piece| {
                map.split_interval(piece.start, piece.len)
                    .into_iter()
                    .map(move |(input, output, len)| Piece {
                        start: output,
                        len,
                        seed: piece.seed + (input - piece.start),
                    })
            })
            .collect();
    }

    let count = pieces.len();
    pieces
        .into_iter()
        .map(|p| (p.start, p.seed))
        .min()
        .map(|best| (best, count))
}

/// Lowest location over the whole seed domain by interval propagation.
///
/// Seed ranges are processed in parallel on the rayon pool. Ties resolve the
/// same way as the scan: the earliest seed range wins, then the lowest seed.
pub fn lowest_location_by_intervals(almanac: &Almanac) -> Result<SearchOutcome> {
    if almanac.total_seed_count() == 0 {
        return Err(AlmanacError::EmptyDomain);
    }

    let per_range: Vec<(usize, (u64, u64), usize)> = almanac
        .seed_ranges()
        .par_iter()
        .enumerate()
        .filter_map(|(idx, range)| {
            lowest_in_range(almanac, range).map(|(best, pieces)| (idx, best, pieces))
        })
        .collect();

    let pieces: usize = per_range.iter().map(|&(_, _, n)| n).sum();
    let (_, (location, seed), _) = per_range
        .iter()
        .copied()
        .min_by_key(|&(idx, (location, _), _)| (location, idx))
        .ok_or(AlmanacError::EmptyDomain)?;

    log::info!(
        "lowest location {location} from seed {seed} ({} ranges, {pieces} final intervals)",
        per_range.len()
    );
    Ok(SearchOutcome {
        location,
        seed,
        units: per_range.len(),
        seeds_covered: almanac.total_seed_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range_map::{Entry, RangeMap};

    fn chain(seeds: Vec<SeedRange>) -> Almanac {
        let first = RangeMap::new(
            "seed",
            "soil",
            vec![Entry::new(50, 98, 2).unwrap(), Entry::new(52, 50, 48).unwrap()],
        );
        let second = RangeMap::new("soil", "location", vec![Entry::new(0, 60, 5).unwrap()]);
        Almanac::new(seeds, vec![first, second])
    }

    #[test]
    fn test_matches_brute_force_per_range() {
        let almanac = chain(Vec::new());
        for (start, length) in [(40, 70), (55, 3), (96, 4), (0, 1), (120, 10)] {
            let range = SeedRange::new(start, length).unwrap();
            let (best, _) = lowest_in_range(&almanac, &range).unwrap();
            assert_eq!(
                Some(best),
                almanac.lowest_location_in(start, length),
                "range {start}+{length}"
            );
        }
    }

    #[test]
    fn test_empty_range_has_no_minimum() {
        let almanac = chain(Vec::new());
        assert_eq!(lowest_in_range(&almanac, &SeedRange::new(7, 0).unwrap()), None);
    }

    #[test]
    fn test_whole_domain_minimum() {
        let almanac = chain(vec![
            SeedRange::new(90, 10).unwrap(),
            SeedRange::new(58, 4).unwrap(),
        ]);
        let outcome = lowest_location_by_intervals(&almanac).unwrap();
        // 58 -> 60 -> 0
        assert_eq!((outcome.location, outcome.seed), (0, 58));
        assert_eq!(outcome.units, 2);
        assert_eq!(outcome.seeds_covered, 14);
    }

    #[test]
    fn test_range_ending_at_max() {
        let map = RangeMap::new("seed", "location", vec![Entry::new(0, u64::MAX, 1).unwrap()]);
        let range = SeedRange::new(u64::MAX - 4, 5).unwrap();
        let almanac = Almanac::new(vec![range], vec![map]);
        let (best, pieces) = lowest_in_range(&almanac, &range).unwrap();
        assert_eq!(best, (0, u64::MAX));
        assert_eq!(pieces, 2);
    }

    #[test]
    fn test_empty_domain() {
        assert!(matches!(
            lowest_location_by_intervals(&chain(Vec::new())),
            Err(AlmanacError::EmptyDomain)
        ));
    }
}
