/// End-to-end tests against the reference sample almanac
///
/// Part 1 reads the seed line as individual seeds, part 2 as start/length
/// pairs. Both must agree across strategies.
use almanac::progress::SharedBuffer;
use almanac::{
    find_global_minimum, lowest_location_by_intervals, parse_almanac, ProgressSink, SearchConfig,
    SeedExpansion, Searcher,
};
use pretty_assertions::assert_eq;

const SAMPLE: &str = include_str!("data/sample.txt");

#[test]
fn test_seed_to_soil_stage() {
    let almanac = parse_almanac(SAMPLE, SeedExpansion::Individual).unwrap();
    let seed_to_soil = &almanac.maps()[0];
    assert_eq!(seed_to_soil.input(), "seed");
    assert_eq!(seed_to_soil.output(), "soil");

    let cases = [
        (0, 0),
        (1, 1),
        (48, 48),
        (49, 49),
        (50, 52),
        (51, 53),
        (96, 98),
        (97, 99),
        (98, 50),
        (99, 51),
        (79, 81),
        (14, 14),
        (55, 57),
        (13, 13),
    ];
    for (seed, soil) in cases {
        assert_eq!(seed_to_soil.lookup(seed), soil, "seed {seed}");
    }
}

#[test]
fn test_full_chain_lookups() {
    let almanac = parse_almanac(SAMPLE, SeedExpansion::Individual).unwrap();
    assert_eq!(almanac.maps().len(), 7);
    assert_eq!(almanac.final_domain(), Some("location"));

    assert_eq!(almanac.lookup(79), 82);
    assert_eq!(almanac.lookup(14), 43);
    assert_eq!(almanac.lookup(55), 86);
    assert_eq!(almanac.lookup(13), 35);
}

#[test]
fn test_lookup_trace_lists_every_domain() {
    let almanac = parse_almanac(SAMPLE, SeedExpansion::Individual).unwrap();
    let mut trace = Vec::new();
    let location = almanac.lookup_traced(79, &mut trace).unwrap();
    assert_eq!(location, 82);
    assert_eq!(
        String::from_utf8(trace).unwrap(),
        "seed: 79 soil: 81 fertilizer: 81 water: 81 light: 74 temperature: 78 humidity: 78 location: 82\n"
    );
}

#[test]
fn test_total_seed_counts() {
    let part1 = parse_almanac(SAMPLE, SeedExpansion::Individual).unwrap();
    let part2 = parse_almanac(SAMPLE, SeedExpansion::RangePairs).unwrap();
    assert_eq!(part1.total_seed_count(), 4);
    assert_eq!(part2.total_seed_count(), 27);
}

#[test]
fn test_part1_individual_seeds() {
    let almanac = parse_almanac(SAMPLE, SeedExpansion::Individual).unwrap();
    let outcome = find_global_minimum(&almanac, SearchConfig::new().with_concurrency(1)).unwrap();
    assert_eq!(outcome.location, 35);
    assert_eq!(outcome.seed, 13);
    assert_eq!(outcome.units, 4);
    assert_eq!(outcome.seeds_covered, 4);
}

#[test]
fn test_part2_range_pairs() {
    let almanac = parse_almanac(SAMPLE, SeedExpansion::RangePairs).unwrap();
    let outcome = find_global_minimum(&almanac, SearchConfig::new().with_concurrency(4)).unwrap();
    assert_eq!(outcome.location, 46);
    assert_eq!(almanac.lookup(outcome.seed), 46);
    assert_eq!(outcome.units, 2);
    assert_eq!(outcome.seeds_covered, 27);
}

#[test]
fn test_part2_batched() {
    let almanac = parse_almanac(SAMPLE, SeedExpansion::RangePairs).unwrap();
    let config = SearchConfig::new().with_concurrency(3).with_batch_size(Some(3));
    let outcome = find_global_minimum(&almanac, config).unwrap();
    assert_eq!(outcome.location, 46);
    // ceil(14 / 3) + ceil(13 / 3)
    assert_eq!(outcome.units, 10);
}

#[test]
fn test_intervals_agree_with_scan() {
    for (expansion, expected) in [
        (SeedExpansion::Individual, 35),
        (SeedExpansion::RangePairs, 46),
    ] {
        let almanac = parse_almanac(SAMPLE, expansion).unwrap();
        let by_intervals = lowest_location_by_intervals(&almanac).unwrap();
        let by_scan = find_global_minimum(&almanac, SearchConfig::new().with_concurrency(2)).unwrap();
        assert_eq!(by_intervals.location, expected);
        assert_eq!(
            (by_intervals.location, by_intervals.seed),
            (by_scan.location, by_scan.seed)
        );
    }
}

#[test]
fn test_progress_lines_per_unit_and_range() {
    let almanac = parse_almanac(SAMPLE, SeedExpansion::RangePairs).unwrap();
    let buf = SharedBuffer::new();
    let outcome = Searcher::new(
        &almanac,
        SearchConfig::new().with_concurrency(2).with_batch_size(Some(5)),
    )
    .with_progress(ProgressSink::new(buf.clone()))
    .run()
    .unwrap();
    assert_eq!(outcome.location, 46);

    let contents = buf.contents();
    let unit_lines = contents.lines().filter(|l| l.starts_with("[worker: ")).count();
    let range_lines = contents.lines().filter(|l| l.starts_with("Range ")).count();
    // ceil(14 / 5) + ceil(13 / 5)
    assert_eq!(unit_lines, 6);
    assert_eq!(range_lines, 2);
    assert!(contents.contains("Range 1 of 2 (79->93)"));
    assert!(contents.contains("Range 2 of 2 (55->68)"));
}
