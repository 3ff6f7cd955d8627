use std::io::{self, Read};
use std::time::{Duration, Instant};

use almanac::{
    lowest_location_by_intervals, parse_almanac, Almanac, CancelToken, ProgressSink, SearchConfig,
    SeedExpansion, Searcher, Strategy,
};
use anyhow::{bail, Context, Result};
use clap::Parser;

/// Parse a count that may have a metric suffix (k/K=1e3, m/M=1e6, g/G=1e9)
fn parse_metric_number(s: &str) -> Result<u64, String> {
    let s = s.trim().replace('_', "");
    if s.is_empty() {
        return Err("Empty string".to_string());
    }

    let (num_part, multiplier) = match s.chars().last() {
        Some('k') | Some('K') => (&s[..s.len() - 1], 1_000u64),
        Some('m') | Some('M') => (&s[..s.len() - 1], 1_000_000),
        Some('g') | Some('G') => (&s[..s.len() - 1], 1_000_000_000),
        Some(c) if c.is_ascii_alphabetic() => {
            return Err(format!(
                "Unknown suffix '{c}'. Use k/K (1000), m/M (1e6), or g/G (1e9)"
            ))
        }
        _ => (s.as_str(), 1),
    };

    let base: u64 = num_part
        .parse()
        .map_err(|e| format!("Invalid number: {e}"))?;

    base.checked_mul(multiplier)
        .ok_or_else(|| format!("Value {s} too large for u64"))
}

/// Almanac - lowest location search through chained range maps
///
/// Reads an almanac (seed list followed by `<a>-to-<b> map:` blocks) and prints
/// the lowest location reachable from any seed.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Almanac file; reads stdin when omitted or `-`
    #[clap(value_name = "INPUT")]
    input: Option<String>,

    /// Seed line interpretation: 1 (individual seeds) or 2 (start/length pairs)
    #[clap(short = 'p', long = "part", default_value = "1")]
    part: SeedExpansion,

    /// Worker threads (default: 1 for part 1, all cores for part 2)
    #[clap(short = 't', long = "threads")]
    threads: Option<usize>,

    /// Maximum seeds per work unit; unset scans each seed range as one unit
    #[clap(short = 'b', long = "batch-size", value_parser = parse_metric_number)]
    batch_size: Option<u64>,

    /// Search strategy: scan (every seed) or intervals (range propagation)
    #[clap(short = 's', long = "strategy", default_value = "scan")]
    strategy: Strategy,

    /// Abandon the scan after this many seconds (scan strategy only)
    #[clap(long = "timeout")]
    timeout: Option<u64>,

    /// Print the full lookup trace of every seed to stderr (part 1 only)
    #[clap(long = "trace")]
    trace: bool,

    /// Print per-unit progress and timing lines to stderr
    #[clap(long = "progress")]
    progress: bool,

    /// Time one lookup and print the projected scan time
    #[clap(long = "estimate")]
    estimate: bool,

    /// Quiet mode (warnings and errors only)
    #[clap(short = 'q', long = "quiet")]
    quiet: bool,
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        None | Some("-") => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read almanac from stdin")?;
            Ok(text)
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read almanac file: {path}")),
    }
}

fn estimate(almanac: &Almanac) {
    let Some(first) = almanac.seed_ranges().iter().find(|r| !r.is_empty()) else {
        return;
    };
    let start = Instant::now();
    std::hint::black_box(almanac.lookup(first.start));
    let per_lookup = start.elapsed();
    let total = almanac.total_seed_count();
    let projected = Duration::from_secs_f64(per_lookup.as_secs_f64() * total as f64);
    eprintln!("Est time per lookup   : {per_lookup:?}");
    eprintln!("Est time for solution : {projected:?}");
}

fn trace(almanac: &Almanac) -> Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    for range in almanac.seed_ranges() {
        for seed in range.seeds() {
            almanac.lookup_traced(seed, &mut out)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    if args.timeout.is_some() && args.strategy != Strategy::Scan {
        bail!("--timeout is only available with --strategy scan");
    }

    let text = read_input(args.input.as_deref())?;
    let source = args.input.as_deref().unwrap_or("stdin");
    let almanac = parse_almanac(&text, args.part)
        .with_context(|| format!("Failed to parse almanac from {source}"))?;

    log::info!("Seed ranges: {}", almanac.seed_ranges().len());
    log::info!("Total seeds: {}", almanac.total_seed_count());

    if args.estimate && !args.quiet {
        estimate(&almanac);
    }

    if args.trace {
        if args.part != SeedExpansion::Individual {
            bail!("--trace is only available with --part 1");
        }
        trace(&almanac)?;
    }

    let threads = args.threads.unwrap_or(match args.part {
        SeedExpansion::Individual => 1,
        SeedExpansion::RangePairs => num_cpus::get(),
    });

    // Set up rayon thread pool for the interval strategy
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()?;

    let outcome = match args.strategy {
        Strategy::Scan => {
            let config = SearchConfig::new()
                .with_concurrency(threads)
                .with_batch_size(args.batch_size);
            let cancel = match args.timeout {
                Some(secs) => CancelToken::new().with_timeout(Duration::from_secs(secs)),
                None => CancelToken::new(),
            };
            let progress = if args.progress {
                ProgressSink::stderr()
            } else {
                ProgressSink::discard()
            };
            Searcher::new(&almanac, config)
                .with_cancel(cancel)
                .with_progress(progress)
                .run()?
        }
        Strategy::Intervals => lowest_location_by_intervals(&almanac)?,
    };

    log::info!("Lowest location {} (seed {})", outcome.location, outcome.seed);
    println!("{}", outcome.location);

    Ok(())
}
