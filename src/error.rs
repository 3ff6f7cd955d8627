//! Error taxonomy for parsing and searching an almanac.

/// What went wrong while reading almanac text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("missing `seeds:` line")]
    MissingSeeds,

    #[error("malformed seed list: {0}")]
    MalformedSeeds(String),

    /// Range pairs need an even number of values.
    #[error("seed range list has an odd number of values ({0})")]
    OddSeedCount(usize),

    #[error("malformed map header `{0}`, expected `<input>-to-<output> map:`")]
    MalformedHeader(String),

    #[error("malformed map entry `{0}`, expected `<dest> <source> <length>`")]
    MalformedEntry(String),

    #[error("map entry interval exceeds the u64 domain")]
    EntryOverflow,

    #[error("seed range exceeds the u64 domain")]
    SeedRangeOverflow,

    #[error("almanac declares no maps")]
    NoMaps,

    #[error("unexpected line `{0}`")]
    UnexpectedLine(String),
}

/// A fatal parse failure, reported with the 1-based line it occurred on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: usize, kind: ParseErrorKind) -> Self {
        Self { line, kind }
    }
}

/// Errors surfaced by the search engine.
#[derive(Debug, thiserror::Error)]
pub enum AlmanacError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// No seed ranges, or every range is empty.
    #[error("seed domain is empty, there is no minimum to report")]
    EmptyDomain,

    #[error("worker {worker} failed: {reason}")]
    WorkerFailed { worker: usize, reason: String },

    /// The search stopped before every unit reported; partial minima are discarded.
    #[error("search cancelled after {completed} of {dispatched} dispatched work units")]
    Cancelled { completed: usize, dispatched: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = AlmanacError> = std::result::Result<T, E>;
