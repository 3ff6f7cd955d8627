// Library exports for almanac
pub mod almanac;
pub mod cancel;
pub mod error;
pub mod intervals;
pub mod parser;
pub mod progress;
pub mod range_map;
pub mod search;
pub mod seeds;

pub use almanac::{Almanac, SeedRange};
pub use cancel::CancelToken;
pub use error::{AlmanacError, ParseError, ParseErrorKind};
pub use intervals::lowest_location_by_intervals;
pub use parser::parse_almanac;
pub use progress::ProgressSink;
pub use range_map::{Entry, RangeMap};
pub use search::{find_global_minimum, SearchConfig, SearchOutcome, Searcher, Strategy, WorkItem};
pub use seeds::SeedExpansion;
