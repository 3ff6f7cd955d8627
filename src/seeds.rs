//! How the raw numbers on the `seeds:` line become seed ranges.

use std::fmt;
use std::str::FromStr;

use crate::almanac::SeedRange;
use crate::error::ParseErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedExpansion {
    /// Every number is a seed on its own (a range of length one).
    #[default]
    Individual,
    /// Numbers pair up as `start length`.
    RangePairs,
}

impl SeedExpansion {
    pub fn expand(&self, values: &[u64]) -> Result<Vec<SeedRange>, ParseErrorKind> {
        match self {
            SeedExpansion::Individual => values.iter().map(|&seed| SeedRange::new(seed, 1)).collect(),
            SeedExpansion::RangePairs => {
                if values.len() % 2 != 0 {
                    return Err(ParseErrorKind::OddSeedCount(values.len()));
                }
                values
                    .chunks_exact(2)
                    .map(|pair| SeedRange::new(pair[0], pair[1]))
                    .collect()
            }
        }
    }
}

impl FromStr for SeedExpansion {
    type Err = String;

    /// Accepts the puzzle part number or a descriptive name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "individual" | "seeds" => Ok(SeedExpansion::Individual),
            "2" | "pairs" | "ranges" => Ok(SeedExpansion::RangePairs),
            other => Err(format!("unknown seed expansion '{other}', use 1/individual or 2/pairs")),
        }
    }
}

impl fmt::Display for SeedExpansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedExpansion::Individual => write!(f, "individual"),
            SeedExpansion::RangePairs => write!(f, "pairs"),
        }
    }
}
