//! Reader for almanac text.
//!
//! ```text
//! seeds: 79 14 55 13
//!
//! seed-to-soil map:
//! 50 98 2
//! 52 50 48
//! ```
//!
//! Line-oriented: every line is matched with a small nom parser so errors can
//! point at the offending line. Blocks end at a blank line or end of input.

use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::{space0, space1, u64 as number},
    combinator::all_consuming,
    multi::separated_list0,
    sequence::{pair, preceded, separated_pair, terminated, tuple},
    IResult,
};

use crate::almanac::Almanac;
use crate::error::{ParseError, ParseErrorKind};
use crate::range_map::{Entry, RangeMap};
use crate::seeds::SeedExpansion;

fn seed_list(input: &str) -> IResult<&str, Vec<u64>> {
    preceded(pair(tag("seeds:"), space0), separated_list0(space1, number))(input)
}

fn domain_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn map_header(input: &str) -> IResult<&str, (&str, &str)> {
    terminated(
        separated_pair(domain_name, tag("-to-"), domain_name),
        pair(space1, tag("map:")),
    )(input)
}

fn entry_row(input: &str) -> IResult<&str, (u64, u64, u64)> {
    tuple((
        preceded(space0, number),
        preceded(space1, number),
        preceded(space1, number),
    ))(input)
}

/// Run a line parser that must consume the whole (right-trimmed) line.
fn whole_line<'a, T>(
    parser: impl FnMut(&'a str) -> IResult<&'a str, T>,
    line: &'a str,
) -> Option<T> {
    all_consuming(parser)(line).ok().map(|(_, value)| value)
}

struct OpenMap<'a> {
    input: &'a str,
    output: &'a str,
    entries: Vec<Entry>,
}

impl OpenMap<'_> {
    fn close(self) -> RangeMap {
        RangeMap::new(self.input, self.output, self.entries)
    }
}

/// Parse almanac text, expanding the seed line with `expansion`.
///
/// An empty seed list parses successfully; the search rejects it as an empty
/// domain. An almanac without any map block is a parse error.
pub fn parse_almanac(text: &str, expansion: SeedExpansion) -> Result<Almanac, ParseError> {
    let mut seed_ranges = None;
    let mut maps = Vec::new();
    let mut open: Option<OpenMap> = None;
    let mut last_line = 0;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end();
        last_line = line_no;
        let fail = |kind: ParseErrorKind| ParseError::new(line_no, kind);

        if line.is_empty() {
            if let Some(map) = open.take() {
                maps.push(map.close());
            }
            continue;
        }

        if seed_ranges.is_none() {
            if !line.starts_with("seeds:") {
                return Err(fail(ParseErrorKind::MissingSeeds));
            }
            let values = whole_line(seed_list, line)
                .ok_or_else(|| fail(ParseErrorKind::MalformedSeeds(line.to_string())))?;
            seed_ranges = Some(expansion.expand(&values).map_err(fail)?);
            continue;
        }

        if let Some((input, output)) = whole_line(map_header, line) {
            // A header straight after entry rows starts a new block.
            if let Some(map) = open.take() {
                maps.push(map.close());
            }
            open = Some(OpenMap {
                input,
                output,
                entries: Vec::new(),
            });
            continue;
        }

        match open.as_mut() {
            Some(map) => {
                let (dest, source, len) = whole_line(entry_row, line)
                    .ok_or_else(|| fail(ParseErrorKind::MalformedEntry(line.to_string())))?;
                map.entries.push(Entry::new(dest, source, len).map_err(fail)?);
            }
            None if line.ends_with("map:") => {
                return Err(fail(ParseErrorKind::MalformedHeader(line.to_string())));
            }
            None => return Err(fail(ParseErrorKind::UnexpectedLine(line.to_string()))),
        }
    }

    if let Some(map) = open.take() {
        maps.push(map.close());
    }

    let seed_ranges =
        seed_ranges.ok_or_else(|| ParseError::new(last_line.max(1), ParseErrorKind::MissingSeeds))?;
    if maps.is_empty() {
        return Err(ParseError::new(last_line.max(1), ParseErrorKind::NoMaps));
    }

    log::debug!(
        "parsed almanac: {} seed ranges, {} maps",
        seed_ranges.len(),
        maps.len()
    );
    Ok(Almanac::new(seed_ranges, maps))
}
