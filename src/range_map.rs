//! One stage of the almanac: a piecewise translation from an input domain to an
//! output domain.
//!
//! Entries are kept in declaration order. A sorted index over their source
//! starts answers lookups by binary search whenever the entries are disjoint,
//! which they are in well-formed input. Overlapping tables fall back to a
//! linear scan so the first declared entry still wins.

use crate::error::ParseErrorKind;

/// A single `<dest> <source> <length>` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub source_start: u64,
    pub source_len: u64,
    pub dest_start: u64,
}

impl Entry {
    /// Build an entry, rejecting intervals whose last value would lie past
    /// `u64::MAX` on either side of the translation.
    pub fn new(dest_start: u64, source_start: u64, source_len: u64) -> Result<Self, ParseErrorKind> {
        if let Some(span) = source_len.checked_sub(1) {
            if source_start.checked_add(span).is_none() || dest_start.checked_add(span).is_none() {
                return Err(ParseErrorKind::EntryOverflow);
            }
        }
        Ok(Entry {
            source_start,
            source_len,
            dest_start,
        })
    }

    /// Last source value covered (inclusive), `None` for an empty entry.
    pub fn source_last(&self) -> Option<u64> {
        self.source_len
            .checked_sub(1)
            .and_then(|span| self.source_start.checked_add(span))
    }

    pub fn contains(&self, value: u64) -> bool {
        value >= self.source_start && value - self.source_start < self.source_len
    }

    /// Translate a value known to lie inside the source interval.
    fn translate(&self, value: u64) -> u64 {
        self.dest_start + (value - self.source_start)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeMap {
    input: String,
    output: String,
    entries: Vec<Entry>,
    /// Indices into `entries`, sorted by source start, empty entries dropped
    sorted: Vec<usize>,
    disjoint: bool,
}

impl RangeMap {
    pub fn new(input: impl Into<String>, output: impl Into<String>, entries: Vec<Entry>) -> Self {
        let mut sorted: Vec<usize> = (0..entries.len())
            .filter(|&i| entries[i].source_len > 0)
            .collect();
        sorted.sort_by_key(|&i| entries[i].source_start);

        let disjoint = sorted
            .windows(2)
            .all(|w| {
                entries[w[0]]
                    .source_last()
                    .is_some_and(|last| last < entries[w[1]].source_start)
            });

        RangeMap {
            input: input.into(),
            output: output.into(),
            entries,
            sorted,
            disjoint,
        }
    }

    /// Name of the domain this stage reads from (e.g. `seed`)
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Name of the domain this stage produces (e.g. `soil`)
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn is_disjoint(&self) -> bool {
        self.disjoint
    }

    /// The entry that translates `value`, if any.
    pub fn entry_for(&self, value: u64) -> Option<&Entry> {
        if !self.disjoint {
            return self.entries.iter().find(|e| e.contains(value));
        }

        // Last entry starting at or before `value`
        let pos = self
            .sorted
            .partition_point(|&i| self.entries[i].source_start <= value);
        if pos == 0 {
            return None;
        }
        let entry = &self.entries[self.sorted[pos - 1]];
        entry.contains(value).then_some(entry)
    }

    /// Translate one value. Values outside every entry map to themselves.
    pub fn lookup(&self, value: u64) -> u64 {
        match self.entry_for(value) {
            Some(entry) => entry.translate(value),
            None => value,
        }
    }

    /// Translate the `len` values starting at `start` into output pieces.
    ///
    /// Each returned `(input_start, output_start, len)` is a contiguous run of
    /// the input that shifts by a single offset. Pieces come back in input order.
    /// The interval may end exactly at `u64::MAX`.
    pub fn split_interval(&self, start: u64, len: u64) -> Vec<(u64, u64, u64)> {
        let Some(last) = len.checked_sub(1).and_then(|span| start.checked_add(span)) else {
            return Vec::new();
        };

        // First value of every piece
        let mut cuts = vec![start];
        for entry in &self.entries {
            let Some(entry_last) = entry.source_last() else {
                continue;
            };
            for bound in [Some(entry.source_start), entry_last.checked_add(1)]
                .into_iter()
                .flatten()
            {
                if bound > start && bound <= last {
                    cuts.push(bound);
                }
            }
        }
        cuts.sort_unstable();
        cuts.dedup();

        // No entry boundary falls strictly inside a piece, so the entry that
        // covers its first value covers all of it.
        cuts.iter()
            .enumerate()
            .map(|(i, &first)| {
                let piece_len = match cuts.get(i + 1) {
                    Some(&next) => next - first,
                    None => last - first + 1,
                };
                (first, self.lookup(first), piece_len)
            })
            .collect()
    }
}
