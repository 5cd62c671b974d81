//! An index of genomic regions for membership queries.

pub mod builder;

use std::collections::HashMap;

use omics::coordinate::position::Number;
use rust_lapper as lapper;

pub use builder::Builder;

use crate::region::strip_chromosome_prefix;
use crate::region::Interval;
use crate::Record;

/// The inner value of the range lookup data structure.
type Iv = lapper::Interval<Number, ()>;

/// Sorted, per-chromosome regions.
///
/// Point queries ([`Index::contains()`]) binary search the sorted intervals of
/// a chromosome. Range queries ([`Index::overlaps()`]) are served by an
/// interval tree built alongside them.
///
/// Generally, you will want to use a [`builder::Builder`] to construct one of
/// these.
#[derive(Debug)]
pub struct Index {
    /// The intervals of each chromosome, sorted ascending.
    intervals: HashMap<String, Vec<Interval>>,

    /// The range lookup for each chromosome.
    lookup: HashMap<String, lapper::Lapper<Number, ()>>,
}

impl Index {
    /// Creates an index from unsorted intervals grouped by chromosome.
    pub(crate) fn new(mut intervals: HashMap<String, Vec<Interval>>) -> Self {
        let mut lookup = HashMap::new();

        for (chrom, entries) in intervals.iter_mut() {
            entries.sort();

            // Lapper intervals are half-open; a stop at the largest position
            // loses only that position from range queries.
            let ivs = entries
                .iter()
                .filter(|interval| interval.start() <= interval.stop())
                .map(|interval| Iv {
                    start: interval.start(),
                    stop: interval.stop().saturating_add(1),
                    val: (),
                })
                .collect::<Vec<_>>();

            lookup.insert(chrom.clone(), lapper::Lapper::new(ivs));
        }

        Self { intervals, lookup }
    }

    /// Returns whether a variant at `pos` spanning `ref_len` reference bases
    /// falls within the regions.
    ///
    /// The first position is tested against the two intervals neighboring its
    /// insertion point in the sorted intervals. When `ref_len` is greater than
    /// one, the last position (`pos + ref_len - 1`) is tested the same way. The
    /// variant is contained if either endpoint is.
    ///
    /// A leading `chr`-style prefix on `chrom` is ignored and an unknown
    /// chromosome is never contained.
    ///
    /// # Examples
    ///
    /// ```
    /// use callset::region::index::Builder;
    /// use callset::region::Interval;
    ///
    /// let index = Builder::from_intervals([("1", Interval::new(10, 20))]);
    ///
    /// assert!(index.contains("chr1", 10, 1));
    /// assert!(!index.contains("1", 9, 1));
    /// assert!(index.contains("1", 19, 5));
    /// assert!(index.contains("1", 8, 3));
    /// assert!(!index.contains("2", 15, 1));
    /// ```
    pub fn contains(&self, chrom: &str, pos: Number, ref_len: usize) -> bool {
        let intervals = match self.intervals.get(strip_chromosome_prefix(chrom)) {
            Some(intervals) => intervals,
            None => return false,
        };

        if contains_point(intervals, pos) {
            return true;
        }

        if ref_len > 1 {
            return match pos.checked_add((ref_len - 1) as Number) {
                Some(end) => contains_point(intervals, end),
                None => false,
            };
        }

        false
    }

    /// Returns whether a record falls within the regions.
    ///
    /// See [`Index::contains()`] for the rules applied.
    pub fn contains_record(&self, record: &Record) -> bool {
        self.contains(record.chrom(), record.pos(), record.reference_len())
    }

    /// Returns whether any region overlaps the 1-based, fully-closed range
    /// from `start` to `stop`.
    ///
    /// # Examples
    ///
    /// ```
    /// use callset::region::index::Builder;
    /// use callset::region::Interval;
    ///
    /// let index = Builder::from_intervals([("1", Interval::new(10, 20))]);
    ///
    /// assert!(index.overlaps("1", 1, 10));
    /// assert!(index.overlaps("1", 20, 30));
    /// assert!(!index.overlaps("1", 21, 30));
    /// ```
    pub fn overlaps(&self, chrom: &str, start: Number, stop: Number) -> bool {
        if start > stop {
            return false;
        }

        self.lookup
            .get(strip_chromosome_prefix(chrom))
            .map(|lookup| lookup.find(start, stop.saturating_add(1)).next().is_some())
            .unwrap_or(false)
    }

    /// Gets the sorted intervals of a chromosome.
    pub fn intervals(&self, chrom: &str) -> Option<&[Interval]> {
        self.intervals
            .get(strip_chromosome_prefix(chrom))
            .map(|intervals| intervals.as_slice())
    }

    /// Gets the chromosomes that carry at least one region.
    pub fn chromosomes(&self) -> impl Iterator<Item = &str> + '_ {
        self.intervals.keys().map(|chrom| chrom.as_str())
    }

    /// Gets the total number of regions.
    pub fn len(&self) -> usize {
        self.intervals.values().map(|intervals| intervals.len()).sum()
    }

    /// Returns whether the index holds no regions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Tests a position against the intervals on either side of its insertion
/// point.
fn contains_point(intervals: &[Interval], pos: Number) -> bool {
    let i = intervals.partition_point(|interval| interval.start() < pos);

    let before = i > 0 && intervals[i - 1].contains(pos);
    let at = intervals.get(i).is_some_and(|interval| interval.contains(pos));

    before || at
}
