//! Genomic regions.
//!
//! Regions are read from BED-style files (see [`record::Record`]) and
//! collected into an [`Index`] that answers membership queries for variant
//! positions. Within this crate, a region is always held as a 1-based,
//! fully-closed [`Interval`].

pub mod index;
pub mod record;

use std::sync::LazyLock;

use omics::coordinate::position::Number;
use regex::Regex;

pub use index::Index;
pub use record::Record;

/// The chromosome prefixes removed before chromosomes are compared.
static CHROMOSOME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^(?:chromosome|chrom|chr)").expect("valid prefix regex"));

/// Removes a leading `chromosome`, `chrom`, or `chr` prefix from a chromosome
/// name.
///
/// # Examples
///
/// ```
/// use callset::region::strip_chromosome_prefix;
///
/// assert_eq!(strip_chromosome_prefix("chr1"), "1");
/// assert_eq!(strip_chromosome_prefix("chromX"), "X");
/// assert_eq!(strip_chromosome_prefix("chromosome22"), "22");
/// assert_eq!(strip_chromosome_prefix("MT"), "MT");
/// ```
pub fn strip_chromosome_prefix(chrom: &str) -> &str {
    match CHROMOSOME_PREFIX.find(chrom) {
        Some(m) => &chrom[m.end()..],
        None => chrom,
    }
}

/// A 1-based, fully-closed interval on a single chromosome.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Interval {
    /// The first position within the interval.
    start: Number,

    /// The last position within the interval.
    stop: Number,
}

impl Interval {
    /// Creates an interval.
    ///
    /// An interval with `start > stop` is empty and contains nothing.
    pub fn new(start: Number, stop: Number) -> Self {
        Self { start, stop }
    }

    /// Gets the first position within the interval.
    pub fn start(&self) -> Number {
        self.start
    }

    /// Gets the last position within the interval.
    pub fn stop(&self) -> Number {
        self.stop
    }

    /// Returns whether the position lies within the interval (both bounds
    /// inclusive).
    ///
    /// # Examples
    ///
    /// ```
    /// use callset::region::Interval;
    ///
    /// let interval = Interval::new(10, 20);
    ///
    /// assert!(interval.contains(10));
    /// assert!(interval.contains(20));
    /// assert!(!interval.contains(9));
    /// assert!(!interval.contains(21));
    /// ```
    pub fn contains(&self, pos: Number) -> bool {
        self.start <= pos && pos <= self.stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_is_only_stripped_at_the_start() {
        assert_eq!(strip_chromosome_prefix("1chr"), "1chr");
        assert_eq!(strip_chromosome_prefix("chr"), "");
        assert_eq!(strip_chromosome_prefix("Chr1"), "Chr1");
    }

    #[test]
    fn empty_interval() {
        let interval = Interval::new(11, 10);
        assert!(!interval.contains(10));
        assert!(!interval.contains(11));
    }

    #[test]
    fn ordering() {
        let mut intervals = vec![Interval::new(30, 40), Interval::new(1, 5), Interval::new(1, 3)];
        intervals.sort();

        assert_eq!(
            intervals,
            vec![Interval::new(1, 3), Interval::new(1, 5), Interval::new(30, 40)]
        );
    }
}
