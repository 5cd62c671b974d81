//! Subsets of a callset.

use omics::coordinate::position::Number;
use tracing::debug;

use crate::Record;

/// The filter status of a record that passed every filter.
pub const PASS: &str = "PASS";

/// The ALT allele of a reference (non-variant) call in a gVCF.
pub const REFERENCE_CALL: &str = "<*>";

/// An unknown base.
pub const UNKNOWN_BASE: &str = "N";

/// The kind of a single-allele variant.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Kind {
    /// A single-nucleotide variant.
    Snv,

    /// A multi-nucleotide variant: a substitution of more than one base.
    Mnv,

    /// An insertion or deletion.
    Indel,
}

impl Kind {
    /// Classifies a record by the lengths of its alleles.
    ///
    /// # Examples
    ///
    /// ```
    /// use callset::filter::Kind;
    /// use callset::Record;
    ///
    /// assert_eq!(Kind::of(&Record::new("1", 1, "A", "G")), Kind::Snv);
    /// assert_eq!(Kind::of(&Record::new("1", 1, "AC", "GT")), Kind::Mnv);
    /// assert_eq!(Kind::of(&Record::new("1", 1, "AC", "A")), Kind::Indel);
    /// ```
    pub fn of(record: &Record) -> Self {
        match (record.reference().len(), record.alternate().len()) {
            (r, a) if r != a => Kind::Indel,
            (1, _) => Kind::Snv,
            _ => Kind::Mnv,
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Snv => write!(f, "SNV"),
            Kind::Mnv => write!(f, "MNV"),
            Kind::Indel => write!(f, "indel"),
        }
    }
}

/// Returns the records whose filter status is `PASS`.
pub fn pass_only(records: &[Record]) -> Vec<Record> {
    records
        .iter()
        .filter(|record| record.filter() == PASS)
        .cloned()
        .collect()
}

/// Removes reference calls (ALT `<*>`) and, if `remove_n` is set, calls with
/// an `N` REF or ALT allele.
///
/// # Examples
///
/// ```
/// use callset::filter;
/// use callset::Record;
///
/// let records = vec![
///     Record::new("1", 1, "A", "<*>"),
///     Record::new("1", 2, "N", "A"),
///     Record::new("1", 3, "C", "T"),
/// ];
///
/// assert_eq!(filter::remove_ref_calls(&records, true).len(), 1);
/// assert_eq!(filter::remove_ref_calls(&records, false).len(), 2);
/// ```
pub fn remove_ref_calls(records: &[Record], remove_n: bool) -> Vec<Record> {
    let results = records
        .iter()
        .filter(|record| {
            record.alternate() != REFERENCE_CALL
                && !(remove_n
                    && (record.reference() == UNKNOWN_BASE || record.alternate() == UNKNOWN_BASE))
        })
        .cloned()
        .collect::<Vec<_>>();

    debug!(
        "removed {} reference calls{}",
        records.len() - results.len(),
        if remove_n { " and N calls" } else { "" }
    );

    results
}

/// Returns the records at a position, on any chromosome.
pub fn at_position(records: &[Record], pos: Number) -> Vec<Record> {
    records
        .iter()
        .filter(|record| record.pos() == pos)
        .cloned()
        .collect()
}

/// Returns the records of the given kind.
pub fn of_kind(records: &[Record], kind: Kind) -> Vec<Record> {
    records
        .iter()
        .filter(|record| Kind::of(record) == kind)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass() {
        let records = vec![
            Record::new("1", 1, "A", "G").with_filter("PASS"),
            Record::new("1", 2, "A", "G").with_filter("LowQual"),
            Record::new("1", 3, "A", "G"),
        ];

        let pass = pass_only(&records);
        assert_eq!(pass.len(), 1);
        assert_eq!(pass[0].pos(), 1);
    }

    #[test]
    fn n_alleles_inside_longer_alleles_are_kept() {
        let records = vec![Record::new("1", 1, "AN", "A"), Record::new("1", 2, "A", "N")];

        let kept = remove_ref_calls(&records, true);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].reference(), "AN");
    }

    #[test]
    fn position_and_kind() {
        let records = vec![
            Record::new("1", 100, "A", "G"),
            Record::new("2", 100, "AT", "A"),
            Record::new("1", 200, "CG", "TA"),
        ];

        assert_eq!(at_position(&records, 100).len(), 2);
        assert!(at_position(&records, 150).is_empty());

        assert_eq!(of_kind(&records, Kind::Snv).len(), 1);
        assert_eq!(of_kind(&records, Kind::Indel)[0].chrom(), "2");
        assert_eq!(of_kind(&records, Kind::Mnv)[0].pos(), 200);
    }
}
