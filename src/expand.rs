//! Explosion of records into one row per allele and per position.
//!
//! Two policies are applied, in order, by [`expand()`]:
//!
//! 1. [`split_alleles()`] replaces each multi-allelic record with one record
//!    per ALT allele, tagging each with its [`AlleleIndex`].
//! 2. [`explode_mnvs()`] appends, for each multi-nucleotide variant, one
//!    single-base substitution per position. The MNV itself is kept.

use omics::coordinate::position::Number;
use tracing::debug;

use crate::field::ALLELE_DELIMITER;
use crate::record::AlleleIndex;
use crate::Record;

/// Splits multi-allelic records into one record per ALT allele.
///
/// Each derived record is a full copy of its source except for the ALT allele
/// and the allele index. Records with a single ALT allele are passed through
/// unchanged, and the relative order of records is preserved.
///
/// # Examples
///
/// ```
/// use callset::expand;
/// use callset::record::AlleleIndex;
/// use callset::Record;
///
/// let records = expand::split_alleles(vec![Record::new("1", 100, "A", "G,TT")]);
///
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0].alternate(), "G");
/// assert_eq!(records[0].allele_index(), AlleleIndex::SlicedAt(0));
/// assert_eq!(records[1].alternate(), "TT");
/// assert_eq!(records[1].allele_index(), AlleleIndex::SlicedAt(1));
/// ```
pub fn split_alleles(records: impl IntoIterator<Item = Record>) -> Vec<Record> {
    let mut results = Vec::new();

    for record in records {
        if !record.alternate().contains(ALLELE_DELIMITER) {
            results.push(record);
            continue;
        }

        let alleles = record
            .alternate()
            .split(ALLELE_DELIMITER)
            .map(String::from)
            .collect::<Vec<_>>();

        for (i, allele) in alleles.into_iter().enumerate() {
            results.push(
                record
                    .clone()
                    .with_alternate(allele)
                    .with_allele_index(AlleleIndex::SlicedAt(i)),
            );
        }
    }

    results
}

/// Decomposes a multi-nucleotide variant into its single-base substitutions.
///
/// Returns [`None`] when the record is not an MNV (including indels, whose
/// REF and ALT differ in length) or when its last base would lie past the
/// largest representable position.
///
/// # Examples
///
/// ```
/// use callset::expand;
/// use callset::Record;
///
/// let record = Record::new("1", 100, "AG", "TC");
/// let substitutions = expand::decompose_mnv(&record).unwrap();
///
/// assert_eq!(substitutions.len(), 2);
/// assert_eq!((substitutions[0].pos(), substitutions[0].reference(), substitutions[0].alternate()), (100, "A", "T"));
/// assert_eq!((substitutions[1].pos(), substitutions[1].reference(), substitutions[1].alternate()), (101, "G", "C"));
///
/// assert!(expand::decompose_mnv(&Record::new("1", 100, "AG", "A")).is_none());
/// ```
pub fn decompose_mnv(record: &Record) -> Option<Vec<Record>> {
    if !record.is_mnv() {
        return None;
    }

    record
        .pos()
        .checked_add((record.reference_len() - 1) as Number)?;

    let substitutions = record
        .reference()
        .chars()
        .zip(record.alternate().chars())
        .enumerate()
        .map(|(i, (reference, alternate))| {
            record
                .clone()
                .with_pos(record.pos() + i as Number)
                .with_reference(reference.to_string())
                .with_alternate(alternate.to_string())
        })
        .collect();

    Some(substitutions)
}

/// Appends the single-base substitutions of every multi-nucleotide variant.
///
/// The input records are kept, in order, and the derived records are appended
/// after all of them in scan order. Callers that want only one representation
/// of each MNV must deduplicate downstream.
pub fn explode_mnvs(records: Vec<Record>) -> Vec<Record> {
    let mut derived = Vec::new();

    for record in &records {
        if let Some(substitutions) = decompose_mnv(record) {
            debug!(
                "exploded MNV {}:{} {}>{} into {} variants",
                record.chrom(),
                record.pos(),
                record.reference(),
                record.alternate(),
                substitutions.len()
            );
            derived.extend(substitutions);
        }
    }

    let mut results = records;
    results.extend(derived);
    results
}

/// Splits multi-allelic records and then explodes multi-nucleotide variants.
///
/// # Examples
///
/// ```
/// use callset::expand;
/// use callset::Record;
///
/// let records = expand::expand(vec![Record::new("1", 100, "AG", "TC,A")]);
/// let alleles = records
///     .iter()
///     .map(|r| (r.pos(), r.reference(), r.alternate()))
///     .collect::<Vec<_>>();
///
/// assert_eq!(
///     alleles,
///     vec![
///         (100, "AG", "TC"),
///         (100, "AG", "A"),
///         (100, "A", "T"),
///         (101, "G", "C"),
///     ]
/// );
/// ```
pub fn expand(records: impl IntoIterator<Item = Record>) -> Vec<Record> {
    explode_mnvs(split_alleles(records))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_preserves_everything_but_the_allele() {
        let record = Record::new("1", 100, "C", "A,TT")
            .with_id("rs1")
            .with_filter("PASS")
            .with_info("AD=1,2,3");

        let records = split_alleles(vec![record.clone()]);

        assert_eq!(records.len(), 2);

        for (i, (split, allele)) in records.iter().zip(["A", "TT"]).enumerate() {
            assert_eq!(split.chrom(), record.chrom());
            assert_eq!(split.pos(), record.pos());
            assert_eq!(split.reference(), record.reference());
            assert_eq!(split.id(), "rs1");
            assert_eq!(split.filter(), "PASS");
            assert_eq!(split.info(), "AD=1,2,3");
            assert_eq!(split.alternate(), allele);
            assert_eq!(split.allele_index(), AlleleIndex::SlicedAt(i));
        }
    }

    #[test]
    fn split_preserves_order() {
        let records = split_alleles(vec![
            Record::new("1", 100, "A", "G"),
            Record::new("1", 200, "C", "T,G"),
            Record::new("1", 300, "G", "A"),
        ]);

        let positions = records
            .iter()
            .map(|r| (r.pos(), r.alternate()))
            .collect::<Vec<_>>();
        assert_eq!(
            positions,
            vec![(100, "G"), (200, "T"), (200, "G"), (300, "A")]
        );
    }

    #[test]
    fn mnv_past_the_largest_position() {
        assert!(decompose_mnv(&Record::new("1", Number::MAX, "AG", "TC")).is_none());

        let records = explode_mnvs(vec![Record::new("1", Number::MAX, "AG", "TC")]);
        assert_eq!(records.len(), 1);

        let substitutions = decompose_mnv(&Record::new("1", Number::MAX - 1, "AG", "TC"));
        assert_eq!(
            substitutions.map(|s| s.iter().map(|r| r.pos()).collect::<Vec<_>>()),
            Some(vec![Number::MAX - 1, Number::MAX])
        );
    }

    #[test]
    fn mnv_rows_are_appended() {
        let records = explode_mnvs(vec![
            Record::new("1", 100, "AG", "TC"),
            Record::new("1", 200, "C", "T"),
            Record::new("1", 300, "GGA", "CGT"),
        ]);

        let alleles = records
            .iter()
            .map(|r| (r.pos(), r.reference(), r.alternate()))
            .collect::<Vec<_>>();

        assert_eq!(
            alleles,
            vec![
                (100, "AG", "TC"),
                (200, "C", "T"),
                (300, "GGA", "CGT"),
                (100, "A", "T"),
                (101, "G", "C"),
                (300, "G", "C"),
                (301, "G", "G"),
                (302, "A", "T"),
            ]
        );
    }

    #[test]
    fn indels_are_not_split() {
        let records = explode_mnvs(vec![Record::new("1", 100, "AGT", "A")]);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn mnv_keeps_allele_index() {
        let records = expand(vec![Record::new("1", 100, "AG", "C,TC")]);
        let derived = &records[2..];

        assert_eq!(derived.len(), 2);
        assert!(derived
            .iter()
            .all(|r| r.allele_index() == AlleleIndex::SlicedAt(1)));
    }

    #[test]
    fn idempotent_on_simple_records() {
        let records = vec![
            Record::new("1", 100, "A", "G"),
            Record::new("2", 50, "AT", "A"),
            Record::new("X", 7, "C", "CGG"),
        ];

        assert_eq!(expand(records.clone()), records);
    }
}
