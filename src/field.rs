//! Lookup of annotation values from the INFO and FORMAT/sample columns.
//!
//! Every lookup returns a [`Result`]. A missing key is reported as
//! [`Error::MissingKey`]; the batch functions ([`info::parse`] and
//! [`sample::parse`]) take an [`OnMissing`] that decides whether that error
//! aborts the batch or collapses to an empty entry.
//!
//! Per-allele values (e.g., `AD=3,7`) are sliced by the record's
//! [`AlleleIndex`] when [`Slicing::ByAllele`] is requested. Records that have
//! not been split always receive the whole value.

pub mod info;
pub mod sample;

use tracing::debug;

use crate::record::AlleleIndex;
use crate::Record;

/// The delimiter between per-allele values.
pub const ALLELE_DELIMITER: char = ',';

/// The FORMAT key for allele depth.
pub const ALLELE_DEPTH: &str = "AD";

/// The FORMAT key for total depth.
pub const TOTAL_DEPTH: &str = "DP";

/// The FORMAT key for the allele fraction reported by the variant caller.
pub const ALLELE_FRACTION: &str = "AF";

/// An alternate FORMAT key for the caller's allele fraction (e.g., MuTect).
pub const ALLELE_FRACTION_ALIAS: &str = "FA";

/// One entry per record for a single key.
///
/// An entry is [`None`] when the key was absent and coercion was requested.
pub type Column = Vec<Option<String>>;

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error related to looking up an annotation value.
#[derive(Debug)]
pub enum Error {
    /// The requested key does not exist in the record.
    MissingKey {
        /// The requested key.
        key: String,

        /// The offending record.
        row: String,
    },

    /// The FORMAT column and a sample column have a different number of
    /// tokens.
    MalformedSample {
        /// The sample name.
        sample: String,

        /// The FORMAT column.
        format: String,

        /// The sample column.
        value: String,
    },

    /// The sample does not exist in the record.
    UnknownSample(String),

    /// The record's allele index points past the end of a per-allele value.
    AlleleOutOfRange {
        /// The requested key.
        key: String,

        /// The allele index.
        index: usize,

        /// The raw value.
        value: String,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::MissingKey { key, row } => write!(
                f,
                "{key} does not exist in row {row}; coerce missing values if you want to fill \
                 them instead"
            ),
            Error::MalformedSample {
                sample,
                format,
                value,
            } => write!(
                f,
                "malformed sample `{sample}`: FORMAT `{format}` and value `{value}` have \
                 different numbers of fields"
            ),
            Error::UnknownSample(sample) => write!(f, "unknown sample `{sample}`"),
            Error::AlleleOutOfRange { key, index, value } => write!(
                f,
                "allele index {index} is out of range for {key}={value}"
            ),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////
// Options
////////////////////////////////////////////////////////////////////////////////////////

/// Whether comma-delimited values are sliced by the record's allele index.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Slicing {
    /// Always return the whole value.
    #[default]
    Whole,

    /// Return the element at the record's allele index.
    ByAllele,
}

/// What to do when a requested key is absent.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OnMissing {
    /// Abort the whole batch with [`Error::MissingKey`].
    #[default]
    Fail,

    /// Record an empty entry and keep going.
    Coerce,
}

/// Selects the portion of `value` that belongs to the record's allele.
pub(crate) fn slice<'a>(
    record: &Record,
    key: &str,
    value: &'a str,
    slicing: Slicing,
) -> Result<&'a str> {
    let index = match (slicing, record.allele_index()) {
        (Slicing::ByAllele, AlleleIndex::SlicedAt(index)) => index,
        _ => return Ok(value),
    };

    if !value.contains(ALLELE_DELIMITER) {
        return Ok(value);
    }

    value
        .split(ALLELE_DELIMITER)
        .nth(index)
        .ok_or_else(|| Error::AlleleOutOfRange {
            key: key.to_string(),
            index,
            value: value.to_string(),
        })
}

/// Collects one [`Column`] per key by running `lookup` against every record.
pub(crate) fn collect<'r, F>(
    records: &'r [Record],
    keys: &[&str],
    on_missing: OnMissing,
    mut lookup: F,
) -> Result<Vec<Column>>
where
    F: FnMut(&'r Record, &[&str]) -> Vec<Result<&'r str>>,
{
    let mut columns = vec![Column::with_capacity(records.len()); keys.len()];

    for record in records {
        for (column, result) in columns.iter_mut().zip(lookup(record, keys)) {
            match result {
                Ok(value) => column.push(Some(value.to_string())),
                Err(Error::MissingKey { .. }) if on_missing == OnMissing::Coerce => {
                    column.push(None)
                }
                Err(err) => return Err(err),
            }
        }
    }

    Ok(columns)
}

/// Computes the allele fraction (`AD / DP`) of a sample for every record.
///
/// `AD` is sliced by allele and both keys are coerced when absent. An entry is
/// `NaN` when either value is missing or not a number, or when the total depth
/// is zero.
///
/// # Examples
///
/// ```
/// use callset::field;
/// use callset::record::AlleleIndex;
/// use callset::Record;
/// use nonempty::nonempty;
///
/// let format = nonempty![String::from("AD"), String::from("DP")];
/// let records = vec![
///     Record::new("1", 100, "A", "G")
///         .with_format(format.clone())
///         .with_sample("s0", "3,7:20")
///         .with_allele_index(AlleleIndex::SlicedAt(1)),
///     Record::new("1", 200, "C", "T")
///         .with_format(format)
///         .with_sample("s0", "5:0"),
/// ];
///
/// let fractions = field::allele_fraction(&records, "s0")?;
/// assert_eq!(fractions[0], 0.35);
/// assert!(fractions[1].is_nan());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn allele_fraction(records: &[Record], sample: &str) -> Result<Vec<f64>> {
    let mut columns = sample::parse(
        records,
        sample,
        &[ALLELE_DEPTH, TOTAL_DEPTH],
        Slicing::ByAllele,
        OnMissing::Coerce,
    )?
    .into_iter();

    // `parse` returns exactly one column per key.
    let depths = columns.next().unwrap_or_default();
    let totals = columns.next().unwrap_or_default();

    Ok(depths
        .into_iter()
        .zip(totals)
        .map(|(depth, total)| {
            match (
                depth.as_deref().and_then(parse_number),
                total.as_deref().and_then(parse_number),
            ) {
                (Some(_), Some(total)) if total == 0.0 => f64::NAN,
                (Some(depth), Some(total)) => depth / total,
                _ => f64::NAN,
            }
        })
        .collect())
}

/// Reads the allele fraction reported by the variant caller for every record.
///
/// The value of `AF` is used, or of `FA` when `AF` is absent, sliced by
/// allele. An entry is `NaN` when neither key is present or the value is not
/// a number.
///
/// # Examples
///
/// ```
/// use callset::field;
/// use callset::record::AlleleIndex;
/// use callset::Record;
/// use nonempty::nonempty;
///
/// let records = vec![
///     Record::new("1", 100, "A", "G")
///         .with_format(nonempty![String::from("GT"), String::from("AF")])
///         .with_sample("s0", "0/1:0.1,0.4")
///         .with_allele_index(AlleleIndex::SlicedAt(1)),
///     Record::new("1", 200, "C", "T")
///         .with_format(nonempty![String::from("FA")])
///         .with_sample("s0", "0.25"),
///     Record::new("1", 300, "C", "T")
///         .with_format(nonempty![String::from("GT")])
///         .with_sample("s0", "0/1"),
/// ];
///
/// let fractions = field::caller_allele_fraction(&records, "s0")?;
/// assert_eq!(fractions[0], 0.4);
/// assert_eq!(fractions[1], 0.25);
/// assert!(fractions[2].is_nan());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn caller_allele_fraction(records: &[Record], sample: &str) -> Result<Vec<f64>> {
    let mut columns = sample::parse(
        records,
        sample,
        &[ALLELE_FRACTION, ALLELE_FRACTION_ALIAS],
        Slicing::ByAllele,
        OnMissing::Coerce,
    )?
    .into_iter();

    // `parse` returns exactly one column per key.
    let fractions = columns.next().unwrap_or_default();
    let aliases = columns.next().unwrap_or_default();

    Ok(fractions
        .into_iter()
        .zip(aliases)
        .map(|(fraction, alias)| {
            fraction
                .or(alias)
                .as_deref()
                .and_then(parse_number)
                .unwrap_or(f64::NAN)
        })
        .collect())
}

/// Parses an annotation value as a number.
fn parse_number(value: &str) -> Option<f64> {
    match value.parse::<f64>() {
        Ok(number) => Some(number),
        Err(_) => {
            debug!("treating non-numeric value `{value}` as missing");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_by_allele() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let record = Record::new("1", 100, "A", "G").with_allele_index(AlleleIndex::SlicedAt(1));

        assert_eq!(slice(&record, "AD", "3,7", Slicing::ByAllele)?, "7");
        assert_eq!(slice(&record, "AD", "3,7", Slicing::Whole)?, "3,7");
        assert_eq!(slice(&record, "DP", "10", Slicing::ByAllele)?, "10");

        Ok(())
    }

    #[test]
    fn unsliced_records_take_whole_value() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let record = Record::new("1", 100, "A", "G");
        assert_eq!(slice(&record, "AD", "3,7", Slicing::ByAllele)?, "3,7");
        Ok(())
    }

    #[test]
    fn allele_out_of_range() {
        let record = Record::new("1", 100, "A", "G").with_allele_index(AlleleIndex::SlicedAt(2));
        let err = slice(&record, "AD", "3,7", Slicing::ByAllele).unwrap_err();

        assert!(matches!(err, Error::AlleleOutOfRange { index: 2, .. }));
        assert_eq!(err.to_string(), "allele index 2 is out of range for AD=3,7");
    }

    #[test]
    fn allele_fraction_missing_values() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let records = vec![
            Record::new("1", 100, "A", "G")
                .with_format(nonempty::nonempty![String::from("GT")])
                .with_sample("s0", "0/1"),
            Record::new("1", 200, "A", "G")
                .with_format(nonempty::nonempty![
                    String::from("AD"),
                    String::from("DP")
                ])
                .with_sample("s0", ".:10"),
            Record::new("1", 300, "A", "G")
                .with_format(nonempty::nonempty![
                    String::from("AD"),
                    String::from("DP")
                ])
                .with_sample("s0", "4:16"),
        ];

        let fractions = allele_fraction(&records, "s0")?;

        assert!(fractions[0].is_nan());
        assert!(fractions[1].is_nan());
        assert_eq!(fractions[2], 0.25);

        Ok(())
    }

    #[test]
    fn caller_allele_fraction_prefers_af() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let records = vec![
            Record::new("1", 100, "A", "G")
                .with_format(nonempty::nonempty![String::from("AF"), String::from("FA")])
                .with_sample("s0", "0.5:0.9"),
            Record::new("1", 200, "A", "G")
                .with_format(nonempty::nonempty![String::from("FA")])
                .with_sample("s0", "0.3,0.6")
                .with_allele_index(AlleleIndex::SlicedAt(0)),
            Record::new("1", 300, "A", "G")
                .with_format(nonempty::nonempty![String::from("AF")])
                .with_sample("s0", "."),
        ];

        let fractions = caller_allele_fraction(&records, "s0")?;

        assert_eq!(fractions[0], 0.5);
        assert_eq!(fractions[1], 0.3);
        assert!(fractions[2].is_nan());

        Ok(())
    }
}
