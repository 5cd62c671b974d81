//! Allele-fraction summary statistics.

use tracing::info;

use crate::field;
use crate::filter::Kind;
use crate::Record;

/// The allele-fraction thresholds reported by default.
pub const DEFAULT_THRESHOLDS: [f64; 3] = [0.1, 0.05, 0.2];

/// The length of the MNVs that are counted.
pub const MNV_LENGTH: usize = 2;

////////////////////////////////////////////////////////////////////////////////////////
// Sources
////////////////////////////////////////////////////////////////////////////////////////

/// An error related to parsing a [`Source`].
#[derive(Debug, Eq, PartialEq)]
pub struct ParseSourceError(String);

impl std::fmt::Display for ParseSourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid allele-fraction source `{}`: expected `depth` or `caller`",
            self.0
        )
    }
}

impl std::error::Error for ParseSourceError {}

/// Where the allele fraction of a record comes from.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Source {
    /// Allele depth over total depth (`AD / DP`).
    ///
    /// See [`field::allele_fraction()`].
    #[default]
    Depth,

    /// The fraction reported by the variant caller (`AF`, or `FA`).
    ///
    /// See [`field::caller_allele_fraction()`].
    Caller,
}

impl Source {
    /// Computes the allele fraction of `sample` for every record.
    pub fn fractions(&self, records: &[Record], sample: &str) -> field::Result<Vec<f64>> {
        match self {
            Source::Depth => field::allele_fraction(records, sample),
            Source::Caller => field::caller_allele_fraction(records, sample),
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Depth => write!(f, "depth"),
            Source::Caller => write!(f, "caller"),
        }
    }
}

impl std::str::FromStr for Source {
    type Err = ParseSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "depth" => Ok(Source::Depth),
            "caller" => Ok(Source::Caller),
            _ => Err(ParseSourceError(s.to_string())),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Summaries
////////////////////////////////////////////////////////////////////////////////////////

/// The number of variants of each kind at or above an allele-fraction
/// threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    /// The allele-fraction threshold.
    threshold: f64,

    /// The number of SNVs at or above the threshold.
    snvs: usize,

    /// The number of indels at or above the threshold.
    indels: usize,

    /// The number of two-base MNVs at or above the threshold.
    mnvs: usize,
}

impl Summary {
    /// Counts the variants whose allele fraction is at or above `threshold`.
    ///
    /// `fractions` is aligned with `records`. A `NaN` fraction is never
    /// counted. Only MNVs spanning exactly two bases are counted.
    ///
    /// # Examples
    ///
    /// ```
    /// use callset::stats::Summary;
    /// use callset::Record;
    ///
    /// let records = vec![
    ///     Record::new("1", 100, "A", "G"),
    ///     Record::new("1", 200, "A", "G"),
    ///     Record::new("1", 300, "AT", "A"),
    ///     Record::new("1", 400, "AT", "GC"),
    /// ];
    /// let fractions = [0.5, 0.01, f64::NAN, 0.3];
    ///
    /// let summary = Summary::compute(&records, &fractions, 0.1);
    ///
    /// assert_eq!(summary.snvs(), 1);
    /// assert_eq!(summary.indels(), 0);
    /// assert_eq!(summary.mnvs(), 1);
    /// ```
    pub fn compute(records: &[Record], fractions: &[f64], threshold: f64) -> Self {
        let mut summary = Self {
            threshold,
            snvs: 0,
            indels: 0,
            mnvs: 0,
        };

        for (record, fraction) in records.iter().zip(fractions) {
            if fraction.is_nan() || *fraction < threshold {
                continue;
            }

            match Kind::of(record) {
                Kind::Snv => summary.snvs += 1,
                Kind::Indel => summary.indels += 1,
                Kind::Mnv if record.reference_len() == MNV_LENGTH => summary.mnvs += 1,
                Kind::Mnv => {}
            }
        }

        info!(
            "AF >= {threshold}: {} SNVs, {} indels, {} MNVs",
            summary.snvs, summary.indels, summary.mnvs
        );

        summary
    }

    /// Gets the allele-fraction threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Gets the number of SNVs at or above the threshold.
    pub fn snvs(&self) -> usize {
        self.snvs
    }

    /// Gets the number of indels at or above the threshold.
    pub fn indels(&self) -> usize {
        self.indels
    }

    /// Gets the number of two-base MNVs at or above the threshold.
    pub fn mnvs(&self) -> usize {
        self.mnvs
    }
}

/// Computes a [`Summary`] per threshold from the allele fractions of a
/// sample, taken from `source`.
pub fn summarize(
    records: &[Record],
    sample: &str,
    source: Source,
    thresholds: &[f64],
) -> field::Result<Vec<Summary>> {
    info!("reading allele fractions of `{sample}` from {source}");
    let fractions = source.fractions(records, sample)?;

    Ok(thresholds
        .iter()
        .map(|threshold| Summary::compute(records, &fractions, *threshold))
        .collect())
}
