//! A variant record.

pub mod allele;
pub mod quality;

use std::collections::HashMap;
use std::num::ParseIntError;

pub use allele::AlleleIndex;
use nonempty::NonEmpty;
use omics::coordinate::position::Number;
pub use quality::Quality;
use quality::MISSING;

use crate::header::Layout;
use crate::header::DELIMITER;

/// The delimiter between FORMAT field names and between sample values.
pub const FORMAT_DELIMITER: char = ':';

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error associated with parsing a record.
#[derive(Debug)]
pub enum ParseError {
    /// The line has more cells than the column line declares.
    TooManyFields {
        /// The number of columns in the header.
        expected: usize,

        /// The number of cells found.
        found: usize,
    },

    /// A required cell was missing.
    MissingField(&'static str),

    /// An invalid position.
    InvalidPosition(String, ParseIntError),

    /// An invalid quality.
    InvalidQuality(quality::ParseError),

    /// An invalid allele index.
    InvalidAlleleIndex(String, ParseIntError),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::TooManyFields { expected, found } => write!(
                f,
                "invalid number of fields in record: expected at most {expected} fields, found \
                 {found} fields"
            ),
            ParseError::MissingField(field) => write!(f, "missing field `{field}`"),
            ParseError::InvalidPosition(value, err) => {
                write!(f, "invalid position `{value}`: {err}")
            }
            ParseError::InvalidQuality(err) => write!(f, "{err}"),
            ParseError::InvalidAlleleIndex(value, err) => {
                write!(f, "invalid allele index `{value}`: {err}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// A [`Result`](std::result::Result) with a [`ParseError`].
type Result<T> = std::result::Result<T, ParseError>;

////////////////////////////////////////////////////////////////////////////////////////
// Record
////////////////////////////////////////////////////////////////////////////////////////

/// A canonical variant record.
///
/// Once a record has been through [`crate::expand`], it holds exactly one ALT
/// allele and its [`AlleleIndex`] points back into the ALT list it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// The chromosome.
    chrom: String,

    /// The 1-based position.
    pos: Number,

    /// The identifier.
    id: String,

    /// The reference allele.
    reference: String,

    /// The alternate allele(s).
    alternate: String,

    /// The quality.
    quality: Option<Quality>,

    /// The filter status.
    filter: String,

    /// The raw INFO block.
    info: String,

    /// The FORMAT field names.
    format: Option<NonEmpty<String>>,

    /// The raw sample blocks by sample name.
    samples: HashMap<String, String>,

    /// The index of the allele within the original ALT list.
    allele_index: AlleleIndex,
}

impl Record {
    /// Creates a record with the given locus and alleles. Every other column
    /// is missing.
    ///
    /// # Examples
    ///
    /// ```
    /// use callset::Record;
    ///
    /// let record = Record::new("1", 100, "A", "G");
    ///
    /// assert_eq!(record.chrom(), "1");
    /// assert_eq!(record.pos(), 100);
    /// assert_eq!(record.reference(), "A");
    /// assert_eq!(record.alternate(), "G");
    /// assert_eq!(record.info(), ".");
    /// ```
    pub fn new(
        chrom: impl Into<String>,
        pos: Number,
        reference: impl Into<String>,
        alternate: impl Into<String>,
    ) -> Self {
        Self {
            chrom: chrom.into(),
            pos,
            id: MISSING.to_string(),
            reference: reference.into(),
            alternate: alternate.into(),
            quality: None,
            filter: MISSING.to_string(),
            info: MISSING.to_string(),
            format: None,
            samples: HashMap::new(),
            allele_index: AlleleIndex::Unsliced,
        }
    }

    /// Attempts to parse a data line according to a column [`Layout`].
    ///
    /// Returns `Ok(None)` when the line lacks a REF or ALT allele: such rows
    /// are expected in real-world files and are excluded rather than treated
    /// as errors.
    ///
    /// # Examples
    ///
    /// ```
    /// use callset::Header;
    /// use callset::Record;
    ///
    /// let header = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\ts0"
    ///     .parse::<Header>()?;
    ///
    /// let record = Record::try_from_line("1\t100\trs1\tA\tG\t50\tPASS\tDP=3\tGT:DP\t0/1:3", header.layout())?
    ///     .unwrap();
    /// assert_eq!(record.id(), "rs1");
    /// assert_eq!(record.sample("s0"), Some("0/1:3"));
    ///
    /// let dropped = Record::try_from_line("1\t100\trs1\tA\t\t50\tPASS\tDP=3\tGT:DP\t0/1:3", header.layout())?;
    /// assert!(dropped.is_none());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_from_line(line: &str, layout: &Layout) -> Result<Option<Self>> {
        let cells = line.split(DELIMITER).collect::<Vec<_>>();

        if cells.len() > layout.width {
            return Err(ParseError::TooManyFields {
                expected: layout.width,
                found: cells.len(),
            });
        }

        let cell = |i: usize| cells.get(i).copied().filter(|cell| !cell.is_empty());

        let (reference, alternate) = match (cell(layout.reference), cell(layout.alternate)) {
            (Some(reference), Some(alternate)) => (reference, alternate),
            _ => return Ok(None),
        };

        let chrom = cell(layout.chrom).ok_or(ParseError::MissingField("CHROM"))?;
        let pos = cell(layout.pos).ok_or(ParseError::MissingField("POS"))?;
        let pos = pos
            .parse::<Number>()
            .map_err(|err| ParseError::InvalidPosition(pos.to_string(), err))?;

        let quality = match cell(layout.quality) {
            None | Some(MISSING) => None,
            Some(value) => Some(value.parse().map_err(ParseError::InvalidQuality)?),
        };

        let format = layout
            .format
            .and_then(cell)
            .filter(|value| *value != MISSING)
            .and_then(|value| {
                NonEmpty::from_vec(value.split(FORMAT_DELIMITER).map(String::from).collect())
            });

        let allele_index = match layout.allele_index.and_then(cell) {
            Some(value) => value
                .parse::<i64>()
                .map(AlleleIndex::from)
                .map_err(|err| ParseError::InvalidAlleleIndex(value.to_string(), err))?,
            None => AlleleIndex::Unsliced,
        };

        let text = |i: usize| cells.get(i).copied().unwrap_or_default().to_string();

        // Sample cells missing from a short row are kept as empty values.
        let samples = layout
            .samples
            .iter()
            .map(|(name, i)| (name.clone(), text(*i)))
            .collect();

        Ok(Some(Self {
            chrom: chrom.to_string(),
            pos,
            id: text(layout.id),
            reference: reference.to_string(),
            alternate: alternate.to_string(),
            quality,
            filter: text(layout.filter),
            info: text(layout.info),
            format,
            samples,
            allele_index,
        }))
    }

    /// Gets the chromosome.
    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    /// Gets the 1-based position.
    pub fn pos(&self) -> Number {
        self.pos
    }

    /// Gets the identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Gets the reference allele.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Gets the alternate allele (or the comma-delimited list of alternate
    /// alleles for a record that has not been split).
    pub fn alternate(&self) -> &str {
        &self.alternate
    }

    /// Gets the quality.
    pub fn quality(&self) -> Option<&Quality> {
        self.quality.as_ref()
    }

    /// Gets the filter status.
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Gets the raw INFO block.
    pub fn info(&self) -> &str {
        &self.info
    }

    /// Gets the FORMAT field names.
    pub fn format(&self) -> Option<&NonEmpty<String>> {
        self.format.as_ref()
    }

    /// Gets the raw sample block for a sample.
    pub fn sample(&self, name: &str) -> Option<&str> {
        self.samples.get(name).map(|value| value.as_str())
    }

    /// Gets the raw sample blocks by sample name.
    pub fn samples(&self) -> &HashMap<String, String> {
        &self.samples
    }

    /// Gets the allele index.
    pub fn allele_index(&self) -> AlleleIndex {
        self.allele_index
    }

    /// Gets the number of reference bases the record spans.
    pub fn reference_len(&self) -> usize {
        self.reference.len()
    }

    /// Returns whether the record is a multi-nucleotide variant: a
    /// substitution of more than one base that can be decomposed into
    /// adjacent single-base substitutions.
    ///
    /// # Examples
    ///
    /// ```
    /// use callset::Record;
    ///
    /// assert!(Record::new("1", 100, "AG", "TC").is_mnv());
    /// assert!(!Record::new("1", 100, "A", "T").is_mnv());
    /// assert!(!Record::new("1", 100, "AG", "A").is_mnv());
    /// ```
    pub fn is_mnv(&self) -> bool {
        self.reference.len() == self.alternate.len() && self.reference.len() > 1
    }

    /// Sets the position.
    pub fn with_pos(mut self, pos: Number) -> Self {
        self.pos = pos;
        self
    }

    /// Sets the identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Sets the reference allele.
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    /// Sets the alternate allele.
    pub fn with_alternate(mut self, alternate: impl Into<String>) -> Self {
        self.alternate = alternate.into();
        self
    }

    /// Sets the quality.
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = Some(quality);
        self
    }

    /// Sets the filter status.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Sets the raw INFO block.
    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    /// Sets the FORMAT field names.
    pub fn with_format(mut self, format: NonEmpty<String>) -> Self {
        self.format = Some(format);
        self
    }

    /// Sets the raw sample block for a sample.
    pub fn with_sample(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.samples.insert(name.into(), value.into());
        self
    }

    /// Sets the allele index.
    pub fn with_allele_index(mut self, allele_index: AlleleIndex) -> Self {
        self.allele_index = allele_index;
        self
    }
}

/// Displays the fixed columns and the FORMAT column of the record. Sample
/// columns are omitted, as their order is defined by a header.
impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t",
            self.chrom, self.pos, self.id, self.reference, self.alternate
        )?;

        match &self.quality {
            Some(quality) => write!(f, "{quality}")?,
            None => write!(f, "{MISSING}")?,
        }

        write!(f, "\t{}\t{}", self.filter, self.info)?;

        if let Some(format) = &self.format {
            write!(f, "\t{}", join_format(format))?;
        }

        Ok(())
    }
}

/// Joins FORMAT field names back into their colon-delimited form.
pub(crate) fn join_format(format: &NonEmpty<String>) -> String {
    format
        .iter()
        .map(|name| name.as_str())
        .collect::<Vec<_>>()
        .join(":")
}
