//! The header of a VCF file.
//!
//! A header is made up of any number of meta lines (prefixed with `##`)
//! followed by exactly one column line (prefixed with a single `#`). The meta
//! lines are kept verbatim so they can be written back out unchanged. The
//! column line is resolved into a [`Layout`] that tells the record parser
//! which cell holds which field.

use std::str::FromStr;

/// The prefix for a meta line.
pub const META_PREFIX: &str = "##";

/// The prefix for the column line.
pub const COLUMN_PREFIX: char = '#';

/// The delimiter between columns.
pub const DELIMITER: char = '\t';

/// The chromosome column.
pub const CHROM: &str = "CHROM";

/// The position column.
pub const POS: &str = "POS";

/// The identifier column.
pub const ID: &str = "ID";

/// The reference allele column.
pub const REF: &str = "REF";

/// The alternate allele column.
pub const ALT: &str = "ALT";

/// The quality column.
pub const QUAL: &str = "QUAL";

/// The filter column.
pub const FILTER: &str = "FILTER";

/// The INFO column.
pub const INFO: &str = "INFO";

/// The FORMAT column.
pub const FORMAT: &str = "FORMAT";

/// The columns every VCF must carry, in the order they are written.
pub const FIXED_COLUMNS: [&str; 8] = [CHROM, POS, ID, REF, ALT, QUAL, FILTER, INFO];

/// A column holding the unsplit ALT list, read in place of `ALT` when `ALT`
/// itself is absent.
pub const ALT_STRING: &str = "ALT_string";

/// A column holding the allele index of a previously expanded record.
pub const ALLELE_INDEX: &str = "allele_index";

/// A column holding a row index.
pub const INDEX: &str = "index";

/// Columns that carry bookkeeping rather than sample data.
pub const BOOKKEEPING_COLUMNS: [&str; 3] = [ALT_STRING, ALLELE_INDEX, INDEX];

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error related to a [`Header`].
#[derive(Debug)]
pub enum Error {
    /// The input ended before a column line was found.
    AbruptEnd,

    /// The first line after the meta lines was not a column line.
    MissingColumnLine(String),

    /// A required column was not present in the column line.
    MissingColumn(&'static str),

    /// A column name appeared more than once.
    DuplicateColumn(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::AbruptEnd => write!(f, "the input ended before the column line"),
            Error::MissingColumnLine(line) => write!(
                f,
                "expected a column line starting with `{COLUMN_PREFIX}`, found: {line}"
            ),
            Error::MissingColumn(column) => write!(f, "missing required column `{column}`"),
            Error::DuplicateColumn(column) => write!(f, "duplicate column `{column}`"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////
// Layout
////////////////////////////////////////////////////////////////////////////////////////

/// The cell index of each field within a data line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    /// The chromosome cell.
    pub(crate) chrom: usize,

    /// The position cell.
    pub(crate) pos: usize,

    /// The identifier cell.
    pub(crate) id: usize,

    /// The reference allele cell.
    pub(crate) reference: usize,

    /// The alternate allele cell.
    pub(crate) alternate: usize,

    /// The quality cell.
    pub(crate) quality: usize,

    /// The filter cell.
    pub(crate) filter: usize,

    /// The INFO cell.
    pub(crate) info: usize,

    /// The FORMAT cell, if present.
    pub(crate) format: Option<usize>,

    /// The allele index cell, if present.
    pub(crate) allele_index: Option<usize>,

    /// The sample names and their cells, in file order.
    pub(crate) samples: Vec<(String, usize)>,

    /// The total number of columns.
    pub(crate) width: usize,
}

impl Layout {
    /// Resolves a layout from the names of the columns.
    fn try_from_names(names: &[String]) -> Result<Self> {
        let find = |name: &'static str| names.iter().position(|n| n == name);
        let require = |name: &'static str| find(name).ok_or(Error::MissingColumn(name));

        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(Error::DuplicateColumn(name.clone()));
            }
        }

        let alternate = find(ALT)
            .or_else(|| find(ALT_STRING))
            .ok_or(Error::MissingColumn(ALT))?;

        let samples = names
            .iter()
            .enumerate()
            .filter(|(_, name)| {
                !FIXED_COLUMNS.contains(&name.as_str())
                    && name.as_str() != FORMAT
                    && !BOOKKEEPING_COLUMNS.contains(&name.as_str())
            })
            .map(|(i, name)| (name.clone(), i))
            .collect();

        Ok(Self {
            chrom: require(CHROM)?,
            pos: require(POS)?,
            id: require(ID)?,
            reference: require(REF)?,
            alternate,
            quality: require(QUAL)?,
            filter: require(FILTER)?,
            info: require(INFO)?,
            format: find(FORMAT),
            allele_index: find(ALLELE_INDEX),
            samples,
            width: names.len(),
        })
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Header
////////////////////////////////////////////////////////////////////////////////////////

/// The header of a VCF file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Header {
    /// The meta lines, verbatim and without line terminators.
    meta: Vec<String>,

    /// The column layout.
    layout: Layout,
}

impl Header {
    /// Creates a header with the standard columns, an optional FORMAT column,
    /// and the given sample columns.
    ///
    /// # Examples
    ///
    /// ```
    /// use callset::Header;
    ///
    /// let header = Header::new(
    ///     vec![String::from("##fileformat=VCFv4.2")],
    ///     true,
    ///     vec![String::from("NA12878")],
    /// );
    ///
    /// assert!(header.has_format());
    /// assert_eq!(header.samples().collect::<Vec<_>>(), vec!["NA12878"]);
    /// ```
    pub fn new(meta: Vec<String>, format: bool, samples: Vec<String>) -> Self {
        let format = (format || !samples.is_empty()).then_some(FIXED_COLUMNS.len());
        let offset = FIXED_COLUMNS.len() + usize::from(format.is_some());

        let samples = samples
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name, offset + i))
            .collect::<Vec<_>>();

        let layout = Layout {
            chrom: 0,
            pos: 1,
            id: 2,
            reference: 3,
            alternate: 4,
            quality: 5,
            filter: 6,
            info: 7,
            format,
            allele_index: None,
            width: offset + samples.len(),
            samples,
        };

        Self { meta, layout }
    }

    /// Attempts to create a header from its meta lines and its column line.
    ///
    /// # Examples
    ///
    /// ```
    /// use callset::Header;
    ///
    /// let header = Header::try_from_parts(
    ///     vec![String::from("##fileformat=VCFv4.2")],
    ///     "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tsample0",
    /// )?;
    ///
    /// assert_eq!(header.meta().len(), 1);
    /// assert_eq!(header.samples().collect::<Vec<_>>(), vec!["sample0"]);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_from_parts(meta: Vec<String>, column_line: &str) -> Result<Self> {
        let names = column_line
            .strip_prefix(COLUMN_PREFIX)
            .filter(|_| !column_line.starts_with(META_PREFIX))
            .ok_or_else(|| Error::MissingColumnLine(column_line.to_string()))?
            .split(DELIMITER)
            .map(|name| name.trim().to_string())
            .collect::<Vec<_>>();

        let layout = Layout::try_from_names(&names)?;
        Ok(Self { meta, layout })
    }

    /// Gets the meta lines.
    pub fn meta(&self) -> &[String] {
        &self.meta
    }

    /// Gets the column layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Returns whether the header carries a FORMAT column.
    pub fn has_format(&self) -> bool {
        self.layout.format.is_some()
    }

    /// Gets the sample names in file order.
    pub fn samples(&self) -> impl Iterator<Item = &str> + '_ {
        self.layout.samples.iter().map(|(name, _)| name.as_str())
    }

    /// Gets the first sample name, if any.
    pub fn first_sample(&self) -> Option<&str> {
        self.samples().next()
    }
}

impl FromStr for Header {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut meta = Vec::new();

        for line in s.lines() {
            if line.starts_with(META_PREFIX) {
                meta.push(line.to_string());
            } else {
                return Header::try_from_parts(meta, line);
            }
        }

        Err(Error::AbruptEnd)
    }
}

/// Writes the canonical column line for a set of sample names.
pub(crate) fn write_column_line<'a>(
    f: &mut dyn std::io::Write,
    format: bool,
    samples: impl IntoIterator<Item = &'a str>,
) -> std::io::Result<()> {
    write!(f, "{COLUMN_PREFIX}{}", FIXED_COLUMNS.join("\t"))?;

    if format {
        write!(f, "{DELIMITER}{FORMAT}")?;
    }

    for sample in samples {
        write!(f, "{DELIMITER}{sample}")?;
    }

    writeln!(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let header = "##fileformat=VCFv4.2\n##source=test\n\
                      #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\ts0\ts1"
            .parse::<Header>()?;

        assert_eq!(header.meta(), &["##fileformat=VCFv4.2", "##source=test"]);
        assert!(header.has_format());
        assert_eq!(header.samples().collect::<Vec<_>>(), vec!["s0", "s1"]);
        assert_eq!(header.layout().reference, 3);
        assert_eq!(header.layout().width, 11);

        Ok(())
    }

    #[test]
    fn bookkeeping_columns_are_not_samples() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let header = "#CHROM\tPOS\tID\tREF\tALT_string\tQUAL\tFILTER\tINFO\tallele_index\ts0"
            .parse::<Header>()?;

        assert_eq!(header.layout().alternate, 4);
        assert_eq!(header.layout().allele_index, Some(8));
        assert!(!header.has_format());
        assert_eq!(header.samples().collect::<Vec<_>>(), vec!["s0"]);

        Ok(())
    }

    #[test]
    fn missing_column_line() {
        let err = "##fileformat=VCFv4.2\n1\t100\t.\tA\tG\t.\tPASS\t."
            .parse::<Header>()
            .unwrap_err();

        assert!(matches!(err, Error::MissingColumnLine(_)));
        assert_eq!(
            err.to_string(),
            "expected a column line starting with `#`, found: 1\t100\t.\tA\tG\t.\tPASS\t."
        );
    }

    #[test]
    fn abrupt_end() {
        let err = "##fileformat=VCFv4.2".parse::<Header>().unwrap_err();
        assert!(matches!(err, Error::AbruptEnd));
    }

    #[test]
    fn missing_column() {
        let err = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tINFO"
            .parse::<Header>()
            .unwrap_err();

        assert!(matches!(err, Error::MissingColumn(FILTER)));
        assert_eq!(err.to_string(), "missing required column `FILTER`");
    }

    #[test]
    fn duplicate_column() {
        let err = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\ts0\ts0"
            .parse::<Header>()
            .unwrap_err();

        assert!(matches!(err, Error::DuplicateColumn(_)));
    }

    #[test]
    fn new_adds_format_for_samples() {
        let header = Header::new(Vec::new(), false, vec![String::from("s0")]);
        assert!(header.has_format());
        assert_eq!(header.layout().samples, vec![(String::from("s0"), 9)]);
    }

    #[test]
    fn column_line() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut buffer = Vec::new();
        write_column_line(&mut buffer, true, ["s0"])?;

        assert_eq!(
            String::from_utf8(buffer)?,
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\ts0\n"
        );

        Ok(())
    }
}
