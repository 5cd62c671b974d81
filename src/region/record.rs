//! A region record.

use std::num::ParseIntError;
use std::str::FromStr;

use omics::coordinate::position::Number;

use crate::region::strip_chromosome_prefix;
use crate::region::Interval;

/// The delimiter for a region record.
pub const DELIMITER: char = '\t';

/// The minimum number of fields in a region record.
pub const MIN_FIELDS: usize = 3;

/// The largest stop position accepted in a region record.
///
/// The 0-based start must be convertible to a 1-based position, and range
/// queries need one position past the stop.
pub const MAX_STOP: Number = Number::MAX - 1;

/// The prefix of a comment line.
pub const COMMENT_PREFIX: &str = "#";

/// The prefix of a track line.
pub const TRACK_PREFIX: &str = "track";

/// The prefix of a browser line.
pub const BROWSER_PREFIX: &str = "browser";

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error associated with parsing a region record.
#[derive(Debug)]
pub enum ParseError {
    /// An incorrect number of fields in the region line.
    IncorrectNumberOfFields(usize),

    /// An invalid start position.
    InvalidStart(String, ParseIntError),

    /// An invalid stop position.
    InvalidStop(String, ParseIntError),

    /// The start position is after the stop position.
    StartAfterStop(Number, Number),

    /// The stop position is larger than [`MAX_STOP`].
    StopOutOfRange(Number),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::IncorrectNumberOfFields(fields) => write!(
                f,
                "invalid number of fields in region: expected at least {MIN_FIELDS} fields, \
                 found {fields} fields"
            ),
            ParseError::InvalidStart(value, err) => write!(f, "invalid start `{value}`: {err}"),
            ParseError::InvalidStop(value, err) => write!(f, "invalid stop `{value}`: {err}"),
            ParseError::StartAfterStop(start, stop) => write!(
                f,
                "the start position ({start}) is after the stop position ({stop})"
            ),
            ParseError::StopOutOfRange(stop) => write!(
                f,
                "the stop position ({stop}) is larger than the maximum ({MAX_STOP})"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

////////////////////////////////////////////////////////////////////////////////////////
// Record
////////////////////////////////////////////////////////////////////////////////////////

/// A single line of a BED-style region file.
///
/// The start position is 0-based and the stop position is 1-based (i.e., the
/// record describes a 0-based, half-open interval). Any fields after the
/// third are ignored.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    /// The chromosome, with any `chr`-style prefix removed.
    chrom: String,

    /// The 0-based start position.
    start: Number,

    /// The 1-based stop position.
    stop: Number,
}

impl Record {
    /// Gets the chromosome, with any `chr`-style prefix removed.
    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    /// Gets the 0-based start position.
    pub fn start(&self) -> Number {
        self.start
    }

    /// Gets the 1-based stop position.
    pub fn stop(&self) -> Number {
        self.stop
    }

    /// Gets the 1-based, fully-closed interval covered by the record.
    ///
    /// # Examples
    ///
    /// ```
    /// use callset::region::Interval;
    ///
    /// let record = "chr1\t9\t20\tname".parse::<callset::region::Record>()?;
    ///
    /// assert_eq!(record.chrom(), "1");
    /// assert_eq!(record.interval(), Interval::new(10, 20));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn interval(&self) -> Interval {
        Interval::new(self.start + 1, self.stop)
    }

    /// Returns whether a line carries no region: blank lines, comments, and
    /// `track` or `browser` lines.
    pub fn is_ignored(line: &str) -> bool {
        let line = line.trim_start();

        line.is_empty()
            || line.starts_with(COMMENT_PREFIX)
            || line.starts_with(TRACK_PREFIX)
            || line.starts_with(BROWSER_PREFIX)
    }
}

impl FromStr for Record {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = s.split(DELIMITER).collect::<Vec<_>>();

        if fields.len() < MIN_FIELDS {
            return Err(ParseError::IncorrectNumberOfFields(fields.len()));
        }

        let start = fields[1]
            .trim()
            .parse::<Number>()
            .map_err(|err| ParseError::InvalidStart(fields[1].to_string(), err))?;
        let stop = fields[2]
            .trim()
            .parse::<Number>()
            .map_err(|err| ParseError::InvalidStop(fields[2].to_string(), err))?;

        if start > stop {
            return Err(ParseError::StartAfterStop(start, stop));
        }

        if stop > MAX_STOP {
            return Err(ParseError::StopOutOfRange(stop));
        }

        Ok(Self {
            chrom: strip_chromosome_prefix(fields[0].trim()).to_string(),
            start,
            stop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse() -> Result<(), Box<dyn std::error::Error>> {
        let record = "chromosome7\t100\t200".parse::<Record>()?;

        assert_eq!(record.chrom(), "7");
        assert_eq!(record.start(), 100);
        assert_eq!(record.stop(), 200);
        assert_eq!(record.interval(), Interval::new(101, 200));

        Ok(())
    }

    #[test]
    fn zero_length_region() -> Result<(), Box<dyn std::error::Error>> {
        let record = "1\t100\t100".parse::<Record>()?;
        assert!(!record.interval().contains(100));
        assert!(!record.interval().contains(101));

        Ok(())
    }

    #[test]
    fn too_few_fields() {
        let err = "1\t100".parse::<Record>().unwrap_err();

        assert!(matches!(err, ParseError::IncorrectNumberOfFields(2)));
        assert_eq!(
            err.to_string(),
            "invalid number of fields in region: expected at least 3 fields, found 2 fields"
        );
    }

    #[test]
    fn invalid_positions() {
        let err = "1\t-5\t100".parse::<Record>().unwrap_err();
        assert!(matches!(err, ParseError::InvalidStart(_, _)));

        let err = "1\t5\tend".parse::<Record>().unwrap_err();
        assert!(matches!(err, ParseError::InvalidStop(_, _)));
    }

    #[test]
    fn start_after_stop() {
        let err = "1\t200\t100".parse::<Record>().unwrap_err();

        assert!(matches!(err, ParseError::StartAfterStop(200, 100)));
        assert_eq!(
            err.to_string(),
            "the start position (200) is after the stop position (100)"
        );
    }

    #[test]
    fn largest_positions() -> Result<(), Box<dyn std::error::Error>> {
        let err = "1\t0\t18446744073709551615".parse::<Record>().unwrap_err();
        assert!(matches!(err, ParseError::StopOutOfRange(Number::MAX)));
        assert_eq!(
            err.to_string(),
            "the stop position (18446744073709551615) is larger than the maximum \
             (18446744073709551614)"
        );

        let err = "1\t18446744073709551615\t18446744073709551615"
            .parse::<Record>()
            .unwrap_err();
        assert!(matches!(err, ParseError::StopOutOfRange(_)));

        let record = "1\t18446744073709551614\t18446744073709551614".parse::<Record>()?;
        assert_eq!(record.interval(), Interval::new(Number::MAX, MAX_STOP));

        Ok(())
    }

    #[test]
    fn ignored_lines() {
        assert!(Record::is_ignored(""));
        assert!(Record::is_ignored("   "));
        assert!(Record::is_ignored("# comment"));
        assert!(Record::is_ignored("track name=regions"));
        assert!(Record::is_ignored("browser position chr1:1-100"));
        assert!(!Record::is_ignored("chr1\t0\t10"));
    }
}
