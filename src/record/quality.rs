//! The QUAL column of a record.

use std::num::ParseFloatError;
use std::str::FromStr;

/// The placeholder for a missing value in a VCF column.
pub const MISSING: &str = ".";

/// An error related to parsing a [`Quality`].
#[derive(Debug)]
pub enum ParseError {
    /// The value was not a number.
    InvalidNumber(String, ParseFloatError),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidNumber(value, err) => {
                write!(f, "invalid quality `{value}`: {err}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// A Phred-scaled quality score.
///
/// The text the score was parsed from is kept alongside the value so that
/// writing a record reproduces its input exactly (e.g., `30.0` stays `30.0`).
#[derive(Clone, Debug, PartialEq)]
pub struct Quality {
    /// The parsed value.
    value: f64,

    /// The original text.
    raw: String,
}

impl Quality {
    /// Gets the numeric value of the quality.
    ///
    /// # Examples
    ///
    /// ```
    /// use callset::record::Quality;
    ///
    /// let quality = "30.0".parse::<Quality>()?;
    /// assert_eq!(quality.value(), 30.0);
    /// assert_eq!(quality.to_string(), "30.0");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn value(&self) -> f64 {
        self.value
    }
}

impl From<f64> for Quality {
    fn from(value: f64) -> Self {
        Self {
            value,
            raw: value.to_string(),
        }
    }
}

impl FromStr for Quality {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .parse::<f64>()
            .map_err(|err| ParseError::InvalidNumber(s.to_string(), err))?;

        Ok(Self {
            value,
            raw: s.to_string(),
        })
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_original_text() -> Result<(), Box<dyn std::error::Error>> {
        let quality = "50.00".parse::<Quality>()?;
        assert_eq!(quality.value(), 50.0);
        assert_eq!(quality.to_string(), "50.00");
        Ok(())
    }

    #[test]
    fn invalid() {
        let err = "high".parse::<Quality>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid quality `high`: invalid float literal"
        );
    }
}
