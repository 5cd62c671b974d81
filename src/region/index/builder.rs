//! A builder for an [`Index`].

use std::collections::HashMap;
use std::io::BufRead;
use std::io::{self};
use std::path::Path;

use tracing::debug;
use tracing::info;

use crate::reader;
use crate::region::record::ParseError;
use crate::region::strip_chromosome_prefix;
use crate::region::Index;
use crate::region::Interval;
use crate::region::Record;

/// An error related to building an [`Index`].
#[derive(Debug)]
pub enum Error {
    /// An I/O error.
    Io(io::Error),

    /// An invalid region on the given (1-based) line.
    InvalidRecord(usize, ParseError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::InvalidRecord(line_no, err) => {
                write!(f, "invalid region on line {line_no}: {err}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// A builder for an [`Index`].
#[derive(Debug, Default)]
pub struct Builder;

impl Builder {
    /// Builds an [`Index`] from BED-style region text.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"track name=targets\nchr1\t9\t20\nchr1\t0\t5\n";
    /// let index = callset::region::index::Builder::default().try_build_from(&data[..])?;
    ///
    /// assert_eq!(index.len(), 2);
    /// assert!(index.contains("1", 1, 1));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_build_from<T>(&self, mut reader: T) -> Result<Index>
    where
        T: BufRead,
    {
        let mut intervals = HashMap::<String, Vec<Interval>>::new();
        let mut buffer = String::new();
        let mut line_no = 0;

        while reader::read_line(&mut reader, &mut buffer).map_err(Error::Io)? > 0 {
            line_no += 1;

            if Record::is_ignored(&buffer) {
                debug!("skipping line {line_no} of the region file");
                continue;
            }

            let record = buffer
                .parse::<Record>()
                .map_err(|err| Error::InvalidRecord(line_no, err))?;

            intervals
                .entry(record.chrom().to_string())
                .or_default()
                .push(record.interval());
        }

        Ok(Index::new(intervals))
    }

    /// Builds an [`Index`] from a region file, decompressing it if its name
    /// ends with `.gz`.
    pub fn try_build_from_path(&self, path: impl AsRef<Path>) -> Result<Index> {
        let path = path.as_ref();
        let reader = reader::open_buffered(path).map_err(Error::Io)?;
        let index = self.try_build_from(reader)?;

        info!(
            "indexed {} regions on {} chromosomes from {}",
            index.len(),
            index.chromosomes().count(),
            path.display()
        );

        Ok(index)
    }

    /// Builds an [`Index`] from 1-based, fully-closed intervals.
    ///
    /// A leading `chr`-style prefix on each chromosome is removed.
    pub fn from_intervals<S>(intervals: impl IntoIterator<Item = (S, Interval)>) -> Index
    where
        S: AsRef<str>,
    {
        let mut map = HashMap::<String, Vec<Interval>>::new();

        for (chrom, interval) in intervals {
            map.entry(strip_chromosome_prefix(chrom.as_ref()).to_string())
                .or_default()
                .push(interval);
        }

        Index::new(map)
    }
}
