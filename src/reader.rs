//! A VCF reader.

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::{self};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use tracing::debug;

use crate::header;
use crate::header::Header;
use crate::header::META_PREFIX;
use crate::record;
use crate::Record;

/// The new line character.
const NEW_LINE: char = '\n';

/// The carriage return character.
const CARRIAGE_RETURN: char = '\r';

/// The extension of gzip-compressed files.
const GZIP_EXTENSION: &str = "gz";

/// An error related to a [`Reader`].
#[derive(Debug)]
pub enum Error {
    /// An I/O error.
    Io(io::Error),

    /// A header error.
    Header(header::Error),

    /// A record error on the given (1-based) line.
    Record(usize, record::ParseError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::Header(err) => write!(f, "header error: {err}"),
            Error::Record(line_no, err) => write!(f, "record error on line {line_no}: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// A VCF reader.
#[derive(Clone, Debug)]
pub struct Reader<T>
where
    T: BufRead,
{
    /// The inner reader.
    inner: T,

    /// The number of lines read so far.
    line_no: usize,
}

impl<T> Reader<T>
where
    T: BufRead,
{
    /// Creates a VCF reader.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n";
    /// let reader = callset::Reader::new(&data[..]);
    /// ```
    pub fn new(inner: T) -> Self {
        Self::from(inner)
    }

    /// Gets a reference to the inner reader.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Gets a mutable reference to the inner reader.
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consumes self and returns the inner reader.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Gets the number of lines read so far.
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// Reads a raw, textual line from the underlying reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io;
    ///
    /// let data = b"##fileformat=VCFv4.2\r\n#CHROM";
    /// let mut reader = callset::Reader::new(&data[..]);
    ///
    /// let mut buffer = String::new();
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 22);
    /// assert_eq!(buffer, "##fileformat=VCFv4.2");
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 6);
    /// assert_eq!(buffer, "#CHROM");
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 0);
    ///
    /// # Ok::<(), io::Error>(())
    /// ```
    pub fn read_line_raw(&mut self, buffer: &mut String) -> io::Result<usize> {
        let read = read_line(&mut self.inner, buffer)?;

        if read > 0 {
            self.line_no += 1;
        }

        Ok(read)
    }

    /// Reads the header: the contiguous `##` meta lines and the column line
    /// that follows them.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n";
    /// let mut reader = callset::Reader::new(&data[..]);
    ///
    /// let header = reader.read_header()?;
    /// assert_eq!(header.meta(), &["##fileformat=VCFv4.2"]);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn read_header(&mut self) -> Result<Header> {
        let mut meta = Vec::new();
        let mut buffer = String::new();

        loop {
            match self.read_line_raw(&mut buffer).map_err(Error::Io)? {
                0 => return Err(Error::Header(header::Error::AbruptEnd)),
                _ if buffer.starts_with(META_PREFIX) => meta.push(buffer.clone()),
                _ => return Header::try_from_parts(meta, &buffer).map_err(Error::Header),
            }
        }
    }

    /// Returns an iterator over the records in the underlying reader.
    ///
    /// The header must already have been read. Blank lines are skipped, as are
    /// rows that lack a REF or ALT allele.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
    ///              1\t100\t.\tA\tG\t.\tPASS\t.\n\
    ///              1\t200\t.\tC\t\t.\tPASS\t.\n";
    /// let mut reader = callset::Reader::new(&data[..]);
    ///
    /// let header = reader.read_header()?;
    /// let records = reader.records(&header).collect::<Result<Vec<_>, _>>()?;
    ///
    /// assert_eq!(records.len(), 1);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn records<'a>(&'a mut self, header: &'a Header) -> Records<'a, T> {
        Records {
            reader: self,
            header,
            buffer: String::new(),
        }
    }
}

impl<T> From<T> for Reader<T>
where
    T: BufRead,
{
    fn from(inner: T) -> Self {
        Self { inner, line_no: 0 }
    }
}

/// An iterator over the [`Record`]s of a [`Reader`].
#[derive(Debug)]
pub struct Records<'a, T>
where
    T: BufRead,
{
    /// The reader.
    reader: &'a mut Reader<T>,

    /// The header describing the columns.
    header: &'a Header,

    /// The line buffer.
    buffer: String,
}

impl<T> Iterator for Records<'_, T>
where
    T: BufRead,
{
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.reader.read_line_raw(&mut self.buffer) {
                Ok(0) => return None,
                Ok(_) if self.buffer.is_empty() => continue,
                Ok(_) => {}
                Err(err) => return Some(Err(Error::Io(err))),
            }

            match Record::try_from_line(&self.buffer, self.header.layout()) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => {
                    debug!(
                        "dropping line {} with a missing REF or ALT allele",
                        self.reader.line_no()
                    );
                }
                Err(err) => return Some(Err(Error::Record(self.reader.line_no(), err))),
            }
        }
    }
}

/// Opens a VCF file for reading, decompressing it if its name ends with `.gz`.
pub fn open(path: impl AsRef<Path>) -> io::Result<Reader<Box<dyn BufRead>>> {
    open_buffered(path).map(Reader::new)
}

/// Opens any file as a buffered reader, decompressing it if its name ends with
/// `.gz`.
pub(crate) fn open_buffered(path: impl AsRef<Path>) -> io::Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path)?;

    match path.extension().and_then(|ext| ext.to_str()) == Some(GZIP_EXTENSION) {
        true => Ok(Box::new(BufReader::new(MultiGzDecoder::new(file)))),
        false => Ok(Box::new(BufReader::new(file))),
    }
}

/// Reads a line from a buffered reader, removing the line terminator.
pub(crate) fn read_line<T>(reader: &mut T, buffer: &mut String) -> io::Result<usize>
where
    T: BufRead,
{
    buffer.clear();

    match reader.read_line(buffer) {
        Ok(0) => Ok(0),
        Ok(n) => {
            if buffer.ends_with(NEW_LINE) {
                buffer.pop();

                if buffer.ends_with(CARRIAGE_RETURN) {
                    buffer.pop();
                }
            }

            Ok(n)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn test_read_line() {
        let data = b"hello\r\nworld!";
        let mut cursor = io::Cursor::new(data);

        let mut buffer = String::new();
        let len = read_line(&mut cursor, &mut buffer).unwrap();
        assert_eq!(buffer, "hello");
        assert_eq!(len, 7);

        let len = read_line(&mut cursor, &mut buffer).unwrap();
        assert_eq!(buffer, "world!");
        assert_eq!(len, 6);
    }

    #[test]
    fn header_must_follow_meta_lines() {
        let data = b"##fileformat=VCFv4.2\n1\t100\t.\tA\tG\t.\tPASS\t.\n";
        let mut reader = Reader::new(&data[..]);

        let err = reader.read_header().unwrap_err();
        assert!(matches!(
            err,
            Error::Header(header::Error::MissingColumnLine(_))
        ));
    }

    #[test]
    fn empty_input() {
        let mut reader = Reader::new(&b""[..]);
        let err = reader.read_header().unwrap_err();
        assert!(matches!(err, Error::Header(header::Error::AbruptEnd)));
    }

    #[test]
    fn record_errors_carry_line_numbers() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let data = b"##fileformat=VCFv4.2\n\
                     #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
                     1\t100\t.\tA\tG\t.\tPASS\t.\n\
                     1\tx\t.\tA\tG\t.\tPASS\t.\n";
        let mut reader = Reader::new(&data[..]);

        let header = reader.read_header()?;
        let mut records = reader.records(&header);

        assert!(records.next().unwrap().is_ok());

        let err = records.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::Record(4, _)));
        assert_eq!(
            err.to_string(),
            "record error on line 4: invalid position `x`: invalid digit found in string"
        );

        Ok(())
    }

    #[test]
    fn skips_blank_lines() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let data = b"#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
                     \n\
                     1\t100\t.\tA\tG\t.\tPASS\t.\n\
                     \n";
        let mut reader = Reader::new(&data[..]);

        let header = reader.read_header()?;
        let records = reader.records(&header).collect::<Result<Vec<_>>>()?;
        assert_eq!(records.len(), 1);

        Ok(())
    }

    #[test]
    fn open_gzip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("reader")?;
        let path = dir.path().join("calls.vcf.gz");

        let mut encoder = GzEncoder::new(File::create(&path)?, Compression::default());
        encoder.write_all(b"#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n")?;
        encoder.write_all(b"1\t5\t.\tA\tC\t.\t.\t.\n")?;
        encoder.finish()?;

        let mut reader = open(&path)?;
        let header = reader.read_header()?;
        let records = reader.records(&header).collect::<Result<Vec<_>>>()?;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pos(), 5);

        Ok(())
    }
}
