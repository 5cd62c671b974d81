//! A loaded callset.

use std::io::BufRead;
use std::io::Write;
use std::io::{self};
use std::path::Path;
use std::time::Instant;

use tracing::info;

use crate::algebra;
use crate::algebra::Concordance;
use crate::algebra::Key;
use crate::expand;
use crate::filter;
use crate::reader;
use crate::Header;
use crate::Reader;
use crate::Record;
use crate::Writer;

/// A header and the records read beneath it.
///
/// The records are kept as they were read: multi-allelic sites are not split
/// until [`Callset::expanded()`] is called.
#[derive(Clone, Debug)]
pub struct Callset {
    /// The header.
    header: Header,

    /// The records in file order.
    records: Vec<Record>,
}

impl Callset {
    /// Creates a callset from a header and its records.
    pub fn new(header: Header, records: Vec<Record>) -> Self {
        Self { header, records }
    }

    /// Reads an entire callset from a [`Reader`].
    pub fn try_from_reader<T>(mut reader: Reader<T>) -> Result<Self, reader::Error>
    where
        T: BufRead,
    {
        let start = Instant::now();

        let header = reader.read_header()?;
        let records = reader.records(&header).collect::<Result<Vec<_>, _>>()?;

        info!(
            "loaded {} records in {:.3} seconds",
            records.len(),
            start.elapsed().as_secs_f64()
        );

        Ok(Self { header, records })
    }

    /// Reads an entire callset from a file, decompressing it if its name ends
    /// with `.gz`.
    pub fn try_from_path(path: impl AsRef<Path>) -> Result<Self, reader::Error> {
        let path = path.as_ref();
        info!("reading callset from {}", path.display());

        let reader = reader::open(path).map_err(reader::Error::Io)?;
        Self::try_from_reader(reader)
    }

    /// Gets the header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Gets the records.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consumes self and returns the header and the records.
    pub fn into_parts(self) -> (Header, Vec<Record>) {
        (self.header, self.records)
    }

    /// Gets the sample names in file order.
    pub fn samples(&self) -> impl Iterator<Item = &str> + '_ {
        self.header.samples()
    }

    /// Returns the records with multi-allelic sites split and
    /// multi-nucleotide variants exploded.
    pub fn expanded(&self) -> Vec<Record> {
        expand::expand(self.records.iter().cloned())
    }

    /// Returns the records whose filter status is `PASS`.
    pub fn pass_only(&self) -> Vec<Record> {
        filter::pass_only(&self.records)
    }

    /// Computes the concordance between the records of this callset and
    /// another.
    ///
    /// # Examples
    ///
    /// ```
    /// use callset::Callset;
    /// use callset::Header;
    /// use callset::Record;
    ///
    /// let header = Header::new(Vec::new(), false, Vec::new());
    /// let a = Callset::new(header.clone(), vec![Record::new("1", 100, "A", "G")]);
    /// let b = Callset::new(header, vec![Record::new("1", 100, "A", "T")]);
    ///
    /// let concordance = a.concordance_with(&b);
    /// assert!(concordance.concordant().is_empty());
    /// assert_eq!(concordance.discordant_first().len(), 1);
    /// assert_eq!(concordance.discordant_second().len(), 1);
    /// ```
    pub fn concordance_with(&self, other: &Callset) -> Concordance {
        algebra::concordance(&self.records, &other.records)
    }

    /// Returns the records of this callset whose composite key is absent from
    /// `other`.
    pub fn subtract(&self, other: &Callset, keys: &[Key]) -> Vec<Record> {
        algebra::subtract(&self.records, &other.records, keys)
    }

    /// Writes the header and every record to `inner`.
    pub fn write_to<W>(&self, inner: W) -> io::Result<W>
    where
        W: Write,
    {
        write(&self.header, &self.records, inner)
    }
}

/// Writes a header followed by the given records to `inner`, returning the
/// flushed inner writer.
pub fn write<W>(header: &Header, records: &[Record], inner: W) -> io::Result<W>
where
    W: Write,
{
    let start = Instant::now();

    let mut writer = Writer::new(inner, header);
    writer.write_header(header)?;
    writer.write_records(records)?;
    writer.flush()?;

    info!(
        "wrote {} records in {:.3} seconds",
        records.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(writer.into_inner())
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use tempdir::TempDir;

    use super::*;

    const DATA: &str = "##fileformat=VCFv4.2\n\
                        #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\ttumor\n\
                        1\t100\t.\tA\tG,T\t50\tPASS\tDP=10\tGT:AD:DP\t1/2:0,4,6:10\n\
                        1\t200\t.\tAG\tTC\t.\tLowQual\t.\tGT:AD:DP\t0/1:5,5:10\n";

    #[test]
    fn load_and_write() -> Result<(), Box<dyn std::error::Error>> {
        let callset = Callset::try_from_reader(Reader::new(DATA.as_bytes()))?;

        assert_eq!(callset.records().len(), 2);
        assert_eq!(callset.samples().collect::<Vec<_>>(), vec!["tumor"]);

        let written = callset.write_to(Vec::new())?;
        assert_eq!(String::from_utf8(written)?, DATA);

        Ok(())
    }

    #[test]
    fn views() -> Result<(), Box<dyn std::error::Error>> {
        let callset = Callset::try_from_reader(Reader::new(DATA.as_bytes()))?;

        let expanded = callset.expanded();
        let alleles = expanded
            .iter()
            .map(|r| (r.pos(), r.reference(), r.alternate()))
            .collect::<Vec<_>>();

        assert_eq!(
            alleles,
            vec![
                (100, "A", "G"),
                (100, "A", "T"),
                (200, "AG", "TC"),
                (200, "A", "T"),
                (201, "G", "C"),
            ]
        );

        let pass = callset.pass_only();
        assert_eq!(pass.len(), 1);
        assert_eq!(pass[0].pos(), 100);

        Ok(())
    }

    #[test]
    fn from_path() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("callset")?;
        let path = dir.path().join("calls.vcf");
        File::create(&path)?.write_all(DATA.as_bytes())?;

        let callset = Callset::try_from_path(&path)?;
        assert_eq!(callset.records().len(), 2);

        let err = Callset::try_from_path(dir.path().join("missing.vcf")).unwrap_err();
        assert!(matches!(err, reader::Error::Io(_)));

        Ok(())
    }
}
