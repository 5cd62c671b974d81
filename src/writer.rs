//! A VCF writer.

use std::io::Write;
use std::io::{self};

use crate::header;
use crate::header::Header;
use crate::header::DELIMITER;
use crate::record::join_format;
use crate::record::quality::MISSING;
use crate::Record;

/// A VCF writer.
///
/// Records are always written in the canonical column order: `#CHROM POS ID
/// REF ALT QUAL FILTER INFO`, followed by `FORMAT` and the sample columns
/// when present.
#[derive(Debug)]
pub struct Writer<W>
where
    W: Write,
{
    /// The inner writer.
    inner: W,

    /// Whether the FORMAT column is written.
    format: bool,

    /// The sample columns to write, in order.
    samples: Vec<String>,
}

impl<W> Writer<W>
where
    W: Write,
{
    /// Creates a writer that writes the FORMAT column and every sample column
    /// described by `header`.
    pub fn new(inner: W, header: &Header) -> Self {
        Self {
            inner,
            format: header.has_format(),
            samples: header.samples().map(String::from).collect(),
        }
    }

    /// Restricts the sample columns to those given, in the given order.
    pub fn with_samples(mut self, samples: Vec<String>) -> Self {
        self.format = self.format || !samples.is_empty();
        self.samples = samples;
        self
    }

    /// Gets a reference to the inner writer.
    pub fn inner(&self) -> &W {
        &self.inner
    }

    /// Consumes self and returns the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Writes the meta lines of `header` verbatim followed by the column line.
    pub fn write_header(&mut self, header: &Header) -> io::Result<()> {
        for line in header.meta() {
            writeln!(self.inner, "{line}")?;
        }

        header::write_column_line(
            &mut self.inner,
            self.format,
            self.samples.iter().map(|s| s.as_str()),
        )
    }

    /// Writes a single record.
    ///
    /// # Examples
    ///
    /// ```
    /// use callset::Header;
    /// use callset::Record;
    /// use callset::Writer;
    ///
    /// let header = Header::new(Vec::new(), false, Vec::new());
    /// let mut writer = Writer::new(Vec::new(), &header);
    ///
    /// writer.write_record(&Record::new("1", 100, "A", "G").with_filter("PASS"))?;
    /// assert_eq!(writer.into_inner(), b"1\t100\t.\tA\tG\t.\tPASS\t.\n");
    ///
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn write_record(&mut self, record: &Record) -> io::Result<()> {
        write!(
            self.inner,
            "{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}",
            record.chrom(),
            record.pos(),
            record.id(),
            record.reference(),
            record.alternate()
        )?;

        match record.quality() {
            Some(quality) => write!(self.inner, "{quality}")?,
            None => write!(self.inner, "{MISSING}")?,
        }

        write!(
            self.inner,
            "{DELIMITER}{}{DELIMITER}{}",
            record.filter(),
            record.info()
        )?;

        if self.format {
            match record.format() {
                Some(format) => write!(self.inner, "{DELIMITER}{}", join_format(format))?,
                None => write!(self.inner, "{DELIMITER}{MISSING}")?,
            }
        }

        for sample in &self.samples {
            write!(
                self.inner,
                "{DELIMITER}{}",
                record.sample(sample).unwrap_or(MISSING)
            )?;
        }

        writeln!(self.inner)
    }

    /// Writes every record in order.
    pub fn write_records<'r>(
        &mut self,
        records: impl IntoIterator<Item = &'r Record>,
    ) -> io::Result<()> {
        for record in records {
            self.write_record(record)?;
        }

        Ok(())
    }

    /// Flushes the inner writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reader;

    #[test]
    fn round_trip() -> Result<(), Box<dyn std::error::Error>> {
        let data = "##fileformat=VCFv4.2\n\
                    ##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Depth\">\n\
                    #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tnormal\ttumor\n\
                    1\t100\trs1\tA\tG,T\t50.0\tPASS\tDP=10\tGT:AD\t0/1:3,7\t1/2:0,4,6\n\
                    2\t200\t.\tAG\tTC\t.\tLowQual\t.\tGT\t0/0\t0/1\n";

        let mut reader = Reader::new(data.as_bytes());
        let header = reader.read_header()?;
        let records = reader.records(&header).collect::<Result<Vec<_>, _>>()?;

        let mut writer = Writer::new(Vec::new(), &header);
        writer.write_header(&header)?;
        writer.write_records(&records)?;

        assert_eq!(String::from_utf8(writer.into_inner())?, data);

        Ok(())
    }

    #[test]
    fn meta_lines_are_verbatim() -> Result<(), Box<dyn std::error::Error>> {
        let data = "##fileformat=VCFv4.2 \n\
                    ##source=caller\t\n\
                    #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n";

        let mut reader = Reader::new(data.as_bytes());
        let header = reader.read_header()?;

        let mut writer = Writer::new(Vec::new(), &header);
        writer.write_header(&header)?;

        assert_eq!(String::from_utf8(writer.into_inner())?, data);

        Ok(())
    }

    #[test]
    fn empty_cells_are_written_as_missing() -> Result<(), Box<dyn std::error::Error>> {
        let data = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tnormal\ttumor\n\
                    1\t100\t.\tA\tG\t\tPASS\t.\t\t0/1\n";

        let mut reader = Reader::new(data.as_bytes());
        let header = reader.read_header()?;
        let records = reader.records(&header).collect::<Result<Vec<_>, _>>()?;

        let mut writer = Writer::new(Vec::new(), &header);
        writer.write_records(&records)?;

        assert_eq!(
            String::from_utf8(writer.into_inner())?,
            "1\t100\t.\tA\tG\t.\tPASS\t.\t.\t0/1\t\n"
        );

        Ok(())
    }

    #[test]
    fn sample_subset() -> Result<(), Box<dyn std::error::Error>> {
        let data = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tnormal\ttumor\n\
                    1\t100\t.\tA\tG\t.\tPASS\t.\tGT\t0/0\t0/1\n";

        let mut reader = Reader::new(data.as_bytes());
        let header = reader.read_header()?;
        let records = reader.records(&header).collect::<Result<Vec<_>, _>>()?;

        let mut writer =
            Writer::new(Vec::new(), &header).with_samples(vec![String::from("tumor")]);
        writer.write_header(&header)?;
        writer.write_records(&records)?;

        assert_eq!(
            String::from_utf8(writer.into_inner())?,
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\ttumor\n\
             1\t100\t.\tA\tG\t.\tPASS\t.\tGT\t0/1\n"
        );

        Ok(())
    }

    #[test]
    fn unprefixed_chrom_is_written_with_prefix() -> Result<(), Box<dyn std::error::Error>> {
        let header = "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT_string\tQUAL\tFILTER\tINFO"
            .parse::<Header>()?;

        let mut writer = Writer::new(Vec::new(), &header);
        writer.write_header(&header)?;

        assert_eq!(
            String::from_utf8(writer.into_inner())?,
            "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n"
        );

        Ok(())
    }
}
