//! Lookup of values within the FORMAT and sample columns.

use std::time::Instant;

use tracing::debug;

use crate::field;
use crate::field::Column;
use crate::field::Error;
use crate::field::OnMissing;
use crate::field::Result;
use crate::field::Slicing;
use crate::record::join_format;
use crate::record::FORMAT_DELIMITER;
use crate::Record;

/// Pairs each FORMAT name with the sample's value for it.
///
/// Returns an empty list when the record has no FORMAT column or the sample
/// cell is empty. Otherwise, the FORMAT and sample columns must have the same
/// number of tokens.
fn fields<'r>(record: &'r Record, sample: &str) -> Result<Vec<(&'r str, &'r str)>> {
    let value = record
        .sample(sample)
        .ok_or_else(|| Error::UnknownSample(sample.to_string()))?;

    let format = match record.format() {
        Some(format) if !value.is_empty() => format,
        _ => return Ok(Vec::new()),
    };

    let values = value.split(FORMAT_DELIMITER).collect::<Vec<_>>();

    if values.len() != format.len() {
        return Err(Error::MalformedSample {
            sample: sample.to_string(),
            format: join_format(format),
            value: value.to_string(),
        });
    }

    Ok(format
        .iter()
        .map(|name| name.as_str())
        .zip(values)
        .collect())
}

/// Finds a key within the paired fields of a record.
fn lookup<'r>(
    record: &'r Record,
    fields: &[(&'r str, &'r str)],
    key: &str,
    slicing: Slicing,
) -> Result<&'r str> {
    let value = fields
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, value)| *value)
        .ok_or_else(|| Error::MissingKey {
            key: key.to_string(),
            row: record.to_string(),
        })?;

    field::slice(record, key, value, slicing)
}

/// Gets the value of a FORMAT key for one sample of a single record.
///
/// # Examples
///
/// ```
/// use callset::field::sample;
/// use callset::field::Slicing;
/// use callset::record::AlleleIndex;
/// use callset::Record;
/// use nonempty::nonempty;
///
/// let record = Record::new("1", 100, "A", "T")
///     .with_format(nonempty![String::from("GT"), String::from("AD")])
///     .with_sample("tumor", "0/1:12,30")
///     .with_allele_index(AlleleIndex::SlicedAt(0));
///
/// assert_eq!(sample::get(&record, "tumor", "GT", Slicing::ByAllele)?, "0/1");
/// assert_eq!(sample::get(&record, "tumor", "AD", Slicing::ByAllele)?, "12");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn get<'r>(record: &'r Record, sample: &str, key: &str, slicing: Slicing) -> Result<&'r str> {
    let fields = fields(record, sample)?;
    lookup(record, &fields, key, slicing)
}

/// Parses the values of several FORMAT keys for one sample across a batch of
/// records.
///
/// One [`Column`] is returned per key, in the order of `keys`, with one entry
/// per record. A FORMAT/sample token count mismatch is always fatal; a missing
/// key is fatal only with [`OnMissing::Fail`].
pub fn parse(
    records: &[Record],
    sample: &str,
    keys: &[&str],
    slicing: Slicing,
    on_missing: OnMissing,
) -> Result<Vec<Column>> {
    let start = Instant::now();

    let columns = field::collect(records, keys, on_missing, |record, keys| {
        match fields(record, sample) {
            Ok(fields) => keys
                .iter()
                .map(|key| lookup(record, &fields, key, slicing))
                .collect(),
            Err(err) => vec![Err(err)],
        }
    })?;

    debug!(
        "parsed sample field `{sample}` for keys {:?} in {:.3} seconds",
        keys,
        start.elapsed().as_secs_f64()
    );

    Ok(columns)
}

#[cfg(test)]
mod tests {
    use nonempty::nonempty;

    use super::*;
    use crate::record::AlleleIndex;

    fn record(value: &str) -> Record {
        Record::new("1", 100, "A", "G")
            .with_format(nonempty![
                String::from("GT"),
                String::from("AD"),
                String::from("DP")
            ])
            .with_sample("s0", value)
    }

    #[test]
    fn parse_keys() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let records = vec![
            record("0/1:3,7:10").with_allele_index(AlleleIndex::SlicedAt(1)),
            record("1/1:0,8:8"),
        ];

        let columns = parse(&records, "s0", &["DP", "AD"], Slicing::ByAllele, OnMissing::Fail)?;

        assert_eq!(
            columns,
            vec![
                vec![Some(String::from("10")), Some(String::from("8"))],
                vec![Some(String::from("7")), Some(String::from("0,8"))],
            ]
        );

        Ok(())
    }

    #[test]
    fn malformed_sample_is_fatal_even_when_coercing() {
        let records = vec![record("0/1:3,7")];

        let err = parse(&records, "s0", &["GT"], Slicing::Whole, OnMissing::Coerce).unwrap_err();

        assert!(matches!(err, Error::MalformedSample { .. }));
        assert_eq!(
            err.to_string(),
            "malformed sample `s0`: FORMAT `GT:AD:DP` and value `0/1:3,7` have different numbers \
             of fields"
        );
    }

    #[test]
    fn missing_key() {
        let records = vec![record("0/1:3,7:10")];

        let err = parse(&records, "s0", &["GQ"], Slicing::Whole, OnMissing::Fail).unwrap_err();
        assert!(matches!(&err, Error::MissingKey { key, .. } if key == "GQ"));

        let columns = parse(&records, "s0", &["GQ"], Slicing::Whole, OnMissing::Coerce).unwrap();
        assert_eq!(columns, vec![vec![None]]);
    }

    #[test]
    fn missing_format_is_a_missing_key() {
        let records = vec![Record::new("1", 100, "A", "G").with_sample("s0", "0/1")];

        let columns = parse(&records, "s0", &["GT"], Slicing::Whole, OnMissing::Coerce).unwrap();
        assert_eq!(columns, vec![vec![None]]);
    }

    #[test]
    fn empty_sample_cell_is_missing_keys() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let records = vec![record("")];

        let columns = parse(&records, "s0", &["GT", "DP"], Slicing::Whole, OnMissing::Coerce)?;
        assert_eq!(columns, vec![vec![None], vec![None]]);

        let err = parse(&records, "s0", &["GT"], Slicing::Whole, OnMissing::Fail).unwrap_err();
        assert!(matches!(err, Error::MissingKey { .. }));

        Ok(())
    }

    #[test]
    fn unknown_sample() {
        let err = get(&record("0/1:3,7:10"), "s1", "GT", Slicing::Whole).unwrap_err();
        assert_eq!(err.to_string(), "unknown sample `s1`");
    }
}
