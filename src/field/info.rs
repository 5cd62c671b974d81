//! Lookup of values within the INFO column.

use std::collections::HashMap;
use std::time::Instant;

use tracing::debug;

use crate::field;
use crate::field::Column;
use crate::field::Error;
use crate::field::OnMissing;
use crate::field::Result;
use crate::field::Slicing;
use crate::Record;

/// The delimiter between INFO entries.
pub const ENTRY_DELIMITER: char = ';';

/// The separator between an INFO key and its value.
pub const KEY_VALUE_SEPARATOR: char = '=';

/// Builds the key to value lookup for an INFO block.
///
/// Entries are split on the first `=`. Flags (entries without a value) are
/// skipped and a repeated key keeps its last value.
///
/// # Examples
///
/// ```
/// use callset::field::info;
///
/// let entries = info::entries("AD=3,7;DP=10;SOMATIC;EQ=a=b");
///
/// assert_eq!(entries.get("AD"), Some(&"3,7"));
/// assert_eq!(entries.get("DP"), Some(&"10"));
/// assert_eq!(entries.get("EQ"), Some(&"a=b"));
/// assert_eq!(entries.get("SOMATIC"), None);
/// ```
pub fn entries(info: &str) -> HashMap<&str, &str> {
    info.split(ENTRY_DELIMITER)
        .filter_map(|entry| entry.split_once(KEY_VALUE_SEPARATOR))
        .collect()
}

/// Gets the value of an INFO key for a single record.
///
/// # Examples
///
/// ```
/// use callset::field::info;
/// use callset::field::Slicing;
/// use callset::record::AlleleIndex;
/// use callset::Record;
///
/// let record = Record::new("1", 100, "A", "T")
///     .with_info("AD=3,7;DP=10")
///     .with_allele_index(AlleleIndex::SlicedAt(1));
///
/// assert_eq!(info::get(&record, "AD", Slicing::ByAllele)?, "7");
/// assert_eq!(info::get(&record, "AD", Slicing::Whole)?, "3,7");
/// assert!(info::get(&record, "XYZ", Slicing::ByAllele).is_err());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn get<'r>(record: &'r Record, key: &str, slicing: Slicing) -> Result<&'r str> {
    let entries = entries(record.info());
    lookup(record, &entries, key, slicing)
}

/// Looks up a key within the prebuilt entries of a record.
fn lookup<'r>(
    record: &'r Record,
    entries: &HashMap<&'r str, &'r str>,
    key: &str,
    slicing: Slicing,
) -> Result<&'r str> {
    let value = entries.get(key).copied().ok_or_else(|| Error::MissingKey {
        key: key.to_string(),
        row: record.to_string(),
    })?;

    field::slice(record, key, value, slicing)
}

/// Parses the values of several INFO keys across a batch of records.
///
/// One [`Column`] is returned per key, in the order of `keys`, with one entry
/// per record. With [`OnMissing::Fail`], the first missing key aborts the
/// whole batch.
///
/// # Examples
///
/// ```
/// use callset::field::info;
/// use callset::field::OnMissing;
/// use callset::field::Slicing;
/// use callset::Record;
///
/// let records = vec![
///     Record::new("1", 100, "A", "T").with_info("DP=10"),
///     Record::new("1", 200, "C", "G").with_info("DP=4;SOMATIC"),
/// ];
///
/// let columns = info::parse(&records, &["DP"], Slicing::Whole, OnMissing::Fail)?;
/// assert_eq!(
///     columns,
///     vec![vec![Some(String::from("10")), Some(String::from("4"))]]
/// );
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse(
    records: &[Record],
    keys: &[&str],
    slicing: Slicing,
    on_missing: OnMissing,
) -> Result<Vec<Column>> {
    let start = Instant::now();

    let columns = field::collect(records, keys, on_missing, |record, keys| {
        let entries = entries(record.info());
        keys.iter()
            .map(|key| lookup(record, &entries, key, slicing))
            .collect()
    })?;

    debug!(
        "parsed INFO field for keys {:?} in {:.3} seconds",
        keys,
        start.elapsed().as_secs_f64()
    );

    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AlleleIndex;

    #[test]
    fn slices_per_allele_values() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let records = vec![
            Record::new("1", 100, "A", "G")
                .with_info("AD=3,7;DP=10")
                .with_allele_index(AlleleIndex::SlicedAt(1)),
            Record::new("1", 100, "A", "C")
                .with_info("AD=3,7;DP=10")
                .with_allele_index(AlleleIndex::SlicedAt(0)),
        ];

        let columns = parse(&records, &["AD", "DP"], Slicing::ByAllele, OnMissing::Fail)?;

        assert_eq!(
            columns[0],
            vec![Some(String::from("7")), Some(String::from("3"))]
        );
        assert_eq!(
            columns[1],
            vec![Some(String::from("10")), Some(String::from("10"))]
        );

        Ok(())
    }

    #[test]
    fn coerces_missing_keys() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let records = vec![Record::new("1", 100, "A", "G")
            .with_info("AD=3,7;DP=10")
            .with_allele_index(AlleleIndex::SlicedAt(1))];

        let columns = parse(&records, &["XYZ"], Slicing::ByAllele, OnMissing::Coerce)?;
        assert_eq!(columns, vec![vec![None]]);

        Ok(())
    }

    #[test]
    fn missing_key_aborts_batch() {
        let records = vec![
            Record::new("1", 100, "A", "G").with_info("DP=10"),
            Record::new("1", 200, "C", "T").with_info("AF=0.5"),
        ];

        let err = parse(&records, &["DP"], Slicing::Whole, OnMissing::Fail).unwrap_err();

        assert!(matches!(&err, Error::MissingKey { key, .. } if key == "DP"));
        assert_eq!(
            err.to_string(),
            "DP does not exist in row 1\t200\t.\tC\tT\t.\t.\tAF=0.5; coerce missing values if you \
             want to fill them instead"
        );
    }

    #[test]
    fn flags_are_not_values() {
        let record = Record::new("1", 100, "A", "G").with_info("SOMATIC;DP=1");
        assert!(get(&record, "SOMATIC", Slicing::Whole).is_err());
    }
}
