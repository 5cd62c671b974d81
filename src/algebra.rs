//! Set operations between callsets.
//!
//! - [`concordance()`] compares two callsets by their `(chrom, pos, ref, alt)`
//!   tuples.
//! - [`subtract()`] removes from one callset every record whose composite key
//!   appears in another.
//! - [`intersect()`] keeps the records that fall within a [`region::Index`].
//!
//! Equality is always exact: equivalent representations of the same variant
//! (e.g., differently left-aligned indels) are not unified here. Normalize the
//! inputs beforehand (see [`crate::external::Normalizer`]) if that matters.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::collections::HashSet;
use std::str::FromStr;

use omics::coordinate::position::Number;
use tracing::info;

use crate::header;
use crate::record::join_format;
use crate::record::quality::MISSING;
use crate::region;
use crate::Record;

/// The delimiter between the parts of a composite key.
pub const KEY_DELIMITER: char = '|';

/// The columns used by [`subtract()`] when none are given.
pub static DEFAULT_KEYS: [Key; 4] = [Key::Chrom, Key::Pos, Key::Ref, Key::Alt];

////////////////////////////////////////////////////////////////////////////////////////
// Variant keys
////////////////////////////////////////////////////////////////////////////////////////

/// The identity of a variant for the purposes of concordance.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct VariantKey {
    /// The chromosome.
    chrom: String,

    /// The 1-based position.
    pos: Number,

    /// The reference allele.
    reference: String,

    /// The alternate allele.
    alternate: String,
}

impl VariantKey {
    /// Creates a variant key.
    pub fn new(
        chrom: impl Into<String>,
        pos: Number,
        reference: impl Into<String>,
        alternate: impl Into<String>,
    ) -> Self {
        Self {
            chrom: chrom.into(),
            pos,
            reference: reference.into(),
            alternate: alternate.into(),
        }
    }

    /// Gets the chromosome.
    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    /// Gets the 1-based position.
    pub fn pos(&self) -> Number {
        self.pos
    }

    /// Gets the reference allele.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Gets the alternate allele.
    pub fn alternate(&self) -> &str {
        &self.alternate
    }
}

impl From<&Record> for VariantKey {
    fn from(record: &Record) -> Self {
        Self::new(
            record.chrom(),
            record.pos(),
            record.reference(),
            record.alternate(),
        )
    }
}

impl std::fmt::Display for VariantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}",
            self.chrom, self.pos, self.reference, self.alternate
        )
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Concordance
////////////////////////////////////////////////////////////////////////////////////////

/// The partition of two callsets into the variants they share and the
/// variants unique to each.
///
/// The three sets are pairwise disjoint.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Concordance {
    /// Variants found only in the first callset.
    discordant_first: BTreeSet<VariantKey>,

    /// Variants found only in the second callset.
    discordant_second: BTreeSet<VariantKey>,

    /// Variants found in both callsets.
    concordant: BTreeSet<VariantKey>,
}

impl Concordance {
    /// Gets the variants found only in the first callset.
    pub fn discordant_first(&self) -> &BTreeSet<VariantKey> {
        &self.discordant_first
    }

    /// Gets the variants found only in the second callset.
    pub fn discordant_second(&self) -> &BTreeSet<VariantKey> {
        &self.discordant_second
    }

    /// Gets the variants found in both callsets.
    pub fn concordant(&self) -> &BTreeSet<VariantKey> {
        &self.concordant
    }
}

/// Computes the concordance of two callsets.
///
/// # Examples
///
/// ```
/// use callset::algebra;
/// use callset::algebra::VariantKey;
/// use callset::Record;
///
/// let a = vec![Record::new("1", 100, "A", "G"), Record::new("1", 200, "C", "T")];
/// let b = vec![Record::new("1", 100, "A", "G"), Record::new("1", 300, "G", "A")];
///
/// let concordance = algebra::concordance(&a, &b);
///
/// assert!(concordance.concordant().contains(&VariantKey::new("1", 100, "A", "G")));
/// assert!(concordance.discordant_first().contains(&VariantKey::new("1", 200, "C", "T")));
/// assert!(concordance.discordant_second().contains(&VariantKey::new("1", 300, "G", "A")));
/// ```
pub fn concordance(first: &[Record], second: &[Record]) -> Concordance {
    let first = first.iter().map(VariantKey::from).collect::<BTreeSet<_>>();
    let second = second.iter().map(VariantKey::from).collect::<BTreeSet<_>>();

    let concordance = Concordance {
        discordant_first: first.difference(&second).cloned().collect(),
        discordant_second: second.difference(&first).cloned().collect(),
        concordant: first.intersection(&second).cloned().collect(),
    };

    info!(
        "concordance: {} concordant, {} only in first, {} only in second",
        concordance.concordant.len(),
        concordance.discordant_first.len(),
        concordance.discordant_second.len()
    );

    concordance
}

////////////////////////////////////////////////////////////////////////////////////////
// Subtraction
////////////////////////////////////////////////////////////////////////////////////////

/// An error associated with parsing a [`Key`].
#[derive(Debug, Eq, PartialEq)]
pub enum ParseKeyError {
    /// The key was empty.
    Empty,
}

impl std::fmt::Display for ParseKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseKeyError::Empty => write!(f, "a key column name cannot be empty"),
        }
    }
}

impl std::error::Error for ParseKeyError {}

/// A column that participates in a composite key.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Key {
    /// The chromosome.
    Chrom,

    /// The position.
    Pos,

    /// The identifier.
    Id,

    /// The reference allele.
    Ref,

    /// The alternate allele.
    Alt,

    /// The raw quality.
    Qual,

    /// The filter status.
    Filter,

    /// The raw INFO block.
    Info,

    /// The FORMAT column.
    Format,

    /// The raw block of the named sample.
    Sample(String),
}

impl Key {
    /// Gets the value of this column for a record.
    fn value<'r>(&self, record: &'r Record) -> Cow<'r, str> {
        match self {
            Key::Chrom => Cow::Borrowed(record.chrom()),
            Key::Pos => Cow::Owned(record.pos().to_string()),
            Key::Id => Cow::Borrowed(record.id()),
            Key::Ref => Cow::Borrowed(record.reference()),
            Key::Alt => Cow::Borrowed(record.alternate()),
            Key::Qual => match record.quality() {
                Some(quality) => Cow::Owned(quality.to_string()),
                None => Cow::Borrowed(MISSING),
            },
            Key::Filter => Cow::Borrowed(record.filter()),
            Key::Info => Cow::Borrowed(record.info()),
            Key::Format => match record.format() {
                Some(format) => Cow::Owned(join_format(format)),
                None => Cow::Borrowed(MISSING),
            },
            Key::Sample(name) => Cow::Borrowed(record.sample(name).unwrap_or(MISSING)),
        }
    }
}

impl FromStr for Key {
    type Err = ParseKeyError;

    /// Parses a column name. Fixed column names are matched without regard to
    /// case or a leading `#`; any other name refers to a sample.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if s.is_empty() {
            return Err(ParseKeyError::Empty);
        }

        if s == header::ALT_STRING {
            return Ok(Key::Alt);
        }

        let key = match s.trim_start_matches(header::COLUMN_PREFIX).to_uppercase().as_str() {
            header::CHROM => Key::Chrom,
            header::POS => Key::Pos,
            header::ID => Key::Id,
            header::REF => Key::Ref,
            header::ALT => Key::Alt,
            header::QUAL => Key::Qual,
            header::FILTER => Key::Filter,
            header::INFO => Key::Info,
            header::FORMAT => Key::Format,
            _ => Key::Sample(s.to_string()),
        };

        Ok(key)
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Chrom => write!(f, "{}", header::CHROM),
            Key::Pos => write!(f, "{}", header::POS),
            Key::Id => write!(f, "{}", header::ID),
            Key::Ref => write!(f, "{}", header::REF),
            Key::Alt => write!(f, "{}", header::ALT),
            Key::Qual => write!(f, "{}", header::QUAL),
            Key::Filter => write!(f, "{}", header::FILTER),
            Key::Info => write!(f, "{}", header::INFO),
            Key::Format => write!(f, "{}", header::FORMAT),
            Key::Sample(name) => write!(f, "{name}"),
        }
    }
}

/// Builds the composite key of a record from the given columns.
///
/// # Examples
///
/// ```
/// use callset::algebra;
/// use callset::Record;
///
/// let record = Record::new("1", 100, "A", "G");
/// assert_eq!(algebra::composite_key(&record, &algebra::DEFAULT_KEYS), "1|100|A|G");
/// ```
pub fn composite_key(record: &Record, keys: &[Key]) -> String {
    keys.iter()
        .map(|key| key.value(record))
        .collect::<Vec<_>>()
        .join(&KEY_DELIMITER.to_string())
}

/// Returns the records of `first` whose composite key is absent from
/// `second`.
///
/// When `keys` is empty, [`DEFAULT_KEYS`] are used. Every record of `first`
/// is kept, duplicates included, unless its composite key occurs in `second`.
///
/// # Examples
///
/// ```
/// use callset::algebra;
/// use callset::algebra::Key;
/// use callset::Record;
///
/// let a = vec![
///     Record::new("1", 100, "A", "G").with_id("rs1"),
///     Record::new("1", 200, "C", "T"),
/// ];
/// let b = vec![Record::new("1", 100, "A", "G")];
///
/// let difference = algebra::subtract(&a, &b, &[]);
/// assert_eq!(difference.len(), 1);
/// assert_eq!(difference[0].pos(), 200);
///
/// let difference = algebra::subtract(&a, &b, &[Key::Chrom, Key::Pos, Key::Id]);
/// assert_eq!(difference.len(), 2);
/// ```
pub fn subtract(first: &[Record], second: &[Record], keys: &[Key]) -> Vec<Record> {
    let keys = match keys.is_empty() {
        true => &DEFAULT_KEYS[..],
        false => keys,
    };

    let excluded = second
        .iter()
        .map(|record| composite_key(record, keys))
        .collect::<HashSet<_>>();

    let results = first
        .iter()
        .filter(|record| !excluded.contains(&composite_key(record, keys)))
        .cloned()
        .collect::<Vec<_>>();

    info!(
        "subtracted {} of {} records",
        first.len() - results.len(),
        first.len()
    );

    results
}

////////////////////////////////////////////////////////////////////////////////////////
// Region filtering
////////////////////////////////////////////////////////////////////////////////////////

/// Returns, for each record, whether it falls within the regions.
///
/// See [`region::Index::contains()`] for the rules applied.
pub fn intersect_mask(records: &[Record], index: &region::Index) -> Vec<bool> {
    records
        .iter()
        .map(|record| index.contains_record(record))
        .collect()
}

/// Returns the records that fall within the regions, in their original order.
///
/// # Examples
///
/// ```
/// use callset::algebra;
/// use callset::region::index::Builder;
/// use callset::region::Interval;
/// use callset::Record;
///
/// let index = Builder::from_intervals([("chr1", Interval::new(10, 20))]);
/// let records = vec![
///     Record::new("1", 9, "A", "G"),
///     Record::new("1", 10, "A", "G"),
///     Record::new("1", 8, "ACG", "A"),
/// ];
///
/// let inside = algebra::intersect(&records, &index);
/// assert_eq!(inside.iter().map(|r| r.pos()).collect::<Vec<_>>(), vec![10, 8]);
/// ```
pub fn intersect(records: &[Record], index: &region::Index) -> Vec<Record> {
    let results = records
        .iter()
        .zip(intersect_mask(records, index))
        .filter(|(_, inside)| *inside)
        .map(|(record, _)| record.clone())
        .collect::<Vec<_>>();

    info!(
        "{} of {} records fall within the regions",
        results.len(),
        records.len()
    );

    results
}
