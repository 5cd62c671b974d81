//! The index of an alternate allele within its original ALT list.

/// The position of a record's ALT allele within the ALT list it was split
/// from.
///
/// Records that have never been through the multi-allele split are
/// [`AlleleIndex::Unsliced`]: any per-allele annotation value is taken whole.
/// Records produced by the split are [`AlleleIndex::SlicedAt`] with the 0-based
/// position of their allele, which is used to pick the matching element out of
/// comma-delimited annotation values.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum AlleleIndex {
    /// The record has not been split; annotation values are never sliced.
    #[default]
    Unsliced,

    /// The record holds the allele at this 0-based index of the original ALT
    /// list.
    SlicedAt(usize),
}

impl AlleleIndex {
    /// Gets the index of the allele, if the record has been split.
    ///
    /// # Examples
    ///
    /// ```
    /// use callset::record::AlleleIndex;
    ///
    /// assert_eq!(AlleleIndex::Unsliced.get(), None);
    /// assert_eq!(AlleleIndex::SlicedAt(1).get(), Some(1));
    /// ```
    pub fn get(&self) -> Option<usize> {
        match self {
            AlleleIndex::Unsliced => None,
            AlleleIndex::SlicedAt(index) => Some(*index),
        }
    }
}

impl From<i64> for AlleleIndex {
    /// Negative values mark a record that predates the allele split.
    fn from(value: i64) -> Self {
        match usize::try_from(value) {
            Ok(index) => AlleleIndex::SlicedAt(index),
            Err(_) => AlleleIndex::Unsliced,
        }
    }
}

impl std::fmt::Display for AlleleIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlleleIndex::Unsliced => write!(f, "-1"),
            AlleleIndex::SlicedAt(index) => write!(f, "{index}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_signed() {
        assert_eq!(AlleleIndex::from(-1), AlleleIndex::Unsliced);
        assert_eq!(AlleleIndex::from(0), AlleleIndex::SlicedAt(0));
        assert_eq!(AlleleIndex::from(3), AlleleIndex::SlicedAt(3));
    }

    #[test]
    fn display() {
        assert_eq!(AlleleIndex::Unsliced.to_string(), "-1");
        assert_eq!(AlleleIndex::SlicedAt(2).to_string(), "2");
    }
}
