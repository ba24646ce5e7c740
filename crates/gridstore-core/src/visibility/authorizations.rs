use std::collections::BTreeSet;

///
/// Authorizations
///
/// The label set a caller holds. Labels are opaque bytes; membership is
/// exact byte equality.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Authorizations {
    labels: BTreeSet<Vec<u8>>,
}

impl Authorizations {
    /// No labels: only unrestricted rows are visible.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            labels: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn contains(&self, label: &[u8]) -> bool {
        self.labels.contains(label)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.labels.iter().map(Vec::as_slice)
    }
}

impl<S: AsRef<[u8]>> FromIterator<S> for Authorizations {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().map(|s| s.as_ref().to_vec()).collect(),
        }
    }
}

impl<S: AsRef<[u8]>> From<&[S]> for Authorizations {
    fn from(labels: &[S]) -> Self {
        labels.iter().collect()
    }
}
