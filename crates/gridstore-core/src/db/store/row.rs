use crate::{
    db::{
        entry::EntryInfo,
        row_id::{RawRowId, RowId, identity_of},
    },
    types::ScanBounds,
    visibility::{Authorizations, is_authorized},
};
use std::{
    collections::{BTreeMap, btree_map},
    ops::Bound,
    sync::Arc,
};

///
/// RowKey
///
/// Ordering key of a stored row: the insertion key, then the row-id bytes
/// without the duplicate count. Ordering on the bare insertion key first
/// keeps every row of one key together, whatever the key's length.
///

#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub(crate) struct RowKey {
    insertion_key: Vec<u8>,
    identity: Vec<u8>,
}

impl RowKey {
    pub(crate) fn new(row_id: &RowId, raw: &[u8]) -> Self {
        Self {
            insertion_key: row_id.insertion_key().to_vec(),
            identity: identity_of(raw).to_vec(),
        }
    }

    /// Key of an encoded row id; `None` if the bytes do not decode.
    pub(crate) fn decode(raw: &[u8]) -> Option<Self> {
        let row_id = RowId::try_from_raw(raw).ok()?;

        Some(Self::new(&row_id, raw))
    }

    // Sorts before every row stored under `insertion_key`.
    fn floor(insertion_key: &[u8]) -> Self {
        Self {
            insertion_key: insertion_key.to_vec(),
            identity: Vec::new(),
        }
    }
}

///
/// StoredRow
///
/// One physical row. Rows written for the same entry share the entry and
/// its `EntryInfo`.
///

pub(crate) struct StoredRow<T> {
    pub(crate) raw: RawRowId,
    pub(crate) row_id: RowId,
    pub(crate) info: Arc<EntryInfo>,
    pub(crate) entry: Arc<T>,
}

impl<T> StoredRow<T> {
    /// A row is visible only if every one of its fields is.
    pub(crate) fn is_visible_to(&self, authorizations: &Authorizations) -> bool {
        self.info
            .visibilities()
            .all(|visibility| is_authorized(visibility, authorizations))
    }

    pub(crate) fn key(&self) -> RowKey {
        RowKey::new(&self.row_id, self.raw.as_bytes())
    }

    pub(crate) fn belongs_to(&self, data_id: &[u8], adapter_id: &[u8]) -> bool {
        self.row_id.data_id().as_bytes() == data_id
            && self.row_id.adapter_id().as_bytes() == adapter_id
    }
}

///
/// RowSet
///
/// Ordered rows of one index.
///

pub(crate) struct RowSet<T> {
    rows: BTreeMap<RowKey, StoredRow<T>>,
}

impl<T> RowSet<T> {
    pub(crate) const fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    /// Insert `row`, returning the row it displaced, if any.
    pub(crate) fn insert(&mut self, row: StoredRow<T>) -> Option<StoredRow<T>> {
        self.rows.insert(row.key(), row)
    }

    pub(crate) fn get(&self, key: &RowKey) -> Option<&StoredRow<T>> {
        self.rows.get(key)
    }

    pub(crate) fn remove(&mut self, key: &RowKey) -> Option<StoredRow<T>> {
        self.rows.remove(key)
    }

    pub(crate) fn iter(&self) -> btree_map::Values<'_, RowKey, StoredRow<T>> {
        self.rows.values()
    }

    /// Rows whose insertion key lies inside `bounds`.
    pub(crate) fn range(&self, bounds: &ScanBounds) -> btree_map::Range<'_, RowKey, StoredRow<T>> {
        let lower = RowKey::floor(&bounds.lower);
        // BTreeMap::range panics on inverted bounds.
        let upper = match &bounds.upper {
            Some(upper) if *upper > bounds.lower => Bound::Excluded(RowKey::floor(upper)),
            Some(_) => Bound::Excluded(lower.clone()),
            None => Bound::Unbounded,
        };

        self.rows.range((Bound::Included(lower), upper))
    }
}
