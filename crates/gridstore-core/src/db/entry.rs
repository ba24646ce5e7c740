use crate::{
    db::row_id::{RawRowId, RowId},
    types::Identifier,
    value::{PersistentValue, Value},
};

///
/// FieldInfo
///
/// One persisted field of an entry: the typed value, the bytes its codec
/// wrote, and the merged visibility formula (empty = unrestricted).
///

#[derive(Clone, Debug, PartialEq)]
pub struct FieldInfo {
    pub value: PersistentValue,
    pub written: Vec<u8>,
    pub visibility: Vec<u8>,
}

impl FieldInfo {
    #[must_use]
    pub const fn new(value: PersistentValue, written: Vec<u8>, visibility: Vec<u8>) -> Self {
        Self {
            value,
            written,
            visibility,
        }
    }

    #[must_use]
    pub const fn field(&self) -> &Identifier {
        &self.value.id
    }
}

///
/// EntryInfo
///
/// Result of encoding one entry against one index. Every row written for
/// the entry shares this value; only the row ids differ.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryInfo {
    row_ids: Vec<RawRowId>,
    decoded: Vec<RowId>,
    fields: Vec<FieldInfo>,
}

impl EntryInfo {
    /// `rows` pairs each row id with its encoding.
    #[must_use]
    pub fn new(rows: Vec<(RowId, RawRowId)>, fields: Vec<FieldInfo>) -> Self {
        let (decoded, row_ids) = rows.into_iter().unzip();

        Self {
            row_ids,
            decoded,
            fields,
        }
    }

    /// Unindexable entry: no rows, no fields.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            row_ids: Vec::new(),
            decoded: Vec::new(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn row_ids(&self) -> &[RawRowId] {
        &self.row_ids
    }

    /// Row ids alongside their encodings.
    pub fn rows(&self) -> impl Iterator<Item = (&RowId, &RawRowId)> {
        self.decoded.iter().zip(&self.row_ids)
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_ids.is_empty()
    }

    #[must_use]
    pub fn value(&self, field: &Identifier) -> Option<&Value> {
        self.fields
            .iter()
            .find(|f| f.field() == field)
            .map(|f| &f.value.value)
    }

    /// Visibility formulas of every field, in field order.
    pub fn visibilities(&self) -> impl Iterator<Item = &[u8]> {
        self.fields.iter().map(|f| f.visibility.as_slice())
    }
}
