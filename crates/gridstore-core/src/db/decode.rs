use crate::{
    db::{entry::FieldInfo, row_id::RowId},
    model::IndexModel,
    types::Identifier,
    value::PersistentDataset,
};

///
/// IndexedEncoding
///
/// A stored row re-partitioned into common (known to the index model) and
/// extended fields. This is what query filters and adapter decode see.
///

#[derive(Clone, Debug, PartialEq)]
pub struct IndexedEncoding {
    pub adapter_id: Identifier,
    pub data_id: Identifier,
    pub insertion_key: Identifier,
    pub duplicate_count: i32,
    pub common: PersistentDataset,
    pub extended: PersistentDataset,
}

impl IndexedEncoding {
    /// Partition `fields` by whether `model` has a reader for them. Pure in
    /// `(model, row)`; the row's field values are used as stored.
    #[must_use]
    pub fn decode(model: &IndexModel, row_id: &RowId, fields: &[FieldInfo]) -> Self {
        let mut common = PersistentDataset::new();
        let mut extended = PersistentDataset::new();

        for info in fields {
            if model.field_reader(info.field()).is_some() {
                common.add(info.value.clone());
            } else {
                extended.add(info.value.clone());
            }
        }

        Self {
            adapter_id: row_id.adapter_id().clone(),
            data_id: row_id.data_id().clone(),
            insertion_key: row_id.insertion_key().clone(),
            duplicate_count: row_id.duplicate_count(),
            common,
            extended,
        }
    }
}
