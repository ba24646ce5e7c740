use crate::{
    db::{decode::IndexedEncoding, stats::StatisticKind},
    model::{
        field::{FieldReader, FieldWriter},
        index::{Index, IndexModel},
    },
    types::Identifier,
    value::PersistentDataset,
};

///
/// DataAdapter
///
/// Translates between one domain entry type and typed field values.
/// One adapter instance is registered per entry type; its identifier must be
/// stable for the lifetime of the store.
///

pub trait DataAdapter<T>: Send + Sync {
    fn adapter_id(&self) -> Identifier;

    fn data_id(&self, entry: &T) -> Identifier;

    /// Split an entry into fields known to `model` (common) and the rest
    /// (extended).
    fn encode(&self, entry: &T, model: &IndexModel) -> AdapterEncoding;

    /// Rebuild an entry from a decoded row; `None` if the row does not carry
    /// enough fields.
    fn decode(&self, encoding: &IndexedEncoding, index: &Index) -> Option<T>;

    /// Writer for an extended field; `None` if the adapter does not persist it.
    fn field_writer(&self, field: &Identifier) -> Option<&dyn FieldWriter>;

    fn field_reader(&self, field: &Identifier) -> Option<&dyn FieldReader>;

    /// Statistics maintained for this adapter's entries.
    fn statistic_kinds(&self) -> Vec<StatisticKind> {
        vec![StatisticKind::Count]
    }
}

///
/// AdapterEncoding
///
/// Intermediate result of applying an adapter to one entry against an index
/// model. Insertion keys are computed from the common data by the index
/// strategy.
///

#[derive(Clone, Debug)]
pub struct AdapterEncoding {
    pub adapter_id: Identifier,
    pub data_id: Identifier,
    pub common: PersistentDataset,
    pub extended: PersistentDataset,
    pub deduplication_enabled: bool,
}

impl AdapterEncoding {
    #[must_use]
    pub const fn new(
        adapter_id: Identifier,
        data_id: Identifier,
        common: PersistentDataset,
        extended: PersistentDataset,
    ) -> Self {
        Self {
            adapter_id,
            data_id,
            common,
            extended,
            deduplication_enabled: true,
        }
    }

    #[must_use]
    pub fn without_deduplication(mut self) -> Self {
        self.deduplication_enabled = false;
        self
    }

    #[must_use]
    pub fn insertion_keys(&self, index: &Index) -> Vec<Identifier> {
        index.strategy().insertion_keys(&self.common)
    }
}
