use crate::{
    model::field::{FieldReader, FieldWriter},
    types::{ByteRange, Identifier, MultiDimensionalNumericData},
    value::PersistentDataset,
};
use std::{fmt, sync::Arc};

///
/// IndexStrategy
///
/// Maps indexed field values to zero or more insertion keys, and query
/// constraints to insertion-key ranges. Supplied by the host; the core never
/// interprets the keys beyond byte ordering.
///

pub trait IndexStrategy: Send + Sync {
    fn id(&self) -> Identifier;

    fn insertion_keys(&self, common: &PersistentDataset) -> Vec<Identifier>;

    fn query_ranges(
        &self,
        constraints: &MultiDimensionalNumericData,
        max_ranges: Option<usize>,
    ) -> Vec<ByteRange>;
}

///
/// IndexField
///
/// One field participating in an index, with the codec used for it.
///

#[derive(Clone)]
pub struct IndexField {
    pub id: Identifier,
    writer: Arc<dyn FieldWriter>,
    reader: Arc<dyn FieldReader>,
}

impl IndexField {
    #[must_use]
    pub fn new(
        id: impl Into<Identifier>,
        writer: Arc<dyn FieldWriter>,
        reader: Arc<dyn FieldReader>,
    ) -> Self {
        Self {
            id: id.into(),
            writer,
            reader,
        }
    }

    /// Field whose single codec both writes and reads.
    #[must_use]
    pub fn with_codec<C>(id: impl Into<Identifier>, codec: C) -> Self
    where
        C: FieldWriter + FieldReader + 'static,
    {
        let codec = Arc::new(codec);

        Self::new(id, codec.clone(), codec)
    }
}

impl fmt::Debug for IndexField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexField").field("id", &self.id).finish()
    }
}

///
/// IndexModel
///
/// Ordered list of the fields that participate in an index.
///

#[derive(Clone, Debug)]
pub struct IndexModel {
    pub id: Identifier,
    fields: Vec<IndexField>,
}

impl IndexModel {
    #[must_use]
    pub fn new(id: impl Into<Identifier>, fields: Vec<IndexField>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    #[must_use]
    pub fn fields(&self) -> &[IndexField] {
        &self.fields
    }

    #[must_use]
    pub fn contains(&self, field: &Identifier) -> bool {
        self.field(field).is_some()
    }

    #[must_use]
    pub fn field_writer(&self, field: &Identifier) -> Option<&dyn FieldWriter> {
        self.field(field).map(|f| f.writer.as_ref())
    }

    #[must_use]
    pub fn field_reader(&self, field: &Identifier) -> Option<&dyn FieldReader> {
        self.field(field).map(|f| f.reader.as_ref())
    }

    fn field(&self, field: &Identifier) -> Option<&IndexField> {
        self.fields.iter().find(|f| &f.id == field)
    }
}

///
/// Index
///
/// An index strategy paired with its model. Cheap to clone; the identifier
/// is derived from the strategy and model identifiers.
///

#[derive(Clone)]
pub struct Index {
    id: Identifier,
    strategy: Arc<dyn IndexStrategy>,
    model: Arc<IndexModel>,
}

impl Index {
    #[must_use]
    pub fn new(strategy: Arc<dyn IndexStrategy>, model: IndexModel) -> Self {
        let mut id = strategy.id().into_bytes();
        id.push(b'_');
        id.extend_from_slice(model.id.as_bytes());

        Self {
            id: Identifier::new(id),
            strategy,
            model: Arc::new(model),
        }
    }

    #[must_use]
    pub const fn id(&self) -> &Identifier {
        &self.id
    }

    #[must_use]
    pub fn strategy(&self) -> &dyn IndexStrategy {
        self.strategy.as_ref()
    }

    #[must_use]
    pub fn model(&self) -> &IndexModel {
        &self.model
    }
}

impl fmt::Debug for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index")
            .field("id", &self.id)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}
