//! Shared test components: a one-dimensional integer index strategy, two
//! adapters over it, and a range query.

use crate::{
    db::{
        decode::IndexedEncoding,
        filter::QueryFilter,
        query::Query,
        stats::StatisticKind,
    },
    model::{
        AdapterEncoding, DataAdapter, FieldReader, FieldWriter, Index, IndexField, IndexModel,
        IndexStrategy, ValueCodec,
    },
    types::{ByteRange, Identifier, MultiDimensionalNumericData, NumericRange},
    value::{PersistentDataset, PersistentValue, Value},
};
use std::sync::Arc;

/// The single indexed dimension.
pub(crate) const DIM: &str = "dim1";

/// Widest span the integer strategy will index.
pub(crate) const MAX_SPAN: i64 = 64;

/// Order-preserving key for one integer cell.
pub(crate) fn int_key(value: i32) -> Identifier {
    #[allow(clippy::cast_sign_loss)]
    let flipped = (value as u32) ^ 0x8000_0000;

    Identifier::from(flipped.to_be_bytes().to_vec())
}

#[allow(clippy::cast_possible_truncation)]
fn cell(value: f64) -> i32 {
    value as i32
}

///
/// IntStrategy
///
/// One insertion key per integer cell covered by the `DIM` value. Spans
/// wider than `MAX_SPAN` cells are not indexable.
///

pub(crate) struct IntStrategy;

impl IndexStrategy for IntStrategy {
    fn id(&self) -> Identifier {
        Identifier::from("int-strategy")
    }

    fn insertion_keys(&self, common: &PersistentDataset) -> Vec<Identifier> {
        let Some(range) = common
            .get(&Identifier::from(DIM))
            .and_then(Value::as_numeric_range)
        else {
            return Vec::new();
        };
        let (lo, hi) = (cell(range.min.floor()), cell(range.max.floor()));
        if i64::from(hi) - i64::from(lo) > MAX_SPAN {
            return Vec::new();
        }

        (lo..=hi).map(int_key).collect()
    }

    fn query_ranges(
        &self,
        constraints: &MultiDimensionalNumericData,
        _max_ranges: Option<usize>,
    ) -> Vec<ByteRange> {
        constraints
            .dimensions()
            .first()
            .map(|range| {
                ByteRange::new(
                    int_key(cell(range.min.floor())).into_bytes(),
                    int_key(cell(range.max.ceil())).into_bytes(),
                )
            })
            .into_iter()
            .collect()
    }
}

pub(crate) fn int_strategy() -> Arc<dyn IndexStrategy> {
    Arc::new(IntStrategy)
}

/// `IntStrategy` over model "test-model" with a plain codec on `DIM`.
pub(crate) fn test_index() -> Index {
    Index::new(
        int_strategy(),
        IndexModel::new(
            "test-model",
            vec![IndexField::with_codec(DIM, ValueCodec::new())],
        ),
    )
}

///
/// IntAdapter
///
/// Adapter for plain integers. Writes `DIM` as the common field plus an
/// extended "label" and a null "note".
///

#[derive(Clone, Debug)]
pub(crate) struct IntAdapter {
    codec: ValueCodec,
    deduplicate: bool,
    unwritable_field: bool,
}

impl IntAdapter {
    pub(crate) fn new() -> Self {
        Self {
            codec: ValueCodec::new(),
            deduplicate: true,
            unwritable_field: false,
        }
    }

    pub(crate) fn without_deduplication(mut self) -> Self {
        self.deduplicate = false;
        self
    }

    /// Adds an extended "scratch" field that has no writer.
    pub(crate) fn with_unwritable_field(mut self) -> Self {
        self.unwritable_field = true;
        self
    }

    fn has_codec(field: &Identifier) -> bool {
        field.as_bytes() == b"label" || field.as_bytes() == b"note"
    }
}

impl DataAdapter<i32> for IntAdapter {
    fn adapter_id(&self) -> Identifier {
        Identifier::from("int-adapter")
    }

    fn data_id(&self, entry: &i32) -> Identifier {
        Identifier::from(entry.to_string())
    }

    fn encode(&self, entry: &i32, model: &IndexModel) -> AdapterEncoding {
        let mut common = PersistentDataset::new();
        if model.contains(&Identifier::from(DIM)) {
            common.add(PersistentValue::new(DIM, *entry));
        }

        let mut extended = PersistentDataset::new();
        extended.add(PersistentValue::new("label", format!("n{entry}")));
        extended.add(PersistentValue::new("note", Value::Null));
        if self.unwritable_field {
            extended.add(PersistentValue::new("scratch", *entry));
        }

        let encoding =
            AdapterEncoding::new(self.adapter_id(), self.data_id(entry), common, extended);
        if self.deduplicate {
            encoding
        } else {
            encoding.without_deduplication()
        }
    }

    fn decode(&self, encoding: &IndexedEncoding, _index: &Index) -> Option<i32> {
        match encoding.common.get(&Identifier::from(DIM))? {
            Value::Int(v) => i32::try_from(*v).ok(),
            _ => None,
        }
    }

    fn field_writer(&self, field: &Identifier) -> Option<&dyn FieldWriter> {
        Self::has_codec(field).then_some(&self.codec as &dyn FieldWriter)
    }

    fn field_reader(&self, field: &Identifier) -> Option<&dyn FieldReader> {
        Self::has_codec(field).then_some(&self.codec as &dyn FieldReader)
    }

    fn statistic_kinds(&self) -> Vec<StatisticKind> {
        vec![
            StatisticKind::Count,
            StatisticKind::NumericRange {
                field: Identifier::from(DIM),
            },
        ]
    }
}

///
/// SpanAdapter
///
/// Adapter for inclusive integer spans; one row per covered cell.
///

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SpanAdapter;

impl DataAdapter<(i32, i32)> for SpanAdapter {
    fn adapter_id(&self) -> Identifier {
        Identifier::from("span-adapter")
    }

    fn data_id(&self, entry: &(i32, i32)) -> Identifier {
        Identifier::from(format!("{}..{}", entry.0, entry.1))
    }

    fn encode(&self, entry: &(i32, i32), _model: &IndexModel) -> AdapterEncoding {
        let mut common = PersistentDataset::new();
        common.add(PersistentValue::new(
            DIM,
            NumericRange::new(f64::from(entry.0), f64::from(entry.1)),
        ));

        AdapterEncoding::new(
            self.adapter_id(),
            self.data_id(entry),
            common,
            PersistentDataset::new(),
        )
    }

    fn decode(&self, encoding: &IndexedEncoding, _index: &Index) -> Option<(i32, i32)> {
        let range = encoding
            .common
            .get(&Identifier::from(DIM))?
            .as_numeric_range()?;

        Some((cell(range.min), cell(range.max)))
    }

    fn field_writer(&self, _field: &Identifier) -> Option<&dyn FieldWriter> {
        None
    }

    fn field_reader(&self, _field: &Identifier) -> Option<&dyn FieldReader> {
        None
    }
}

///
/// RangeQuery
///
/// Entries whose `DIM` extent intersects the half-open range `[min, max)`.
/// Supported only on indices built on model "test-model".
///

#[derive(Clone, Copy, Debug)]
pub(crate) struct RangeQuery {
    pub(crate) min: f64,
    pub(crate) max: f64,
}

impl RangeQuery {
    pub(crate) const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl Query for RangeQuery {
    fn is_supported(&self, index: &Index) -> bool {
        index.model().id.as_bytes() == b"test-model"
    }

    fn create_filters(&self, _model: &IndexModel) -> Vec<Box<dyn QueryFilter>> {
        vec![Box::new(*self)]
    }

    fn index_constraints(
        &self,
        _strategy: &dyn IndexStrategy,
    ) -> Option<MultiDimensionalNumericData> {
        Some(MultiDimensionalNumericData::new(vec![NumericRange::new(
            self.min, self.max,
        )]))
    }
}

impl QueryFilter for RangeQuery {
    fn accept(&self, encoding: &IndexedEncoding) -> bool {
        encoding
            .common
            .get(&Identifier::from(DIM))
            .and_then(Value::as_numeric_range)
            .is_some_and(|range| !(self.max <= range.min || self.min > range.max))
    }
}
