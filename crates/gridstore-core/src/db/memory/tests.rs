use super::*;
use crate::{
    db::{
        filter::DedupeFilter,
        query::EverythingQuery,
        stats::{Statistic, StatisticKind, StatisticsError},
    },
    model::{IndexField, IndexModel, IndexStrategy, ValueCodec},
    obs::CountingSink,
    test_fixtures::{DIM, IntAdapter, RangeQuery, SpanAdapter, int_key, int_strategy, test_index},
    types::{ByteRange, MultiDimensionalNumericData, NumericRange},
    value::{PersistentDataset, Value},
    visibility::FieldVisibilityHandler,
};

fn int_adapter() -> Arc<dyn DataAdapter<i32>> {
    Arc::new(IntAdapter::new())
}

fn adapter_id() -> Identifier {
    IntAdapter::new().adapter_id()
}

fn other_index() -> Index {
    Index::new(
        int_strategy(),
        IndexModel::new(
            "other-model",
            vec![IndexField::with_codec(DIM, ValueCodec::new())],
        ),
    )
}

fn counted_store<T>() -> (MemoryDataStore<T>, Arc<CountingSink>) {
    let sink = Arc::new(CountingSink::new());
    let store = MemoryDataStore::new().with_sink(sink.clone());

    (store, sink)
}

fn auths(labels: &[&str]) -> Authorizations {
    labels.iter().collect()
}

fn range_query<T: Clone>(store: &MemoryDataStore<T>, min: f64, max: f64) -> Vec<T> {
    store
        .query(&RangeQuery::new(min, max), QueryOptions::new())
        .collect()
}

fn everything<T: Clone>(store: &MemoryDataStore<T>, options: QueryOptions) -> Vec<T> {
    store.query(&EverythingQuery, options).collect()
}

fn count<T>(store: &MemoryDataStore<T>, adapter_id: &Identifier) -> i64 {
    match store.statistics().get(adapter_id, &StatisticKind::Count) {
        Some(Statistic::Count(stat)) => stat.count,
        _ => 0,
    }
}

fn dim_range(store: &MemoryDataStore<i32>) -> Option<NumericRange> {
    let kind = StatisticKind::NumericRange {
        field: Identifier::from(DIM),
    };
    match store.statistics().get(&adapter_id(), &kind) {
        Some(Statistic::NumericRange(stat)) => stat.range(),
        _ => None,
    }
}

///
/// ByField
/// "label" is gated by `x`, every other field by `y`.
///

struct ByField;

impl FieldVisibilityHandler<i32> for ByField {
    fn visibility(&self, _entry: &i32, field: &Identifier, _value: &Value) -> Vec<u8> {
        if field.as_bytes() == b"label" {
            b"x".to_vec()
        } else {
            b"y".to_vec()
        }
    }
}

///
/// ByteKeyStrategy
/// Variable-length keys: 1 -> [1], 2 -> [1, 2], 3 -> [1, 3], else [2].
/// Every query scans the key range `[1] ..= [1, 2]`.
///

struct ByteKeyStrategy;

impl IndexStrategy for ByteKeyStrategy {
    fn id(&self) -> Identifier {
        Identifier::from("byte-keys")
    }

    fn insertion_keys(&self, common: &PersistentDataset) -> Vec<Identifier> {
        let key: Vec<u8> = match common.get(&Identifier::from(DIM)) {
            Some(Value::Int(1)) => vec![1],
            Some(Value::Int(2)) => vec![1, 2],
            Some(Value::Int(3)) => vec![1, 3],
            Some(_) => vec![2],
            None => return Vec::new(),
        };

        vec![Identifier::from(key)]
    }

    fn query_ranges(
        &self,
        _constraints: &MultiDimensionalNumericData,
        _max_ranges: Option<usize>,
    ) -> Vec<ByteRange> {
        vec![ByteRange::new(vec![1_u8], vec![1_u8, 2])]
    }
}

fn byte_key_index() -> Index {
    Index::new(
        Arc::new(ByteKeyStrategy),
        IndexModel::new(
            "test-model",
            vec![IndexField::with_codec(DIM, ValueCodec::new())],
        ),
    )
}

///
/// RefusingStore
/// A statistics backend that is permanently offline.
///

struct RefusingStore;

impl StatisticsStore for RefusingStore {
    fn apply_delta(
        &mut self,
        _adapter_id: &Identifier,
        _kind: &StatisticKind,
        _delta: &Statistic,
    ) -> Result<(), StatisticsError> {
        Err(StatisticsError::Unavailable("offline".into()))
    }

    fn get(&self, _adapter_id: &Identifier, _kind: &StatisticKind) -> Option<&Statistic> {
        None
    }

    fn all(&self) -> Vec<(&Identifier, &Statistic)> {
        Vec::new()
    }
}

#[test]
fn ingest_query_delete_round() {
    let mut store = MemoryDataStore::new();
    let index = test_index();

    let mut ingested = Vec::new();
    store.ingest_with(
        int_adapter(),
        &index,
        [25],
        &mut |_: &EntryInfo, entry: &i32| ingested.push(*entry),
        &UniformVisibilityWriter::unconstrained(),
    );
    assert_eq!(ingested, vec![25]);

    store.ingest(int_adapter(), &index, [35]);

    assert_eq!(range_query(&store, 23.0, 26.0), vec![25]);
    assert_eq!(range_query(&store, 23.0, 36.0), vec![25, 35]);
    assert_eq!(count(&store, &adapter_id()), 2);
    assert_eq!(dim_range(&store), Some(NumericRange::new(25.0, 35.0)));

    let deleted = store.delete(&RangeQuery::new(23.0, 26.0), QueryOptions::new());
    assert_eq!(deleted, 1);

    assert_eq!(range_query(&store, 23.0, 36.0), vec![35]);
    assert!(range_query(&store, 23.0, 26.0).is_empty());
    assert_eq!(count(&store, &adapter_id()), 1);
    assert_eq!(dim_range(&store), Some(NumericRange::new(35.0, 35.0)));

    let found = store.get_entry(
        index.id(),
        &Identifier::from("35"),
        &adapter_id(),
        &Authorizations::empty(),
    );
    assert_eq!(found, Some(35));
}

#[test]
fn ingest_returns_row_ids_usable_for_lookup() {
    let mut store = MemoryDataStore::new();
    let index = test_index();

    let rows = store.ingest(int_adapter(), &index, [25, 35]);
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0].decode().expect("row id should decode").insertion_key(),
        &int_key(25)
    );

    let empty = Authorizations::empty();
    assert_eq!(store.get_entry_by_row_id(index.id(), rows[1].as_bytes(), &empty), Some(35));

    // Same identity, different duplicate count.
    let mut tampered = rows[0].as_bytes().to_vec();
    if let Some(last) = tampered.last_mut() {
        *last ^= 0x01;
    }
    assert_eq!(store.get_entry_by_row_id(index.id(), &tampered, &empty), None);
    let missing = Identifier::from("nope");
    assert_eq!(store.get_entry_by_row_id(&missing, rows[0].as_bytes(), &empty), None);
}

#[test]
fn unsupported_query_yields_nothing() {
    let mut store = MemoryDataStore::new();
    let other = other_index();
    store.ingest(int_adapter(), &other, [25]);

    let options = QueryOptions::new().index(other.id().clone());
    let results: Vec<i32> = store
        .query(&RangeQuery::new(0.0, 100.0), options)
        .collect();
    assert!(results.is_empty());

    assert_eq!(everything(&store, QueryOptions::new().index(other.id().clone())), vec![25]);
}

#[test]
fn unknown_index_yields_nothing() {
    let mut store = MemoryDataStore::new();
    store.ingest(int_adapter(), &test_index(), [25]);

    assert!(everything(&store, QueryOptions::new().index("missing")).is_empty());
}

#[test]
fn query_without_index_fans_out_in_index_order() {
    let mut store = MemoryDataStore::new();
    let index = test_index();
    let other = other_index();
    store.ingest(int_adapter(), &index, [25]);
    store.ingest(int_adapter(), &other, [7]);

    // "int-strategy_other-model" sorts before "int-strategy_test-model".
    assert_eq!(everything(&store, QueryOptions::new()), vec![7, 25]);
    assert_eq!(everything(&store, QueryOptions::new().index(index.id().clone())), vec![25]);
    assert_eq!(store.index_store().len(), 2);
    assert_eq!(store.adapter_store().len(), 1);
}

#[test]
fn limit_bounds_yielded_results() {
    let mut store = MemoryDataStore::new();
    store.ingest(int_adapter(), &test_index(), 1..=5);

    let limited: Vec<i32> = store
        .query(&RangeQuery::new(3.0, 100.0), QueryOptions::new().limit(2))
        .collect();
    assert_eq!(limited, vec![3, 4]);

    let unlimited: Vec<i32> = store
        .query(&RangeQuery::new(3.0, 100.0), QueryOptions::new().limit(0))
        .collect();
    assert_eq!(unlimited, vec![3, 4, 5]);
}

#[test]
fn default_limit_applies_when_query_sets_none() {
    let config = StoreConfig {
        default_limit: Some(1),
        ..StoreConfig::default()
    };
    let mut store = MemoryDataStore::with_config(config);
    store.ingest(int_adapter(), &test_index(), [1, 2, 3]);

    assert_eq!(everything(&store, QueryOptions::new()), vec![1]);
    assert_eq!(everything(&store, QueryOptions::new().limit(2)), vec![1, 2]);
}

#[test]
fn row_is_visible_only_when_every_field_is() {
    let (mut store, sink) = counted_store();
    let index = test_index();
    store.ingest_with(
        int_adapter(),
        &index,
        [25],
        &mut NoopCallback,
        &UniformVisibilityWriter::new(ByField),
    );

    let query = |labels: &[&str]| -> Vec<i32> {
        everything(&store, QueryOptions::new().authorizations(auths(labels)))
    };
    assert!(query(&[]).is_empty());
    assert!(query(&["x"]).is_empty());
    assert!(query(&["y"]).is_empty());
    assert_eq!(query(&["x", "y"]), vec![25]);
    assert_eq!(sink.report().rows_hidden, 3);

    let data_id = Identifier::from("25");
    assert_eq!(store.get_entry(index.id(), &data_id, &adapter_id(), &auths(&["x"])), None);
    assert_eq!(
        store.get_entry(index.id(), &data_id, &adapter_id(), &auths(&["x", "y"])),
        Some(25)
    );

    assert!(!store.delete_entry(index.id(), &data_id, &adapter_id(), &auths(&["y"])));
    assert_eq!(count(&store, &adapter_id()), 1);
    assert!(store.delete_entry(index.id(), &data_id, &adapter_id(), &auths(&["x", "y"])));
    assert_eq!(count(&store, &adapter_id()), 0);
    assert_eq!(store.row_count(index.id()), 0);
}

#[test]
fn delete_respects_authorizations() {
    let mut store = MemoryDataStore::new();
    store.ingest_with(
        int_adapter(),
        &test_index(),
        [25],
        &mut NoopCallback,
        &UniformVisibilityWriter::global("secret"),
    );

    assert_eq!(store.delete(&EverythingQuery, QueryOptions::new()), 0);
    assert_eq!(count(&store, &adapter_id()), 1);

    let options = QueryOptions::new().authorizations(auths(&["secret"]));
    assert_eq!(store.delete(&EverythingQuery, options), 1);
    assert_eq!(count(&store, &adapter_id()), 0);
}

#[test]
fn delete_entry_without_match_reports_false() {
    let mut store = MemoryDataStore::new();
    let index = test_index();
    store.ingest(int_adapter(), &index, [25]);

    let empty = Authorizations::empty();
    assert!(!store.delete_entry(index.id(), &Identifier::from("26"), &adapter_id(), &empty));
    let missing = Identifier::from("missing");
    assert!(!store.delete_entry(&missing, &Identifier::from("25"), &adapter_id(), &empty));
    assert_eq!(store.row_count(index.id()), 1);
}

#[test]
fn range_scan_visits_only_the_strategy_ranges() {
    let (mut ranged, ranged_sink) = counted_store();
    let full_config = StoreConfig {
        range_scan: false,
        ..StoreConfig::default()
    };
    let full_sink = Arc::new(CountingSink::new());
    let mut full = MemoryDataStore::with_config(full_config).with_sink(full_sink.clone());

    let index = test_index();
    ranged.ingest(int_adapter(), &index, 1..=20);
    full.ingest(int_adapter(), &index, 1..=20);

    assert_eq!(range_query(&ranged, 5.0, 8.0), vec![5, 6, 7]);
    assert_eq!(range_query(&full, 5.0, 8.0), vec![5, 6, 7]);

    // Cells 5..=8 fall inside the strategy range; the filter drops 8.
    assert_eq!(ranged_sink.report().rows_scanned, 4);
    assert_eq!(full_sink.report().rows_scanned, 20);
    assert_eq!(ranged_sink.report().rows_yielded, 3);
}

#[test]
fn range_scan_keeps_rows_whose_key_is_a_prefix_of_the_range_end() {
    let (mut ranged, ranged_sink) = counted_store();
    let mut full = MemoryDataStore::with_config(StoreConfig {
        range_scan: false,
        ..StoreConfig::default()
    });

    let index = byte_key_index();
    ranged.ingest(int_adapter(), &index, [4, 3, 2, 1]);
    full.ingest(int_adapter(), &index, [4, 3, 2, 1]);

    // Keys [1] and [1, 2] lie in the scanned range; [1, 3] and [2] do not.
    assert_eq!(range_query(&ranged, 1.0, 3.0), vec![1, 2]);
    assert_eq!(range_query(&full, 1.0, 3.0), vec![1, 2]);
    assert_eq!(ranged_sink.report().rows_scanned, 2);
}

#[test]
fn adapter_scope_restricts_results() {
    let mut store = MemoryDataStore::new();
    store.ingest(int_adapter(), &test_index(), [25]);

    assert!(everything(&store, QueryOptions::new().adapter("span-adapter")).is_empty());
    assert_eq!(everything(&store, QueryOptions::new().adapter("int-adapter")), vec![25]);
}

#[test]
fn scan_callback_sees_only_yielded_entries() {
    let mut store = MemoryDataStore::new();
    store.ingest(int_adapter(), &test_index(), [1, 2, 3, 30]);

    let mut scanned = Vec::new();
    let results: Vec<i32> = store
        .query_with_callback(
            &RangeQuery::new(2.0, 10.0),
            QueryOptions::new().limit(1),
            Box::new(|_: &EntryInfo, entry: &i32| scanned.push(*entry)),
        )
        .collect();

    assert_eq!(results, vec![2]);
    assert_eq!(scanned, vec![2]);
}

#[test]
fn prefix_scan_matches_row_id_bytes() {
    let mut store = MemoryDataStore::new();
    let index = test_index();
    let rows = store.ingest(int_adapter(), &index, [25, 35]);
    let empty = Authorizations::empty();

    let scan = |prefix: &[u8]| -> Vec<i32> {
        store.entries_by_prefix(index.id(), prefix, &empty).collect()
    };

    assert_eq!(scan(&[]), vec![25, 35]);
    assert_eq!(scan(int_key(25).as_bytes()), vec![25]);
    assert_eq!(scan(&int_key(25).as_bytes()[..3]), vec![25, 35]);
    assert!(scan(int_key(30).as_bytes()).is_empty());

    // A full row id, duplicate count included, is its own prefix.
    assert_eq!(scan(rows[1].as_bytes()), vec![35]);
}

#[test]
fn prefix_scan_reaches_rows_whose_key_is_shorter_than_the_prefix() {
    let mut store = MemoryDataStore::new();
    let index = byte_key_index();
    store.ingest(int_adapter(), &index, [1, 2, 3, 4]);
    let empty = Authorizations::empty();

    let scan = |prefix: &[u8]| -> Vec<i32> {
        store.entries_by_prefix(index.id(), prefix, &empty).collect()
    };

    assert_eq!(scan(&[0x01]), vec![1, 2, 3]);
    // Entry 1 has key [1]; its data id "1" follows directly.
    assert_eq!(scan(&[0x01, b'1']), vec![1]);
    assert_eq!(scan(&[0x01, 0x02]), vec![2]);
    assert!(scan(&[0x03]).is_empty());
}

#[test]
fn prefix_scan_hides_unauthorized_rows() {
    let mut store = MemoryDataStore::new();
    let index = test_index();
    store.ingest_with(
        int_adapter(),
        &index,
        [25],
        &mut NoopCallback,
        &UniformVisibilityWriter::global("a"),
    );
    store.ingest(int_adapter(), &index, [35]);

    let found: Vec<i32> = store
        .entries_by_prefix(index.id(), &[], &Authorizations::empty())
        .collect();
    assert_eq!(found, vec![35]);
}

#[test]
fn reingest_replaces_rows_and_keeps_statistics_exact() {
    let (mut store, sink) = counted_store();
    let index = test_index();

    let mut calls = 0;
    for _ in 0..2 {
        store.ingest_with(
            int_adapter(),
            &index,
            [25],
            &mut |_: &EntryInfo, _: &i32| calls += 1,
            &UniformVisibilityWriter::unconstrained(),
        );
    }

    assert_eq!(calls, 2);
    assert_eq!(store.row_count(index.id()), 1);
    assert_eq!(count(&store, &adapter_id()), 1);
    assert_eq!(dim_range(&store), Some(NumericRange::point(25.0)));
    assert_eq!(sink.report().rows_inserted, 2);
}

#[test]
fn multi_row_entries_are_deleted_once() {
    let (mut store, sink) = counted_store();
    let index = test_index();
    let span_id = SpanAdapter.adapter_id();

    let rows = store.ingest(Arc::new(SpanAdapter), &index, [(3, 5)]);
    assert_eq!(rows.len(), 3);
    assert_eq!(store.row_count(index.id()), 3);
    assert_eq!(count(&store, &span_id), 1);

    // Every row of the entry is yielded unless deduplicated.
    assert_eq!(everything(&store, QueryOptions::new()).len(), 3);
    let deduped = everything(&store, QueryOptions::new().filter(DedupeFilter::new()));
    assert_eq!(deduped, vec![(3, 5)]);

    assert_eq!(store.delete(&EverythingQuery, QueryOptions::new()), 1);
    assert_eq!(store.row_count(index.id()), 0);
    assert_eq!(count(&store, &span_id), 0);
    assert_eq!(sink.report().rows_removed, 3);
}

#[test]
fn unindexable_entries_are_skipped() {
    let (mut store, sink) = counted_store();
    let index = test_index();

    let rows = store.ingest(Arc::new(SpanAdapter), &index, [(0, 10_000), (1, 2)]);

    assert_eq!(rows.len(), 2);
    assert_eq!(sink.report().entries_unindexable, 1);
    assert_eq!(count(&store, &SpanAdapter.adapter_id()), 1);
}

#[test]
fn refused_statistics_do_not_undo_rows() {
    let sink = Arc::new(CountingSink::new());
    let mut store = MemoryDataStore::new()
        .with_sink(sink.clone())
        .with_statistics_store(Box::new(RefusingStore));
    let index = test_index();

    store.ingest(int_adapter(), &index, [25]);

    assert_eq!(store.row_count(index.id()), 1);
    assert_eq!(everything(&store, QueryOptions::new()), vec![25]);
    assert_eq!(store.pending_statistics(), 2);
    assert_eq!(sink.report().statistics_flush_failures, 1);
}
