use crate::{
    db::{
        callback::ScanCallback,
        decode::IndexedEncoding,
        filter::{AdapterIdFilter, FilterList, QueryFilter},
        memory::MemoryDataStore,
        query::{Query, QueryOptions},
        store::{RowKey, RowSet, StoredRow},
    },
    model::Index,
    obs::{MetricsSink, StoreEvent},
    types::{ByteRange, ScanBounds},
    visibility::Authorizations,
};
use std::{collections::btree_map, vec};

///
/// RowCursor
///
/// Ordered walk over one index's rows: everything, or a sorted list of
/// disjoint scan windows visited one after another.
///

enum RowCursor<'a, T> {
    Empty,
    All(btree_map::Values<'a, RowKey, StoredRow<T>>),
    Ranges {
        rows: &'a RowSet<T>,
        bounds: vec::IntoIter<ScanBounds>,
        current: Option<btree_map::Range<'a, RowKey, StoredRow<T>>>,
    },
}

impl<'a, T> RowCursor<'a, T> {
    fn ranges(rows: &'a RowSet<T>, bounds: Vec<ScanBounds>) -> Self {
        Self::Ranges {
            rows,
            bounds: bounds.into_iter(),
            current: None,
        }
    }
}

impl<'a, T> Iterator for RowCursor<'a, T> {
    type Item = &'a StoredRow<T>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Empty => None,
            Self::All(values) => values.next(),
            Self::Ranges {
                rows,
                bounds,
                current,
            } => {
                let rows: &'a RowSet<T> = *rows;
                loop {
                    if let Some((_, row)) = current.as_mut().and_then(Iterator::next) {
                        return Some(row);
                    }
                    let window = bounds.next()?;
                    *current = Some(rows.range(&window));
                }
            }
        }
    }
}

///
/// IndexScan
///
/// Filtered walk over one index. Scan counters are reported to the sink
/// when the scan is dropped, whether or not it ran to completion.
///

struct IndexScan<'a, T> {
    index: &'a Index,
    cursor: RowCursor<'a, T>,
    filters: FilterList,
    sink: &'a dyn MetricsSink,
    scanned: u64,
    hidden: u64,
    yielded: u64,
}

impl<'a, T> IndexScan<'a, T> {
    fn next_accepted(
        &mut self,
        authorizations: &Authorizations,
        client_filters: &FilterList,
    ) -> Option<&'a StoredRow<T>> {
        for row in self.cursor.by_ref() {
            self.scanned += 1;

            if !row.is_visible_to(authorizations) {
                self.hidden += 1;
                continue;
            }

            let encoding =
                IndexedEncoding::decode(self.index.model(), &row.row_id, row.info.fields());
            if client_filters.accept(&encoding) && self.filters.accept(&encoding) {
                self.yielded += 1;
                return Some(row);
            }
        }

        None
    }
}

impl<T> Drop for IndexScan<'_, T> {
    fn drop(&mut self) {
        self.sink.record(StoreEvent::RowsScanned {
            index: self.index.id(),
            rows_scanned: self.scanned,
            rows_yielded: self.yielded,
        });
        if self.hidden > 0 {
            self.sink.record(StoreEvent::VisibilityRejected {
                index: self.index.id(),
                rows: self.hidden,
            });
        }
    }
}

///
/// ScannedRow
///

pub(crate) struct ScannedRow<'a, T> {
    pub(crate) index: &'a Index,
    pub(crate) row: &'a StoredRow<T>,
}

///
/// RowScan
///
/// Query evaluation across the selected indices, one index at a time in
/// identifier order, stopping once the limit of accepted rows is reached.
///

pub(crate) struct RowScan<'a, T> {
    store: &'a MemoryDataStore<T>,
    query: &'a dyn Query,
    indices: vec::IntoIter<&'a Index>,
    current: Option<IndexScan<'a, T>>,
    client_filters: FilterList,
    authorizations: Authorizations,
    remaining: Option<usize>,
}

impl<'a, T> RowScan<'a, T> {
    pub(crate) fn new(
        store: &'a MemoryDataStore<T>,
        query: &'a dyn Query,
        indices: Vec<&'a Index>,
        options: QueryOptions,
    ) -> Self {
        let remaining = options.effective_limit(store.config.default_limit);

        // Adapter scoping is the cheapest check; it runs first.
        let mut client_filters: Vec<Box<dyn QueryFilter>> = Vec::new();
        if !options.adapter_ids.is_empty() {
            client_filters.push(Box::new(AdapterIdFilter::new(options.adapter_ids)));
        }
        client_filters.extend(options.client_filters);

        Self {
            store,
            query,
            indices: indices.into_iter(),
            current: None,
            client_filters: FilterList::new(client_filters),
            authorizations: options.authorizations,
            remaining,
        }
    }

    fn open(&self, index: &'a Index) -> IndexScan<'a, T> {
        let store: &'a MemoryDataStore<T> = self.store;
        let supported = self.query.is_supported(index);

        let cursor = match store.rows.get(index.id()) {
            Some(rows) if supported => self.cursor(index, rows),
            _ => RowCursor::Empty,
        };
        let filters = if supported {
            FilterList::new(self.query.create_filters(index.model()))
        } else {
            FilterList::default()
        };

        IndexScan {
            index,
            cursor,
            filters,
            sink: store.sink.as_ref(),
            scanned: 0,
            hidden: 0,
            yielded: 0,
        }
    }

    // Narrow to the strategy's insertion-key ranges when the query has
    // constraints; no ranges means a full scan.
    fn cursor(&self, index: &'a Index, rows: &'a RowSet<T>) -> RowCursor<'a, T> {
        let config = &self.store.config;
        if config.range_scan
            && let Some(constraints) = self.query.index_constraints(index.strategy())
        {
            let ranges = index
                .strategy()
                .query_ranges(&constraints, config.max_query_ranges);
            if !ranges.is_empty() {
                return RowCursor::ranges(rows, ByteRange::coalesce(ranges));
            }
        }

        RowCursor::All(rows.iter())
    }
}

impl<'a, T> Iterator for RowScan<'a, T> {
    type Item = ScannedRow<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) {
            return None;
        }

        loop {
            if self.current.is_none() {
                let index = self.indices.next()?;
                self.current = Some(self.open(index));
            }

            let scan = self.current.as_mut()?;
            if let Some(row) = scan.next_accepted(&self.authorizations, &self.client_filters) {
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                }
                return Some(ScannedRow {
                    index: scan.index,
                    row,
                });
            }

            self.current = None;
        }
    }
}

///
/// QueryResults
///
/// Lazy, single-pass query results. Borrows the store, so the store cannot
/// be mutated while results are outstanding.
///

pub struct QueryResults<'a, T> {
    scan: RowScan<'a, T>,
    callback: Box<dyn ScanCallback<T> + 'a>,
}

impl<'a, T> QueryResults<'a, T> {
    pub(crate) fn new(scan: RowScan<'a, T>, callback: Box<dyn ScanCallback<T> + 'a>) -> Self {
        Self { scan, callback }
    }
}

impl<T: Clone> Iterator for QueryResults<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let hit = self.scan.next()?;
        self.callback.entry_scanned(&hit.row.info, &hit.row.entry);

        Some(T::clone(&hit.row.entry))
    }
}

///
/// PrefixScan
///
/// Authorized entries whose row id starts with a byte prefix, in
/// insertion-key order.
///

pub struct PrefixScan<'a, T> {
    cursor: RowCursor<'a, T>,
    prefix: Vec<u8>,
    authorizations: Authorizations,
}

impl<'a, T> PrefixScan<'a, T> {
    pub(crate) fn new(
        rows: Option<&'a RowSet<T>>,
        prefix: &[u8],
        authorizations: Authorizations,
    ) -> Self {
        // Rows are ordered by insertion key. A row id starts with its key, so
        // a match either has a key starting with `prefix` or a key that is
        // itself a proper prefix of `prefix`.
        let cursor = rows.map_or(RowCursor::Empty, |rows| {
            let windows = (0..prefix.len())
                .map(|len| ScanBounds::exact(&prefix[..len]))
                .chain([ScanBounds::prefixed(prefix)])
                .collect();

            RowCursor::ranges(rows, windows)
        });

        Self {
            cursor,
            prefix: prefix.to_vec(),
            authorizations,
        }
    }
}

impl<T: Clone> Iterator for PrefixScan<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor
            .by_ref()
            .find(|row| {
                row.raw.as_bytes().starts_with(&self.prefix)
                    && row.is_visible_to(&self.authorizations)
            })
            .map(|row| T::clone(&row.entry))
    }
}
