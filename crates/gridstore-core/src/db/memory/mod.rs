//! Module: db::memory
//! Responsibility: the in-memory data store: ingest, lookup, scan, query and
//! delete over per-index ordered row sets, keeping statistics in step.
//! Does not own: row encoding, filter semantics, or statistic arithmetic.

mod scan;
#[cfg(test)]
mod tests;

pub use scan::{PrefixScan, QueryResults};

use crate::{
    config::StoreConfig,
    db::{
        callback::{IngestCallback, NoopCallback, ScanCallback},
        encode::encode_entry,
        entry::EntryInfo,
        query::{Query, QueryOptions},
        row_id::RawRowId,
        stats::{StatisticsLedger, StatisticsStore, StatsCompositionTool},
        store::{MemoryAdapterStore, MemoryIndexStore, RowKey, RowSet, StoredRow},
    },
    model::{DataAdapter, Index},
    obs::{MetricsSink, StoreEvent, TracingSink},
    types::Identifier,
    visibility::{Authorizations, UniformVisibilityWriter, VisibilityWriter},
};
use scan::RowScan;
use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};
use tracing::{debug, warn};

///
/// MemoryDataStore
///
/// Reference store for entries of type `T`. Each registered index owns a
/// row set ordered by insertion key; every row of one entry shares the
/// entry and its `EntryInfo`.
///
/// There is no internal locking. Queries borrow the store immutably, so a
/// mutation cannot overlap an outstanding result iterator.
///

pub struct MemoryDataStore<T> {
    adapters: MemoryAdapterStore<T>,
    indices: MemoryIndexStore,
    pub(crate) rows: BTreeMap<Identifier, RowSet<T>>,
    stats: StatisticsLedger,
    pub(crate) sink: Arc<dyn MetricsSink>,
    pub(crate) config: StoreConfig,
}

impl<T> MemoryDataStore<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            adapters: MemoryAdapterStore::new(),
            indices: MemoryIndexStore::new(),
            rows: BTreeMap::new(),
            stats: StatisticsLedger::default(),
            sink: Arc::new(TracingSink),
            config,
        }
    }

    /// Route store events to `sink` instead of the tracing sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Persist statistics in `store` instead of the in-memory default.
    #[must_use]
    pub fn with_statistics_store(mut self, store: Box<dyn StatisticsStore>) -> Self {
        self.stats = StatisticsLedger::new(store);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    #[must_use]
    pub const fn adapter_store(&self) -> &MemoryAdapterStore<T> {
        &self.adapters
    }

    #[must_use]
    pub const fn index_store(&self) -> &MemoryIndexStore {
        &self.indices
    }

    #[must_use]
    pub fn statistics(&self) -> &dyn StatisticsStore {
        self.stats.store()
    }

    /// Statistic deltas the statistics store has refused so far.
    #[must_use]
    pub fn pending_statistics(&self) -> usize {
        self.stats.backlog_len()
    }

    /// Number of rows stored for `index_id`.
    #[must_use]
    pub fn row_count(&self, index_id: &Identifier) -> usize {
        self.rows.get(index_id).map_or(0, RowSet::len)
    }

    /// Register `adapter` and `index` without ingesting anything. Returns
    /// the adapter registered under `adapter`'s identifier.
    pub fn register(
        &mut self,
        adapter: Arc<dyn DataAdapter<T>>,
        index: &Index,
    ) -> Arc<dyn DataAdapter<T>> {
        let adapter = self.adapters.add(adapter);
        if self.indices.add(index) {
            debug!(index = %index.id(), "index registered");
        }
        self.rows.entry(index.id().clone()).or_insert_with(RowSet::new);

        adapter
    }

    /// Ingest `entries` with no callback and unrestricted default visibility.
    pub fn ingest<I>(
        &mut self,
        adapter: Arc<dyn DataAdapter<T>>,
        index: &Index,
        entries: I,
    ) -> Vec<RawRowId>
    where
        I: IntoIterator<Item = T>,
    {
        self.ingest_with(
            adapter,
            index,
            entries,
            &mut NoopCallback,
            &UniformVisibilityWriter::unconstrained(),
        )
    }

    /// Ingest `entries` into `index`, returning every row id written.
    ///
    /// An entry that fails to encode is skipped. A fault while storing
    /// rows stops the batch; rows stored before it are kept, and the
    /// statistics for them are still flushed.
    pub fn ingest_with<I>(
        &mut self,
        adapter: Arc<dyn DataAdapter<T>>,
        index: &Index,
        entries: I,
        callback: &mut dyn IngestCallback<T>,
        visibility_writer: &dyn VisibilityWriter<T>,
    ) -> Vec<RawRowId>
    where
        I: IntoIterator<Item = T>,
    {
        let adapter = self.register(adapter, index);
        let adapter_id = adapter.adapter_id();
        let kinds = adapter.statistic_kinds();

        let sink = self.sink.as_ref();
        let rows = self.rows.entry(index.id().clone()).or_insert_with(RowSet::new);
        let mut tool =
            StatsCompositionTool::open(&mut self.stats, adapter_id.clone(), &kinds, sink);
        let mut written = Vec::new();

        for entry in entries {
            let encoded = encode_entry(adapter.as_ref(), index, &entry, visibility_writer, sink);
            let info = match encoded {
                Ok(info) => info,
                Err(err) => {
                    warn!(
                        adapter = %adapter_id,
                        index = %index.id(),
                        error = %err,
                        "entry failed to encode; skipping"
                    );
                    continue;
                }
            };
            if info.is_empty() {
                continue;
            }

            let info = Arc::new(info);
            let entry = Arc::new(entry);
            store_rows(rows, &info, &entry, &mut tool);

            sink.record(StoreEvent::RowsInserted {
                index: index.id(),
                rows: info.row_ids().len() as u64,
            });
            written.extend(info.row_ids().iter().cloned());

            callback.entry_ingested(&info, &entry);
            tool.entry_ingested(&info);
        }

        written
    }

    /// Run `query` with no scan callback.
    pub fn query<'a>(&'a self, query: &'a dyn Query, options: QueryOptions) -> QueryResults<'a, T> {
        self.query_with_callback(query, options, Box::new(NoopCallback))
    }

    /// Lazily evaluate `query`. `callback` sees every yielded entry just
    /// before it is returned.
    pub fn query_with_callback<'a>(
        &'a self,
        query: &'a dyn Query,
        options: QueryOptions,
        callback: Box<dyn ScanCallback<T> + 'a>,
    ) -> QueryResults<'a, T> {
        QueryResults::new(self.scan(query, options), callback)
    }

    /// Entry stored under the exact row id `row_id`, if visible.
    pub fn get_entry_by_row_id(
        &self,
        index_id: &Identifier,
        row_id: &[u8],
        authorizations: &Authorizations,
    ) -> Option<T>
    where
        T: Clone,
    {
        let key = RowKey::decode(row_id)?;
        let row = self.rows.get(index_id)?.get(&key)?;

        (row.raw.as_bytes() == row_id && row.is_visible_to(authorizations))
            .then(|| T::clone(&row.entry))
    }

    /// First visible entry with `data_id` written by `adapter_id`.
    pub fn get_entry(
        &self,
        index_id: &Identifier,
        data_id: &Identifier,
        adapter_id: &Identifier,
        authorizations: &Authorizations,
    ) -> Option<T>
    where
        T: Clone,
    {
        self.rows
            .get(index_id)?
            .iter()
            .find(|row| {
                row.belongs_to(data_id, adapter_id) && row.is_visible_to(authorizations)
            })
            .map(|row| T::clone(&row.entry))
    }

    /// Visible entries whose row id starts with `prefix`, in row order.
    pub fn entries_by_prefix(
        &self,
        index_id: &Identifier,
        prefix: &[u8],
        authorizations: &Authorizations,
    ) -> PrefixScan<'_, T> {
        PrefixScan::new(self.rows.get(index_id), prefix, authorizations.clone())
    }

    /// Remove every visible row of (`data_id`, `adapter_id`) from one index.
    /// Returns whether anything was removed.
    pub fn delete_entry(
        &mut self,
        index_id: &Identifier,
        data_id: &Identifier,
        adapter_id: &Identifier,
        authorizations: &Authorizations,
    ) -> bool {
        let Some(rows) = self.rows.get_mut(index_id) else {
            return false;
        };
        let doomed: Vec<RowKey> = rows
            .iter()
            .filter(|row| {
                row.belongs_to(data_id, adapter_id) && row.is_visible_to(authorizations)
            })
            .map(StoredRow::key)
            .collect();
        if doomed.is_empty() {
            return false;
        }

        let kinds = self
            .adapters
            .get(adapter_id)
            .map(|adapter| adapter.statistic_kinds())
            .unwrap_or_default();
        let sink = self.sink.as_ref();
        let mut tool =
            StatsCompositionTool::open(&mut self.stats, adapter_id.clone(), &kinds, sink);

        let mut removed = 0u64;
        let mut reversed: Vec<Arc<EntryInfo>> = Vec::new();
        for key in &doomed {
            let Some(row) = rows.remove(key) else {
                continue;
            };
            removed += 1;
            if !reversed.iter().any(|info| Arc::ptr_eq(info, &row.info)) {
                tool.entry_deleted(&row.info);
                reversed.push(row.info);
            }
        }

        sink.record(StoreEvent::RowsRemoved {
            index: index_id,
            rows: removed,
        });

        removed > 0
    }

    /// Remove every entry `query` yields under `options`. Returns the number
    /// of entries removed, counted once per index they were stored in.
    pub fn delete(&mut self, query: &dyn Query, options: QueryOptions) -> usize {
        let mut seen = HashSet::new();
        let mut doomed: BTreeMap<Identifier, Vec<(Identifier, Arc<EntryInfo>)>> = BTreeMap::new();
        for hit in self.scan(query, options) {
            let index_id = hit.index.id().clone();
            if seen.insert((index_id.clone(), Arc::as_ptr(&hit.row.info))) {
                doomed
                    .entry(hit.row.row_id.adapter_id().clone())
                    .or_default()
                    .push((index_id, Arc::clone(&hit.row.info)));
            }
        }

        let sink = self.sink.as_ref();
        let mut deleted = 0;
        for (adapter_id, victims) in doomed {
            let kinds = self
                .adapters
                .get(&adapter_id)
                .map(|adapter| adapter.statistic_kinds())
                .unwrap_or_default();
            let mut tool = StatsCompositionTool::open(&mut self.stats, adapter_id, &kinds, sink);

            for (index_id, info) in victims {
                let Some(rows) = self.rows.get_mut(&index_id) else {
                    continue;
                };
                let removed = remove_entry_rows(rows, &info);
                if removed > 0 {
                    tool.entry_deleted(&info);
                    deleted += 1;
                    sink.record(StoreEvent::RowsRemoved {
                        index: &index_id,
                        rows: removed,
                    });
                }
            }
        }

        deleted
    }

    fn scan<'a>(&'a self, query: &'a dyn Query, options: QueryOptions) -> RowScan<'a, T> {
        let indices: Vec<&Index> = match &options.index {
            Some(index_id) => match self.indices.try_get(index_id) {
                Ok(index) => vec![index],
                Err(err) => {
                    debug!(error = %err, "query targets an unknown index");
                    Vec::new()
                }
            },
            None => self.indices.iter().collect(),
        };

        RowScan::new(self, query, indices, options)
    }
}

impl<T> Default for MemoryDataStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Insert the rows of one encoded entry. Any entry the new rows displace is
// removed completely and its statistics are reversed once.
fn store_rows<T>(
    rows: &mut RowSet<T>,
    info: &Arc<EntryInfo>,
    entry: &Arc<T>,
    tool: &mut StatsCompositionTool<'_>,
) {
    let mut displaced: Vec<Arc<EntryInfo>> = Vec::new();
    for (row_id, raw) in info.rows() {
        let row = StoredRow {
            raw: raw.clone(),
            row_id: row_id.clone(),
            info: Arc::clone(info),
            entry: Arc::clone(entry),
        };
        if let Some(old) = rows.insert(row)
            && !displaced.iter().any(|d| Arc::ptr_eq(d, &old.info))
        {
            displaced.push(old.info);
        }
    }

    for old in &displaced {
        remove_entry_rows(rows, old);
        tool.entry_deleted(old);
    }
}

// Remove the rows that still belong to `info`; returns how many went.
fn remove_entry_rows<T>(rows: &mut RowSet<T>, info: &Arc<EntryInfo>) -> u64 {
    let mut removed = 0;
    for (row_id, raw) in info.rows() {
        let key = RowKey::new(row_id, raw.as_bytes());
        if rows
            .get(&key)
            .is_some_and(|row| Arc::ptr_eq(&row.info, info))
        {
            rows.remove(&key);
            removed += 1;
        }
    }

    removed
}
