//! Metrics sink boundary.
//!
//! Store and encoder logic MUST NOT keep counters of their own.
//! All instrumentation flows through StoreEvent and MetricsSink.

use crate::types::Identifier;
use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

///
/// StoreEvent
///

#[derive(Clone, Copy, Debug)]
pub enum StoreEvent<'a> {
    RowsInserted {
        index: &'a Identifier,
        rows: u64,
    },
    RowsRemoved {
        index: &'a Identifier,
        rows: u64,
    },
    RowsScanned {
        index: &'a Identifier,
        rows_scanned: u64,
        rows_yielded: u64,
    },
    VisibilityRejected {
        index: &'a Identifier,
        rows: u64,
    },
    EntryUnindexable {
        adapter: &'a Identifier,
        data_id: &'a Identifier,
    },
    FieldSkipped {
        adapter: &'a Identifier,
        field: &'a Identifier,
    },
    StatisticsFlushed {
        adapter: &'a Identifier,
        statistics: u64,
    },
    StatisticsFlushFailed {
        adapter: &'a Identifier,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink: Send + Sync {
    fn record(&self, event: StoreEvent<'_>);
}

///
/// TracingSink
/// Default sink: every event becomes a `debug` record.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl MetricsSink for TracingSink {
    fn record(&self, event: StoreEvent<'_>) {
        match event {
            StoreEvent::RowsInserted { index, rows } => {
                debug!(%index, rows, "rows inserted");
            }
            StoreEvent::RowsRemoved { index, rows } => {
                debug!(%index, rows, "rows removed");
            }
            StoreEvent::RowsScanned {
                index,
                rows_scanned,
                rows_yielded,
            } => {
                debug!(%index, rows_scanned, rows_yielded, "scan finished");
            }
            StoreEvent::VisibilityRejected { index, rows } => {
                debug!(%index, rows, "rows hidden by visibility");
            }
            StoreEvent::EntryUnindexable { adapter, data_id } => {
                debug!(%adapter, %data_id, "entry unindexable");
            }
            StoreEvent::FieldSkipped { adapter, field } => {
                debug!(%adapter, %field, "field skipped");
            }
            StoreEvent::StatisticsFlushed {
                adapter,
                statistics,
            } => {
                debug!(%adapter, statistics, "statistics flushed");
            }
            StoreEvent::StatisticsFlushFailed { adapter } => {
                debug!(%adapter, "statistics flush failed");
            }
        }
    }
}

///
/// EventReport
/// Cumulative counters captured by a [`CountingSink`].
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct EventReport {
    pub rows_inserted: u64,
    pub rows_removed: u64,
    pub rows_scanned: u64,
    pub rows_yielded: u64,
    pub rows_hidden: u64,
    pub entries_unindexable: u64,
    pub fields_skipped: u64,
    pub statistics_flushed: u64,
    pub statistics_flush_failures: u64,
}

///
/// CountingSink
///

#[derive(Debug, Default)]
pub struct CountingSink {
    report: Mutex<EventReport>,
}

impl CountingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the counters so far.
    #[must_use]
    pub fn report(&self) -> EventReport {
        self.report
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn reset(&self) {
        *self.report.lock().unwrap_or_else(PoisonError::into_inner) = EventReport::default();
    }
}

impl MetricsSink for CountingSink {
    fn record(&self, event: StoreEvent<'_>) {
        let mut r = self.report.lock().unwrap_or_else(PoisonError::into_inner);

        match event {
            StoreEvent::RowsInserted { rows, .. } => {
                r.rows_inserted = r.rows_inserted.saturating_add(rows);
            }
            StoreEvent::RowsRemoved { rows, .. } => {
                r.rows_removed = r.rows_removed.saturating_add(rows);
            }
            StoreEvent::RowsScanned {
                rows_scanned,
                rows_yielded,
                ..
            } => {
                r.rows_scanned = r.rows_scanned.saturating_add(rows_scanned);
                r.rows_yielded = r.rows_yielded.saturating_add(rows_yielded);
            }
            StoreEvent::VisibilityRejected { rows, .. } => {
                r.rows_hidden = r.rows_hidden.saturating_add(rows);
            }
            StoreEvent::EntryUnindexable { .. } => {
                r.entries_unindexable = r.entries_unindexable.saturating_add(1);
            }
            StoreEvent::FieldSkipped { .. } => {
                r.fields_skipped = r.fields_skipped.saturating_add(1);
            }
            StoreEvent::StatisticsFlushed { statistics, .. } => {
                r.statistics_flushed = r.statistics_flushed.saturating_add(statistics);
            }
            StoreEvent::StatisticsFlushFailed { .. } => {
                r.statistics_flush_failures = r.statistics_flush_failures.saturating_add(1);
            }
        }
    }
}

///
/// TESTS
///
