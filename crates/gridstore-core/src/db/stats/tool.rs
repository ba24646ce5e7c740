use crate::{
    db::{
        entry::EntryInfo,
        stats::{MemoryStatisticsStore, Statistic, StatisticKind, StatisticsError, StatisticsStore},
    },
    obs::{MetricsSink, StoreEvent},
    types::Identifier,
};
use std::mem;
use tracing::{error, warn};

///
/// StatisticsLedger
///
/// A statistics store plus the deltas it refused. Refused deltas are
/// re-applied the next time a composition tool is opened on the ledger.
///

pub struct StatisticsLedger {
    store: Box<dyn StatisticsStore>,
    backlog: Vec<PendingDelta>,
}

struct PendingDelta {
    adapter_id: Identifier,
    delta: Statistic,
}

impl StatisticsLedger {
    #[must_use]
    pub fn new(store: Box<dyn StatisticsStore>) -> Self {
        Self {
            store,
            backlog: Vec::new(),
        }
    }

    #[must_use]
    pub fn store(&self) -> &dyn StatisticsStore {
        self.store.as_ref()
    }

    /// Deltas waiting for the store to accept them.
    #[must_use]
    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    /// Re-apply parked deltas; returns how many are still parked. A delta
    /// the store now rejects outright is dropped and reported to `sink`.
    pub fn retry_backlog(&mut self, sink: &dyn MetricsSink) -> usize {
        let pending = mem::take(&mut self.backlog);
        for p in pending {
            match self.apply_or_park(&p.adapter_id, p.delta) {
                Ok(()) | Err(StatisticsError::Unavailable(_)) => {}
                Err(err) => {
                    error!(
                        adapter = %p.adapter_id,
                        error = %err,
                        "parked statistic rejected on retry; dropping it"
                    );
                    sink.record(StoreEvent::StatisticsFlushFailed {
                        adapter: &p.adapter_id,
                    });
                }
            }
        }

        if !self.backlog.is_empty() {
            warn!(
                pending = self.backlog.len(),
                "statistics store still refusing parked deltas"
            );
        }

        self.backlog.len()
    }

    fn apply_or_park(
        &mut self,
        adapter_id: &Identifier,
        delta: Statistic,
    ) -> Result<(), StatisticsError> {
        let kind = delta.kind();
        match self.store.apply_delta(adapter_id, &kind, &delta) {
            Ok(()) => Ok(()),
            Err(err) => {
                // Only transient refusals are worth retrying.
                if matches!(err, StatisticsError::Unavailable(_)) {
                    self.backlog.push(PendingDelta {
                        adapter_id: adapter_id.clone(),
                        delta,
                    });
                }
                Err(err)
            }
        }
    }
}

impl Default for StatisticsLedger {
    fn default() -> Self {
        Self::new(Box::new(MemoryStatisticsStore::new()))
    }
}

///
/// StatsCompositionTool
///
/// Scoped accumulator for one adapter's statistics. Ingest and delete
/// events update in-memory deltas; the deltas reach the store on `flush`
/// or when the tool is dropped, whichever comes first, and each delta is
/// applied once.
///

pub struct StatsCompositionTool<'a> {
    adapter_id: Identifier,
    ledger: &'a mut StatisticsLedger,
    sink: &'a dyn MetricsSink,
    deltas: Vec<Statistic>,
}

impl<'a> StatsCompositionTool<'a> {
    pub fn open(
        ledger: &'a mut StatisticsLedger,
        adapter_id: Identifier,
        kinds: &[StatisticKind],
        sink: &'a dyn MetricsSink,
    ) -> Self {
        if ledger.backlog_len() > 0 {
            ledger.retry_backlog(sink);
        }

        Self {
            adapter_id,
            ledger,
            sink,
            deltas: kinds.iter().map(Statistic::empty).collect(),
        }
    }

    pub fn entry_ingested(&mut self, info: &EntryInfo) {
        for delta in &mut self.deltas {
            delta.entry_ingested(info);
        }
    }

    pub fn entry_deleted(&mut self, info: &EntryInfo) {
        for delta in &mut self.deltas {
            delta.entry_deleted(info);
        }
    }

    /// Push accumulated deltas to the store. Deltas the store refuses are
    /// parked on the ledger; the first error is returned.
    pub fn flush(&mut self) -> Result<(), StatisticsError> {
        let mut applied = 0u64;
        let mut first_err = None;

        for slot in &mut self.deltas {
            if slot.is_empty() {
                continue;
            }
            let empty = Statistic::empty(&slot.kind());
            let delta = mem::replace(slot, empty);

            match self.ledger.apply_or_park(&self.adapter_id, delta) {
                Ok(()) => applied += 1,
                Err(err) => {
                    first_err.get_or_insert(err);
                }
            }
        }

        if applied > 0 {
            self.sink.record(StoreEvent::StatisticsFlushed {
                adapter: &self.adapter_id,
                statistics: applied,
            });
        }

        match first_err {
            None => Ok(()),
            Some(err) => {
                self.sink.record(StoreEvent::StatisticsFlushFailed {
                    adapter: &self.adapter_id,
                });
                Err(err)
            }
        }
    }
}

impl Drop for StatsCompositionTool<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            error!(
                adapter = %self.adapter_id,
                error = %err,
                "statistics flush failed; rows were kept"
            );
        }
    }
}

///
/// TESTS
///
