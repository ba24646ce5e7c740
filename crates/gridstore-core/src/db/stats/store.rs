use crate::{
    db::stats::{Statistic, StatisticKind, StatisticsError},
    types::Identifier,
};
use std::collections::BTreeMap;

///
/// StatisticsStore
///
/// Persisted statistics keyed by `(adapter id, kind)`. Deltas are merged
/// into whatever is already stored.
///

pub trait StatisticsStore: Send + Sync {
    fn apply_delta(
        &mut self,
        adapter_id: &Identifier,
        kind: &StatisticKind,
        delta: &Statistic,
    ) -> Result<(), StatisticsError>;

    fn get(&self, adapter_id: &Identifier, kind: &StatisticKind) -> Option<&Statistic>;

    /// Every stored statistic, ordered by adapter id then kind.
    fn all(&self) -> Vec<(&Identifier, &Statistic)>;
}

///
/// MemoryStatisticsStore
///

#[derive(Clone, Debug, Default)]
pub struct MemoryStatisticsStore {
    stats: BTreeMap<(Identifier, StatisticKind), Statistic>,
}

impl MemoryStatisticsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatisticsStore for MemoryStatisticsStore {
    fn apply_delta(
        &mut self,
        adapter_id: &Identifier,
        kind: &StatisticKind,
        delta: &Statistic,
    ) -> Result<(), StatisticsError> {
        if &delta.kind() != kind {
            return Err(StatisticsError::KindMismatch {
                expected: kind.clone(),
                found: delta.kind(),
            });
        }

        self.stats
            .entry((adapter_id.clone(), kind.clone()))
            .or_insert_with(|| Statistic::empty(kind))
            .merge(delta)
    }

    fn get(&self, adapter_id: &Identifier, kind: &StatisticKind) -> Option<&Statistic> {
        self.stats.get(&(adapter_id.clone(), kind.clone()))
    }

    fn all(&self) -> Vec<(&Identifier, &Statistic)> {
        self.stats
            .iter()
            .map(|((adapter_id, _), stat)| (adapter_id, stat))
            .collect()
    }
}

///
/// TESTS
///
