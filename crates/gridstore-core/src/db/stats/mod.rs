//! Module: db::stats
//! Responsibility: incrementally maintained per-adapter statistics.
//! Does not own: deciding when entries are ingested or deleted; the store
//! drives a composition tool for that.

mod statistic;
mod store;
mod tool;

pub use statistic::{CountStatistic, NumericRangeStatistic, Statistic, StatisticKind};
pub use store::{MemoryStatisticsStore, StatisticsStore};
pub use tool::{StatisticsLedger, StatsCompositionTool};

use crate::error::{ErrorClass, ErrorOrigin, InternalError};
use thiserror::Error as ThisError;

///
/// StatisticsError
///

#[derive(Debug, ThisError)]
pub enum StatisticsError {
    #[error("statistic kind mismatch: expected {expected}, found {found}")]
    KindMismatch {
        expected: StatisticKind,
        found: StatisticKind,
    },

    #[error("statistics store unavailable: {0}")]
    Unavailable(String),
}

impl From<StatisticsError> for InternalError {
    fn from(err: StatisticsError) -> Self {
        let class = match err {
            StatisticsError::KindMismatch { .. } => ErrorClass::InvariantViolation,
            StatisticsError::Unavailable(_) => ErrorClass::Internal,
        };

        Self::new(class, ErrorOrigin::Statistics, err.to_string())
    }
}
