use crate::{
    db::{entry::EntryInfo, stats::StatisticsError},
    types::{Identifier, NumericRange},
    value::Value,
};
use std::{collections::BTreeMap, fmt};

///
/// StatisticKind
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum StatisticKind {
    Count,
    NumericRange { field: Identifier },
}

impl fmt::Display for StatisticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count => write!(f, "count"),
            Self::NumericRange { field } => write!(f, "numeric_range({field})"),
        }
    }
}

///
/// Statistic
///
/// Mergeable aggregate. The same type carries both persisted totals and
/// the signed deltas a composition tool accumulates; merge is associative
/// and commutative so flush order does not matter.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Statistic {
    Count(CountStatistic),
    NumericRange(NumericRangeStatistic),
}

impl Statistic {
    /// Zero value for `kind`.
    #[must_use]
    pub fn empty(kind: &StatisticKind) -> Self {
        match kind {
            StatisticKind::Count => Self::Count(CountStatistic::default()),
            StatisticKind::NumericRange { field } => {
                Self::NumericRange(NumericRangeStatistic::new(field.clone()))
            }
        }
    }

    #[must_use]
    pub fn kind(&self) -> StatisticKind {
        match self {
            Self::Count(_) => StatisticKind::Count,
            Self::NumericRange(s) => StatisticKind::NumericRange {
                field: s.field.clone(),
            },
        }
    }

    /// True when merging this value would change nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Count(s) => s.count == 0,
            Self::NumericRange(s) => s.mins.is_empty() && s.maxes.is_empty(),
        }
    }

    pub fn entry_ingested(&mut self, info: &EntryInfo) {
        self.observe(info, 1);
    }

    pub fn entry_deleted(&mut self, info: &EntryInfo) {
        self.observe(info, -1);
    }

    pub fn merge(&mut self, other: &Self) -> Result<(), StatisticsError> {
        match (self, other) {
            (Self::Count(a), Self::Count(b)) => {
                a.count = a.count.saturating_add(b.count);
                Ok(())
            }
            (Self::NumericRange(a), Self::NumericRange(b)) if a.field == b.field => {
                merge_counts(&mut a.mins, &b.mins);
                merge_counts(&mut a.maxes, &b.maxes);
                Ok(())
            }
            (a, b) => Err(StatisticsError::KindMismatch {
                expected: a.kind(),
                found: b.kind(),
            }),
        }
    }

    fn observe(&mut self, info: &EntryInfo, sign: i64) {
        match self {
            Self::Count(s) => s.count = s.count.saturating_add(sign),
            Self::NumericRange(s) => {
                if let Some(range) = info.value(&s.field).and_then(Value::as_numeric_range) {
                    bump(&mut s.mins, range.min, sign);
                    bump(&mut s.maxes, range.max, sign);
                }
            }
        }
    }
}

///
/// CountStatistic
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CountStatistic {
    pub count: i64,
}

///
/// NumericRangeStatistic
///
/// Tracks every observed lower and upper bound with its multiplicity, so a
/// delete removes exactly what the matching ingest added and min/max stay
/// exact after deletes.
///

#[derive(Clone, Debug, PartialEq)]
pub struct NumericRangeStatistic {
    pub field: Identifier,
    mins: BTreeMap<OrderedF64, i64>,
    maxes: BTreeMap<OrderedF64, i64>,
}

impl NumericRangeStatistic {
    #[must_use]
    pub const fn new(field: Identifier) -> Self {
        Self {
            field,
            mins: BTreeMap::new(),
            maxes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn min(&self) -> Option<f64> {
        self.mins
            .iter()
            .find(|(_, n)| **n > 0)
            .map(|(k, _)| k.value())
    }

    #[must_use]
    pub fn max(&self) -> Option<f64> {
        self.maxes
            .iter()
            .rev()
            .find(|(_, n)| **n > 0)
            .map(|(k, _)| k.value())
    }

    #[must_use]
    pub fn range(&self) -> Option<NumericRange> {
        Some(NumericRange::new(self.min()?, self.max()?))
    }
}

// Total order over f64 bit patterns, matching `f64::total_cmp`.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
struct OrderedF64(u64);

impl OrderedF64 {
    const SIGN: u64 = 1 << 63;

    const fn new(value: f64) -> Self {
        let bits = value.to_bits();
        if bits & Self::SIGN == 0 {
            Self(bits | Self::SIGN)
        } else {
            Self(!bits)
        }
    }

    const fn value(self) -> f64 {
        let bits = if self.0 & Self::SIGN == 0 {
            !self.0
        } else {
            self.0 & !Self::SIGN
        };

        f64::from_bits(bits)
    }
}

fn bump(counts: &mut BTreeMap<OrderedF64, i64>, value: f64, delta: i64) {
    let key = OrderedF64::new(value);
    let n = counts.entry(key).or_insert(0);
    *n = n.saturating_add(delta);
    if *n == 0 {
        counts.remove(&key);
    }
}

fn merge_counts(into: &mut BTreeMap<OrderedF64, i64>, from: &BTreeMap<OrderedF64, i64>) {
    for (key, delta) in from {
        bump(into, key.value(), *delta);
    }
}

///
/// TESTS
///
