use serde::{Deserialize, Serialize};

///
/// NumericRange
///
/// Closed numeric interval `[min, max]` in one dimension.
///

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub const fn point(value: f64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    #[must_use]
    pub fn centroid(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min <= other.max && other.min <= self.max
    }
}

///
/// MultiDimensionalNumericData
///
/// One numeric range per dimension; the constraint shape handed to an
/// index strategy when computing query ranges.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct MultiDimensionalNumericData(Vec<NumericRange>);

impl MultiDimensionalNumericData {
    #[must_use]
    pub const fn new(ranges: Vec<NumericRange>) -> Self {
        Self(ranges)
    }

    #[must_use]
    pub fn dimensions(&self) -> &[NumericRange] {
        &self.0
    }

    #[must_use]
    pub fn dimension_count(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

///
/// ByteRange
///
/// Inclusive insertion-key range. A row whose insertion key starts with any
/// byte string in `[start, end]` falls inside the range.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ByteRange {
    pub start: Vec<u8>,
    pub end: Vec<u8>,
}

impl ByteRange {
    #[must_use]
    pub fn new(start: impl Into<Vec<u8>>, end: impl Into<Vec<u8>>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    #[must_use]
    pub fn single(value: impl Into<Vec<u8>>) -> Self {
        let value = value.into();

        Self {
            start: value.clone(),
            end: value,
        }
    }

    #[must_use]
    pub fn is_single_value(&self) -> bool {
        self.start == self.end
    }

    /// Sort ranges and merge any whose scan bounds overlap or touch, so a
    /// scan over the result visits each row at most once.
    #[must_use]
    pub fn coalesce(mut ranges: Vec<Self>) -> Vec<ScanBounds> {
        ranges.sort_by(|a, b| a.start.cmp(&b.start));

        let mut merged: Vec<ScanBounds> = Vec::with_capacity(ranges.len());
        for range in ranges {
            let lower = range.start.clone();
            let upper = next_prefix(&range.end);

            if let Some(last) = merged.last_mut() {
                let overlaps = match &last.upper {
                    None => true,
                    Some(last_upper) => lower <= *last_upper,
                };
                if overlaps {
                    last.upper = match (&last.upper, upper) {
                        (None, _) | (_, None) => None,
                        (Some(a), Some(b)) => Some(if *a >= b { a.clone() } else { b }),
                    };
                    continue;
                }
            }

            merged.push(ScanBounds { lower, upper });
        }

        merged
    }
}

///
/// ScanBounds
///
/// Coalesced scan window over insertion keys: inclusive lower bound,
/// exclusive upper bound (`None` = unbounded).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ScanBounds {
    pub lower: Vec<u8>,
    pub upper: Option<Vec<u8>>,
}

impl ScanBounds {
    /// Window holding exactly the insertion key `key`.
    #[must_use]
    pub fn exact(key: &[u8]) -> Self {
        let mut upper = key.to_vec();
        upper.push(0x00);

        Self {
            lower: key.to_vec(),
            upper: Some(upper),
        }
    }

    /// Window holding every insertion key that starts with `prefix`.
    #[must_use]
    pub fn prefixed(prefix: &[u8]) -> Self {
        Self {
            lower: prefix.to_vec(),
            upper: next_prefix(prefix),
        }
    }
}

/// Smallest byte string greater than every string prefixed by `bytes`.
/// Returns `None` when no such string exists (empty or all `0xFF`).
#[must_use]
pub fn next_prefix(bytes: &[u8]) -> Option<Vec<u8>> {
    let mut out = bytes.to_vec();
    while let Some(last) = out.pop() {
        if last < u8::MAX {
            out.push(last + 1);
            return Some(out);
        }
    }

    None
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_prefix_increments_last_non_max_byte() {
        assert_eq!(next_prefix(&[0x01, 0x02]), Some(vec![0x01, 0x03]));
        assert_eq!(next_prefix(&[0x01, 0xFF]), Some(vec![0x02]));
        assert_eq!(next_prefix(&[0xFF, 0xFF]), None);
        assert_eq!(next_prefix(&[]), None);
    }

    #[test]
    fn coalesce_merges_overlapping_and_touching_ranges() {
        let merged = ByteRange::coalesce(vec![
            ByteRange::new(vec![5], vec![6]),
            ByteRange::new(vec![1], vec![2]),
            ByteRange::new(vec![3], vec![4]),
            ByteRange::single(vec![9]),
        ]);

        assert_eq!(
            merged,
            vec![
                ScanBounds {
                    lower: vec![1],
                    upper: Some(vec![7]),
                },
                ScanBounds {
                    lower: vec![9],
                    upper: Some(vec![10]),
                },
            ]
        );
    }

    #[test]
    fn coalesce_keeps_unbounded_upper() {
        let merged = ByteRange::coalesce(vec![
            ByteRange::new(vec![0x10], vec![0xFF]),
            ByteRange::new(vec![0x20], vec![0x30]),
        ]);

        assert_eq!(
            merged,
            vec![ScanBounds {
                lower: vec![0x10],
                upper: None,
            }]
        );
    }

    #[test]
    fn numeric_ranges_intersect_when_bounds_overlap() {
        let a = NumericRange::new(1.0, 5.0);

        assert!(a.intersects(&NumericRange::new(5.0, 9.0)));
        assert!(!a.intersects(&NumericRange::new(5.5, 9.0)));
        assert!((a.centroid() - 3.0).abs() < f64::EPSILON);
    }
}
