//! Module: db::filter
//! Responsibility: row-level predicates evaluated against decoded rows.
//! Does not own: authorization (checked by the store before filters run).

use crate::{db::decode::IndexedEncoding, types::Identifier};
use std::{
    cell::RefCell,
    collections::{BTreeSet, HashSet},
};

///
/// QueryFilter
///

pub trait QueryFilter {
    fn accept(&self, encoding: &IndexedEncoding) -> bool;
}

///
/// FilterList
///
/// Conjunction of filters, evaluated in order and short-circuiting on the
/// first rejection. Callers place cheap filters first.
///

#[derive(Default)]
pub struct FilterList {
    filters: Vec<Box<dyn QueryFilter>>,
}

impl FilterList {
    #[must_use]
    pub const fn new(filters: Vec<Box<dyn QueryFilter>>) -> Self {
        Self { filters }
    }

    pub fn push(&mut self, filter: Box<dyn QueryFilter>) {
        self.filters.push(filter);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl QueryFilter for FilterList {
    fn accept(&self, encoding: &IndexedEncoding) -> bool {
        self.filters.iter().all(|f| f.accept(encoding))
    }
}

///
/// AdapterIdFilter
///

#[derive(Clone, Debug)]
pub struct AdapterIdFilter {
    ids: BTreeSet<Identifier>,
}

impl AdapterIdFilter {
    pub fn new(ids: impl IntoIterator<Item = Identifier>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }
}

impl QueryFilter for AdapterIdFilter {
    fn accept(&self, encoding: &IndexedEncoding) -> bool {
        self.ids.contains(&encoding.adapter_id)
    }
}

///
/// DataIdFilter
///

#[derive(Clone, Debug)]
pub struct DataIdFilter {
    ids: BTreeSet<Identifier>,
}

impl DataIdFilter {
    pub fn new(ids: impl IntoIterator<Item = Identifier>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }
}

impl QueryFilter for DataIdFilter {
    fn accept(&self, encoding: &IndexedEncoding) -> bool {
        self.ids.contains(&encoding.data_id)
    }
}

///
/// DedupeFilter
///
/// Passes the first row of each `(adapter, data id)` among rows that have
/// siblings (duplicate count > 0). Rows without siblings, or with
/// deduplication disabled, always pass. Stateful: use one per query.
///

#[derive(Debug, Default)]
pub struct DedupeFilter {
    seen: RefCell<HashSet<(Identifier, Identifier)>>,
}

impl DedupeFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl QueryFilter for DedupeFilter {
    fn accept(&self, encoding: &IndexedEncoding) -> bool {
        if encoding.duplicate_count <= 0 {
            return true;
        }

        self.seen
            .borrow_mut()
            .insert((encoding.adapter_id.clone(), encoding.data_id.clone()))
    }
}

///
/// TESTS
///
