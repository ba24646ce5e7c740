use crate::{
    db::filter::QueryFilter,
    model::{Index, IndexModel, IndexStrategy},
    types::{Identifier, MultiDimensionalNumericData},
    visibility::Authorizations,
};

///
/// Query
///
/// A predicate over stored rows. The store evaluates it per index: an index
/// the query does not support contributes no results.
///

pub trait Query {
    fn is_supported(&self, index: &Index) -> bool;

    /// Filters applied to every decoded row of a supported index.
    fn create_filters(&self, model: &IndexModel) -> Vec<Box<dyn QueryFilter>>;

    /// Constraints used to narrow the scan to insertion-key ranges.
    /// `None` scans the whole index.
    fn index_constraints(
        &self,
        _strategy: &dyn IndexStrategy,
    ) -> Option<MultiDimensionalNumericData> {
        None
    }
}

///
/// EverythingQuery
///

#[derive(Clone, Copy, Debug, Default)]
pub struct EverythingQuery;

impl Query for EverythingQuery {
    fn is_supported(&self, _index: &Index) -> bool {
        true
    }

    fn create_filters(&self, _model: &IndexModel) -> Vec<Box<dyn QueryFilter>> {
        Vec::new()
    }
}

///
/// QueryOptions
///
/// Per-call scope of a query. Empty `adapter_ids` means every adapter;
/// `index = None` fans out across every registered index. A limit of zero
/// is treated as no limit.
///

#[derive(Default)]
pub struct QueryOptions {
    pub adapter_ids: Vec<Identifier>,
    pub index: Option<Identifier>,
    pub limit: Option<usize>,
    pub authorizations: Authorizations,
    pub client_filters: Vec<Box<dyn QueryFilter>>,
}

impl QueryOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn adapter(mut self, adapter_id: impl Into<Identifier>) -> Self {
        self.adapter_ids.push(adapter_id.into());
        self
    }

    #[must_use]
    pub fn index(mut self, index_id: impl Into<Identifier>) -> Self {
        self.index = Some(index_id.into());
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn authorizations(mut self, authorizations: Authorizations) -> Self {
        self.authorizations = authorizations;
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: impl QueryFilter + 'static) -> Self {
        self.client_filters.push(Box::new(filter));
        self
    }

    // Zero means unlimited.
    pub(crate) fn effective_limit(&self, default: Option<usize>) -> Option<usize> {
        self.limit.or(default).filter(|limit| *limit > 0)
    }
}

///
/// TESTS
///
