use crate::{db::store::StoreRegistryError, model::DataAdapter, types::Identifier};
use std::{collections::BTreeMap, sync::Arc};

///
/// MemoryAdapterStore
///
/// Adapters by identifier. Registration is idempotent: the first adapter
/// registered under an identifier is kept for the lifetime of the store.
///

pub struct MemoryAdapterStore<T> {
    adapters: BTreeMap<Identifier, Arc<dyn DataAdapter<T>>>,
}

impl<T> MemoryAdapterStore<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            adapters: BTreeMap::new(),
        }
    }

    /// Register `adapter` unless its identifier is taken; returns the
    /// adapter that is registered under that identifier afterwards.
    pub fn add(&mut self, adapter: Arc<dyn DataAdapter<T>>) -> Arc<dyn DataAdapter<T>> {
        Arc::clone(self.adapters.entry(adapter.adapter_id()).or_insert(adapter))
    }

    #[must_use]
    pub fn get(&self, adapter_id: &Identifier) -> Option<&Arc<dyn DataAdapter<T>>> {
        self.adapters.get(adapter_id)
    }

    pub fn try_get(
        &self,
        adapter_id: &Identifier,
    ) -> Result<&Arc<dyn DataAdapter<T>>, StoreRegistryError> {
        self.get(adapter_id)
            .ok_or_else(|| StoreRegistryError::AdapterNotFound(adapter_id.clone()))
    }

    #[must_use]
    pub fn contains(&self, adapter_id: &Identifier) -> bool {
        self.adapters.contains_key(adapter_id)
    }

    /// Registered identifiers in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &Identifier> {
        self.adapters.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl<T> Default for MemoryAdapterStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
