use crate::{db::store::StoreRegistryError, model::Index, types::Identifier};
use std::collections::BTreeMap;

///
/// MemoryIndexStore
///
/// Indices by identifier, iterated in identifier order. Re-registering an
/// identifier keeps the first index.
///

#[derive(Debug, Default)]
pub struct MemoryIndexStore {
    indices: BTreeMap<Identifier, Index>,
}

impl MemoryIndexStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            indices: BTreeMap::new(),
        }
    }

    /// Returns true if the index was not registered before.
    pub fn add(&mut self, index: &Index) -> bool {
        if self.indices.contains_key(index.id()) {
            return false;
        }
        self.indices.insert(index.id().clone(), index.clone());

        true
    }

    #[must_use]
    pub fn get(&self, index_id: &Identifier) -> Option<&Index> {
        self.indices.get(index_id)
    }

    pub fn try_get(&self, index_id: &Identifier) -> Result<&Index, StoreRegistryError> {
        self.get(index_id)
            .ok_or_else(|| StoreRegistryError::IndexNotFound(index_id.clone()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Index> {
        self.indices.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
