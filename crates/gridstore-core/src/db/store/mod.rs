//! Module: db::store
//! Responsibility: explicit registries owned by a data store: adapters and
//! indices by identifier, and one ordered row set per index.

mod adapter;
mod index;
mod row;

pub use adapter::MemoryAdapterStore;
pub use index::MemoryIndexStore;
pub(crate) use row::{RowKey, RowSet, StoredRow};

use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    types::Identifier,
};
use thiserror::Error as ThisError;

///
/// StoreRegistryError
///

#[derive(Debug, ThisError)]
pub enum StoreRegistryError {
    #[error("adapter '{0}' not registered")]
    AdapterNotFound(Identifier),

    #[error("index '{0}' not registered")]
    IndexNotFound(Identifier),
}

impl StoreRegistryError {
    pub(crate) const fn class() -> ErrorClass {
        ErrorClass::NotFound
    }
}

impl From<StoreRegistryError> for InternalError {
    fn from(err: StoreRegistryError) -> Self {
        Self::new(
            StoreRegistryError::class(),
            ErrorOrigin::Store,
            err.to_string(),
        )
    }
}
