//! Core engine for gridstore: row-id codec, visibility formulas, entry
//! encoding, query filters, statistics, and the in-memory reference store.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod obs;
pub mod types;
pub mod value;
pub mod visibility;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// CONSTANTS
///

/// Upper bound on a single encoded field payload accepted by the decoder.
pub const MAX_FIELD_BYTES: usize = 4 * 1024 * 1024;

///
/// Prelude
///
/// Domain vocabulary plus the reference store.
/// Errors, codecs, and statistics internals stay one module level down.
///

pub mod prelude {
    pub use crate::{
        db::{
            MemoryDataStore, QueryOptions,
            entry::EntryInfo,
            query::{EverythingQuery, Query},
            row_id::RowId,
        },
        model::{AdapterEncoding, DataAdapter, Index, IndexField, IndexModel, IndexStrategy},
        types::{Identifier, NumericRange},
        value::{PersistentDataset, PersistentValue, Value},
        visibility::Authorizations,
    };
}
