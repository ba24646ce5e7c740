//! gridstore: a pluggable multi-dimensional data store with field-level
//! visibility and incremental statistics.
//!
//! ## Crate layout
//! - `core`: row-id codec, visibility formulas, entry encoding, filters,
//!   statistics, and the in-memory reference store.
//! - `error`: the public error type every core failure converts into.
//!
//! The `prelude` module exposes the vocabulary needed to define adapters,
//! index strategies and queries, and to drive a store.

pub use gridstore_core as core;

pub mod error;

pub use error::{Error, ErrorKind, ErrorOrigin};

use gridstore_core::{config::StoreConfig, db::MemoryDataStore};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build an empty store from a JSON `StoreConfig`.
pub fn store_from_json<T>(json: &str) -> Result<MemoryDataStore<T>, Error> {
    let config = StoreConfig::from_json(json)?;

    Ok(MemoryDataStore::with_config(config))
}

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::{
        config::StoreConfig,
        db::{
            callback::{IngestCallback, ScanCallback},
            decode::IndexedEncoding,
            filter::{AdapterIdFilter, DataIdFilter, DedupeFilter, FilterList, QueryFilter},
            stats::{Statistic, StatisticKind},
        },
        model::{FieldReader, FieldWriter, ValueCodec},
        obs::{CountingSink, MetricsSink, TracingSink},
        prelude::*,
        types::{ByteRange, MultiDimensionalNumericData},
        visibility::{FieldVisibilityHandler, UniformVisibilityWriter, VisibilityWriter},
    };
    pub use crate::{Error, ErrorKind, ErrorOrigin};
}
