//! Module: db
//! Responsibility: everything between a domain entry and a stored row: row
//! identifiers, encode/decode, filters, queries, statistics, registries and
//! the in-memory store that composes them.

pub mod callback;
pub mod decode;
pub mod encode;
pub mod entry;
pub mod filter;
pub mod memory;
pub mod query;
pub mod row_id;
pub mod stats;
pub mod store;

pub use memory::{MemoryDataStore, PrefixScan, QueryResults};
pub use query::QueryOptions;
