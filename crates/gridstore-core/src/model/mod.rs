//! Host-supplied capabilities: adapters, index strategies, index models and
//! field codecs.

pub mod adapter;
pub mod field;
pub mod index;

pub use adapter::{AdapterEncoding, DataAdapter};
pub use field::{FieldReadError, FieldReader, FieldWriter, ValueCodec};
pub use index::{Index, IndexField, IndexModel, IndexStrategy};
