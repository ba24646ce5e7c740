use crate::{
    MAX_FIELD_BYTES,
    error::{ErrorClass, ErrorOrigin, InternalError},
    types::Identifier,
    value::Value,
};
use std::panic::{AssertUnwindSafe, catch_unwind};
use thiserror::Error as ThisError;

///
/// FieldReadError
///

#[derive(Debug, ThisError)]
pub enum FieldReadError {
    #[error("field '{field}' could not be read: {reason}")]
    Decode { field: Identifier, reason: String },

    #[error("field '{field}' is {len} bytes; fields are limited to {max}", max = MAX_FIELD_BYTES)]
    TooLarge { field: Identifier, len: usize },

    #[error("no reader registered for field '{field}'")]
    NoReader { field: Identifier },
}

impl From<FieldReadError> for InternalError {
    fn from(err: FieldReadError) -> Self {
        let class = match err {
            FieldReadError::Decode { .. } | FieldReadError::TooLarge { .. } => {
                ErrorClass::Corruption
            }
            FieldReadError::NoReader { .. } => ErrorClass::Unsupported,
        };

        Self::new(class, ErrorOrigin::Decode, err.to_string())
    }
}

///
/// FieldWriter
///
/// Writes one field value to bytes and reports the field's own visibility
/// formula for that value (empty = unrestricted).
///

pub trait FieldWriter: Send + Sync {
    fn write_field(&self, value: &Value) -> Result<Vec<u8>, InternalError>;

    fn visibility(&self, _field: &Identifier, _value: &Value) -> Vec<u8> {
        Vec::new()
    }
}

///
/// FieldReader
///

pub trait FieldReader: Send + Sync {
    fn read_field(&self, field: &Identifier, bytes: &[u8]) -> Result<Value, FieldReadError>;
}

///
/// ValueCodec
///
/// Self-describing codec for any `Value` (CBOR). Optionally stamps a fixed
/// visibility formula on every value it writes.
///
/// Reads are bounded by `MAX_FIELD_BYTES`, and a panic inside the CBOR
/// decoder is reported as a decode error instead of unwinding.
///

#[derive(Clone, Debug, Default)]
pub struct ValueCodec {
    visibility: Vec<u8>,
}

impl ValueCodec {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            visibility: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_visibility(visibility: impl Into<Vec<u8>>) -> Self {
        Self {
            visibility: visibility.into(),
        }
    }
}

impl FieldWriter for ValueCodec {
    fn write_field(&self, value: &Value) -> Result<Vec<u8>, InternalError> {
        serde_cbor::to_vec(value).map_err(|err| {
            InternalError::new(ErrorClass::Internal, ErrorOrigin::Encode, err.to_string())
        })
    }

    fn visibility(&self, _field: &Identifier, _value: &Value) -> Vec<u8> {
        self.visibility.clone()
    }
}

impl FieldReader for ValueCodec {
    fn read_field(&self, field: &Identifier, bytes: &[u8]) -> Result<Value, FieldReadError> {
        if bytes.len() > MAX_FIELD_BYTES {
            return Err(FieldReadError::TooLarge {
                field: field.clone(),
                len: bytes.len(),
            });
        }

        let reason = match catch_unwind(AssertUnwindSafe(|| serde_cbor::from_slice(bytes))) {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) => err.to_string(),
            Err(_) => "panic during CBOR decode".to_string(),
        };

        Err(FieldReadError::Decode {
            field: field.clone(),
            reason,
        })
    }
}

///
/// TESTS
///
