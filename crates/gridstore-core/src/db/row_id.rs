//! Module: db::row_id
//! Responsibility: binary layout of row identifiers.
//!
//! Layout (all lengths big-endian):
//! `insertion_key | data_id | adapter_id | data_id_len:u32 | adapter_id_len:u32 | duplicates:i32`
//!
//! The insertion key leads so that row-id byte order follows insertion-key
//! order. The fixed trailer makes decode unambiguous: the insertion key is
//! whatever remains once both length-prefixed segments are accounted for.

use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    types::Identifier,
};
use thiserror::Error as ThisError;

/// Duplicate count marking a row whose entry opted out of deduplication.
pub const DEDUPLICATION_DISABLED: i32 = -1;

const LEN_BYTES: usize = 4;
const DUPLICATES_BYTES: usize = 4;

///
/// RowIdError
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum RowIdError {
    #[error("malformed row id: {len} bytes, trailer needs {min}")]
    TooShort { len: usize, min: usize },

    #[error(
        "malformed row id: segments of {data_len} + {adapter_len} bytes exceed {available} available"
    )]
    SegmentOverflow {
        data_len: u64,
        adapter_len: u64,
        available: usize,
    },

    #[error("row id segment '{segment}' is {len} bytes; segments are limited to u32 lengths")]
    SegmentTooLong { segment: &'static str, len: usize },
}

impl RowIdError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::TooShort { .. } | Self::SegmentOverflow { .. } => ErrorClass::Corruption,
            Self::SegmentTooLong { .. } => ErrorClass::Unsupported,
        }
    }
}

impl From<RowIdError> for InternalError {
    fn from(err: RowIdError) -> Self {
        Self::new(err.class(), ErrorOrigin::RowId, err.to_string())
    }
}

///
/// RowId
///
/// Decoded row identifier. `(insertion_key, data_id, adapter_id)` is the
/// identity of a row; the duplicate count is advisory.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RowId {
    insertion_key: Identifier,
    data_id: Identifier,
    adapter_id: Identifier,
    duplicate_count: i32,
}

impl RowId {
    /// Fixed trailer size in bytes.
    pub const TRAILER_BYTES: usize = 2 * LEN_BYTES + DUPLICATES_BYTES;

    #[must_use]
    pub const fn new(
        insertion_key: Identifier,
        data_id: Identifier,
        adapter_id: Identifier,
        duplicate_count: i32,
    ) -> Self {
        Self {
            insertion_key,
            data_id,
            adapter_id,
            duplicate_count,
        }
    }

    #[must_use]
    pub const fn insertion_key(&self) -> &Identifier {
        &self.insertion_key
    }

    #[must_use]
    pub const fn data_id(&self) -> &Identifier {
        &self.data_id
    }

    #[must_use]
    pub const fn adapter_id(&self) -> &Identifier {
        &self.adapter_id
    }

    #[must_use]
    pub const fn duplicate_count(&self) -> i32 {
        self.duplicate_count
    }

    #[must_use]
    pub const fn is_deduplication_enabled(&self) -> bool {
        self.duplicate_count >= 0
    }

    pub fn to_raw(&self) -> Result<RawRowId, RowIdError> {
        let data_len = segment_len("data_id", self.data_id.len())?;
        let adapter_len = segment_len("adapter_id", self.adapter_id.len())?;

        let mut bytes = Vec::with_capacity(
            self.insertion_key.len()
                + self.data_id.len()
                + self.adapter_id.len()
                + Self::TRAILER_BYTES,
        );
        bytes.extend_from_slice(self.insertion_key.as_bytes());
        bytes.extend_from_slice(self.data_id.as_bytes());
        bytes.extend_from_slice(self.adapter_id.as_bytes());
        bytes.extend_from_slice(&data_len.to_be_bytes());
        bytes.extend_from_slice(&adapter_len.to_be_bytes());
        bytes.extend_from_slice(&self.duplicate_count.to_be_bytes());

        Ok(RawRowId(bytes))
    }

    pub fn try_from_raw(bytes: &[u8]) -> Result<Self, RowIdError> {
        let Some(body_len) = bytes.len().checked_sub(Self::TRAILER_BYTES) else {
            return Err(RowIdError::TooShort {
                len: bytes.len(),
                min: Self::TRAILER_BYTES,
            });
        };

        let trailer = &bytes[body_len..];
        let data_len = read_u32(&trailer[..LEN_BYTES]);
        let adapter_len = read_u32(&trailer[LEN_BYTES..2 * LEN_BYTES]);
        let duplicate_count =
            i32::from_be_bytes([trailer[8], trailer[9], trailer[10], trailer[11]]);

        let overflow = || RowIdError::SegmentOverflow {
            data_len: u64::from(data_len),
            adapter_len: u64::from(adapter_len),
            available: body_len,
        };
        let data_len = usize::try_from(data_len).map_err(|_| overflow())?;
        let adapter_len = usize::try_from(adapter_len).map_err(|_| overflow())?;
        let segments = data_len
            .checked_add(adapter_len)
            .filter(|total| *total <= body_len)
            .ok_or_else(overflow)?;

        let key_end = body_len - segments;
        let data_end = key_end + data_len;

        Ok(Self {
            insertion_key: Identifier::from(&bytes[..key_end]),
            data_id: Identifier::from(&bytes[key_end..data_end]),
            adapter_id: Identifier::from(&bytes[data_end..body_len]),
            duplicate_count,
        })
    }
}

///
/// RawRowId
///
/// Encoded row identifier as stored and returned to callers.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RawRowId(Vec<u8>);

impl RawRowId {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Identity bytes: the row id without its trailing duplicate count.
    #[must_use]
    pub fn identity(&self) -> &[u8] {
        identity_of(&self.0)
    }

    pub fn decode(&self) -> Result<RowId, RowIdError> {
        RowId::try_from_raw(&self.0)
    }
}

impl AsRef<[u8]> for RawRowId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Identity bytes of an encoded row id. Input no longer than the duplicate
/// field has an empty identity.
#[must_use]
pub fn identity_of(bytes: &[u8]) -> &[u8] {
    &bytes[..bytes.len().saturating_sub(DUPLICATES_BYTES)]
}

fn segment_len(segment: &'static str, len: usize) -> Result<u32, RowIdError> {
    u32::try_from(len).map_err(|_| RowIdError::SegmentTooLong { segment, len })
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

///
/// TESTS
///
