use derive_more::Display;
use gridstore_core::{
    config::ConfigError,
    db::{row_id::RowIdError, stats::StatisticsError, store::StoreRegistryError},
    error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError},
    model::FieldReadError,
    visibility::VisibilityParseError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        Self::new(err.class.into(), err.origin.into(), err.message)
    }
}

// Module errors reach callers through the core classification.
macro_rules! from_core_error {
    ($($err:ty),* $(,)?) => {
        $(
            impl From<$err> for Error {
                fn from(err: $err) -> Self {
                    InternalError::from(err).into()
                }
            }
        )*
    };
}

from_core_error!(
    ConfigError,
    FieldReadError,
    RowIdError,
    StatisticsError,
    StoreRegistryError,
    VisibilityParseError,
);

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// Stored bytes could not be decoded.
    Corruption,

    /// A registered adapter, index or entry does not exist.
    NotFound,

    /// Input the store does not accept (bad config, oversized segment).
    Unsupported,

    /// An internal consistency check failed.
    InvariantViolation,

    /// The caller cannot remediate this.
    Internal,
}

impl From<ErrorClass> for ErrorKind {
    fn from(class: ErrorClass) -> Self {
        match class {
            ErrorClass::Corruption => Self::Corruption,
            ErrorClass::NotFound => Self::NotFound,
            ErrorClass::Unsupported => Self::Unsupported,
            ErrorClass::InvariantViolation => Self::InvariantViolation,
            ErrorClass::Internal => Self::Internal,
        }
    }
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    RowId,
    Visibility,
    Encode,
    Decode,
    Store,
    Statistics,
    Config,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::RowId => Self::RowId,
            CoreErrorOrigin::Visibility => Self::Visibility,
            CoreErrorOrigin::Encode => Self::Encode,
            CoreErrorOrigin::Decode => Self::Decode,
            CoreErrorOrigin::Store => Self::Store,
            CoreErrorOrigin::Statistics => Self::Statistics,
            CoreErrorOrigin::Config => Self::Config,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use gridstore_core::{types::Identifier, visibility::VisibilityExpr};

    #[test]
    fn malformed_row_id_surfaces_as_corruption() {
        let err = gridstore_core::db::row_id::RowId::try_from_raw(&[0x00, 0x01])
            .map_err(Error::from)
            .expect_err("two bytes cannot hold a row id");

        assert_eq!(err.kind, ErrorKind::Corruption);
        assert_eq!(err.origin, ErrorOrigin::RowId);
    }

    #[test]
    fn missing_index_surfaces_as_not_found() {
        let err = Error::from(StoreRegistryError::IndexNotFound(Identifier::from("idx")));

        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.origin, ErrorOrigin::Store);
        assert!(err.to_string().contains("idx"));
    }

    #[test]
    fn visibility_parse_errors_keep_their_origin() {
        let err = VisibilityExpr::parse(b"a&b|c")
            .map_err(Error::from)
            .expect_err("mixed operators must not parse");

        assert_eq!(err.origin, ErrorOrigin::Visibility);
    }

    #[test]
    fn error_serializes_with_kind_and_origin() {
        let err = Error::new(ErrorKind::Unsupported, ErrorOrigin::Config, "bad");
        let json = serde_json::to_string(&err).expect("error should serialize");

        assert_eq!(
            json,
            r#"{"kind":"Unsupported","origin":"Config","message":"bad"}"#
        );
    }
}
