use std::fmt::{Display, Formatter};

use lmdb::Error as LmdbError;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

/// Outcome of a catalog operation as seen by the host.
///
/// Every fallible API in the crate returns `Result<_, AppResponse>`; across the
/// FFI boundary the same value is serialized to JSON, with `Ok` carrying the
/// JSON payload of a successful call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppResponse {
    DatabaseError(String),
    SerializationError(String),
    NotFound(String),
    ValidationError(String),
    BadRequest(String),
    AssetError(String),
    Ok(String),
}

impl Display for AppResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppResponse::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppResponse::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppResponse::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppResponse::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppResponse::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppResponse::AssetError(msg) => write!(f, "Asset error: {}", msg),
            AppResponse::Ok(msg) => write!(f, "Ok: {}", msg),
        }
    }
}

impl std::error::Error for AppResponse {}

impl From<LmdbError> for AppResponse {
    fn from(err: LmdbError) -> Self {
        match err {
            LmdbError::NotFound => AppResponse::NotFound("Key not found in database".to_string()),
            LmdbError::MapFull => {
                AppResponse::DatabaseError("Database map is full, increase map_size".to_string())
            }
            LmdbError::Corrupted | LmdbError::Panic => {
                AppResponse::DatabaseError(format!("Database is corrupted: {}", err))
            }
            LmdbError::Other(code) => AppResponse::DatabaseError(format!("LMDB error code {}", code)),
            _ => AppResponse::DatabaseError(format!("Database error: {}", err)),
        }
    }
}

impl From<SerdeError> for AppResponse {
    fn from(err: SerdeError) -> Self {
        AppResponse::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<std::io::Error> for AppResponse {
    fn from(err: std::io::Error) -> Self {
        AppResponse::AssetError(format!("IO error: {}", err))
    }
}

impl AppResponse {
    pub fn success(msg: impl Into<String>) -> Self {
        AppResponse::Ok(msg.into())
    }

    /// Message without the variant prefix, suitable for inline UI error text.
    pub fn message(&self) -> &str {
        match self {
            AppResponse::DatabaseError(msg)
            | AppResponse::SerializationError(msg)
            | AppResponse::NotFound(msg)
            | AppResponse::ValidationError(msg)
            | AppResponse::BadRequest(msg)
            | AppResponse::AssetError(msg)
            | AppResponse::Ok(msg) => msg,
        }
    }
}
