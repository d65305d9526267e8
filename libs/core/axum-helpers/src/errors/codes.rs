//! Type-safe error codes for API responses.
//!
//! Each code carries a client-facing identifier (e.g. `"NOT_FOUND"`), an
//! integer for logs and monitoring (e.g. `1004`) and a default message.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::NotFound;
//! assert_eq!(code.as_str(), "NOT_FOUND");
//! assert_eq!(code.code(), 1004);
//! assert_eq!(code.default_message(), "Resource not found");
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request is malformed
    BadRequest,

    /// Query string could not be deserialized
    InvalidQuery,

    /// Path parameter has the wrong shape (e.g. a non-numeric id)
    InvalidPathParameter,

    /// Requested resource was not found
    NotFound,

    /// A required file upload was absent or empty
    MissingUpload,

    /// Request body exceeds the route's size limit
    PayloadTooLarge,

    // Server errors (1000s)
    /// An unexpected internal server error occurred
    InternalError,

    /// Service is temporarily unavailable
    ServiceUnavailable,

    // Database errors (2000-2999)
    /// Database query failed
    DatabaseError,

    /// No database connection could be acquired
    DatabaseUnavailable,
}

impl ErrorCode {
    /// SCREAMING_SNAKE_CASE identifier for clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BadRequest => "BAD_REQUEST",
            Self::InvalidQuery => "INVALID_QUERY",
            Self::InvalidPathParameter => "INVALID_PATH_PARAMETER",
            Self::NotFound => "NOT_FOUND",
            Self::MissingUpload => "MISSING_UPLOAD",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::DatabaseUnavailable => "DATABASE_UNAVAILABLE",
        }
    }

    /// Integer code for structured logs and metrics.
    ///
    /// - 1000-1999: client and generic server errors
    /// - 2000-2999: database errors
    pub fn code(&self) -> i32 {
        match self {
            // Client errors (1000-1999)
            Self::BadRequest => 1001,
            Self::InvalidQuery => 1002,
            Self::InvalidPathParameter => 1003,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::MissingUpload => 1006,
            Self::PayloadTooLarge => 1007,
            Self::ServiceUnavailable => 1011,

            // Database errors (2000-2999)
            Self::DatabaseError => 2003,
            Self::DatabaseUnavailable => 2013,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::BadRequest => "The request is malformed",
            Self::InvalidQuery => "Invalid query parameters",
            Self::InvalidPathParameter => "Invalid path parameter",
            Self::NotFound => "Resource not found",
            Self::MissingUpload => "No file was uploaded",
            Self::PayloadTooLarge => "The request body is too large",
            Self::InternalError => "An internal server error occurred",
            Self::ServiceUnavailable => "Service is temporarily unavailable",
            Self::DatabaseError => "Database error occurred",
            Self::DatabaseUnavailable => "Database is temporarily unavailable",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
