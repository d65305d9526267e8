use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::{AppError, ErrorCode};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

/// Message the mobile client shows when an image search arrives without a photo
pub const NO_IMAGE_RECEIVED: &str = "Aucune image reçue";

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("{}", NO_IMAGE_RECEIVED)]
    MissingImage,

    #[error("Image exceeds {limit} bytes")]
    ImageTooLarge { limit: usize },

    #[error("Product not found: {0}")]
    NotFound(i64),

    #[error("Product store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl From<DbErr> for ProductError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => {
                ProductError::StoreUnavailable(err.to_string())
            }
            other => ProductError::Database(other.to_string()),
        }
    }
}

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::MissingImage => AppError::BadRequest(NO_IMAGE_RECEIVED.to_string()),
            err @ ProductError::ImageTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ProductError::NotFound(id) => AppError::NotFound(format!("Product {} not found", id)),
            ProductError::StoreUnavailable(msg) => {
                tracing::warn!(error_code = ErrorCode::DatabaseUnavailable.code(), "{}", msg);
                AppError::ServiceUnavailable(
                    ErrorCode::DatabaseUnavailable.default_message().to_string(),
                )
            }
            ProductError::Database(msg) => {
                tracing::error!(error_code = ErrorCode::DatabaseError.code(), "{}", msg);
                AppError::InternalServerError(ErrorCode::DatabaseError.default_message().to_string())
            }
        }
    }
}

/// `{"error": "..."}`, the body the mobile client parses for upload failures
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UploadErrorBody {
    pub error: String,
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        match self {
            ProductError::MissingImage => {
                tracing::info!(
                    error_code = ErrorCode::MissingUpload.code(),
                    "Image search rejected: no image"
                );
                let body = UploadErrorBody {
                    error: NO_IMAGE_RECEIVED.to_string(),
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            other => AppError::from(other).into_response(),
        }
    }
}
