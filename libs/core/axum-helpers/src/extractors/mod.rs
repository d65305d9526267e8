//! Extractors that reject with the standard [`ErrorResponse`](crate::ErrorResponse) body
//! instead of axum's plain-text rejections.

pub mod id_path;
pub mod query_params;

pub use id_path::IdPath;
pub use query_params::QueryParams;
