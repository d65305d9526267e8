//! Products API routes

use axum::Router;
use domain_products::{
    PgFavoriteRepository, PgProductImageRepository, PgProductRepository, ProductService, handlers,
};

use crate::state::AppState;

/// Create products router backed by PostgreSQL
pub fn router(state: &AppState) -> Router {
    let service = ProductService::new(
        PgProductRepository::new(state.db.clone()),
        PgProductImageRepository::new(state.db.clone()),
        PgFavoriteRepository::new(state.db.clone()),
    );
    handlers::router(service)
}
