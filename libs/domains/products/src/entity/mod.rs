//! SeaORM entities for the catalog tables

pub mod favorite;
pub mod product;
pub mod product_image;
