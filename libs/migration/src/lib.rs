pub use sea_orm_migration::prelude::*;

mod m20260301_000000_bootstrap;
mod m20260301_000001_create_products;
mod m20260301_000002_create_product_images;
mod m20260301_000003_create_favorites;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000000_bootstrap::Migration),
            Box::new(m20260301_000001_create_products::Migration),
            Box::new(m20260301_000002_create_product_images::Migration),
            Box::new(m20260301_000003_create_favorites::Migration),
        ]
    }
}
