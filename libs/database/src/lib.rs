//! PostgreSQL connectivity shared by the catalog services.
//!
//! - [`postgres`]: pool configuration, connection (with retry), migrations, health
//! - [`common`]: the unified [`DatabaseError`] and the backoff helpers
//!
//! ```ignore
//! use core_config::FromEnv;
//! use database::postgres::{self, PostgresConfig};
//! use migration::Migrator;
//!
//! let config = PostgresConfig::from_env()?;
//! let db = postgres::connect_from_config_with_retry(config, None).await?;
//! postgres::run_migrations::<Migrator>(&db, "catalog_api").await?;
//! ```

pub mod common;
pub mod postgres;

pub use common::{DatabaseError, DatabaseResult};
