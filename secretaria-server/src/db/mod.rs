//! Database layer: pool, schema migrations, and per-entity repositories

pub mod migrations;
pub mod pool;
pub mod repos;

pub use pool::{create_pool, create_pool_with_options};
pub use repos::DbError;
