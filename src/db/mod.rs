//! Database layer
//!
//! Connection pool management, embedded migrations, and the repository
//! implementations that back the query-assembly and service layers.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, DbPool};
