//! Database layer - connection pool and schema
//!
//! Queries themselves go through [`crate::orm::Database`]; this module only
//! opens the pool and creates the tables the models map onto.

pub mod migrations;
pub mod pool;

pub use pool::{create_lazy_pool, create_pool, create_pool_with_options};
