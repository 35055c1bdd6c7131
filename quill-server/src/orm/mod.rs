//! Descriptor-driven micro-ORM
//!
//! Models declare their columns as [`Field`] descriptors. [`ModelMeta`] turns
//! those descriptors into table metadata plus the SELECT/INSERT/UPDATE/DELETE
//! statements, and [`Database`] runs them against a pooled PostgreSQL
//! connection.
//!
//! - SQL is written with `?` placeholders and numbered just before execution
//! - Values travel as [`SqlValue`] so any model can be bound generically
//! - One commit/rollback wrapper; no caching, no identity map

pub mod error;
pub mod executor;
pub mod field;
pub mod model;
pub mod query;
pub mod value;

pub use error::OrmError;
pub use executor::Database;
pub use field::{ColumnType, Field, FieldDefault};
pub use model::{Model, ModelMeta};
pub use query::{FindAll, Limit};
pub use value::SqlValue;
