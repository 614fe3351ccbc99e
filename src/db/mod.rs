//! Database module
//!
//! SQLite connection pool and schema migrations backing the key-value
//! store.

pub mod connection;
pub mod migrations;

pub use connection::{Database, DbError, DbResult};
