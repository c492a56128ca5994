//! Relational count connector
//!
//! Implements [`CountConnector`](tally_connector::traits::CountConnector)
//! for SQL backends via `sqlx` and PostgreSQL.

pub mod config;
pub mod connector;

pub use config::SqlConfig;
pub use connector::{SqlConnector, SqlConnectorFactory};
