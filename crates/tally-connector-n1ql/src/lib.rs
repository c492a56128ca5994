//! Analytic-query count connector
//!
//! Implements [`CountConnector`](tally_connector::traits::CountConnector)
//! for N1QL-speaking analytic engines via the cluster's HTTP query
//! service.

pub mod config;
pub mod connector;

pub use config::N1qlConfig;
pub use connector::{N1qlConnector, N1qlConnectorFactory};
