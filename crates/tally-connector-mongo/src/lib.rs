//! Document-store count connector
//!
//! Implements [`CountConnector`](tally_connector::traits::CountConnector)
//! for MongoDB-style document stores: structured filter templates with
//! `?tradeDate` sentinel substitution, counted per entity-type
//! collection.

pub mod config;
pub mod connector;

pub use config::MongoConfig;
pub use connector::{MongoConnector, MongoConnectorFactory};
