//! # Count Reconciliation Connector Framework
//!
//! Core abstractions for comparing record counts across heterogeneous
//! data stores: a connector capability trait, per-backend factories, a
//! single-flight connector registry and the query template model.
//!
//! ## Architecture
//!
//! - [`CountConnector`](traits::CountConnector) — executes one count
//!   query against one physical backend instance; one implementation
//!   per [`BackendKind`](types::BackendKind).
//! - [`ConnectorFactory`](registry::ConnectorFactory) — validates
//!   backend-specific connection attributes and builds a pooled
//!   connector.
//! - [`ConnectorRegistry`](registry::ConnectorRegistry) — routes a
//!   backend kind to its factory and memoizes built connectors by
//!   data-source name.
//! - [`resolve_count_query`](resolver::resolve_count_query) — looks up
//!   the per-entity-type query template a data source declares.
//!
//! ## Example
//!
//! ```ignore
//! use tally_connector::prelude::*;
//!
//! let registry = ConnectorRegistry::new(vec![sql_factory, mongo_factory])?;
//! let connector = registry.connector_for(&descriptor).await?;
//! let template = resolve_count_query(&descriptor, EntityType::Order)?;
//! let count = connector.count(EntityType::Order, date, template).await?;
//! ```

pub mod error;
pub mod registry;
pub mod resolver;
pub mod template;
pub mod topology;
pub mod traits;
pub mod types;

/// Prelude module for convenient imports.
///
/// ```
/// use tally_connector::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{ErrorKind, ReconError, ReconResult};
    pub use crate::registry::{ConnectorFactory, ConnectorRegistry, SharedConnector};
    pub use crate::resolver::resolve_count_query;
    pub use crate::template::{CountQuery, QueryTemplate};
    pub use crate::topology::{
        DataSourceDescriptor, ReconciliationConfig, ReconciliationRule, SourceSystem,
    };
    pub use crate::traits::CountConnector;
    pub use crate::types::{BackendKind, EntityType};
}

// Re-export async_trait for connector implementors
pub use async_trait::async_trait;
