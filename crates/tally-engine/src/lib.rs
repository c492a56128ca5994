//! # Count Reconciliation Engine
//!
//! Compares record counts for a business date across pairs of
//! heterogeneous data stores and reports discrepancies. Rule-driven,
//! ad-hoc and batch execution over the
//! [`tally_connector`] framework.
//!
//! ## Data flow
//!
//! rule store → engine → connector registry → factory → connector →
//! count → engine → result sink.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tally_engine::prelude::*;
//! use tally_connector::registry::ConnectorRegistry;
//!
//! let config = loader::load_config(Path::new("reconciliation-config.json"))?;
//! let store = Arc::new(InMemoryRuleStore::from_config(config)?);
//! let registry = Arc::new(ConnectorRegistry::new(factories)?);
//! let engine = ReconciliationEngine::new(store, registry, Arc::new(AuditLogSink));
//!
//! let result = engine.execute_by_rule("orders-daily", trade_date).await?;
//! assert!(result.matched);
//! ```

pub mod engine;
pub mod loader;
pub mod result;
pub mod rules;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::engine::{AdHocRequest, ReconciliationEngine};
    pub use crate::loader::{load_config, parse_config};
    pub use crate::result::{AuditLogSink, ReconciliationResult, ResultSink};
    pub use crate::rules::{InMemoryRuleStore, RuleStore};
}
