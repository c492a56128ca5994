//! Source-system topology and rule wire types.
//!
//! Loaded once from configuration at startup and immutable for the
//! process lifetime. Field names are the wire contract.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::template::QueryTemplate;
use crate::types::{BackendKind, EntityType};

/// One physical backend instance inside a source system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceDescriptor {
    /// Unique name within the owning system; also the connector cache key.
    pub name: String,

    /// Backend kind, selecting the connector factory.
    #[serde(rename = "type")]
    pub kind: BackendKind,

    /// Opaque backend-specific connection attributes.
    #[serde(rename = "connectionConfig", default)]
    pub connection: serde_json::Map<String, serde_json::Value>,

    /// Entity types this data source holds.
    #[serde(default)]
    pub entity_types: Vec<EntityType>,

    /// Count query per entity type name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queries: Option<HashMap<String, QueryTemplate>>,
}

impl DataSourceDescriptor {
    /// Whether this data source declares support for the entity type.
    #[must_use]
    pub fn supports(&self, entity_type: EntityType) -> bool {
        self.entity_types.contains(&entity_type)
    }

    /// A string-valued connection attribute, if present.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.connection.get(key).and_then(|v| v.as_str())
    }
}

/// A named logical system holding an ordered list of data sources.
///
/// Descriptor order is the configuration author's declared order; the
/// engine picks the first supporting descriptor when no explicit
/// data source is requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSystem {
    pub name: String,
    pub data_sources: Vec<DataSourceDescriptor>,
}

impl SourceSystem {
    /// Find a data source by name.
    #[must_use]
    pub fn data_source(&self, name: &str) -> Option<&DataSourceDescriptor> {
        self.data_sources.iter().find(|ds| ds.name == name)
    }

    /// First data source, in declared order, supporting the entity type.
    #[must_use]
    pub fn first_supporting(&self, entity_type: EntityType) -> Option<&DataSourceDescriptor> {
        self.data_sources.iter().find(|ds| ds.supports(entity_type))
    }
}

/// Persistent definition of a cross-system comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationRule {
    /// Unique rule name.
    pub name: String,
    pub source_system_a: String,
    pub source_system_b: String,
    pub entity_type: EntityType,
    /// Name of the business-date field in the backing stores.
    #[serde(default = "default_trade_date_field")]
    pub trade_date_field: String,
}

pub(crate) fn default_trade_date_field() -> String {
    "tradeDate".to_string()
}

/// Top-level reconciliation configuration: topology plus rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationConfig {
    pub source_systems: Vec<SourceSystem>,
    #[serde(default)]
    pub reconciliation_rules: Vec<ReconciliationRule>,
}

impl ReconciliationConfig {
    /// Find a source system by name.
    #[must_use]
    pub fn source_system(&self, name: &str) -> Option<&SourceSystem> {
        self.source_systems.iter().find(|s| s.name == name)
    }
}
