//! Count query templates.
//!
//! A count query is either a textual statement (SQL, N1QL) or a
//! structured filter document (document stores). The wire form is
//! `{"count": <string|object>, "parameters": {..}}`, keyed by entity
//! type name in a data source's query map.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The count definition itself: textual statement or filter document.
///
/// Untagged on the wire: a JSON string deserializes to [`CountQuery::Text`],
/// a JSON object to [`CountQuery::Filter`]. Exactly one variant is ever
/// populated by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CountQuery {
    /// SQL / analytic-engine statement with named or positional
    /// date placeholders.
    Text(String),
    /// Filter document for a document store; may contain the
    /// `?tradeDate` sentinel at any depth.
    Filter(serde_json::Value),
}

/// Per-entity-type count query definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryTemplate {
    /// The count query.
    pub count: CountQuery,

    /// Optional named parameters for the query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<HashMap<String, String>>,
}

impl QueryTemplate {
    /// Create a textual template.
    pub fn text(statement: impl Into<String>) -> Self {
        Self {
            count: CountQuery::Text(statement.into()),
            parameters: None,
        }
    }

    /// Create a filter-document template.
    #[must_use]
    pub fn filter(document: serde_json::Value) -> Self {
        Self {
            count: CountQuery::Filter(document),
            parameters: None,
        }
    }

    /// The textual statement, if this is a text template.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match &self.count {
            CountQuery::Text(s) => Some(s),
            CountQuery::Filter(_) => None,
        }
    }

    /// The filter document, if this is a filter template.
    #[must_use]
    pub fn as_filter(&self) -> Option<&serde_json::Value> {
        match &self.count {
            CountQuery::Text(_) => None,
            CountQuery::Filter(v) => Some(v),
        }
    }
}
