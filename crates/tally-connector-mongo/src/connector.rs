//! Document-store count connector.
//!
//! Executes a `count_documents` against the collection mapped to the
//! entity type, after substituting the `?tradeDate` sentinel anywhere
//! in the filter document with the formatted business date.

use async_trait::async_trait;
use bson::Document;
use chrono::NaiveDate;
use mongodb::Client;
use serde_json::Value;
use tracing::debug;

use tally_connector::error::{ReconError, ReconResult};
use tally_connector::registry::{ConnectorFactory, SharedConnector};
use tally_connector::template::QueryTemplate;
use tally_connector::topology::DataSourceDescriptor;
use tally_connector::traits::CountConnector;
use tally_connector::types::{BackendKind, EntityType};

use crate::config::MongoConfig;

/// Sentinel token replaced with the business date.
const DATE_SENTINEL: &str = "?tradeDate";

/// Count connector for document-store backends.
pub struct MongoConnector {
    config: MongoConfig,
    client: Client,
}

impl std::fmt::Debug for MongoConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoConnector")
            .field("name", &self.config.name)
            .field("database", &self.config.database)
            .finish()
    }
}

impl MongoConnector {
    /// Create a connector over an already-built client.
    #[must_use]
    pub fn new(config: MongoConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Resolve the filter document from the template.
    ///
    /// A `Filter` template is used as-is. A `Text` template whose body
    /// parses as a JSON object is accepted too; anything else is a
    /// template mismatch.
    fn filter_from(&self, template: &QueryTemplate) -> ReconResult<Value> {
        if let Some(filter) = template.as_filter() {
            return Ok(filter.clone());
        }
        if let Some(text) = template.as_text() {
            if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(text) {
                return Ok(value);
            }
        }
        Err(ReconError::TemplateMismatch {
            data_source: self.config.name.clone(),
            expected: "filter-document",
        })
    }
}

/// Replace the `?tradeDate` sentinel throughout a filter document.
///
/// Walks objects, arrays and scalars. A string equal to the sentinel
/// becomes the date; a string containing it gets an in-place
/// replacement. Structures without the sentinel are returned unchanged,
/// so substitution is idempotent.
pub(crate) fn substitute_trade_date(value: &Value, date: &str) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), substitute_trade_date(v, date)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| substitute_trade_date(item, date))
                .collect(),
        ),
        Value::String(s) if s == DATE_SENTINEL => Value::String(date.to_string()),
        Value::String(s) if s.contains(DATE_SENTINEL) => {
            Value::String(s.replace(DATE_SENTINEL, date))
        }
        other => other.clone(),
    }
}

#[async_trait]
impl CountConnector for MongoConnector {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Document
    }

    async fn count(
        &self,
        entity_type: EntityType,
        as_of: NaiveDate,
        template: &QueryTemplate,
    ) -> ReconResult<i64> {
        let collection_name =
            self.config
                .collections
                .get(entity_type.as_str())
                .ok_or_else(|| {
                    ReconError::invalid_config(format!(
                        "data source {}: no collection mapped for entity type {entity_type}",
                        self.config.name
                    ))
                })?;

        let filter = self.filter_from(template)?;
        let resolved = substitute_trade_date(&filter, &as_of.format("%Y-%m-%d").to_string());

        let filter_doc: Document = bson::to_document(&resolved).map_err(|e| {
            ReconError::query_with_source(&self.config.name, "filter is not a valid document", e)
        })?;

        debug!(
            data_source = %self.config.name,
            entity_type = %entity_type,
            collection = %collection_name,
            "executing document count"
        );

        let count = self
            .client
            .database(&self.config.database)
            .collection::<Document>(collection_name)
            .count_documents(filter_doc)
            .await
            .map_err(|e| {
                ReconError::query_with_source(&self.config.name, "count_documents failed", e)
            })?;

        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}

/// Factory for document-store connectors.
#[derive(Debug, Default)]
pub struct MongoConnectorFactory;

#[async_trait]
impl ConnectorFactory for MongoConnectorFactory {
    fn kind(&self) -> BackendKind {
        BackendKind::Document
    }

    async fn create(&self, descriptor: &DataSourceDescriptor) -> ReconResult<SharedConnector> {
        let config = MongoConfig::from_descriptor(descriptor)?;
        let client = Client::with_uri_str(&config.uri).await.map_err(|e| {
            ReconError::connection_with_source(
                &descriptor.name,
                "invalid MongoDB connection uri",
                e,
            )
        })?;
        Ok(std::sync::Arc::new(MongoConnector::new(config, client)))
    }
}
