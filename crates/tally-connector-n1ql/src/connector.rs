//! Analytic count connector.
//!
//! Executes templated N1QL count statements through the cluster's HTTP
//! query service. Recognized date placeholders (`$1`, `$tradeDate`)
//! are substituted with a quoted ISO-8601 date literal before the
//! statement is posted.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use tally_connector::error::{ReconError, ReconResult};
use tally_connector::registry::{ConnectorFactory, SharedConnector};
use tally_connector::template::QueryTemplate;
use tally_connector::topology::DataSourceDescriptor;
use tally_connector::traits::CountConnector;
use tally_connector::types::{BackendKind, EntityType};

use crate::config::{N1qlConfig, CONNECT_TIMEOUT_SECS, QUERY_TIMEOUT_SECS};

/// Count connector for analytic-query backends.
pub struct N1qlConnector {
    config: N1qlConfig,
    client: Client,
}

impl std::fmt::Debug for N1qlConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("N1qlConnector")
            .field("config", &self.config)
            .finish()
    }
}

impl N1qlConnector {
    /// Build a connector with a fixed-timeout HTTP client.
    pub fn new(config: N1qlConfig) -> ReconResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(QUERY_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                ReconError::invalid_config(format!(
                    "data source {}: failed to build HTTP client: {e}",
                    config.name
                ))
            })?;

        Ok(Self { config, client })
    }
}

/// Substitute recognized date placeholders with a quoted date literal.
pub(crate) fn substitute_date_literal(statement: &str, date: NaiveDate) -> String {
    let literal = format!("'{}'", date.format("%Y-%m-%d"));
    statement
        .replace("$tradeDate", &literal)
        .replace("$1", &literal)
}

/// Extract the count from a query-service response body.
///
/// Reads the `count` field of the first result row, accepting a JSON
/// number or a numeric string; anything else, or an empty result set,
/// yields 0.
pub(crate) fn count_from_response(body: &Value) -> i64 {
    let Some(row) = body
        .get("results")
        .and_then(Value::as_array)
        .and_then(|rows| rows.first())
    else {
        return 0;
    };

    match row.get("count") {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

#[async_trait]
impl CountConnector for N1qlConnector {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Analytic
    }

    async fn count(
        &self,
        entity_type: EntityType,
        as_of: NaiveDate,
        template: &QueryTemplate,
    ) -> ReconResult<i64> {
        let statement = template
            .as_text()
            .ok_or_else(|| ReconError::TemplateMismatch {
                data_source: self.config.name.clone(),
                expected: "textual",
            })?;

        let statement = substitute_date_literal(statement, as_of);
        debug!(
            data_source = %self.config.name,
            entity_type = %entity_type,
            "executing analytic count"
        );

        let response = self
            .client
            .post(format!("{}/query/service", self.config.endpoint))
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(&json!({ "statement": statement }))
            .send()
            .await
            .map_err(|e| {
                ReconError::connection_with_source(
                    &self.config.name,
                    "query service unreachable",
                    e,
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReconError::query(
                &self.config.name,
                format!("query service returned {status}"),
            ));
        }

        let body: Value = response.json().await.map_err(|e| {
            ReconError::unexpected_shape(
                &self.config.name,
                format!("query service response is not JSON: {e}"),
            )
        })?;

        Ok(count_from_response(&body))
    }
}

/// Factory for analytic connectors.
#[derive(Debug, Default)]
pub struct N1qlConnectorFactory;

#[async_trait]
impl ConnectorFactory for N1qlConnectorFactory {
    fn kind(&self) -> BackendKind {
        BackendKind::Analytic
    }

    async fn create(&self, descriptor: &DataSourceDescriptor) -> ReconResult<SharedConnector> {
        let config = N1qlConfig::from_descriptor(descriptor)?;
        Ok(std::sync::Arc::new(N1qlConnector::new(config)?))
    }
}
