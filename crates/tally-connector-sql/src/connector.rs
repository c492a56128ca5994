//! Relational count connector.
//!
//! Executes textual count statements against PostgreSQL through a
//! fixed-policy `sqlx` pool. Named date placeholders (`:tradeDate`,
//! `:trade_date`) are rewritten to the positional `$1` marker and the
//! business date is bound once.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::debug;

use tally_connector::error::{ReconError, ReconResult};
use tally_connector::registry::{ConnectorFactory, SharedConnector};
use tally_connector::template::QueryTemplate;
use tally_connector::topology::DataSourceDescriptor;
use tally_connector::traits::CountConnector;
use tally_connector::types::{BackendKind, EntityType};

use crate::config::{
    SqlConfig, ACQUIRE_TIMEOUT_SECS, IDLE_TIMEOUT_SECS, MAX_CONNECTIONS, MAX_LIFETIME_SECS,
    MIN_CONNECTIONS,
};

/// Count connector for relational backends.
pub struct SqlConnector {
    config: SqlConfig,
    pool: PgPool,
}

impl std::fmt::Debug for SqlConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlConnector")
            .field("config", &self.config)
            .finish()
    }
}

impl SqlConnector {
    /// Build a connector with a lazily-connecting pool.
    ///
    /// No I/O happens here; the first `count` call establishes
    /// connections.
    pub fn new(config: SqlConfig) -> ReconResult<Self> {
        let options = PgConnectOptions::from_str(&config.url)
            .map_err(|e| {
                ReconError::invalid_config(format!(
                    "data source {}: invalid connection url: {e}",
                    config.name
                ))
            })?
            .username(&config.username)
            .password(&config.password);

        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .min_connections(MIN_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
            .idle_timeout(Duration::from_secs(IDLE_TIMEOUT_SECS))
            .max_lifetime(Duration::from_secs(MAX_LIFETIME_SECS))
            .connect_lazy_with(options);

        Ok(Self { config, pool })
    }
}

/// Rewrite named date placeholders to the positional `$1` marker.
///
/// Every occurrence maps to the same bound parameter, so a statement
/// may reference the date more than once.
pub(crate) fn rewrite_date_placeholders(statement: &str) -> String {
    statement
        .replace(":tradeDate", "$1")
        .replace(":trade_date", "$1")
}

#[async_trait]
impl CountConnector for SqlConnector {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn kind(&self) -> BackendKind {
        BackendKind::Relational
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

        let sql = rewrite_date_placeholders(statement);
        debug!(
            data_source = %self.config.name,
            entity_type = %entity_type,
            as_of = %as_of,
            "executing relational count"
        );

        let count: Option<i64> = sqlx::query_scalar(&sql)
            .bind(as_of)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::ColumnDecode { .. } => ReconError::unexpected_shape(
                    &self.config.name,
                    "first result column is not an integer count",
                ),
                other => ReconError::query_with_source(
                    &self.config.name,
                    "count statement failed",
                    other,
                ),
            })?;

        Ok(count.unwrap_or(0))
    }
}

/// Factory for relational connectors.
#[derive(Debug, Default)]
pub struct SqlConnectorFactory;

#[async_trait]
impl ConnectorFactory for SqlConnectorFactory {
    fn kind(&self) -> BackendKind {
        BackendKind::Relational
    }

    async fn create(&self, descriptor: &DataSourceDescriptor) -> ReconResult<SharedConnector> {
        let config = SqlConfig::from_descriptor(descriptor)?;
        Ok(std::sync::Arc::new(SqlConnector::new(config)?))
    }
}
