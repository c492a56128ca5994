//! Connector capability trait.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::ReconResult;
use crate::template::QueryTemplate;
use crate::types::{BackendKind, EntityType};

/// Adapter executing count queries against one physical backend instance.
///
/// One implementation exists per [`BackendKind`]. Implementations own
/// pooled backend resources, issue exactly one query per `count` call
/// and never cache query results. Backend timeouts are fixed at
/// construction and not renegotiable per call.
#[async_trait]
pub trait CountConnector: Send + Sync {
    /// The data-source name this connector was built for.
    fn name(&self) -> &str;

    /// The backend kind this connector talks to.
    fn kind(&self) -> BackendKind;

    /// Execute the count query for one entity type and business date.
    ///
    /// Fails with a configuration error when `template`'s variant does
    /// not match what this backend expects (e.g. a filter document
    /// supplied to a relational connector), and with a connector error
    /// when the backend query itself fails.
    async fn count(
        &self,
        entity_type: EntityType,
        as_of: NaiveDate,
        template: &QueryTemplate,
    ) -> ReconResult<i64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReconError;

    // Minimal in-memory connector used to exercise the trait object.
    struct FixedCountConnector {
        name: String,
        count: i64,
    }

    #[async_trait]
    impl CountConnector for FixedCountConnector {
        fn name(&self) -> &str {
            &self.name
        }

        fn kind(&self) -> BackendKind {
            BackendKind::Relational
        }

        async fn count(
            &self,
            _entity_type: EntityType,
            _as_of: NaiveDate,
            template: &QueryTemplate,
        ) -> ReconResult<i64> {
            template
                .as_text()
                .ok_or_else(|| ReconError::TemplateMismatch {
                    data_source: self.name.clone(),
                    expected: "textual",
                })?;
            Ok(self.count)
        }
    }

    #[tokio::test]
    async fn test_count_through_trait_object() {
        let connector: Box<dyn CountConnector> = Box::new(FixedCountConnector {
            name: "orders-db".to_string(),
            count: 42,
        });

        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let count = connector
            .count(EntityType::Order, date, &QueryTemplate::text("SELECT 1"))
            .await
            .unwrap();
        assert_eq!(count, 42);
        assert_eq!(connector.name(), "orders-db");
    }

    #[tokio::test]
    async fn test_template_mismatch_is_configuration() {
        let connector = FixedCountConnector {
            name: "orders-db".to_string(),
            count: 0,
        };
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let err = connector
            .count(
                EntityType::Order,
                date,
                &QueryTemplate::filter(serde_json::json!({})),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }
}
