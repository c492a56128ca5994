//! Reconciliation orchestration.
//!
//! Stateless request logic over the rule store, the connector registry
//! and the result sink: rule-based, ad-hoc and batch execution.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use tally_connector::error::{ReconError, ReconResult};
use tally_connector::registry::ConnectorRegistry;
use tally_connector::resolver::resolve_count_query;
use tally_connector::topology::{DataSourceDescriptor, ReconciliationRule, SourceSystem};
use tally_connector::types::EntityType;

use crate::result::{ReconciliationResult, ResultSink};
use crate::rules::RuleStore;

/// One-off comparison request, optionally promoted to a persisted rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdHocRequest {
    /// Name for the ephemeral rule; a unique `adhoc-<uuid>` name is
    /// generated when blank.
    #[serde(default)]
    pub rule_name: String,
    pub source_system_a: String,
    pub data_source_a: String,
    pub source_system_b: String,
    pub data_source_b: String,
    pub entity_type: EntityType,
    pub trade_date: NaiveDate,
    #[serde(default = "default_trade_date_field")]
    pub trade_date_field: String,
    /// Whether to add the executed rule to the store afterwards.
    #[serde(default)]
    pub persist_rule: bool,
}

fn default_trade_date_field() -> String {
    "tradeDate".to_string()
}

/// Orchestrates rule lookup, connector and template resolution, count
/// retrieval and result construction.
pub struct ReconciliationEngine {
    store: Arc<dyn RuleStore>,
    registry: Arc<ConnectorRegistry>,
    sink: Arc<dyn ResultSink>,
}

impl ReconciliationEngine {
    /// Create an engine over its collaborators.
    pub fn new(
        store: Arc<dyn RuleStore>,
        registry: Arc<ConnectorRegistry>,
        sink: Arc<dyn ResultSink>,
    ) -> Self {
        Self {
            store,
            registry,
            sink,
        }
    }

    /// Execute a stored rule for one business date.
    pub async fn execute_by_rule(
        &self,
        rule_name: &str,
        trade_date: NaiveDate,
    ) -> ReconResult<ReconciliationResult> {
        let rule = self
            .store
            .rule(rule_name)
            .await
            .ok_or_else(|| ReconError::RuleNotFound {
                name: rule_name.to_string(),
            })?;

        self.execute(&rule, trade_date, None, None).await
    }

    /// Execute a one-off comparison with explicitly chosen data sources.
    pub async fn execute_ad_hoc(
        &self,
        request: &AdHocRequest,
    ) -> ReconResult<ReconciliationResult> {
        self.validate_ad_hoc(request).await?;

        let name = if request.rule_name.trim().is_empty() {
            format!("adhoc-{}", Uuid::new_v4())
        } else {
            request.rule_name.clone()
        };

        let rule = ReconciliationRule {
            name,
            source_system_a: request.source_system_a.clone(),
            source_system_b: request.source_system_b.clone(),
            entity_type: request.entity_type,
            trade_date_field: request.trade_date_field.clone(),
        };

        let result = self
            .execute(
                &rule,
                request.trade_date,
                Some((&request.data_source_a, "dataSourceA")),
                Some((&request.data_source_b, "dataSourceB")),
            )
            .await?;

        if request.persist_rule {
            // Persist under the name the executed result carries.
            let mut persisted = rule;
            persisted.name = result.rule_name.clone();
            self.store.add_rule(persisted).await?;
            info!(rule = %result.rule_name, "ad-hoc rule persisted");
        }

        Ok(result)
    }

    /// Execute every stored rule, in stored order, for one business date.
    ///
    /// A failing rule is logged and skipped; it never aborts the batch.
    /// Surviving results keep the relative order of the rules that
    /// produced them.
    pub async fn execute_all(&self, trade_date: NaiveDate) -> Vec<ReconciliationResult> {
        let rules = self.store.all_rules().await;
        info!(rules = rules.len(), trade_date = %trade_date, "executing all reconciliation rules");

        let mut results = Vec::with_capacity(rules.len());
        for rule in rules {
            match self.execute_by_rule(&rule.name, trade_date).await {
                Ok(result) => {
                    info!(
                        rule = %rule.name,
                        matched = result.matched,
                        difference = result.difference,
                        "rule completed"
                    );
                    results.push(result);
                }
                Err(e) => {
                    error!(
                        rule = %rule.name,
                        kind = %e.kind(),
                        error = %e,
                        "rule execution failed; continuing with remaining rules"
                    );
                }
            }
        }

        results
    }

    /// Shared execution path for rule-based and ad-hoc runs.
    ///
    /// Overrides carry the request field they came from so selection
    /// failures name the offending field.
    async fn execute(
        &self,
        rule: &ReconciliationRule,
        trade_date: NaiveDate,
        override_a: Option<(&str, &'static str)>,
        override_b: Option<(&str, &'static str)>,
    ) -> ReconResult<ReconciliationResult> {
        let system_a = self.resolve_system(&rule.source_system_a).await?;
        let system_b = self.resolve_system(&rule.source_system_b).await?;

        let ds_a = select_data_source(&system_a, rule.entity_type, override_a)?;
        let ds_b = select_data_source(&system_b, rule.entity_type, override_b)?;

        let count_a = self.count_one(ds_a, rule.entity_type, trade_date).await?;
        let count_b = self.count_one(ds_b, rule.entity_type, trade_date).await?;

        let result = ReconciliationResult::from_counts(
            rule,
            trade_date,
            count_a,
            count_b,
            &ds_a.name,
            &ds_b.name,
        );

        self.sink.record(&result);
        Ok(result)
    }

    async fn resolve_system(&self, name: &str) -> ReconResult<SourceSystem> {
        self.store
            .source_system(name)
            .await
            .ok_or_else(|| ReconError::SystemNotFound {
                name: name.to_string(),
            })
    }

    /// Resolve template and connector for one side and fetch its count.
    async fn count_one(
        &self,
        descriptor: &DataSourceDescriptor,
        entity_type: EntityType,
        trade_date: NaiveDate,
    ) -> ReconResult<i64> {
        let template = resolve_count_query(descriptor, entity_type)?;
        let connector = self.registry.connector_for(descriptor).await?;
        connector.count(entity_type, trade_date, template).await
    }

    /// Validate an ad-hoc request before any connector is constructed.
    ///
    /// Each failure is a distinct validation error naming the offending
    /// request field.
    async fn validate_ad_hoc(&self, request: &AdHocRequest) -> ReconResult<()> {
        let system_a = self
            .store
            .source_system(&request.source_system_a)
            .await
            .ok_or_else(|| {
                ReconError::validation(
                    "sourceSystemA",
                    format!("source system not found: {}", request.source_system_a),
                )
            })?;
        validate_side(&system_a, &request.data_source_a, request.entity_type, "dataSourceA")?;

        let system_b = self
            .store
            .source_system(&request.source_system_b)
            .await
            .ok_or_else(|| {
                ReconError::validation(
                    "sourceSystemB",
                    format!("source system not found: {}", request.source_system_b),
                )
            })?;
        validate_side(&system_b, &request.data_source_b, request.entity_type, "dataSourceB")?;

        Ok(())
    }
}

fn validate_side(
    system: &SourceSystem,
    data_source: &str,
    entity_type: EntityType,
    field: &'static str,
) -> ReconResult<()> {
    let descriptor = system.data_source(data_source).ok_or_else(|| {
        ReconError::validation(field, format!("data source not found: {data_source}"))
    })?;

    if !descriptor.supports(entity_type) {
        return Err(ReconError::validation(
            field,
            format!("data source '{data_source}' doesn't support {entity_type}"),
        ));
    }

    Ok(())
}

/// Select the data source for one side of a comparison.
///
/// An override must match by name and support the entity type;
/// otherwise the first descriptor in the system's declared order
/// supporting the entity type is chosen.
fn select_data_source<'a>(
    system: &'a SourceSystem,
    entity_type: EntityType,
    preferred: Option<(&str, &'static str)>,
) -> ReconResult<&'a DataSourceDescriptor> {
    match preferred {
        Some((name, field)) => system
            .data_source(name)
            .filter(|ds| ds.supports(entity_type))
            .ok_or_else(|| {
                ReconError::validation(
                    field,
                    format!("data source '{name}' not found or doesn't support {entity_type}"),
                )
            }),
        None => {
            system
                .first_supporting(entity_type)
                .ok_or_else(|| ReconError::NoDataSource {
                    system: system.name.clone(),
                    entity_type,
                })
        }
    }
}
