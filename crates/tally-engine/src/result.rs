//! Reconciliation outcome and the audit sink contract.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use tally_connector::topology::ReconciliationRule;
use tally_connector::types::EntityType;

/// Outcome of one cross-system count comparison.
///
/// Immutable once built; `difference` is `|countA − countB|` and
/// `match` holds exactly when the difference is zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    pub rule_name: String,
    pub source_system_a: String,
    pub source_system_b: String,
    pub entity_type: EntityType,
    pub trade_date: NaiveDate,
    pub count_a: i64,
    pub count_b: i64,
    #[serde(rename = "match")]
    pub matched: bool,
    pub difference: i64,
    pub timestamp: DateTime<Utc>,
    /// Data source that produced `countA`.
    pub data_source_a: String,
    /// Data source that produced `countB`.
    pub data_source_b: String,
}

impl ReconciliationResult {
    /// Build a result from the executed rule and both counts.
    #[must_use]
    pub fn from_counts(
        rule: &ReconciliationRule,
        trade_date: NaiveDate,
        count_a: i64,
        count_b: i64,
        data_source_a: impl Into<String>,
        data_source_b: impl Into<String>,
    ) -> Self {
        let difference = (count_a - count_b).abs();
        Self {
            rule_name: rule.name.clone(),
            source_system_a: rule.source_system_a.clone(),
            source_system_b: rule.source_system_b.clone(),
            entity_type: rule.entity_type,
            trade_date,
            count_a,
            count_b,
            matched: difference == 0,
            difference,
            timestamp: Utc::now(),
            data_source_a: data_source_a.into(),
            data_source_b: data_source_b.into(),
        }
    }
}

/// Consumer of finished results.
///
/// Fire-and-forget: `record` is called after a comparison has already
/// succeeded and must not feed failures back into the engine's control
/// flow.
pub trait ResultSink: Send + Sync {
    fn record(&self, result: &ReconciliationResult);
}

/// Sink emitting one structured audit event per result.
#[derive(Debug, Default)]
pub struct AuditLogSink;

impl ResultSink for AuditLogSink {
    fn record(&self, result: &ReconciliationResult) {
        tracing::info!(
            event = "reconciliation_result",
            rule = %result.rule_name,
            source_system_a = %result.source_system_a,
            source_system_b = %result.source_system_b,
            entity_type = %result.entity_type,
            trade_date = %result.trade_date,
            count_a = result.count_a,
            count_b = result.count_b,
            matched = result.matched,
            difference = result.difference,
            data_source_a = %result.data_source_a,
            data_source_b = %result.data_source_b,
            "reconciliation completed"
        );
    }
}
