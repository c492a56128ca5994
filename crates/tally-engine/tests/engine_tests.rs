//! End-to-end engine tests over mock connectors.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use tally_connector::error::{ErrorKind, ReconError, ReconResult};
use tally_connector::registry::{ConnectorFactory, ConnectorRegistry, SharedConnector};
use tally_connector::template::QueryTemplate;
use tally_connector::topology::{
    DataSourceDescriptor, ReconciliationConfig, ReconciliationRule, SourceSystem,
};
use tally_connector::traits::CountConnector;
use tally_connector::types::{BackendKind, EntityType};
use tally_engine::engine::{AdHocRequest, ReconciliationEngine};
use tally_engine::result::{ReconciliationResult, ResultSink};
use tally_engine::rules::{InMemoryRuleStore, RuleStore};

struct MockConnector {
    name: String,
    count: i64,
    fail: bool,
}

#[async_trait]
impl CountConnector for MockConnector {
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
        _template: &QueryTemplate,
    ) -> ReconResult<i64> {
        if self.fail {
            Err(ReconError::query(&self.name, "backend unavailable"))
        } else {
            Ok(self.count)
        }
    }
}

/// Factory serving canned counts per data-source name.
struct MockFactory {
    counts: HashMap<String, i64>,
    failing: HashSet<String>,
    invocations: Arc<AtomicUsize>,
}

#[async_trait]
impl ConnectorFactory for MockFactory {
    fn kind(&self) -> BackendKind {
        BackendKind::Relational
    }

    async fn create(&self, descriptor: &DataSourceDescriptor) -> ReconResult<SharedConnector> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockConnector {
            name: descriptor.name.clone(),
            count: self.counts.get(&descriptor.name).copied().unwrap_or(0),
            fail: self.failing.contains(&descriptor.name),
        }))
    }
}

#[derive(Default)]
struct CollectingSink {
    recorded: Mutex<Vec<ReconciliationResult>>,
}

impl ResultSink for CollectingSink {
    fn record(&self, result: &ReconciliationResult) {
        self.recorded.lock().unwrap().push(result.clone());
    }
}

fn descriptor(name: &str, entity_types: Vec<EntityType>) -> DataSourceDescriptor {
    let queries = entity_types
        .iter()
        .map(|et| {
            (
                et.as_str().to_string(),
                QueryTemplate::text(format!(
                    "SELECT COUNT(*) FROM {} WHERE trade_date = :tradeDate",
                    et.as_str().to_ascii_lowercase()
                )),
            )
        })
        .collect();

    DataSourceDescriptor {
        name: name.to_string(),
        kind: BackendKind::Relational,
        connection: serde_json::Map::new(),
        entity_types,
        queries: Some(queries),
    }
}

fn rule(name: &str, entity_type: EntityType) -> ReconciliationRule {
    ReconciliationRule {
        name: name.to_string(),
        source_system_a: "system-a".to_string(),
        source_system_b: "system-b".to_string(),
        entity_type,
        trade_date_field: "tradeDate".to_string(),
    }
}

struct Harness {
    engine: ReconciliationEngine,
    store: Arc<InMemoryRuleStore>,
    sink: Arc<CollectingSink>,
    factory_invocations: Arc<AtomicUsize>,
}

fn harness(
    rules: Vec<ReconciliationRule>,
    counts: HashMap<String, i64>,
    failing: HashSet<String>,
) -> Harness {
    let config = ReconciliationConfig {
        source_systems: vec![
            SourceSystem {
                name: "system-a".to_string(),
                data_sources: vec![
                    descriptor("a-orders", vec![EntityType::Order]),
                    descriptor("a-quotes", vec![EntityType::Quote]),
                    descriptor("a-trades", vec![EntityType::Trade]),
                ],
            },
            SourceSystem {
                name: "system-b".to_string(),
                data_sources: vec![
                    descriptor("b-orders", vec![EntityType::Order]),
                    descriptor("b-quotes", vec![EntityType::Quote]),
                    descriptor("b-trades", vec![EntityType::Trade]),
                ],
            },
        ],
        reconciliation_rules: rules,
    };

    let store = Arc::new(InMemoryRuleStore::from_config(config).unwrap());
    let invocations = Arc::new(AtomicUsize::new(0));
    let factory = Arc::new(MockFactory {
        counts,
        failing,
        invocations: Arc::clone(&invocations),
    });
    let registry = Arc::new(ConnectorRegistry::new(vec![factory]).unwrap());
    let sink = Arc::new(CollectingSink::default());

    Harness {
        engine: ReconciliationEngine::new(
            Arc::clone(&store) as Arc<dyn RuleStore>,
            registry,
            Arc::clone(&sink) as Arc<dyn ResultSink>,
        ),
        store,
        sink,
        factory_invocations: invocations,
    }
}

fn counts(pairs: &[(&str, i64)]) -> HashMap<String, i64> {
    pairs
        .iter()
        .map(|(name, count)| (name.to_string(), *count))
        .collect()
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

#[tokio::test]
async fn test_rule_execution_matching_counts() {
    let h = harness(
        vec![rule("orders-daily", EntityType::Order)],
        counts(&[("a-orders", 500), ("b-orders", 500)]),
        HashSet::new(),
    );

    let result = h.engine.execute_by_rule("orders-daily", date()).await.unwrap();

    assert!(result.matched);
    assert_eq!(result.difference, 0);
    assert_eq!(result.count_a, 500);
    assert_eq!(result.count_b, 500);
    assert_eq!(result.data_source_a, "a-orders");
    assert_eq!(result.data_source_b, "b-orders");
    assert_eq!(h.sink.recorded.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_rule_execution_mismatching_counts() {
    let h = harness(
        vec![rule("orders-daily", EntityType::Order)],
        counts(&[("a-orders", 500), ("b-orders", 450)]),
        HashSet::new(),
    );

    let result = h.engine.execute_by_rule("orders-daily", date()).await.unwrap();

    assert!(!result.matched);
    assert_eq!(result.difference, 50);
}

#[tokio::test]
async fn test_unknown_rule() {
    let h = harness(vec![], HashMap::new(), HashSet::new());

    let err = h.engine.execute_by_rule("missing", date()).await.unwrap_err();
    assert!(matches!(err, ReconError::RuleNotFound { .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn test_ad_hoc_blank_name_persisted() {
    let h = harness(
        vec![],
        counts(&[("a-orders", 10), ("b-orders", 10)]),
        HashSet::new(),
    );

    let request = AdHocRequest {
        rule_name: String::new(),
        source_system_a: "system-a".to_string(),
        data_source_a: "a-orders".to_string(),
        source_system_b: "system-b".to_string(),
        data_source_b: "b-orders".to_string(),
        entity_type: EntityType::Order,
        trade_date: date(),
        trade_date_field: "tradeDate".to_string(),
        persist_rule: true,
    };

    let result = h.engine.execute_ad_hoc(&request).await.unwrap();

    // Generated name follows the adhoc-<uuid> pattern.
    let suffix = result.rule_name.strip_prefix("adhoc-").unwrap();
    assert!(Uuid::parse_str(suffix).is_ok());

    // The persisted rule is retrievable under the generated name.
    let persisted = h.store.rule(&result.rule_name).await.unwrap();
    assert_eq!(persisted.source_system_a, "system-a");
    assert_eq!(persisted.source_system_b, "system-b");
    assert_eq!(persisted.entity_type, EntityType::Order);
}

#[tokio::test]
async fn test_ad_hoc_without_persist_leaves_store_empty() {
    let h = harness(
        vec![],
        counts(&[("a-orders", 10), ("b-orders", 12)]),
        HashSet::new(),
    );

    let request = AdHocRequest {
        rule_name: "one-off".to_string(),
        source_system_a: "system-a".to_string(),
        data_source_a: "a-orders".to_string(),
        source_system_b: "system-b".to_string(),
        data_source_b: "b-orders".to_string(),
        entity_type: EntityType::Order,
        trade_date: date(),
        trade_date_field: "tradeDate".to_string(),
        persist_rule: false,
    };

    let result = h.engine.execute_ad_hoc(&request).await.unwrap();
    assert_eq!(result.rule_name, "one-off");
    assert_eq!(result.difference, 2);
    assert!(h.store.rule("one-off").await.is_none());
}

#[tokio::test]
async fn test_ad_hoc_persist_duplicate_name_fails_without_overwrite() {
    let h = harness(
        vec![rule("orders-daily", EntityType::Order)],
        counts(&[("a-orders", 10), ("b-orders", 10)]),
        HashSet::new(),
    );

    let request = AdHocRequest {
        rule_name: "orders-daily".to_string(),
        source_system_a: "system-a".to_string(),
        data_source_a: "a-orders".to_string(),
        source_system_b: "system-b".to_string(),
        data_source_b: "b-orders".to_string(),
        entity_type: EntityType::Order,
        trade_date: date(),
        trade_date_field: "businessDate".to_string(),
        persist_rule: true,
    };

    // Comparison itself runs; persistence collides.
    let err = h.engine.execute_ad_hoc(&request).await.unwrap_err();
    assert!(matches!(err, ReconError::DuplicateRule { .. }));

    let stored = h.store.rule("orders-daily").await.unwrap();
    assert_eq!(stored.trade_date_field, "tradeDate");
}

#[tokio::test]
async fn test_ad_hoc_unsupported_entity_type_fails_before_connectors() {
    let h = harness(vec![], HashMap::new(), HashSet::new());

    let request = AdHocRequest {
        rule_name: String::new(),
        source_system_a: "system-a".to_string(),
        data_source_a: "a-quotes".to_string(),
        source_system_b: "system-b".to_string(),
        data_source_b: "b-orders".to_string(),
        entity_type: EntityType::Order,
        trade_date: date(),
        trade_date_field: "tradeDate".to_string(),
        persist_rule: false,
    };

    let err = h.engine.execute_ad_hoc(&request).await.unwrap_err();
    assert!(matches!(
        err,
        ReconError::Validation {
            field: "dataSourceA",
            ..
        }
    ));
    // No connector was constructed.
    assert_eq!(h.factory_invocations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_ad_hoc_unknown_system() {
    let h = harness(vec![], HashMap::new(), HashSet::new());

    let request = AdHocRequest {
        rule_name: String::new(),
        source_system_a: "system-a".to_string(),
        data_source_a: "a-orders".to_string(),
        source_system_b: "system-x".to_string(),
        data_source_b: "b-orders".to_string(),
        entity_type: EntityType::Order,
        trade_date: date(),
        trade_date_field: "tradeDate".to_string(),
        persist_rule: false,
    };

    let err = h.engine.execute_ad_hoc(&request).await.unwrap_err();
    assert!(matches!(
        err,
        ReconError::Validation {
            field: "sourceSystemB",
            ..
        }
    ));
}

#[tokio::test]
async fn test_batch_continues_past_failing_rule() {
    let h = harness(
        vec![
            rule("orders-daily", EntityType::Order),
            rule("quotes-daily", EntityType::Quote),
            rule("trades-daily", EntityType::Trade),
        ],
        counts(&[
            ("a-orders", 100),
            ("b-orders", 100),
            ("a-trades", 7),
            ("b-trades", 9),
        ]),
        // Rule 2's side A connector fails at query time.
        HashSet::from(["a-quotes".to_string()]),
    );

    let results = h.engine.execute_all(date()).await;

    let names: Vec<&str> = results.iter().map(|r| r.rule_name.as_str()).collect();
    assert_eq!(names, vec!["orders-daily", "trades-daily"]);
    assert!(results[0].matched);
    assert_eq!(results[1].difference, 2);
    // Only successful comparisons reach the sink.
    assert_eq!(h.sink.recorded.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_batch_with_no_rules_is_empty() {
    let h = harness(vec![], HashMap::new(), HashSet::new());
    let results = h.engine.execute_all(date()).await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_connectors_are_reused_across_rules() {
    let h = harness(
        vec![
            rule("orders-daily", EntityType::Order),
            rule("orders-again", EntityType::Order),
        ],
        counts(&[("a-orders", 1), ("b-orders", 1)]),
        HashSet::new(),
    );

    let results = h.engine.execute_all(date()).await;
    assert_eq!(results.len(), 2);
    // Two data sources, each built once despite two rules.
    assert_eq!(h.factory_invocations.load(Ordering::SeqCst), 2);
}
