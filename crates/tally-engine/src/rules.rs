//! Rule storage.
//!
//! The store supplies rule definitions and the source-system topology.
//! The topology is immutable for the process lifetime; rules support
//! concurrent add/remove/lookup with fail-don't-overwrite semantics on
//! duplicate add.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use tally_connector::error::{ReconError, ReconResult};
use tally_connector::topology::{ReconciliationConfig, ReconciliationRule, SourceSystem};

/// Supplies and accepts rule definitions and source-system topology.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Look up a rule by name.
    async fn rule(&self, name: &str) -> Option<ReconciliationRule>;

    /// Look up a source system by name.
    async fn source_system(&self, name: &str) -> Option<SourceSystem>;

    /// All rules, in stored order.
    async fn all_rules(&self) -> Vec<ReconciliationRule>;

    /// Add a rule; fails with a configuration error when the name is
    /// already taken, leaving the existing rule unmodified.
    async fn add_rule(&self, rule: ReconciliationRule) -> ReconResult<()>;

    /// Remove a rule by name; returns whether one was removed.
    async fn remove_rule(&self, name: &str) -> bool;
}

/// Insertion-ordered rule map.
#[derive(Debug, Default)]
struct RuleMap {
    by_name: HashMap<String, ReconciliationRule>,
    order: Vec<String>,
}

/// In-process rule store over a configuration loaded at startup.
pub struct InMemoryRuleStore {
    systems: Vec<SourceSystem>,
    rules: RwLock<RuleMap>,
}

impl InMemoryRuleStore {
    /// Build a store from loaded configuration.
    ///
    /// Fails when the configuration declares the same rule name twice.
    pub fn from_config(config: ReconciliationConfig) -> ReconResult<Self> {
        let mut map = RuleMap::default();
        for rule in config.reconciliation_rules {
            if map.by_name.contains_key(&rule.name) {
                return Err(ReconError::DuplicateRule { name: rule.name });
            }
            map.order.push(rule.name.clone());
            map.by_name.insert(rule.name.clone(), rule);
        }

        Ok(Self {
            systems: config.source_systems,
            rules: RwLock::new(map),
        })
    }

    /// All source systems in declared order.
    #[must_use]
    pub fn source_systems(&self) -> &[SourceSystem] {
        &self.systems
    }
}

#[async_trait]
impl RuleStore for InMemoryRuleStore {
    async fn rule(&self, name: &str) -> Option<ReconciliationRule> {
        self.rules.read().await.by_name.get(name).cloned()
    }

    async fn source_system(&self, name: &str) -> Option<SourceSystem> {
        self.systems.iter().find(|s| s.name == name).cloned()
    }

    async fn all_rules(&self) -> Vec<ReconciliationRule> {
        let rules = self.rules.read().await;
        rules
            .order
            .iter()
            .filter_map(|name| rules.by_name.get(name).cloned())
            .collect()
    }

    async fn add_rule(&self, rule: ReconciliationRule) -> ReconResult<()> {
        let mut rules = self.rules.write().await;
        if rules.by_name.contains_key(&rule.name) {
            return Err(ReconError::DuplicateRule { name: rule.name });
        }
        rules.order.push(rule.name.clone());
        rules.by_name.insert(rule.name.clone(), rule);
        Ok(())
    }

    async fn remove_rule(&self, name: &str) -> bool {
        let mut rules = self.rules.write().await;
        if rules.by_name.remove(name).is_some() {
            rules.order.retain(|n| n != name);
            true
        } else {
            false
        }
    }
}
