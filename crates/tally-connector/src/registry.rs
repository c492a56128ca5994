//! Connector factory contract and the kind-routing registry.
//!
//! The registry owns a name→connector cache with single-flight
//! get-or-create: concurrent first-time requests for the same data
//! source yield exactly one constructed connector, never N independent
//! pools.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{ReconError, ReconResult};
use crate::topology::DataSourceDescriptor;
use crate::traits::CountConnector;
use crate::types::BackendKind;

/// Shared handle to a built connector.
pub type SharedConnector = Arc<dyn CountConnector>;

/// Builds connectors for one backend kind.
///
/// A factory validates that all required connection attributes are
/// present on the descriptor, failing with a configuration error naming
/// the first missing attribute, then constructs a pooled connector.
/// Pool sizing and timeouts are a fixed internal policy of each
/// factory, not caller-tunable.
#[async_trait]
pub trait ConnectorFactory: Send + Sync {
    /// The backend kind this factory builds connectors for.
    fn kind(&self) -> BackendKind;

    /// Validate the descriptor's connection attributes and build a connector.
    async fn create(&self, descriptor: &DataSourceDescriptor) -> ReconResult<SharedConnector>;
}

/// Routes backend kinds to factories and caches built connectors by
/// data-source name.
pub struct ConnectorRegistry {
    factories: HashMap<BackendKind, Arc<dyn ConnectorFactory>>,
    cache: RwLock<HashMap<String, SharedConnector>>,
}

impl ConnectorRegistry {
    /// Build the kind→factory routing table.
    ///
    /// Fails fast when no factories are supplied: a registry that can
    /// build nothing is a startup misconfiguration, not a per-request
    /// condition.
    pub fn new(factories: Vec<Arc<dyn ConnectorFactory>>) -> ReconResult<Self> {
        if factories.is_empty() {
            return Err(ReconError::invalid_config(
                "at least one connector factory must be registered",
            ));
        }

        let mut routing = HashMap::new();
        for factory in factories {
            routing.insert(factory.kind(), factory);
        }

        Ok(Self {
            factories: routing,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Get the cached connector for the descriptor, building it on first use.
    ///
    /// Connection attributes are never re-read once a connector exists
    /// under the descriptor's name; there is no hot reload. The write
    /// lock is held across construction so concurrent first-time calls
    /// for one name invoke the factory exactly once.
    pub async fn connector_for(
        &self,
        descriptor: &DataSourceDescriptor,
    ) -> ReconResult<SharedConnector> {
        {
            let cache = self.cache.read().await;
            if let Some(connector) = cache.get(&descriptor.name) {
                return Ok(Arc::clone(connector));
            }
        }

        let mut cache = self.cache.write().await;
        // Re-check: another caller may have built it while we waited.
        if let Some(connector) = cache.get(&descriptor.name) {
            return Ok(Arc::clone(connector));
        }

        let factory = self
            .factories
            .get(&descriptor.kind)
            .ok_or(ReconError::UnsupportedKind {
                kind: descriptor.kind,
            })?;

        debug!(
            data_source = %descriptor.name,
            kind = %descriptor.kind,
            "building connector"
        );
        let connector = factory.create(descriptor).await?;
        cache.insert(descriptor.name.clone(), Arc::clone(&connector));

        info!(
            data_source = %descriptor.name,
            kind = %descriptor.kind,
            "connector built and cached"
        );
        Ok(connector)
    }

    /// Discard all cached connectors.
    ///
    /// Subsequent calls rebuild from the descriptor. Already-issued
    /// handles remain valid; pooled resources are released when the
    /// last handle drops, not synchronously here.
    pub async fn clear_cache(&self) {
        let mut cache = self.cache.write().await;
        let dropped = cache.len();
        cache.clear();
        info!(dropped, "connector cache cleared");
    }

    /// Number of cached connectors.
    pub async fn cached_count(&self) -> usize {
        self.cache.read().await.len()
    }
}
