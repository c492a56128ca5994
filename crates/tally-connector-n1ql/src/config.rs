//! Analytic connector configuration.

use tally_connector::error::{ReconError, ReconResult};
use tally_connector::topology::DataSourceDescriptor;

/// Fixed HTTP policy for the analytic connector. Not caller-tunable.
pub(crate) const CONNECT_TIMEOUT_SECS: u64 = 10;
pub(crate) const QUERY_TIMEOUT_SECS: u64 = 30;

/// Validated connection attributes for an analytic-query data source.
#[derive(Clone)]
pub struct N1qlConfig {
    /// Data-source name the connector reports.
    pub name: String,
    /// Base URL of the cluster query service (e.g. `http://host:8093`).
    pub endpoint: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for N1qlConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("N1qlConfig")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &"***REDACTED***")
            .finish()
    }
}

impl N1qlConfig {
    /// Extract and validate required connection attributes.
    pub fn from_descriptor(descriptor: &DataSourceDescriptor) -> ReconResult<Self> {
        let endpoint = required(descriptor, "endpoint")?;
        let username = required(descriptor, "username")?;
        let password = required(descriptor, "password")?;

        Ok(Self {
            name: descriptor.name.clone(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            username,
            password,
        })
    }
}

fn required(descriptor: &DataSourceDescriptor, key: &'static str) -> ReconResult<String> {
    descriptor
        .attribute(key)
        .map(str::to_string)
        .ok_or(ReconError::MissingAttribute {
            data_source: descriptor.name.clone(),
            attribute: key,
        })
}
