//! Relational connector configuration.

use tally_connector::error::{ReconError, ReconResult};
use tally_connector::topology::DataSourceDescriptor;

/// Fixed pool policy for relational connectors. Not caller-tunable.
pub(crate) const MAX_CONNECTIONS: u32 = 10;
pub(crate) const MIN_CONNECTIONS: u32 = 2;
pub(crate) const ACQUIRE_TIMEOUT_SECS: u64 = 30;
pub(crate) const IDLE_TIMEOUT_SECS: u64 = 600;
pub(crate) const MAX_LIFETIME_SECS: u64 = 1800;

/// Validated connection attributes for a relational data source.
#[derive(Clone)]
pub struct SqlConfig {
    /// Data-source name the connector reports.
    pub name: String,
    /// PostgreSQL connection URL.
    pub url: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for SqlConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlConfig")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"***REDACTED***")
            .finish()
    }
}

impl SqlConfig {
    /// Extract and validate required connection attributes.
    ///
    /// Fails with a configuration error naming the first missing
    /// attribute.
    pub fn from_descriptor(descriptor: &DataSourceDescriptor) -> ReconResult<Self> {
        let url = required(descriptor, "url")?;
        let username = required(descriptor, "username")?;
        let password = required(descriptor, "password")?;

        Ok(Self {
            name: descriptor.name.clone(),
            url,
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
