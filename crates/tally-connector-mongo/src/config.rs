//! Document-store connector configuration.

use std::collections::HashMap;

use tally_connector::error::{ReconError, ReconResult};
use tally_connector::topology::DataSourceDescriptor;

/// Validated connection attributes for a document data source.
#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// Data-source name the connector reports.
    pub name: String,
    /// MongoDB connection URI.
    pub uri: String,
    /// Database holding the entity collections.
    pub database: String,
    /// Collection name per entity type name.
    pub collections: HashMap<String, String>,
}

impl MongoConfig {
    /// Extract and validate required connection attributes, then build
    /// the per-entity-type collection map.
    ///
    /// The collection for an entity type resolves, in order, from the
    /// `<entity>_collection` attribute, the shared `collection`
    /// attribute, and finally the lowercased entity type name.
    pub fn from_descriptor(descriptor: &DataSourceDescriptor) -> ReconResult<Self> {
        let uri = required(descriptor, "uri")?;
        let database = required(descriptor, "database")?;

        let mut collections = HashMap::new();
        for entity_type in &descriptor.entity_types {
            let lower = entity_type.as_str().to_ascii_lowercase();
            let keyed = format!("{lower}_collection");
            let collection = descriptor
                .attribute(&keyed)
                .or_else(|| descriptor.attribute("collection"))
                .map_or_else(|| lower.clone(), str::to_string);
            collections.insert(entity_type.as_str().to_string(), collection);
        }

        Ok(Self {
            name: descriptor.name.clone(),
            uri,
            database,
            collections,
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
