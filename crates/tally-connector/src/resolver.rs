//! Per-entity-type count query lookup.

use crate::error::{ReconError, ReconResult};
use crate::template::QueryTemplate;
use crate::topology::DataSourceDescriptor;
use crate::types::EntityType;

/// Look up the count query template a data source declares for an
/// entity type.
///
/// Pure lookup into the descriptor's own map; fails with a
/// configuration error when the descriptor declares no queries at all
/// or none for this entity type.
pub fn resolve_count_query<'a>(
    descriptor: &'a DataSourceDescriptor,
    entity_type: EntityType,
) -> ReconResult<&'a QueryTemplate> {
    let queries = descriptor
        .queries
        .as_ref()
        .ok_or_else(|| ReconError::NoQueries {
            data_source: descriptor.name.clone(),
        })?;

    queries
        .get(entity_type.as_str())
        .ok_or_else(|| ReconError::MissingQuery {
            data_source: descriptor.name.clone(),
            entity_type,
        })
}
