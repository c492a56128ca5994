//! Error types for the reconciliation core.
//!
//! One taxonomy across the connector framework and the engine:
//! configuration errors (missing rules, systems, data sources, queries,
//! connection attributes), validation errors (ad-hoc requests naming
//! things that do not exist or are unsupported), and connector errors
//! (backend query execution failures).

use thiserror::Error;

use crate::types::{BackendKind, EntityType};

/// Error that can occur while resolving or executing a reconciliation.
#[derive(Debug, Error)]
pub enum ReconError {
    // Configuration errors
    /// Referenced rule does not exist.
    #[error("rule not found: {name}")]
    RuleNotFound { name: String },

    /// Referenced source system does not exist in the topology.
    #[error("source system not found: {name}")]
    SystemNotFound { name: String },

    /// No data source in the system supports the entity type.
    #[error("no data source for entity type {entity_type} in system {system}")]
    NoDataSource {
        system: String,
        entity_type: EntityType,
    },

    /// Data source declares no count queries at all.
    #[error("no count queries defined for data source: {data_source}")]
    NoQueries { data_source: String },

    /// Data source has no count query for the entity type.
    #[error("no count query for entity type {entity_type} in data source {data_source}")]
    MissingQuery {
        data_source: String,
        entity_type: EntityType,
    },

    /// A required connection attribute is absent.
    #[error("data source {data_source}: missing connection attribute '{attribute}'")]
    MissingAttribute {
        data_source: String,
        attribute: &'static str,
    },

    /// Adding a rule whose name is already taken.
    #[error("rule with name '{name}' already exists")]
    DuplicateRule { name: String },

    /// No factory registered for the backend kind.
    #[error("no connector factory registered for backend kind: {kind}")]
    UnsupportedKind { kind: BackendKind },

    /// The query template variant does not match what the connector expects.
    #[error("data source {data_source}: expected a {expected} count query")]
    TemplateMismatch {
        data_source: String,
        expected: &'static str,
    },

    /// Configuration is invalid for some other reason.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    // Validation errors
    /// An ad-hoc request references something that does not exist or is
    /// unsupported. `field` names the offending request field.
    #[error("validation failed for {field}: {message}")]
    Validation { field: &'static str, message: String },

    // Connector errors
    /// Establishing or acquiring a backend connection failed.
    #[error("connection to {data_source} failed: {message}")]
    Connection {
        data_source: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Backend query execution failed.
    #[error("count query against {data_source} failed: {message}")]
    Query {
        data_source: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend returned a result the connector cannot interpret.
    #[error("unexpected result shape from {data_source}: {message}")]
    UnexpectedShape {
        data_source: String,
        message: String,
    },
}

/// Coarse classification of a [`ReconError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or inconsistent configuration.
    Configuration,
    /// An ad-hoc request referenced something invalid.
    Validation,
    /// A backend query failed at execution time.
    Connector,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Connector => write!(f, "connector"),
        }
    }
}

impl ReconError {
    /// Classify this error per the engine's taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReconError::RuleNotFound { .. }
            | ReconError::SystemNotFound { .. }
            | ReconError::NoDataSource { .. }
            | ReconError::NoQueries { .. }
            | ReconError::MissingQuery { .. }
            | ReconError::MissingAttribute { .. }
            | ReconError::DuplicateRule { .. }
            | ReconError::UnsupportedKind { .. }
            | ReconError::TemplateMismatch { .. }
            | ReconError::InvalidConfig { .. } => ErrorKind::Configuration,
            ReconError::Validation { .. } => ErrorKind::Validation,
            ReconError::Connection { .. }
            | ReconError::Query { .. }
            | ReconError::UnexpectedShape { .. } => ErrorKind::Connector,
        }
    }

    // Convenience constructors

    /// Create an invalid-configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        ReconError::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a validation error naming the offending request field.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ReconError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a connection error.
    pub fn connection(data_source: impl Into<String>, message: impl Into<String>) -> Self {
        ReconError::Connection {
            data_source: data_source.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error with an underlying cause.
    pub fn connection_with_source(
        data_source: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ReconError::Connection {
            data_source: data_source.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a query execution error.
    pub fn query(data_source: impl Into<String>, message: impl Into<String>) -> Self {
        ReconError::Query {
            data_source: data_source.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create a query execution error with an underlying cause.
    pub fn query_with_source(
        data_source: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ReconError::Query {
            data_source: data_source.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an unexpected-result-shape error.
    pub fn unexpected_shape(
        data_source: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ReconError::UnexpectedShape {
            data_source: data_source.into(),
            message: message.into(),
        }
    }
}

/// Result type for reconciliation operations.
pub type ReconResult<T> = Result<T, ReconError>;
