//! Backend kind and entity type enums.

use serde::{Deserialize, Serialize};

/// Classification of a physical data store.
///
/// The backend kind determines which connector implementation and
/// factory handle a data source. Adding a backend kind means adding one
/// connector crate and one factory; the engine is untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackendKind {
    /// SQL database queried with a textual count statement.
    Relational,
    /// Document store queried with a structured filter document.
    Document,
    /// Analytic query engine (e.g. N1QL) queried with a templated string.
    Analytic,
}

impl BackendKind {
    /// String form used in logs and error messages.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Relational => "relational",
            BackendKind::Document => "document",
            BackendKind::Analytic => "analytic",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "RELATIONAL" => Ok(BackendKind::Relational),
            "DOCUMENT" => Ok(BackendKind::Document),
            "ANALYTIC" => Ok(BackendKind::Analytic),
            other => Err(format!("unknown backend kind: {other}")),
        }
    }
}

/// Categorical tag determining which count queries apply.
///
/// Closed set shared as a vocabulary across all source systems; query
/// template maps are keyed by the entity type's wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Order,
    Quote,
    Trade,
    Position,
}

impl EntityType {
    /// Wire name, also the key into query template maps.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Order => "ORDER",
            EntityType::Quote => "QUOTE",
            EntityType::Trade => "TRADE",
            EntityType::Position => "POSITION",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ORDER" => Ok(EntityType::Order),
            "QUOTE" => Ok(EntityType::Quote),
            "TRADE" => Ok(EntityType::Trade),
            "POSITION" => Ok(EntityType::Position),
            other => Err(format!("unknown entity type: {other}")),
        }
    }
}
