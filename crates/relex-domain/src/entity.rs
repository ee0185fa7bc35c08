//! Entity module - typed mentions produced by the oracle

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Document-local entity identifier (e.g. `"e0"`)
///
/// Only unique within one extraction result; never stable across
/// strategies or oracle calls.
pub type EntityId = String;

/// Entity type vocabulary
///
/// The oracle is constrained to the eight known codes, but a misbehaving
/// oracle can still return something else. Those values are carried as
/// `Other` so parsing never fails on them; the type filter removes any
/// triple that touches one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityType {
    /// `PER`
    Person,
    /// `ORG`
    Organization,
    /// `LOC`
    Location,
    /// `ART` (works, products, artifacts)
    Artifact,
    /// `DAT`
    Date,
    /// `TIM`
    Time,
    /// `MON`
    Money,
    /// `%`
    Percent,
    /// Anything outside the vocabulary, kept verbatim
    Other(String),
}

impl EntityType {
    /// Codes of the known entity types, in schema order
    pub const CODES: [&'static str; 8] = ["PER", "ORG", "LOC", "ART", "DAT", "TIM", "MON", "%"];

    /// Get the wire code for this type
    pub fn as_str(&self) -> &str {
        match self {
            EntityType::Person => "PER",
            EntityType::Organization => "ORG",
            EntityType::Location => "LOC",
            EntityType::Artifact => "ART",
            EntityType::Date => "DAT",
            EntityType::Time => "TIM",
            EntityType::Money => "MON",
            EntityType::Percent => "%",
            EntityType::Other(code) => code,
        }
    }

    /// Parse a wire code. Codes are case-sensitive; unknown codes become `Other`.
    pub fn parse(code: &str) -> Self {
        match code {
            "PER" => EntityType::Person,
            "ORG" => EntityType::Organization,
            "LOC" => EntityType::Location,
            "ART" => EntityType::Artifact,
            "DAT" => EntityType::Date,
            "TIM" => EntityType::Time,
            "MON" => EntityType::Money,
            "%" => EntityType::Percent,
            other => EntityType::Other(other.to_string()),
        }
    }

    /// Whether this is one of the eight known types
    pub fn is_known(&self) -> bool {
        !matches!(self, EntityType::Other(_))
    }

    /// The fixed set of valid entity types
    ///
    /// # Examples
    ///
    /// ```
    /// use relex_domain::EntityType;
    ///
    /// let valid = EntityType::known();
    /// assert_eq!(valid.len(), 8);
    /// assert!(valid.contains(&EntityType::Percent));
    /// ```
    pub fn known() -> HashSet<EntityType> {
        Self::CODES.iter().map(|code| Self::parse(code)).collect()
    }
}

impl From<String> for EntityType {
    fn from(code: String) -> Self {
        Self::parse(&code)
    }
}

impl From<EntityType> for String {
    fn from(entity_type: EntityType) -> Self {
        entity_type.as_str().to_string()
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entity extracted from a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Document-local identifier
    pub id: EntityId,

    /// Surface name as it appears in the document
    pub name: String,

    /// Entity type
    #[serde(rename = "type")]
    pub entity_type: EntityType,
}

impl Entity {
    /// Create a new entity
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entity_type,
        }
    }
}
