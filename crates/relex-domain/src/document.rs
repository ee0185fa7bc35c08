//! Document module - pipeline inputs

use crate::{Entity, EntityId, RelationCode};
use serde::{Deserialize, Serialize};

/// A document to extract relations from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Document title, used to key evaluation records
    pub title: String,

    /// Full document text
    pub doc_text: String,
}

impl Document {
    /// Create a new document
    pub fn new(title: impl Into<String>, doc_text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            doc_text: doc_text.into(),
        }
    }
}

/// Gold relation of a few-shot example, in oracle output form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FewShotRelation {
    /// Head entity id
    pub head: EntityId,
    /// Relation P-code
    pub relation: RelationCode,
    /// Tail entity id
    pub tail: EntityId,
    /// Supporting text
    #[serde(default)]
    pub evidence: String,
}

/// A worked example shown to the oracle before the target document
///
/// Selection of the example happens upstream; the pipeline only renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FewShotExample {
    /// Example title
    #[serde(default)]
    pub title: String,

    /// Example text
    pub doc_text: String,

    /// Gold entities, in oracle output form
    pub entities: Vec<Entity>,

    /// Gold relations, in oracle output form
    #[serde(default)]
    pub relations: Vec<FewShotRelation>,
}

/// How the extraction prompt should be tuned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Balanced single-pass extraction
    Baseline,

    /// Over-generate candidates; a later stage prunes them
    Recall,
}

impl ExtractionMode {
    /// Get the mode name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMode::Baseline => "baseline",
            ExtractionMode::Recall => "recall",
        }
    }
}
