//! Decoding of structured oracle responses
//!
//! Every field the pipeline may find missing is an explicit `Option`, and
//! each has exactly one `resolve_*` function deciding what "missing" means.

use crate::error::ExtractorError;
use relex_domain::{Entity, EntityType, OutputSchema, RelationCode};
use serde::Deserialize;
use std::collections::HashMap;

/// Relation value the classifier uses for "no relation"
pub const NO_RELATION: &str = "NA";

/// Entity record as returned by the oracle
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawEntity {
    /// Document-local id
    pub id: String,
    /// Surface name
    pub name: Option<String>,
    /// Type code
    #[serde(rename = "type")]
    pub entity_type: Option<String>,
}

impl RawEntity {
    /// Resolve missing fields into an [`Entity`]
    pub fn resolve(self) -> Entity {
        Entity {
            id: self.id,
            name: resolve_name(self.name),
            entity_type: resolve_entity_type(self.entity_type),
        }
    }
}

/// Relation record as returned by the oracle
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawRelation {
    /// Head entity id
    pub head: String,
    /// Relation code
    pub relation: RelationCode,
    /// Tail entity id
    pub tail: String,
    /// Supporting text
    pub evidence: Option<String>,
}

/// `{entities, relations}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExtractionResult {
    /// Extracted entities
    #[serde(default)]
    pub entities: Vec<RawEntity>,
    /// Extracted relations
    #[serde(default)]
    pub relations: Vec<RawRelation>,
}

/// `{entities}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EntityOnlyResult {
    /// Extracted entities
    #[serde(default)]
    pub entities: Vec<RawEntity>,
}

/// One classification decision, keyed by index into the batch
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PairDecision {
    /// Index into the batch the call was made with
    pub pair_index: Option<i64>,
    /// Chosen relation code or `"NA"`
    pub relation: Option<String>,
    /// Supporting text
    pub evidence: Option<String>,
}

/// `{pair_decisions}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PairClassificationResult {
    /// Decisions, in any order
    #[serde(default)]
    pub pair_decisions: Vec<PairDecision>,
}

/// One keep/discard decision, keyed by index into the batch
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VerificationDecision {
    /// Index into the batch the call was made with
    pub candidate_index: Option<i64>,
    /// Whether to keep the candidate
    pub keep: Option<bool>,
}

/// `{decisions}`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VerificationResult {
    /// Decisions, in any order
    #[serde(default)]
    pub decisions: Vec<VerificationDecision>,
}

impl VerificationResult {
    /// Decisions keyed by in-batch index
    ///
    /// Decisions without a usable index are ignored; a repeated index keeps
    /// the last decision.
    pub fn decision_map(&self) -> HashMap<usize, bool> {
        self.decisions
            .iter()
            .filter_map(|d| {
                let index = usize::try_from(d.candidate_index?).ok()?;
                Some((index, resolve_keep(d.keep)))
            })
            .collect()
    }
}

/// Decoded oracle response, one variant per output schema
#[derive(Debug, Clone, PartialEq)]
pub enum OracleResponse {
    /// Entities and relations
    Extraction(ExtractionResult),
    /// Entities only
    EntityOnly(EntityOnlyResult),
    /// Pair classification decisions
    PairClassification(PairClassificationResult),
    /// Verification decisions
    Verification(VerificationResult),
}

impl OracleResponse {
    /// Decode raw oracle output as the given schema
    pub fn decode(schema: OutputSchema, raw: &str) -> Result<Self, ExtractorError> {
        let json = extract_json(raw)?;
        Ok(match schema {
            OutputSchema::Extraction => Self::Extraction(serde_json::from_str(&json)?),
            OutputSchema::EntityOnly => Self::EntityOnly(serde_json::from_str(&json)?),
            OutputSchema::PairClassification => {
                Self::PairClassification(serde_json::from_str(&json)?)
            }
            OutputSchema::Verification => Self::Verification(serde_json::from_str(&json)?),
        })
    }

    /// Schema this response was decoded as
    pub fn schema(&self) -> OutputSchema {
        match self {
            Self::Extraction(_) => OutputSchema::Extraction,
            Self::EntityOnly(_) => OutputSchema::EntityOnly,
            Self::PairClassification(_) => OutputSchema::PairClassification,
            Self::Verification(_) => OutputSchema::Verification,
        }
    }

    /// Unwrap an extraction response
    pub fn into_extraction(self) -> Result<ExtractionResult, ExtractorError> {
        match self {
            Self::Extraction(result) => Ok(result),
            other => Err(other.mismatch(OutputSchema::Extraction)),
        }
    }

    /// Unwrap an entity-only response
    pub fn into_entity_only(self) -> Result<EntityOnlyResult, ExtractorError> {
        match self {
            Self::EntityOnly(result) => Ok(result),
            other => Err(other.mismatch(OutputSchema::EntityOnly)),
        }
    }

    /// Unwrap a pair classification response
    pub fn into_pair_classification(self) -> Result<PairClassificationResult, ExtractorError> {
        match self {
            Self::PairClassification(result) => Ok(result),
            other => Err(other.mismatch(OutputSchema::PairClassification)),
        }
    }

    /// Unwrap a verification response
    pub fn into_verification(self) -> Result<VerificationResult, ExtractorError> {
        match self {
            Self::Verification(result) => Ok(result),
            other => Err(other.mismatch(OutputSchema::Verification)),
        }
    }

    fn mismatch(&self, expected: OutputSchema) -> ExtractorError {
        ExtractorError::UnexpectedResponse {
            expected: expected.as_str(),
            actual: self.schema().as_str(),
        }
    }
}

/// Missing entity name resolves to the empty string
pub fn resolve_name(name: Option<String>) -> String {
    name.unwrap_or_default()
}

/// Missing entity type resolves to an empty unknown type
pub fn resolve_entity_type(code: Option<String>) -> EntityType {
    EntityType::parse(code.as_deref().unwrap_or_default())
}

/// Missing evidence resolves to the empty string
pub fn resolve_evidence(evidence: Option<String>) -> String {
    evidence.unwrap_or_default()
}

/// Missing verification decision resolves to keep
pub fn resolve_keep(keep: Option<bool>) -> bool {
    keep.unwrap_or(true)
}

/// Missing classification relation resolves to `"NA"`
pub fn resolve_relation(relation: Option<String>) -> String {
    relation.unwrap_or_else(|| NO_RELATION.to_string())
}

/// Resolve a decision index against the batch it refers to
///
/// `None` when the index is missing, negative, or past the end of the batch.
pub fn resolve_index(index: Option<i64>, batch_len: usize) -> Option<usize> {
    let index = usize::try_from(index?).ok()?;
    (index < batch_len).then_some(index)
}

/// Extract JSON from a response, handling markdown code blocks
fn extract_json(response: &str) -> Result<String, ExtractorError> {
    let trimmed = response.trim();

    if trimmed.starts_with("```") {
        let lines: Vec<&str> = trimmed.lines().collect();
        if lines.len() < 2 {
            return Err(ExtractorError::InvalidResponse("Empty code block".to_string()));
        }

        // Skip the opening fence and, if present, the closing one
        let end = if lines[lines.len() - 1].trim() == "```" {
            lines.len() - 1
        } else {
            lines.len()
        };
        Ok(lines[1..end].join("\n"))
    } else {
        Ok(trimmed.to_string())
    }
}
