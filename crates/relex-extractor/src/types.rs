//! Strategy selection and output types

use relex_domain::{Entity, Triple};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Extraction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// One extraction call, label and type filters
    Baseline,

    /// Recall-tuned extraction, batched verification, domain/range filter
    Proposed,

    /// Entity-only extraction, type-pruned pair classification
    EntityPair,
}

impl Strategy {
    /// Get the strategy name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Baseline => "baseline",
            Strategy::Proposed => "proposed",
            Strategy::EntityPair => "entity_pair",
        }
    }

    /// Parse a strategy name; `-` and `_` are interchangeable
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "baseline" => Some(Strategy::Baseline),
            "proposed" | "two_stage" => Some(Strategy::Proposed),
            "entity_pair" => Some(Strategy::EntityPair),
            _ => None,
        }
    }

    /// Whether this strategy needs a constraint table
    pub fn uses_constraints(&self) -> bool {
        !matches!(self, Strategy::Baseline)
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid strategy: {}", s))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidate counts of the two-stage strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoStageStats {
    /// Candidates after extraction and label/type filtering
    pub stage1_candidates: usize,
    /// Candidates the verifier kept
    pub stage2_kept: usize,
    /// Triples left after the domain/range filter
    pub after_constraints: usize,
}

/// Counters of the entity-pair strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPairStats {
    /// Ordered pairs generated, `n(n-1)`
    pub total_pairs: usize,
    /// Pairs whose type pair was observed in the constraint table
    pub filtered_pairs: usize,
    /// Classification calls issued
    pub num_classification_calls: usize,
    /// Triples returned
    pub num_triples: usize,
}

/// Stats of a multi-stage strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StrategyStats {
    /// Two-stage generate-and-verify
    TwoStage(TwoStageStats),
    /// Entity-pair-guided classification
    EntityPair(EntityPairStats),
}

/// What a strategy returns for one document
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutput {
    /// Entities as extracted, unfiltered
    pub entities: Vec<Entity>,
    /// Triples that survived every stage
    pub triples: Vec<Triple>,
    /// Present only for multi-stage strategies
    pub stats: Option<StrategyStats>,
}

impl StrategyOutput {
    /// Output of a single-pass strategy
    pub fn single_pass(entities: Vec<Entity>, triples: Vec<Triple>) -> Self {
        Self {
            entities,
            triples,
            stats: None,
        }
    }
}

/// Plain per-document record handed to an evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    /// Document title
    pub title: String,
    /// Strategy that produced the record
    pub strategy: Strategy,
    /// Extracted entities
    pub entities: Vec<Entity>,
    /// Final triples
    pub triples: Vec<Triple>,
    /// Strategy stats, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<StrategyStats>,
    /// Why the document failed, if it did
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionRecord {
    /// Record for a document that completed
    pub fn completed(title: impl Into<String>, strategy: Strategy, output: StrategyOutput) -> Self {
        Self {
            title: title.into(),
            strategy,
            entities: output.entities,
            triples: output.triples,
            stats: output.stats,
            error: None,
        }
    }

    /// Record for a document whose processing was aborted
    pub fn failed(title: impl Into<String>, strategy: Strategy, error: impl fmt::Display) -> Self {
        Self {
            title: title.into(),
            strategy,
            entities: Vec::new(),
            triples: Vec::new(),
            stats: None,
            error: Some(error.to_string()),
        }
    }

    /// Whether the document failed
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}
