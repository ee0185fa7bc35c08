//! Relex Extractor
//!
//! Extracts relation triples from documents by querying an oracle under one
//! of three strategies.
//!
//! # Overview
//!
//! Every strategy turns a [`Document`](relex_domain::Document) plus a worked
//! few-shot example into `(entities, triples)`. They differ in how many oracle
//! calls they make and which filters run in between.
//!
//! # Architecture
//!
//! ```text
//! Baseline:     extract → parse → labels → types
//! Proposed:     extract (recall) → parse → labels → types → verify → domain/range
//! Entity pair:  entities → ordered pairs → type-pair prune → classify → labels
//! ```
//!
//! # Key Features
//!
//! - **Reference resolution**: relations pointing at unknown entity ids are dropped
//! - **Batched verification**: keep/discard decisions, missing decisions keep
//! - **Pair classification**: candidate pairs pruned by observed type pairs
//! - **Resilient calls**: per-call timeout and retry with exponential backoff
//!
//! # Example Usage
//!
//! ```no_run
//! use relex_extractor::{Extractor, ExtractorConfig, Strategy};
//! use relex_domain::{Document, FewShotExample, SchemaInfo};
//! use relex_oracle::MockOracle;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let oracle = MockOracle::new(r#"{"entities": [], "relations": []}"#);
//! let extractor = Extractor::new(oracle, ExtractorConfig::default())?;
//!
//! let doc = Document::new("doc_001", "Alice works at Acme Corp.");
//! let few_shot = FewShotExample {
//!     title: "example".to_string(),
//!     doc_text: "Bob works for Initech.".to_string(),
//!     entities: Vec::new(),
//!     relations: Vec::new(),
//! };
//! let schema = SchemaInfo::from_rel_info([("P108", "employer")]);
//!
//! let output = extractor
//!     .run(Strategy::Baseline, &doc, &few_shot, &schema, None)
//!     .await?;
//! println!("Extracted: {} triples", output.triples.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod caller;
mod config;
mod error;
mod extractor;
mod pairs;
mod parser;
mod prompt;
mod response;
mod types;
mod verifier;

#[cfg(test)]
mod tests;

pub use caller::{OracleCaller, RetryPolicy};
pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use pairs::{
    ordered_pairs, resolve_pair_decisions, CandidatePair, PairClassifier, TypePairIndex,
    DEFAULT_PAIR_BATCH_SIZE,
};
pub use parser::{entity_names, parse_extraction, resolve_entities};
pub use prompt::{DefaultPrompts, PromptSource};
pub use response::{
    resolve_entity_type, resolve_evidence, resolve_index, resolve_keep, resolve_name,
    resolve_relation, EntityOnlyResult, ExtractionResult, OracleResponse, PairClassificationResult,
    PairDecision, RawEntity, RawRelation, VerificationDecision, VerificationResult, NO_RELATION,
};
pub use types::{
    EntityPairStats, ExtractionRecord, Strategy, StrategyOutput, StrategyStats, TwoStageStats,
};
pub use verifier::{apply_verification, BatchVerifier, DEFAULT_VERIFY_BATCH_SIZE};
