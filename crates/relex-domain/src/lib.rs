//! Relex Domain Layer
//!
//! This crate contains the value types shared by every stage of the relation
//! extraction pipeline, plus the trait seam through which the pipeline talks
//! to the external text-generation oracle.
//!
//! ## Key Concepts
//!
//! - **Entity**: A typed mention extracted from one document (`e0`, `e1`, ...)
//! - **Triple**: A `(head, relation, tail)` candidate with denormalized names and types
//! - **SchemaInfo**: The relation vocabulary (P-codes) the pipeline accepts
//! - **ConstraintTable**: Observed `(head_type, tail_type)` pairs per relation
//! - **Oracle**: Capability that answers a prompt with JSON conforming to an output schema
//!
//! ## Architecture
//!
//! This crate holds no infrastructure:
//! - Only `serde` derives, no I/O
//! - Oracle implementations live in `relex-oracle`
//! - Filters live in `relex-gatekeeper`, orchestration in `relex-extractor`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod entity;
pub mod schema;
pub mod traits;
pub mod triple;

// Re-exports for convenience
pub use document::{Document, ExtractionMode, FewShotExample, FewShotRelation};
pub use entity::{Entity, EntityId, EntityType};
pub use schema::{ConstraintTable, RelationCode, SchemaInfo, TypePair};
pub use traits::{Oracle, OutputSchema};
pub use triple::Triple;
