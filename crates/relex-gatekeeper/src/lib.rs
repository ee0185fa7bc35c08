//! Relex Gatekeeper
//!
//! Validation filters applied to relation candidates before they leave the
//! pipeline.
//!
//! The Gatekeeper provides:
//! - Label validation (relation code declared in the schema)
//! - Entity type validation (both ends carry a known type)
//! - Domain/range validation (type pair observed for the relation)
//!
//! Each filter is a pure function over a triple slice that returns a new,
//! order-preserving vector. They cover disjoint criteria, so any order gives
//! the same result; [`Gatekeeper`] always runs them labels → types →
//! constraints.
//!
//! # Examples
//!
//! ```
//! use relex_gatekeeper::{Gatekeeper, ValidationConfig};
//! use relex_domain::{Entity, EntityType, SchemaInfo, Triple};
//!
//! let schema = SchemaInfo::from_rel_info([("P108", "employer")]);
//! let gatekeeper = Gatekeeper::for_schema(ValidationConfig::single_pass(), &schema);
//!
//! let alice = Entity::new("e0", "Alice", EntityType::Person);
//! let acme = Entity::new("e1", "Acme", EntityType::Organization);
//! let triples = vec![
//!     Triple::between(&alice, "P108", &acme, ""),
//!     Triple::between(&alice, "P999", &acme, ""),
//! ];
//!
//! let outcome = gatekeeper.filter(&triples, None);
//! assert_eq!(outcome.kept.len(), 1);
//! assert_eq!(outcome.report.dropped_labels, 1);
//! ```

#![warn(missing_docs)]

mod config;
mod validator;

pub use config::ValidationConfig;
pub use validator::{
    apply_domain_range_constraints, filter_invalid_entity_types, filter_invalid_labels,
    satisfies_constraints, FilterOutcome, FilterReport, Gatekeeper,
};
