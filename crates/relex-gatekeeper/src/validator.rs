//! Triple validation logic

use crate::ValidationConfig;
use relex_domain::{ConstraintTable, EntityType, RelationCode, SchemaInfo, Triple};
use std::collections::HashSet;

/// Keep triples whose relation is in `valid_relations`
pub fn filter_invalid_labels(
    triples: &[Triple],
    valid_relations: &HashSet<RelationCode>,
) -> Vec<Triple> {
    triples
        .iter()
        .filter(|t| valid_relations.contains(&t.relation))
        .cloned()
        .collect()
}

/// Keep triples whose head and tail types are both in `valid_types`
pub fn filter_invalid_entity_types(
    triples: &[Triple],
    valid_types: &HashSet<EntityType>,
) -> Vec<Triple> {
    triples
        .iter()
        .filter(|t| valid_types.contains(&t.head_type) && valid_types.contains(&t.tail_type))
        .cloned()
        .collect()
}

/// Whether a triple passes the domain/range check
///
/// A relation missing from the table passes regardless of its type pair.
pub fn satisfies_constraints(triple: &Triple, constraint_table: &ConstraintTable) -> bool {
    match constraint_table.allowed(&triple.relation) {
        None => true,
        Some(allowed) => allowed.contains(&triple.type_pair()),
    }
}

/// Keep triples whose type pair was observed for their relation
pub fn apply_domain_range_constraints(
    triples: &[Triple],
    constraint_table: &ConstraintTable,
) -> Vec<Triple> {
    triples
        .iter()
        .filter(|t| satisfies_constraints(t, constraint_table))
        .cloned()
        .collect()
}

/// How many triples each filter removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterReport {
    /// Triples going in
    pub input: usize,
    /// Removed by the label filter
    pub dropped_labels: usize,
    /// Removed by the entity type filter
    pub dropped_types: usize,
    /// Removed by the domain/range filter
    pub dropped_constraints: usize,
    /// Triples coming out
    pub output: usize,
}

impl FilterReport {
    /// Total triples removed
    pub fn dropped(&self) -> usize {
        self.input - self.output
    }
}

/// Result of running the gatekeeper
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    /// Triples that passed every enabled filter, in input order
    pub kept: Vec<Triple>,
    /// Per-filter drop counts
    pub report: FilterReport,
}

/// The Gatekeeper runs the enabled filters in a fixed order
pub struct Gatekeeper {
    config: ValidationConfig,
    valid_relations: HashSet<RelationCode>,
    valid_types: HashSet<EntityType>,
}

impl Gatekeeper {
    /// Create a new Gatekeeper over an explicit relation vocabulary
    pub fn new(config: ValidationConfig, valid_relations: HashSet<RelationCode>) -> Self {
        Self {
            config,
            valid_relations,
            valid_types: EntityType::known(),
        }
    }

    /// Create a Gatekeeper accepting the relations declared in `schema`
    pub fn for_schema(config: ValidationConfig, schema: &SchemaInfo) -> Self {
        Self::new(config, schema.valid_relations())
    }

    /// Run the enabled filters: labels → types → constraints
    ///
    /// The domain/range filter only runs when both enabled and a table is
    /// supplied.
    pub fn filter(
        &self,
        triples: &[Triple],
        constraint_table: Option<&ConstraintTable>,
    ) -> FilterOutcome {
        let mut report = FilterReport {
            input: triples.len(),
            ..FilterReport::default()
        };
        let mut kept = triples.to_vec();

        if self.config.check_labels {
            let before = kept.len();
            kept = filter_invalid_labels(&kept, &self.valid_relations);
            report.dropped_labels = before - kept.len();
        }

        if self.config.check_entity_types {
            let before = kept.len();
            kept = filter_invalid_entity_types(&kept, &self.valid_types);
            report.dropped_types = before - kept.len();
        }

        if self.config.check_domain_range {
            if let Some(table) = constraint_table {
                let before = kept.len();
                kept = apply_domain_range_constraints(&kept, table);
                report.dropped_constraints = before - kept.len();
            }
        }

        report.output = kept.len();
        FilterOutcome { kept, report }
    }
}
