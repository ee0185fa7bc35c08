//! Schema module - relation vocabulary and learned domain/range constraints

use crate::EntityType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Relation type identifier (e.g. `"P108"`)
pub type RelationCode = String;

/// A `(head_type, tail_type)` pair
pub type TypePair = (EntityType, EntityType);

/// Read-only schema description supplied by the caller
///
/// `rel_info` defines the universe of valid relation codes. `ent2id` and
/// `rel2id` are carried for evaluators and prompt builders that want them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaInfo {
    /// Relation code -> human readable description
    pub rel_info: BTreeMap<RelationCode, String>,

    /// Entity type code -> numeric id
    #[serde(default)]
    pub ent2id: BTreeMap<String, i64>,

    /// Relation code -> numeric id
    #[serde(default)]
    pub rel2id: BTreeMap<String, i64>,
}

impl SchemaInfo {
    /// Create schema info from relation descriptions only
    pub fn from_rel_info<I, K, V>(rel_info: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<RelationCode>,
        V: Into<String>,
    {
        Self {
            rel_info: rel_info
                .into_iter()
                .map(|(code, desc)| (code.into(), desc.into()))
                .collect(),
            ent2id: BTreeMap::new(),
            rel2id: BTreeMap::new(),
        }
    }

    /// The set of relation codes the pipeline accepts
    pub fn valid_relations(&self) -> HashSet<RelationCode> {
        self.rel_info.keys().cloned().collect()
    }

    /// Description of a relation, if declared
    pub fn describe(&self, relation: &str) -> Option<&str> {
        self.rel_info.get(relation).map(String::as_str)
    }
}

/// Relation -> set of observed `(head_type, tail_type)` pairs
///
/// A relation missing from the table is *unknown*, not *impossible*: the
/// domain/range filter lets such triples through.
///
/// Serialized as `{"P108": [["PER", "ORG"], ...], ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstraintTable {
    entries: BTreeMap<RelationCode, BTreeSet<TypePair>>,
}

impl ConstraintTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `relation` was observed between `head_type` and `tail_type`
    pub fn observe(
        &mut self,
        relation: impl Into<RelationCode>,
        head_type: EntityType,
        tail_type: EntityType,
    ) {
        self.entries
            .entry(relation.into())
            .or_default()
            .insert((head_type, tail_type));
    }

    /// Observed type pairs for a relation; `None` if the relation is unknown
    pub fn allowed(&self, relation: &str) -> Option<&BTreeSet<TypePair>> {
        self.entries.get(relation)
    }

    /// Iterate over `(relation, type pairs)` in relation order
    pub fn iter(&self) -> impl Iterator<Item = (&RelationCode, &BTreeSet<TypePair>)> {
        self.entries.iter()
    }

    /// Number of relations in the table
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no relations
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R: Into<RelationCode>> FromIterator<(R, EntityType, EntityType)> for ConstraintTable {
    fn from_iter<I: IntoIterator<Item = (R, EntityType, EntityType)>>(iter: I) -> Self {
        let mut table = ConstraintTable::new();
        for (relation, head_type, tail_type) in iter {
            table.observe(relation, head_type, tail_type);
        }
        table
    }
}
