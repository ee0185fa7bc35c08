//! Triple module - relation candidates between two entities

use crate::{Entity, EntityId, EntityType, RelationCode};
use serde::{Deserialize, Serialize};

/// A relation candidate `(head) -[relation]-> (tail)`
///
/// Names and types are copied from the referenced entities when the triple
/// is built. They are not live references: later changes to the entity list
/// do not reach an existing triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triple {
    /// Head entity id
    pub head: EntityId,
    /// Head entity name at build time
    pub head_name: String,
    /// Head entity type at build time
    pub head_type: EntityType,
    /// Relation P-code
    pub relation: RelationCode,
    /// Tail entity id
    pub tail: EntityId,
    /// Tail entity name at build time
    pub tail_name: String,
    /// Tail entity type at build time
    pub tail_type: EntityType,
    /// Text span justifying the relation
    pub evidence: String,
}

impl Triple {
    /// Build a triple between two resolved entities
    pub fn between(
        head: &Entity,
        relation: impl Into<RelationCode>,
        tail: &Entity,
        evidence: impl Into<String>,
    ) -> Self {
        Self {
            head: head.id.clone(),
            head_name: head.name.clone(),
            head_type: head.entity_type.clone(),
            relation: relation.into(),
            tail: tail.id.clone(),
            tail_name: tail.name.clone(),
            tail_type: tail.entity_type.clone(),
            evidence: evidence.into(),
        }
    }

    /// The `(head_type, tail_type)` pair of this triple
    pub fn type_pair(&self) -> (EntityType, EntityType) {
        (self.head_type.clone(), self.tail_type.clone())
    }
}
