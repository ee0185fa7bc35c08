//! Gatekeeper configuration

/// Which validation filters a [`Gatekeeper`](crate::Gatekeeper) runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Drop triples whose relation is not declared in the schema
    pub check_labels: bool,

    /// Drop triples whose head or tail type is outside the known vocabulary
    pub check_entity_types: bool,

    /// Drop triples whose type pair was never observed for their relation
    /// (only when a constraint table is supplied)
    pub check_domain_range: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            check_labels: true,
            check_entity_types: true,
            check_domain_range: true,
        }
    }
}

impl ValidationConfig {
    /// Label and type checks, as applied right after a single extraction call
    pub fn single_pass() -> Self {
        Self {
            check_domain_range: false,
            ..Self::default()
        }
    }

    /// Label check only
    pub fn labels_only() -> Self {
        Self {
            check_labels: true,
            check_entity_types: false,
            check_domain_range: false,
        }
    }

    /// Domain/range check only
    pub fn constraints_only() -> Self {
        Self {
            check_labels: false,
            check_entity_types: false,
            check_domain_range: true,
        }
    }
}
