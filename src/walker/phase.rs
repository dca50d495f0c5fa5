//! Traversal phase metadata

use std::fmt;

use serde::Serialize;

/// Relationship between the walker's current node and the node it started from.
///
/// Purely informational: the phase never changes which nodes are visited,
/// except through the skip flags in `Restrictions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Nothing has been visited yet.
    #[default]
    Initial,
    /// On the start node's ancestor chain (backward walks only).
    Ancestor,
    /// Entered a first child inside the start node's subtree.
    Descendant,
    /// Moved to a next sibling that is still inside the start node's subtree.
    Sibling,
    /// Entered a leaf-predicate node inside the start node's subtree.
    Leaf,
    /// Outside the start node's subtree and off its ancestor chain.
    Other,
}

impl Phase {
    pub fn is_within_initial_subtree(self) -> bool {
        matches!(self, Phase::Descendant | Phase::Sibling | Phase::Leaf)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Initial => "initial",
            Phase::Ancestor => "ancestor",
            Phase::Descendant => "descendant",
            Phase::Sibling => "sibling",
            Phase::Leaf => "leaf",
            Phase::Other => "other",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_initial_subtree() {
        assert!(Phase::Descendant.is_within_initial_subtree());
        assert!(Phase::Sibling.is_within_initial_subtree());
        assert!(Phase::Leaf.is_within_initial_subtree());
        assert!(!Phase::Initial.is_within_initial_subtree());
        assert!(!Phase::Ancestor.is_within_initial_subtree());
        assert!(!Phase::Other.is_within_initial_subtree());
    }

    #[test]
    fn test_phase_serializes_lowercase() {
        let json = serde_json::to_string(&Phase::Ancestor).unwrap();
        assert_eq!(json, "\"ancestor\"");
        assert_eq!(Phase::Other.to_string(), "other");
    }
}
