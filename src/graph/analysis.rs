//! Recursion Analysis
//!
//! Finds the named types that can reach themselves: strongly connected
//! components of the type graph, plus single types with a self loop.

use petgraph::algo::kosaraju_scc;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::{TypeGraph, TypeId};

// =============================================================================
// Field Path Segment
// =============================================================================

/// One step from a record down to a named type it references
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldPathSegment {
    /// A record field
    Field(String),
    /// Array items
    ArrayItems,
    /// Map values
    MapValues,
    /// A union branch, by position
    Branch(usize),
}

impl std::fmt::Display for FieldPathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Field(name) => write!(f, ".{}", name),
            Self::ArrayItems => write!(f, "[]"),
            Self::MapValues => write!(f, "[*]"),
            Self::Branch(i) => write!(f, "<{}>", i),
        }
    }
}

/// Path from a record to a referenced named type
pub type FieldPath = Vec<FieldPathSegment>;

pub fn format_field_path(path: &FieldPath) -> String {
    if path.is_empty() {
        return String::from("<root>");
    }
    path.iter().map(|s| s.to_string()).collect::<String>()
}

/// A reference that closes a cycle
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecursiveEdge {
    pub from_type: TypeId,
    pub field_path: FieldPath,
    pub to_type: TypeId,
    pub group_id: usize,
}

/// Named types that reach each other
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecursionGroup {
    pub id: usize,
    pub members: Vec<TypeId>,
    pub edges: Vec<RecursiveEdge>,
    /// A single type referencing itself
    pub is_self_referential: bool,
}

/// Recursion analysis of a type graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecursionAnalysis {
    pub groups: Vec<RecursionGroup>,
    membership: HashMap<TypeId, usize>,
}

impl RecursionAnalysis {
    pub fn is_recursive(&self, type_id: &str) -> bool {
        self.membership.contains_key(type_id)
    }

    pub fn group_of(&self, type_id: &str) -> Option<&RecursionGroup> {
        self.groups.get(*self.membership.get(type_id)?)
    }

    /// Every recursive type, sorted by full name
    pub fn recursive_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.membership.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

/// Compute recursion groups for a type graph
pub fn compute_recursion(graph: &TypeGraph) -> RecursionAnalysis {
    let mut analysis = RecursionAnalysis::default();

    for scc in kosaraju_scc(&graph.graph) {
        let is_cycle = scc.len() > 1
            || graph
                .graph
                .edges_directed(scc[0], Direction::Outgoing)
                .any(|e| e.target() == scc[0]);
        if !is_cycle {
            continue;
        }

        let id = analysis.groups.len();
        let inside: HashSet<_> = scc.iter().copied().collect();
        let mut members: Vec<TypeId> = scc
            .iter()
            .filter_map(|idx| graph.graph.node_weight(*idx).cloned())
            .collect();
        members.sort();

        let mut edges = Vec::new();
        for &node in &scc {
            for edge in graph.graph.edges_directed(node, Direction::Outgoing) {
                if !inside.contains(&edge.target()) {
                    continue;
                }
                edges.push(RecursiveEdge {
                    from_type: graph.graph[edge.source()].clone(),
                    field_path: edge.weight().clone(),
                    to_type: graph.graph[edge.target()].clone(),
                    group_id: id,
                });
            }
        }

        for member in &members {
            analysis.membership.insert(member.clone(), id);
        }
        analysis.groups.push(RecursionGroup {
            id,
            is_self_referential: members.len() == 1,
            members,
            edges,
        });
    }

    analysis
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_path_segment_display() {
        assert_eq!(FieldPathSegment::Field("name".into()).to_string(), ".name");
        assert_eq!(FieldPathSegment::MapValues.to_string(), "[*]");
        assert_eq!(FieldPathSegment::Branch(1).to_string(), "<1>");
        assert_eq!(FieldPathSegment::ArrayItems.to_string(), "[]");
    }

    #[test]
    fn test_format_field_path() {
        let path = vec![
            FieldPathSegment::Field("children".into()),
            FieldPathSegment::ArrayItems,
            FieldPathSegment::Branch(1),
        ];
        assert_eq!(format_field_path(&path), ".children[]<1>");
        assert_eq!(format_field_path(&Vec::new()), "<root>");
    }
}
