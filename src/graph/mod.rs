//! Named-Type Graph
//!
//! Nodes are the named types of one or more schemas, edges are references
//! from a record's fields to the named types they use, labelled with the
//! field path. Built with petgraph so recursion (self and mutual) can be
//! found with SCCs.

pub mod analysis;
pub mod loader;

pub use analysis::{
    compute_recursion, format_field_path, FieldPath, FieldPathSegment, RecursionAnalysis,
    RecursionGroup, RecursiveEdge,
};
pub use loader::{load_file, load_from_directory, schema_files, LoadConfig};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::parser::Parser;
use crate::schema::{Schema, SchemaKind};

/// Full name of a named type
pub type TypeId = String;

/// Reference graph over named types
#[derive(Debug, Default)]
pub struct TypeGraph {
    pub(crate) graph: DiGraph<TypeId, FieldPath>,
    pub(crate) node_indices: HashMap<TypeId, NodeIndex>,
}

impl TypeGraph {
    pub fn from_schema(schema: &Schema) -> Self {
        Self::from_schemas(std::iter::once(schema))
    }

    /// One graph over several schemas, e.g. every type a parser has seen
    pub fn from_schemas<'a, I>(schemas: I) -> Self
    where
        I: IntoIterator<Item = &'a Schema>,
    {
        let mut graph = Self::default();
        for schema in schemas {
            let mut definitions: Vec<Schema> = schema.definitions().into_values().collect();
            definitions.sort_by_key(Schema::fullname);
            for definition in definitions {
                graph.add_type(&definition);
            }
        }
        debug!(
            types = graph.graph.node_count(),
            references = graph.graph.edge_count(),
            "built type graph"
        );
        graph
    }

    /// Graph over every schema file in a directory, loaded into `parser`.
    /// Types the parser already held are part of the graph too.
    pub fn from_directory(parser: &mut Parser, dir: &Path) -> anyhow::Result<Self> {
        load_from_directory(parser, dir, &LoadConfig::default())?;
        Ok(Self::from_schemas(parser.types()))
    }

    fn node(&mut self, id: TypeId) -> NodeIndex {
        if let Some(&index) = self.node_indices.get(&id) {
            return index;
        }
        let index = self.graph.add_node(id.clone());
        self.node_indices.insert(id, index);
        index
    }

    fn add_type(&mut self, definition: &Schema) {
        let from = definition.fullname();
        let from_index = self.node(from.clone());
        // the same type reached from two schemas only needs its edges once
        if self.graph.edges_directed(from_index, Direction::Outgoing).next().is_some() {
            return;
        }

        let mut references = Vec::new();
        for field in definition.fields() {
            let mut path = vec![FieldPathSegment::Field(field.name().to_string())];
            collect_references(field.schema(), &mut path, &mut references);
        }
        for (to, path) in references {
            let to_index = self.node(to);
            self.graph.add_edge(from_index, to_index, path);
        }
    }

    pub fn type_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn reference_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.node_indices.contains_key(type_id)
    }

    /// Types referenced by `type_id`'s fields
    pub fn dependencies(&self, type_id: &str) -> Vec<&str> {
        self.neighbors(type_id, Direction::Outgoing)
    }

    /// Types whose fields reference `type_id`
    pub fn dependents(&self, type_id: &str) -> Vec<&str> {
        self.neighbors(type_id, Direction::Incoming)
    }

    fn neighbors(&self, type_id: &str, direction: Direction) -> Vec<&str> {
        let Some(&index) = self.node_indices.get(type_id) else {
            return Vec::new();
        };
        let mut names: Vec<&str> = self
            .graph
            .neighbors_directed(index, direction)
            .map(|n| self.graph[n].as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn recursion(&self) -> RecursionAnalysis {
        compute_recursion(self)
    }
}

/// Named types used by `schema`, without descending into them
fn collect_references(schema: &Schema, path: &mut FieldPath, out: &mut Vec<(TypeId, FieldPath)>) {
    match schema.kind() {
        SchemaKind::Record(_) | SchemaKind::Enum(_) | SchemaKind::Fixed(_) | SchemaKind::Ref { .. } => {
            out.push((schema.fullname(), path.clone()));
        }
        SchemaKind::Array(items) => {
            path.push(FieldPathSegment::ArrayItems);
            collect_references(items, path, out);
            path.pop();
        }
        SchemaKind::Map(values) => {
            path.push(FieldPathSegment::MapValues);
            collect_references(values, path, out);
            path.pop();
        }
        SchemaKind::Union(union) => {
            for (i, branch) in union.branches().iter().enumerate() {
                path.push(FieldPathSegment::Branch(i));
                collect_references(branch, path, out);
                path.pop();
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_schema, Parser};

    #[test]
    fn test_self_reference() {
        let schema = parse_schema(
            r#"{"type": "record", "name": "Node", "namespace": "list", "fields": [
                {"name": "next", "type": ["null", "Node"]},
                {"name": "tag", "type": {"type": "enum", "name": "Tag", "symbols": ["A"]}}
            ]}"#,
        )
        .unwrap();

        let graph = TypeGraph::from_schema(&schema);
        assert_eq!(graph.type_count(), 2);
        assert_eq!(graph.dependencies("list.Node"), vec!["list.Node", "list.Tag"]);

        let recursion = graph.recursion();
        assert_eq!(recursion.recursive_types(), vec!["list.Node"]);
        let group = recursion.group_of("list.Node").unwrap();
        assert!(group.is_self_referential);
        assert_eq!(format_field_path(&group.edges[0].field_path), ".next<1>");
    }

    #[test]
    fn test_mutual_recursion_across_parses() {
        let mut parser = Parser::new();
        parser
            .parse(
                r#"{"type": "record", "name": "Tree", "fields": [
                    {"name": "children", "type": {"type": "array", "items": {
                        "type": "record", "name": "Branch", "fields": [
                            {"name": "subtree", "type": "Tree"}
                        ]}}}
                ]}"#,
            )
            .unwrap();
        parser
            .parse(r#"{"type": "record", "name": "Leaf", "fields": [{"name": "owner", "type": "Branch"}]}"#)
            .unwrap();

        let graph = TypeGraph::from_schemas(parser.types());
        let recursion = graph.recursion();
        assert_eq!(recursion.recursive_types(), vec!["Branch", "Tree"]);
        assert!(!recursion.is_recursive("Leaf"));
        assert_eq!(graph.dependents("Branch"), vec!["Leaf", "Tree"]);
    }

    #[test]
    fn test_directory_follows_parser_settings() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("counter.avsc"),
            r#"{"type": "record", "name": "Counter", "fields": [
                {"name": "count", "type": "int", "default": "zero"},
                {"name": "next", "type": ["null", "Counter"]}
            ]}"#,
        )
        .unwrap();

        assert!(TypeGraph::from_directory(&mut Parser::new(), dir.path()).is_err());

        let mut lenient = Parser::new().validate_defaults(false);
        let graph = TypeGraph::from_directory(&mut lenient, dir.path()).unwrap();
        assert_eq!(graph.recursion().recursive_types(), vec!["Counter"]);
    }
}
