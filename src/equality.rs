//! Structural Equality & Hashing
//!
//! Two schemas are equal when they have the same shape: same type tag, same
//! full name for named types, same fields (name, type, default), symbols,
//! size, children and branches. Docs, aliases, properties and field sort
//! order do not take part.
//!
//! References are resolved through each side's own definition table, and
//! every named pair is compared once per traversal, so comparison
//! terminates on self- and mutually-recursive graphs. Named types and
//! references hash by tag and full name only, which keeps a reference and
//! its definition in the same bucket.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use crate::schema::{Field, Name, Schema, SchemaKind};

/// Lazily built definition table for one side of a comparison
struct Side<'a> {
    root: &'a Schema,
    table: Option<HashMap<Name, Schema>>,
}

impl<'a> Side<'a> {
    fn new(root: &'a Schema) -> Self {
        Self { root, table: None }
    }

    /// The definition behind `schema`: itself, or what a reference names
    fn resolve(&mut self, schema: &Schema) -> Option<Schema> {
        match schema.kind() {
            SchemaKind::Ref { name, .. } => {
                let root = self.root;
                self.table
                    .get_or_insert_with(|| root.definitions())
                    .get(name)
                    .cloned()
            }
            _ => Some(schema.clone()),
        }
    }
}

struct Comparison<'a> {
    left: Side<'a>,
    right: Side<'a>,
    seen: HashSet<Name>,
}

impl<'a> Comparison<'a> {
    fn new(left: &'a Schema, right: &'a Schema) -> Self {
        Self {
            left: Side::new(left),
            right: Side::new(right),
            seen: HashSet::new(),
        }
    }

    fn schemas(&mut self, a: &Schema, b: &Schema) -> bool {
        if Schema::ptr_eq(a, b) {
            return true;
        }
        if a.schema_type() != b.schema_type() {
            return false;
        }

        if a.schema_type().is_named() {
            let (Some(a_name), Some(b_name)) = (a.name(), b.name()) else {
                return false;
            };
            if a_name != b_name {
                return false;
            }
            if !self.seen.insert(a_name.clone()) {
                return true;
            }
            return match (self.left.resolve(a), self.right.resolve(b)) {
                (Some(a), Some(b)) => self.named_bodies(&a, &b),
                // a dangling reference can only be judged by its name
                _ => true,
            };
        }

        match (a.kind(), b.kind()) {
            (SchemaKind::Array(a), SchemaKind::Array(b)) => self.schemas(a, b),
            (SchemaKind::Map(a), SchemaKind::Map(b)) => self.schemas(a, b),
            (SchemaKind::Union(a), SchemaKind::Union(b)) => {
                a.branches().len() == b.branches().len()
                    && a.branches()
                        .iter()
                        .zip(b.branches())
                        .all(|(a, b)| self.schemas(a, b))
            }
            // same primitive tag
            _ => true,
        }
    }

    fn named_bodies(&mut self, a: &Schema, b: &Schema) -> bool {
        match (a.kind(), b.kind()) {
            (SchemaKind::Record(a), SchemaKind::Record(b)) => {
                a.fields().len() == b.fields().len()
                    && a.fields()
                        .iter()
                        .zip(b.fields())
                        .all(|(a, b)| self.fields(a, b))
            }
            (SchemaKind::Enum(a), SchemaKind::Enum(b)) => a.symbols() == b.symbols(),
            (SchemaKind::Fixed(a), SchemaKind::Fixed(b)) => a.size() == b.size(),
            _ => false,
        }
    }

    fn fields(&mut self, a: &Field, b: &Field) -> bool {
        a.name() == b.name()
            && a.default_value() == b.default_value()
            && self.schemas(a.schema(), b.schema())
    }
}

/// Structural equality of two schema graphs
pub fn schemas_equal(a: &Schema, b: &Schema) -> bool {
    Comparison::new(a, b).schemas(a, b)
}

/// Structural hash of one node, consistent with `schemas_equal`
pub(crate) fn compute_hash(schema: &Schema) -> u64 {
    let mut hasher = DefaultHasher::new();
    schema.schema_type().name().hash(&mut hasher);
    match schema.kind() {
        SchemaKind::Array(child) | SchemaKind::Map(child) => {
            hasher.write_u64(child.structural_hash());
        }
        SchemaKind::Union(union) => {
            for branch in union.branches() {
                hasher.write_u64(branch.structural_hash());
            }
        }
        _ => {
            if let Some(name) = schema.name() {
                name.hash(&mut hasher);
            }
        }
    }
    hasher.finish()
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        schemas_equal(self, other)
    }
}

impl Eq for Schema {}

impl Hash for Schema {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.structural_hash());
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        Comparison::new(self.schema(), other.schema()).fields(self, other)
    }
}
