//! Alias Projection Engine
//!
//! `apply_aliases(actual, expected)` walks both graphs in parallel and
//! returns a copy of `actual` in which every named type and field that
//! `expected` declares an alias for carries `expected`'s name. The copy can
//! then be matched against `expected` name by name, even when the two
//! schemas evolved independently.
//!
//! Each (actual, expected) pair of named types is projected once. A pair
//! met again while its body is still being projected becomes a reference to
//! the type under construction, so recursive schemas terminate.
//!
//! Projection never fails. Where nothing matches, the actual node is copied
//! as is.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::schema::{Field, Name, Properties, Schema, SchemaKind, SchemaType};

/// Project `actual` onto the names of `expected`.
///
/// The result is always a new graph, also when nothing was renamed.
pub fn apply_aliases(actual: &Schema, expected: &Schema) -> Schema {
    Projection::new(actual, expected).project(actual, expected)
}

struct Projection {
    actual_types: HashMap<Name, Schema>,
    expected_types: HashMap<Name, Schema>,
    /// Result per projected pair; `None` while the body is in progress
    pairs: HashMap<(Name, Name), Option<Schema>>,
    /// Result name of every actual type copied or projected so far
    renames: HashMap<Name, Name>,
    /// Named types already present in the result
    defined: HashSet<Name>,
}

impl Projection {
    fn new(actual: &Schema, expected: &Schema) -> Self {
        Self {
            actual_types: actual.definitions(),
            expected_types: expected.definitions(),
            pairs: HashMap::new(),
            renames: HashMap::new(),
            defined: HashSet::new(),
        }
    }

    fn resolve_actual(&self, schema: &Schema) -> Schema {
        resolve(&self.actual_types, schema)
    }

    fn resolve_expected(&self, schema: &Schema) -> Schema {
        resolve(&self.expected_types, schema)
    }

    fn project(&mut self, actual: &Schema, expected: &Schema) -> Schema {
        let actual_def = self.resolve_actual(actual);
        let expected_def = self.resolve_expected(expected);

        // a type that became a union branch (e.g. a field made optional)
        if is_union(&expected_def) && !is_union(&actual_def) {
            let branches = self.resolved_branches(&expected_def);
            return match self.counterpart(&actual_def, &branches) {
                Some(branch) => self.project(actual, &branch),
                None => self.copy(actual),
            };
        }

        if actual_def.schema_type().is_named() {
            return match self.target_name(&actual_def, &expected_def) {
                Some(target) => self.project_named(&actual_def, &expected_def, target),
                None => self.copy(actual),
            };
        }

        match (actual_def.kind(), expected_def.kind()) {
            (SchemaKind::Array(a), SchemaKind::Array(e)) => {
                let items = self.project(a, e);
                Schema::array(items).with_props(actual_def.props().clone())
            }
            (SchemaKind::Map(a), SchemaKind::Map(e)) => {
                let values = self.project(a, e);
                Schema::map(values).with_props(actual_def.props().clone())
            }
            (SchemaKind::Union(_), SchemaKind::Union(_)) => {
                let branches = self.resolved_branches(&expected_def);
                self.project_union(&actual_def, &branches)
            }
            // a union that became one of its branches
            (SchemaKind::Union(_), _) => self.project_union(&actual_def, &[expected_def.clone()]),
            _ => self.copy(actual),
        }
    }

    /// The name the actual named type takes in the result, when `expected`
    /// claims it by name or alias
    fn target_name(&self, actual: &Schema, expected: &Schema) -> Option<Name> {
        if actual.schema_type() != expected.schema_type() {
            return None;
        }
        let (actual_name, expected_name) = (actual.name()?, expected.name()?);
        let claimed = actual_name == expected_name
            || expected
                .alias_names()
                .is_some_and(|aliases| aliases.contains(actual_name));
        claimed.then(|| expected_name.clone())
    }

    fn project_named(&mut self, actual: &Schema, expected: &Schema, target: Name) -> Schema {
        let Some(actual_name) = actual.name().cloned() else {
            return self.copy(actual);
        };
        let Some(expected_name) = expected.name().cloned() else {
            return self.copy(actual);
        };

        let key = (actual_name.clone(), expected_name);
        match self.pairs.get(&key) {
            Some(Some(done)) => return done.clone(),
            Some(None) => {
                trace!(name = %target, "recursive alias projection");
                return reference(&target, actual.schema_type());
            }
            None => {}
        }

        // another actual type already took this name in the result
        let target = if self.defined.contains(&target) {
            actual_name.clone()
        } else {
            target
        };
        if self.defined.contains(&target) {
            return reference(&target, actual.schema_type());
        }
        if target != actual_name {
            debug!(from = %actual_name, to = %target, "applied type alias");
        }

        self.pairs.insert(key.clone(), None);
        self.renames.insert(actual_name, target.clone());
        self.defined.insert(target.clone());

        let result = actual.fresh_copy(Some(target));
        if let SchemaKind::Record(record) = actual.kind() {
            let fields = self.project_fields(record.fields(), expected.fields());
            set_fields(&result, fields);
        }

        self.pairs.insert(key, Some(result.clone()));
        result
    }

    fn project_fields(&mut self, actual: &[Field], expected: &[Field]) -> Vec<Field> {
        let mut claimed: HashSet<&str> = HashSet::new();
        let mut names: HashSet<String> = actual.iter().map(|f| f.name().to_string()).collect();

        actual
            .iter()
            .map(|field| {
                // an exact name beats an alias
                let counterpart = expected
                    .iter()
                    .find(|e| e.name() == field.name())
                    .or_else(|| {
                        expected
                            .iter()
                            .find(|e| e.aliases().contains(field.name()) && !claimed.contains(e.name()))
                    });

                let Some(counterpart) = counterpart else {
                    let schema = self.copy(field.schema());
                    return field.renamed(field.name(), schema);
                };
                claimed.insert(counterpart.name());

                let schema = self.project(field.schema(), counterpart.schema());
                let name = if counterpart.name() == field.name() {
                    field.name()
                } else if names.insert(counterpart.name().to_string()) {
                    debug!(from = field.name(), to = counterpart.name(), "applied field alias");
                    names.remove(field.name());
                    counterpart.name()
                } else {
                    field.name()
                };
                field.renamed(name, schema)
            })
            .collect()
    }

    fn resolved_branches(&self, expected: &Schema) -> Vec<Schema> {
        expected
            .branches()
            .iter()
            .map(|branch| self.resolve_expected(branch))
            .collect()
    }

    /// The expected branch an actual type matches, by discriminant first
    /// and then by named-type alias
    fn counterpart(&self, actual_def: &Schema, expected_branches: &[Schema]) -> Option<Schema> {
        expected_branches
            .iter()
            .find(|e| e.discriminant() == actual_def.discriminant())
            .or_else(|| {
                expected_branches
                    .iter()
                    .find(|e| self.target_name(actual_def, e).is_some())
            })
            .cloned()
    }

    /// Project each actual branch onto its counterpart among the resolved
    /// `expected_branches`
    fn project_union(&mut self, actual: &Schema, expected_branches: &[Schema]) -> Schema {
        let branches: Vec<Schema> = actual
            .branches()
            .iter()
            .map(|branch| {
                let branch_def = self.resolve_actual(branch);
                match self.counterpart(&branch_def, expected_branches) {
                    Some(counterpart) => self.project(branch, &counterpart),
                    None => self.copy(branch),
                }
            })
            .collect();

        self.union_or_copy(actual, branches)
    }

    /// Copy of an actual node that `expected` has nothing to say about.
    /// Named types already in the result are referenced under their result
    /// name.
    fn copy(&mut self, actual: &Schema) -> Schema {
        if let SchemaKind::Ref { name, ty } = actual.kind() {
            if let Some(renamed) = self.renames.get(name) {
                return reference(renamed, *ty);
            }
            let definition = self.resolve_actual(actual);
            if definition.is_ref() {
                return actual.fresh_copy(None);
            }
            return self.copy(&definition);
        }

        if let Some(name) = actual.name().filter(|_| actual.schema_type().is_named()) {
            if let Some(renamed) = self.renames.get(name) {
                return reference(renamed, actual.schema_type());
            }
            if self.defined.contains(name) {
                return reference(name, actual.schema_type());
            }
            self.renames.insert(name.clone(), name.clone());
            self.defined.insert(name.clone());

            let result = actual.fresh_copy(None);
            if let SchemaKind::Record(record) = actual.kind() {
                let fields = record
                    .fields()
                    .iter()
                    .map(|field| {
                        let schema = self.copy(field.schema());
                        field.renamed(field.name(), schema)
                    })
                    .collect();
                set_fields(&result, fields);
            }
            return result;
        }

        match actual.kind() {
            SchemaKind::Array(items) => {
                let items = self.copy(items);
                Schema::array(items).with_props(actual.props().clone())
            }
            SchemaKind::Map(values) => {
                let values = self.copy(values);
                Schema::map(values).with_props(actual.props().clone())
            }
            SchemaKind::Union(union) => {
                let branches = union.branches().iter().map(|b| self.copy(b)).collect();
                self.union_or_copy(actual, branches)
            }
            _ => actual.fresh_copy(None),
        }
    }

    fn union_or_copy(&self, actual: &Schema, branches: Vec<Schema>) -> Schema {
        match Schema::union(branches) {
            Ok(union) => union.with_props(actual.props().clone()),
            Err(e) => {
                debug!(error = %e, "kept union branches unprojected");
                actual.fresh_copy(None)
            }
        }
    }
}

fn resolve(table: &HashMap<Name, Schema>, schema: &Schema) -> Schema {
    match schema.kind() {
        SchemaKind::Ref { name, .. } => table.get(name).cloned().unwrap_or_else(|| schema.clone()),
        _ => schema.clone(),
    }
}

fn is_union(schema: &Schema) -> bool {
    matches!(schema.kind(), SchemaKind::Union(_))
}

/// `ty` is always the tag of a named type taken from the result graph
fn reference(name: &Name, ty: SchemaType) -> Schema {
    Schema::from_parts(SchemaKind::Ref { name: name.clone(), ty }, Properties::new())
}

/// `record` is a fresh unfielded copy, and `project_fields` only renames a
/// field to a name no other field holds, so the list is always accepted.
fn set_fields(record: &Schema, fields: Vec<Field>) {
    let outcome = record.set_fields(fields);
    debug_assert!(outcome.is_ok(), "projected fields rejected: {:?}", outcome.err());
}
