//! Named-Type Registry
//!
//! Session-scoped table from full names to named types. A parser owns one
//! and threads it through every call; it is never global. A type is defined
//! before its body is parsed, so its own fields (and anything after it) can
//! refer to it by name.

use std::collections::HashMap;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use tracing::{debug, trace};

use crate::error::{SchemaError, SchemaResult};
use crate::schema::{Name, Schema, SchemaKind};

/// Named types known to one parsing session
#[derive(Debug, Default, Clone)]
pub struct NameRegistry {
    types: HashMap<Name, Schema>,
    /// Definition order, for stable iteration and rollback
    order: Vec<Name>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named type. Fails if its full name is already taken.
    pub fn define(&mut self, schema: Schema) -> SchemaResult<()> {
        let name = match schema.kind() {
            SchemaKind::Record(_) | SchemaKind::Enum(_) | SchemaKind::Fixed(_) => schema
                .name()
                .cloned()
                .ok_or_else(|| SchemaError::invalid("Named type without a name"))?,
            _ => {
                return Err(SchemaError::invalid(format!(
                    "Only named types can be registered: {}",
                    schema
                )))
            }
        };

        if self.types.contains_key(&name) {
            return Err(SchemaError::DuplicateTypeDefinition(name.fullname()));
        }

        debug!(name = %name, "defined named type");
        self.order.push(name.clone());
        self.types.insert(name, schema);
        Ok(())
    }

    /// Resolve a possibly unqualified name, first inside `enclosing`, then as
    /// an absolute name.
    ///
    /// A type still under construction (a record whose fields are not set)
    /// resolves to a reference node; a completed type resolves to itself.
    pub fn resolve(&self, name: &str, enclosing: Option<&str>) -> SchemaResult<Schema> {
        let found = self
            .lookup(name, enclosing)
            .or_else(|| self.lookup(name, None));

        let Some(schema) = found else {
            return Err(SchemaError::UndefinedName {
                name: name.to_string(),
                suggestion: self.suggest(name),
            });
        };

        match schema.kind() {
            SchemaKind::Record(record) if !record.has_fields() => {
                trace!(name = %record.name(), "forward reference");
                Schema::reference(record.name().clone(), schema.schema_type())
            }
            _ => Ok(schema.clone()),
        }
    }

    fn lookup(&self, name: &str, namespace: Option<&str>) -> Option<&Schema> {
        let key = Name::with_namespace(name, namespace).ok()?;
        self.types.get(&key)
    }

    /// Closest registered full name, if any is close enough to matter
    fn suggest(&self, name: &str) -> Option<String> {
        let matcher = SkimMatcherV2::default();
        self.order
            .iter()
            .map(Name::fullname)
            .filter_map(|candidate| {
                matcher
                    .fuzzy_match(&candidate, name)
                    .map(|score| (score, candidate))
            })
            .max_by_key(|(score, _)| *score)
            .map(|(_, candidate)| candidate)
    }

    pub fn get(&self, name: &Name) -> Option<&Schema> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &Name) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Registered types in definition order
    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Schema)> {
        self.order
            .iter()
            .filter_map(|name| self.types.get_key_value(name))
    }

    /// Marker for `rollback`
    pub(crate) fn checkpoint(&self) -> usize {
        self.order.len()
    }

    /// Forget every type defined after `checkpoint`
    pub(crate) fn rollback(&mut self, checkpoint: usize) {
        for name in self.order.drain(checkpoint..) {
            debug!(name = %name, "rolled back named type");
            self.types.remove(&name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;

    fn fixed(name: &str, namespace: Option<&str>) -> Schema {
        Schema::fixed(name, None, namespace, 4).unwrap()
    }

    #[test]
    fn test_duplicate_definition() {
        let mut registry = NameRegistry::new();
        registry.define(fixed("Id", Some("org"))).unwrap();
        let err = registry.define(fixed("Id", Some("org"))).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateTypeDefinition(ref n) if n == "org.Id"));

        // same simple name, other namespace
        registry.define(fixed("Id", None)).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_only_named_types() {
        let mut registry = NameRegistry::new();
        assert!(registry.define(Schema::int()).is_err());
    }

    #[test]
    fn test_resolve_prefers_enclosing_namespace() {
        let mut registry = NameRegistry::new();
        registry.define(fixed("Id", None)).unwrap();
        registry.define(fixed("Id", Some("org"))).unwrap();

        let inner = registry.resolve("Id", Some("org")).unwrap();
        assert_eq!(inner.fullname(), "org.Id");

        let absolute = registry.resolve("Id", Some("elsewhere")).unwrap();
        assert_eq!(absolute.fullname(), "Id");

        let qualified = registry.resolve("org.Id", None).unwrap();
        assert_eq!(qualified.fullname(), "org.Id");
    }

    #[test]
    fn test_undefined_name_suggests() {
        let mut registry = NameRegistry::new();
        registry.define(fixed("Address", Some("org"))).unwrap();

        let err = registry.resolve("Adress", None).unwrap_err();
        match err {
            SchemaError::UndefinedName { name, suggestion } => {
                assert_eq!(name, "Adress");
                assert_eq!(suggestion.as_deref(), Some("org.Address"));
            }
            other => panic!("Expected UndefinedName, got {:?}", other),
        }
    }

    #[test]
    fn test_record_under_construction_resolves_to_reference() {
        let mut registry = NameRegistry::new();
        let record = Schema::record("Node", None, None, false).unwrap();
        registry.define(record.clone()).unwrap();

        let forward = registry.resolve("Node", None).unwrap();
        assert!(forward.is_ref());

        record
            .set_fields(vec![Field::new("next", forward, None, None).unwrap()])
            .unwrap();
        assert!(!registry.resolve("Node", None).unwrap().is_ref());
    }

    #[test]
    fn test_rollback() {
        let mut registry = NameRegistry::new();
        registry.define(fixed("Kept", None)).unwrap();
        let mark = registry.checkpoint();
        registry.define(fixed("Dropped", None)).unwrap();

        registry.rollback(mark);
        assert_eq!(registry.iter().map(|(n, _)| n.fullname()).collect::<Vec<_>>(), vec!["Kept"]);
    }
}
