//! Schema rendering
//!
//! `to_json` produces the full text form: parsing it back gives a
//! structurally equal schema. A named type is written out in full at its
//! first occurrence and by name afterwards, and namespaces are only written
//! where they differ from the enclosing one.
//!
//! `canonical_form` produces Parsing Canonical Form: only what affects
//! parsing of data is kept (no docs, aliases, properties or defaults), names
//! are fully qualified, keys come in a fixed order and there is no
//! whitespace.

use std::collections::HashSet;
use std::fmt;

use serde_json::{Map, Value};

use crate::config::OutputFormat;
use crate::schema::{Field, Name, Order, Schema, SchemaKind};

struct Renderer {
    emitted: HashSet<Name>,
}

impl Renderer {
    fn new() -> Self {
        Self {
            emitted: HashSet::new(),
        }
    }

    fn schema(&mut self, schema: &Schema, enclosing: Option<&str>) -> Value {
        let kind = schema.kind();
        let type_name = schema.schema_type().name();

        let mut object = Map::new();
        match kind {
            SchemaKind::Ref { name, .. } => return Value::String(name.qualified_in(enclosing)),
            SchemaKind::Union(union) => {
                return Value::Array(
                    union
                        .branches()
                        .iter()
                        .map(|branch| self.schema(branch, enclosing))
                        .collect(),
                )
            }
            SchemaKind::Array(items) => {
                object.insert("type".into(), type_name.into());
                object.insert("items".into(), self.schema(items, enclosing));
            }
            SchemaKind::Map(values) => {
                object.insert("type".into(), type_name.into());
                object.insert("values".into(), self.schema(values, enclosing));
            }
            SchemaKind::Record(_) | SchemaKind::Enum(_) | SchemaKind::Fixed(_) => {
                return self.named(schema, enclosing);
            }
            _ => {
                if schema.props().is_empty() {
                    return Value::String(type_name.to_string());
                }
                object.insert("type".into(), type_name.into());
            }
        }
        extend_props(&mut object, schema);
        Value::Object(object)
    }

    fn named(&mut self, schema: &Schema, enclosing: Option<&str>) -> Value {
        let Some(name) = schema.name() else {
            return Value::Null;
        };
        if !self.emitted.insert(name.clone()) {
            return Value::String(name.qualified_in(enclosing));
        }

        let mut object = Map::new();
        let type_name = match schema.as_record() {
            Some(record) if record.is_error() => "error",
            _ => schema.schema_type().name(),
        };
        object.insert("type".into(), type_name.into());
        object.insert("name".into(), name.name().into());
        if name.namespace() != enclosing {
            object.insert("namespace".into(), name.namespace().unwrap_or("").into());
        }
        if let Some(doc) = schema.doc() {
            object.insert("doc".into(), doc.into());
        }

        match schema.kind() {
            SchemaKind::Record(record) => {
                let fields = record
                    .fields()
                    .iter()
                    .map(|field| self.field(field, name.namespace()))
                    .collect();
                object.insert("fields".into(), Value::Array(fields));
            }
            SchemaKind::Enum(e) => {
                object.insert("symbols".into(), e.symbols().into());
                if let Some(default) = e.default_symbol() {
                    object.insert("default".into(), default.into());
                }
            }
            SchemaKind::Fixed(f) => {
                object.insert("size".into(), f.size().into());
            }
            _ => {}
        }

        if let Some(aliases) = schema.alias_names().filter(|a| !a.is_empty()) {
            let aliases: Vec<Value> = aliases
                .iter()
                .map(|alias| Value::String(alias.qualified_in(name.namespace())))
                .collect();
            object.insert("aliases".into(), Value::Array(aliases));
        }
        extend_props(&mut object, schema);
        Value::Object(object)
    }

    fn field(&mut self, field: &Field, namespace: Option<&str>) -> Value {
        let mut object = Map::new();
        object.insert("name".into(), field.name().into());
        object.insert("type".into(), self.schema(field.schema(), namespace));
        if let Some(doc) = field.doc() {
            object.insert("doc".into(), doc.into());
        }
        if let Some(default) = field.default_value() {
            object.insert("default".into(), default.clone());
        }
        if field.order() != Order::Ascending {
            object.insert("order".into(), field.order().as_str().into());
        }
        if !field.aliases().is_empty() {
            object.insert("aliases".into(), field.aliases().iter().cloned().collect());
        }
        for (key, value) in field.props() {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}

fn extend_props(object: &mut Map<String, Value>, schema: &Schema) {
    for (key, value) in schema.props() {
        object.insert(key.clone(), value.clone());
    }
}

/// Full JSON form of a schema
pub fn to_json(schema: &Schema) -> Value {
    Renderer::new().schema(schema, None)
}

/// Render as text in the given format
pub fn render(schema: &Schema, format: OutputFormat) -> String {
    let json = to_json(schema);
    match format {
        OutputFormat::Compact => json.to_string(),
        // serializing a Value can't fail
        OutputFormat::Pretty => serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string()),
    }
}

/// Parsing Canonical Form of a schema
pub fn canonical_form(schema: &Schema) -> String {
    let mut seen = HashSet::new();
    canonical(schema, &mut seen).to_string()
}

fn canonical(schema: &Schema, seen: &mut HashSet<Name>) -> Value {
    let mut object = Map::new();
    match schema.kind() {
        SchemaKind::Ref { name, .. } => return Value::String(name.fullname()),
        SchemaKind::Union(union) => {
            return Value::Array(union.branches().iter().map(|b| canonical(b, seen)).collect())
        }
        SchemaKind::Array(items) => {
            object.insert("type".into(), "array".into());
            object.insert("items".into(), canonical(items, seen));
        }
        SchemaKind::Map(values) => {
            object.insert("type".into(), "map".into());
            object.insert("values".into(), canonical(values, seen));
        }
        SchemaKind::Record(_) | SchemaKind::Enum(_) | SchemaKind::Fixed(_) => {
            let Some(name) = schema.name() else {
                return Value::Null;
            };
            if !seen.insert(name.clone()) {
                return Value::String(name.fullname());
            }
            object.insert("name".into(), name.fullname().into());
            object.insert("type".into(), schema.schema_type().name().into());
            match schema.kind() {
                SchemaKind::Record(record) => {
                    let fields = record
                        .fields()
                        .iter()
                        .map(|field| {
                            let mut f = Map::new();
                            f.insert("name".into(), field.name().into());
                            f.insert("type".into(), canonical(field.schema(), seen));
                            Value::Object(f)
                        })
                        .collect();
                    object.insert("fields".into(), Value::Array(fields));
                }
                SchemaKind::Enum(e) => {
                    object.insert("symbols".into(), e.symbols().into());
                }
                SchemaKind::Fixed(f) => {
                    object.insert("size".into(), f.size().into());
                }
                _ => {}
            }
        }
        _ => return Value::String(schema.schema_type().name().to_string()),
    }
    Value::Object(object)
}

impl Schema {
    /// Full JSON form
    pub fn to_json(&self) -> Value {
        to_json(self)
    }

    /// Indented text form
    pub fn to_pretty_string(&self) -> String {
        render(self, OutputFormat::Pretty)
    }

    /// Parsing Canonical Form
    pub fn canonical_form(&self) -> String {
        canonical_form(self)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", to_json(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_schema;

    #[test]
    fn test_primitive_rendering() {
        assert_eq!(Schema::int().to_string(), r#""int""#);
        let mut tagged = Schema::string();
        tagged
            .add_prop("avro.java.string", Value::from("String"))
            .unwrap();
        assert_eq!(tagged.to_string(), r#"{"type":"string","avro.java.string":"String"}"#);
    }

    #[test]
    fn test_empty_record_renders() {
        let record = Schema::record("foobar", None, None, false).unwrap();
        assert_eq!(record.to_string(), r#"{"type":"record","name":"foobar","fields":[]}"#);
        assert_eq!(parse_schema(&record.to_string()).unwrap(), record);
    }

    #[test]
    fn test_repeated_named_type_written_once() {
        let schema = parse_schema(
            r#"{"type": "record", "name": "Pair", "namespace": "p", "fields": [
                {"name": "a", "type": {"type": "fixed", "name": "Id", "size": 4}},
                {"name": "b", "type": "Id"}
            ]}"#,
        )
        .unwrap();

        let text = schema.to_string();
        assert_eq!(text.matches(r#""size":4"#).count(), 1);
        assert!(text.contains(r#""type":"Id""#));
        assert_eq!(parse_schema(&text).unwrap(), schema);
    }

    #[test]
    fn test_null_namespace_inside_namespace() {
        let schema = parse_schema(
            r#"{"type": "record", "name": "Outer", "namespace": "org", "fields": [
                {"name": "x", "type": {"type": "enum", "name": "Plain", "namespace": "", "symbols": ["A"]}}
            ]}"#,
        )
        .unwrap();

        let reparsed = parse_schema(&schema.to_string()).unwrap();
        assert_eq!(reparsed.field("x").unwrap().schema().fullname(), "Plain");
    }

    #[test]
    fn test_canonical_form() {
        let schema = parse_schema(
            r#"{"type": "record", "name": "User", "namespace": "org", "doc": "dropped",
                "aliases": ["Person"], "fields": [
                {"name": "id", "type": {"type": "long", "x": 1}, "default": 0},
                {"name": "friend", "type": ["null", "User"]}
            ]}"#,
        )
        .unwrap();

        assert_eq!(
            schema.canonical_form(),
            r#"{"name":"org.User","type":"record","fields":[{"name":"id","type":"long"},{"name":"friend","type":["null","org.User"]}]}"#
        );
    }

    #[test]
    fn test_field_order_and_aliases_render() {
        let schema = parse_schema(
            r#"{"type": "record", "name": "R", "fields": [
                {"name": "n", "type": "int", "order": "ignore", "aliases": ["m"]}
            ]}"#,
        )
        .unwrap();
        let text = schema.to_string();
        assert!(text.contains(r#""order":"ignore""#));
        assert!(text.contains(r#""aliases":["m"]"#));
    }
}
