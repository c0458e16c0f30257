//! Textual Parser
//!
//! Turns schema text into a schema graph. Named types are registered in the
//! parser's `NameRegistry` before their bodies are parsed, which is what
//! makes self and forward references work. One parser may be reused for
//! several documents; types accumulate across calls, and a failed call
//! leaves the registry as it found it.

use std::str::FromStr;

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::ParserConfig;
use crate::error::{SchemaError, SchemaResult};
use crate::registry::NameRegistry;
use crate::schema::{
    Field, Name, Order, Properties, Schema, SchemaKind, SchemaType, FIELD_RESERVED, SCHEMA_RESERVED,
};

/// Schema parser holding one naming session
#[derive(Debug, Clone)]
pub struct Parser {
    registry: NameRegistry,
    validate_defaults: bool,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self::with_config(&ParserConfig::default())
    }

    pub fn with_config(config: &ParserConfig) -> Self {
        Self {
            registry: NameRegistry::new(),
            validate_defaults: config.validate_defaults,
        }
    }

    /// Check field defaults against their field types
    pub fn validate_defaults(mut self, validate: bool) -> Self {
        self.validate_defaults = validate;
        self
    }

    /// Parse one document
    pub fn parse(&mut self, text: &str) -> SchemaResult<Schema> {
        self.parse_fragments([text])
    }

    /// Parse a document delivered as ordered fragments. Fragments may split
    /// anywhere, even inside a token.
    pub fn parse_fragments<I, S>(&mut self, fragments: I) -> SchemaResult<Schema>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        let mut count = 0usize;
        for fragment in fragments {
            text.push_str(fragment.as_ref());
            count += 1;
        }
        debug!(fragments = count, length = text.len(), "parsing schema");

        let json: Value =
            serde_json::from_str(&text).map_err(|e| SchemaError::from(e).into_parse())?;
        self.parse_value(&json)
    }

    /// Parse an already decoded JSON document
    pub fn parse_value(&mut self, json: &Value) -> SchemaResult<Schema> {
        let checkpoint = self.registry.checkpoint();
        self.parse_node(json, None).map_err(|e| {
            self.registry.rollback(checkpoint);
            e.into_parse()
        })
    }

    /// Named types known to this parser, in definition order
    pub fn types(&self) -> impl Iterator<Item = &Schema> {
        self.registry.iter().map(|(_, schema)| schema)
    }

    pub fn registry(&self) -> &NameRegistry {
        &self.registry
    }

    /// Make the named types defined in `schemas` available to later parses.
    /// Types already known under the same full name are skipped.
    pub fn add_types<I>(&mut self, schemas: I) -> SchemaResult<()>
    where
        I: IntoIterator<Item = Schema>,
    {
        for schema in schemas {
            let mut definitions: Vec<_> = schema.definitions().into_iter().collect();
            definitions.sort_by(|(a, _), (b, _)| a.cmp(b));
            for (name, definition) in definitions {
                if !self.registry.contains(&name) {
                    self.registry.define(definition)?;
                }
            }
        }
        Ok(())
    }

    fn parse_node(&mut self, json: &Value, namespace: Option<&str>) -> SchemaResult<Schema> {
        match json {
            Value::String(type_name) => self.parse_type_name(type_name, namespace),
            Value::Object(map) => self.parse_object(map, namespace),
            Value::Array(branches) => {
                let branches = branches
                    .iter()
                    .map(|branch| self.parse_node(branch, namespace))
                    .collect::<SchemaResult<Vec<_>>>()?;
                Schema::union(branches)
            }
            other => Err(SchemaError::parse(format!("Schema not yet supported: {}", other))),
        }
    }

    fn parse_type_name(&self, type_name: &str, namespace: Option<&str>) -> SchemaResult<Schema> {
        match SchemaType::primitive(type_name) {
            Some(ty) => Schema::create(ty),
            None => self.registry.resolve(type_name, namespace),
        }
    }

    fn parse_object(
        &mut self,
        map: &Map<String, Value>,
        namespace: Option<&str>,
    ) -> SchemaResult<Schema> {
        let type_name = match map.get("type") {
            Some(Value::String(t)) => t.as_str(),
            Some(other) => {
                return Err(SchemaError::parse(format!("Type must be a string: {}", other)))
            }
            None => return Err(SchemaError::parse(format!("No type: {}", Value::Object(map.clone())))),
        };
        let props = collect_props(map, SCHEMA_RESERVED);

        if let Some(ty) = SchemaType::primitive(type_name) {
            return Ok(Schema::create(ty)?.with_props(props));
        }

        match type_name {
            "record" | "error" => self.parse_record(map, namespace, type_name == "error", props),
            "enum" => self.parse_enum(map, namespace, props),
            "fixed" => self.parse_fixed(map, namespace, props),
            "array" => {
                let items = map
                    .get("items")
                    .ok_or_else(|| SchemaError::parse("Array has no items type"))?;
                Ok(Schema::array(self.parse_node(items, namespace)?).with_props(props))
            }
            "map" => {
                let values = map
                    .get("values")
                    .ok_or_else(|| SchemaError::parse("Map has no values type"))?;
                Ok(Schema::map(self.parse_node(values, namespace)?).with_props(props))
            }
            other => self.registry.resolve(other, namespace),
        }
    }

    fn parse_record(
        &mut self,
        map: &Map<String, Value>,
        namespace: Option<&str>,
        is_error: bool,
        props: Properties,
    ) -> SchemaResult<Schema> {
        let header = NamedHeader::parse(map, namespace)?;
        let record = Schema::record_named(header.name.clone(), header.doc, header.aliases, is_error)
            .with_props(props);
        self.registry.define(record.clone())?;

        let field_list = match map.get("fields") {
            Some(Value::Array(fields)) => fields,
            _ => return Err(SchemaError::parse(format!("Record has no fields: {}", header.name))),
        };

        let mut fields = Vec::with_capacity(field_list.len());
        for field_json in field_list {
            let field = self.parse_field(field_json, &header.name)?;
            fields.push(field);
        }
        record.set_fields(fields)?;
        Ok(record)
    }

    fn parse_field(&mut self, json: &Value, record: &Name) -> SchemaResult<Field> {
        let map = json
            .as_object()
            .ok_or_else(|| SchemaError::parse(format!("Field must be an object: {}", json)))?;
        let name = map
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::parse(format!("No field name in record {}", record)))?;
        let type_json = map
            .get("type")
            .ok_or_else(|| SchemaError::parse(format!("No field type: {}.{}", record, name)))?;

        let schema = self.parse_node(type_json, record.namespace())?;
        let default = map.get("default").cloned();
        if let Some(value) = &default {
            if self.validate_defaults && !self.is_valid_default(&schema, value) {
                return Err(SchemaError::invalid(format!(
                    "Invalid default for field {}: {} not a {}",
                    name, value, schema
                )));
            }
        }

        let order = match map.get("order") {
            None => Order::Ascending,
            Some(Value::String(order)) => Order::parse(order)?,
            Some(other) => return Err(SchemaError::parse(format!("Illegal field order: {}", other))),
        };

        let mut field = Field::new(name, schema, optional_str(map, "doc")?, default)?
            .with_order(order)
            .with_aliases(string_list(map, "aliases")?)?;
        for (key, value) in collect_props(map, FIELD_RESERVED) {
            field.add_prop(&key, value)?;
        }
        Ok(field)
    }

    fn parse_enum(
        &mut self,
        map: &Map<String, Value>,
        namespace: Option<&str>,
        props: Properties,
    ) -> SchemaResult<Schema> {
        let header = NamedHeader::parse(map, namespace)?;
        if !matches!(map.get("symbols"), Some(Value::Array(_))) {
            return Err(SchemaError::parse(format!("Enum has no symbols: {}", header.name)));
        }
        let symbols = string_list(map, "symbols")?;
        let default = optional_str(map, "default")?;

        let schema = Schema::enum_named(header.name, header.doc, header.aliases, symbols, default)?
            .with_props(props);
        self.registry.define(schema.clone())?;
        Ok(schema)
    }

    fn parse_fixed(
        &mut self,
        map: &Map<String, Value>,
        namespace: Option<&str>,
        props: Properties,
    ) -> SchemaResult<Schema> {
        let header = NamedHeader::parse(map, namespace)?;
        let size = map
            .get("size")
            .and_then(Value::as_u64)
            .ok_or_else(|| SchemaError::parse(format!("Invalid or no size: {}", header.name)))?;
        let size = usize::try_from(size)
            .map_err(|_| SchemaError::parse(format!("Fixed size too large: {}", size)))?;

        let schema =
            Schema::fixed_named(header.name, header.doc, header.aliases, size).with_props(props);
        self.registry.define(schema.clone())?;
        Ok(schema)
    }

    /// Whether `value` is a literal of type `schema`
    fn is_valid_default(&self, schema: &Schema, value: &Value) -> bool {
        match schema.kind() {
            SchemaKind::Null => value.is_null(),
            SchemaKind::Boolean => value.is_boolean(),
            SchemaKind::Int => value
                .as_i64()
                .map(|n| i32::try_from(n).is_ok())
                .unwrap_or(false),
            SchemaKind::Long => value.is_i64(),
            SchemaKind::Float | SchemaKind::Double => value.is_number(),
            SchemaKind::Bytes | SchemaKind::String | SchemaKind::Fixed(_) => value.is_string(),
            SchemaKind::Enum(e) => value
                .as_str()
                .map(|symbol| e.ordinal(symbol).is_some())
                .unwrap_or(false),
            SchemaKind::Array(items) => value
                .as_array()
                .map(|values| values.iter().all(|v| self.is_valid_default(items, v)))
                .unwrap_or(false),
            SchemaKind::Map(values) => value
                .as_object()
                .map(|entries| entries.values().all(|v| self.is_valid_default(values, v)))
                .unwrap_or(false),
            // a union's default belongs to its first branch
            SchemaKind::Union(union) => union
                .branches()
                .first()
                .map(|first| self.is_valid_default(first, value))
                .unwrap_or(false),
            SchemaKind::Record(record) => match value.as_object() {
                Some(object) => record.fields().iter().all(|field| match object.get(field.name()) {
                    Some(v) => self.is_valid_default(field.schema(), v),
                    None => field.default_value().is_some(),
                }),
                None => false,
            },
            SchemaKind::Ref { name, .. } => match self.registry.get(name) {
                Some(definition) => self.is_valid_default(definition, value),
                None => true,
            },
        }
    }
}

/// Parse a document with a fresh parser
pub fn parse_schema(text: &str) -> SchemaResult<Schema> {
    Parser::new().parse(text)
}

impl FromStr for Schema {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_schema(s)
    }
}

/// Name, doc and aliases shared by record, enum and fixed objects
struct NamedHeader<'a> {
    name: Name,
    doc: Option<&'a str>,
    aliases: std::collections::BTreeSet<Name>,
}

impl<'a> NamedHeader<'a> {
    fn parse(map: &'a Map<String, Value>, enclosing: Option<&str>) -> SchemaResult<Self> {
        let name = map
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::parse("No name in schema"))?;
        // an explicit namespace, even "", overrides the enclosing one
        let namespace = match map.get("namespace") {
            None | Some(Value::Null) => enclosing,
            Some(Value::String(ns)) => Some(ns.as_str()),
            Some(other) => return Err(SchemaError::parse(format!("Illegal namespace: {}", other))),
        };
        let name = Name::with_namespace(name, namespace)?;

        let aliases = string_list(map, "aliases")?
            .iter()
            .map(|alias| Name::with_namespace(alias, name.namespace()))
            .collect::<SchemaResult<_>>()?;

        Ok(Self {
            doc: optional_str(map, "doc")?,
            name,
            aliases,
        })
    }
}

fn optional_str<'a>(map: &'a Map<String, Value>, key: &str) -> SchemaResult<Option<&'a str>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(SchemaError::parse(format!("{} must be a string: {}", key, other))),
    }
}

fn string_list(map: &Map<String, Value>, key: &str) -> SchemaResult<Vec<String>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(String::from)
                    .ok_or_else(|| SchemaError::parse(format!("{} must contain strings: {}", key, item)))
            })
            .collect(),
        Some(other) => Err(SchemaError::parse(format!("{} must be a list: {}", key, other))),
    }
}

fn collect_props(map: &Map<String, Value>, reserved: &[&str]) -> Properties {
    map.iter()
        .filter(|(key, _)| !reserved.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives() {
        assert_eq!(parse_schema(r#""long""#).unwrap().schema_type(), SchemaType::Long);
        let with_props = parse_schema(r#"{"type": "string", "avro.java.string": "String"}"#).unwrap();
        assert_eq!(with_props.schema_type(), SchemaType::String);
        assert_eq!(with_props.prop("avro.java.string"), Some(&Value::from("String")));
    }

    #[test]
    fn test_self_reference() {
        let schema = parse_schema(
            r#"{"type": "record", "name": "Node", "fields": [
                {"name": "next", "type": ["null", "Node"]}
            ]}"#,
        )
        .unwrap();

        let next = schema.field("next").unwrap().schema();
        assert!(next.branches()[1].is_ref());
        assert_eq!(next.branches()[1].fullname(), "Node");
    }

    #[test]
    fn test_nested_types_inherit_namespace() {
        let schema = parse_schema(
            r#"{"type": "record", "name": "Outer", "namespace": "org.example", "fields": [
                {"name": "id", "type": {"type": "fixed", "name": "Id", "size": 8}},
                {"name": "other", "type": {"type": "fixed", "name": "Other", "namespace": "", "size": 2}},
                {"name": "again", "type": "Id"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(schema.field("id").unwrap().schema().fullname(), "org.example.Id");
        assert_eq!(schema.field("other").unwrap().schema().fullname(), "Other");
        assert_eq!(schema.field("again").unwrap().schema().fixed_size(), Some(8));
    }

    #[test]
    fn test_undefined_name() {
        let err = parse_schema(r#"{"type": "array", "items": "Missing"}"#).unwrap_err();
        assert!(err.is_parse());
        assert!(matches!(err.root_cause(), SchemaError::UndefinedName { .. }));
    }

    #[test]
    fn test_malformed_text() {
        let err = parse_schema(r#"{"type": "record""#).unwrap_err();
        assert!(err.is_parse());
        assert!(parse_schema("42").unwrap_err().is_parse());
        assert!(parse_schema(r#"{"name": "NoType"}"#).unwrap_err().is_parse());
    }

    #[test]
    fn test_duplicate_field_is_parse_error() {
        let err = parse_schema(
            r#"{"type": "record", "name": "R", "fields": [
                {"name": "a", "type": "int"}, {"name": "a", "type": "long"}
            ]}"#,
        )
        .unwrap_err();
        assert!(err.is_parse());
        assert!(matches!(err.root_cause(), SchemaError::DuplicateFieldName { .. }));
    }

    #[test]
    fn test_field_attributes() {
        let schema = parse_schema(
            r#"{"type": "record", "name": "R", "fields": [
                {"name": "n", "type": "int", "default": 3, "order": "descending",
                 "aliases": ["m"], "doc": "a number", "x-unit": "ms"}
            ]}"#,
        )
        .unwrap();

        let field = schema.field("n").unwrap();
        assert_eq!(field.default_value(), Some(&Value::from(3)));
        assert_eq!(field.order(), Order::Descending);
        assert!(field.aliases().contains("m"));
        assert_eq!(field.doc(), Some("a number"));
        assert_eq!(field.prop("x-unit"), Some(&Value::from("ms")));
    }

    #[test]
    fn test_invalid_defaults() {
        let text = r#"{"type": "record", "name": "R", "fields": [
            {"name": "n", "type": "int", "default": "three"}
        ]}"#;
        assert!(parse_schema(text).is_err());
        assert!(Parser::new().validate_defaults(false).parse(text).is_ok());

        let union_default = r#"{"type": "record", "name": "U", "fields": [
            {"name": "u", "type": ["null", "string"], "default": null}
        ]}"#;
        assert!(parse_schema(union_default).is_ok());
    }

    #[test]
    fn test_shared_parser_accumulates_types() {
        let mut parser = Parser::new();
        parser
            .parse(r#"{"type": "fixed", "name": "Md5", "namespace": "h", "size": 16}"#)
            .unwrap();
        let record = parser
            .parse(r#"{"type": "record", "name": "File", "fields": [{"name": "sum", "type": "h.Md5"}]}"#)
            .unwrap();

        assert_eq!(record.field("sum").unwrap().schema().fixed_size(), Some(16));
        assert_eq!(parser.types().count(), 2);
    }

    #[test]
    fn test_failed_parse_rolls_back() {
        let mut parser = Parser::new();
        let bad = r#"{"type": "record", "name": "Half", "fields": [{"name": "x", "type": "Nope"}]}"#;
        assert!(parser.parse(bad).is_err());
        assert_eq!(parser.types().count(), 0);

        // the name is free again
        parser
            .parse(r#"{"type": "record", "name": "Half", "fields": []}"#)
            .unwrap();
    }

    #[test]
    fn test_redefinition_rejected() {
        let err = parse_schema(
            r#"["null", {"type": "fixed", "name": "F", "size": 1}, {"type": "enum", "name": "F", "symbols": ["A"]}]"#,
        )
        .unwrap_err();
        assert!(matches!(err.root_cause(), SchemaError::DuplicateTypeDefinition(_)));
    }

    #[test]
    fn test_error_records() {
        let schema =
            parse_schema(r#"{"type": "error", "name": "Oops", "fields": [{"name": "msg", "type": "string"}]}"#)
                .unwrap();
        assert!(schema.as_record().unwrap().is_error());
    }
}
