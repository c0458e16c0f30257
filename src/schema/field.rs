//! Record fields

use std::collections::BTreeSet;

use serde_json::Value;

use super::name::validate_identifier;
use super::{add_prop, Properties, Schema, FIELD_RESERVED};
use crate::error::{SchemaError, SchemaResult};

/// Sort order of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Order {
    #[default]
    Ascending,
    Descending,
    Ignore,
}

impl Order {
    pub fn as_str(&self) -> &'static str {
        match self {
            Order::Ascending => "ascending",
            Order::Descending => "descending",
            Order::Ignore => "ignore",
        }
    }

    pub fn parse(value: &str) -> SchemaResult<Self> {
        match value {
            "ascending" => Ok(Order::Ascending),
            "descending" => Ok(Order::Descending),
            "ignore" => Ok(Order::Ignore),
            other => Err(SchemaError::invalid(format!("Illegal field order: {:?}", other))),
        }
    }
}

/// A field of a record schema
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    schema: Schema,
    doc: Option<String>,
    default: Option<Value>,
    order: Order,
    aliases: BTreeSet<String>,
    position: usize,
    props: Properties,
}

impl Field {
    /// Create a field. `default` of `Some(Value::Null)` is an explicit null
    /// default, `None` means no default.
    pub fn new(
        name: &str,
        schema: Schema,
        doc: Option<&str>,
        default: Option<Value>,
    ) -> SchemaResult<Self> {
        validate_identifier("field", name)?;
        Ok(Self {
            name: name.to_string(),
            schema,
            doc: doc.map(String::from),
            default,
            order: Order::Ascending,
            aliases: BTreeSet::new(),
            position: 0,
            props: Properties::new(),
        })
    }

    pub fn with_order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn with_aliases<I, S>(mut self, aliases: I) -> SchemaResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for alias in aliases {
            self.add_alias(alias.as_ref())?;
        }
        Ok(self)
    }

    /// Add a field-local alias (a plain identifier, never a full name)
    pub fn add_alias(&mut self, alias: &str) -> SchemaResult<()> {
        validate_identifier("field alias", alias)?;
        self.aliases.insert(alias.to_string());
        Ok(())
    }

    pub fn add_prop(&mut self, key: &str, value: Value) -> SchemaResult<()> {
        add_prop(&mut self.props, FIELD_RESERVED, key, value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn aliases(&self) -> &BTreeSet<String> {
        &self.aliases
    }

    /// Index of this field in its record; 0 until the field list is set
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn props(&self) -> &Properties {
        &self.props
    }

    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    /// Whether `name` is this field's name or one of its aliases
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(name)
    }

    pub(crate) fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// Same field under another name and type, keeping doc, default, order,
    /// aliases and props
    pub(crate) fn renamed(&self, name: &str, schema: Schema) -> Field {
        Field {
            name: name.to_string(),
            schema,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_parse() {
        assert_eq!(Order::parse("descending").unwrap(), Order::Descending);
        assert!(Order::parse("sideways").is_err());
    }

    #[test]
    fn test_field_aliases() {
        let field = Field::new("d", Schema::int(), None, None)
            .unwrap()
            .with_aliases(["c", "b"])
            .unwrap();
        assert!(field.answers_to("d"));
        assert!(field.answers_to("c"));
        assert!(!field.answers_to("e"));
        assert_eq!(field.aliases().iter().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn test_illegal_field_name() {
        assert!(Field::new("bad name", Schema::int(), None, None).is_err());
    }
}
