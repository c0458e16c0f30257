//! Fluent schema construction
//!
//! Builders only collect settings. Every check happens in `build()`, which
//! goes through the same validated constructors as the parser.
//!
//! ```ignore
//! let request = RecordBuilder::new("HandshakeRequest")
//!     .namespace("org.apache.avro.ipc")
//!     .field(FieldBuilder::new("clientHash").schema(md5))
//!     .field(FieldBuilder::new("clientProtocol").optional(Schema::string()))
//!     .build()?;
//! ```

use serde_json::Value;

use crate::error::{SchemaError, SchemaResult};
use crate::schema::{Field, Name, Order, Properties, Schema, SchemaType};

/// Union from a list of branches: `union_schema![Schema::null(), Schema::long()]`
#[macro_export]
macro_rules! union_schema {
    ($($branch:expr),* $(,)?) => {
        $crate::schema::Schema::union(vec![$($branch),*])
    };
}

/// Settings shared by the named-type builders
#[derive(Debug, Clone, Default)]
struct NamedParts {
    name: String,
    namespace: Option<String>,
    doc: Option<String>,
    aliases: Vec<String>,
    props: Properties,
}

impl NamedParts {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    fn finish(self, schema: Schema) -> SchemaResult<Schema> {
        let mut schema = if self.aliases.is_empty() {
            schema
        } else {
            schema.with_aliases(&self.aliases)?
        };
        for (key, value) in self.props {
            schema.add_prop(&key, value)?;
        }
        Ok(schema)
    }
}

macro_rules! named_setters {
    () => {
        pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
            self.parts.namespace = Some(namespace.into());
            self
        }

        pub fn doc(mut self, doc: impl Into<String>) -> Self {
            self.parts.doc = Some(doc.into());
            self
        }

        /// Alternate names, relative to the namespace unless qualified
        pub fn aliases<I, S>(mut self, aliases: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.parts.aliases.extend(aliases.into_iter().map(Into::into));
            self
        }

        pub fn prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
            self.parts.props.insert(key.into(), value.into());
            self
        }
    };
}

/// Builds a record
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    parts: NamedParts,
    is_error: bool,
    fields: Vec<FieldBuilder>,
}

impl RecordBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            parts: NamedParts::new(name),
            is_error: false,
            fields: Vec::new(),
        }
    }

    named_setters!();

    /// Mark the record as an error type
    pub fn error(mut self) -> Self {
        self.is_error = true;
        self
    }

    pub fn field(mut self, field: FieldBuilder) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> SchemaResult<Schema> {
        let fields = self
            .fields
            .into_iter()
            .map(FieldBuilder::build)
            .collect::<SchemaResult<Vec<_>>>()?;
        let record = Schema::record_with_fields(
            &self.parts.name,
            self.parts.doc.as_deref(),
            self.parts.namespace.as_deref(),
            self.is_error,
            Some(fields),
        )?;
        self.parts.finish(record)
    }
}

/// Builds a record field
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    name: String,
    schema: Option<Schema>,
    doc: Option<String>,
    default: Option<Value>,
    order: Order,
    aliases: Vec<String>,
    props: Properties,
    nullable: bool,
}

impl FieldBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            doc: None,
            default: None,
            order: Order::Ascending,
            aliases: Vec::new(),
            props: Properties::new(),
            nullable: false,
        }
    }

    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Nullable field: a union of null and `schema`, defaulting to null
    pub fn optional(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self.default = Some(Value::Null);
        self.nullable = true;
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> SchemaResult<Field> {
        let mut schema = self.schema.ok_or_else(|| {
            SchemaError::invalid(format!("Field {} has no type", self.name))
        })?;
        if self.nullable {
            schema = nullable(schema)?;
        }
        let mut field = Field::new(&self.name, schema, self.doc.as_deref(), self.default)?
            .with_order(self.order)
            .with_aliases(&self.aliases)?;
        for (key, value) in self.props {
            field.add_prop(&key, value)?;
        }
        Ok(field)
    }
}

/// `[null, ...]` around a schema; a union gets null as its first branch
fn nullable(schema: Schema) -> SchemaResult<Schema> {
    let mut branches = vec![Schema::null()];
    if schema.branches().is_empty() {
        branches.push(schema);
    } else {
        branches.extend(
            schema
                .branches()
                .iter()
                .filter(|b| b.schema_type() != SchemaType::Null)
                .cloned(),
        );
    }
    Schema::union(branches)
}

/// Builds an enum
#[derive(Debug, Clone)]
pub struct EnumBuilder {
    parts: NamedParts,
    symbols: Vec<String>,
    default: Option<String>,
}

impl EnumBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            parts: NamedParts::new(name),
            symbols: Vec::new(),
            default: None,
        }
    }

    named_setters!();

    pub fn symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symbols.extend(symbols.into_iter().map(Into::into));
        self
    }

    pub fn default_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.default = Some(symbol.into());
        self
    }

    pub fn build(self) -> SchemaResult<Schema> {
        let schema = Schema::enumeration(
            &self.parts.name,
            self.parts.doc.as_deref(),
            self.parts.namespace.as_deref(),
            self.symbols,
            self.default.as_deref(),
        )?;
        self.parts.finish(schema)
    }
}

/// Builds a fixed type
#[derive(Debug, Clone)]
pub struct FixedBuilder {
    parts: NamedParts,
    size: Option<usize>,
}

impl FixedBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            parts: NamedParts::new(name),
            size: None,
        }
    }

    named_setters!();

    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn build(self) -> SchemaResult<Schema> {
        let size = self.size.ok_or_else(|| {
            let name = Name::with_namespace(&self.parts.name, self.parts.namespace.as_deref())
                .map(|n| n.fullname())
                .unwrap_or_else(|_| self.parts.name.clone());
            SchemaError::invalid(format!("Fixed {} has no size", name))
        })?;
        let schema = Schema::fixed(
            &self.parts.name,
            self.parts.doc.as_deref(),
            self.parts.namespace.as_deref(),
            size,
        )?;
        self.parts.finish(schema)
    }
}
