//! Schema Type Model
//!
//! A `Schema` is an immutable, cheaply clonable handle over one node of the
//! schema graph. Composite nodes own their children. Named types (record,
//! enum, fixed) are addressable by full name: a reference to a named type
//! that is still under construction, such as a record field pointing back at
//! its own record, is a `SchemaKind::Ref` node carrying the full name, so the
//! graph never holds reference cycles.
//!
//! Constructors validate eagerly. A record's field list is set exactly once.

pub mod field;
pub mod name;
pub mod union;

pub use field::{Field, Order};
pub use name::Name;
pub use union::UnionSchema;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, OnceLock};

use serde_json::Value;

use crate::error::{SchemaError, SchemaResult};

/// Ordered string-keyed metadata attached to schemas and fields
pub type Properties = serde_json::Map<String, Value>;

/// Keys with meaning on a schema object; everything else is a property
pub(crate) const SCHEMA_RESERVED: &[&str] = &[
    "aliases", "default", "doc", "fields", "items", "name", "namespace", "size", "symbols",
    "type", "values",
];

/// Keys with meaning on a field object; everything else is a property
pub(crate) const FIELD_RESERVED: &[&str] = &["aliases", "default", "doc", "name", "order", "type"];

pub(crate) fn add_prop(
    props: &mut Properties,
    reserved: &[&str],
    key: &str,
    value: Value,
) -> SchemaResult<()> {
    if reserved.contains(&key) {
        return Err(SchemaError::invalid(format!("Can't set reserved property: {}", key)));
    }
    match props.get(key) {
        Some(existing) if *existing != value => Err(SchemaError::invalid(format!(
            "Can't overwrite property: {}",
            key
        ))),
        Some(_) => Ok(()),
        None => {
            props.insert(key.to_string(), value);
            Ok(())
        }
    }
}

/// Type tag of a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Record,
    Enum,
    Array,
    Map,
    Union,
    Fixed,
}

impl SchemaType {
    /// The type name used in schema text
    pub fn name(&self) -> &'static str {
        match self {
            SchemaType::Null => "null",
            SchemaType::Boolean => "boolean",
            SchemaType::Int => "int",
            SchemaType::Long => "long",
            SchemaType::Float => "float",
            SchemaType::Double => "double",
            SchemaType::Bytes => "bytes",
            SchemaType::String => "string",
            SchemaType::Record => "record",
            SchemaType::Enum => "enum",
            SchemaType::Array => "array",
            SchemaType::Map => "map",
            SchemaType::Union => "union",
            SchemaType::Fixed => "fixed",
        }
    }

    /// Look up a primitive type by name
    pub fn primitive(name: &str) -> Option<Self> {
        match name {
            "null" => Some(SchemaType::Null),
            "boolean" => Some(SchemaType::Boolean),
            "int" => Some(SchemaType::Int),
            "long" => Some(SchemaType::Long),
            "float" => Some(SchemaType::Float),
            "double" => Some(SchemaType::Double),
            "bytes" => Some(SchemaType::Bytes),
            "string" => Some(SchemaType::String),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        Self::primitive(self.name()).is_some()
    }

    pub fn is_named(&self) -> bool {
        matches!(self, SchemaType::Record | SchemaType::Enum | SchemaType::Fixed)
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn resolve_aliases<I, S>(aliases: I, namespace: Option<&str>) -> SchemaResult<BTreeSet<Name>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    aliases
        .into_iter()
        .map(|alias| Name::with_namespace(alias.as_ref(), namespace))
        .collect()
}

#[derive(Debug, Clone)]
struct RecordFields {
    fields: Vec<Field>,
    lookup: HashMap<String, usize>,
}

/// A record: named, with an ordered field list set exactly once
#[derive(Debug, Clone)]
pub struct RecordSchema {
    name: Name,
    doc: Option<String>,
    aliases: BTreeSet<Name>,
    is_error: bool,
    fields: OnceLock<RecordFields>,
}

impl RecordSchema {
    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn aliases(&self) -> &BTreeSet<Name> {
        &self.aliases
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    /// Whether the field list has been set
    pub fn has_fields(&self) -> bool {
        self.fields.get().is_some()
    }

    /// The fields, empty until set
    pub fn fields(&self) -> &[Field] {
        self.fields.get().map(|f| f.fields.as_slice()).unwrap_or(&[])
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        let set = self.fields.get()?;
        set.lookup.get(name).map(|&i| &set.fields[i])
    }

    fn set_fields(&self, mut fields: Vec<Field>) -> SchemaResult<()> {
        if self.has_fields() {
            return Err(SchemaError::FieldsAlreadySet(self.name.fullname()));
        }

        let mut lookup = HashMap::with_capacity(fields.len());
        for (position, field) in fields.iter_mut().enumerate() {
            if lookup.insert(field.name().to_string(), position).is_some() {
                return Err(SchemaError::DuplicateFieldName {
                    record: self.name.fullname(),
                    field: field.name().to_string(),
                });
            }
            field.set_position(position);
        }

        self.fields
            .set(RecordFields { fields, lookup })
            .map_err(|_| SchemaError::FieldsAlreadySet(self.name.fullname()))
    }
}

/// An enumeration of distinct symbols
#[derive(Debug, Clone)]
pub struct EnumSchema {
    name: Name,
    doc: Option<String>,
    aliases: BTreeSet<Name>,
    symbols: Vec<String>,
    default: Option<String>,
}

impl EnumSchema {
    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn aliases(&self) -> &BTreeSet<Name> {
        &self.aliases
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn default_symbol(&self) -> Option<&str> {
        self.default.as_deref()
    }

    pub fn ordinal(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }
}

/// A fixed-size byte sequence
#[derive(Debug, Clone)]
pub struct FixedSchema {
    name: Name,
    doc: Option<String>,
    aliases: BTreeSet<Name>,
    size: usize,
}

impl FixedSchema {
    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn aliases(&self) -> &BTreeSet<Name> {
        &self.aliases
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// The variant-specific part of a schema
#[derive(Debug, Clone)]
pub enum SchemaKind {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Record(RecordSchema),
    Enum(EnumSchema),
    Array(Schema),
    Map(Schema),
    Union(UnionSchema),
    Fixed(FixedSchema),
    /// A reference by full name to a named type defined elsewhere in the
    /// same graph (usually an enclosing type under construction)
    Ref { name: Name, ty: SchemaType },
}

impl SchemaKind {
    /// Type tag; a reference reports the tag of the type it names
    pub fn schema_type(&self) -> SchemaType {
        match self {
            SchemaKind::Null => SchemaType::Null,
            SchemaKind::Boolean => SchemaType::Boolean,
            SchemaKind::Int => SchemaType::Int,
            SchemaKind::Long => SchemaType::Long,
            SchemaKind::Float => SchemaType::Float,
            SchemaKind::Double => SchemaType::Double,
            SchemaKind::Bytes => SchemaType::Bytes,
            SchemaKind::String => SchemaType::String,
            SchemaKind::Record(_) => SchemaType::Record,
            SchemaKind::Enum(_) => SchemaType::Enum,
            SchemaKind::Array(_) => SchemaType::Array,
            SchemaKind::Map(_) => SchemaType::Map,
            SchemaKind::Union(_) => SchemaType::Union,
            SchemaKind::Fixed(_) => SchemaType::Fixed,
            SchemaKind::Ref { ty, .. } => *ty,
        }
    }

    fn primitive(ty: SchemaType) -> Option<Self> {
        Some(match ty {
            SchemaType::Null => SchemaKind::Null,
            SchemaType::Boolean => SchemaKind::Boolean,
            SchemaType::Int => SchemaKind::Int,
            SchemaType::Long => SchemaKind::Long,
            SchemaType::Float => SchemaKind::Float,
            SchemaType::Double => SchemaKind::Double,
            SchemaType::Bytes => SchemaKind::Bytes,
            SchemaType::String => SchemaKind::String,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone)]
struct SchemaNode {
    kind: SchemaKind,
    props: Properties,
    hash: OnceLock<u64>,
}

/// A node of a schema graph
#[derive(Clone)]
pub struct Schema {
    inner: Arc<SchemaNode>,
}

impl Schema {
    pub(crate) fn from_parts(kind: SchemaKind, props: Properties) -> Self {
        Self {
            inner: Arc::new(SchemaNode {
                kind,
                props,
                hash: OnceLock::new(),
            }),
        }
    }

    fn from_kind(kind: SchemaKind) -> Self {
        Self::from_parts(kind, Properties::new())
    }

    /// Replace the properties of a node nobody else holds yet
    pub(crate) fn with_props(mut self, props: Properties) -> Self {
        Arc::make_mut(&mut self.inner).props = props;
        self
    }

    // ========== Constructors ==========

    /// Create a primitive schema
    pub fn create(ty: SchemaType) -> SchemaResult<Self> {
        SchemaKind::primitive(ty)
            .map(Self::from_kind)
            .ok_or_else(|| SchemaError::invalid(format!("Can't create a {} without arguments", ty)))
    }

    pub fn null() -> Self {
        Self::from_kind(SchemaKind::Null)
    }

    pub fn boolean() -> Self {
        Self::from_kind(SchemaKind::Boolean)
    }

    pub fn int() -> Self {
        Self::from_kind(SchemaKind::Int)
    }

    pub fn long() -> Self {
        Self::from_kind(SchemaKind::Long)
    }

    pub fn float() -> Self {
        Self::from_kind(SchemaKind::Float)
    }

    pub fn double() -> Self {
        Self::from_kind(SchemaKind::Double)
    }

    pub fn bytes() -> Self {
        Self::from_kind(SchemaKind::Bytes)
    }

    pub fn string() -> Self {
        Self::from_kind(SchemaKind::String)
    }

    /// Create a record whose fields are not set yet
    pub fn record(
        name: &str,
        doc: Option<&str>,
        namespace: Option<&str>,
        is_error: bool,
    ) -> SchemaResult<Self> {
        let name = Name::with_namespace(name, namespace)?;
        Ok(Self::record_named(name, doc, BTreeSet::new(), is_error))
    }

    /// Create a record with its fields. An absent field list is an error.
    pub fn record_with_fields(
        name: &str,
        doc: Option<&str>,
        namespace: Option<&str>,
        is_error: bool,
        fields: Option<Vec<Field>>,
    ) -> SchemaResult<Self> {
        let fields = fields.ok_or_else(|| {
            SchemaError::invalid(format!("Record {} requires a field list", name))
        })?;
        let record = Self::record(name, doc, namespace, is_error)?;
        record.set_fields(fields)?;
        Ok(record)
    }

    pub(crate) fn record_named(
        name: Name,
        doc: Option<&str>,
        aliases: BTreeSet<Name>,
        is_error: bool,
    ) -> Self {
        Self::from_kind(SchemaKind::Record(RecordSchema {
            name,
            doc: doc.map(String::from),
            aliases,
            is_error,
            fields: OnceLock::new(),
        }))
    }

    /// Create an enum. Symbols must be distinct identifiers; the default,
    /// when given, must be one of them.
    pub fn enumeration(
        name: &str,
        doc: Option<&str>,
        namespace: Option<&str>,
        symbols: Vec<String>,
        default: Option<&str>,
    ) -> SchemaResult<Self> {
        let name = Name::with_namespace(name, namespace)?;
        Self::enum_named(name, doc, BTreeSet::new(), symbols, default)
    }

    pub(crate) fn enum_named(
        name: Name,
        doc: Option<&str>,
        aliases: BTreeSet<Name>,
        symbols: Vec<String>,
        default: Option<&str>,
    ) -> SchemaResult<Self> {
        let mut seen = HashSet::with_capacity(symbols.len());
        for symbol in &symbols {
            name::validate_identifier("enum symbol", symbol)?;
            if !seen.insert(symbol.as_str()) {
                return Err(SchemaError::invalid(format!(
                    "Duplicate enum symbol: {} in {}",
                    symbol, name
                )));
            }
        }
        if let Some(default) = default {
            if !seen.contains(default) {
                return Err(SchemaError::invalid(format!(
                    "The enum default {:?} is not a symbol of {}",
                    default, name
                )));
            }
        }

        Ok(Self::from_kind(SchemaKind::Enum(EnumSchema {
            name,
            doc: doc.map(String::from),
            aliases,
            symbols,
            default: default.map(String::from),
        })))
    }

    pub fn fixed(
        name: &str,
        doc: Option<&str>,
        namespace: Option<&str>,
        size: usize,
    ) -> SchemaResult<Self> {
        let name = Name::with_namespace(name, namespace)?;
        Ok(Self::fixed_named(name, doc, BTreeSet::new(), size))
    }

    pub(crate) fn fixed_named(
        name: Name,
        doc: Option<&str>,
        aliases: BTreeSet<Name>,
        size: usize,
    ) -> Self {
        Self::from_kind(SchemaKind::Fixed(FixedSchema {
            name,
            doc: doc.map(String::from),
            aliases,
            size,
        }))
    }

    pub fn array(items: Schema) -> Self {
        Self::from_kind(SchemaKind::Array(items))
    }

    pub fn map(values: Schema) -> Self {
        Self::from_kind(SchemaKind::Map(values))
    }

    pub fn union(branches: Vec<Schema>) -> SchemaResult<Self> {
        Ok(Self::from_kind(SchemaKind::Union(UnionSchema::new(branches)?)))
    }

    /// Reference a named type by full name
    pub fn reference(name: Name, ty: SchemaType) -> SchemaResult<Self> {
        if !ty.is_named() {
            return Err(SchemaError::invalid(format!("Can't reference a {} by name", ty)));
        }
        Ok(Self::from_kind(SchemaKind::Ref { name, ty }))
    }

    /// A new node with the same body, optionally under another name.
    /// Records come back without fields; composites keep their children.
    pub(crate) fn fresh_copy(&self, rename: Option<Name>) -> Self {
        let mut kind = match &self.inner.kind {
            SchemaKind::Record(record) => SchemaKind::Record(RecordSchema {
                fields: OnceLock::new(),
                ..record.clone()
            }),
            other => other.clone(),
        };
        if let Some(new_name) = rename {
            match &mut kind {
                SchemaKind::Record(RecordSchema { name, .. })
                | SchemaKind::Enum(EnumSchema { name, .. })
                | SchemaKind::Fixed(FixedSchema { name, .. })
                | SchemaKind::Ref { name, .. } => *name = new_name,
                _ => {}
            }
        }
        Self::from_parts(kind, self.inner.props.clone())
    }

    // ========== One-time and copy-on-write updates ==========

    /// Set the fields of a record. Fails on non-records, on duplicate field
    /// names, and when the fields are already set.
    pub fn set_fields(&self, fields: Vec<Field>) -> SchemaResult<()> {
        match &self.inner.kind {
            SchemaKind::Record(record) => record.set_fields(fields),
            _ => Err(SchemaError::invalid(format!("Not a record: {}", self))),
        }
    }

    /// Add aliases to a named type, resolved against its namespace
    pub fn with_aliases<I, S>(mut self, aliases: I) -> SchemaResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        // a reference carries no aliases of its own; they belong to its definition
        if !self.schema_type().is_named() || self.is_ref() {
            return Err(SchemaError::invalid(format!("Not a named type: {}", self)));
        }
        let namespace = self.name().and_then(Name::namespace).map(String::from);
        let resolved = resolve_aliases(aliases, namespace.as_deref())?;

        let node = Arc::make_mut(&mut self.inner);
        match &mut node.kind {
            SchemaKind::Record(r) => r.aliases.extend(resolved),
            SchemaKind::Enum(e) => e.aliases.extend(resolved),
            SchemaKind::Fixed(f) => f.aliases.extend(resolved),
            _ => return Err(SchemaError::invalid("Not a named type")),
        }
        Ok(self)
    }

    /// Add a property. Reserved keys are refused, and an existing key can't
    /// be given a different value.
    pub fn add_prop(&mut self, key: &str, value: Value) -> SchemaResult<()> {
        add_prop(&mut Arc::make_mut(&mut self.inner).props, SCHEMA_RESERVED, key, value)
    }

    // ========== Accessors ==========

    pub fn kind(&self) -> &SchemaKind {
        &self.inner.kind
    }

    pub fn schema_type(&self) -> SchemaType {
        self.inner.kind.schema_type()
    }

    /// Name of a named type or reference
    pub fn name(&self) -> Option<&Name> {
        match &self.inner.kind {
            SchemaKind::Record(r) => Some(&r.name),
            SchemaKind::Enum(e) => Some(&e.name),
            SchemaKind::Fixed(f) => Some(&f.name),
            SchemaKind::Ref { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Full name of a named type, or the type name otherwise
    pub fn fullname(&self) -> String {
        match self.name() {
            Some(name) => name.fullname(),
            None => self.schema_type().name().to_string(),
        }
    }

    /// The value that distinguishes this schema among union branches
    pub fn discriminant(&self) -> String {
        self.fullname()
    }

    pub fn doc(&self) -> Option<&str> {
        match &self.inner.kind {
            SchemaKind::Record(r) => r.doc(),
            SchemaKind::Enum(e) => e.doc(),
            SchemaKind::Fixed(f) => f.doc(),
            _ => None,
        }
    }

    /// Declared aliases of a named type
    pub fn alias_names(&self) -> Option<&BTreeSet<Name>> {
        match &self.inner.kind {
            SchemaKind::Record(r) => Some(&r.aliases),
            SchemaKind::Enum(e) => Some(&e.aliases),
            SchemaKind::Fixed(f) => Some(&f.aliases),
            _ => None,
        }
    }

    /// Full names of the declared aliases; empty for unnamed types
    pub fn aliases(&self) -> BTreeSet<String> {
        self.alias_names()
            .map(|aliases| aliases.iter().map(Name::fullname).collect())
            .unwrap_or_default()
    }

    pub fn props(&self) -> &Properties {
        &self.inner.props
    }

    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.inner.props.get(key)
    }

    pub fn as_record(&self) -> Option<&RecordSchema> {
        match &self.inner.kind {
            SchemaKind::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Record fields; empty for anything but a fielded record
    pub fn fields(&self) -> &[Field] {
        self.as_record().map(RecordSchema::fields).unwrap_or(&[])
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.as_record()?.field(name)
    }

    pub fn symbols(&self) -> &[String] {
        match &self.inner.kind {
            SchemaKind::Enum(e) => e.symbols(),
            _ => &[],
        }
    }

    pub fn fixed_size(&self) -> Option<usize> {
        match &self.inner.kind {
            SchemaKind::Fixed(f) => Some(f.size),
            _ => None,
        }
    }

    pub fn items(&self) -> Option<&Schema> {
        match &self.inner.kind {
            SchemaKind::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn values(&self) -> Option<&Schema> {
        match &self.inner.kind {
            SchemaKind::Map(values) => Some(values),
            _ => None,
        }
    }

    pub fn branches(&self) -> &[Schema] {
        match &self.inner.kind {
            SchemaKind::Union(u) => u.branches(),
            _ => &[],
        }
    }

    pub fn is_ref(&self) -> bool {
        matches!(self.inner.kind, SchemaKind::Ref { .. })
    }

    /// Whether both handles point at the same node
    pub fn ptr_eq(a: &Schema, b: &Schema) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    /// Structural hash, computed once per node
    pub fn structural_hash(&self) -> u64 {
        *self
            .inner
            .hash
            .get_or_init(|| crate::equality::compute_hash(self))
    }

    /// Every named type defined in this graph, by full name. The first
    /// definition reached depth-first wins; references are not followed.
    pub fn definitions(&self) -> HashMap<Name, Schema> {
        let mut table = HashMap::new();
        collect_definitions(self, &mut table);
        table
    }
}

fn collect_definitions(schema: &Schema, table: &mut HashMap<Name, Schema>) {
    match schema.kind() {
        SchemaKind::Record(record) => {
            if table.contains_key(&record.name) {
                return;
            }
            table.insert(record.name.clone(), schema.clone());
            for field in record.fields() {
                collect_definitions(field.schema(), table);
            }
        }
        SchemaKind::Enum(EnumSchema { name, .. }) | SchemaKind::Fixed(FixedSchema { name, .. }) => {
            table.entry(name.clone()).or_insert_with(|| schema.clone());
        }
        SchemaKind::Array(child) | SchemaKind::Map(child) => collect_definitions(child, table),
        SchemaKind::Union(union) => {
            for branch in union.branches() {
                collect_definitions(branch, table);
            }
        }
        _ => {}
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("kind", &self.inner.kind)
            .field("props", &self.inner.props)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, schema: Schema) -> Field {
        Field::new(name, schema, None, None).unwrap()
    }

    #[test]
    fn test_duplicate_record_field_name() {
        let record = Schema::record("RecordName", None, None, false).unwrap();
        let err = record
            .set_fields(vec![field("field_name", Schema::null()), field("field_name", Schema::int())])
            .unwrap_err();

        assert!(matches!(err, SchemaError::DuplicateFieldName { .. }));
        assert!(err.to_string().contains("Duplicate field field_name in record RecordName"));
        assert!(!record.as_record().unwrap().has_fields());
    }

    #[test]
    fn test_fields_set_once() {
        let record = Schema::record("Once", None, None, false).unwrap();
        record.set_fields(vec![field("a", Schema::int())]).unwrap();

        let err = record.set_fields(vec![field("b", Schema::int())]).unwrap_err();
        assert!(matches!(err, SchemaError::FieldsAlreadySet(ref n) if n == "Once"));
        assert_eq!(record.fields().len(), 1);
    }

    #[test]
    fn test_field_positions() {
        let record = Schema::record_with_fields(
            "foobar",
            None,
            None,
            false,
            Some(vec![field("field_name1", Schema::null()), field("field_name2", Schema::int())]),
        )
        .unwrap();

        assert_eq!(record.fields().len(), 2);
        assert_eq!(record.field("field_name2").unwrap().position(), 1);
    }

    #[test]
    fn test_null_field_list_rejected() {
        let err = Schema::record_with_fields("foobar", None, None, false, None).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidArgument(_)));
    }

    #[test]
    fn test_set_fields_on_non_record() {
        assert!(Schema::int().set_fields(Vec::new()).is_err());
    }

    #[test]
    fn test_create_rejects_composites() {
        assert!(Schema::create(SchemaType::Long).is_ok());
        assert!(Schema::create(SchemaType::Record).is_err());
    }

    #[test]
    fn test_enum_validation() {
        let symbols = |s: &[&str]| s.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert!(Schema::enumeration("Suit", None, None, symbols(&["A", "A"]), None).is_err());
        assert!(Schema::enumeration("Suit", None, None, symbols(&["A", "B"]), Some("C")).is_err());
        assert!(Schema::enumeration("Suit", None, None, symbols(&["A", "1B"]), None).is_err());

        let suit = Schema::enumeration("Suit", None, None, symbols(&["A", "B"]), Some("B")).unwrap();
        assert_eq!(suit.symbols().len(), 2);
    }

    #[test]
    fn test_aliases_resolved_against_namespace() {
        let fixed = Schema::fixed("Md5", None, Some("org.hash"), 16)
            .unwrap()
            .with_aliases(["OldMd5", "other.Digest"])
            .unwrap();

        let aliases = fixed.aliases();
        assert!(aliases.contains("org.hash.OldMd5"));
        assert!(aliases.contains("other.Digest"));
        assert!(Schema::int().with_aliases(["x"]).is_err());
    }

    #[test]
    fn test_props_cannot_be_overwritten() {
        let mut schema = Schema::string();
        schema.add_prop("avro.java.string", Value::from("String")).unwrap();
        schema.add_prop("avro.java.string", Value::from("String")).unwrap();
        assert!(schema.add_prop("avro.java.string", Value::from("Utf8")).is_err());
    }

    #[test]
    fn test_reserved_props_rejected() {
        let mut schema = Schema::string();
        let err = schema.add_prop("type", Value::from("int")).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidArgument(_)));
        assert!(err.to_string().contains("Can't set reserved property: type"));
        assert!(schema.props().is_empty());
        assert_eq!(schema.to_string(), r#""string""#);

        let mut record = Schema::record("R", None, None, false).unwrap();
        for key in ["name", "fields", "namespace", "aliases", "doc"] {
            assert!(record.add_prop(key, Value::from("x")).is_err(), "{}", key);
        }

        let mut field = field("f", Schema::int());
        assert!(field.add_prop("default", Value::from(1)).is_err());
        assert!(field.add_prop("order", Value::from("ignore")).is_err());
        field.add_prop("size", Value::from(4)).unwrap();
        assert_eq!(field.prop("size"), Some(&Value::from(4)));
    }

    #[test]
    fn test_aliases_on_reference_rejected() {
        let node = Schema::reference(Name::new("Node").unwrap(), SchemaType::Record).unwrap();
        let err = node.with_aliases(["Old"]).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidArgument(_)));
    }
}
