//! Names of named types (record, enum, fixed)

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{SchemaError, SchemaResult};

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"));

/// Check that `value` is a legal identifier (type name, field name, enum symbol)
pub fn validate_identifier(what: &str, value: &str) -> SchemaResult<()> {
    if value.is_empty() {
        return Err(SchemaError::invalid(format!("Empty {} name", what)));
    }
    if !IDENTIFIER.is_match(value) {
        return Err(SchemaError::invalid(format!("Illegal {} name: {:?}", what, value)));
    }
    Ok(())
}

/// Check that `value` is a dot-separated sequence of identifiers
pub fn validate_namespace(value: &str) -> SchemaResult<()> {
    for part in value.split('.') {
        if part.is_empty() || !IDENTIFIER.is_match(part) {
            return Err(SchemaError::invalid(format!("Illegal namespace: {:?}", value)));
        }
    }
    Ok(())
}

/// A validated, namespace-qualified type name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name {
    name: String,
    namespace: Option<String>,
}

impl Name {
    /// Create a name from a simple or dotted full name
    pub fn new(name: &str) -> SchemaResult<Self> {
        Self::with_namespace(name, None)
    }

    /// Create a name inside `namespace`.
    ///
    /// A dotted `name` carries its own namespace and the argument is ignored.
    /// An empty namespace means no namespace.
    pub fn with_namespace(name: &str, namespace: Option<&str>) -> SchemaResult<Self> {
        let (namespace, name) = match name.rfind('.') {
            Some(dot) => (Some(&name[..dot]), &name[dot + 1..]),
            None => (namespace.filter(|ns| !ns.is_empty()), name),
        };

        validate_identifier("type", name)?;
        if let Some(ns) = namespace {
            validate_namespace(ns)?;
        }

        Ok(Self {
            name: name.to_string(),
            namespace: namespace.map(String::from),
        })
    }

    /// The simple name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The namespace, if any
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// `namespace.name`, or `name` when there is no namespace
    pub fn fullname(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    /// The shortest spelling that resolves back to this name from inside
    /// `enclosing`: the simple name when the namespaces agree, otherwise the
    /// full name.
    pub fn qualified_in(&self, enclosing: Option<&str>) -> String {
        if self.namespace.as_deref() == enclosing {
            self.name.clone()
        } else {
            self.fullname()
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}.{}", ns, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}
