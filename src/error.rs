//! Error types for schema construction, parsing and name resolution

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;

/// Schema errors
///
/// Every variant is terminal for the operation that raised it. Alias
/// projection never produces one.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Malformed text, unresolved reference, unknown type, or any invariant
    /// violation surfaced while parsing. The underlying kind, if any, is the
    /// error's `source()`.
    #[error("Schema parse error: {message}")]
    Parse {
        message: String,
        #[source]
        cause: Option<Box<SchemaError>>,
    },

    #[error("Duplicate field {field} in record {record}")]
    DuplicateFieldName { record: String, field: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Duplicate in union: {0}")]
    DuplicateUnionBranch(String),

    #[error("Undefined name: {name}{}", suggestion.as_ref().map(|s| format!(" (did you mean {}?)", s)).unwrap_or_default())]
    UndefinedName {
        name: String,
        suggestion: Option<String>,
    },

    #[error("Fields are already set on record {0}")]
    FieldsAlreadySet(String),

    #[error("Can't redefine: {0}")]
    DuplicateTypeDefinition(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaError {
    /// Create a parse error with no underlying cause
    pub fn parse(message: impl Into<String>) -> Self {
        SchemaError::Parse {
            message: message.into(),
            cause: None,
        }
    }

    /// Create an invalid argument error
    pub fn invalid(message: impl Into<String>) -> Self {
        SchemaError::InvalidArgument(message.into())
    }

    /// Wrap any error as a parse error. Parse errors pass through untouched.
    pub fn into_parse(self) -> Self {
        match self {
            SchemaError::Parse { .. } => self,
            other => SchemaError::Parse {
                message: other.to_string(),
                cause: Some(Box::new(other)),
            },
        }
    }

    /// Whether this is a parse error
    pub fn is_parse(&self) -> bool {
        matches!(self, SchemaError::Parse { .. })
    }

    /// The innermost error kind: the cause of a parse error, or the error itself
    pub fn root_cause(&self) -> &SchemaError {
        match self {
            SchemaError::Parse { cause: Some(cause), .. } => cause.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_field_message() {
        let err = SchemaError::DuplicateFieldName {
            record: "RecordName".to_string(),
            field: "field_name".to_string(),
        };
        assert_eq!(err.to_string(), "Duplicate field field_name in record RecordName");
    }

    #[test]
    fn test_into_parse_keeps_cause() {
        let err = SchemaError::UndefinedName {
            name: "Missing".to_string(),
            suggestion: None,
        }
        .into_parse();

        assert!(err.is_parse());
        assert!(err.to_string().contains("Undefined name: Missing"));
        assert!(matches!(err.root_cause(), SchemaError::UndefinedName { .. }));
    }

    #[test]
    fn test_undefined_name_suggestion() {
        let err = SchemaError::UndefinedName {
            name: "Adress".to_string(),
            suggestion: Some("Address".to_string()),
        };
        assert_eq!(err.to_string(), "Undefined name: Adress (did you mean Address?)");
    }
}
