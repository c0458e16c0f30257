//! Familiar Avro Schemas
//!
//! Schema definition and schema evolution for Avro-style data: a validated
//! type model, a text parser that resolves named and recursive types, alias
//! projection between reader and writer schemas, and cycle-safe structural
//! equality.
//!
//! ## Features
//!
//! - **Type Model**: immutable, cheaply clonable schema graphs with eager validation
//! - **Parsing**: whole documents or arbitrary text fragments, shared naming sessions
//! - **Alias Projection**: rename a writer schema's types and fields to a reader's names
//! - **Equality & Hashing**: structural, terminating on recursive schemas
//! - **Fingerprints**: SHA-256 and CRC-64-AVRO over Parsing Canonical Form
//!
//! ## Example
//!
//! ```text
//! let writer = parse_schema(writer_text)?;
//! let reader = parse_schema(reader_text)?;
//! let projected = apply_aliases(&writer, &reader);
//! assert_eq!(projected.fullname(), reader.fullname());
//! ```

pub mod aliases;
pub mod builder;
pub mod checksum;
pub mod config;
pub mod equality;
pub mod error;
pub mod graph;
pub mod parser;
pub mod registry;
pub mod render;
pub mod schema;

pub use aliases::apply_aliases;
pub use builder::{EnumBuilder, FieldBuilder, FixedBuilder, RecordBuilder};
pub use checksum::Fingerprint;
pub use config::{OutputFormat, SchemaConfig};
pub use equality::schemas_equal;
pub use error::{SchemaError, SchemaResult};
pub use graph::{RecursionAnalysis, TypeGraph};
pub use parser::{parse_schema, Parser};
pub use registry::NameRegistry;
pub use render::canonical_form;
pub use schema::{Field, Name, Order, Schema, SchemaKind, SchemaType, UnionSchema};
