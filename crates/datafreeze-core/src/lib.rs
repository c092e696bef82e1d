//! Core contracts and helpers for datafreeze.
//!
//! This crate defines the catalog model, cell values, the identifier
//! sanitizer, the annotation mapping set and the C# literal formatter shared
//! by the introspection adapters, the emitter and the CLI.

pub mod error;
pub mod identifier;
pub mod literal;
pub mod mapping;
pub mod redaction;
pub mod schema;
pub mod value;

pub use error::{Error, Result};
pub use identifier::sanitize_identifier;
pub use literal::{EscapeMode, LiteralFormatter};
pub use mapping::{DEFAULT_ANNOTATION_PREFIX, MappingSet, NameMapping, parse_annotation};
pub use redaction::redact_connection_string;
pub use schema::{ColumnDescriptor, DataSource, TableDescriptor, ValueKind};
pub use value::{CellValue, Row, RowBuffer};
