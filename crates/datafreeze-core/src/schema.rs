use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::identifier::sanitize_identifier;
use crate::redaction::redact_connection_string;

/// One configured connection, named after its sanitized configuration key.
#[derive(Clone)]
pub struct DataSource {
    /// Sanitized container name.
    pub name: String,
    /// Configuration key as written by the user.
    pub key: String,
    /// Connection string for the backing store.
    pub connection: String,
}

impl DataSource {
    /// Build a data source from a configuration entry.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidIdentifier` when the key sanitizes to nothing.
    pub fn new(key: impl Into<String>, connection: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let name = sanitize_identifier(&key)?;
        Ok(Self {
            name,
            key,
            connection: connection.into(),
        })
    }

    /// Connection string with credentials masked, safe for logs.
    pub fn redacted_connection(&self) -> String {
        redact_connection_string(&self.connection)
    }
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSource")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("connection", &self.redacted_connection())
            .finish()
    }
}

/// An eligible base table and its readable columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub schema: String,
    pub name: String,
    /// Non-generated columns in ordinal order.
    pub columns: Vec<ColumnDescriptor>,
    /// Primary key column names in key order; empty when the table has none.
    pub primary_key: Vec<String>,
}

impl TableDescriptor {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
        }
    }

    /// `schema.table`, used in logs and error messages.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }

    /// Case-insensitive catalog order with an exact tie-break.
    pub fn sort_key(&self) -> (String, String, &str, &str) {
        (
            self.schema.to_lowercase(),
            self.name.to_lowercase(),
            self.schema.as_str(),
            self.name.as_str(),
        )
    }
}

/// Column metadata as seen by the materializer and the emitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub ordinal_position: i16,
    pub name: String,
    /// Formatted declared type (e.g. `character varying(40)`).
    pub data_type: String,
    /// Underlying base type name, with domains resolved (e.g. `varchar`).
    pub udt_name: String,
    pub kind: ValueKind,
    pub is_generated: bool,
}

/// Literal family a declared column type is emitted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Boolean,
    Integer,
    Real,
    Double,
    Decimal,
    DateTime,
    Time,
    Char,
    Text,
    Guid,
    Bytes,
    Other,
}

impl ValueKind {
    /// Classify a Postgres type.
    ///
    /// `udt_name` is the base type name, `data_type` the formatted type and
    /// `category` the `pg_type.typcategory` code.
    pub fn classify(udt_name: &str, data_type: &str, category: &str) -> Self {
        match udt_name {
            "bool" => Self::Boolean,
            "int2" | "int4" | "int8" | "oid" => Self::Integer,
            "float4" => Self::Real,
            "float8" => Self::Double,
            "numeric" | "money" => Self::Decimal,
            "timestamp" | "timestamptz" | "date" => Self::DateTime,
            "time" | "timetz" => Self::Time,
            "char" => Self::Char,
            "bpchar" if matches!(data_type, "character(1)" | "character") => Self::Char,
            "uuid" => Self::Guid,
            "bytea" => Self::Bytes,
            "text" | "varchar" | "bpchar" | "name" | "citext" | "json" | "jsonb" | "xml" => {
                Self::Text
            }
            _ => match category {
                "A" | "E" | "S" => Self::Text,
                _ => Self::Other,
            },
        }
    }
}
