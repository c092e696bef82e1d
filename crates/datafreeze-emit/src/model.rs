use serde::{Deserialize, Serialize};

use datafreeze_core::EscapeMode;

use crate::project::FALLBACK_NAMESPACE;

/// Knobs for one emission run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitOptions {
    /// Namespace forced by the caller; wins over annotations and the project.
    pub namespace: Option<String>,
    /// Namespace used when nothing else provides one.
    pub fallback_namespace: String,
    pub escape: EscapeMode,
    /// Skip tables whose rows cannot be read instead of aborting the run.
    pub skip_failed_tables: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            namespace: None,
            fallback_namespace: FALLBACK_NAMESPACE.to_string(),
            escape: EscapeMode::Escaped,
            skip_failed_tables: false,
        }
    }
}

/// A table left out because its rows could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTable {
    pub source: String,
    pub table: String,
    pub reason: String,
}

/// Summary of what ended up in the generated file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitReport {
    pub namespace: String,
    pub sources: u64,
    pub tables_emitted: u64,
    pub tables_empty: u64,
    pub rows_emitted: u64,
    pub bytes: u64,
    pub skipped: Vec<SkippedTable>,
}
