use serde::{Deserialize, Serialize};

use datafreeze_core::DEFAULT_ANNOTATION_PREFIX;

/// Options that control which tables are read and how annotations are found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogOptions {
    pub include_system_schemas: bool,
    /// Allow-list of schema names; `None` reads every schema.
    pub schemas: Option<Vec<String>>,
    /// Schemas ending with this suffix (any case) hold history tables.
    /// An empty suffix disables the rule.
    pub history_schema_suffix: String,
    /// Schemas owned by maintenance tooling (job queues and the like).
    pub maintenance_schemas: Vec<String>,
    /// Tables that record applied migrations.
    pub migration_history_tables: Vec<String>,
    /// Comment-line prefix that marks a name override.
    pub annotation_prefix: String,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            include_system_schemas: false,
            schemas: None,
            history_schema_suffix: "history".to_string(),
            maintenance_schemas: vec!["hangfire".to_string()],
            migration_history_tables: vec![
                "__EFMigrationsHistory".to_string(),
                "_sqlx_migrations".to_string(),
            ],
            annotation_prefix: DEFAULT_ANNOTATION_PREFIX.to_string(),
        }
    }
}

impl CatalogOptions {
    /// True when tables in `schema` must never be emitted.
    pub fn excludes_schema(&self, schema: &str) -> bool {
        let is_system = schema.starts_with("pg_") || schema == "information_schema";
        if is_system && !self.include_system_schemas {
            return true;
        }
        if let Some(list) = &self.schemas {
            if !list.iter().any(|item| item == schema) {
                return true;
            }
        }

        let lowered = schema.to_lowercase();
        if !self.history_schema_suffix.is_empty()
            && lowered.ends_with(&self.history_schema_suffix.to_lowercase())
        {
            return true;
        }
        self.maintenance_schemas
            .iter()
            .any(|name| name.eq_ignore_ascii_case(schema))
    }

    /// True when `table` is a migration bookkeeping table.
    pub fn excludes_table(&self, table: &str) -> bool {
        self.migration_history_tables
            .iter()
            .any(|name| name.eq_ignore_ascii_case(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excludes_system_history_and_maintenance_schemas() {
        let opts = CatalogOptions::default();
        assert!(opts.excludes_schema("pg_catalog"));
        assert!(opts.excludes_schema("information_schema"));
        assert!(opts.excludes_schema("AuditHistory"));
        assert!(opts.excludes_schema("HangFire"));
        assert!(!opts.excludes_schema("public"));
        assert!(!opts.excludes_schema("history_notes"));
    }

    #[test]
    fn allow_list_restricts_schemas() {
        let opts = CatalogOptions {
            schemas: Some(vec!["app".to_string()]),
            ..CatalogOptions::default()
        };
        assert!(!opts.excludes_schema("app"));
        assert!(opts.excludes_schema("public"));
    }

    #[test]
    fn empty_suffix_disables_history_rule() {
        let opts = CatalogOptions {
            history_schema_suffix: String::new(),
            ..CatalogOptions::default()
        };
        assert!(!opts.excludes_schema("AuditHistory"));
    }

    #[test]
    fn excludes_migration_tables_ignoring_case() {
        let opts = CatalogOptions::default();
        assert!(opts.excludes_table("__EFMigrationsHistory"));
        assert!(opts.excludes_table("__efmigrationshistory"));
        assert!(opts.excludes_table("_sqlx_migrations"));
        assert!(!opts.excludes_table("users"));
    }
}
