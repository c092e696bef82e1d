use std::collections::{HashMap, HashSet};
use std::fmt;

use datafreeze_core::{
    DataSource, Error, LiteralFormatter, MappingSet, RowBuffer, TableDescriptor,
    sanitize_identifier,
};
use datafreeze_introspect::CatalogSource;
use tracing::{debug, info, warn};

use crate::errors::EmitError;
use crate::model::{EmitOptions, EmitReport, SkippedTable};
use crate::writer::CodeWriter;

const FILE_HEADER: &[&str] = &[
    "// <auto-generated>",
    "//     Generated by datafreeze from live database rows.",
    "//     Changes to this file are lost when it is regenerated.",
    "// </auto-generated>",
    "using System;",
];

/// A configured data source paired with the catalog that reads it.
pub struct BoundSource {
    pub source: DataSource,
    pub catalog: Box<dyn CatalogSource>,
}

impl BoundSource {
    pub fn new(source: DataSource, catalog: impl CatalogSource + 'static) -> Self {
        Self {
            source,
            catalog: Box::new(catalog),
        }
    }
}

impl fmt::Debug for BoundSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundSource")
            .field("source", &self.source)
            .field("engine", &self.catalog.engine())
            .finish()
    }
}

/// Where the emitter currently is; carried into logs and skip records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitContext {
    pub source: String,
    pub schema: Option<String>,
    pub table: Option<String>,
}

impl EmitContext {
    pub fn for_source(source: &DataSource) -> Self {
        Self {
            source: source.name.clone(),
            schema: None,
            table: None,
        }
    }

    pub fn with_table(&self, table: &TableDescriptor) -> Self {
        Self {
            source: self.source.clone(),
            schema: Some(table.schema.clone()),
            table: Some(table.name.clone()),
        }
    }

    /// `source/schema.table`, or just the source outside a table.
    pub fn describe(&self) -> String {
        match (&self.schema, &self.table) {
            (Some(schema), Some(table)) => format!("{}/{schema}.{table}", self.source),
            _ => self.source.clone(),
        }
    }
}

/// Rendered file text plus what went into it.
#[derive(Debug, Clone)]
pub struct EmittedFile {
    pub text: String,
    pub namespace: String,
    pub report: EmitReport,
}

/// Drives catalog reads and renders the generated file.
#[derive(Debug, Clone, Default)]
pub struct Emitter {
    options: EmitOptions,
    formatter: LiteralFormatter,
}

impl Emitter {
    pub fn new(options: EmitOptions) -> Self {
        let formatter = LiteralFormatter::new(options.escape);
        Self { options, formatter }
    }

    /// Render every source into one file.
    ///
    /// Sources are emitted in the order given. All annotations are read before
    /// anything is rendered, since the namespace comes from the first one that
    /// declares it. Nothing is written to disk here.
    pub async fn emit(
        &self,
        sources: &[BoundSource],
        project_namespace: Option<&str>,
    ) -> Result<EmittedFile, EmitError> {
        check_sources(sources)?;

        let mut mapping_sets = Vec::with_capacity(sources.len());
        for bound in sources {
            let mappings = MappingSet::new(bound.catalog.list_annotations().await?);
            debug!(source = %bound.source.name, mappings = mappings.len(), "annotations loaded");
            mapping_sets.push(mappings);
        }

        let namespace = self.resolve_namespace(&mapping_sets, project_namespace);
        let mut report = EmitReport {
            namespace: namespace.clone(),
            ..EmitReport::default()
        };

        let mut out = CodeWriter::new();
        for line in FILE_HEADER {
            out.line(line);
        }
        out.blank();
        out.open(&format!("namespace {namespace}"));

        for (idx, (bound, mappings)) in sources.iter().zip(&mapping_sets).enumerate() {
            if idx > 0 {
                out.blank();
            }
            self.emit_source(&mut out, bound, mappings, &mut report).await?;
            report.sources += 1;
        }

        out.close("");

        let text = out.into_string();
        report.bytes = text.len() as u64;
        Ok(EmittedFile {
            text,
            namespace,
            report,
        })
    }

    fn resolve_namespace(&self, mapping_sets: &[MappingSet], project_namespace: Option<&str>) -> String {
        let explicit = self.options.namespace.as_deref().map(str::trim);
        explicit
            .filter(|ns| !ns.is_empty())
            .or_else(|| mapping_sets.iter().find_map(MappingSet::namespace))
            .or(project_namespace.filter(|ns| !ns.is_empty()))
            .unwrap_or(self.options.fallback_namespace.as_str())
            .to_string()
    }

    async fn emit_source(
        &self,
        out: &mut CodeWriter,
        bound: &BoundSource,
        mappings: &MappingSet,
        report: &mut EmitReport,
    ) -> Result<(), EmitError> {
        let ctx = EmitContext::for_source(&bound.source);
        info!(
            event = "source_started",
            source = %ctx.source,
            connection = %bound.source.redacted_connection(),
            engine = bound.catalog.engine()
        );

        let mut tables = bound.catalog.list_tables().await?;
        tables.sort_by(|left, right| left.sort_key().cmp(&right.sort_key()));
        let fields = field_names(&bound.source.name, &tables)?;

        out.open(&format!("public static class {}", bound.source.name));
        let mut wrote_table = false;

        for (mut table, field) in tables.into_iter().zip(fields) {
            let table_ctx = ctx.with_table(&table);

            let mut columns = bound.catalog.list_columns(&table).await?;
            columns.sort_by_key(|column| column.ordinal_position);
            table.columns = columns;

            let rows = match bound.catalog.materialize(&table).await {
                Ok(rows) => rows,
                Err(err @ Error::Materialize { .. }) if self.options.skip_failed_tables => {
                    warn!(
                        event = "table_skipped",
                        context = %table_ctx.describe(),
                        error = %err
                    );
                    report.skipped.push(SkippedTable {
                        source: table_ctx.source.clone(),
                        table: table.qualified_name(),
                        reason: err.to_string(),
                    });
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            if rows.is_empty() {
                debug!(context = %table_ctx.describe(), "table has no rows");
                report.tables_empty += 1;
                continue;
            }

            if wrote_table {
                out.blank();
            }
            self.emit_table(out, &table, &field, mappings, &rows)?;
            wrote_table = true;

            info!(
                event = "table_emitted",
                context = %table_ctx.describe(),
                field = %field,
                rows = rows.len()
            );
            report.tables_emitted += 1;
            report.rows_emitted += rows.len() as u64;
        }

        out.close("");
        Ok(())
    }

    fn emit_table(
        &self,
        out: &mut CodeWriter,
        table: &TableDescriptor,
        field: &str,
        mappings: &MappingSet,
        rows: &RowBuffer,
    ) -> Result<(), EmitError> {
        let class_name = match mappings.class_name(&table.schema, &table.name) {
            Some(name) => name.to_string(),
            None => sanitize_identifier(&table.name)?,
        };
        let properties = property_names(table, mappings)?;

        out.open(&format!(
            "public static readonly {class_name}[] {field} = new {class_name}[]"
        ));
        for row in &rows.rows {
            out.open(&format!("new {class_name}"));
            for ((column, property), value) in table.columns.iter().zip(&properties).zip(row) {
                let literal = self.formatter.format(value, column.kind);
                out.line(&format!("{property} = {literal},"));
            }
            out.close(",");
        }
        out.close(";");
        Ok(())
    }
}

/// Initializer member names for the columns of `table`, in column order.
///
/// Annotated names win over sanitized column names. Repeats such as
/// `first_name` next to `firstname` get a running number.
fn property_names(table: &TableDescriptor, mappings: &MappingSet) -> Result<Vec<String>, EmitError> {
    let names = table
        .columns
        .iter()
        .map(|column| match mappings.property_name(&table.schema, &table.name, &column.name) {
            Some(name) => Ok(name.to_string()),
            None => sanitize_identifier(&column.name).map_err(EmitError::from),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(number_repeats(names))
}

/// Keep the first use of a name and append 2, 3, ... to later ones.
fn number_repeats(names: Vec<String>) -> Vec<String> {
    let mut taken = HashSet::new();
    names
        .into_iter()
        .map(|base| {
            let mut name = base.clone();
            let mut suffix = 2;
            while !taken.insert(name.clone()) {
                name = format!("{base}{suffix}");
                suffix += 1;
            }
            name
        })
        .collect()
}

fn check_sources(sources: &[BoundSource]) -> Result<(), EmitError> {
    if sources.is_empty() {
        return Err(Error::Config("no data sources configured".to_string()).into());
    }

    let mut seen: HashMap<&str, &str> = HashMap::new();
    for bound in sources {
        if let Some(previous) = seen.insert(bound.source.name.as_str(), bound.source.key.as_str()) {
            return Err(Error::Config(format!(
                "connections {previous:?} and {:?} both map to container {}",
                bound.source.key, bound.source.name
            ))
            .into());
        }
    }
    Ok(())
}

/// Field names for the record arrays of one container, aligned with `tables`.
///
/// A name is the sanitized table name. Names shared by several tables get the
/// sanitized schema name in front, a name that still repeats gets a running
/// number, and a name equal to the container gets a `Rows` suffix.
fn field_names(container: &str, tables: &[TableDescriptor]) -> Result<Vec<String>, EmitError> {
    let bare = tables
        .iter()
        .map(|table| sanitize_identifier(&table.name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in &bare {
        *counts.entry(name.as_str()).or_default() += 1;
    }

    let mut fields = Vec::with_capacity(tables.len());
    for (table, name) in tables.iter().zip(&bare) {
        let mut field = if counts[name.as_str()] > 1 {
            format!("{}{name}", sanitize_identifier(&table.schema)?)
        } else {
            name.clone()
        };
        if field == container {
            field.push_str("Rows");
        }
        fields.push(field);
    }
    Ok(number_repeats(fields))
}
