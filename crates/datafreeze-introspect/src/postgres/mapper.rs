use std::collections::HashMap;

use datafreeze_core::{ColumnDescriptor, NameMapping, TableDescriptor, ValueKind, parse_annotation};

use crate::options::CatalogOptions;

use super::queries::{RawAnnotation, RawColumn, RawPrimaryKey, RawTable};

pub fn map_tables(
    raw: Vec<RawTable>,
    primary_keys: Vec<RawPrimaryKey>,
    opts: &CatalogOptions,
) -> Vec<TableDescriptor> {
    let mut keys: HashMap<(String, String), Vec<String>> = primary_keys
        .into_iter()
        .map(|pk| ((pk.schema_name, pk.table_name), pk.columns))
        .collect();

    let mut tables: Vec<TableDescriptor> = raw
        .into_iter()
        .filter(|table| is_eligible(opts, &table.schema_name, &table.table_name))
        .map(|table| {
            let primary_key = keys
                .remove(&(table.schema_name.clone(), table.table_name.clone()))
                .unwrap_or_default();
            TableDescriptor {
                primary_key,
                ..TableDescriptor::new(table.schema_name, table.table_name)
            }
        })
        .collect();

    tables.sort_by(|left, right| left.sort_key().cmp(&right.sort_key()));
    tables
}

pub fn map_columns(raw: Vec<RawColumn>) -> Vec<ColumnDescriptor> {
    let mut columns: Vec<ColumnDescriptor> = raw
        .into_iter()
        .filter(|col| !col.is_generated)
        .map(|col| ColumnDescriptor {
            kind: ValueKind::classify(&col.udt_name, &col.data_type, &col.type_category),
            ordinal_position: col.ordinal_position,
            name: col.name,
            data_type: col.data_type,
            udt_name: col.udt_name,
            is_generated: false,
        })
        .collect();

    columns.sort_by_key(|col| col.ordinal_position);
    columns
}

pub fn map_annotations(raw: Vec<RawAnnotation>, opts: &CatalogOptions) -> Vec<NameMapping> {
    raw.into_iter()
        .filter(|item| is_eligible(opts, &item.schema_name, &item.table_name))
        .flat_map(|item| {
            parse_annotation(
                &opts.annotation_prefix,
                &item.schema_name,
                &item.table_name,
                &item.column_name,
                item.column_position,
                &item.comment,
            )
        })
        .collect()
}

fn is_eligible(opts: &CatalogOptions, schema: &str, table: &str) -> bool {
    !opts.excludes_schema(schema) && !opts.excludes_table(table)
}
