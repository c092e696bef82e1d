use sqlx::{PgConnection, Row as _};

use datafreeze_core::{
    CellValue, ColumnDescriptor, Error, Result, Row, RowBuffer, TableDescriptor, ValueKind,
};

/// Session settings that pin the text form of dates, floats and bytea.
const SESSION_SETTINGS: &[&str] = &[
    "set datestyle = 'ISO, YMD'",
    "set bytea_output = 'hex'",
    "set extra_float_digits = 1",
];

/// Quote an identifier for Postgres, doubling embedded quotes.
pub fn quote_ident(name: &str) -> Result<String> {
    if name.is_empty() || name.contains('\0') {
        return Err(Error::MetadataRead(format!(
            "identifier {name:?} cannot be quoted"
        )));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Alias of the table inside generated selects. Qualifying every input column
/// with it keeps `order by` away from the same-named text output columns.
const TABLE_ALIAS: &str = "src";

/// Text projection of one column; the result never depends on the session
/// time zone or locale.
fn projection(column: &ColumnDescriptor) -> Result<String> {
    let ident = format!("{TABLE_ALIAS}.{}", quote_ident(&column.name)?);
    Ok(match column.udt_name.as_str() {
        "timestamptz" => format!("({ident} at time zone 'UTC')::text"),
        "timetz" => format!("{ident}::time::text"),
        "money" => format!("{ident}::numeric::text"),
        // `::text` strips the blank padding of `character(n)`; the bpchar
        // value itself decodes to a padded string.
        "bpchar" => format!("{ident}::bpchar"),
        _ => format!("{ident}::text"),
    })
}

/// Sort key for the fallback order of a table without primary key.
///
/// Columns sort by their own type. Text-like and unclassified types sort by
/// their text form, since some of them (`json`, `xml`, geometric types) have
/// no ordering of their own.
fn ordering_key(column: &ColumnDescriptor) -> Result<String> {
    let ident = format!("{TABLE_ALIAS}.{}", quote_ident(&column.name)?);
    Ok(match column.kind {
        ValueKind::Text | ValueKind::Other => format!("{ident}::text"),
        _ => ident,
    })
}

/// Build the select for `table`: an explicit projection in column order,
/// ordered by primary key, or by every projected column when there is none.
pub fn select_statement(table: &TableDescriptor) -> Result<String> {
    let projection = table
        .columns
        .iter()
        .map(projection)
        .collect::<Result<Vec<_>>>()?
        .join(", ");

    let mut sql = format!(
        "select {projection} from {}.{} as {TABLE_ALIAS}",
        quote_ident(&table.schema)?,
        quote_ident(&table.name)?
    );

    let keys = if table.primary_key.is_empty() {
        table
            .columns
            .iter()
            .map(ordering_key)
            .collect::<Result<Vec<_>>>()?
    } else {
        table
            .primary_key
            .iter()
            .map(|name| quote_ident(name).map(|ident| format!("{TABLE_ALIAS}.{ident}")))
            .collect::<Result<Vec<_>>>()?
    };
    if !keys.is_empty() {
        sql.push_str(" order by ");
        sql.push_str(&keys.join(", "));
    }

    Ok(sql)
}

pub async fn fetch_rows(conn: &mut PgConnection, table: &TableDescriptor) -> Result<RowBuffer> {
    let qualified = table.qualified_name();

    for setting in SESSION_SETTINGS {
        sqlx::query(setting)
            .execute(&mut *conn)
            .await
            .map_err(|err| Error::materialize(&qualified, err.to_string()))?;
    }

    let sql = select_statement(table)?;
    let pg_rows = sqlx::query(&sql)
        .fetch_all(&mut *conn)
        .await
        .map_err(|err| Error::materialize(&qualified, err.to_string()))?;

    let mut rows = Vec::with_capacity(pg_rows.len());
    for pg_row in &pg_rows {
        let mut row: Row = Vec::with_capacity(table.columns.len());
        for (idx, column) in table.columns.iter().enumerate() {
            let raw: Option<String> = pg_row
                .try_get(idx)
                .map_err(|err| Error::materialize(&qualified, format!("{}: {err}", column.name)))?;
            let value = CellValue::decode(raw.as_deref(), column.kind)
                .map_err(|err| Error::materialize(&qualified, format!("{}: {err}", column.name)))?;
            row.push(value);
        }
        rows.push(row);
    }

    Ok(RowBuffer::new(rows))
}
