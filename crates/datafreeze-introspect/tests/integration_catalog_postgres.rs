use anyhow::{Context, Result, anyhow};
use datafreeze_core::{CellValue, TableDescriptor, ValueKind};
use datafreeze_introspect::{CatalogOptions, CatalogSource, PostgresSource};
use sqlx::{Connection, PgConnection};
use std::{env, fs};

const FIXTURE_PATHS: &[&str] = &[
    "fixtures/sql/postgres/001_schema.sql",
    "fixtures/sql/postgres/002_data.sql",
];

fn database_url() -> Option<String> {
    env::var("TEST_DATABASE_URL")
        .or_else(|_| env::var("DATABASE_URL"))
        .ok()
}

async fn run_fixture(conn: &mut PgConnection, path: &str) -> Result<()> {
    let script = fs::read_to_string(path).with_context(|| format!("reading fixture {path}"))?;

    for statement in script.split(';') {
        let sql = statement.trim();
        if sql.is_empty() {
            continue;
        }

        sqlx::query(sql)
            .execute(&mut *conn)
            .await
            .with_context(|| format!("executing fixture {path}"))?;
    }

    Ok(())
}

async fn prepared_source() -> Result<Option<PostgresSource>> {
    let Some(db_url) = database_url() else {
        eprintln!("skipping: set TEST_DATABASE_URL or DATABASE_URL for integration tests");
        return Ok(None);
    };

    let mut conn = PgConnection::connect(&db_url)
        .await
        .context("connecting to Postgres")?;
    for path in FIXTURE_PATHS {
        run_fixture(&mut conn, path).await?;
    }
    conn.close().await?;

    let options = CatalogOptions {
        schemas: Some(vec![
            "freeze_app".to_string(),
            "freeze_audithistory".to_string(),
        ]),
        ..CatalogOptions::default()
    };
    Ok(Some(PostgresSource::new(db_url, options)))
}

async fn lists_base_tables_in_catalog_order(source: &PostgresSource) -> Result<()> {
    let tables = source.list_tables().await?;
    let names: Vec<&str> = tables.iter().map(|table| table.name.as_str()).collect();
    assert_eq!(names, vec!["codes", "empty_things", "Orders", "users"]);

    let users = tables
        .iter()
        .find(|table| table.name == "users")
        .ok_or_else(|| anyhow!("expected users table"))?;
    assert_eq!(users.primary_key, vec!["id"]);

    let columns = source.list_columns(users).await?;
    let column_names: Vec<&str> = columns.iter().map(|col| col.name.as_str()).collect();
    assert_eq!(
        column_names,
        vec!["id", "email", "full_name", "active", "grade", "balance", "created_at"]
    );
    let kinds: Vec<ValueKind> = columns.iter().map(|col| col.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ValueKind::Integer,
            ValueKind::Text,
            ValueKind::Text,
            ValueKind::Boolean,
            ValueKind::Char,
            ValueKind::Decimal,
            ValueKind::DateTime,
        ]
    );

    Ok(())
}

async fn reads_annotations_from_column_comments(source: &PostgresSource) -> Result<()> {
    let mappings = source.list_annotations().await?;
    let targets: Vec<(&str, &str, &str)> = mappings
        .iter()
        .map(|m| (m.column.as_str(), m.class_name.as_str(), m.property_name.as_str()))
        .collect();
    assert_eq!(
        targets,
        vec![
            ("id", "Customer", "CustomerId"),
            ("full_name", "Customer", "FullName"),
        ]
    );
    assert!(mappings.iter().all(|m| m.namespace == "Shop.Models"));
    // email_domain is generated and carries an annotation of its own.
    assert!(mappings.iter().all(|m| m.column != "email_domain"));

    Ok(())
}

async fn loaded_table(source: &PostgresSource, name: &str) -> Result<TableDescriptor> {
    let mut table = source
        .list_tables()
        .await?
        .into_iter()
        .find(|table| table.name == name)
        .ok_or_else(|| anyhow!("expected {name} table"))?;
    table.columns = source.list_columns(&table).await?;
    Ok(table)
}

async fn materializes_rows_in_key_order(source: &PostgresSource) -> Result<()> {
    let users = loaded_table(source, "users").await?;

    let rows = source.materialize(&users).await?;
    let ids: Vec<&CellValue> = rows.rows.iter().map(|row| &row[0]).collect();
    assert_eq!(ids, vec![&CellValue::Int(1), &CellValue::Int(2), &CellValue::Int(10)]);
    assert_eq!(rows.rows[0][1], CellValue::Text("ada@example.com".to_string()));
    assert_eq!(rows.rows[0][4], CellValue::Char('A'));
    assert_eq!(rows.rows[0][5], CellValue::Decimal("1234.50".to_string()));
    assert_eq!(rows.rows[1][3], CellValue::Bool(false));
    assert_eq!(rows.rows[0].len(), 7);

    Ok(())
}

async fn keeps_fixed_width_padding_and_typed_order_without_key(
    source: &PostgresSource,
) -> Result<()> {
    let codes = loaded_table(source, "codes").await?;
    assert!(codes.primary_key.is_empty());
    let kinds: Vec<ValueKind> = codes.columns.iter().map(|col| col.kind).collect();
    assert_eq!(kinds, vec![ValueKind::Integer, ValueKind::Char, ValueKind::Text]);

    let rows = source.materialize(&codes).await?;
    assert_eq!(
        rows.rows,
        vec![
            vec![
                CellValue::Int(2),
                CellValue::Char(' '),
                CellValue::Text("ab  ".to_string()),
            ],
            vec![
                CellValue::Int(9),
                CellValue::Null,
                CellValue::Text("z   ".to_string()),
            ],
            vec![
                CellValue::Int(10),
                CellValue::Char('x'),
                CellValue::Text("abcd".to_string()),
            ],
        ]
    );

    Ok(())
}

// Fixtures drop and recreate their schemas, so the checks share one setup.
#[tokio::test]
async fn introspects_fixture_database() -> Result<()> {
    let Some(source) = prepared_source().await? else {
        return Ok(());
    };

    lists_base_tables_in_catalog_order(&source).await?;
    reads_annotations_from_column_comments(&source).await?;
    materializes_rows_in_key_order(&source).await?;
    keeps_fixed_width_padding_and_typed_order_without_key(&source).await?;
    Ok(())
}
