use sqlx::{Connection, PgConnection};
use tracing::debug;

use datafreeze_core::{
    ColumnDescriptor, Error, NameMapping, Result, RowBuffer, TableDescriptor,
    redact_connection_string,
};

use crate::adapter::CatalogSource;
use crate::options::CatalogOptions;

mod mapper;
mod queries;
mod rows;

pub use rows::{quote_ident, select_statement};

/// Catalog source backed by a PostgreSQL database.
///
/// No connection is held between calls; each operation opens a session,
/// runs its statements and closes it again.
#[derive(Clone)]
pub struct PostgresSource {
    url: String,
    options: CatalogOptions,
}

impl std::fmt::Debug for PostgresSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresSource")
            .field("url", &redact_connection_string(&self.url))
            .field("options", &self.options)
            .finish()
    }
}

impl PostgresSource {
    pub fn new(url: impl Into<String>, options: CatalogOptions) -> Self {
        Self {
            url: url.into(),
            options,
        }
    }

    async fn connect(&self) -> Result<PgConnection> {
        debug!(url = %redact_connection_string(&self.url), "opening session");
        PgConnection::connect(&self.url)
            .await
            .map_err(|err| Error::Connect(err.to_string()))
    }
}

async fn close(conn: PgConnection) -> Result<()> {
    conn.close()
        .await
        .map_err(|err| Error::Connect(err.to_string()))
}

#[async_trait::async_trait]
impl CatalogSource for PostgresSource {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn list_tables(&self) -> Result<Vec<TableDescriptor>> {
        let mut conn = self.connect().await?;
        let raw_tables = queries::list_tables(&mut conn).await?;
        let raw_keys = queries::list_primary_keys(&mut conn).await?;
        close(conn).await?;

        Ok(mapper::map_tables(raw_tables, raw_keys, &self.options))
    }

    async fn list_columns(&self, table: &TableDescriptor) -> Result<Vec<ColumnDescriptor>> {
        let mut conn = self.connect().await?;
        let raw = queries::list_columns(&mut conn, &table.schema, &table.name).await?;
        close(conn).await?;

        Ok(mapper::map_columns(raw))
    }

    async fn list_annotations(&self) -> Result<Vec<NameMapping>> {
        let mut conn = self.connect().await?;
        let raw = queries::list_annotations(&mut conn, &self.options.annotation_prefix).await?;
        close(conn).await?;

        Ok(mapper::map_annotations(raw, &self.options))
    }

    async fn materialize(&self, table: &TableDescriptor) -> Result<RowBuffer> {
        let qualified = table.qualified_name();
        let mut conn = PgConnection::connect(&self.url)
            .await
            .map_err(|err| Error::materialize(&qualified, err.to_string()))?;
        let rows = rows::fetch_rows(&mut conn, table).await?;
        conn.close()
            .await
            .map_err(|err| Error::materialize(&qualified, err.to_string()))?;

        Ok(rows)
    }
}
