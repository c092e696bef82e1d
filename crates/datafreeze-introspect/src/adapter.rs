use async_trait::async_trait;

use datafreeze_core::{ColumnDescriptor, NameMapping, Result, RowBuffer, TableDescriptor};

/// A backing store the emitter can read tables, annotations and rows from.
///
/// Every call is self-contained: implementations open whatever session they
/// need and release it before returning.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Eligible base tables, ordered by schema then table name, ignoring case.
    /// Columns are not loaded here.
    async fn list_tables(&self) -> Result<Vec<TableDescriptor>>;

    /// Non-generated columns of `table` in ordinal order.
    async fn list_columns(&self, table: &TableDescriptor) -> Result<Vec<ColumnDescriptor>>;

    /// Name overrides declared on columns of eligible tables.
    async fn list_annotations(&self) -> Result<Vec<NameMapping>>;

    /// All rows of `table`, projected on `table.columns` in that order.
    async fn materialize(&self, table: &TableDescriptor) -> Result<RowBuffer>;
}
