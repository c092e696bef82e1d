//! Catalog readers and row materializers for datafreeze.

pub mod adapter;
pub mod options;
pub mod postgres;

pub use adapter::CatalogSource;
pub use options::CatalogOptions;
pub use postgres::PostgresSource;
