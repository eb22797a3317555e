//! Persisted entity contract.

use rusqlite::types::Value;
use rusqlite::Row;

/// A record type the store can persist and query.
///
/// `COLUMNS` is the full column list (key included) in the order produced by
/// `values`; predicates and sort descriptors may only name these columns.
pub trait Entity: Sized + Send + 'static {
    /// Table backing this entity.
    const ENTITY_NAME: &'static str;
    /// Primary key column, also listed in `COLUMNS`.
    const KEY_COLUMN: &'static str;
    const COLUMNS: &'static [&'static str];

    fn key(&self) -> Value;

    /// Column values in `COLUMNS` order.
    fn values(&self) -> Vec<Value>;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Checked inside the write transaction, before the row is written.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    fn has_column(column: &str) -> bool {
        Self::COLUMNS.contains(&column)
    }
}
