//! Ordered schema steps for the store.
//!
//! # Invariants
//! - Step versions start at 1 and increase by one.
//! - All pending steps commit together; a failing step leaves the previous
//!   version in place.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, TransactionBehavior};

/// `(version, sql)` pairs in apply order.
const STEPS: &[(u32, &str)] = &[
    (1, include_str!("0001_favorite_games.sql")),
    (2, include_str!("0002_favorite_games_added_at_index.sql")),
];

/// Newest schema version this build can produce.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |(version, _)| *version)
}

/// Reads the schema version stamped on `conn`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Upgrades `conn` to `latest_version()`.
///
/// Returns the number of steps applied.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let latest = latest_version();
    let found = schema_version(conn)?;
    if found > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: latest,
        });
    }
    if found == latest {
        return Ok(0);
    }

    // The main and background connections of one store may open together;
    // IMMEDIATE takes the write lock before the version is re-read.
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let start = schema_version(&tx)?;
    let mut applied = 0;
    for (version, sql) in STEPS.iter().filter(|(version, _)| *version > start) {
        tx.execute_batch(sql)
            .and_then(|()| tx.pragma_update(None, "user_version", version))
            .map_err(|source| DbError::Migration {
                version: *version,
                source,
            })?;
        applied += 1;
    }
    tx.commit()?;

    if applied > 0 {
        info!("event=db_migrate module=db status=ok from={start} to={latest} steps={applied}");
    }
    Ok(applied)
}
