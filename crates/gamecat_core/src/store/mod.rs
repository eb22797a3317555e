//! Persistent object store.
//!
//! # Responsibility
//! - Expose save/delete/fetch operations over SQLite as single-shot futures.
//! - Keep all writes on one background context, distinct from the main
//!   context used for synchronous foreground reads.
//!
//! # Invariants
//! - Every write runs in one transaction: it commits fully or rolls back.
//! - Entities are validated inside the write transaction before their row
//!   is written.
//! - Each returned future resolves exactly once.

mod context;
mod entity;
mod pending;
mod query;

pub use entity::Entity;
pub use pending::Pending;
pub use query::{Comparison, FetchRequest, Predicate, SortDescriptor};

use crate::config::is_valid_store_name;
use crate::db::{open_db, open_db_shared_memory, DbError};
use context::BackgroundContext;
use log::{debug, error};
use parking_lot::Mutex;
use query::{count_statement, delete_sql, select_statement, upsert_sql, Statement};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Transaction};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation error.
#[derive(Debug)]
pub enum StoreError {
    /// A save transaction failed and was rolled back.
    SaveFailed,
    /// A delete transaction failed and was rolled back.
    DeleteFailed,
    /// A query could not be built or executed.
    FetchFailed(String),
    /// A fetch-first query matched nothing.
    NotFound,
    InvalidName(String),
    Open(DbError),
    Io(std::io::Error),
    /// The background context is no longer accepting work.
    ContextClosed,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SaveFailed => write!(f, "failed to save changes"),
            Self::DeleteFailed => write!(f, "failed to delete record"),
            Self::FetchFailed(message) => write!(f, "failed to fetch records: {message}"),
            Self::NotFound => write!(f, "no matching record"),
            Self::InvalidName(name) => write!(f, "invalid store name `{name}`"),
            Self::Open(err) => write!(f, "failed to open store: {err}"),
            Self::Io(err) => write!(f, "store i/o failure: {err}"),
            Self::ContextClosed => write!(f, "store background context is closed"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Open(value)
    }
}

/// Where a store keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    Memory,
}

/// Name-addressed SQLite store with a main and a background context.
pub struct Store {
    name: String,
    location: StoreLocation,
    main: Mutex<Connection>,
    background: BackgroundContext,
}

impl Store {
    /// Opens (creating if needed) `<dir>/<name>.sqlite3`.
    pub fn open(dir: impl AsRef<Path>, name: &str) -> StoreResult<Self> {
        ensure_valid_name(name)?;
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{name}.sqlite3"));
        let main = open_db(&path)?;
        let background = open_db(&path)?;
        Self::assemble(name, StoreLocation::File(path), main, background)
    }

    /// Opens a private in-memory store that lives as long as the `Store`.
    pub fn in_memory(name: &str) -> StoreResult<Self> {
        ensure_valid_name(name)?;
        // Suffix keeps two stores with the same name from sharing data.
        let uri_name = format!("{name}-{}", Uuid::new_v4().simple());
        let main = open_db_shared_memory(&uri_name)?;
        // Shared-cache table locks fail at once instead of waiting, so the
        // main context skips them and may see a background write before it
        // commits.
        main.pragma_update(None, "read_uncommitted", true)
            .map_err(DbError::from)?;
        let background = open_db_shared_memory(&uri_name)?;
        Self::assemble(name, StoreLocation::Memory, main, background)
    }

    fn assemble(
        name: &str,
        location: StoreLocation,
        main: Connection,
        background: Connection,
    ) -> StoreResult<Self> {
        let background = BackgroundContext::spawn(name, background)?;
        Ok(Self {
            name: name.to_string(),
            location,
            main: Mutex::new(main),
            background,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// Runs a synchronous read on the main context.
    ///
    /// Never waits for the background context. File stores read the last
    /// committed state; in-memory stores read uncommitted.
    pub fn read<T>(
        &self,
        reader: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> StoreResult<T> {
        let conn = self.main.lock();
        reader(&*conn).map_err(|err| StoreError::FetchFailed(err.to_string()))
    }

    /// Inserts or updates one entity.
    pub fn save<E: Entity>(&self, item: E) -> Pending<()> {
        self.save_all(vec![item])
    }

    /// Inserts or updates all entities in a single transaction.
    pub fn save_all<E: Entity>(&self, items: Vec<E>) -> Pending<()> {
        self.perform(move |tx| {
            let sql = upsert_sql::<E>();
            let mut stmt = tx.prepare_cached(&sql).map_err(|err| err.to_string())?;
            for item in &items {
                item.validate()?;
                stmt.execute(params_from_iter(item.values()))
                    .map_err(|err| err.to_string())?;
            }
            debug!(
                "event=store_save module=store status=ok entity={} count={}",
                E::ENTITY_NAME,
                items.len()
            );
            Ok(())
        })
    }

    /// Runs `work` inside one background transaction.
    ///
    /// The transaction commits when `work` returns `Ok`, and is rolled back
    /// (surfacing `StoreError::SaveFailed`) otherwise.
    pub fn perform<T, F>(&self, work: F) -> Pending<T>
    where
        T: Send + 'static,
        F: FnOnce(&Transaction<'_>) -> Result<T, String> + Send + 'static,
    {
        let store = self.name.clone();
        self.background.execute(move |conn| {
            run_in_transaction(conn, work).map_err(|message| {
                error!(
                    "event=store_save module=store status=error store={store} error_code=save_failed error={message}"
                );
                StoreError::SaveFailed
            })
        })
    }

    /// Deletes the row matching `item`'s key. Deleting an absent row succeeds.
    pub fn delete<E: Entity>(&self, item: &E) -> Pending<()> {
        self.delete_by_key::<E>(item.key())
    }

    pub fn delete_by_key<E: Entity>(&self, key: impl Into<Value>) -> Pending<()> {
        let key = key.into();
        let store = self.name.clone();
        self.background.execute(move |conn| {
            run_in_transaction(conn, |tx| {
                tx.execute(&delete_sql::<E>(), [&key])
                    .map(|_| ())
                    .map_err(|err| err.to_string())
            })
            .map_err(|message| {
                error!(
                    "event=store_delete module=store status=error store={store} entity={} error_code=delete_failed error={message}",
                    E::ENTITY_NAME
                );
                StoreError::DeleteFailed
            })
        })
    }

    /// Fetches every entity matching `request`.
    pub fn fetch_all<E: Entity>(&self, request: FetchRequest) -> Pending<Vec<E>> {
        self.background.execute(move |conn| {
            let started_at = Instant::now();
            let statement = select_statement::<E>(&request).map_err(StoreError::FetchFailed)?;
            let rows = query_entities::<E>(conn, &statement).map_err(|err| {
                error!(
                    "event=store_fetch module=store status=error entity={} error={err}",
                    E::ENTITY_NAME
                );
                StoreError::FetchFailed(err.to_string())
            })?;
            debug!(
                "event=store_fetch module=store status=ok entity={} rows={} duration_ms={}",
                E::ENTITY_NAME,
                rows.len(),
                started_at.elapsed().as_millis()
            );
            Ok(rows)
        })
    }

    /// Fetches the first entity matching `request`, honoring its ordering.
    pub fn fetch_first<E: Entity>(&self, request: FetchRequest) -> Pending<E> {
        self.background.execute(move |conn| {
            let statement =
                select_statement::<E>(&request.limit(1)).map_err(StoreError::FetchFailed)?;
            query_entities::<E>(conn, &statement)
                .map_err(|err| StoreError::FetchFailed(err.to_string()))?
                .into_iter()
                .next()
                .ok_or(StoreError::NotFound)
        })
    }

    /// Counts entities matching `predicate`.
    pub fn count<E: Entity>(&self, predicate: Option<Predicate>) -> Pending<u64> {
        self.background.execute(move |conn| {
            let statement =
                count_statement::<E>(predicate.as_ref()).map_err(StoreError::FetchFailed)?;
            conn.query_row(&statement.sql, params_from_iter(statement.binds.iter()), |row| {
                row.get::<_, i64>(0)
            })
            .map(|count| u64::try_from(count).unwrap_or(0))
            .map_err(|err| StoreError::FetchFailed(err.to_string()))
        })
    }
}

fn ensure_valid_name(name: &str) -> StoreResult<()> {
    if is_valid_store_name(name) {
        Ok(())
    } else {
        Err(StoreError::InvalidName(name.to_string()))
    }
}

fn run_in_transaction<T>(
    conn: &mut Connection,
    work: impl FnOnce(&Transaction<'_>) -> Result<T, String>,
) -> Result<T, String> {
    let tx = conn.transaction().map_err(|err| err.to_string())?;
    // Dropping `tx` without commit rolls it back.
    let value = work(&tx)?;
    tx.commit().map_err(|err| err.to_string())?;
    Ok(value)
}

fn query_entities<E: Entity>(
    conn: &Connection,
    statement: &Statement,
) -> rusqlite::Result<Vec<E>> {
    let mut stmt = conn.prepare_cached(&statement.sql)?;
    let mut rows = stmt.query(params_from_iter(statement.binds.iter()))?;
    let mut entities = Vec::new();
    while let Some(row) = rows.next()? {
        entities.push(E::from_row(row)?);
    }
    Ok(entities)
}
