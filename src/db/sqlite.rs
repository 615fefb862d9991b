use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::Connection;

use super::DatabaseError;
use crate::config::DatabaseLocation;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Injected database handle shared by every request.
///
/// File databases hand out one connection per request. In-memory databases
/// only exist for the lifetime of their connection, so requests share one
/// connection behind a mutex.
#[derive(Clone)]
pub struct Database {
    backend: Arc<Backend>,
}

enum Backend {
    File(PathBuf),
    Memory(Mutex<Connection>),
}

/// A connection borrowed from [`Database`] for the duration of a request.
pub enum DbConn<'a> {
    Owned(Connection),
    Shared(MutexGuard<'a, Connection>),
}

impl Deref for DbConn<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        match self {
            DbConn::Owned(conn) => conn,
            DbConn::Shared(guard) => guard,
        }
    }
}

impl DerefMut for DbConn<'_> {
    fn deref_mut(&mut self) -> &mut Connection {
        match self {
            DbConn::Owned(conn) => conn,
            DbConn::Shared(guard) => guard,
        }
    }
}

impl Database {
    /// Open (or create) a file database and bring its schema up to date.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        let conn = open_database(path)?;
        drop(conn);
        Ok(Self {
            backend: Arc::new(Backend::File(path.to_path_buf())),
        })
    }

    /// Fresh in-memory database (tests and throwaway runs).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        let conn = open_memory_database()?;
        Ok(Self {
            backend: Arc::new(Backend::Memory(Mutex::new(conn))),
        })
    }

    pub fn open_location(location: &DatabaseLocation) -> Result<Self, DatabaseError> {
        match location {
            DatabaseLocation::File(path) => Self::open(path),
            DatabaseLocation::Memory => Self::open_in_memory(),
        }
    }

    /// Get a connection for one unit of work.
    pub fn connect(&self) -> Result<DbConn<'_>, DatabaseError> {
        match self.backend.as_ref() {
            Backend::File(path) => {
                let conn = Connection::open(path)?;
                configure_pragmas(&conn)?;
                Ok(DbConn::Owned(conn))
            }
            Backend::Memory(conn) => conn
                .lock()
                .map(DbConn::Shared)
                .map_err(|_| DatabaseError::LockPoisoned),
        }
    }
}

/// Open a SQLite connection to the given path and run migrations
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing)
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    Ok(())
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![(
        1,
        include_str!("../../resources/migrations/001_initial.sql"),
    )];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql).map_err(|e| DatabaseError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet)
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row(
        "SELECT MAX(version) FROM schema_version",
        [],
        |row| row.get::<_, i64>(0),
    )
    .unwrap_or(0)
}

/// Count tables in the database (for verification)
pub fn count_tables(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}
