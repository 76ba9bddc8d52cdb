/// Database migration management
///
/// This module handles creating and updating the SQLite database schema.
/// The schema is versioned explicitly; optional columns are never probed at
/// query time. Instead the version found (or reached) when the database is
/// opened is turned into a [`SchemaCapabilities`] value that the store
/// carries for its whole lifetime.

use rusqlite::{Connection, OptionalExtension};
use crate::storage::StorageError;

/// Current database schema version
///
/// Increment this when you add new migrations
pub const CURRENT_VERSION: i32 = 2;

/// Optional schema features available on an opened database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaCapabilities {
    /// Schema version the database is at
    pub version: i32,
    /// `habits.category` and `habits.archived` exist (added in v2)
    pub category_and_archive: bool,
}

impl SchemaCapabilities {
    pub fn for_version(version: i32) -> Self {
        Self {
            version,
            category_and_archive: version >= 2,
        }
    }
}

/// Initialize the database schema
///
/// With `auto_migrate` the schema is brought to [`CURRENT_VERSION`].
/// Without it an existing database is used as found, and a fresh one is
/// refused because it has no tables at all.
pub fn initialize_database(
    conn: &Connection,
    auto_migrate: bool,
) -> Result<SchemaCapabilities, StorageError> {
    // Create version tracking table first
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let current_version = get_current_version(conn)?;

    if current_version > CURRENT_VERSION {
        return Err(StorageError::Migration(format!(
            "database schema v{} is newer than supported v{}",
            current_version, CURRENT_VERSION
        )));
    }

    if current_version == CURRENT_VERSION {
        return Ok(SchemaCapabilities::for_version(current_version));
    }

    if !auto_migrate {
        if current_version == 0 {
            return Err(StorageError::Migration(
                "database is not initialized and migrations are disabled".to_string()
            ));
        }
        tracing::warn!(
            "Database schema is at v{} (latest v{}); migrations disabled, optional columns unavailable",
            current_version,
            CURRENT_VERSION
        );
        return Ok(SchemaCapabilities::for_version(current_version));
    }

    run_migrations(conn, current_version, CURRENT_VERSION)?;
    Ok(SchemaCapabilities::for_version(CURRENT_VERSION))
}

/// Get the current database schema version
fn get_current_version(conn: &Connection) -> Result<i32, StorageError> {
    let version = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get::<_, i32>(0)
        })
        .optional()?;

    // No version record means a fresh database
    Ok(version.unwrap_or(0))
}

/// Set the database schema version
fn set_version(conn: &Connection, version: i32) -> Result<(), StorageError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Run migrations `from_version + 1 ..= to_version` in one transaction
fn run_migrations(conn: &Connection, from_version: i32, to_version: i32) -> Result<(), StorageError> {
    let tx = conn.unchecked_transaction()?;

    if from_version < 1 && to_version >= 1 {
        migration_v1(&tx)?;
    }

    if from_version < 2 && to_version >= 2 {
        migration_v2(&tx)?;
    }

    set_version(&tx, to_version)?;
    tx.commit()?;

    tracing::info!("Migrated database schema from v{} to v{}", from_version, to_version);
    Ok(())
}

/// Migration to version 1: habits and their per-day completion records
fn migration_v1(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS habits (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            created_at TEXT NOT NULL,
            current_streak INTEGER NOT NULL DEFAULT 0,
            longest_streak INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS completions (
            habit_id TEXT NOT NULL,
            date TEXT NOT NULL,
            completed BOOLEAN NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (habit_id, date),
            FOREIGN KEY (habit_id) REFERENCES habits (id) ON DELETE CASCADE
        );

        -- Completed-date scans for streak recomputation
        CREATE INDEX IF NOT EXISTS idx_completions_habit_completed
            ON completions (habit_id, completed, date);",
    )?;

    tracing::info!("Applied migration v1: habits and completions");
    Ok(())
}

/// Migration to version 2: category and archive metadata
fn migration_v2(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "ALTER TABLE habits ADD COLUMN category TEXT;
        ALTER TABLE habits ADD COLUMN archived BOOLEAN NOT NULL DEFAULT FALSE;

        CREATE INDEX IF NOT EXISTS idx_habits_category ON habits (category);
        CREATE INDEX IF NOT EXISTS idx_habits_archived ON habits (archived);",
    )?;

    tracing::info!("Applied migration v2: habit category and archived columns");
    Ok(())
}
