/// SQLite implementation of the habit storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// habits and completion records. It handles all SQL queries and row
/// conversion.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql};

use crate::domain::{Category, CompletionRecord, Habit, HabitId, Streak};
use crate::storage::{migrations, HabitQuery, HabitStorage, SchemaCapabilities, StorageError};

const HABIT_COLUMNS_V1: &str =
    "id, title, description, created_at, current_streak, longest_streak";
const HABIT_COLUMNS_V2: &str =
    "id, title, description, created_at, current_streak, longest_streak, category, archived";
const COMPLETION_COLUMNS: &str = "habit_id, date, completed, created_at, updated_at";

/// SQLite-based storage implementation
///
/// The connection sits behind a mutex so one store can be shared between
/// threads. Each method holds the lock for its whole statement sequence.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
    capabilities: SchemaCapabilities,
}

impl SqliteStorage {
    /// Open (and migrate) the database at `db_path`
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        Self::open(&db_path, true)
    }

    /// Open the database at `db_path`, migrating only when asked to
    pub fn open(db_path: &Path, auto_migrate: bool) -> Result<Self, StorageError> {
        let conn = Connection::open(db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        let storage = Self::from_connection(conn, auto_migrate)?;
        tracing::info!(
            "SQLite storage initialized at {:?} (schema v{})",
            db_path,
            storage.capabilities.version
        );
        Ok(storage)
    }

    /// Fresh, fully migrated in-memory database
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;
        Self::from_connection(conn, true)
    }

    fn from_connection(conn: Connection, auto_migrate: bool) -> Result<Self, StorageError> {
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        let capabilities = migrations::initialize_database(&conn, auto_migrate)?;

        Ok(Self {
            conn: Mutex::new(conn),
            capabilities,
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Connection("database lock poisoned".to_string()))
    }

    fn habit_columns(&self) -> &'static str {
        if self.capabilities.category_and_archive {
            HABIT_COLUMNS_V2
        } else {
            HABIT_COLUMNS_V1
        }
    }

    /// Refuse metadata the schema has no columns for
    fn check_optional_metadata(&self, habit: &Habit) -> Result<(), StorageError> {
        if !self.capabilities.category_and_archive && (habit.category.is_some() || habit.archived) {
            return Err(StorageError::Unsupported(format!(
                "schema v{} has no category/archived columns",
                self.capabilities.version
            )));
        }
        Ok(())
    }

    fn habit_from_row(row: &Row<'_>, with_optional: bool) -> rusqlite::Result<Habit> {
        let id_str: String = row.get(0)?;
        let id = HabitId::from_string(&id_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

        let (category, archived) = if with_optional {
            let category = row
                .get::<_, Option<String>>(6)?
                .map(|key| key.parse::<Category>())
                .transpose()
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;
            (category, row.get(7)?)
        } else {
            (None, false)
        };

        Ok(Habit::from_existing(
            id,
            row.get(1)?, // title
            row.get(2)?, // description
            category,
            archived,
            row.get(3)?, // created_at
            row.get(4)?, // current_streak
            row.get(5)?, // longest_streak
        ))
    }

    fn completion_from_row(row: &Row<'_>) -> rusqlite::Result<CompletionRecord> {
        let habit_id_str: String = row.get(0)?;
        let habit_id = HabitId::from_string(&habit_id_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

        Ok(CompletionRecord::from_existing(
            habit_id,
            row.get(1)?, // date
            row.get(2)?, // completed
            row.get(3)?, // created_at
            row.get(4)?, // updated_at
        ))
    }
}

impl HabitStorage for SqliteStorage {
    fn capabilities(&self) -> SchemaCapabilities {
        self.capabilities
    }

    /// Create a new habit in the database
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        self.check_optional_metadata(habit)?;
        let conn = self.conn()?;

        if self.capabilities.category_and_archive {
            conn.execute(
                "INSERT INTO habits (
                    id, title, description, created_at, current_streak, longest_streak,
                    category, archived
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    habit.id.to_string(),
                    habit.title,
                    habit.description,
                    habit.created_at,
                    habit.current_streak,
                    habit.longest_streak,
                    habit.category.as_ref().map(Category::key),
                    habit.archived
                ],
            )?;
        } else {
            conn.execute(
                "INSERT INTO habits (
                    id, title, description, created_at, current_streak, longest_streak
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    habit.id.to_string(),
                    habit.title,
                    habit.description,
                    habit.created_at,
                    habit.current_streak,
                    habit.longest_streak
                ],
            )?;
        }

        tracing::debug!("Created habit: {} ({})", habit.title, habit.id);
        Ok(())
    }

    /// Get a habit by its ID
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError> {
        let conn = self.conn()?;
        let with_optional = self.capabilities.category_and_archive;

        let habit = conn
            .query_row(
                &format!("SELECT {} FROM habits WHERE id = ?1", self.habit_columns()),
                params![habit_id.to_string()],
                |row| Self::habit_from_row(row, with_optional),
            )
            .optional()?;

        habit.ok_or_else(|| StorageError::HabitNotFound {
            habit_id: habit_id.to_string(),
        })
    }

    /// Update an existing habit's metadata
    fn update_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        self.check_optional_metadata(habit)?;
        let conn = self.conn()?;

        let rows_affected = if self.capabilities.category_and_archive {
            conn.execute(
                "UPDATE habits SET
                    title = ?2,
                    description = ?3,
                    category = ?4,
                    archived = ?5
                 WHERE id = ?1",
                params![
                    habit.id.to_string(),
                    habit.title,
                    habit.description,
                    habit.category.as_ref().map(Category::key),
                    habit.archived
                ],
            )?
        } else {
            conn.execute(
                "UPDATE habits SET title = ?2, description = ?3 WHERE id = ?1",
                params![habit.id.to_string(), habit.title, habit.description],
            )?
        };

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit.id.to_string(),
            });
        }

        tracing::debug!("Updated habit: {} ({})", habit.title, habit.id);
        Ok(())
    }

    /// List habits with optional static filtering
    fn list_habits(&self, query: &HabitQuery) -> Result<Vec<Habit>, StorageError> {
        if query.uses_optional_columns() && !self.capabilities.category_and_archive {
            return Err(StorageError::Unsupported(format!(
                "schema v{} cannot filter by category or archived",
                self.capabilities.version
            )));
        }

        let mut clauses = Vec::new();
        let mut args: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(category) = &query.category {
            args.push(Box::new(category.key()));
            clauses.push(format!("category = ?{}", args.len()));
        }
        if let Some(archived) = query.archived {
            args.push(Box::new(archived));
            clauses.push(format!("archived = ?{}", args.len()));
        }

        let mut sql = format!("SELECT {} FROM habits", self.habit_columns());
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at ASC");

        let conn = self.conn()?;
        let with_optional = self.capabilities.category_and_archive;
        let mut stmt = conn.prepare(&sql)?;
        let habit_iter = stmt.query_map(params_from_iter(args.iter()), |row| {
            Self::habit_from_row(row, with_optional)
        })?;

        let mut habits = Vec::new();
        for habit in habit_iter {
            habits.push(habit?);
        }

        Ok(habits)
    }

    fn fetch_completed_dates(&self, habit_id: &HabitId) -> Result<BTreeSet<NaiveDate>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT date FROM completions WHERE habit_id = ?1 AND completed = TRUE"
        )?;

        let date_iter = stmt.query_map(params![habit_id.to_string()], |row| row.get::<_, NaiveDate>(0))?;

        let mut dates = BTreeSet::new();
        for date in date_iter {
            dates.insert(date?);
        }

        Ok(dates)
    }

    fn upsert_completion(
        &self,
        habit_id: &HabitId,
        date: NaiveDate,
        completed: bool,
    ) -> Result<CompletionRecord, StorageError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let exists = tx
            .query_row(
                "SELECT 1 FROM habits WHERE id = ?1",
                params![habit_id.to_string()],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !exists {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tx.execute(
            "INSERT INTO completions (habit_id, date, completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT (habit_id, date) DO UPDATE SET
                completed = excluded.completed,
                updated_at = excluded.updated_at",
            params![habit_id.to_string(), date, completed, Utc::now()],
        )?;

        let record = tx.query_row(
            &format!(
                "SELECT {} FROM completions WHERE habit_id = ?1 AND date = ?2",
                COMPLETION_COLUMNS
            ),
            params![habit_id.to_string(), date],
            Self::completion_from_row,
        )?;

        tx.commit()?;

        tracing::debug!("Upserted completion for habit {} on {}: {}", habit_id, date, completed);
        Ok(record)
    }

    fn persist_streaks(&self, habit_id: &HabitId, streak: Streak) -> Result<(), StorageError> {
        let conn = self.conn()?;
        let rows_affected = conn.execute(
            "UPDATE habits SET current_streak = ?2, longest_streak = ?3 WHERE id = ?1",
            params![habit_id.to_string(), streak.current_streak, streak.longest_streak],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tracing::debug!(
            "Persisted streaks for habit {}: current {}, longest {}",
            habit_id,
            streak.current_streak,
            streak.longest_streak
        );
        Ok(())
    }

    fn fetch_recent_completions(
        &self,
        habit_id: &HabitId,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<CompletionRecord>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM completions
             WHERE habit_id = ?1 AND date BETWEEN ?2 AND ?3
             ORDER BY date DESC",
            COMPLETION_COLUMNS
        ))?;

        let record_iter = stmt.query_map(
            params![habit_id.to_string(), window_start, window_end],
            Self::completion_from_row,
        )?;

        let mut records = Vec::new();
        for record in record_iter {
            records.push(record?);
        }

        Ok(records)
    }
}
