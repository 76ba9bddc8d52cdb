/// Public library interface for the Habit Streaks server
///
/// This module exports the streak engine, the habit aggregator, the SQLite
/// store and the tool server, so they can be used by other applications or
/// tests.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

mod domain;
mod config;
mod storage;
mod aggregator;
mod tools;
pub mod mcp;

pub use domain::*;
pub use config::{parse_utc_offset, DayPolicy, TrackerConfig};
pub use storage::{HabitQuery, HabitStorage, SchemaCapabilities, SqliteStorage, StorageError};
pub use aggregator::*;
pub use tools::*;

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] StorageError),

    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Habit tracker server speaking the JSON-RPC tool protocol
///
/// Owns the aggregator over a SQLite store and the configuration that was
/// resolved at startup.
pub struct HabitTrackerServer {
    aggregator: HabitAggregator<SqliteStorage>,
    config: TrackerConfig,
}

impl HabitTrackerServer {
    /// Open (and, unless disabled, migrate) the database at `db_path`
    pub async fn new(db_path: PathBuf, config: TrackerConfig) -> Result<Self, ServerError> {
        tracing::info!("Initializing Habit Streaks server with database: {:?}", db_path);

        let storage = SqliteStorage::open(&db_path, config.auto_migrate)?;
        Ok(Self::with_storage(storage, config))
    }

    /// Build a server over an already opened store
    pub fn with_storage(storage: SqliteStorage, config: TrackerConfig) -> Self {
        let capabilities = storage.capabilities();
        if !capabilities.category_and_archive {
            tracing::warn!(
                "Database schema v{} has no category/archive columns; those features are disabled",
                capabilities.version
            );
        }

        Self {
            aggregator: HabitAggregator::new(storage, &config),
            config,
        }
    }

    /// Run the server, handling JSON-RPC requests over stdin/stdout
    ///
    /// Returns when stdin is closed.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting tool server...");

        let habits = self.aggregator.storage().list_habits(&HabitQuery::default())?;
        tracing::info!("Server started successfully, found {} existing habits", habits.len());

        let mut mcp_server = mcp::McpServer::new(self);
        mcp_server.run().await?;

        Ok(())
    }

    pub fn aggregator(&self) -> &HabitAggregator<SqliteStorage> {
        &self.aggregator
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Today's calendar day under the configured day policy
    ///
    /// Reads the wall clock; call once per logical operation.
    pub fn today(&self) -> NaiveDate {
        self.config.day_policy.today()
    }
}
