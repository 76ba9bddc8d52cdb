/// Main entry point for the Habit Streaks server
///
/// This file sets up logging, parses command line arguments, and starts the
/// tool server. The server listens for JSON-RPC requests over stdin/stdout.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use habit_streaks::{DayPolicy, HabitTrackerServer, RecentWindow, TrackerConfig, DEFAULT_RECENT_DAYS};

/// Get the default database path with robust fallback strategy
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    // Try various locations in order of preference
    let potential_paths = [
        dirs::home_dir().map(|mut p| {
            p.push(".habit_streaks");
            p
        }),
        dirs::data_dir().map(|mut p| {
            p.push("habit_streaks");
            p
        }),
        dirs::config_dir().map(|mut p| {
            p.push("habit_streaks");
            p
        }),
        std::env::current_dir().ok().map(|mut p| {
            p.push(".habit_streaks");
            p
        }),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if let Ok(()) = std::fs::create_dir_all(potential_path) {
            // Make sure the directory is actually writable
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.join("habits.db"));
            }
        }
    }

    let mut temp_path = std::env::temp_dir();
    temp_path.push("habit_streaks");
    std::fs::create_dir_all(&temp_path)?;
    temp_path.push("habits.db");

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path)
}

/// Command line arguments for the Habit Streaks server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// Days of recent completions included with each habit (1 to 365)
    #[arg(long, default_value_t = i64::from(DEFAULT_RECENT_DAYS))]
    recent_days: i64,

    /// UTC offset that decides what "today" is, as +HH:MM or -HH:MM
    #[arg(long, default_value = "+00:00", allow_hyphen_values = true)]
    utc_offset: String,

    /// Trust cached streaks on reads instead of recomputing them
    #[arg(long)]
    no_refresh_on_read: bool,

    /// Open an older database as-is instead of migrating it
    #[arg(long)]
    no_migrate: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn tracker_config(&self) -> Result<TrackerConfig, habit_streaks::DomainError> {
        Ok(TrackerConfig {
            recent_window: RecentWindow::new(self.recent_days)?,
            day_policy: DayPolicy::from_offset_str(&self.utc_offset)?,
            refresh_on_read: !self.no_refresh_on_read,
            auto_migrate: !self.no_migrate,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("habit_streaks={}", log_level))
        .with_writer(std::io::stderr) // stdout carries JSON-RPC
        .init();

    info!("Starting Habit Streaks server");

    let config = args.tracker_config()?;
    info!(
        "Recent window {} days, reference day offset {}",
        config.recent_window.days(),
        config.day_policy.offset()
    );

    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let server = HabitTrackerServer::new(db_path, config).await?;
    server.run().await?;

    info!("Habit Streaks server shutdown complete");
    Ok(())
}
