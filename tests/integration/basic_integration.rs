/// Basic integration tests
use habit_streaks::*;
use tempfile::NamedTempFile;

#[cfg(test)]
mod basic_integration_tests {
    use super::*;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[tokio::test]
    async fn test_server_opens_fresh_database() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let server = HabitTrackerServer::new(temp_file.path().to_path_buf(), TrackerConfig::default())
            .await
            .expect("Failed to create server");

        let capabilities = server.aggregator().storage().capabilities();
        assert_eq!(capabilities.version, 2);
        assert!(capabilities.category_and_archive);
        assert_eq!(server.config().recent_window.days(), 14);
    }

    #[tokio::test]
    async fn test_database_persistence() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_path_buf();

        let habit_id = {
            let server = HabitTrackerServer::new(db_path.clone(), TrackerConfig::default())
                .await
                .expect("Failed to create first server");
            let aggregator = server.aggregator();
            let habit = aggregator
                .create_habit("Morning Run".to_string(), None, Some(Category::Health))
                .unwrap();
            aggregator.toggle(&habit.id, today(), true, today()).unwrap();
            habit.id
        };

        let server = HabitTrackerServer::new(db_path, TrackerConfig::default())
            .await
            .expect("Failed to create second server");
        let view = server.aggregator().view(&habit_id, today(), None).unwrap();

        assert_eq!(view.habit.title, "Morning Run");
        assert_eq!(view.habit.cached_streak(), Streak::new(1, 1));
        assert!(view.completed_on(today()).unwrap());
    }

    #[test]
    fn test_storage_interface() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path().to_path_buf())
            .expect("Failed to create storage");

        let _: &dyn HabitStorage = &storage;
        assert!(storage.list_habits(&HabitQuery::default()).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_migrate_leaves_v1_database() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        {
            let conn = rusqlite::Connection::open(temp_file.path()).unwrap();
            conn.execute_batch(
                "CREATE TABLE schema_version (version INTEGER NOT NULL);
                 INSERT INTO schema_version (version) VALUES (1);
                 CREATE TABLE habits (
                     id TEXT PRIMARY KEY,
                     title TEXT NOT NULL,
                     description TEXT,
                     created_at TEXT NOT NULL,
                     current_streak INTEGER NOT NULL DEFAULT 0,
                     longest_streak INTEGER NOT NULL DEFAULT 0
                 );
                 CREATE TABLE completions (
                     habit_id TEXT NOT NULL,
                     date TEXT NOT NULL,
                     completed BOOLEAN NOT NULL,
                     created_at TEXT NOT NULL,
                     updated_at TEXT NOT NULL,
                     PRIMARY KEY (habit_id, date),
                     FOREIGN KEY (habit_id) REFERENCES habits (id) ON DELETE CASCADE
                 );",
            )
            .unwrap();
        }

        let config = TrackerConfig {
            auto_migrate: false,
            ..TrackerConfig::default()
        };
        let server = HabitTrackerServer::new(temp_file.path().to_path_buf(), config)
            .await
            .expect("Failed to open v1 database");
        let aggregator = server.aggregator();
        assert!(!aggregator.storage().capabilities().category_and_archive);

        // Core streak features still work on the old schema
        let habit = aggregator.create_habit("Read".to_string(), None, None).unwrap();
        let toggled = aggregator.toggle(&habit.id, today(), true, today()).unwrap();
        assert_eq!(toggled.streak, Streak::new(1, 1));

        let with_category = aggregator.create_habit("Run".to_string(), None, Some(Category::Health));
        assert!(matches!(
            with_category,
            Err(TrackerError::InvalidInput(DomainError::Unsupported(_)))
        ));

        let archived_filter = FilterSpec::parse([("archived", "false")]).unwrap();
        assert!(matches!(
            aggregator.list(&archived_filter, None, today(), None),
            Err(TrackerError::InvalidInput(DomainError::Unsupported(_)))
        ));

        // Reopening with migrations enabled upgrades in place
        drop(server);
        let server = HabitTrackerServer::new(temp_file.path().to_path_buf(), TrackerConfig::default())
            .await
            .expect("Failed to migrate v1 database");
        assert!(server.aggregator().storage().capabilities().category_and_archive);
        let view = server.aggregator().view(&habit.id, today(), None).unwrap();
        assert!(!view.habit.archived);
        assert_eq!(view.habit.category, None);
    }
}
