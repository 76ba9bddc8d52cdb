/// Basic unit tests to verify core functionality
use habit_streaks::*;

#[cfg(test)]
mod basic_unit_tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn test_habit_creation() {
        let habit = Habit::new(
            "Test Habit".to_string(),
            Some("A test habit".to_string()),
            Some(Category::Health),
        )
        .unwrap();

        assert_eq!(habit.title, "Test Habit");
        assert_eq!(habit.cached_streak(), Streak::default());
        assert!(!habit.archived);
    }

    #[test]
    fn test_habit_title_limits() {
        assert!(Habit::new("".to_string(), None, None).is_err());
        assert!(Habit::new("x".repeat(101), None, None).is_err());
        assert!(Habit::new("x".repeat(100), None, None).is_ok());
        assert!(Habit::new("Ok".to_string(), Some("d".repeat(501)), None).is_err());
    }

    #[test]
    fn test_category_keys() {
        for key in ["health", "productivity", "social", "creative", "mindfulness", "financial", "household", "personal"] {
            let category: Category = key.parse().unwrap();
            assert_eq!(category.key(), key);
        }
        let custom: Category = "Custom:Language Study".parse().unwrap();
        assert_eq!(custom, Category::Custom("Language Study".to_string()));
        assert_eq!(custom.key(), "custom:Language Study");
        assert!("custom:".parse::<Category>().is_err());
    }

    #[test]
    fn test_calendar_dates_are_canonical() {
        assert_eq!(
            parse_calendar_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_calendar_date("2023-02-29").is_err());
        assert!(parse_calendar_date("2024-2-9").is_err());
        assert!(parse_calendar_date("29/02/2024").is_err());
    }

    #[test]
    fn test_day_policy_decides_today() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 1, 22, 30, 0).unwrap();

        assert_eq!(DayPolicy::utc().day_of(instant), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let tokyo = DayPolicy::from_offset_str("+09:00").unwrap();
        assert_eq!(tokyo.day_of(instant), NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
        let honolulu = DayPolicy::from_offset_str("-10:00").unwrap();
        assert_eq!(honolulu.day_of(instant), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }

    #[test]
    fn test_filter_and_sort_specs_parse() {
        assert!(FilterSpec::parse([("category", "health"), ("archived", "false")]).is_ok());
        assert!(matches!(
            FilterSpec::parse([("frequency", "daily")]),
            Err(DomainError::UnknownFilterKey(_))
        ));

        let spec = SortSpec::parse("created_at", Some("DESC")).unwrap();
        assert_eq!(spec, SortSpec::new(SortKey::CreatedAt, SortOrder::Descending));
        assert!(matches!(SortSpec::parse("name", None), Err(DomainError::UnknownSortKey(_))));
    }

    #[test]
    fn test_storage_creation() {
        let storage = SqliteStorage::open_in_memory().expect("Failed to create storage");
        assert_eq!(storage.capabilities(), SchemaCapabilities::for_version(2));
    }
}
