/// End-to-end aggregator workflows against an on-disk database
use habit_streaks::*;
use tempfile::TempDir;

#[cfg(test)]
mod aggregator_workflow_tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use std::sync::Arc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn days_ago(n: i64) -> NaiveDate {
        today() - Duration::days(n)
    }

    fn setup() -> (TempDir, HabitAggregator<SqliteStorage>) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let storage = SqliteStorage::new(temp_dir.path().join("habits.db")).expect("Failed to open storage");
        (temp_dir, HabitAggregator::new(storage, &TrackerConfig::default()))
    }

    #[test]
    fn test_repeated_toggle_is_idempotent() {
        let (_dir, aggregator) = setup();
        let habit = aggregator.create_habit("Meditate".to_string(), None, None).unwrap();

        aggregator.toggle(&habit.id, days_ago(1), true, today()).unwrap();
        let first = aggregator.toggle(&habit.id, today(), true, today()).unwrap();
        let second = aggregator.toggle(&habit.id, today(), true, today()).unwrap();

        assert_eq!(first.streak, second.streak);
        assert_eq!(first.record.created_at, second.record.created_at);
        assert!(second.record.updated_at >= first.record.updated_at);

        let (start, end) = RecentWindow::new(1).unwrap().bounds(today());
        let records = aggregator
            .storage()
            .fetch_recent_completions(&habit.id, start, end)
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_gap_breaks_current_but_not_longest() {
        let (_dir, aggregator) = setup();
        let habit = aggregator.create_habit("Journal".to_string(), None, None).unwrap();

        for n in [10, 9, 8, 2, 1, 0] {
            aggregator.toggle(&habit.id, days_ago(n), true, today()).unwrap();
        }
        let view = aggregator.view(&habit.id, today(), None).unwrap();
        assert_eq!(view.habit.cached_streak(), Streak::new(3, 3));

        let toggled = aggregator.toggle(&habit.id, days_ago(1), false, today()).unwrap();
        assert_eq!(toggled.streak, Streak::new(1, 3));

        // Unmarked rows stay in the window with completed = false
        let view = aggregator.view(&habit.id, today(), None).unwrap();
        assert!(view
            .recent_completions
            .iter()
            .any(|record| record.date == days_ago(1) && !record.completed));
    }

    #[test]
    fn test_unknown_habit_is_not_found() {
        let (_dir, aggregator) = setup();
        let missing = HabitId::new();

        assert!(matches!(
            aggregator.toggle(&missing, today(), true, today()),
            Err(TrackerError::NotFound { .. })
        ));
        assert!(matches!(aggregator.recompute(&missing, today()), Err(TrackerError::NotFound { .. })));
        assert!(matches!(aggregator.view(&missing, today(), None), Err(TrackerError::NotFound { .. })));
    }

    #[test]
    fn test_filter_then_sort_equals_sort_then_filter() {
        let (_dir, aggregator) = setup();
        let specs = [("Run", vec![0, 1, 2]), ("Read", vec![1, 2]), ("Walk", vec![1]), ("Swim", vec![]), ("Yoga", vec![0])];
        for (title, days) in specs {
            let habit = aggregator.create_habit(title.to_string(), None, None).unwrap();
            for n in days {
                aggregator.toggle(&habit.id, days_ago(n), true, today()).unwrap();
            }
        }

        let not_done = FilterSpec::parse([("completed_today", "false")]).unwrap();
        let by_streak = SortSpec::parse("current_streak", Some("desc")).unwrap();
        let all = aggregator.list(&FilterSpec::default(), None, today(), None).unwrap();

        let filtered_then_sorted = apply_sort(apply_filters(all.clone(), &not_done, today()).unwrap(), &by_streak);
        let sorted_then_filtered = apply_filters(apply_sort(all, &by_streak), &not_done, today()).unwrap();
        assert_eq!(filtered_then_sorted, sorted_then_filtered);

        let titles: Vec<&str> = filtered_then_sorted.iter().map(|v| v.habit.title.as_str()).collect();
        assert_eq!(titles, vec!["Read", "Walk", "Swim"]);

        let listed = aggregator.list(&not_done, Some(&by_streak), today(), None).unwrap();
        assert_eq!(listed, filtered_then_sorted);
    }

    #[test]
    fn test_reads_refresh_after_days_pass() {
        let (_dir, aggregator) = setup();
        let habit = aggregator.create_habit("Stretch".to_string(), None, None).unwrap();
        for n in 0..4 {
            aggregator.toggle(&habit.id, days_ago(n), true, today()).unwrap();
        }

        // One day later the grace day keeps the streak alive
        let tomorrow = today() + Duration::days(1);
        let view = aggregator.view(&habit.id, tomorrow, None).unwrap();
        assert_eq!(view.habit.cached_streak(), Streak::new(4, 4));

        // Two days later it is broken, and the listing persists the repair
        let later = today() + Duration::days(2);
        let listed = aggregator.list(&FilterSpec::default(), None, later, None).unwrap();
        assert_eq!(listed[0].habit.cached_streak(), Streak::new(0, 4));
        assert_eq!(
            aggregator.storage().get_habit(&habit.id).unwrap().cached_streak(),
            Streak::new(0, 4)
        );
    }

    #[test]
    fn test_concurrent_toggles_keep_cache_consistent() {
        let (_dir, aggregator) = setup();
        let aggregator = Arc::new(aggregator);
        let habit = aggregator.create_habit("Water".to_string(), None, None).unwrap();

        std::thread::scope(|scope| {
            for worker in 0..4_i64 {
                let aggregator = Arc::clone(&aggregator);
                let habit_id = habit.id.clone();
                scope.spawn(move || {
                    for n in (worker..30).step_by(4) {
                        aggregator.toggle(&habit_id, days_ago(n), true, today()).unwrap();
                    }
                });
            }
        });

        let check = aggregator.verify(&habit.id, today()).unwrap();
        assert!(check.was_consistent());
        assert_eq!(check.streak, Streak::new(30, 30));
    }
}
