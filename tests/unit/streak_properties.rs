/// Property tests for the streak engine
use habit_streaks::*;

#[cfg(test)]
mod streak_property_tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn days_ago(n: i64) -> NaiveDate {
        today() - Duration::days(n)
    }

    /// Reference implementation: walk day by day over the set
    fn naive_streaks(offsets: &[i64]) -> Streak {
        let set: std::collections::BTreeSet<NaiveDate> = offsets.iter().map(|&n| days_ago(n)).collect();

        let anchor = if set.contains(&today()) {
            Some(today())
        } else if set.contains(&days_ago(1)) {
            Some(days_ago(1))
        } else {
            None
        };
        let mut current = 0;
        if let Some(mut day) = anchor {
            while set.contains(&day) {
                current += 1;
                day -= Duration::days(1);
            }
        }

        let mut longest = 0;
        for &start in &set {
            if set.contains(&(start - Duration::days(1))) {
                continue;
            }
            let mut run = 0;
            let mut day = start;
            while set.contains(&day) {
                run += 1;
                day += Duration::days(1);
            }
            longest = longest.max(run);
        }

        Streak::new(current, longest)
    }

    #[test]
    fn test_reference_cases() {
        assert_eq!(compute_streaks(Vec::<NaiveDate>::new(), today()), Streak::new(0, 0));
        assert_eq!(compute_streaks([today()], today()), Streak::new(1, 1));
        assert_eq!(compute_streaks([days_ago(1)], today()), Streak::new(1, 1));
        assert_eq!(compute_streaks([days_ago(3)], today()), Streak::new(0, 1));

        let dates = [10, 9, 8, 2, 1, 0].map(days_ago);
        assert_eq!(compute_streaks(dates, today()), Streak::new(3, 3));
    }

    proptest! {
        #[test]
        fn prop_order_and_duplicates_do_not_matter(
            (offsets, shuffled) in prop::collection::vec(0i64..60, 0..40)
                .prop_flat_map(|offsets| (Just(offsets.clone()), Just(offsets).prop_shuffle())),
        ) {
            let dates: Vec<NaiveDate> = offsets.iter().map(|&n| days_ago(n)).collect();
            let shuffled: Vec<NaiveDate> = shuffled.iter().map(|&n| days_ago(n)).collect();
            let mut doubled = dates.clone();
            doubled.extend(dates.iter().copied());

            let expected = compute_streaks(dates, today());
            prop_assert_eq!(compute_streaks(shuffled, today()), expected);
            prop_assert_eq!(compute_streaks(doubled, today()), expected);
        }

        #[test]
        fn prop_matches_day_by_day_walk(offsets in prop::collection::vec(0i64..90, 0..50)) {
            let dates: Vec<NaiveDate> = offsets.iter().map(|&n| days_ago(n)).collect();
            prop_assert_eq!(compute_streaks(dates, today()), naive_streaks(&offsets));
        }

        #[test]
        fn prop_current_never_exceeds_longest(offsets in prop::collection::vec(0i64..30, 0..30)) {
            let streak = compute_streaks(offsets.iter().map(|&n| days_ago(n)), today());
            prop_assert!(streak.current_streak <= streak.longest_streak);
        }

        #[test]
        fn prop_history_cache_agrees_with_full_scan(
            toggles in prop::collection::vec((0i64..40, any::<bool>()), 0..60),
        ) {
            let mut history = CompletionHistory::new();
            let mut set = std::collections::BTreeSet::new();
            for (n, completed) in toggles {
                history.apply(days_ago(n), completed);
                if completed {
                    set.insert(days_ago(n));
                } else {
                    set.remove(&days_ago(n));
                }
            }

            prop_assert_eq!(history.streak(today()), compute_streaks(set, today()));
        }
    }
}
