/// Post-hoc filters over habit views
///
/// Category and archive filters are plain equality checks on static
/// metadata. The completed-today filter depends on derived state and looks
/// only at each view's recent window. All active filters are ANDed.

use chrono::NaiveDate;

use crate::aggregator::HabitView;
use crate::domain::{Category, DomainError};
use crate::storage::HabitQuery;

/// Which habits to keep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub category: Option<Category>,
    pub archived: Option<bool>,
    pub completed_today: Option<bool>,
}

impl FilterSpec {
    /// Build a filter from `key=value` pairs
    ///
    /// Recognised keys are `category`, `archived` and `completed_today`.
    pub fn parse<'a, I>(pairs: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut spec = Self::default();

        for (key, value) in pairs {
            match key.trim() {
                "category" => spec.category = Some(value.parse::<Category>()?),
                "archived" => spec.archived = Some(parse_flag(key, value)?),
                "completed_today" => spec.completed_today = Some(parse_flag(key, value)?),
                other => return Err(DomainError::UnknownFilterKey(other.to_string())),
            }
        }

        Ok(spec)
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.archived.is_none() && self.completed_today.is_none()
    }

    /// The part of this filter the store can evaluate on its own
    pub fn storage_query(&self) -> HabitQuery {
        HabitQuery {
            category: self.category.clone(),
            archived: self.archived,
        }
    }

    /// Whether a view passes every active filter
    pub fn matches(&self, view: &HabitView, today: NaiveDate) -> Result<bool, DomainError> {
        if let Some(category) = &self.category {
            if view.habit.category.as_ref() != Some(category) {
                return Ok(false);
            }
        }

        if let Some(archived) = self.archived {
            if view.habit.archived != archived {
                return Ok(false);
            }
        }

        if let Some(wanted) = self.completed_today {
            if view.completed_on(today)? != wanted {
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// Keep the views that pass `spec`, preserving their order
pub fn apply_filters(
    views: Vec<HabitView>,
    spec: &FilterSpec,
    today: NaiveDate,
) -> Result<Vec<HabitView>, DomainError> {
    if spec.is_empty() {
        return Ok(views);
    }

    let mut kept = Vec::with_capacity(views.len());
    for view in views {
        if spec.matches(&view, today)? {
            kept.push(view);
        }
    }
    Ok(kept)
}

fn parse_flag(key: &str, value: &str) -> Result<bool, DomainError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(DomainError::Validation {
            message: format!("'{}' expects true or false, got '{}'", key, value),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::RecentWindow;
    use crate::domain::{CompletionRecord, Habit};
    use chrono::Utc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn view(title: &str, category: Option<Category>, archived: bool, done_today: bool) -> HabitView {
        let mut habit = Habit::new(title.to_string(), None, category).unwrap();
        habit.archived = archived;
        let records = if done_today {
            vec![CompletionRecord::from_existing(habit.id.clone(), today(), true, Utc::now(), Utc::now())]
        } else {
            vec![]
        };
        let (start, end) = RecentWindow::default().bounds(today());
        HabitView::new(habit, start, end, records)
    }

    fn titles(views: &[HabitView]) -> Vec<&str> {
        views.iter().map(|v| v.habit.title.as_str()).collect()
    }

    #[test]
    fn test_parse_filter_pairs() {
        let spec = FilterSpec::parse([("category", "health"), ("completed_today", "false")]).unwrap();
        assert_eq!(spec.category, Some(Category::Health));
        assert_eq!(spec.completed_today, Some(false));
        assert_eq!(spec.archived, None);
    }

    #[test]
    fn test_parse_rejects_unknown_key_and_value() {
        assert!(matches!(
            FilterSpec::parse([("colour", "red")]),
            Err(DomainError::UnknownFilterKey(_))
        ));
        assert!(FilterSpec::parse([("archived", "maybe")]).is_err());
        assert!(FilterSpec::parse([("category", "sports")]).is_err());
    }

    #[test]
    fn test_filters_are_anded() {
        let views = vec![
            view("Run", Some(Category::Health), false, true),
            view("Swim", Some(Category::Health), true, true),
            view("Lift", Some(Category::Health), false, false),
            view("Read", Some(Category::Productivity), false, true),
        ];

        let spec = FilterSpec {
            category: Some(Category::Health),
            archived: Some(false),
            completed_today: Some(true),
        };
        let kept = apply_filters(views, &spec, today()).unwrap();
        assert_eq!(titles(&kept), vec!["Run"]);
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let views = vec![view("A", None, true, false), view("B", None, false, true)];
        let kept = apply_filters(views, &FilterSpec::default(), today()).unwrap();
        assert_eq!(titles(&kept), vec!["A", "B"]);
    }

    #[test]
    fn test_completed_today_needs_window_covering_today() {
        let mut stale = view("Run", None, false, true);
        stale.window_end = today().pred_opt().unwrap();

        let spec = FilterSpec {
            completed_today: Some(true),
            ..FilterSpec::default()
        };
        assert!(matches!(
            apply_filters(vec![stale], &spec, today()),
            Err(DomainError::InvalidWindow(_))
        ));
    }
}
