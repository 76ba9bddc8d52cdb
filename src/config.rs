/// Process-wide configuration resolved once at startup
///
/// Everything the tracker needs to know about its environment is parsed here
/// and handed to the aggregator and server explicitly. Nothing below this
/// layer reads flags, environment variables or the wall clock on its own,
/// except [`DayPolicy::today`], which request handlers call exactly once per
/// logical operation.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use crate::aggregator::RecentWindow;
use crate::domain::DomainError;

/// Resolves the reference day ("today") in one fixed timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayPolicy {
    offset: FixedOffset,
}

impl DayPolicy {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Reference day pinned to UTC
    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Parse a `±HH:MM` offset (or `Z` / `UTC`) into a policy
    pub fn from_offset_str(input: &str) -> Result<Self, DomainError> {
        parse_utc_offset(input).map(Self::new)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The calendar day an instant falls on under this policy
    pub fn day_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Read the wall clock once and return today's calendar day
    pub fn today(&self) -> NaiveDate {
        self.day_of(Utc::now())
    }
}

impl Default for DayPolicy {
    fn default() -> Self {
        Self::utc()
    }
}

/// Runtime configuration for the tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// How many days of recent completions each habit view carries
    pub recent_window: RecentWindow,
    /// Timezone used to decide what "today" is
    pub day_policy: DayPolicy,
    /// Recompute streaks when reading a habit and overwrite a stale cache
    pub refresh_on_read: bool,
    /// Bring the database schema up to date when opening it
    pub auto_migrate: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            recent_window: RecentWindow::default(),
            day_policy: DayPolicy::default(),
            refresh_on_read: true,
            auto_migrate: true,
        }
    }
}

/// Parse `+HH:MM`, `-HH:MM`, `Z` or `UTC`
pub fn parse_utc_offset(input: &str) -> Result<FixedOffset, DomainError> {
    let invalid = || DomainError::Validation {
        message: format!("'{}' is not a UTC offset like +02:00 or -05:30", input),
    };

    let trimmed = input.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }

    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'+') => (1, &trimmed[1..]),
        Some(b'-') => (-1, &trimmed[1..]),
        _ => return Err(invalid()),
    };

    let (hours, minutes) = rest.split_once(':').ok_or_else(invalid)?;
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return Err(invalid());
    }
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 14 || minutes > 59 {
        return Err(invalid());
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}
