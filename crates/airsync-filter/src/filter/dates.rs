//! Date range resolution for relative and absolute date filters.
//!
//! A date filter is turned into a `(start, end)` pair of calendar dates computed
//! from an anchor date ("today", as seen by the caller). The compiler only emits
//! strict `IS_AFTER` / `IS_BEFORE` comparisons against these boundaries, so
//! windowed modes pad their boundaries one day outwards.
//!
//! # Example
//!
//! ```
//! use airsync_filter::filter::{DateFilter, DateMode, DateResolver};
//! use chrono::NaiveDate;
//!
//! let anchor = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
//! let range = DateResolver::default()
//!     .resolve(&DateFilter::new(DateMode::PastWeek), anchor)
//!     .unwrap();
//! assert_eq!(range.start.to_string(), "2024-03-03");
//! assert_eq!(range.end.to_string(), "2024-03-11");
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use strsim::levenshtein;

use super::error::{FilterError, FilterResult};

/// Maximum Levenshtein distance to suggest a mode name.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Supported date modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateMode {
    // ==================== Single day ====================
    Today,
    Tomorrow,
    Yesterday,
    OneWeekAgo,
    OneWeekFromNow,
    OneMonthAgo,
    OneMonthFromNow,
    DaysAgo,
    DaysFromNow,
    ExactDate,

    // ==================== Trailing windows ====================
    PastWeek,
    PastMonth,
    PastYear,
    PastNumberOfDays,

    // ==================== Leading windows ====================
    NextWeek,
    NextMonth,
    NextYear,
    NextNumberOfDays,

    // ==================== Calendar units ====================
    CalendarWeek,
    CalendarMonth,
    CalendarYear,
}

impl DateMode {
    /// Every supported mode.
    pub const ALL: [DateMode; 21] = [
        DateMode::Today,
        DateMode::Tomorrow,
        DateMode::Yesterday,
        DateMode::OneWeekAgo,
        DateMode::OneWeekFromNow,
        DateMode::OneMonthAgo,
        DateMode::OneMonthFromNow,
        DateMode::DaysAgo,
        DateMode::DaysFromNow,
        DateMode::ExactDate,
        DateMode::PastWeek,
        DateMode::PastMonth,
        DateMode::PastYear,
        DateMode::PastNumberOfDays,
        DateMode::NextWeek,
        DateMode::NextMonth,
        DateMode::NextYear,
        DateMode::NextNumberOfDays,
        DateMode::CalendarWeek,
        DateMode::CalendarMonth,
        DateMode::CalendarYear,
    ];

    /// The mode name used in the UI payload.
    pub fn name(self) -> &'static str {
        match self {
            DateMode::Today => "today",
            DateMode::Tomorrow => "tomorrow",
            DateMode::Yesterday => "yesterday",
            DateMode::OneWeekAgo => "oneWeekAgo",
            DateMode::OneWeekFromNow => "oneWeekFromNow",
            DateMode::OneMonthAgo => "oneMonthAgo",
            DateMode::OneMonthFromNow => "oneMonthFromNow",
            DateMode::DaysAgo => "daysAgo",
            DateMode::DaysFromNow => "daysFromNow",
            DateMode::ExactDate => "exactDate",
            DateMode::PastWeek => "pastWeek",
            DateMode::PastMonth => "pastMonth",
            DateMode::PastYear => "pastYear",
            DateMode::PastNumberOfDays => "pastNumberOfDays",
            DateMode::NextWeek => "nextWeek",
            DateMode::NextMonth => "nextMonth",
            DateMode::NextYear => "nextYear",
            DateMode::NextNumberOfDays => "nextNumberOfDays",
            DateMode::CalendarWeek => "calendarWeek",
            DateMode::CalendarMonth => "calendarMonth",
            DateMode::CalendarYear => "calendarYear",
        }
    }

    /// Returns true for the modes that read `numberOfDays`.
    pub fn uses_number_of_days(self) -> bool {
        matches!(
            self,
            DateMode::DaysAgo
                | DateMode::DaysFromNow
                | DateMode::PastNumberOfDays
                | DateMode::NextNumberOfDays
        )
    }
}

impl FromStr for DateMode {
    type Err = FilterError;

    fn from_str(s: &str) -> FilterResult<Self> {
        if let Some(mode) = DateMode::ALL.into_iter().find(|m| m.name() == s) {
            return Ok(mode);
        }

        let reason = match find_similar_mode(s) {
            Some(similar) => format!("unexpected date mode '{s}', did you mean '{similar}'?"),
            None => format!("unexpected date mode '{s}'"),
        };
        Err(FilterError::invalid_date(reason))
    }
}

impl fmt::Display for DateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Finds the closest mode name, ignoring case.
fn find_similar_mode(query: &str) -> Option<&'static str> {
    let query_lower = query.to_lowercase();

    let (best_match, best_distance) = DateMode::ALL
        .into_iter()
        .map(|mode| (mode.name(), levenshtein(&query_lower, &mode.name().to_lowercase())))
        .min_by_key(|(_, d)| *d)?;

    (best_distance <= MAX_SUGGESTION_DISTANCE).then_some(best_match)
}

/// A validated date filter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFilter {
    pub mode: DateMode,
    /// Magnitude of the `*NumberOfDays` and `days*` modes.
    pub number_of_days: Option<u32>,
    /// The date of `exactDate`.
    pub input: Option<NaiveDate>,
}

impl DateFilter {
    /// Creates a filter with only a mode.
    pub fn new(mode: DateMode) -> Self {
        Self {
            mode,
            number_of_days: None,
            input: None,
        }
    }

    /// Sets `number_of_days`.
    pub fn with_days(mut self, days: u32) -> Self {
        self.number_of_days = Some(days);
        self
    }

    /// Sets `input`.
    pub fn with_input(mut self, input: NaiveDate) -> Self {
        self.input = Some(input);
        self
    }

    fn days(&self) -> FilterResult<i64> {
        self.number_of_days.map(i64::from).ok_or_else(|| {
            FilterError::invalid_date(format!("numberOfDays is required for mode '{}'", self.mode))
        })
    }
}

/// Resolved boundaries of a date filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    fn day(date: NaiveDate) -> Self {
        Self::new(date, date)
    }
}

/// Resolves [`DateFilter`]s against an anchor date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateResolver {
    week_start: Weekday,
}

impl Default for DateResolver {
    fn default() -> Self {
        Self::new(Weekday::Mon)
    }
}

impl DateResolver {
    /// Creates a resolver whose calendar weeks start on `week_start`.
    pub fn new(week_start: Weekday) -> Self {
        Self { week_start }
    }

    /// Computes the `(start, end)` boundaries of `filter` relative to `anchor`.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::InvalidDateValue` if the mode needs a `numberOfDays`
    /// or `input` that is missing, or if a boundary falls outside the supported
    /// calendar range.
    pub fn resolve(&self, filter: &DateFilter, anchor: NaiveDate) -> FilterResult<DateRange> {
        let range = match filter.mode {
            DateMode::Today => DateRange::day(anchor),
            DateMode::Tomorrow => DateRange::day(add_days(anchor, 1)?),
            DateMode::Yesterday => DateRange::day(add_days(anchor, -1)?),
            DateMode::OneWeekAgo => DateRange::day(add_days(anchor, -7)?),
            DateMode::OneWeekFromNow => DateRange::day(add_days(anchor, 7)?),
            DateMode::OneMonthAgo => DateRange::day(add_months(anchor, -1)?),
            DateMode::OneMonthFromNow => DateRange::day(add_months(anchor, 1)?),
            DateMode::DaysAgo => DateRange::day(add_days(anchor, -filter.days()?)?),
            DateMode::DaysFromNow => DateRange::day(add_days(anchor, filter.days()?)?),
            DateMode::ExactDate => DateRange::day(filter.input.ok_or_else(|| {
                FilterError::invalid_date("input is required for mode 'exactDate'")
            })?),

            DateMode::PastWeek => DateRange::new(add_days(anchor, -7)?, add_days(anchor, 1)?),
            DateMode::PastMonth => DateRange::new(add_months(anchor, -1)?, add_days(anchor, 1)?),
            DateMode::PastYear => DateRange::new(add_months(anchor, -12)?, add_days(anchor, 1)?),
            DateMode::PastNumberOfDays => DateRange::new(
                add_days(anchor, -(filter.days()? + 1))?,
                add_days(anchor, 1)?,
            ),

            DateMode::NextWeek => DateRange::new(add_days(anchor, -1)?, add_days(anchor, 7)?),
            DateMode::NextMonth => DateRange::new(add_days(anchor, -1)?, add_months(anchor, 1)?),
            DateMode::NextYear => DateRange::new(add_days(anchor, -1)?, add_months(anchor, 12)?),
            DateMode::NextNumberOfDays => DateRange::new(
                add_days(anchor, -1)?,
                add_days(anchor, filter.days()? + 1)?,
            ),

            DateMode::CalendarWeek => {
                let offset = (7 + anchor.weekday().num_days_from_monday()
                    - self.week_start.num_days_from_monday())
                    % 7;
                let week_start = add_days(anchor, -i64::from(offset))?;
                DateRange::new(add_days(week_start, -1)?, add_days(week_start, 7)?)
            }
            DateMode::CalendarMonth => {
                let first = anchor.with_day(1).ok_or_else(out_of_range)?;
                DateRange::new(add_days(first, -1)?, add_months(first, 1)?)
            }
            DateMode::CalendarYear => {
                let year = anchor.year();
                DateRange::new(
                    NaiveDate::from_ymd_opt(year - 1, 12, 31).ok_or_else(out_of_range)?,
                    NaiveDate::from_ymd_opt(year + 1, 1, 1).ok_or_else(out_of_range)?,
                )
            }
        };
        Ok(range)
    }
}

fn out_of_range() -> FilterError {
    FilterError::invalid_date("date out of range")
}

/// Shifts `date` by a signed number of days.
pub(crate) fn add_days(date: NaiveDate, days: i64) -> FilterResult<NaiveDate> {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.ok_or_else(out_of_range)
}

/// Shifts `date` by a signed number of months, clamping the day of month.
fn add_months(date: NaiveDate, months: i32) -> FilterResult<NaiveDate> {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.ok_or_else(out_of_range)
}
