//! Working-day calendar for internship scheduling.
//!
//! Pure date arithmetic: both functions walk the calendar one day at a time
//! and consult only their arguments, so identical inputs always produce
//! identical outputs.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Weekly pattern an internship runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeeklyPattern {
    FiveDays,
    SixDays,
}

impl WeeklyPattern {
    pub const fn label(self) -> &'static str {
        match self {
            Self::FiveDays => "Monday-Friday",
            Self::SixDays => "Monday-Saturday",
        }
    }

    const fn counts(self, weekday: Weekday) -> bool {
        match self {
            Self::FiveDays => !matches!(weekday, Weekday::Sat | Weekday::Sun),
            Self::SixDays => !matches!(weekday, Weekday::Sun),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("internship duration must be at least one working day, got {0}")]
    InvalidDuration(u32),
}

/// Returns the date on which the internship reaches `required_working_days`.
///
/// The start date itself counts as working day one when it qualifies under
/// the pattern; otherwise counting begins at the first qualifying day after
/// it.
pub fn compute_end_date(
    start_date: NaiveDate,
    required_working_days: u32,
    pattern: WeeklyPattern,
) -> Result<NaiveDate, CalendarError> {
    if required_working_days == 0 {
        return Err(CalendarError::InvalidDuration(required_working_days));
    }

    let mut day = start_date;
    let mut counted = 0u32;
    loop {
        if pattern.counts(day.weekday()) {
            counted += 1;
            if counted == required_working_days {
                return Ok(day);
            }
        }
        day += Duration::days(1);
    }
}

/// Counts working days between two dates, inclusive of both endpoints.
/// An empty or inverted range counts zero days.
pub fn count_working_days(start_date: NaiveDate, end_date: NaiveDate, pattern: WeeklyPattern) -> u32 {
    let mut day = start_date;
    let mut counted = 0u32;
    while day <= end_date {
        if pattern.counts(day.weekday()) {
            counted += 1;
        }
        day += Duration::days(1);
    }
    counted
}
