//! # Time Window Module
//!
//! Half-open `[start, end)` intervals for report aggregation.
//!
//! ## Why Half-Open?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ADJACENT WINDOWS MUST NOT DOUBLE-COUNT                                 │
//! │                                                                         │
//! │  Closed intervals:   [Mon 00:00, Tue 00:00] [Tue 00:00, Wed 00:00]     │
//! │                                    ▲▲▲                                  │
//! │                 a sale at exactly Tue 00:00 lands in BOTH days ❌      │
//! │                                                                         │
//! │  Half-open:          [Mon 00:00, Tue 00:00) [Tue 00:00, Wed 00:00)     │
//! │                 a sale at exactly Tue 00:00 lands in Tuesday only ✅   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Month and year windows follow the calendar, not fixed durations:
//! a 31-day month is one bucket, February is one bucket.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Time Window
// =============================================================================

/// A half-open `[start, end)` interval in UTC.
///
/// Construction is the only place window math happens; everything
/// downstream (queries, report filters) just compares instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Creates a window from explicit bounds.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::{TimeZone, Utc};
    /// use kiosco_core::window::TimeWindow;
    ///
    /// let start = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();
    /// let end = Utc.with_ymd_and_hms(2026, 8, 21, 0, 0, 0).unwrap();
    /// let window = TimeWindow::new(start, end).unwrap();
    /// assert!(window.contains(start));
    /// assert!(!window.contains(end));
    /// ```
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> CoreResult<Self> {
        if start >= end {
            return Err(CoreError::InvalidWindow {
                reason: format!("start {start} must precede end {end}"),
            });
        }
        Ok(TimeWindow { start, end })
    }

    /// One calendar day: `[00:00 of date, 00:00 of next date)`.
    pub fn day(date: NaiveDate) -> CoreResult<Self> {
        let next = date.succ_opt().ok_or_else(|| CoreError::InvalidWindow {
            reason: format!("no day follows {date}"),
        })?;
        Ok(TimeWindow {
            start: start_of_day(date),
            end: start_of_day(next),
        })
    }

    /// One calendar month: `[1st 00:00, 1st of next month 00:00)`.
    ///
    /// ## Example
    /// ```rust
    /// use kiosco_core::window::TimeWindow;
    ///
    /// // February 2024 is a leap bucket: 29 days long
    /// let feb = TimeWindow::month(2024, 2).unwrap();
    /// let days = (feb.end() - feb.start()).num_days();
    /// assert_eq!(days, 29);
    ///
    /// assert!(TimeWindow::month(2026, 13).is_err());
    /// ```
    pub fn month(year: i32, month: u32) -> CoreResult<Self> {
        let first = first_of_month(year, month)?;
        let next = if month == 12 {
            first_of_month(year + 1, 1)?
        } else {
            first_of_month(year, month + 1)?
        };
        Ok(TimeWindow {
            start: start_of_day(first),
            end: start_of_day(next),
        })
    }

    /// One calendar year: `[Jan 1 00:00, Jan 1 of next year 00:00)`.
    pub fn year(year: i32) -> CoreResult<Self> {
        let first = first_of_month(year, 1)?;
        let next = first_of_month(year + 1, 1)?;
        Ok(TimeWindow {
            start: start_of_day(first),
            end: start_of_day(next),
        })
    }

    /// The inclusive lower bound.
    #[inline]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// The exclusive upper bound.
    #[inline]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Half-open membership test: `start <= at < end`.
    #[inline]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.start.format("%Y-%m-%d %H:%M:%S"),
            self.end.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

// =============================================================================
// Calendar Helpers
// =============================================================================

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn first_of_month(year: i32, month: u32) -> CoreResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| CoreError::InvalidWindow {
        reason: format!("{year}-{month:02} is not a valid calendar month"),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_day_window_bounds() {
        let window = TimeWindow::day(date(2026, 8, 21)).unwrap();

        assert!(window.contains(at(2026, 8, 21, 0, 0, 0)));
        assert!(window.contains(at(2026, 8, 21, 23, 59, 59)));
        // Exact end boundary belongs to the NEXT day
        assert!(!window.contains(at(2026, 8, 22, 0, 0, 0)));
        assert!(!window.contains(at(2026, 8, 20, 23, 59, 59)));
    }

    #[test]
    fn test_month_window_follows_calendar() {
        let aug = TimeWindow::month(2026, 8).unwrap();
        assert_eq!(aug.start(), at(2026, 8, 1, 0, 0, 0));
        assert_eq!(aug.end(), at(2026, 9, 1, 0, 0, 0));
        assert_eq!((aug.end() - aug.start()).num_days(), 31);

        // February in a leap year
        let feb = TimeWindow::month(2024, 2).unwrap();
        assert_eq!((feb.end() - feb.start()).num_days(), 29);
    }

    #[test]
    fn test_december_rolls_into_next_year() {
        let dec = TimeWindow::month(2026, 12).unwrap();
        assert_eq!(dec.end(), at(2027, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_year_window() {
        let year = TimeWindow::year(2026).unwrap();
        assert_eq!(year.start(), at(2026, 1, 1, 0, 0, 0));
        assert_eq!(year.end(), at(2027, 1, 1, 0, 0, 0));
        assert!(year.contains(at(2026, 12, 31, 23, 59, 59)));
        assert!(!year.contains(at(2027, 1, 1, 0, 0, 0)));
    }

    #[test]
    fn test_invalid_windows_rejected() {
        assert!(TimeWindow::month(2026, 0).is_err());
        assert!(TimeWindow::month(2026, 13).is_err());

        let start = at(2026, 8, 2, 0, 0, 0);
        let end = at(2026, 8, 1, 0, 0, 0);
        assert!(TimeWindow::new(start, end).is_err());
        assert!(TimeWindow::new(start, start).is_err());
    }

    #[test]
    fn test_adjacent_windows_do_not_overlap() {
        let monday = TimeWindow::day(date(2026, 8, 17)).unwrap();
        let tuesday = TimeWindow::day(date(2026, 8, 18)).unwrap();
        let boundary = at(2026, 8, 18, 0, 0, 0);

        // The shared instant belongs to exactly one window
        assert!(!monday.contains(boundary));
        assert!(tuesday.contains(boundary));
        assert_eq!(monday.end(), tuesday.start());
    }
}
