//! Calendar arithmetic anchored on the plan's configured start date.

use crate::plan::WEEKS_IN_PLAN;
use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Source of "now" for timestamps and current-week queries.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

const MILLIS_PER_WEEK: i64 = 7 * 24 * 60 * 60 * 1000;

/// Week number (1-52) that `now` falls into. Week 1 is the seven days
/// starting at midnight UTC on `start_date`; without a start date every
/// query answers week 1.
pub fn current_week(start_date: Option<NaiveDate>, now: DateTime<Utc>) -> u32 {
    let Some(start) = start_date else {
        return 1;
    };
    let start = start.and_time(chrono::NaiveTime::MIN).and_utc();
    let elapsed = (now - start).num_milliseconds();
    let week = elapsed.div_euclid(MILLIS_PER_WEEK) + 1;
    week.clamp(1, WEEKS_IN_PLAN as i64) as u32
}

/// Calendar date on which `week` begins.
pub fn week_date(start_date: Option<NaiveDate>, week: u32) -> Option<NaiveDate> {
    let start = start_date?;
    let offset = (i64::from(week) - 1) * 7;
    start.checked_add_signed(Duration::days(offset))
}

/// Share of the year elapsed at `week`, as a rounded percentage.
pub fn year_progress(week: u32) -> u32 {
    round_percent(week as usize, WEEKS_IN_PLAN as usize)
}

/// `part / whole * 100` rounded half-up; 0 when `whole` is 0.
pub(crate) fn round_percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((200 * part + whole) / (2 * whole)) as u32
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn no_start_date_is_week_one() {
        assert_eq!(current_week(None, Utc::now()), 1);
        assert!(week_date(None, 10).is_none());
    }

    #[test]
    fn fourteen_days_in_is_week_three() {
        assert_eq!(current_week(Some(date(2025, 1, 6)), at(2025, 1, 20, 0)), 3);
    }

    #[test]
    fn first_week_spans_seven_days() {
        let start = Some(date(2025, 1, 6));
        assert_eq!(current_week(start, at(2025, 1, 6, 0)), 1);
        assert_eq!(current_week(start, at(2025, 1, 12, 23)), 1);
        assert_eq!(current_week(start, at(2025, 1, 13, 0)), 2);
    }

    #[test]
    fn clamps_before_start_and_after_end() {
        let start = Some(date(2025, 1, 6));
        assert_eq!(current_week(start, at(2024, 12, 1, 0)), 1);
        assert_eq!(current_week(start, at(2027, 1, 1, 0)), 52);
    }

    #[test]
    fn week_date_offsets_by_weeks() {
        let start = Some(date(2025, 1, 6));
        assert_eq!(week_date(start, 1), Some(date(2025, 1, 6)));
        assert_eq!(week_date(start, 3), Some(date(2025, 1, 20)));
        assert_eq!(week_date(start, 52), Some(date(2025, 12, 29)));
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round_percent(1, 2), 50);
        assert_eq!(round_percent(1, 8), 13);
        assert_eq!(round_percent(1, 3), 33);
        assert_eq!(round_percent(2, 3), 67);
        assert_eq!(round_percent(0, 0), 0);
        assert_eq!(year_progress(26), 50);
        assert_eq!(year_progress(52), 100);
    }

    #[test]
    fn fixed_clock_is_stable() {
        let clock = FixedClock(at(2025, 3, 1, 12));
        assert_eq!(clock.now(), clock.now());
    }
}
