//! Calendar-day windows in a reference timezone
//!
//! Daily quotas are counted per local calendar day. A [`DayWindow`] is the
//! half-open UTC interval `[local midnight, next local midnight)`, so an
//! instant exactly at midnight belongs to the day it starts.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Half-open interval covering one local calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    /// First instant of the day (inclusive)
    pub start: DateTime<Utc>,
    /// First instant of the following day (exclusive)
    pub end: DateTime<Utc>,
}

impl DayWindow {
    /// Window of the local day that contains `instant`
    pub fn containing(instant: DateTime<Utc>, tz: Tz) -> Self {
        let date = instant.with_timezone(&tz).date_naive();
        let next = date.succ_opt().unwrap_or(NaiveDate::MAX);

        Self {
            start: start_of_day(date, tz),
            end: start_of_day(next, tz),
        }
    }

    /// Whether `instant` falls inside the window
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);

    if let Some(start) = tz.from_local_datetime(&midnight).earliest() {
        return start.with_timezone(&Utc);
    }

    // Midnight skipped by a DST jump: the day starts at the end of the gap.
    let shifted = midnight + Duration::hours(1);
    tz.from_local_datetime(&shifted)
        .earliest()
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::{America::New_York, Asia::Seoul};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_window_starts_at_local_midnight() {
        // 2024-03-10 12:00 KST
        let window = DayWindow::containing(utc(2024, 3, 10, 3, 0, 0), Seoul);
        assert_eq!(window.start, utc(2024, 3, 9, 15, 0, 0));
        assert_eq!(window.end, utc(2024, 3, 10, 15, 0, 0));
    }

    #[test]
    fn test_boundary_instants_land_in_exactly_one_day() {
        let before_midnight = utc(2024, 3, 10, 14, 59, 59); // 23:59:59 KST
        let after_midnight = utc(2024, 3, 10, 15, 0, 1); // 00:00:01 KST next day

        let first_day = DayWindow::containing(before_midnight, Seoul);
        let second_day = DayWindow::containing(after_midnight, Seoul);

        assert!(first_day.contains(before_midnight));
        assert!(!first_day.contains(after_midnight));
        assert!(second_day.contains(after_midnight));
        assert!(!second_day.contains(before_midnight));
        assert_eq!(first_day.end, second_day.start);
    }

    #[test]
    fn test_midnight_is_inclusive_start_exclusive_end() {
        let midnight = utc(2024, 3, 10, 15, 0, 0); // 00:00:00 KST
        let previous = DayWindow::containing(utc(2024, 3, 10, 14, 0, 0), Seoul);
        let current = DayWindow::containing(midnight, Seoul);

        assert!(!previous.contains(midnight));
        assert!(current.contains(midnight));
        assert_eq!(current.start, midnight);
    }

    #[test]
    fn test_dst_spring_forward_day_is_shorter() {
        // 2024-03-10 is the spring-forward day in New York
        let window = DayWindow::containing(utc(2024, 3, 10, 17, 0, 0), New_York);
        assert_eq!(window.start, utc(2024, 3, 10, 5, 0, 0));
        assert_eq!(window.end, utc(2024, 3, 11, 4, 0, 0));
        assert_eq!(window.end - window.start, Duration::hours(23));
    }
}
