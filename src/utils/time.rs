use chrono::{Datelike, Days, Months, NaiveDate, Utc};
use chrono_tz::Tz;

/// Days in one calendar week
pub const DAYS_PER_WEEK: u32 = 7;

/// Full weekday names, indexed from Sunday
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Short weekday labels, indexed from Sunday
pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Source of "today" for everything that renders relative to the current date
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Clock reading the system time in a fixed timezone
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    timezone: Tz,
}

impl SystemClock {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }
}

/// Clock pinned to a single date
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Parse the calendar-date prefix (`YYYY-MM-DD`) of a raw date string.
/// Anything after the first ten characters (a time part, an offset) is ignored.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let prefix = trimmed.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// Weekday index counted from Sunday (0) to Saturday (6)
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let first = first_day_of_month(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        // December of the last representable year
        .unwrap_or_else(|| {
            NaiveDate::from_ymd_opt(first.year(), first.month(), 31).unwrap_or(first)
        })
}

/// Sunday on or before `date`
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    add_days(date, -(weekday_index(date) as i64))
}

/// Shift by whole days, saturating at the edges of the representable range
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days as u64))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

/// Shift by whole months. The day of month is clipped to the end of the
/// target month when it does not exist there (Jan 31 + 1 month = Feb 29/28).
pub fn add_months_clipped(date: NaiveDate, months: i32) -> NaiveDate {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

/// Format a date as `YYYY-MM-DD`
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_calendar_date() {
        assert_eq!(parse_calendar_date("2024-03-10"), Some(date(2024, 3, 10)));
        assert_eq!(
            parse_calendar_date("2024-03-10T18:00:00"),
            Some(date(2024, 3, 10))
        );
        assert_eq!(
            parse_calendar_date("2024-03-10 23:59:59+05:00"),
            Some(date(2024, 3, 10))
        );
        assert_eq!(parse_calendar_date(" 2024-03-10 "), Some(date(2024, 3, 10)));

        assert_eq!(parse_calendar_date(""), None);
        assert_eq!(parse_calendar_date("2024-3-1"), None);
        assert_eq!(parse_calendar_date("2024-02-30"), None);
        assert_eq!(parse_calendar_date("next friday"), None);
        // multi-byte text must not panic on slicing
        assert_eq!(parse_calendar_date("päivä-ääää"), None);
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(first_day_of_month(date(2024, 3, 15)), date(2024, 3, 1));
        assert_eq!(last_day_of_month(date(2024, 3, 15)), date(2024, 3, 31));
        assert_eq!(last_day_of_month(date(2024, 2, 10)), date(2024, 2, 29));
        assert_eq!(last_day_of_month(date(2023, 2, 10)), date(2023, 2, 28));
        assert_eq!(last_day_of_month(date(2023, 12, 31)), date(2023, 12, 31));
        assert_eq!(last_day_of_month(date(2024, 4, 30)), date(2024, 4, 30));
    }

    #[test]
    fn test_start_of_week() {
        // Friday, 2024-03-15
        assert_eq!(weekday_index(date(2024, 3, 15)), 5);
        assert_eq!(start_of_week(date(2024, 3, 15)), date(2024, 3, 10));

        // Sunday stays put
        assert_eq!(start_of_week(date(2024, 3, 10)), date(2024, 3, 10));

        // Crossing a year boundary
        assert_eq!(start_of_week(date(2025, 1, 1)), date(2024, 12, 29));
    }

    #[test]
    fn test_add_months_clipped() {
        assert_eq!(add_months_clipped(date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(add_months_clipped(date(2023, 1, 31), 1), date(2023, 2, 28));
        assert_eq!(add_months_clipped(date(2024, 3, 31), -1), date(2024, 2, 29));
        assert_eq!(add_months_clipped(date(2024, 12, 15), 1), date(2025, 1, 15));
        assert_eq!(add_months_clipped(date(2024, 1, 15), -1), date(2023, 12, 15));
    }

    #[test]
    fn test_add_days_saturates() {
        assert_eq!(add_days(date(2024, 2, 28), 2), date(2024, 3, 1));
        assert_eq!(add_days(date(2024, 3, 1), -1), date(2024, 2, 29));
        assert_eq!(add_days(NaiveDate::MAX, 1), NaiveDate::MAX);
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock(date(2024, 3, 15));
        assert_eq!(clock.today(), date(2024, 3, 15));
        assert_eq!(format_iso_date(clock.today()), "2024-03-15");
    }
}
