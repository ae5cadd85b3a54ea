use super::models::{QueryRange, ViewMode};
use crate::utils::time::{add_days, first_day_of_month, last_day_of_month, start_of_week, weekday_index};
use chrono::NaiveDate;

/// Date boundaries to query for a view, plus the blank cells that align
/// the first real day under its weekday column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub range: QueryRange,
    pub leading_padding: u32,
}

/// Resolve the inclusive range a grid covers
pub fn resolve_range(reference: NaiveDate, mode: ViewMode) -> ResolvedRange {
    match mode {
        ViewMode::Month => {
            let first = first_day_of_month(reference);
            ResolvedRange {
                range: QueryRange {
                    start: first,
                    end: last_day_of_month(reference),
                },
                leading_padding: weekday_index(first),
            }
        }
        ViewMode::Week => {
            let start = start_of_week(reference);
            ResolvedRange {
                range: QueryRange {
                    start,
                    end: add_days(start, 6),
                },
                leading_padding: 0,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_range() {
        let resolved = resolve_range(date(2024, 3, 15), ViewMode::Month);
        assert_eq!(resolved.range.start, date(2024, 3, 1));
        assert_eq!(resolved.range.end, date(2024, 3, 31));
        // 2024-03-01 is a Friday
        assert_eq!(resolved.leading_padding, 5);

        // September 2024 starts on a Sunday
        let resolved = resolve_range(date(2024, 9, 30), ViewMode::Month);
        assert_eq!(resolved.leading_padding, 0);
        assert_eq!(resolved.range.end, date(2024, 9, 30));
    }

    #[test]
    fn test_week_range() {
        let resolved = resolve_range(date(2024, 3, 15), ViewMode::Week);
        assert_eq!(resolved.range.start, date(2024, 3, 10));
        assert_eq!(resolved.range.end, date(2024, 3, 16));
        assert_eq!(resolved.leading_padding, 0);

        // weeks may straddle months
        let resolved = resolve_range(date(2024, 3, 1), ViewMode::Week);
        assert_eq!(resolved.range.start, date(2024, 2, 25));
        assert_eq!(resolved.range.end, date(2024, 3, 2));
    }

    #[test]
    fn test_every_day_of_a_leap_year() {
        let mut day = date(2024, 1, 1);
        while day.year() == 2024 {
            let week = resolve_range(day, ViewMode::Week);
            assert!(week.range.contains(day));
            assert_eq!((week.range.end - week.range.start).num_days(), 6);
            assert_eq!(weekday_index(week.range.start), 0);

            let month = resolve_range(day, ViewMode::Month);
            assert!(month.range.contains(day));
            assert!(month.leading_padding < 7);
            day = add_days(day, 1);
        }
    }
}
