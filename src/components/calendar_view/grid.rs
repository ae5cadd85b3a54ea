use super::aggregate::EventBuckets;
use super::models::{CalendarDay, CalendarEvent, CalendarGrid, DateKey, DayCell, ViewMode};
use super::range::{resolve_range, ResolvedRange};
use super::summary::summarize_day;
use crate::utils::time::{add_days, weekday_index, DAYS_PER_WEEK, WEEKDAY_NAMES};
use chrono::NaiveDate;

/// Build the grid for `reference` in `mode`, filling each day from `events`.
/// `today` marks the cell that is highlighted as the current date.
pub fn build_grid(
    events: &[CalendarEvent],
    reference: NaiveDate,
    mode: ViewMode,
    today: NaiveDate,
) -> CalendarGrid {
    let resolved = resolve_range(reference, mode);
    let buckets = EventBuckets::from_events(events);
    let today = DateKey::from(today);

    let cells = match mode {
        ViewMode::Month => month_cells(&resolved, &buckets, today),
        ViewMode::Week => week_cells(&resolved, &buckets, today),
    };

    CalendarGrid {
        view_mode: mode,
        range: resolved.range,
        title: grid_title(&resolved, mode),
        rows: cells
            .chunks(DAYS_PER_WEEK as usize)
            .map(|row| row.to_vec())
            .collect(),
        loading: false,
    }
}

fn month_cells(resolved: &ResolvedRange, buckets: &EventBuckets, today: DateKey) -> Vec<DayCell> {
    let week = DAYS_PER_WEEK as usize;
    let mut cells = vec![DayCell::Padding; resolved.leading_padding as usize];

    let mut date = resolved.range.start;
    loop {
        cells.push(DayCell::Day(day_cell(date, buckets, today, None)));
        if date >= resolved.range.end {
            break;
        }
        date = add_days(date, 1);
    }

    let trailing = (week - cells.len() % week) % week;
    cells.extend(std::iter::repeat(DayCell::Padding).take(trailing));
    cells
}

fn week_cells(resolved: &ResolvedRange, buckets: &EventBuckets, today: DateKey) -> Vec<DayCell> {
    (0..DAYS_PER_WEEK as i64)
        .map(|offset| {
            let date = add_days(resolved.range.start, offset);
            let name = WEEKDAY_NAMES[weekday_index(date) as usize];
            DayCell::Day(day_cell(date, buckets, today, Some(name)))
        })
        .collect()
}

fn day_cell(
    date: NaiveDate,
    buckets: &EventBuckets,
    today: DateKey,
    day_name: Option<&'static str>,
) -> CalendarDay {
    let key = DateKey::from(date);
    let events = buckets.events_on(key);
    let summary = summarize_day(&events);
    CalendarDay {
        date,
        key,
        events,
        summary,
        is_today: key == today,
        day_name,
    }
}

/// "March 2024" or "Mar 10 - Mar 16, 2024"
fn grid_title(resolved: &ResolvedRange, mode: ViewMode) -> String {
    match mode {
        ViewMode::Month => resolved.range.start.format("%B %Y").to_string(),
        ViewMode::Week => format!(
            "{} - {}",
            resolved.range.start.format("%b %-d"),
            resolved.range.end.format("%b %-d, %Y")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::calendar_view::models::Origin;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(title: &str, day: &str, origin: Origin, registered: bool) -> CalendarEvent {
        CalendarEvent {
            title: title.to_string(),
            date: day.to_string(),
            origin,
            is_registered: registered,
            ..Default::default()
        }
    }

    #[test]
    fn test_march_2024_month_grid() {
        let grid = build_grid(&[], date(2024, 3, 15), ViewMode::Month, date(2024, 3, 15));

        assert_eq!(grid.title, "March 2024");
        assert_eq!(grid.rows.len(), 6);
        assert_eq!(grid.cells().count(), 42);
        assert!(grid.rows.iter().all(|row| row.len() == 7));

        // Friday the 1st sits in column 5
        let first_row = &grid.rows[0];
        assert!(first_row[..5].iter().all(DayCell::is_padding));
        assert_eq!(first_row[5].click_target(), Some(date(2024, 3, 1)));

        let last_day = grid.days().last().unwrap();
        assert_eq!(last_day.date, date(2024, 3, 31));
        assert_eq!(grid.days().count(), 31);
        assert!(grid.day(date(2024, 3, 15)).unwrap().is_today);
        assert_eq!(grid.days().filter(|d| d.is_today).count(), 1);
    }

    #[test]
    fn test_month_without_padding_rows() {
        // February 2015: starts on Sunday, 28 days, exactly four rows
        let grid = build_grid(&[], date(2015, 2, 10), ViewMode::Month, date(2024, 1, 1));
        assert_eq!(grid.rows.len(), 4);
        assert!(grid.cells().all(|cell| !cell.is_padding()));
        assert!(grid.days().all(|d| !d.is_today));
    }

    #[test]
    fn test_month_grids_fill_whole_rows_for_a_decade() {
        for year in 2020..2030 {
            for month in 1..=12 {
                let reference = date(year, month, 1);
                let grid = build_grid(&[], reference, ViewMode::Month, reference);
                let cells: Vec<_> = grid.cells().collect();
                assert_eq!(cells.len() % 7, 0);

                let first_real = cells.iter().position(|c| !c.is_padding()).unwrap();
                assert_eq!(first_real as u32, weekday_index(reference));

                // no fully blank trailing row
                let last_row = grid.rows.last().unwrap();
                assert!(last_row.iter().any(|c| !c.is_padding()));
                assert!((4..=6).contains(&grid.rows.len()));
            }
        }
    }

    #[test]
    fn test_week_grid() {
        let events = vec![
            event("Mine", "2024-03-12", Origin::Club, true),
            event("Outside", "2024-03-17", Origin::Club, true),
        ];
        let grid = build_grid(&events, date(2024, 3, 15), ViewMode::Week, date(2024, 3, 12));

        assert_eq!(grid.title, "Mar 10 - Mar 16, 2024");
        assert_eq!(grid.rows.len(), 1);
        let row = &grid.rows[0];
        assert_eq!(row.len(), 7);
        assert!(row.iter().all(|c| !c.is_padding()));

        let days: Vec<_> = grid.days().collect();
        assert_eq!(days[0].date, date(2024, 3, 10));
        assert_eq!(days[0].day_name, Some("Sunday"));
        assert_eq!(days[6].day_name, Some("Saturday"));
        assert!(days[2].is_today);
        assert_eq!(days[2].events.len(), 1);
        assert_eq!(days[2].summary.primary.as_ref().unwrap().label, "Mine");
        assert_eq!(grid.days().map(|d| d.events.len()).sum::<usize>(), 1);
    }

    #[test]
    fn test_month_cells_carry_events_and_summaries() {
        let events = vec![
            event("A", "2024-03-10", Origin::Club, true),
            event("B", "2024-03-10T09:00:00", Origin::University, false),
            event("Broken", "soon", Origin::Club, false),
            event("Elsewhere", "2024-04-01", Origin::University, false),
        ];
        let grid = build_grid(&events, date(2024, 3, 1), ViewMode::Month, date(2024, 3, 1));

        let tenth = grid.day(date(2024, 3, 10)).unwrap();
        assert_eq!(tenth.events.len(), 2);
        assert_eq!(tenth.summary.primary.as_ref().unwrap().label, "A");
        assert_eq!(tenth.summary.overflow.as_ref().unwrap().label, "+1 Club-Hub");
        assert_eq!(tenth.day_name, None);

        assert_eq!(grid.days().map(|d| d.events.len()).sum::<usize>(), 2);
        assert!(grid.cells().filter(|c| c.is_padding()).all(|c| c.click_target().is_none()));
    }
}
