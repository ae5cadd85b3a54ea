use crate::components::calendar_view::{
    Badge, BadgeStyle, CalendarEvent, CalendarGrid, DayCell, Origin,
};
use crate::components::calendar_view::summary::MAX_BADGES;
use crate::utils::time::{format_iso_date, WEEKDAY_LABELS};
use chrono::{Datelike, NaiveDate};
use std::fmt::Write;

const CELL_WIDTH: usize = 14;

/// Plain-text rendering of a grid, one text block per week row
pub fn render_grid(grid: &CalendarGrid) -> String {
    let mut out = String::new();
    out.push_str(&grid.title);
    if grid.loading {
        out.push_str(" (loading)");
    }
    out.push('\n');

    let header: Vec<String> = WEEKDAY_LABELS.iter().map(|label| pad(label)).collect();
    push_line(&mut out, &header);

    for row in &grid.rows {
        let numbers: Vec<String> = row.iter().map(day_label).collect();
        push_line(&mut out, &numbers);

        for slot in 0..MAX_BADGES {
            let badges: Vec<String> = row
                .iter()
                .map(|cell| {
                    cell.day()
                        .and_then(|day| day.summary.badges().get(slot).map(|b| badge_text(b)))
                        .map(|text| pad(&text))
                        .unwrap_or_else(|| pad(""))
                })
                .collect();
            if badges.iter().any(|b| !b.trim().is_empty()) {
                push_line(&mut out, &badges);
            }
        }
    }
    out
}

/// Plain-text listing for the drill-down panel
pub fn render_drilldown(date: NaiveDate, events: &[CalendarEvent]) -> String {
    if events.is_empty() {
        return format!("No events on {}\n", format_iso_date(date));
    }

    let mut out = format!("Events on {}:\n", format_iso_date(date));
    for event in events {
        out.push_str("- ");
        if let Some(time) = &event.time {
            let _ = write!(out, "{} ", time);
        }
        out.push_str(&event.title);
        if let Some(location) = &event.location {
            let _ = write!(out, " @ {}", location);
        }
        match (&event.origin, &event.club_name) {
            (Origin::University, _) => out.push_str(" (University)"),
            (Origin::Club, Some(club)) => {
                let _ = write!(out, " ({})", club);
            }
            (Origin::Club, None) => {}
        }
        if event.is_registered {
            out.push_str(" [registered]");
        }
        if event.has_conflict {
            out.push_str(" [conflict]");
        }
        out.push('\n');
    }
    out
}

fn day_label(cell: &DayCell) -> String {
    match cell {
        DayCell::Padding => pad(""),
        DayCell::Day(day) => {
            let number = if day.is_today {
                format!("[{}]", day.date.day())
            } else {
                day.date.day().to_string()
            };
            match day.day_name {
                Some(name) => pad(&format!("{} {}", name, number)),
                None => pad(&number),
            }
        }
    }
}

fn badge_text(badge: &Badge) -> String {
    match badge.style {
        BadgeStyle::Alert => format!("!{}", badge.label),
        BadgeStyle::Muted => format!("({})", badge.label),
        BadgeStyle::Success | BadgeStyle::Neutral => badge.label.clone(),
    }
}

/// Fit text into one fixed-width column
fn pad(text: &str) -> String {
    let clipped: String = text.chars().take(CELL_WIDTH - 1).collect();
    format!("{:<width$}", clipped, width = CELL_WIDTH)
}

fn push_line(out: &mut String, cells: &[String]) {
    out.push_str(cells.concat().trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::calendar_view::{build_grid, ViewMode};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn registered(title: &str, day: &str) -> CalendarEvent {
        CalendarEvent {
            title: title.to_string(),
            date: day.to_string(),
            is_registered: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_render_month_grid() {
        let events = vec![registered("Hack night", "2024-03-10")];
        let grid = build_grid(&events, date(2024, 3, 15), ViewMode::Month, date(2024, 3, 15));
        let text = render_grid(&grid);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "March 2024");
        assert!(lines[1].starts_with("Sun"));
        // five leading blanks put the 1st under Friday
        assert_eq!(lines[2].trim_start(), "1             2");
        assert!(text.contains("Hack night"));
        assert!(text.contains("[15]"));
    }

    #[test]
    fn test_render_loading_week_grid() {
        let mut grid = build_grid(&[], date(2024, 3, 13), ViewMode::Week, date(2024, 3, 1));
        grid.loading = true;
        let text = render_grid(&grid);
        assert!(text.starts_with("Mar 10 - Mar 16, 2024 (loading)\n"));
        assert!(text.contains("Sunday 10"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_render_drilldown() {
        let day = date(2024, 3, 10);
        assert_eq!(render_drilldown(day, &[]), "No events on 2024-03-10\n");

        let mut event = registered("Hack night", "2024-03-10");
        event.time = Some("6:00 PM".to_string());
        event.location = Some("Lab 3".to_string());
        event.club_name = Some("Robotics".to_string());
        event.has_conflict = true;
        let text = render_drilldown(day, &[event]);
        assert_eq!(
            text,
            "Events on 2024-03-10:\n- 6:00 PM Hack night @ Lab 3 (Robotics) [registered] [conflict]\n"
        );
    }
}
