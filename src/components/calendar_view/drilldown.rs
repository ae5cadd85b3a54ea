use super::models::{CalendarEvent, DateKey};
use chrono::NaiveDate;

/// Every event on `date`, in fetch order and without summarization.
/// Works only on already-fetched events.
pub fn events_on_date(events: &[CalendarEvent], date: NaiveDate) -> Vec<CalendarEvent> {
    let wanted = DateKey::from(date);
    events
        .iter()
        .filter(|event| matches!(event.date_key(), Ok(key) if key == wanted))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::calendar_view::models::Origin;

    fn event(title: &str, date: &str) -> CalendarEvent {
        CalendarEvent {
            title: title.to_string(),
            date: date.to_string(),
            origin: Origin::University,
            ..Default::default()
        }
    }

    #[test]
    fn test_returns_all_events_in_order() {
        let mut events: Vec<_> = (0..12)
            .map(|i| event(&format!("E{}", i), "2024-03-10"))
            .collect();
        events.insert(3, event("Other", "2024-03-11"));
        events.push(event("Bad", "??"));

        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let found = events_on_date(&events, day);
        assert_eq!(found.len(), 12);
        assert_eq!(found[0].title, "E0");
        assert_eq!(found[11].title, "E11");
    }

    #[test]
    fn test_time_suffix_matches_day() {
        let events = vec![event("Evening", "2024-03-10T19:30:00")];
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        assert_eq!(events_on_date(&events, day).len(), 1);

        let next = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        assert!(events_on_date(&events, next).is_empty());
    }
}
