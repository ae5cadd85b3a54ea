use super::models::{CalendarEvent, DateKey};
use std::collections::HashMap;
use tracing::warn;

/// Events grouped by the day they fall on, fetch order preserved within a day
#[derive(Debug, Clone, Default)]
pub struct EventBuckets {
    by_day: HashMap<DateKey, Vec<CalendarEvent>>,
}

impl EventBuckets {
    /// Bucket a flat event list in one pass.
    /// Events with an unparseable date are logged and skipped.
    pub fn from_events(events: &[CalendarEvent]) -> Self {
        let mut buckets = Self::default();
        for event in events {
            match event.date_key() {
                Ok(key) => buckets.by_day.entry(key).or_default().push(event.clone()),
                Err(e) => {
                    warn!(
                        id = ?event.id,
                        title = %event.title,
                        "Dropping calendar event: {}",
                        e
                    );
                }
            }
        }
        buckets
    }

    /// Events on `key`, empty when the day has none
    pub fn events_on(&self, key: DateKey) -> Vec<CalendarEvent> {
        self.by_day.get(&key).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::calendar_view::models::Origin;
    use chrono::NaiveDate;

    fn event(title: &str, date: &str, origin: Origin) -> CalendarEvent {
        CalendarEvent {
            title: title.to_string(),
            date: date.to_string(),
            origin,
            ..Default::default()
        }
    }

    fn key(y: i32, m: u32, d: u32) -> DateKey {
        DateKey::from(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_same_day_regardless_of_time_or_origin() {
        let events = vec![
            event("Late", "2024-03-10T21:00:00", Origin::Club),
            event("Other day", "2024-03-11", Origin::Club),
            event("Early", "2024-03-10", Origin::University),
            event("Noon", "2024-03-10 12:00", Origin::Club),
        ];
        let buckets = EventBuckets::from_events(&events);

        let titles: Vec<_> = buckets
            .events_on(key(2024, 3, 10))
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["Late", "Early", "Noon"]);
        assert_eq!(buckets.events_on(key(2024, 3, 11)).len(), 1);
        assert!(buckets.events_on(key(2024, 3, 12)).is_empty());
    }

    #[test]
    fn test_order_independent_grouping() {
        let mut events = vec![
            event("A", "2024-03-10", Origin::Club),
            event("B", "2024-03-12", Origin::Club),
            event("C", "2024-03-10T08:00", Origin::University),
        ];
        let forward = EventBuckets::from_events(&events);
        events.reverse();
        let backward = EventBuckets::from_events(&events);

        assert_eq!(forward.events_on(key(2024, 3, 10)).len(), 2);
        assert_eq!(backward.events_on(key(2024, 3, 10)).len(), 2);
        assert_eq!(backward.events_on(key(2024, 3, 12))[0].title, "B");
    }

    #[test]
    fn test_malformed_dates_are_dropped() {
        let events = vec![
            event("Good", "2024-03-10", Origin::Club),
            event("Bad", "sometime soon", Origin::Club),
            event("Empty", "", Origin::University),
            event("Also good", "2024-03-10", Origin::University),
        ];
        let buckets = EventBuckets::from_events(&events);

        let titles: Vec<_> = buckets
            .events_on(key(2024, 3, 10))
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["Good", "Also good"]);
    }
}
