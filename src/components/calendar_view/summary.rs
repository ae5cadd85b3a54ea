//! Fixed-budget summary of one day's events for a grid cell.
//!
//! Priority: the participant's registered club events, then university
//! entries, then other club events. Ties keep fetch order.

use super::models::{CalendarEvent, Origin};

/// At most this many badges are shown in a cell
pub const MAX_BADGES: usize = 2;

/// Smallest hidden-event count that still gets a "+N" badge
pub const OVERFLOW_THRESHOLD: usize = 1;

/// Visual class of a badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeStyle {
    /// Registered event with a scheduling conflict
    Alert,
    /// Registered event without conflicts
    Success,
    /// University calendar entry
    Neutral,
    /// Counters
    Muted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: String,
    pub style: BadgeStyle,
}

impl Badge {
    fn new(label: impl Into<String>, style: BadgeStyle) -> Self {
        Self {
            label: label.into(),
            style,
        }
    }
}

/// Compact display of a day: an optional titled badge and an optional counter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DaySummary {
    pub primary: Option<Badge>,
    pub overflow: Option<Badge>,
}

impl DaySummary {
    pub fn badges(&self) -> Vec<&Badge> {
        self.primary.iter().chain(self.overflow.iter()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.overflow.is_none()
    }
}

/// Summarize a day's events. With a registered primary, the overflow counts every other event of the day.
pub fn summarize_day(events: &[CalendarEvent]) -> DaySummary {
    let mut registered = Vec::new();
    let mut university = Vec::new();
    let mut other_club = 0usize;
    for event in events {
        match event.origin {
            Origin::Club if event.is_registered => registered.push(event),
            Origin::Club => other_club += 1,
            Origin::University => university.push(event),
        }
    }

    if let Some(first) = registered.first() {
        let style = if first.has_conflict {
            BadgeStyle::Alert
        } else {
            BadgeStyle::Success
        };
        let hidden = events.len() - 1;
        return DaySummary {
            primary: Some(Badge::new(first.title.clone(), style)),
            overflow: overflow_badge(hidden, "Club-Hub"),
        };
    }

    if let Some(first) = university.first() {
        let hidden_university = university.len() - 1;
        let overflow = if other_club > 0 {
            // One slot left, so everything hidden is counted together
            let hidden = hidden_university + other_club;
            overflow_badge(hidden, events_noun(hidden))
        } else {
            overflow_badge(hidden_university, "Uni")
        };
        return DaySummary {
            primary: Some(Badge::new(first.title.clone(), BadgeStyle::Neutral)),
            overflow,
        };
    }

    if other_club > 0 {
        return DaySummary {
            primary: None,
            overflow: Some(Badge::new(
                format!("{} {}", other_club, events_noun(other_club)),
                BadgeStyle::Muted,
            )),
        };
    }

    DaySummary::default()
}

fn events_noun(count: usize) -> &'static str {
    if count == 1 {
        "event"
    } else {
        "events"
    }
}

fn overflow_badge(hidden: usize, label: &str) -> Option<Badge> {
    (hidden >= OVERFLOW_THRESHOLD)
        .then(|| Badge::new(format!("+{} {}", hidden, label), BadgeStyle::Muted))
}
