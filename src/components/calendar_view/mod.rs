//! Pure calendar view engine shared by the participant and university dashboards.
//!
//! Nothing here performs I/O or reads the clock; "today" is always passed in.

pub mod aggregate;
pub mod drilldown;
pub mod grid;
pub mod models;
pub mod navigation;
pub mod range;
pub mod summary;

pub use drilldown::events_on_date;
pub use grid::build_grid;
pub use models::{CalendarEvent, CalendarGrid, DateKey, DayCell, Origin, QueryRange, ViewMode};
pub use navigation::NavigationState;
pub use range::{resolve_range, ResolvedRange};
pub use summary::{summarize_day, Badge, BadgeStyle, DaySummary};
