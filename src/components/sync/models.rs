use crate::error::{CalendarResult, Error};
use crate::utils::time::format_iso_date;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;
use uuid::Uuid;

/// Every importable or exported calendar starts with this line
pub const ICS_HEADER: &str = "BEGIN:VCALENDAR";

/// Extension accepted for uploads and used for exports
pub const ICS_EXTENSION: &str = "ics";

/// Backend answer to a successful import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub events_found: u32,
}

/// A calendar file picked for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarFile {
    pub file_name: String,
    pub display_name: String,
    pub bytes: Vec<u8>,
}

impl CalendarFile {
    pub fn new(file_name: impl Into<String>, display_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            display_name: display_name.into(),
            bytes,
        }
    }

    /// Reject files the backend would refuse, before uploading anything
    pub fn validate(&self) -> CalendarResult<()> {
        let has_ics_extension = Path::new(&self.file_name)
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case(ICS_EXTENSION))
            .unwrap_or(false);
        if !has_ics_extension {
            return Err(Error::UnsupportedCalendarFile(self.file_name.clone()));
        }
        if !looks_like_ics(&self.bytes) {
            return Err(Error::InvalidCalendarFormat(format!(
                "{} does not start with {}",
                self.file_name, ICS_HEADER
            )));
        }
        Ok(())
    }
}

/// Exported calendar ready to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedCalendar {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportedCalendar {
    /// Name the export `<prefix>-events-<YYYY-MM-DD>.ics`
    pub fn new(prefix: &str, today: NaiveDate, bytes: Vec<u8>) -> Self {
        Self {
            file_name: format!("{}-events-{}.{}", prefix, format_iso_date(today), ICS_EXTENSION),
            bytes,
        }
    }

    /// Write the file into `dir`, returning the full path
    pub fn save_to(&self, dir: &Path) -> CalendarResult<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

/// External calendar currently feeding university entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCalendar {
    pub id: Uuid,
    pub name: String,
    pub event_count: u32,
    pub last_synced_at: DateTime<Utc>,
}

/// Per-dashboard view of attached external calendars
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncState {
    pub connected: bool,
    pub source_calendars: Vec<SourceCalendar>,
}

impl SyncState {
    /// Record a successful import
    pub fn record_import(&mut self, name: &str, summary: ImportSummary, at: DateTime<Utc>) {
        self.connected = true;
        self.source_calendars.push(SourceCalendar {
            id: Uuid::new_v4(),
            name: name.to_string(),
            event_count: summary.events_found,
            last_synced_at: at,
        });
    }

    /// Forget every attached calendar
    pub fn disconnect(&mut self) {
        self.connected = false;
        self.source_calendars.clear();
    }
}

/// Check an iCal subscription link. `webcal://` is fetched over https.
pub fn validate_calendar_url(raw: &str) -> CalendarResult<Url> {
    let trimmed = raw.trim();
    let parse = |raw: &str| {
        Url::parse(raw).map_err(|e| Error::InvalidCalendarUrl(format!("{}: {}", trimmed, e)))
    };
    let mut url = parse(trimmed)?;

    match url.scheme() {
        "http" | "https" => {}
        "webcal" => {
            // webcal is not a "special" scheme, so it cannot be swapped in place
            let rest = trimmed.find(':').map(|i| &trimmed[i..]).unwrap_or_default();
            url = parse(&format!("https{}", rest))?;
        }
        other => {
            return Err(Error::InvalidCalendarUrl(format!(
                "unsupported scheme '{}' in {}",
                other, trimmed
            )))
        }
    }

    if url.host_str().map(str::is_empty).unwrap_or(true) {
        return Err(Error::InvalidCalendarUrl(format!("missing host in {}", trimmed)));
    }
    Ok(url)
}

/// Whether bytes start (after an optional BOM and whitespace) with the iCal header
pub fn looks_like_ics(bytes: &[u8]) -> bool {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    bytes[start..]
        .get(..ICS_HEADER.len())
        .map(|head| head.eq_ignore_ascii_case(ICS_HEADER.as_bytes()))
        .unwrap_or(false)
}
