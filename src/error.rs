use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the calendar engine
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Failed to fetch calendar events: {0}")]
    #[diagnostic(code(clubhub_calendar::fetch))]
    Fetch(String),

    #[error("Invalid calendar URL: {0}")]
    #[diagnostic(
        code(clubhub_calendar::import::url),
        help("use an http://, https:// or webcal:// link to an iCal feed")
    )]
    InvalidCalendarUrl(String),

    #[error("Invalid calendar format: {0}")]
    #[diagnostic(code(clubhub_calendar::import::format))]
    InvalidCalendarFormat(String),

    #[error("Unsupported calendar file: {0}")]
    #[diagnostic(
        code(clubhub_calendar::import::extension),
        help("only .ics files can be uploaded")
    )]
    UnsupportedCalendarFile(String),

    #[error("Failed to parse calendar event: {0}")]
    #[diagnostic(code(clubhub_calendar::event_parse))]
    EventParse(String),

    #[error("Calendar sync error: {0}")]
    #[diagnostic(code(clubhub_calendar::sync))]
    Sync(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(clubhub_calendar::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(clubhub_calendar::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(clubhub_calendar::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(clubhub_calendar::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(clubhub_calendar::other))]
    Other(String),
}

impl Error {
    /// Whether this error came from rejecting a calendar import
    pub fn is_import_failure(&self) -> bool {
        matches!(
            self,
            Error::InvalidCalendarUrl(_)
                | Error::InvalidCalendarFormat(_)
                | Error::UnsupportedCalendarFile(_)
        )
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type CalendarResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create fetch errors
pub fn fetch_error(message: &str) -> Error {
    Error::Fetch(message.to_string())
}

/// Helper to create sync errors
pub fn sync_error(message: &str) -> Error {
    Error::Sync(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
