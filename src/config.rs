use crate::components::calendar_view::models::ViewMode;
use crate::error::{config_error, env_error, CalendarResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;
use url::Url;

/// Default background refresh interval of the host, in seconds
pub const DEFAULT_REFRESH_SECS: u64 = 30;

/// Component toggles, merged over the defaults when present
pub const COMPONENTS_FILE: &str = "config/components.toml";

/// Main configuration structure for the calendar host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the Club-Hub backend API
    pub api_base_url: String,
    /// Bearer token for backend calls
    pub api_token: Option<String>,
    /// Timezone used to decide which calendar date is "today"
    pub timezone: String,
    /// Background refresh interval in seconds
    pub refresh_interval_secs: u64,
    /// View mode a dashboard starts in
    pub default_view: ViewMode,
    /// Directory exported .ics files are written to
    pub export_dir: PathBuf,
    /// Map of component names to their enabled status
    pub components: HashMap<String, bool>,
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> CalendarResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let api_base_url =
            env::var("CLUBHUB_API_URL").map_err(|_| env_error("CLUBHUB_API_URL"))?;
        let api_token = env::var("CLUBHUB_TOKEN").ok().filter(|t| !t.trim().is_empty());
        let timezone = env::var("TIMEZONE").unwrap_or_else(|_| String::from("UTC"));

        let refresh_interval_secs = match env::var("CALENDAR_REFRESH_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| config_error("Invalid CALENDAR_REFRESH_SECS format"))?,
            Err(_) => DEFAULT_REFRESH_SECS,
        };

        let default_view = match env::var("CALENDAR_DEFAULT_VIEW") {
            Ok(raw) => ViewMode::from_key(&raw)
                .ok_or_else(|| config_error(&format!("Unknown view mode: {}", raw)))?,
            Err(_) => ViewMode::Month,
        };

        let export_dir = env::var("CALENDAR_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let mut components = default_components();
        if let Ok(content) = fs::read_to_string(COMPONENTS_FILE) {
            merge_components(&mut components, &content)?;
        }

        let config = Config {
            api_base_url,
            api_token,
            timezone,
            refresh_interval_secs,
            default_view,
            export_dir,
            components,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check values that would otherwise only fail at first use
    pub fn validate(&self) -> CalendarResult<()> {
        self.api_url()?;
        self.timezone()?;
        if self.refresh_interval_secs == 0 {
            return Err(config_error("CALENDAR_REFRESH_SECS must be greater than zero"));
        }
        Ok(())
    }

    /// Parsed backend base URL, always ending in a slash so joins stay below it
    pub fn api_url(&self) -> CalendarResult<Url> {
        let mut raw = self.api_base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).map_err(|e| config_error(&format!("Invalid CLUBHUB_API_URL: {}", e)))
    }

    /// Parsed timezone
    pub fn timezone(&self) -> CalendarResult<Tz> {
        self.timezone
            .trim()
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Invalid timezone: {}", self.timezone)))
    }

    /// Check if a component is enabled
    pub fn is_component_enabled(&self, name: &str) -> bool {
        *self.components.get(name).unwrap_or(&false)
    }
}

fn default_components() -> HashMap<String, bool> {
    let mut components = HashMap::new();
    components.insert("participant_calendar".to_string(), true);
    components.insert("university_calendar".to_string(), true);
    components
}

/// Merge component toggles from TOML text over the current map
fn merge_components(components: &mut HashMap<String, bool>, content: &str) -> CalendarResult<()> {
    let file_components = toml::from_str::<HashMap<String, bool>>(content)?;
    for (key, value) in file_components {
        components.insert(key, value);
    }
    Ok(())
}
