use super::models::{looks_like_ics, validate_calendar_url, CalendarFile, ImportSummary};
use super::SyncAdapter;
use crate::components::calendar_view::models::{CalendarEvent, QueryRange};
use crate::config::Config;
use crate::error::{fetch_error, sync_error, CalendarResult, Error};
use crate::utils::time::format_iso_date;
use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::Url;

const CALENDAR_PATH: &str = "events/calendar";
const UNIVERSITY_SYNC_PATH: &str = "events/calendar/university-sync";
const UPLOAD_PATH: &str = "calendar/upload";
const EXPORT_PATH: &str = "events/calendar/export";

/// HTTP implementation of the sync adapter against the Club-Hub backend
#[derive(Clone)]
pub struct BackendClient {
    base_url: Url,
    token: Option<String>,
    client: Client,
}

impl BackendClient {
    /// Create a client from the loaded configuration
    pub fn new(config: &Config) -> CalendarResult<Self> {
        Ok(Self::with_base_url(config.api_url()?, config.api_token.clone()))
    }

    pub fn with_base_url(base_url: Url, token: Option<String>) -> Self {
        Self {
            base_url,
            token,
            client: Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> CalendarResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("Failed to build URL for {}: {}", path, e)))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl SyncAdapter for BackendClient {
    async fn fetch_range(&self, range: QueryRange) -> CalendarResult<Vec<CalendarEvent>> {
        let mut url = self.endpoint(CALENDAR_PATH)?;
        url.query_pairs_mut()
            .append_pair("start_date", &format_iso_date(range.start))
            .append_pair("end_date", &format_iso_date(range.end));

        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| fetch_error(&format!("Failed to fetch events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = error_message(response).await;
            return Err(fetch_error(&format!(
                "Failed to fetch events: HTTP {} - {}",
                status, message
            )));
        }

        let records: Vec<Value> = response
            .json()
            .await
            .map_err(|e| fetch_error(&format!("Failed to parse events response: {}", e)))?;

        let events = parse_event_records(records);
        debug!(%range, count = events.len(), "Fetched calendar events");
        Ok(events)
    }

    async fn import_by_url(&self, url: &str) -> CalendarResult<ImportSummary> {
        let calendar_url = validate_calendar_url(url)?;
        let body = json!({
            "calendar_url": calendar_url.as_str(),
            "type": "ical",
        });

        let response = self
            .authorize(self.client.post(self.endpoint(UNIVERSITY_SYNC_PATH)?))
            .json(&body)
            .send()
            .await
            .map_err(|e| sync_error(&format!("Failed to import calendar: {}", e)))?;

        let summary = import_response(response).await?;
        info!(url = %calendar_url, events_found = summary.events_found, "Imported calendar feed");
        Ok(summary)
    }

    async fn import_by_file(&self, file: CalendarFile) -> CalendarResult<ImportSummary> {
        file.validate()?;

        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str("text/calendar")
            .map_err(|e| sync_error(&format!("Failed to build upload: {}", e)))?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("name", file.display_name.clone());

        let response = self
            .authorize(self.client.post(self.endpoint(UPLOAD_PATH)?))
            .multipart(form)
            .send()
            .await
            .map_err(|e| sync_error(&format!("Failed to upload calendar: {}", e)))?;

        let summary = import_response(response).await?;
        info!(file = %file.file_name, events_found = summary.events_found, "Uploaded calendar file");
        Ok(summary)
    }

    async fn disconnect(&self) -> CalendarResult<()> {
        let response = self
            .authorize(self.client.delete(self.endpoint(UNIVERSITY_SYNC_PATH)?))
            .send()
            .await
            .map_err(|e| sync_error(&format!("Failed to disconnect calendar: {}", e)))?;

        let status = response.status();
        // Nothing attached is the state we wanted anyway
        if status.is_success() || status == StatusCode::NOT_FOUND {
            return Ok(());
        }
        let message = error_message(response).await;
        Err(sync_error(&format!(
            "Failed to disconnect calendar: HTTP {} - {}",
            status, message
        )))
    }

    async fn export_registered(&self) -> CalendarResult<Vec<u8>> {
        let response = self
            .authorize(self.client.get(self.endpoint(EXPORT_PATH)?))
            .send()
            .await
            .map_err(|e| sync_error(&format!("Failed to export events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = error_message(response).await;
            return Err(sync_error(&format!(
                "Failed to export events: HTTP {} - {}",
                status, message
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| sync_error(&format!("Failed to read export: {}", e)))?;
        if !looks_like_ics(&bytes) {
            return Err(Error::InvalidCalendarFormat(
                "export response is not an iCal document".to_string(),
            ));
        }
        Ok(bytes.to_vec())
    }
}

/// Decode records one by one so a single bad record does not lose the rest
fn parse_event_records(records: Vec<Value>) -> Vec<CalendarEvent> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value::<CalendarEvent>(record) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!("Dropping malformed calendar record: {}", e);
                None
            }
        })
        .collect()
}

/// Map an import response to a summary or to the most specific error
async fn import_response(response: Response) -> CalendarResult<ImportSummary> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<ImportSummary>()
            .await
            .map_err(|e| sync_error(&format!("Failed to parse import response: {}", e)));
    }

    let message = error_message(response).await;
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            Err(Error::InvalidCalendarFormat(message))
        }
        StatusCode::UNSUPPORTED_MEDIA_TYPE => Err(Error::UnsupportedCalendarFile(message)),
        _ => Err(sync_error(&format!(
            "Calendar import failed: HTTP {} - {}",
            status, message
        ))),
    }
}

/// Pull `error` or `msg` out of a JSON error body, falling back to the raw text
async fn error_message(response: Response) -> String {
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response".to_string());

    serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|value| {
            ["error", "msg", "message"]
                .iter()
                .find_map(|field| value.get(*field).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or(body)
}
