use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;

use super::{CalendarError, CalendarProvider};
use crate::models::CalendarEvent;
use crate::services::http;

const CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3/calendars";
const RFC3339_LOCAL: &str = "%Y-%m-%dT%H:%M:%S";

/// Google Calendar v3 over REST with a pre-issued OAuth access token.
pub struct GoogleCalendar {
    calendar_id: String,
    access_token: String,
    client: reqwest::Client,
}

impl GoogleCalendar {
    pub fn new(calendar_id: String, access_token: String, timeout: Duration) -> Self {
        Self {
            calendar_id,
            access_token,
            client: http::client(timeout),
        }
    }

    fn events_url(&self) -> String {
        format!("{CALENDAR_API_URL}/{}/events", self.calendar_id)
    }
}

fn unavailable(context: &str, err: impl std::fmt::Display) -> CalendarError {
    CalendarError::Unavailable(format!("{context}: {err:#}"))
}

#[async_trait]
impl CalendarProvider for GoogleCalendar {
    async fn insert_event(&self, event: &CalendarEvent) -> Result<String, CalendarError> {
        let body = json!({
            "summary": event.summary,
            "description": event.description,
            "start": {
                "dateTime": event.start.format(RFC3339_LOCAL).to_string(),
                "timeZone": event.time_zone,
            },
            "end": {
                "dateTime": event.end.format(RFC3339_LOCAL).to_string(),
                "timeZone": event.time_zone,
            },
        });

        let request = self
            .client
            .post(self.events_url())
            .bearer_auth(&self.access_token)
            .json(&body);

        let resp = http::send_with_retry(request)
            .await
            .map_err(|e| unavailable("failed to call Google Calendar", e))?;

        let status = resp.status();
        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| unavailable("failed to parse Google Calendar response", e))?;

        if !status.is_success() {
            return Err(CalendarError::Unavailable(format!(
                "Google Calendar insert failed ({status}): {data}"
            )));
        }

        data["id"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| CalendarError::Unavailable("missing id in Google Calendar response".to_string()))
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), CalendarError> {
        let request = self
            .client
            .delete(format!("{}/{event_id}", self.events_url()))
            .bearer_auth(&self.access_token);

        let resp = http::send_with_retry(request)
            .await
            .map_err(|e| unavailable("failed to call Google Calendar", e))?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            // 410 Gone: already deleted.
            Err(CalendarError::NotFound)
        } else {
            Err(CalendarError::Unavailable(format!(
                "Google Calendar delete failed ({status})"
            )))
        }
    }
}
