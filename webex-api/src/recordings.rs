use crate::time_ranges::TimeWindow;
use crate::{ApiError, WebexClient};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One recording's metadata, exactly as returned by the recording report endpoint.
pub type RecordingRow = Map<String, Value>;

/// Webex caps `max` at 100 items per page for the recording report.
const PAGE_SIZE: &str = "100";

/// An access event from the recording access detail endpoint.
/// Webex documentation: https://developer.webex.com/docs/api/v1/recording-report
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingAccess {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub access_time: String,
    #[serde(default)]
    pub downloaded: bool,
    #[serde(default)]
    pub viewed: bool,
}

/// A flattened row of the detailed recording report: who accessed which recording, and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingAccessRow {
    pub recording_id: String,
    pub topic: String,
    pub time_recorded: String,
    pub requestor_name: String,
    pub requestor_email: String,
    pub access_time: String,
    pub downloaded: bool,
    pub viewed: bool,
}

impl RecordingAccessRow {
    pub fn new(recording: &RecordingRow, access: RecordingAccess) -> Self {
        Self {
            recording_id: string_field(recording, "recordingId"),
            topic: string_field(recording, "topic"),
            time_recorded: string_field(recording, "timeRecorded"),
            requestor_name: access.name,
            requestor_email: access.email,
            access_time: access.access_time,
            downloaded: access.downloaded,
            viewed: access.viewed,
        }
    }
}

/// Reads a field of a recording row as text, or an empty string if it is absent.
pub fn string_field(recording: &RecordingRow, key: &str) -> String {
    match recording.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Retrieves the access summary of every recording made during `window`, across all hosts.
/// Webex documentation: https://developer.webex.com/docs/api/v1/recording-report/list-of-recording-audit-report-summaries
pub fn fetch_access_summary(
    client: &WebexClient,
    window: &TimeWindow,
) -> Result<Vec<RecordingRow>, ApiError> {
    let query = [
        ("hostEmail", "all".to_owned()),
        ("from", window.from_param()),
        ("to", window.to_param()),
        ("max", PAGE_SIZE.to_owned()),
    ];
    client.get_paged("recordingReport/accessSummary", &query)
}

/// Retrieves who viewed or downloaded the given recording.
/// Webex documentation: https://developer.webex.com/docs/api/v1/recording-report/get-recording-audit-report-details
pub fn fetch_access_detail(
    client: &WebexClient,
    recording_id: &str,
) -> Result<Vec<RecordingAccess>, ApiError> {
    let query = [
        ("recordingId", recording_id.to_owned()),
        ("max", PAGE_SIZE.to_owned()),
    ];
    client.get_paged("recordingReport/accessDetail", &query)
}
