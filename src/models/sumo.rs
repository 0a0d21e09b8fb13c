use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Timestamp layout the Search Job API accepts for `from`/`to` when the zone
/// travels separately in `timeZone`.
pub const SEARCH_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Body of `POST search/jobs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub from: String,
    pub to: String,
    #[serde(rename = "timeZone")]
    pub time_zone: String,
}

impl SearchRequest {
    pub fn new(
        query: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        time_zone: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            from: from.into(),
            to: to.into(),
            time_zone: time_zone.into(),
        }
    }

    /// Builds a request from two instants, rendering both in their own zone's
    /// wall-clock time.
    pub fn between<Tz: TimeZone>(
        query: impl Into<String>,
        from: &DateTime<Tz>,
        to: &DateTime<Tz>,
        time_zone: impl Into<String>,
    ) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self::new(
            query,
            from.format(SEARCH_TIME_FORMAT).to_string(),
            to.format(SEARCH_TIME_FORMAT).to_string(),
            time_zone,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobLink {
    #[serde(default)]
    pub rel: String,
    #[serde(default)]
    pub href: String,
}

/// Response to `POST search/jobs`. On a 400 the same shape carries the error
/// `code` and `message` and no `id`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchJob {
    #[serde(default)]
    pub status: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<JobLink>,
}

/// Vendor-documented meaning of every known job state.
pub const JOB_STATE_DESCRIPTIONS: [(&str, &str); 5] = [
    ("NOT STARTED", "Search job has not been started yet."),
    (
        "GATHERING RESULTS",
        "Search job is still gathering more results, however results might already be available.",
    ),
    (
        "FORCE PAUSED",
        "Query that is paused by the system. It is true only for non-aggregate queries that are paused at the limit of 100k. This limit is dynamic and may vary from customer to customer.",
    ),
    (
        "DONE GATHERING RESULTS",
        "Search job is done gathering results; the entire specified time range has been covered.",
    ),
    ("CANCELED", "The search job has been canceled."),
];

/// State reported by `GET search/jobs/{id}`.
///
/// Strings the server sends that are not one of the documented states are kept
/// in [`JobState::Other`] so nothing is lost on the way through.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobState {
    NotStarted,
    GatheringResults,
    ForcePaused,
    DoneGatheringResults,
    Canceled,
    Other(String),
}

impl JobState {
    pub fn as_str(&self) -> &str {
        match self {
            JobState::NotStarted => "NOT STARTED",
            JobState::GatheringResults => "GATHERING RESULTS",
            JobState::ForcePaused => "FORCE PAUSED",
            JobState::DoneGatheringResults => "DONE GATHERING RESULTS",
            JobState::Canceled => "CANCELED",
            JobState::Other(s) => s,
        }
    }

    /// True once the job will not gather any more messages.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::DoneGatheringResults | JobState::ForcePaused | JobState::Canceled
        )
    }

    pub fn description(&self) -> Option<&'static str> {
        let key = self.as_str();
        JOB_STATE_DESCRIPTIONS
            .iter()
            .find(|(state, _)| *state == key)
            .map(|(_, description)| *description)
    }
}

impl From<String> for JobState {
    fn from(s: String) -> Self {
        match s.as_str() {
            "NOT STARTED" => JobState::NotStarted,
            "GATHERING RESULTS" => JobState::GatheringResults,
            "FORCE PAUSED" => JobState::ForcePaused,
            "DONE GATHERING RESULTS" => JobState::DoneGatheringResults,
            "CANCELED" => JobState::Canceled,
            _ => JobState::Other(s),
        }
    }
}

impl From<JobState> for String {
    fn from(state: JobState) -> Self {
        match state {
            JobState::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramBucket {
    #[serde(default)]
    pub length: i64,
    #[serde(default)]
    pub count: u64,
    #[serde(rename = "startTimeStamp", alias = "startTimestamp", default)]
    pub start_timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchJobStatus {
    pub state: JobState,
    #[serde(rename = "messageCount", default)]
    pub message_count: u64,
    #[serde(rename = "histogramBuckets", default)]
    pub histogram_buckets: Vec<HistogramBucket>,
    #[serde(rename = "recordCount", default)]
    pub record_count: u64,
    #[serde(rename = "pendingWarnings", default)]
    pub pending_warnings: Vec<String>,
    #[serde(rename = "pendingErrors", default)]
    pub pending_errors: Vec<String>,
}

/// One page request into a job's messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultsRequest {
    #[serde(rename = "searchJobId")]
    pub job_id: String,
    pub offset: u64,
    pub limit: u64,
}

impl SearchResultsRequest {
    pub fn new(job_id: impl Into<String>, offset: u64, limit: u64) -> Self {
        Self {
            job_id: job_id.into(),
            offset,
            limit,
        }
    }

    /// Cursor for the page that follows this one.
    pub fn next_page(&self) -> Self {
        Self {
            job_id: self.job_id.clone(),
            offset: self.offset.saturating_add(self.limit),
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultField {
    pub name: String,
    #[serde(rename = "fieldType", default)]
    pub field_type: String,
    #[serde(rename = "keyField", default)]
    pub key_field: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResultMessage {
    #[serde(default)]
    pub map: Map<String, Value>,
}

impl SearchResultMessage {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    pub fn raw(&self) -> Option<&str> {
        self.map.get("_raw").and_then(Value::as_str)
    }

    pub fn message_id(&self) -> Option<&str> {
        self.map.get("_messageid").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub fields: Vec<SearchResultField>,
    #[serde(default)]
    pub messages: Vec<SearchResultMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_search_request_wire_names() {
        let req = SearchRequest::new(
            "_sourceCategory=test",
            "2024-01-01T00:00:00",
            "2024-01-01T01:00:00",
            "PST",
        );
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "query": "_sourceCategory=test",
                "from": "2024-01-01T00:00:00",
                "to": "2024-01-01T01:00:00",
                "timeZone": "PST"
            })
        );
    }

    #[test]
    fn test_search_request_between_formats_instants() {
        let from = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap();
        let req = SearchRequest::between("error", &from, &to, "UTC");
        assert_eq!(req.from, "2024-03-05T07:08:09");
        assert_eq!(req.to, "2024-03-05T08:00:00");
        assert_eq!(req.time_zone, "UTC");
    }

    #[test]
    fn test_job_state_preserves_server_string() {
        for (state, _) in JOB_STATE_DESCRIPTIONS {
            let parsed: JobState = serde_json::from_value(json!(state)).unwrap();
            assert_eq!(parsed.as_str(), state);
            assert!(!matches!(parsed, JobState::Other(_)));
            assert_eq!(serde_json::to_value(&parsed).unwrap(), json!(state));
        }

        let odd: JobState = serde_json::from_value(json!("SOMETHING NEW")).unwrap();
        assert_eq!(odd, JobState::Other("SOMETHING NEW".to_string()));
        assert_eq!(odd.to_string(), "SOMETHING NEW");
        assert!(odd.description().is_none());
    }

    #[test]
    fn test_job_state_terminal() {
        assert!(!JobState::NotStarted.is_terminal());
        assert!(!JobState::GatheringResults.is_terminal());
        assert!(JobState::ForcePaused.is_terminal());
        assert!(JobState::DoneGatheringResults.is_terminal());
        assert!(JobState::Canceled.is_terminal());
        assert!(!JobState::Other("X".into()).is_terminal());
    }

    #[test]
    fn test_job_state_description() {
        assert_eq!(
            JobState::Canceled.description(),
            Some("The search job has been canceled.")
        );
    }

    #[test]
    fn test_status_defaults_missing_fields() {
        let status: SearchJobStatus =
            serde_json::from_value(json!({ "state": "GATHERING RESULTS" })).unwrap();
        assert_eq!(status.state, JobState::GatheringResults);
        assert_eq!(status.message_count, 0);
        assert!(status.histogram_buckets.is_empty());
        assert!(status.pending_errors.is_empty());
    }

    #[test]
    fn test_histogram_bucket_accepts_both_spellings() {
        let a: HistogramBucket = serde_json::from_value(json!({
            "length": 60000, "count": 3, "startTimeStamp": 1359404820000i64
        }))
        .unwrap();
        let b: HistogramBucket = serde_json::from_value(json!({
            "length": 60000, "count": 3, "startTimestamp": 1359404820000i64
        }))
        .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.start_timestamp, 1_359_404_820_000);
    }

    #[test]
    fn test_search_job_without_id() {
        let job: SearchJob = serde_json::from_value(json!({
            "status": 400,
            "code": "searchjob.invalid.timestamp.from",
            "message": "The 'from' field contains an invalid time."
        }))
        .unwrap();
        assert!(job.id.is_none());
        assert_eq!(job.code, "searchjob.invalid.timestamp.from");
    }

    #[test]
    fn test_results_request_next_page() {
        let page = SearchResultsRequest::new("abc", 0, 100).next_page();
        assert_eq!(page.offset, 100);
        assert_eq!(page.limit, 100);
        assert_eq!(page.job_id, "abc");
    }

    #[test]
    fn test_results_request_next_page_saturates() {
        let page = SearchResultsRequest::new("abc", u64::MAX - 10, 100).next_page();
        assert_eq!(page.offset, u64::MAX);
        assert_eq!(page.limit, 100);
    }

    #[test]
    fn test_message_helpers() {
        let msg: SearchResultMessage = serde_json::from_value(json!({
            "map": { "_messageid": "-9223372036854773763", "_raw": "hello", "_size": "5" }
        }))
        .unwrap();
        assert_eq!(msg.raw(), Some("hello"));
        assert_eq!(msg.message_id(), Some("-9223372036854773763"));
        assert_eq!(msg.get("_size"), Some(&json!("5")));
    }
}
