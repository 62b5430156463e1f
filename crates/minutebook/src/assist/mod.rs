//! Assist/review adapter.
//!
//! Produces the cleaned-up agenda, decisions, executive summary and list of
//! outstanding issues the document is built from. With an [`Improver`]
//! configured the text goes through the external service first; without
//! one, or when that call fails in any way, the result is computed locally.
//! Which branch ran is reported in [`AssistResult::mode`].

pub mod client;
pub mod issues;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::record::{normalize_agenda, normalize_decisions, AgendaItem, Decision, MinutesRecord};
use crate::text::normalize;

pub use client::{HttpImprover, Improver};
pub use issues::{basic_summary, compute_issues};

/// Meeting fields sent alongside the items for context and issue checks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(missing_docs)]
pub struct MeetingMetadata {
    #[serde(rename = "meetingTitle")]
    pub title: String,
    #[serde(rename = "meetingDate")]
    pub date: String,
    #[serde(rename = "meetingTime")]
    pub time: String,
    #[serde(rename = "meetingLocation")]
    pub location: String,
    #[serde(rename = "meetingType")]
    pub meeting_type: String,
    pub department: String,
    pub chairman: String,
    pub secretary: String,
}

impl MeetingMetadata {
    /// Metadata of an existing record.
    #[must_use]
    pub fn from_record(record: &MinutesRecord) -> Self {
        Self {
            title: record.title.clone(),
            date: record.date.clone(),
            time: record.time.clone(),
            location: record.location.clone(),
            meeting_type: record.meeting_type.to_string(),
            department: record.department.clone(),
            chairman: record.chairman.clone(),
            secretary: record.secretary.clone(),
        }
    }

    fn normalized(&self) -> Self {
        Self {
            title: normalize(&self.title),
            date: self.date.trim().to_string(),
            time: self.time.trim().to_string(),
            location: normalize(&self.location),
            meeting_type: normalize(&self.meeting_type),
            department: normalize(&self.department),
            chairman: normalize(&self.chairman),
            secretary: normalize(&self.secretary),
        }
    }
}

/// Input of one review.
///
/// On the wire the metadata fields sit next to the item lists. A body that
/// carries none of them deserializes with `metadata: None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "AssistRequestBody")]
pub struct AssistRequest {
    /// Meeting fields, when the caller has them.
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MeetingMetadata>,
    /// Agenda in recorded order.
    pub agenda_items: Vec<AgendaItem>,
    /// Decisions in recorded order.
    pub decisions: Vec<Decision>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct AssistRequestBody {
    #[serde(alias = "title")]
    meeting_title: Option<String>,
    #[serde(alias = "date")]
    meeting_date: Option<String>,
    #[serde(alias = "time")]
    meeting_time: Option<String>,
    #[serde(alias = "location")]
    meeting_location: Option<String>,
    #[serde(alias = "type")]
    meeting_type: Option<String>,
    department: Option<String>,
    chairman: Option<String>,
    secretary: Option<String>,
    agenda_items: Vec<AgendaItem>,
    decisions: Vec<Decision>,
}

impl From<AssistRequestBody> for AssistRequest {
    fn from(body: AssistRequestBody) -> Self {
        let fields = [
            body.meeting_title,
            body.meeting_date,
            body.meeting_time,
            body.meeting_location,
            body.meeting_type,
            body.department,
            body.chairman,
            body.secretary,
        ];
        let metadata = fields.iter().any(Option::is_some).then(|| {
            let [title, date, time, location, meeting_type, department, chairman, secretary] =
                fields.map(Option::unwrap_or_default);
            MeetingMetadata {
                title,
                date,
                time,
                location,
                meeting_type,
                department,
                chairman,
                secretary,
            }
        });
        Self {
            metadata,
            agenda_items: body.agenda_items,
            decisions: body.decisions,
        }
    }
}

impl AssistRequest {
    /// A request covering the whole record.
    #[must_use]
    pub fn from_record(record: &MinutesRecord) -> Self {
        Self {
            metadata: Some(MeetingMetadata::from_record(record)),
            agenda_items: record.agenda_items.clone(),
            decisions: record.decisions.clone(),
        }
    }

    fn normalized(&self) -> Self {
        Self {
            metadata: self.metadata.as_ref().map(MeetingMetadata::normalized),
            agenda_items: normalize_agenda(&self.agenda_items),
            decisions: normalize_decisions(&self.decisions),
        }
    }
}

/// Which branch produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistMode {
    /// Computed locally.
    Basic,
    /// Produced by the external service.
    External,
}

impl std::fmt::Display for AssistMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::External => write!(f, "external"),
        }
    }
}

/// Output of one review. Always complete, whichever branch ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistResult {
    /// Cleaned agenda, same order as the input.
    pub agenda_items: Vec<AgendaItem>,
    /// Cleaned decisions, same order as the input.
    pub decisions: Vec<Decision>,
    /// Summary paragraph, if one could be produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executive_summary: Option<String>,
    /// Human-readable list of missing information.
    pub issues: Vec<String>,
    /// Which branch produced this result.
    pub mode: AssistMode,
}

/// The review adapter.
#[derive(Debug, Clone)]
pub struct Assistant {
    improver: Option<Arc<dyn Improver>>,
    timeout: Duration,
}

impl Default for Assistant {
    fn default() -> Self {
        Self::basic()
    }
}

impl Assistant {
    /// An adapter that never leaves the process.
    #[must_use]
    pub fn basic() -> Self {
        Self {
            improver: None,
            timeout: Duration::from_secs(20),
        }
    }

    /// An adapter backed by `improver`, bounded by `timeout` per request.
    #[must_use]
    pub fn with_improver(improver: Arc<dyn Improver>, timeout: Duration) -> Self {
        Self {
            improver: Some(improver),
            timeout,
        }
    }

    /// Build the adapter the configuration asks for.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &Config) -> Result<Self> {
        if !config.external_assist_enabled() {
            debug!("External text improvement disabled; using basic mode");
            return Ok(Self::basic());
        }
        let improver = HttpImprover::new(&config.assist)?;
        Ok(Self::with_improver(Arc::new(improver), config.assist_timeout()))
    }

    /// Whether an external service is configured.
    #[must_use]
    pub fn has_improver(&self) -> bool {
        self.improver.is_some()
    }

    /// Review the request.
    ///
    /// Never fails: any problem with the external branch degrades to
    /// [`review_basic`](Self::review_basic).
    pub async fn review(&self, request: &AssistRequest) -> AssistResult {
        let Some(improver) = &self.improver else {
            return Self::review_basic(request);
        };

        let normalized = request.normalized();
        match self.review_external(improver.as_ref(), &normalized).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Text improvement failed; falling back to basic mode");
                Self::review_basic(&normalized)
            }
        }
    }

    /// The local branch: normalize, detect issues, synthesize a summary.
    #[must_use]
    pub fn review_basic(request: &AssistRequest) -> AssistResult {
        let normalized = request.normalized();
        let issues = compute_issues(
            normalized.metadata.as_ref(),
            &normalized.agenda_items,
            &normalized.decisions,
        );
        let executive_summary = basic_summary(
            normalized.metadata.as_ref().map(|m| m.title.as_str()),
            normalized.agenda_items.len(),
            normalized.decisions.len(),
        );
        AssistResult {
            agenda_items: normalized.agenda_items,
            decisions: normalized.decisions,
            executive_summary,
            issues,
            mode: AssistMode::Basic,
        }
    }

    async fn review_external(&self, improver: &dyn Improver, request: &AssistRequest) -> Result<AssistResult> {
        let payload = serde_json::to_value(request)?;
        let text = tokio::time::timeout(self.timeout, improver.improve(&payload))
            .await
            .map_err(|_| Error::Timeout {
                operation: "text-improvement request".to_string(),
            })??;
        let result = parse_response(&text, request.metadata.as_ref())?;
        debug!(issues = result.issues.len(), "Text improvement succeeded");
        Ok(result)
    }
}

/// Interpret the service's answer.
///
/// The whole text is tried as JSON first, then the span from the first `{`
/// to the last `}`. The object must carry `agendaItems` and `decisions`
/// arrays; `issues` is recomputed locally when absent.
///
/// # Errors
///
/// Returns an external service error for anything that does not fit.
pub fn parse_response(text: &str, metadata: Option<&MeetingMetadata>) -> Result<AssistResult> {
    let value = extract_json(text).ok_or_else(|| Error::external("no JSON object in response"))?;

    let agenda_items: Vec<AgendaItem> = match value.get("agendaItems") {
        Some(items @ Value::Array(_)) => serde_json::from_value(items.clone())
            .map_err(|e| Error::external(format!("malformed agendaItems: {e}")))?,
        _ => return Err(Error::external("response lacks an agendaItems array")),
    };
    let decisions: Vec<Decision> = match value.get("decisions") {
        Some(items @ Value::Array(_)) => serde_json::from_value(items.clone())
            .map_err(|e| Error::external(format!("malformed decisions: {e}")))?,
        _ => return Err(Error::external("response lacks a decisions array")),
    };

    let agenda_items = normalize_agenda(&agenda_items);
    let decisions = normalize_decisions(&decisions);

    let executive_summary = match value.get("executiveSummary") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(normalize(s)).filter(|s| !s.is_empty()),
        Some(_) => return Err(Error::external("executiveSummary is not a string")),
    };

    let issues = match value.get("issues") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(normalize)
            .filter(|s| !s.is_empty())
            .collect(),
        _ => compute_issues(metadata, &agenda_items, &decisions),
    };

    Ok(AssistResult {
        agenda_items,
        decisions,
        executive_summary,
        issues,
        mode: AssistMode::External,
    })
}

fn extract_json(text: &str) -> Option<Value> {
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(text) {
        return Some(value);
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    #[derive(Debug)]
    struct Canned(std::result::Result<&'static str, &'static str>);

    #[async_trait]
    impl Improver for Canned {
        async fn improve(&self, _input: &Value) -> Result<String> {
            self.0.map(str::to_string).map_err(Error::external)
        }
    }

    #[derive(Debug)]
    struct Slow;

    #[async_trait]
    impl Improver for Slow {
        async fn improve(&self, _input: &Value) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("{}".to_string())
        }
    }

    #[derive(Debug, Default)]
    struct Recording(std::sync::Mutex<Option<Value>>);

    #[async_trait]
    impl Improver for Recording {
        async fn improve(&self, input: &Value) -> Result<String> {
            if let Ok(mut slot) = self.0.lock() {
                *slot = Some(input.clone());
            }
            Err(Error::external("recorded"))
        }
    }

    fn assistant(improver: impl Improver + 'static) -> Assistant {
        Assistant::with_improver(Arc::new(improver), Duration::from_millis(200))
    }

    fn request() -> AssistRequest {
        AssistRequest {
            metadata: None,
            agenda_items: vec![AgendaItem {
                item: String::new(),
                speaker: "x".to_string(),
            }],
            decisions: vec![],
        }
    }

    #[tokio::test]
    async fn test_basic_mode_reports_empty_agenda_item() {
        let result = Assistant::basic().review(&request()).await;

        assert_eq!(result.mode, AssistMode::Basic);
        assert!(result.issues.iter().any(|i| i.contains("Agenda item 1")));
        assert!(!result.issues.iter().any(|i| i.contains("Speaker")));
    }

    #[test]
    fn test_body_without_metadata_reports_only_item_issues() {
        let request: AssistRequest =
            serde_json::from_str(r#"{"agendaItems":[{"item":"","speaker":"x"}]}"#).unwrap();
        assert!(request.metadata.is_none());

        let result = Assistant::review_basic(&request);
        assert_eq!(result.issues, vec!["Agenda item 1 is empty.".to_string()]);
    }

    #[test]
    fn test_body_with_some_metadata_checks_all_fields() {
        let request: AssistRequest = serde_json::from_str(
            r#"{"title":"Budget","meetingDate":"2024-12-24","agendaItems":[],"decisions":[]}"#,
        )
        .unwrap();
        let metadata = request.metadata.as_ref().unwrap();
        assert_eq!(metadata.title, "Budget");
        assert_eq!(metadata.date, "2024-12-24");

        let result = Assistant::review_basic(&request);
        assert!(!result.issues.contains(&"Meeting title is not specified.".to_string()));
        assert!(result.issues.contains(&"Meeting time is not specified.".to_string()));
        assert!(result.issues.contains(&"Secretary name is not specified.".to_string()));
    }

    #[test]
    fn test_request_json_round_trip_keeps_absent_metadata() {
        let text = serde_json::to_string(&request()).unwrap();
        let back: AssistRequest = serde_json::from_str(&text).unwrap();
        assert_eq!(back, request());
    }

    #[test]
    fn test_basic_normalizes_and_summarizes() {
        let request = AssistRequest {
            metadata: Some(MeetingMetadata {
                title: " Budget   review ".to_string(),
                ..MeetingMetadata::default()
            }),
            agenda_items: vec![AgendaItem {
                item: "sales ,q4".to_string(),
                speaker: "Khalid".to_string(),
            }],
            decisions: vec![],
        };
        let result = Assistant::review_basic(&request);

        assert_eq!(result.agenda_items[0].item, "sales, q4");
        assert_eq!(
            result.executive_summary.as_deref(),
            Some("A meeting was held titled: Budget review. 1 agenda items were discussed.")
        );
        assert!(result.issues.contains(&"Meeting date is not specified.".to_string()));
    }

    #[test]
    fn test_basic_without_content_has_no_summary() {
        let result = Assistant::review_basic(&AssistRequest::default());
        assert!(result.executive_summary.is_none());
        assert!(result.issues.is_empty());
    }

    #[tokio::test]
    async fn test_external_response_wrapped_in_prose() {
        let improver = Canned(Ok(
            "Sure! Here it is:\n{\"agendaItems\":[{\"item\":\"Sales review\",\"speaker\":\"Khalid\"}],\
             \"decisions\":[],\"executiveSummary\":\"Sales were reviewed.\",\"issues\":[]}\nThanks",
        ));
        let result = assistant(improver).review(&request()).await;

        assert_eq!(result.mode, AssistMode::External);
        assert_eq!(result.agenda_items[0].item, "Sales review");
        assert_eq!(result.executive_summary.as_deref(), Some("Sales were reviewed."));
        assert!(result.issues.is_empty());
    }

    #[tokio::test]
    async fn test_external_missing_issues_are_computed() {
        let improver = Canned(Ok(r#"{"agendaItems":[{"item":"","speaker":"x"}],"decisions":[]}"#));
        let result = assistant(improver).review(&request()).await;

        assert_eq!(result.mode, AssistMode::External);
        assert_eq!(result.issues, vec!["Agenda item 1 is empty.".to_string()]);
        assert!(result.executive_summary.is_none());
    }

    #[tokio::test]
    async fn test_malformed_response_falls_back() {
        let result = assistant(Canned(Ok("I cannot help with that."))).review(&request()).await;
        assert_eq!(result.mode, AssistMode::Basic);
        assert_eq!(result.agenda_items.len(), 1);
    }

    #[tokio::test]
    async fn test_wrong_shape_falls_back() {
        let improver = Canned(Ok(r#"{"agendaItems":"none","decisions":[]}"#));
        let result = assistant(improver).review(&request()).await;
        assert_eq!(result.mode, AssistMode::Basic);
    }

    #[tokio::test]
    async fn test_service_error_falls_back() {
        let result = assistant(Canned(Err("HTTP 502"))).review(&request()).await;
        assert_eq!(result.mode, AssistMode::Basic);
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let result = assistant(Slow).review(&request()).await;
        assert_eq!(result.mode, AssistMode::Basic);
    }

    #[tokio::test]
    async fn test_payload_is_normalized_with_flat_metadata() {
        let recording = Arc::new(Recording::default());
        let assistant = Assistant::with_improver(recording.clone(), Duration::from_secs(1));
        let request = AssistRequest {
            metadata: Some(MeetingMetadata {
                title: "  Budget ".to_string(),
                ..MeetingMetadata::default()
            }),
            ..request()
        };
        let result = assistant.review(&request).await;
        assert_eq!(result.mode, AssistMode::Basic);

        let payload = recording.0.lock().unwrap().clone().unwrap();
        assert_eq!(payload["meetingTitle"], "Budget");
        assert_eq!(payload["agendaItems"][0]["speaker"], "x");
    }

    #[test]
    fn test_extract_json() {
        assert!(extract_json("{}").is_some());
        assert!(extract_json("text {\"a\":1} more").is_some());
        assert!(extract_json("} backwards {").is_none());
        assert!(extract_json("[1,2]").is_none());
    }

    #[test]
    fn test_from_config_without_key_is_basic() {
        let assistant = Assistant::from_config(&Config::default()).unwrap();
        assert!(!assistant.has_improver());
    }
}
