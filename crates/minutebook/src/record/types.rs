//! Core record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Kind of meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingType {
    /// Regularly scheduled meeting.
    Ordinary,
    /// Meeting called at short notice.
    Emergency,
    /// Recurring review meeting.
    Periodic,
}

impl MeetingType {
    /// Parse a meeting type, accepting the English names in any case and the
    /// Arabic labels used by existing records.
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty or unknown values.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        match value.to_lowercase().as_str() {
            "ordinary" | "عادي" | "عادى" => Ok(Self::Ordinary),
            "emergency" | "طارئ" | "طارىء" => Ok(Self::Emergency),
            "periodic" | "دوري" | "دورى" => Ok(Self::Periodic),
            "" => Err(Error::validation("type", "meeting type is required")),
            _ => Err(Error::validation(
                "type",
                format!("unknown meeting type '{value}' (expected ordinary, emergency or periodic)"),
            )),
        }
    }

    /// Label used in rendered documents.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Ordinary => "Ordinary",
            Self::Emergency => "Emergency",
            Self::Periodic => "Periodic",
        }
    }
}

impl std::fmt::Display for MeetingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ordinary => write!(f, "ordinary"),
            Self::Emergency => write!(f, "emergency"),
            Self::Periodic => write!(f, "periodic"),
        }
    }
}

/// Approval status of a minutes record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Being drafted; nobody has signed.
    #[default]
    Draft,
    /// Signed by the secretary, waiting for the chairman.
    PendingChairman,
    /// Countersigned by the chairman. Terminal.
    Approved,
}

impl Status {
    /// Stored representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingChairman => "pending_chairman",
            Self::Approved => "approved",
        }
    }

    /// Parse the stored representation.
    ///
    /// # Errors
    ///
    /// Returns a validation error for unknown values.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "draft" => Ok(Self::Draft),
            "pending_chairman" => Ok(Self::PendingChairman),
            "approved" => Ok(Self::Approved),
            other => Err(Error::validation("status", format!("unknown status '{other}'"))),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A meeting participant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Attendee {
    /// Full name.
    pub name: String,
    /// Job title or position.
    pub position: String,
    /// Role in the meeting (member, guest, ...).
    pub role: String,
    /// Whether the participant attended.
    pub present: bool,
    /// Optional signature image bytes.
    #[serde(with = "super::image_b64", skip_serializing_if = "Option::is_none")]
    pub signature_image: Option<Vec<u8>>,
}

/// One agenda entry. Its position in the list is its number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgendaItem {
    /// What was discussed.
    pub item: String,
    /// Who presented it.
    pub speaker: String,
}

/// One decision or recommendation, rendered as `D-n`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Decision {
    /// The decision text.
    pub decision: String,
    /// Who is responsible for carrying it out.
    pub responsible: String,
    /// Due date or period.
    pub deadline: String,
}

/// The minutes of one meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinutesRecord {
    /// Archive reference number.
    pub reference_number: String,
    /// Owning department.
    pub department: String,
    /// Organisation name printed in the header.
    pub org_name: String,
    /// Executive summary paragraph.
    pub executive_summary: String,
    /// Meeting title.
    pub title: String,
    /// Meeting date.
    pub date: String,
    /// Meeting start time.
    pub time: String,
    /// Duration in minutes.
    pub duration: String,
    /// Where the meeting took place.
    pub location: String,
    /// Kind of meeting.
    #[serde(rename = "type")]
    pub meeting_type: MeetingType,
    /// Chairman's name.
    pub chairman: String,
    /// Secretary's name.
    pub secretary: String,
    /// Participants in recorded order.
    pub attendees: Vec<Attendee>,
    /// Agenda in recorded order.
    pub agenda_items: Vec<AgendaItem>,
    /// Decisions in recorded order.
    pub decisions: Vec<Decision>,
    /// Date of the follow-up meeting, if scheduled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_meeting_date: Option<String>,
    /// Chairman's signature image.
    #[serde(default, with = "super::image_b64", skip_serializing_if = "Option::is_none")]
    pub chairman_signature: Option<Vec<u8>>,
    /// Secretary's signature image.
    #[serde(default, with = "super::image_b64", skip_serializing_if = "Option::is_none")]
    pub secretary_signature: Option<Vec<u8>>,
    /// Background watermark image.
    #[serde(default, with = "super::image_b64", skip_serializing_if = "Option::is_none")]
    pub watermark_image: Option<Vec<u8>>,
    /// Approval status.
    pub status: Status,
    /// When the last signature was attached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_timestamp: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// Row of the record listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    /// Storage id.
    pub id: i64,
    /// Meeting title.
    pub title: String,
    /// Meeting date.
    pub date: String,
    /// Owning department.
    pub department: String,
    /// Chairman's name.
    pub chairman: String,
    /// Archive reference number.
    pub reference_number: String,
    /// Approval status.
    pub status: Status,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meeting_type_parse() {
        assert_eq!(MeetingType::parse("Ordinary").unwrap(), MeetingType::Ordinary);
        assert_eq!(MeetingType::parse(" EMERGENCY ").unwrap(), MeetingType::Emergency);
        assert_eq!(MeetingType::parse("periodic").unwrap(), MeetingType::Periodic);
        assert_eq!(MeetingType::parse("عادي").unwrap(), MeetingType::Ordinary);
        assert_eq!(MeetingType::parse("طارئ").unwrap(), MeetingType::Emergency);
    }

    #[test]
    fn test_meeting_type_parse_rejects_unknown() {
        assert!(MeetingType::parse("").unwrap_err().is_validation_error());
        let err = MeetingType::parse("weekly").unwrap_err();
        assert!(err.to_string().contains("weekly"));
    }

    #[test]
    fn test_status_round_trip_strings() {
        for status in [Status::Draft, Status::PendingChairman, Status::Approved] {
            assert_eq!(Status::parse(status.as_str()).unwrap(), status);
        }
        assert!(Status::parse("reviewed").is_err());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&Status::PendingChairman).unwrap();
        assert_eq!(json, "\"pending_chairman\"");
    }

    #[test]
    fn test_attendee_deserialize_with_defaults() {
        let attendee: Attendee = serde_json::from_str(r#"{"name":"Sara"}"#).unwrap();
        assert_eq!(attendee.name, "Sara");
        assert!(!attendee.present);
        assert!(attendee.signature_image.is_none());
    }
}
