//! The minutes record model.
//!
//! [`types`] holds the strongly-typed record, [`status`] the approval state
//! machine and [`input`] the boundary type that loosely-typed request bodies
//! are coerced through.

pub mod input;
pub mod status;
pub mod types;

pub use input::{decode_image, MinutesInput};
pub use status::{check_invariants, derive_status, plan_creation, plan_update, SignatureChange};
pub use types::{AgendaItem, Attendee, Decision, MeetingType, MinutesRecord, RecordSummary, Status};

use crate::error::{Error, Result};
use crate::text::normalize;

impl MinutesRecord {
    /// Return a copy with every free-text leaf normalized.
    ///
    /// Structured values (reference, date, time, duration, next meeting
    /// date) are only trimmed so their separators survive.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut record = self.clone();
        for field in [
            &mut record.department,
            &mut record.org_name,
            &mut record.executive_summary,
            &mut record.title,
            &mut record.location,
            &mut record.chairman,
            &mut record.secretary,
        ] {
            *field = normalize(field);
        }
        for field in [
            &mut record.reference_number,
            &mut record.date,
            &mut record.time,
            &mut record.duration,
        ] {
            *field = field.trim().to_string();
        }
        record.next_meeting_date = record
            .next_meeting_date
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        for attendee in &mut record.attendees {
            attendee.name = normalize(&attendee.name);
            attendee.position = normalize(&attendee.position);
            attendee.role = normalize(&attendee.role);
        }
        record.agenda_items = normalize_agenda(&record.agenda_items);
        record.decisions = normalize_decisions(&record.decisions);
        record
    }

    /// Check the fields a new record must carry.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the first empty required field.
    pub fn validate_required(&self) -> Result<()> {
        let required = [
            ("title", &self.title),
            ("date", &self.date),
            ("time", &self.time),
            ("location", &self.location),
            ("chairman", &self.chairman),
            ("secretary", &self.secretary),
        ];
        for (field, value) in required {
            if normalize(value).is_empty() {
                return Err(Error::validation(field, "is required"));
            }
        }
        Ok(())
    }

    /// The listing row for this record.
    #[must_use]
    pub fn summary(&self, id: i64) -> RecordSummary {
        RecordSummary {
            id,
            title: self.title.clone(),
            date: self.date.clone(),
            department: self.department.clone(),
            chairman: self.chairman.clone(),
            reference_number: self.reference_number.clone(),
            status: self.status,
            created_at: self.created_at,
        }
    }

    /// Which signatures this record carries.
    #[must_use]
    pub fn signatures(&self) -> SignatureChange {
        SignatureChange {
            secretary: self.secretary_signature.is_some(),
            chairman: self.chairman_signature.is_some(),
        }
    }
}

/// Normalize every agenda entry.
#[must_use]
pub fn normalize_agenda(items: &[AgendaItem]) -> Vec<AgendaItem> {
    items
        .iter()
        .map(|a| AgendaItem {
            item: normalize(&a.item),
            speaker: normalize(&a.speaker),
        })
        .collect()
}

/// Normalize every decision entry.
#[must_use]
pub fn normalize_decisions(decisions: &[Decision]) -> Vec<Decision> {
    decisions
        .iter()
        .map(|d| Decision {
            decision: normalize(&d.decision),
            responsible: normalize(&d.responsible),
            deadline: normalize(&d.deadline),
        })
        .collect()
}

/// Serde adapter for optional image bytes carried as base64 in JSON.
pub(crate) mod image_b64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        super::decode_image("image", value.as_deref()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    /// A filled-in, unsigned draft.
    pub fn sample_record() -> MinutesRecord {
        MinutesRecord {
            reference_number: "REF-2024-001".to_string(),
            department: "Finance".to_string(),
            org_name: "Acme Holdings".to_string(),
            executive_summary: String::new(),
            title: "Quarterly budget review".to_string(),
            date: "2024-12-24".to_string(),
            time: "10:00".to_string(),
            duration: "90".to_string(),
            location: "Board room".to_string(),
            meeting_type: MeetingType::Ordinary,
            chairman: "Ahmed Ali".to_string(),
            secretary: "Fatima Hassan".to_string(),
            attendees: vec![Attendee {
                name: "Khalid Omar".to_string(),
                position: "CFO".to_string(),
                role: "member".to_string(),
                present: true,
                signature_image: None,
            }],
            agenda_items: vec![AgendaItem {
                item: "Review Q4 spending".to_string(),
                speaker: "Khalid Omar".to_string(),
            }],
            decisions: vec![Decision {
                decision: "Freeze travel budget".to_string(),
                responsible: "Finance".to_string(),
                deadline: "2025-01-31".to_string(),
            }],
            next_meeting_date: None,
            chairman_signature: None,
            secretary_signature: None,
            watermark_image: None,
            status: Status::Draft,
            signature_timestamp: None,
            created_at: Utc.with_ymd_and_hms(2024, 12, 24, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_normalized_touches_every_leaf() {
        let mut record = sample_record();
        record.title = "  budget ,review ".to_string();
        record.attendees[0].position = "Chief   Financial Officer".to_string();
        record.agenda_items[0].speaker = " Khalid ".to_string();
        record.decisions[0].deadline = "end of Q1 .".to_string();
        record.next_meeting_date = Some("   ".to_string());

        let normalized = record.normalized();
        assert_eq!(normalized.title, "budget, review");
        assert_eq!(normalized.attendees[0].position, "Chief Financial Officer");
        assert_eq!(normalized.agenda_items[0].speaker, "Khalid");
        assert_eq!(normalized.decisions[0].deadline, "end of Q1.");
        assert_eq!(normalized.next_meeting_date, None);
        assert_eq!(normalized.normalized(), normalized);
    }

    #[test]
    fn test_normalized_keeps_structured_values() {
        let mut record = sample_record();
        record.time = " 10:30 ".to_string();
        record.date = "24.12.2024".to_string();
        record.next_meeting_date = Some(" 2025-01-07 ".to_string());

        let normalized = record.normalized();
        assert_eq!(normalized.time, "10:30");
        assert_eq!(normalized.date, "24.12.2024");
        assert_eq!(normalized.next_meeting_date.as_deref(), Some("2025-01-07"));
    }

    #[test]
    fn test_validate_required() {
        let record = sample_record();
        assert!(record.validate_required().is_ok());

        let mut missing = record.clone();
        missing.location = "   ".to_string();
        let err = missing.validate_required().unwrap_err();
        assert!(err.is_validation_error());
        assert!(err.to_string().contains("location"));
    }

    #[test]
    fn test_summary() {
        let record = sample_record();
        let summary = record.summary(42);
        assert_eq!(summary.id, 42);
        assert_eq!(summary.reference_number, "REF-2024-001");
        assert_eq!(summary.status, Status::Draft);
    }

    #[test]
    fn test_json_carries_images_as_base64() {
        let mut record = sample_record();
        record.secretary_signature = Some(b"hi".to_vec());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["secretarySignature"], "aGk=");
        assert!(json.get("chairmanSignature").is_none());
        assert_eq!(json["type"], "ordinary");

        let back: MinutesRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
