//! The loosely-typed request body, validated into a [`MinutesRecord`].
//!
//! Clients send camelCase JSON with a few historical spellings
//! (`meetingTitle` or `title`), numbers where strings are expected, images
//! as data URLs, and collections either as arrays, as JSON-encoded strings,
//! or as newline-separated text. Everything is coerced here so the record
//! model only ever sees one shape.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{Error, Result};

use super::status::{derive_status, SignatureChange};
use super::types::{AgendaItem, Attendee, Decision, MeetingType, MinutesRecord};

/// A collection that arrived as an array, a string, or nothing at all.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listish<T> {
    /// A proper JSON array.
    Items(Vec<T>),
    /// A string: either JSON-encoded array or one entry per line.
    Text(String),
    /// `null`.
    Empty,
}

impl<T> Default for Listish<T> {
    fn default() -> Self {
        Self::Empty
    }
}

/// Entries that can be built from one line of legacy free text.
pub trait FromLine: Sized {
    /// Build an entry whose primary text is `line`.
    fn from_line(line: &str) -> Self;
}

impl FromLine for AgendaItem {
    fn from_line(line: &str) -> Self {
        Self {
            item: line.to_string(),
            speaker: String::new(),
        }
    }
}

impl FromLine for Decision {
    fn from_line(line: &str) -> Self {
        Self {
            decision: line.to_string(),
            ..Self::default()
        }
    }
}

impl FromLine for AttendeeInput {
    fn from_line(line: &str) -> Self {
        Self {
            name: Some(line.to_string()),
            present: Some(true),
            ..Self::default()
        }
    }
}

impl<T> Listish<T>
where
    T: FromLine + for<'de> Deserialize<'de>,
{
    /// Flatten into a vector, preserving order.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Items(items) => items,
            Self::Empty => Vec::new(),
            Self::Text(text) => {
                if let Ok(items) = serde_json::from_str::<Vec<T>>(&text) {
                    return items;
                }
                text.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(T::from_line)
                    .collect()
            }
        }
    }
}

/// One attendee as sent by clients.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttendeeInput {
    /// Full name.
    #[serde(deserialize_with = "lenient_string")]
    pub name: Option<String>,
    /// Job title or position.
    #[serde(deserialize_with = "lenient_string")]
    pub position: Option<String>,
    /// Role in the meeting.
    #[serde(deserialize_with = "lenient_string")]
    pub role: Option<String>,
    /// Attendance flag (`true`, `"present"`, `"yes"`, ...).
    #[serde(deserialize_with = "lenient_bool")]
    pub present: Option<bool>,
    /// Signature image as a data URL or bare base64.
    #[serde(alias = "signatureImage", deserialize_with = "lenient_string")]
    pub signature: Option<String>,
}

/// A create or update request body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct MinutesInput {
    #[serde(deserialize_with = "lenient_string")]
    pub reference_number: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub department: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub org_name: Option<String>,
    #[serde(alias = "executive_summary", deserialize_with = "lenient_string")]
    pub executive_summary: Option<String>,
    #[serde(alias = "meetingTitle", deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(alias = "meetingDate", deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(alias = "meetingTime", deserialize_with = "lenient_string")]
    pub time: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub duration: Option<String>,
    #[serde(alias = "meetingLocation", deserialize_with = "lenient_string")]
    pub location: Option<String>,
    #[serde(rename = "type", alias = "meetingType", deserialize_with = "lenient_string")]
    pub meeting_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub chairman: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub secretary: Option<String>,
    pub attendees: Listish<AttendeeInput>,
    pub agenda_items: Listish<AgendaItem>,
    pub decisions: Listish<Decision>,
    #[serde(deserialize_with = "lenient_string")]
    pub next_meeting_date: Option<String>,
    #[serde(alias = "chairman_signature", deserialize_with = "lenient_string")]
    pub chairman_signature: Option<String>,
    #[serde(alias = "secretary_signature", deserialize_with = "lenient_string")]
    pub secretary_signature: Option<String>,
    #[serde(alias = "watermark_image", deserialize_with = "lenient_string")]
    pub watermark_image: Option<String>,
}

impl MinutesInput {
    /// Parse a request body.
    ///
    /// # Errors
    ///
    /// Returns a JSON error when the body is not an object of the expected shape.
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Whether the body carries a non-empty secretary signature.
    #[must_use]
    pub fn has_secretary_signature(&self) -> bool {
        is_present(self.secretary_signature.as_deref())
    }

    /// Whether the body carries a non-empty chairman signature.
    #[must_use]
    pub fn has_chairman_signature(&self) -> bool {
        is_present(self.chairman_signature.as_deref())
    }

    /// Which signatures this body attaches to `current`.
    ///
    /// A signature identical to the stored one is not a change, so a client
    /// sending the whole record back does not re-sign it.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a signature that is not valid base64.
    pub fn signature_change(&self, current: &MinutesRecord) -> Result<SignatureChange> {
        let differs = |field: &str, value: Option<&str>, stored: Option<&[u8]>| -> Result<bool> {
            Ok(decode_image(field, value)?.is_some_and(|bytes| stored != Some(bytes.as_slice())))
        };
        Ok(SignatureChange {
            secretary: differs(
                "secretarySignature",
                self.secretary_signature.as_deref(),
                current.secretary_signature.as_deref(),
            )?,
            chairman: differs(
                "chairmanSignature",
                self.chairman_signature.as_deref(),
                current.chairman_signature.as_deref(),
            )?,
        })
    }

    /// Convert into a record.
    ///
    /// The status is derived from the attached signatures and the signature
    /// timestamp is set to `created_at` when any signature is present.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown meeting type or an image
    /// that is not valid base64.
    pub fn into_record(self, created_at: DateTime<Utc>) -> Result<MinutesRecord> {
        let meeting_type = MeetingType::parse(self.meeting_type.as_deref().unwrap_or_default())?;
        let chairman_signature = decode_image("chairmanSignature", self.chairman_signature.as_deref())?;
        let secretary_signature =
            decode_image("secretarySignature", self.secretary_signature.as_deref())?;
        let watermark_image = decode_image("watermarkImage", self.watermark_image.as_deref())?;

        let attendees = attendees_from(self.attendees)?;

        let status = derive_status(secretary_signature.is_some(), chairman_signature.is_some());
        let signed = secretary_signature.is_some() || chairman_signature.is_some();

        Ok(MinutesRecord {
            reference_number: self.reference_number.unwrap_or_default(),
            department: self.department.unwrap_or_default(),
            org_name: self.org_name.unwrap_or_default(),
            executive_summary: self.executive_summary.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            date: self.date.unwrap_or_default(),
            time: self.time.unwrap_or_default(),
            duration: self.duration.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            meeting_type,
            chairman: self.chairman.unwrap_or_default(),
            secretary: self.secretary.unwrap_or_default(),
            attendees,
            agenda_items: self.agenda_items.into_vec(),
            decisions: self.decisions.into_vec(),
            next_meeting_date: self.next_meeting_date.filter(|d| !d.trim().is_empty()),
            chairman_signature,
            secretary_signature,
            watermark_image,
            status,
            signature_timestamp: signed.then_some(created_at),
            created_at,
        })
    }
}

impl MinutesInput {
    /// Apply this body to an existing record as a partial update.
    ///
    /// Fields absent from the body keep their current values. Signatures
    /// and the watermark are only replaced when the body carries new ones.
    /// The status and signature timestamp are left for the caller to derive.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an unknown meeting type or an image
    /// that is not valid base64.
    pub fn merge_into(self, mut record: MinutesRecord) -> Result<MinutesRecord> {
        for (slot, value) in [
            (&mut record.reference_number, self.reference_number),
            (&mut record.department, self.department),
            (&mut record.org_name, self.org_name),
            (&mut record.executive_summary, self.executive_summary),
            (&mut record.title, self.title),
            (&mut record.date, self.date),
            (&mut record.time, self.time),
            (&mut record.duration, self.duration),
            (&mut record.location, self.location),
            (&mut record.chairman, self.chairman),
            (&mut record.secretary, self.secretary),
        ] {
            if let Some(value) = value {
                *slot = value;
            }
        }

        if let Some(meeting_type) = self.meeting_type.as_deref().filter(|t| !t.trim().is_empty()) {
            record.meeting_type = MeetingType::parse(meeting_type)?;
        }
        if let Some(date) = self.next_meeting_date {
            record.next_meeting_date = Some(date).filter(|d| !d.trim().is_empty());
        }

        if !matches!(self.attendees, Listish::Empty) {
            record.attendees = attendees_from(self.attendees)?;
        }
        if !matches!(self.agenda_items, Listish::Empty) {
            record.agenda_items = self.agenda_items.into_vec();
        }
        if !matches!(self.decisions, Listish::Empty) {
            record.decisions = self.decisions.into_vec();
        }

        if let Some(image) = decode_image("chairmanSignature", self.chairman_signature.as_deref())? {
            record.chairman_signature = Some(image);
        }
        if let Some(image) = decode_image("secretarySignature", self.secretary_signature.as_deref())? {
            record.secretary_signature = Some(image);
        }
        if let Some(image) = decode_image("watermarkImage", self.watermark_image.as_deref())? {
            record.watermark_image = Some(image);
        }

        Ok(record)
    }
}

fn attendees_from(list: Listish<AttendeeInput>) -> Result<Vec<Attendee>> {
    list.into_vec()
        .into_iter()
        .enumerate()
        .map(|(index, attendee)| attendee.into_attendee(index))
        .collect()
}

impl AttendeeInput {
    fn into_attendee(self, index: usize) -> Result<Attendee> {
        let field = format!("attendees[{index}].signature");
        Ok(Attendee {
            name: self.name.unwrap_or_default(),
            position: self.position.unwrap_or_default(),
            role: self.role.unwrap_or_default(),
            present: self.present.unwrap_or(false),
            signature_image: decode_image(&field, self.signature.as_deref())?,
        })
    }
}

fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Decode a data URL (`data:image/png;base64,...`) or bare base64 string.
///
/// # Errors
///
/// Returns a validation error naming `field` when the payload is not base64.
pub fn decode_image(field: &str, value: Option<&str>) -> Result<Option<Vec<u8>>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    let payload = match value.split_once(',') {
        Some((header, data)) if header.starts_with("data:") => data,
        _ => value,
    };
    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    STANDARD
        .decode(cleaned.as_bytes())
        .map(Some)
        .map_err(|e| Error::validation(field, format!("image is not valid base64: {e}")))
}

/// Accept strings, numbers and booleans as text; `null` as absent.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    })
}

/// Accept booleans, 0/1 and common yes/no words.
fn lenient_bool<'de, D>(deserializer: D) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => Some(b),
        Value::Number(n) => Some(n.as_i64().unwrap_or(0) != 0),
        Value::String(s) => Some(matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "yes" | "present" | "1" | "حاضر"
        )),
        _ => None,
    })
}
