//! Versioned encoding of the nested collections.
//!
//! Attendees, agenda items and decisions are stored as a JSON envelope
//! `{"v": 1, "items": [...]}`. Rows written by older deployments hold a
//! bare JSON array, which is still accepted on read.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Envelope version written by [`encode`].
pub const CODEC_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    v: u32,
    items: &'a [T],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Stored<T> {
    Envelope { v: u32, items: Vec<T> },
    Legacy(Vec<T>),
}

/// Encode a collection for the given column.
///
/// # Errors
///
/// Returns a codec error if serialization fails.
pub fn encode<T: Serialize>(collection: &'static str, items: &[T]) -> Result<String> {
    serde_json::to_string(&EnvelopeRef {
        v: CODEC_VERSION,
        items,
    })
    .map_err(|e| Error::Codec {
        collection,
        message: e.to_string(),
    })
}

/// Decode a stored collection. A missing or blank column is an empty list.
///
/// # Errors
///
/// Returns a codec error for malformed JSON or an envelope version newer
/// than this build understands.
pub fn decode<T: DeserializeOwned>(collection: &'static str, stored: Option<&str>) -> Result<Vec<T>> {
    let Some(text) = stored.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(Vec::new());
    };

    match serde_json::from_str(text) {
        Ok(Stored::Envelope { v, items }) if v <= CODEC_VERSION => Ok(items),
        Ok(Stored::Envelope { v, .. }) => Err(Error::Codec {
            collection,
            message: format!("unsupported envelope version {v}"),
        }),
        Ok(Stored::Legacy(items)) => Ok(items),
        Err(e) => Err(Error::Codec {
            collection,
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{AgendaItem, Attendee, Decision};

    #[test]
    fn test_encode_writes_envelope() {
        let items = vec![AgendaItem {
            item: "Budget".to_string(),
            speaker: "Ahmed".to_string(),
        }];
        let text = encode("agenda_items", &items).unwrap();
        assert_eq!(text, r#"{"v":1,"items":[{"item":"Budget","speaker":"Ahmed"}]}"#);
        assert_eq!(decode::<AgendaItem>("agenda_items", Some(&text)).unwrap(), items);
    }

    #[test]
    fn test_decode_legacy_array() {
        let legacy = r#"[{"decision":"Approve plan","responsible":"HR","deadline":"Q2"}]"#;
        let decisions: Vec<Decision> = decode("decisions", Some(legacy)).unwrap();
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].responsible, "HR");
    }

    #[test]
    fn test_decode_missing_is_empty() {
        assert!(decode::<Attendee>("attendees", None).unwrap().is_empty());
        assert!(decode::<Attendee>("attendees", Some("  ")).unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_future_version() {
        let err = decode::<AgendaItem>("agenda_items", Some(r#"{"v":9,"items":[]}"#)).unwrap_err();
        assert!(matches!(err, Error::Codec { collection: "agenda_items", .. }));
        assert!(err.to_string().contains("version 9"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode::<AgendaItem>("agenda_items", Some("not json")).unwrap_err();
        assert!(matches!(err, Error::Codec { .. }));
    }
}
