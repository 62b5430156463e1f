//! The minutes workflow.
//!
//! [`MinutesService`] ties the pieces together: it authorizes and validates
//! create/update requests, derives the status, persists through an injected
//! [`MinutesStore`], and produces finished documents.

use chrono::Utc;
use tracing::{info, warn};

use crate::assist::{AssistRequest, AssistResult, Assistant};
use crate::auth::{require_caller, Caller};
use crate::config::DocumentConfig;
use crate::error::{Error, Result};
use crate::record::{check_invariants, plan_creation, plan_update, MinutesInput, MinutesRecord, RecordSummary, SignatureChange};
use crate::render::render_pdf;
use crate::storage::MinutesStore;

/// MIME type of generated documents.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A finished document ready to hand to a client.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    /// The PDF bytes.
    pub bytes: Vec<u8>,
    /// Suggested download name.
    pub filename: String,
    /// MIME type.
    pub content_type: &'static str,
    /// The review the document was built from.
    pub review: AssistResult,
}

/// Workflow façade over a record store.
#[derive(Debug)]
pub struct MinutesService<S> {
    store: S,
    document: DocumentConfig,
}

impl<S: MinutesStore> MinutesService<S> {
    /// Create a service over `store`.
    #[must_use]
    pub fn new(store: S, document: DocumentConfig) -> Self {
        Self { store, document }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a new record.
    ///
    /// Nothing is persisted unless every check passes.
    ///
    /// # Errors
    ///
    /// - [`Error::Unauthenticated`] without a caller
    /// - authorization or invalid-transition errors for signatures the
    ///   caller may not attach
    /// - validation errors for malformed input or missing required fields
    pub fn create(&self, caller: Option<&Caller>, input: MinutesInput) -> Result<i64> {
        let caller = require_caller(caller)?;
        let change = SignatureChange {
            secretary: input.has_secretary_signature(),
            chairman: input.has_chairman_signature(),
        };
        let status = plan_creation(caller, change)?;

        let mut record = input.into_record(Utc::now())?.normalized();
        record.status = status;
        record.validate_required()?;
        check_invariants(&record)?;

        let id = self.store.create(&record)?;
        info!(id, status = %record.status, caller = %caller.id, "Minutes created");
        Ok(id)
    }

    /// Apply a partial update, possibly moving the record forward.
    ///
    /// Returns the record as stored.
    ///
    /// # Errors
    ///
    /// - [`Error::Unauthenticated`] without a caller
    /// - [`Error::NotFound`] for unknown ids
    /// - invalid-transition errors for approved records or a chairman
    ///   signature ahead of the secretary's
    /// - authorization errors when the caller's role does not own the
    ///   signature being attached
    /// - validation errors for malformed input
    pub fn update(&self, caller: Option<&Caller>, id: i64, input: MinutesInput) -> Result<MinutesRecord> {
        let caller = require_caller(caller)?;
        let current = self.store.get(id)?.ok_or(Error::NotFound { id })?;
        let change = input.signature_change(&current)?;
        let status = plan_update(caller, &current, change)?;

        let previous = current.status;
        let mut record = input.merge_into(current)?.normalized();
        record.status = status;
        if change.secretary || change.chairman {
            record.signature_timestamp = Some(Utc::now());
        }
        record.validate_required()?;
        check_invariants(&record)?;

        self.store.update(id, &record)?;
        info!(id, from = %previous, to = %record.status, caller = %caller.id, "Minutes updated");
        Ok(record)
    }

    /// Fetch a record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for unknown ids.
    pub fn get(&self, id: i64) -> Result<MinutesRecord> {
        self.store.get(id)?.ok_or(Error::NotFound { id })
    }

    /// Summaries of every record, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn list(&self) -> Result<Vec<RecordSummary>> {
        self.store.list()
    }

    /// Review a record and render it with this service's document settings.
    ///
    /// # Errors
    ///
    /// See [`generate_document`].
    pub async fn generate_document(&self, record: &MinutesRecord, assistant: &Assistant) -> Result<GeneratedDocument> {
        generate_document(record, assistant, &self.document).await
    }

    /// Fetch a stored record and render it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for unknown ids, and whatever
    /// [`MinutesService::generate_document`] returns.
    pub async fn export(&self, id: i64, assistant: &Assistant) -> Result<GeneratedDocument> {
        let record = self.get(id)?;
        self.generate_document(&record, assistant).await
    }
}

/// Review a record and render it.
///
/// The reviewed agenda and decisions replace the recorded ones when the
/// review kept their count, and the review's summary fills an empty
/// executive summary.
///
/// # Errors
///
/// Returns an error if the record violates the status invariants or the
/// PDF cannot be written. Review failures are never errors.
pub async fn generate_document(
    record: &MinutesRecord,
    assistant: &Assistant,
    config: &DocumentConfig,
) -> Result<GeneratedDocument> {
    let review = assistant.review(&AssistRequest::from_record(record)).await;
    if !review.issues.is_empty() {
        warn!(count = review.issues.len(), "Minutes have outstanding issues");
    }

    let reviewed = apply_review(record, &review);
    let bytes = render_pdf(&reviewed, config)?;
    let filename = document_filename(&config.filename_prefix, &record.date);
    info!(filename = %filename, bytes = bytes.len(), mode = %review.mode, "Document generated");

    Ok(GeneratedDocument {
        bytes,
        filename,
        content_type: PDF_CONTENT_TYPE,
        review,
    })
}

fn apply_review(record: &MinutesRecord, review: &AssistResult) -> MinutesRecord {
    let mut reviewed = record.clone();
    if review.agenda_items.len() == record.agenda_items.len() {
        reviewed.agenda_items.clone_from(&review.agenda_items);
    }
    if review.decisions.len() == record.decisions.len() {
        reviewed.decisions.clone_from(&review.decisions);
    }
    if reviewed.executive_summary.trim().is_empty() {
        if let Some(summary) = &review.executive_summary {
            reviewed.executive_summary.clone_from(summary);
        }
    }
    reviewed
}

/// `<prefix>_<date>.pdf`, with anything unsafe in the date replaced.
#[must_use]
pub fn document_filename(prefix: &str, date: &str) -> String {
    let date: String = date
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    let date = if date.is_empty() { "undated".to_string() } else { date };
    format!("{prefix}_{date}.pdf")
}
