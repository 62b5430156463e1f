//! The approval state machine.
//!
//! ```text
//! Draft ──secretary signs──▶ PendingChairman ──chairman signs──▶ Approved
//! ```
//!
//! The status is never taken from callers. It is derived from which
//! signatures are present, and the transition guards below decide whether a
//! caller may attach the signature that would move the record forward.

use crate::auth::{Caller, Role};
use crate::error::{Error, Result};

use super::types::{MinutesRecord, Status};

/// Derive the status implied by the attached signatures.
///
/// A chairman signature without a secretary signature does not approve
/// anything and yields [`Status::Draft`]; the guards make that combination
/// unreachable through the workflow.
#[must_use]
pub fn derive_status(has_secretary_signature: bool, has_chairman_signature: bool) -> Status {
    match (has_secretary_signature, has_chairman_signature) {
        (true, true) => Status::Approved,
        (true, false) => Status::PendingChairman,
        (false, _) => Status::Draft,
    }
}

/// Which signatures a create or update request attaches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignatureChange {
    /// The request carries a secretary signature.
    pub secretary: bool,
    /// The request carries a chairman signature.
    pub chairman: bool,
}

/// Decide the status of a record being created.
///
/// Any authenticated caller may open a draft. Only the secretary may sign at
/// creation time; approval always goes through [`plan_update`].
///
/// # Errors
///
/// Returns an authorization error when the caller's role does not match the
/// signature being attached, and an invalid-transition error for a chairman
/// signature at creation.
pub fn plan_creation(caller: &Caller, change: SignatureChange) -> Result<Status> {
    if change.chairman {
        return Err(Error::InvalidTransition {
            from: Status::Draft.to_string(),
            message: "minutes are approved by the chairman through an update, not at creation"
                .to_string(),
        });
    }
    if change.secretary && !caller.has_role(Role::Secretary) {
        return Err(Error::authorization(format!(
            "a {} cannot attach the secretary signature",
            caller.role
        )));
    }
    Ok(derive_status(change.secretary, false))
}

/// Decide the status a record moves to when `caller` applies an update.
///
/// # Errors
///
/// - invalid transition when the record is already approved, or when a
///   chairman signature would land on a record the secretary has not signed
/// - authorization when the caller's role does not own the signature being
///   attached
pub fn plan_update(caller: &Caller, current: &MinutesRecord, change: SignatureChange) -> Result<Status> {
    if current.status == Status::Approved {
        return Err(Error::InvalidTransition {
            from: current.status.to_string(),
            message: "approved minutes are final".to_string(),
        });
    }

    if change.chairman && !caller.has_role(Role::Chairman) {
        return Err(Error::authorization(format!(
            "only the chairman can approve minutes (caller is {})",
            caller.role
        )));
    }
    if change.secretary && !caller.has_role(Role::Secretary) {
        return Err(Error::authorization(format!(
            "a {} cannot attach the secretary signature",
            caller.role
        )));
    }

    let secretary_signed = change.secretary || current.secretary_signature.is_some();
    let chairman_signed = change.chairman || current.chairman_signature.is_some();

    if chairman_signed && !secretary_signed {
        return Err(Error::InvalidTransition {
            from: current.status.to_string(),
            message: "the secretary must sign before the chairman can approve".to_string(),
        });
    }

    Ok(derive_status(secretary_signed, chairman_signed))
}

/// Check the status/signature invariants of a record.
///
/// # Errors
///
/// Returns a validation error naming the first violated invariant.
pub fn check_invariants(record: &MinutesRecord) -> Result<()> {
    match record.status {
        Status::Approved => {
            if record.chairman_signature.is_none() || record.secretary_signature.is_none() {
                return Err(Error::validation(
                    "status",
                    "approved minutes must carry both signatures",
                ));
            }
            if record.signature_timestamp.is_none() {
                return Err(Error::validation(
                    "signatureTimestamp",
                    "approved minutes must carry a signature timestamp",
                ));
            }
        }
        Status::PendingChairman => {
            if record.secretary_signature.is_none() || record.chairman_signature.is_some() {
                return Err(Error::validation(
                    "status",
                    "minutes pending the chairman carry only the secretary signature",
                ));
            }
        }
        Status::Draft => {}
    }
    Ok(())
}
