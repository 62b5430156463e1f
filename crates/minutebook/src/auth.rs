//! Caller identity as handed over by the authentication collaborator.
//!
//! Sessions and credentials live outside this crate. Whatever authenticates
//! a request reduces it to an optional [`Caller`]; mutating operations treat
//! `None` as a hard rejection.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The two roles of the approval workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Countersigns and approves minutes.
    Chairman,
    /// Drafts and signs minutes.
    Secretary,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chairman => write!(f, "chairman"),
            Self::Secretary => write!(f, "secretary"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chairman" => Ok(Self::Chairman),
            "secretary" => Ok(Self::Secretary),
            other => Err(Error::validation("role", format!("unknown role '{other}'"))),
        }
    }
}

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    /// Opaque identity from the auth collaborator.
    pub id: String,
    /// Workflow role of the caller.
    pub role: Role,
}

impl Caller {
    /// Create a caller with the given id and role.
    #[must_use]
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// Whether this caller holds the given role.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }
}

/// Unwrap the caller of a mutating operation.
///
/// # Errors
///
/// Returns [`Error::Unauthenticated`] when no identity was supplied.
pub fn require_caller(caller: Option<&Caller>) -> Result<&Caller> {
    caller.ok_or(Error::Unauthenticated)
}
