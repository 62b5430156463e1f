//! `minutebook` - Meeting minutes approval workflow and document assembly
//!
//! This library records meeting minutes, carries them through the
//! secretary/chairman approval workflow, and lays them out as paginated,
//! watermarked PDF documents.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod assist;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod logging;
pub mod record;
pub mod render;
pub mod service;
pub mod storage;
pub mod text;

pub use assist::{AssistMode, AssistRequest, AssistResult, Assistant};
pub use auth::{Caller, Role};
pub use config::Config;
pub use error::{Error, Result};
pub use layout::{compose, LaidOutDocument, LayoutOptions};
pub use logging::init_logging;
pub use record::{derive_status, MinutesInput, MinutesRecord, RecordSummary, Status};
pub use render::{paint, render_pdf, PdfSurface, Surface};
pub use service::{generate_document, GeneratedDocument, MinutesService};
pub use storage::{MinutesStore, Storage};
pub use text::normalize;
