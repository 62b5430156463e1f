//! `SQLite` schema definitions for minutebook.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the minutes table.
///
/// `attendees`, `agenda_items` and `decisions` hold versioned JSON
/// envelopes written by [`super::codec`]. Images are raw bytes.
pub const CREATE_MINUTES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS minutes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    reference_number TEXT NOT NULL DEFAULT '',
    department TEXT NOT NULL DEFAULT '',
    org_name TEXT NOT NULL DEFAULT '',
    executive_summary TEXT NOT NULL DEFAULT '',
    title TEXT NOT NULL,
    date TEXT NOT NULL,
    time TEXT NOT NULL,
    duration TEXT NOT NULL DEFAULT '',
    location TEXT NOT NULL,
    meeting_type TEXT NOT NULL,
    chairman TEXT NOT NULL,
    secretary TEXT NOT NULL,
    attendees TEXT NOT NULL,
    agenda_items TEXT NOT NULL,
    decisions TEXT NOT NULL,
    next_meeting_date TEXT,
    chairman_signature BLOB,
    secretary_signature BLOB,
    watermark_image BLOB,
    status TEXT NOT NULL DEFAULT 'draft',
    signature_timestamp TEXT,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create an index on `created_at` for the listing order.
pub const CREATE_CREATED_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_minutes_created ON minutes(created_at DESC)
";

/// SQL statement to create an index on status for filtering.
pub const CREATE_STATUS_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_minutes_status ON minutes(status)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Columns added after the first release, with their definitions.
///
/// Databases created before version 2 lack them.
pub const LATE_COLUMNS: &[(&str, &str)] = &[
    ("org_name", "TEXT NOT NULL DEFAULT ''"),
    ("executive_summary", "TEXT NOT NULL DEFAULT ''"),
    ("watermark_image", "BLOB"),
];

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_MINUTES_TABLE,
    CREATE_CREATED_INDEX,
    CREATE_STATUS_INDEX,
    CREATE_METADATA_TABLE,
];
