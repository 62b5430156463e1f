//! Storage layer for minutebook.
//!
//! [`MinutesStore`] is the get/put/list contract the workflow depends on;
//! [`Storage`] implements it on `SQLite`. Nested collections cross the
//! boundary through the versioned [`codec`].

pub mod codec;
pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::{MeetingType, MinutesRecord, RecordSummary, Status};

/// Persistence contract for minutes records.
pub trait MinutesStore {
    /// Persist a new record and return its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn create(&self, record: &MinutesRecord) -> Result<i64>;

    /// Replace the stored record with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for unknown ids.
    fn update(&self, id: i64, record: &MinutesRecord) -> Result<()>;

    /// Fetch a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the row cannot be read or decoded.
    fn get(&self, id: i64) -> Result<Option<MinutesRecord>>;

    /// Summaries of every record, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows cannot be read.
    fn list(&self) -> Result<Vec<RecordSummary>>;
}

/// Storage engine for minutes records.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

const SELECT_RECORD: &str = r"
SELECT id, reference_number, department, org_name, executive_summary, title, date, time,
       duration, location, meeting_type, chairman, secretary, attendees, agenda_items,
       decisions, next_meeting_date, chairman_signature, secretary_signature,
       watermark_image, status, signature_timestamp, created_at
FROM minutes
";

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM minutes", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_stored(row: &rusqlite::Row) -> rusqlite::Result<StoredRow> {
        Ok(StoredRow {
            id: row.get(0)?,
            reference_number: row.get(1)?,
            department: row.get(2)?,
            org_name: row.get(3)?,
            executive_summary: row.get(4)?,
            title: row.get(5)?,
            date: row.get(6)?,
            time: row.get(7)?,
            duration: row.get(8)?,
            location: row.get(9)?,
            meeting_type: row.get(10)?,
            chairman: row.get(11)?,
            secretary: row.get(12)?,
            attendees: row.get(13)?,
            agenda_items: row.get(14)?,
            decisions: row.get(15)?,
            next_meeting_date: row.get(16)?,
            chairman_signature: row.get(17)?,
            secretary_signature: row.get(18)?,
            watermark_image: row.get(19)?,
            status: row.get(20)?,
            signature_timestamp: row.get(21)?,
            created_at: row.get(22)?,
        })
    }
}

impl MinutesStore for Storage {
    fn create(&self, record: &MinutesRecord) -> Result<i64> {
        let row = EncodedRecord::new(record)?;
        self.conn.execute(
            r"
            INSERT INTO minutes (
                reference_number, department, org_name, executive_summary, title, date, time,
                duration, location, meeting_type, chairman, secretary, attendees, agenda_items,
                decisions, next_meeting_date, chairman_signature, secretary_signature,
                watermark_image, status, signature_timestamp, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                      ?17, ?18, ?19, ?20, ?21, ?22)
            ",
            params![
                record.reference_number,
                record.department,
                record.org_name,
                record.executive_summary,
                record.title,
                record.date,
                record.time,
                record.duration,
                record.location,
                row.meeting_type,
                record.chairman,
                record.secretary,
                row.attendees,
                row.agenda_items,
                row.decisions,
                record.next_meeting_date,
                record.chairman_signature,
                record.secretary_signature,
                record.watermark_image,
                row.status,
                row.signature_timestamp,
                row.created_at,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted minutes record with id {}", id);
        Ok(id)
    }

    fn update(&self, id: i64, record: &MinutesRecord) -> Result<()> {
        let row = EncodedRecord::new(record)?;
        let changed = self.conn.execute(
            r"
            UPDATE minutes SET
                reference_number = ?1, department = ?2, org_name = ?3, executive_summary = ?4,
                title = ?5, date = ?6, time = ?7, duration = ?8, location = ?9,
                meeting_type = ?10, chairman = ?11, secretary = ?12, attendees = ?13,
                agenda_items = ?14, decisions = ?15, next_meeting_date = ?16,
                chairman_signature = ?17, secretary_signature = ?18, watermark_image = ?19,
                status = ?20, signature_timestamp = ?21
            WHERE id = ?22
            ",
            params![
                record.reference_number,
                record.department,
                record.org_name,
                record.executive_summary,
                record.title,
                record.date,
                record.time,
                record.duration,
                record.location,
                row.meeting_type,
                record.chairman,
                record.secretary,
                row.attendees,
                row.agenda_items,
                row.decisions,
                record.next_meeting_date,
                record.chairman_signature,
                record.secretary_signature,
                record.watermark_image,
                row.status,
                row.signature_timestamp,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(Error::NotFound { id });
        }
        debug!("Updated minutes record {}", id);
        Ok(())
    }

    fn get(&self, id: i64) -> Result<Option<MinutesRecord>> {
        let stored = self
            .conn
            .query_row(&format!("{SELECT_RECORD} WHERE id = ?1"), [id], Self::row_to_stored)
            .optional()?;
        stored.map(StoredRow::into_record).transpose()
    }

    fn list(&self) -> Result<Vec<RecordSummary>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT id, title, date, department, chairman, reference_number, status, created_at
            FROM minutes ORDER BY created_at DESC, id DESC
            ",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(
                |(id, title, date, department, chairman, reference_number, status, created_at)| {
                    Ok(RecordSummary {
                        id,
                        title,
                        date,
                        department,
                        chairman,
                        reference_number,
                        status: Status::parse(&status)?,
                        created_at: parse_timestamp("created_at", &created_at)?,
                    })
                },
            )
            .collect()
    }
}

/// The columns of a record that need encoding before they are bound.
struct EncodedRecord {
    meeting_type: String,
    attendees: String,
    agenda_items: String,
    decisions: String,
    status: &'static str,
    signature_timestamp: Option<String>,
    created_at: String,
}

impl EncodedRecord {
    fn new(record: &MinutesRecord) -> Result<Self> {
        Ok(Self {
            meeting_type: record.meeting_type.to_string(),
            attendees: codec::encode("attendees", &record.attendees)?,
            agenda_items: codec::encode("agenda_items", &record.agenda_items)?,
            decisions: codec::encode("decisions", &record.decisions)?,
            status: record.status.as_str(),
            signature_timestamp: record.signature_timestamp.as_ref().map(format_timestamp),
            created_at: format_timestamp(&record.created_at),
        })
    }
}

/// A raw row, before codec and enum decoding.
struct StoredRow {
    id: i64,
    reference_number: String,
    department: String,
    org_name: String,
    executive_summary: String,
    title: String,
    date: String,
    time: String,
    duration: String,
    location: String,
    meeting_type: String,
    chairman: String,
    secretary: String,
    attendees: Option<String>,
    agenda_items: Option<String>,
    decisions: Option<String>,
    next_meeting_date: Option<String>,
    chairman_signature: Option<Vec<u8>>,
    secretary_signature: Option<Vec<u8>>,
    watermark_image: Option<Vec<u8>>,
    status: String,
    signature_timestamp: Option<String>,
    created_at: String,
}

impl StoredRow {
    fn into_record(self) -> Result<MinutesRecord> {
        debug!("Decoding minutes record {}", self.id);
        Ok(MinutesRecord {
            reference_number: self.reference_number,
            department: self.department,
            org_name: self.org_name,
            executive_summary: self.executive_summary,
            title: self.title,
            date: self.date,
            time: self.time,
            duration: self.duration,
            location: self.location,
            meeting_type: MeetingType::parse(&self.meeting_type)?,
            chairman: self.chairman,
            secretary: self.secretary,
            attendees: codec::decode("attendees", self.attendees.as_deref())?,
            agenda_items: codec::decode("agenda_items", self.agenda_items.as_deref())?,
            decisions: codec::decode("decisions", self.decisions.as_deref())?,
            next_meeting_date: self.next_meeting_date,
            chairman_signature: self.chairman_signature,
            secretary_signature: self.secretary_signature,
            watermark_image: self.watermark_image,
            status: Status::parse(&self.status)?,
            signature_timestamp: self
                .signature_timestamp
                .as_deref()
                .map(|t| parse_timestamp("signature_timestamp", t))
                .transpose()?,
            created_at: parse_timestamp("created_at", &self.created_at)?,
        })
    }
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(column: &'static str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Codec {
            collection: column,
            message: format!("invalid timestamp '{value}': {e}"),
        })
}
