//! SQLite Reflection Store
//!
//! Durable store for submitted reflections. Text answers live in
//! `daybook.db`; image bytes are written to `images/` next to it and
//! referenced from the `images` table.
//!
//! # Schema
//!
//! ```text
//! reflections(id, type, date, priorities, intention, reflection, challenges, tomorrow)
//! images(id, filename, path, reflection_id → reflections.id, uploaded_at)
//! ```
//!
//! Dates are stored as RFC 3339 UTC strings with millisecond precision so
//! lexical order matches chronological order.

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::error::{StoreError, StoreResult};
use super::types::{ReflectionId, StoredImage, StoredReflection};
use super::ReflectionStore;
use crate::journal::{ReportMode, Submission};

/// Answer columns, in table order
const ANSWER_COLUMNS: [&str; 5] = ["priorities", "intention", "reflection", "challenges", "tomorrow"];

/// SQLite-backed reflection store
pub struct SqliteStore {
    /// std::sync::Mutex because rusqlite::Connection is !Sync
    conn: Mutex<Connection>,
    db_path: PathBuf,
    images_dir: PathBuf,
}

impl SqliteStore {
    /// Create or open a store under `data_dir`
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(data_dir)?;
        let images_dir = data_dir.join("images");
        std::fs::create_dir_all(&images_dir)?;

        let db_path = data_dir.join("daybook.db");
        let conn = Connection::open_with_flags(
            &db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            ",
        )?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS reflections (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type TEXT NOT NULL,
                date TEXT NOT NULL,
                priorities TEXT,
                intention TEXT,
                reflection TEXT,
                challenges TEXT,
                tomorrow TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_reflections_date ON reflections(date);

            CREATE TABLE IF NOT EXISTS images (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                filename TEXT NOT NULL,
                path TEXT NOT NULL,
                reflection_id INTEGER NOT NULL REFERENCES reflections(id),
                uploaded_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_images_reflection ON images(reflection_id);
            ",
        )?;

        tracing::info!(path = ?db_path, "Opened reflection store");

        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
            images_dir,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    /// Save a submission with an explicit timestamp
    pub fn insert(
        &self,
        submission: &Submission,
        created_at: DateTime<Utc>,
    ) -> StoreResult<ReflectionId> {
        let written = self.write_images(submission)?;

        match self.insert_rows(submission, created_at, &written) {
            Ok(id) => {
                tracing::info!(
                    reflection_id = id,
                    mode = %submission.mode,
                    images = written.len(),
                    "Stored reflection"
                );
                Ok(id)
            }
            Err(e) => {
                remove_files(&written);
                Err(e)
            }
        }
    }

    /// First reflection of a mode saved on a calendar day (UTC)
    pub fn find_by_date(
        &self,
        date: NaiveDate,
        mode: ReportMode,
    ) -> StoreResult<Option<StoredReflection>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT id, type, date, priorities, intention, reflection, challenges, tomorrow
                 FROM reflections
                 WHERE substr(date, 1, 10) = ?1 AND type = ?2
                 ORDER BY date, id
                 LIMIT 1",
                params![date.format("%Y-%m-%d").to_string(), mode.as_str()],
                ReflectionRow::from_row,
            )
            .optional()?;

        match row {
            Some(row) => {
                let images = load_images(&conn, row.id)?;
                Ok(Some(row.into_stored(images)?))
            }
            None => Ok(None),
        }
    }

    /// Reflections saved in `[start, end]`, oldest first
    pub fn list_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<StoredReflection>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(
            "SELECT id, type, date, priorities, intention, reflection, challenges, tomorrow
             FROM reflections
             WHERE date >= ?1 AND date <= ?2
             ORDER BY date, id",
        )?;

        let rows = stmt
            .query_map(
                params![format_timestamp(start), format_timestamp(end)],
                ReflectionRow::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|row| {
                let images = load_images(&conn, row.id)?;
                row.into_stored(images)
            })
            .collect()
    }

    /// Reflections from the last 7 days
    pub fn weekly(&self) -> StoreResult<Vec<StoredReflection>> {
        let end = Utc::now();
        self.list_range(end - Duration::days(7), end)
    }

    /// Total number of stored reflections
    pub fn count(&self) -> StoreResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM reflections", [], |r| r.get(0))?;
        Ok(count as u64)
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Lock(format!("Failed to acquire database lock: {}", e)))
    }

    fn write_images(&self, submission: &Submission) -> StoreResult<Vec<(String, PathBuf)>> {
        let mut written = Vec::with_capacity(submission.images.len());

        for image in &submission.images {
            let ext = image.file().extension().unwrap_or_else(|| "bin".to_string());
            let path = self.images_dir.join(format!("{}.{}", Uuid::new_v4(), ext));

            if let Err(e) = std::fs::write(&path, image.file().data()) {
                remove_files(&written);
                return Err(e.into());
            }
            written.push((image.name().to_string(), path));
        }

        Ok(written)
    }

    fn insert_rows(
        &self,
        submission: &Submission,
        created_at: DateTime<Utc>,
        images: &[(String, PathBuf)],
    ) -> StoreResult<ReflectionId> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let timestamp = format_timestamp(created_at);

        tx.execute(
            "INSERT INTO reflections (type, date, priorities, intention, reflection, challenges, tomorrow)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                submission.mode.as_str(),
                timestamp,
                submission.answer(ANSWER_COLUMNS[0]),
                submission.answer(ANSWER_COLUMNS[1]),
                submission.answer(ANSWER_COLUMNS[2]),
                submission.answer(ANSWER_COLUMNS[3]),
                submission.answer(ANSWER_COLUMNS[4]),
            ],
        )?;
        let id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO images (filename, path, reflection_id, uploaded_at)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (filename, path) in images {
                stmt.execute(params![filename, path.to_string_lossy().into_owned(), id, timestamp])?;
            }
        }

        tx.commit()?;
        Ok(id)
    }
}

#[async_trait]
impl ReflectionStore for SqliteStore {
    async fn save_reflection(&self, submission: &Submission) -> StoreResult<ReflectionId> {
        self.insert(submission, Utc::now())
    }
}

/// Raw row before mode and date are decoded
struct ReflectionRow {
    id: i64,
    mode: String,
    date: String,
    answers: [Option<String>; 5],
}

impl ReflectionRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            mode: row.get(1)?,
            date: row.get(2)?,
            answers: [row.get(3)?, row.get(4)?, row.get(5)?, row.get(6)?, row.get(7)?],
        })
    }

    fn into_stored(self, images: Vec<StoredImage>) -> StoreResult<StoredReflection> {
        let mode = self
            .mode
            .parse::<ReportMode>()
            .map_err(|e| StoreError::Corrupt(format!("reflection {}: {}", self.id, e)))?;

        let answers: BTreeMap<String, String> = ANSWER_COLUMNS
            .iter()
            .zip(self.answers)
            .filter_map(|(column, value)| value.map(|v| (column.to_string(), v)))
            .collect();

        Ok(StoredReflection {
            id: self.id,
            mode,
            created_at: parse_timestamp(&self.date)?,
            answers,
            images,
        })
    }
}

fn load_images(conn: &Connection, reflection_id: i64) -> StoreResult<Vec<StoredImage>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, filename, path, uploaded_at FROM images
         WHERE reflection_id = ?1
         ORDER BY id",
    )?;

    let rows = stmt
        .query_map(params![reflection_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter()
        .map(|(id, filename, path, uploaded_at)| {
            Ok(StoredImage {
                id,
                filename,
                path,
                uploaded_at: parse_timestamp(&uploaded_at)?,
            })
        })
        .collect()
}

fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_timestamp(raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("invalid timestamp '{}': {}", raw, e)))
}

fn remove_files(written: &[(String, PathBuf)]) {
    for (_, path) in written {
        if let Err(e) = std::fs::remove_file(path) {
            tracing::warn!(path = ?path, error = %e, "Failed to remove orphaned image");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::{ImagePicker, ReflectionRecord, SelectedFile};
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn morning() -> Submission {
        ReflectionRecord::new()
            .with_field("priorities", "Finish design doc")
            .with_field("intention", "Deep work block")
            .snapshot(ReportMode::Morning)
    }

    #[test]
    fn test_store_creation() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();
        assert!(store.db_path().exists());
        assert!(store.images_dir().is_dir());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_insert_and_find_by_date() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 7, 30, 0).unwrap();

        let id = store.insert(&morning(), at).unwrap();

        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let found = store.find_by_date(date, ReportMode::Morning).unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.created_at, at);
        assert_eq!(found.answer("priorities"), Some("Finish design doc"));
        assert_eq!(found.answer("reflection"), None);

        assert!(store.find_by_date(date, ReportMode::Evening).unwrap().is_none());
        let other_day = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert!(store.find_by_date(other_day, ReportMode::Morning).unwrap().is_none());
    }

    #[test]
    fn test_empty_answers_stored_as_empty_strings() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 21, 0, 0).unwrap();

        store
            .insert(&ReflectionRecord::new().snapshot(ReportMode::Evening), at)
            .unwrap();

        let date = at.date_naive();
        let found = store.find_by_date(date, ReportMode::Evening).unwrap().unwrap();
        assert_eq!(found.answer("reflection"), Some(""));
        assert_eq!(found.answer("challenges"), Some(""));
        assert_eq!(found.answer("tomorrow"), Some(""));
        assert!(found.images.is_empty());
    }

    #[test]
    fn test_images_written_to_disk() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();
        let picker = ImagePicker::default();

        let images = picker.on_drop(vec![SelectedFile::new("sunset.png", "image/png", vec![9, 9, 9])]);
        let submission = ReflectionRecord::new()
            .with_images(images)
            .snapshot(ReportMode::Evening);
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 21, 0, 0).unwrap();
        store.insert(&submission, at).unwrap();

        let found = store
            .find_by_date(at.date_naive(), ReportMode::Evening)
            .unwrap()
            .unwrap();
        assert_eq!(found.images.len(), 1);
        assert_eq!(found.images[0].filename, "sunset.png");
        assert!(found.images[0].path.ends_with(".png"));
        assert_eq!(std::fs::read(&found.images[0].path).unwrap(), vec![9, 9, 9]);
    }

    #[test]
    fn test_list_range_ordered() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();
        let day = |d| Utc.with_ymd_and_hms(2026, 10, d, 8, 0, 0).unwrap();

        store.insert(&morning(), day(12)).unwrap();
        store.insert(&morning(), day(10)).unwrap();
        store.insert(&morning(), day(1)).unwrap();

        let found = store.list_range(day(5), day(15)).unwrap();
        let days: Vec<_> = found.iter().map(|r| r.created_at).collect();
        assert_eq!(days, vec![day(10), day(12)]);
    }

    #[test]
    fn test_weekly_window() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();

        store.insert(&morning(), Utc::now() - Duration::days(2)).unwrap();
        store.insert(&morning(), Utc::now() - Duration::days(30)).unwrap();

        assert_eq!(store.weekly().unwrap().len(), 1);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_reopen_keeps_data() {
        let dir = tempdir().unwrap();
        {
            let store = SqliteStore::open(dir.path()).unwrap();
            store.insert(&morning(), Utc::now()).unwrap();
        }
        let store = SqliteStore::open(dir.path()).unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_save_through_port() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();

        let id = store.save_reflection(&morning()).await.unwrap();
        assert!(id > 0);
    }
}
