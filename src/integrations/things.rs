//! Things 3 Integration
//!
//! Reads the local Things 3 database (read-only) for:
//! - Today's open to-dos, grouped by area
//! - To-dos completed yesterday, grouped by area or project
//! - To-dos completed since the start of yesterday, grouped by day
//!
//! Things stores calendar dates packed into an integer
//! (`year << 16 | month << 12 | day << 7`) and completion times as unix
//! seconds.

use super::*;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rusqlite::{params, Connection, OpenFlags, Row};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const THINGS_CONTAINER: &str = "Library/Group Containers/JLMPQHK86H.com.culturedcode.ThingsMac";
const THINGS_DATABASE: &str = "Things Database.thingsdatabase/main.sqlite";

/// Tag separator inside GROUP_CONCAT (unit separator, never typed by hand)
const TAG_SEPARATOR: char = '\u{1f}';

const NO_AREA: &str = "No Area";
const NO_PROJECT: &str = "No Project";

/// Locate `main.sqlite` in the Things group container, if installed
pub fn default_things_db() -> Option<PathBuf> {
    let container = dirs::home_dir()?.join(THINGS_CONTAINER);

    // Things 3.15+ keeps the database in a ThingsData-XXXXX subdirectory
    let nested = std::fs::read_dir(&container).ok().and_then(|entries| {
        entries
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().starts_with("ThingsData-"))
            .map(|entry| entry.path().join(THINGS_DATABASE))
            .find(|path| path.exists())
    });

    nested.or_else(|| {
        let legacy = container.join(THINGS_DATABASE);
        legacy.exists().then_some(legacy)
    })
}

/// An open to-do scheduled for today
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodayTask {
    pub title: String,
    pub notes: String,
    pub project_title: Option<String>,
    pub today_index: i64,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
}

/// A to-do from the logbook
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletedTask {
    pub title: String,
    pub notes: String,
    pub completed_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

/// Tasks sharing an area or project
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskGroup<T> {
    pub name: String,
    pub tasks: Vec<T>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TodayTasks {
    pub date: NaiveDate,
    pub total: usize,
    /// Areas in Today-list order
    pub areas: Vec<TaskGroup<TodayTask>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct YesterdayCompleted {
    pub date: NaiveDate,
    pub total_completed: usize,
    /// Sorted by name
    pub projects: Vec<TaskGroup<CompletedTask>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletedDay {
    pub date: NaiveDate,
    pub total_completed: usize,
    pub projects: Vec<TaskGroup<CompletedTask>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentCompleted {
    pub total_completed: usize,
    /// Most recent day first
    pub days: Vec<CompletedDay>,
}

/// Read-only view over a Things 3 database
#[derive(Debug, Clone)]
pub struct ThingsIntegration {
    db_path: PathBuf,
}

impl ThingsIntegration {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn open(&self) -> Result<Connection, IntegrationError> {
        if !self.db_path.exists() {
            return Err(IntegrationError::NotConfigured("Things 3 database"));
        }
        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(conn)
    }

    /// Open to-dos in the Today list as of `today`
    pub fn today_tasks_on(&self, today: NaiveDate) -> Result<TodayTasks, IntegrationError> {
        let conn = self.open()?;
        let mut stmt = conn.prepare_cached(
            "SELECT t.title, t.notes, t.todayIndex, t.startDate, t.deadline,
                    COALESCE(a.title, pa.title), p.title
             FROM TMTask t
             LEFT JOIN TMTask h ON h.uuid = t.heading
             LEFT JOIN TMTask p ON p.uuid = COALESCE(t.project, h.project)
             LEFT JOIN TMArea a ON a.uuid = t.area
             LEFT JOIN TMArea pa ON pa.uuid = p.area
             WHERE t.type = 0 AND t.status = 0 AND t.trashed = 0
               AND t.start = 1 AND t.startDate IS NOT NULL AND t.startDate <= ?1
             ORDER BY t.todayIndex, t.startDate",
        )?;

        let rows = stmt.query_map(params![pack_date(today)], |row| {
            let area: Option<String> = row.get(5)?;
            let project: Option<String> = row.get(6)?;
            let task = TodayTask {
                title: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                notes: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                project_title: project.clone(),
                today_index: row.get::<_, Option<i64>>(2)?.unwrap_or_default(),
                start_date: row.get::<_, Option<i64>>(3)?.and_then(unpack_date),
                deadline: row.get::<_, Option<i64>>(4)?.and_then(unpack_date),
            };
            let group = non_empty(area)
                .or_else(|| non_empty(project))
                .unwrap_or_else(|| NO_AREA.to_string());
            Ok((group, task))
        })?;

        let mut areas: Vec<TaskGroup<TodayTask>> = Vec::new();
        let mut total = 0;
        for row in rows {
            let (group, task) = row?;
            total += 1;
            match areas.iter_mut().find(|g| g.name == group) {
                Some(existing) => existing.tasks.push(task),
                None => areas.push(TaskGroup {
                    name: group,
                    tasks: vec![task],
                }),
            }
        }

        tracing::debug!(%today, total, "Read Things 3 Today list");
        Ok(TodayTasks {
            date: today,
            total,
            areas,
        })
    }

    /// To-dos completed on the day before `today`
    pub fn yesterday_completed_on(
        &self,
        today: NaiveDate,
    ) -> Result<YesterdayCompleted, IntegrationError> {
        let yesterday = today - Duration::days(1);
        let tasks = self.completed_between(yesterday, today)?;

        Ok(YesterdayCompleted {
            date: yesterday,
            total_completed: tasks.len(),
            projects: group_by_name(tasks),
        })
    }

    /// To-dos completed yesterday or today, newest day first
    pub fn recent_completed_on(
        &self,
        today: NaiveDate,
    ) -> Result<RecentCompleted, IntegrationError> {
        let yesterday = today - Duration::days(1);
        let tasks = self.completed_between(yesterday, today + Duration::days(1))?;
        let total_completed = tasks.len();

        let mut by_day: BTreeMap<NaiveDate, Vec<(String, CompletedTask)>> = BTreeMap::new();
        for (group, task) in tasks {
            by_day
                .entry(task.completed_at.date_naive())
                .or_default()
                .push((group, task));
        }

        let days = by_day
            .into_iter()
            .rev()
            .map(|(date, tasks)| CompletedDay {
                date,
                total_completed: tasks.len(),
                projects: group_by_name(tasks),
            })
            .collect();

        Ok(RecentCompleted {
            total_completed,
            days,
        })
    }

    /// Completed to-dos with `start <= day < end` (UTC days)
    fn completed_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<(String, CompletedTask)>, IntegrationError> {
        let conn = self.open()?;
        let mut stmt = conn.prepare_cached(
            "SELECT t.title, t.notes, t.stopDate,
                    COALESCE(a.title, pa.title), p.title,
                    (SELECT GROUP_CONCAT(tg.title, char(31))
                     FROM TMTaskTag tt JOIN TMTag tg ON tg.uuid = tt.tags
                     WHERE tt.tasks = t.uuid)
             FROM TMTask t
             LEFT JOIN TMTask h ON h.uuid = t.heading
             LEFT JOIN TMTask p ON p.uuid = COALESCE(t.project, h.project)
             LEFT JOIN TMArea a ON a.uuid = t.area
             LEFT JOIN TMArea pa ON pa.uuid = p.area
             WHERE t.type = 0 AND t.status = 3 AND t.trashed = 0
               AND t.stopDate >= ?1 AND t.stopDate < ?2
             ORDER BY t.stopDate",
        )?;

        let rows = stmt.query_map(
            params![day_start(start) as f64, day_start(end) as f64],
            completed_row,
        )?;

        let tasks = rows.collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(%start, %end, count = tasks.len(), "Read Things 3 logbook");
        Ok(tasks)
    }

    pub async fn today_tasks(&self) -> Result<TodayTasks, IntegrationError> {
        let this = self.clone();
        let today = Utc::now().date_naive();
        tokio::task::spawn_blocking(move || this.today_tasks_on(today)).await?
    }

    pub async fn yesterday_completed(&self) -> Result<YesterdayCompleted, IntegrationError> {
        let this = self.clone();
        let today = Utc::now().date_naive();
        tokio::task::spawn_blocking(move || this.yesterday_completed_on(today)).await?
    }

    pub async fn recent_completed(&self) -> Result<RecentCompleted, IntegrationError> {
        let this = self.clone();
        let today = Utc::now().date_naive();
        tokio::task::spawn_blocking(move || this.recent_completed_on(today)).await?
    }
}

#[async_trait]
impl Integration for ThingsIntegration {
    fn name(&self) -> &str {
        "things"
    }

    fn description(&self) -> &str {
        "Today's tasks and completed tasks from Things 3"
    }

    async fn check(&self) -> Result<(), IntegrationError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || {
            let conn = this.open()?;
            conn.query_row("SELECT COUNT(*) FROM TMTask", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await?
    }
}

fn completed_row(row: &Row<'_>) -> rusqlite::Result<(String, CompletedTask)> {
    let stop: f64 = row.get(2)?;
    let area: Option<String> = row.get(3)?;
    let project: Option<String> = row.get(4)?;
    let mut tags: Vec<String> = row
        .get::<_, Option<String>>(5)?
        .map(|joined| joined.split(TAG_SEPARATOR).map(str::to_string).collect())
        .unwrap_or_default();
    tags.sort();

    let task = CompletedTask {
        title: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
        notes: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        completed_at: DateTime::from_timestamp(stop as i64, 0).unwrap_or_default(),
        tags,
    };
    let group = non_empty(area)
        .or_else(|| non_empty(project))
        .unwrap_or_else(|| NO_PROJECT.to_string());
    Ok((group, task))
}

fn group_by_name<T>(tasks: Vec<(String, T)>) -> Vec<TaskGroup<T>> {
    let mut groups: BTreeMap<String, Vec<T>> = BTreeMap::new();
    for (name, task) in tasks {
        groups.entry(name).or_default().push(task);
    }
    groups
        .into_iter()
        .map(|(name, tasks)| TaskGroup { name, tasks })
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn day_start(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Things' packed calendar date
fn pack_date(date: NaiveDate) -> i64 {
    (i64::from(date.year()) << 16) | (i64::from(date.month()) << 12) | (i64::from(date.day()) << 7)
}

fn unpack_date(packed: i64) -> Option<NaiveDate> {
    let year = (packed >> 16) as i32;
    let month = ((packed >> 12) & 0xF) as u32;
    let day = ((packed >> 7) & 0x1F) as u32;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    fn at(raw: &str) -> f64 {
        DateTime::parse_from_rfc3339(raw).unwrap().timestamp() as f64
    }

    /// Minimal slice of the Things 3 schema
    fn fixture(dir: &Path) -> ThingsIntegration {
        let path = dir.join("main.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE TMArea (uuid TEXT PRIMARY KEY, title TEXT);
             CREATE TABLE TMTag (uuid TEXT PRIMARY KEY, title TEXT);
             CREATE TABLE TMTaskTag (tasks TEXT, tags TEXT);
             CREATE TABLE TMTask (
                 uuid TEXT PRIMARY KEY, title TEXT, notes TEXT,
                 type INTEGER, status INTEGER, trashed INTEGER, start INTEGER,
                 startDate INTEGER, todayIndex INTEGER, stopDate REAL, deadline INTEGER,
                 area TEXT, project TEXT, heading TEXT
             );
             INSERT INTO TMArea VALUES ('area-work', 'Work'), ('area-home', 'Home');
             INSERT INTO TMTag VALUES ('tag-deep', 'deep work'), ('tag-quick', 'quick');",
        )
        .unwrap();

        let today = pack_date(date("2024-03-14"));
        let tomorrow = pack_date(date("2024-03-15"));
        let task = |uuid: &str,
                    title: &str,
                    ty: i64,
                    status: i64,
                    start: i64,
                    start_date: Option<i64>,
                    today_index: i64,
                    stop: Option<f64>,
                    area: Option<&str>,
                    project: Option<&str>| {
            conn.execute(
                "INSERT INTO TMTask (uuid, title, notes, type, status, trashed, start, startDate,
                                     todayIndex, stopDate, deadline, area, project, heading)
                 VALUES (?1, ?2, '', ?3, ?4, 0, ?5, ?6, ?7, ?8, NULL, ?9, ?10, NULL)",
                params![uuid, title, ty, status, start, start_date, today_index, stop, area, project],
            )
            .unwrap();
        };

        task("proj-launch", "Launch", 1, 0, 1, None, 0, None, Some("area-work"), None);
        task("t1", "Review PR", 0, 0, 1, Some(today), 2, None, None, Some("proj-launch"));
        task("t2", "Water plants", 0, 0, 1, Some(today), 1, None, Some("area-home"), None);
        task("t3", "Write notes", 0, 0, 1, Some(today), 3, None, None, None);
        task("t4", "Next week", 0, 0, 1, Some(tomorrow), 0, None, None, None);
        task("t5", "Someday idea", 0, 0, 2, None, 0, None, None, None);
        task("t6", "Done already", 0, 3, 1, Some(today), 4, Some(at("2024-03-14T08:00:00Z")), None, None);

        task("c1", "Ship release", 0, 3, 1, None, 0, Some(at("2024-03-13T16:30:00Z")), None, Some("proj-launch"));
        task("c2", "Groceries", 0, 3, 1, None, 0, Some(at("2024-03-13T09:00:00Z")), Some("area-home"), None);
        task("c3", "Inbox zero", 0, 3, 1, None, 0, Some(at("2024-03-13T10:00:00Z")), None, None);
        task("c4", "Old task", 0, 3, 1, None, 0, Some(at("2024-03-12T10:00:00Z")), None, None);
        task("c5", "Cancelled", 0, 2, 1, None, 0, Some(at("2024-03-13T11:00:00Z")), None, None);

        conn.execute_batch(
            "INSERT INTO TMTaskTag VALUES ('c1', 'tag-deep'), ('c1', 'tag-quick');",
        )
        .unwrap();

        ThingsIntegration::new(path)
    }

    #[test]
    fn test_pack_date() {
        let day = date("2024-03-14");
        assert_eq!(pack_date(day), (2024 << 16) | (3 << 12) | (14 << 7));
        assert_eq!(unpack_date(pack_date(day)), Some(day));
        assert_eq!(unpack_date(0), None);
    }

    #[test]
    fn test_today_tasks() {
        let dir = tempdir().unwrap();
        let things = fixture(dir.path());

        let today = things.today_tasks_on(date("2024-03-14")).unwrap();
        assert_eq!(today.total, 3);

        let names: Vec<&str> = today.areas.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Home", "Work", NO_AREA]);

        let work = &today.areas[1];
        assert_eq!(work.tasks[0].title, "Review PR");
        assert_eq!(work.tasks[0].project_title.as_deref(), Some("Launch"));
        assert_eq!(work.tasks[0].start_date, Some(date("2024-03-14")));
    }

    #[test]
    fn test_yesterday_completed() {
        let dir = tempdir().unwrap();
        let things = fixture(dir.path());

        let done = things.yesterday_completed_on(date("2024-03-14")).unwrap();
        assert_eq!(done.date, date("2024-03-13"));
        assert_eq!(done.total_completed, 3);

        let names: Vec<&str> = done.projects.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Home", NO_PROJECT, "Work"]);

        let release = &done.projects[2].tasks[0];
        assert_eq!(release.title, "Ship release");
        assert_eq!(release.tags, vec!["deep work", "quick"]);
    }

    #[test]
    fn test_recent_completed_newest_day_first() {
        let dir = tempdir().unwrap();
        let things = fixture(dir.path());

        let recent = things.recent_completed_on(date("2024-03-14")).unwrap();
        assert_eq!(recent.total_completed, 4);
        assert_eq!(recent.days.len(), 2);
        assert_eq!(recent.days[0].date, date("2024-03-14"));
        assert_eq!(recent.days[0].total_completed, 1);
        assert_eq!(recent.days[1].date, date("2024-03-13"));
        assert_eq!(recent.days[1].total_completed, 3);
    }

    #[test]
    fn test_missing_database() {
        let dir = tempdir().unwrap();
        let things = ThingsIntegration::new(dir.path().join("absent.sqlite"));

        let err = things.today_tasks_on(date("2024-03-14")).unwrap_err();
        assert!(matches!(err, IntegrationError::NotConfigured(_)));
    }

    #[tokio::test]
    async fn test_check() {
        let dir = tempdir().unwrap();
        let things = fixture(dir.path());
        assert!(things.check().await.is_ok());
        assert_eq!(things.name(), "things");
    }
}
