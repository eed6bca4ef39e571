//! SQLite-based session storage and statistics.
//!
//! Provides persistent storage for:
//! - Completed phases (pomodoros, breaks, active recall)
//! - Aggregate statistics (daily and all-time)

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{data_dir, AnalyticsSink};
use crate::error::{DatabaseError, Result};
use crate::timer::{CompletedPhase, Phase};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: i64,
    pub phase: Phase,
    pub duration_min: u32,
    pub completed: bool,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Stats {
    pub total_sessions: u64,
    pub completed_pomodoros: u64,
    pub total_focus_min: u64,
    pub total_short_break_min: u64,
    pub total_long_break_min: u64,
    pub total_active_recall_min: u64,
    /// A cycle counts as finished once its long break completes.
    pub completed_cycles: u64,
    pub today_sessions: u64,
    pub today_focus_min: u64,
}

/// SQLite database for session storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/pomocycle/pomocycle.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("pomocycle.db"))
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS sessions (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                phase        TEXT NOT NULL,
                duration_min INTEGER NOT NULL,
                completed    INTEGER NOT NULL DEFAULT 1,
                completed_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_completed_at ON sessions(completed_at);
            CREATE INDEX IF NOT EXISTS idx_sessions_phase ON sessions(phase);",
        )?;
        Ok(())
    }

    /// Record a finished phase.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_phase(
        &self,
        phase: Phase,
        duration_min: u32,
        completed: bool,
        completed_at: DateTime<Utc>,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO sessions (phase, duration_min, completed, completed_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                phase.as_str(),
                duration_min,
                completed,
                completed_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent sessions first.
    pub fn recent_sessions(&self, limit: usize) -> Result<Vec<SessionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, phase, duration_min, completed, completed_at
             FROM sessions
             ORDER BY id DESC
             LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, phase, duration_min, completed, completed_at) = row?;
            let phase = phase.parse::<Phase>().map_err(DatabaseError::CorruptRow)?;
            let completed_at = DateTime::parse_from_rfc3339(&completed_at)
                .map_err(|e| DatabaseError::CorruptRow(e.to_string()))?
                .with_timezone(&Utc);
            records.push(SessionRecord {
                id,
                phase,
                duration_min,
                completed,
                completed_at,
            });
        }
        Ok(records)
    }

    pub fn stats_today(&self) -> Result<Stats> {
        let mut stats = self.aggregate(Some(today_start()))?;
        stats.today_sessions = stats.total_sessions;
        stats.today_focus_min = stats.total_focus_min;
        Ok(stats)
    }

    pub fn stats_all(&self) -> Result<Stats> {
        let mut stats = self.aggregate(None)?;
        let today = self.aggregate(Some(today_start()))?;
        stats.today_sessions = today.total_sessions;
        stats.today_focus_min = today.total_focus_min;
        Ok(stats)
    }

    fn aggregate(&self, since: Option<String>) -> Result<Stats> {
        let mut stmt = self.conn.prepare(
            "SELECT phase, COUNT(*), COALESCE(SUM(duration_min), 0)
             FROM sessions
             WHERE completed = 1 AND (?1 IS NULL OR completed_at >= ?1)
             GROUP BY phase",
        )?;
        let rows = stmt.query_map(params![since], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, u64>(2)?,
            ))
        })?;

        let mut stats = Stats::default();
        for row in rows {
            let (phase, count, minutes) = row?;
            stats.total_sessions += count;
            match phase.parse::<Phase>() {
                Ok(Phase::Pomodoro) => {
                    stats.completed_pomodoros += count;
                    stats.total_focus_min += minutes;
                }
                Ok(Phase::ShortBreak) => stats.total_short_break_min += minutes,
                Ok(Phase::LongBreak) => {
                    stats.completed_cycles += count;
                    stats.total_long_break_min += minutes;
                }
                Ok(Phase::ActiveRecall) => stats.total_active_recall_min += minutes,
                Err(e) => tracing::warn!(error = %e, "skipping unknown phase in stats"),
            }
        }
        Ok(stats)
    }
}

impl AnalyticsSink for Database {
    fn record(&mut self, completed: &CompletedPhase) {
        if let Err(e) = self.record_phase(completed.phase, completed.duration_min, true, Utc::now()) {
            tracing::warn!(phase = %completed.phase, error = %e, "failed to record completed phase");
        }
    }
}

fn today_start() -> String {
    let today = Utc::now().format("%Y-%m-%d").to_string();
    format!("{today}T00:00:00+00:00")
}
