//! Session Store (spec §4.4). Persists sessions (task + ordered turns) in
//! an embedded SQLite database so a crashed process can resume by id.

use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use sindri_domain::error::{Error, Result};
use sindri_domain::model::{Session, SessionStatus, SessionSummary, Turn, TurnRole};

pub struct SessionStore {
    conn: Mutex<Connection>,
}

impl SessionStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| Error::Database(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| Error::Database(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                task TEXT NOT NULL,
                model TEXT NOT NULL,
                status TEXT NOT NULL,
                iterations INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                completed_at TEXT
            );

            CREATE TABLE IF NOT EXISTS turns (
                session_id TEXT NOT NULL,
                sequence INTEGER NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                tool_calls TEXT NOT NULL,
                metadata TEXT NOT NULL,
                created_at TEXT NOT NULL,
                PRIMARY KEY (session_id, sequence),
                FOREIGN KEY (session_id) REFERENCES sessions(id)
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_status ON sessions(status);
            CREATE INDEX IF NOT EXISTS idx_turns_session ON turns(session_id);
            "#,
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    /// `create_session(task, model) -> Session`: allocates id, status=active.
    pub fn create_session(&self, task: impl Into<String>, model: impl Into<String>) -> Result<Session> {
        let session = Session::new(task.into(), model.into());
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO sessions (id, task, model, status, iterations, created_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                session.id.to_string(),
                session.task,
                session.model,
                status_str(session.status),
                session.iterations as i64,
                session.created_at.to_rfc3339(),
                Option::<String>::None,
            ],
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(session)
    }

    /// `append_turn(session_id, role, content, tool_calls)`: atomic append.
    pub fn append_turn(&self, session_id: Uuid, turn: &Turn) -> Result<()> {
        let conn = self.conn.lock();
        let sequence: i64 = conn
            .query_row(
                "SELECT COALESCE(MAX(sequence), -1) + 1 FROM turns WHERE session_id = ?1",
                params![session_id.to_string()],
                |row| row.get(0),
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        conn.execute(
            "INSERT INTO turns (session_id, sequence, role, content, tool_calls, metadata, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                session_id.to_string(),
                sequence,
                turn.role.to_string(),
                turn.content,
                serde_json::to_string(&turn.tool_calls).map_err(Error::Json)?,
                serde_json::to_string(&turn.metadata).map_err(Error::Json)?,
                turn.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    /// Advance the per-session iteration counter by one (spec §3:
    /// `iterations` is the "count of completed loop steps", not the number
    /// of turns appended) — the Loop calls this once per pass through its
    /// nine-step cycle, regardless of how many turns that pass produced.
    pub fn bump_iteration(&self, session_id: Uuid) -> Result<()> {
        let conn = self.conn.lock();
        let rows = conn
            .execute(
                "UPDATE sessions SET iterations = iterations + 1 WHERE id = ?1",
                params![session_id.to_string()],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        if rows == 0 {
            return Err(Error::Database(format!("session {session_id} not found")));
        }
        Ok(())
    }

    /// `complete_session(session_id, status)`: mark terminal; record completed_at.
    pub fn complete_session(&self, session_id: Uuid, status: SessionStatus) -> Result<()> {
        let conn = self.conn.lock();
        let rows = conn
            .execute(
                "UPDATE sessions SET status = ?1, completed_at = ?2 WHERE id = ?3",
                params![
                    status_str(status),
                    Utc::now().to_rfc3339(),
                    session_id.to_string()
                ],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        if rows == 0 {
            return Err(Error::Database(format!("session {session_id} not found")));
        }
        Ok(())
    }

    /// `load_session(session_id) -> Session`: loads with all turns, in order.
    pub fn load_session(&self, session_id: Uuid) -> Result<Session> {
        let conn = self.conn.lock();
        let (task, model, status, iterations, created_at, completed_at): (
            String,
            String,
            String,
            i64,
            String,
            Option<String>,
        ) = conn
            .query_row(
                "SELECT task, model, status, iterations, created_at, completed_at
                 FROM sessions WHERE id = ?1",
                params![session_id.to_string()],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?
            .ok_or_else(|| Error::Database(format!("session {session_id} not found")))?;

        let turns = self.load_turns(&conn, session_id)?;

        Ok(Session {
            id: session_id,
            task,
            model,
            status: parse_status(&status)?,
            iterations: iterations as u32,
            created_at: parse_ts(&created_at)?,
            completed_at: completed_at.map(|t| parse_ts(&t)).transpose()?,
            turns,
        })
    }

    fn load_turns(&self, conn: &Connection, session_id: Uuid) -> Result<Vec<Turn>> {
        let mut stmt = conn
            .prepare(
                "SELECT role, content, tool_calls, metadata, created_at
                 FROM turns WHERE session_id = ?1 ORDER BY sequence ASC",
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![session_id.to_string()], |row| {
                let role: String = row.get(0)?;
                let content: String = row.get(1)?;
                let tool_calls: String = row.get(2)?;
                let metadata: String = row.get(3)?;
                let created_at: String = row.get(4)?;
                Ok((role, content, tool_calls, metadata, created_at))
            })
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut turns = Vec::new();
        for row in rows {
            let (role, content, tool_calls, metadata, created_at) =
                row.map_err(|e| Error::Database(e.to_string()))?;
            turns.push(Turn {
                role: role.parse::<TurnRole>()?,
                content,
                tool_calls: serde_json::from_str(&tool_calls).map_err(Error::Json)?,
                metadata: serde_json::from_str(&metadata).map_err(Error::Json)?,
                created_at: parse_ts(&created_at)?,
            });
        }
        Ok(turns)
    }

    /// `list_sessions(limit, status?) -> list of summaries`.
    pub fn list_sessions(
        &self,
        limit: usize,
        status: Option<SessionStatus>,
    ) -> Result<Vec<SessionSummary>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT id, task, model, status, iterations, created_at, completed_at
                 FROM sessions
                 WHERE (?1 IS NULL OR status = ?1)
                 ORDER BY created_at DESC
                 LIMIT ?2",
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        let status_param = status.map(status_str);
        let rows = stmt
            .query_map(params![status_param, limit as i64], |row| {
                let id: String = row.get(0)?;
                let task: String = row.get(1)?;
                let model: String = row.get(2)?;
                let status: String = row.get(3)?;
                let iterations: i64 = row.get(4)?;
                let created_at: String = row.get(5)?;
                let completed_at: Option<String> = row.get(6)?;
                Ok((id, task, model, status, iterations, created_at, completed_at))
            })
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut summaries = Vec::new();
        for row in rows {
            let (id, task, model, status, iterations, created_at, completed_at) =
                row.map_err(|e| Error::Database(e.to_string()))?;
            summaries.push(SessionSummary {
                id: Uuid::parse_str(&id).map_err(|e| Error::Database(e.to_string()))?,
                task,
                model,
                status: parse_status(&status)?,
                iterations: iterations as u32,
                created_at: parse_ts(&created_at)?,
                completed_at: completed_at.map(|t| parse_ts(&t)).transpose()?,
            });
        }
        Ok(summaries)
    }

    /// `cleanup_stale_sessions(max_age_hours) -> int`: sessions still
    /// `active` beyond the age are marked `failed`. Run at process startup
    /// so a prior crashed run is not mistaken for live work.
    pub fn cleanup_stale_sessions(&self, max_age_hours: i64) -> Result<usize> {
        let cutoff = Utc::now() - chrono::Duration::hours(max_age_hours);
        let conn = self.conn.lock();
        let rows = conn
            .execute(
                "UPDATE sessions SET status = ?1, completed_at = ?2
                 WHERE status = ?3 AND created_at < ?4",
                params![
                    status_str(SessionStatus::Failed),
                    Utc::now().to_rfc3339(),
                    status_str(SessionStatus::Active),
                    cutoff.to_rfc3339(),
                ],
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(rows)
    }
}

fn status_str(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Active => "active",
        SessionStatus::Completed => "completed",
        SessionStatus::Failed => "failed",
        SessionStatus::Cancelled => "cancelled",
    }
}

fn parse_status(s: &str) -> Result<SessionStatus> {
    match s {
        "active" => Ok(SessionStatus::Active),
        "completed" => Ok(SessionStatus::Completed),
        "failed" => Ok(SessionStatus::Failed),
        "cancelled" => Ok(SessionStatus::Cancelled),
        other => Err(Error::Database(format!("unknown session status: {other}"))),
    }
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Database(format!("invalid timestamp '{s}': {e}")))
}
