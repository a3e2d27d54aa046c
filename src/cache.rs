use crate::error::{HotspotError, Result};
use crate::model::{Commit, FileChange, SCHEMA_VERSION};
use chrono::{TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::debug;

/// Commit metadata and file changes keyed by commit id, so later scans can
/// skip tree diffs. Commits are immutable, so entries never go stale.
pub struct Cache {
    conn: Connection,
}

impl Cache {
    pub fn new<P: AsRef<Path>>(cache_dir: P) -> Result<Self> {
        let cache_dir = cache_dir.as_ref();
        std::fs::create_dir_all(cache_dir)?;
        let db_path = cache_dir.join("cache.db");
        debug!(path = %db_path.display(), "opening commit cache");
        let conn = Connection::open(&db_path)?;
        let mut cache = Self { conn };
        cache.initialize()?;
        Ok(cache)
    }

    pub fn in_memory() -> Result<Self> {
        let mut cache = Self { conn: Connection::open_in_memory()? };
        cache.initialize()?;
        Ok(cache)
    }

    fn initialize(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS commits (
                id TEXT PRIMARY KEY,
                author_name TEXT NOT NULL,
                message TEXT NOT NULL,
                timestamp INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS changes (
                commit_id TEXT NOT NULL,
                seq INTEGER NOT NULL,
                old_path TEXT,
                new_path TEXT,
                PRIMARY KEY (commit_id, seq),
                FOREIGN KEY (commit_id) REFERENCES commits(id)
            );
            CREATE INDEX IF NOT EXISTS idx_commits_timestamp ON commits(timestamp);
            ",
        )?;
        self.check_schema_version()?;
        Ok(())
    }

    fn check_schema_version(&mut self) -> Result<()> {
        let user_version: i64 = self
            .conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))?;

        if user_version == 0 {
            let set_stmt = format!("PRAGMA user_version = {SCHEMA_VERSION};");
            self.conn.execute_batch(&set_stmt)?;
        } else if user_version != SCHEMA_VERSION as i64 {
            return Err(HotspotError::Cache(format!(
                "Schema version mismatch: expected {}, found {}",
                SCHEMA_VERSION, user_version
            )));
        }

        Ok(())
    }

    pub fn get_commit(&self, commit_id: &str) -> Result<Option<Commit>> {
        let header = self
            .conn
            .query_row(
                "SELECT author_name, message, timestamp FROM commits WHERE id = ?",
                params![commit_id],
                |row| {
                    let author_name: String = row.get(0)?;
                    let message: String = row.get(1)?;
                    let ts: i64 = row.get(2)?;
                    Ok((author_name, message, ts))
                },
            )
            .optional()?;

        let Some((author_name, message, ts)) = header else {
            return Ok(None);
        };

        let timestamp = Utc
            .timestamp_opt(ts, 0)
            .single()
            .ok_or_else(|| HotspotError::Cache(format!("Invalid cached timestamp: {ts}")))?;

        let mut stmt = self
            .conn
            .prepare_cached("SELECT old_path, new_path FROM changes WHERE commit_id = ? ORDER BY seq")?;
        let changes = stmt
            .query_map(params![commit_id], |row| {
                Ok(FileChange {
                    old_path: row.get(0)?,
                    new_path: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some(Commit {
            id: commit_id.to_string(),
            message,
            author_name,
            timestamp,
            changes,
        }))
    }

    pub fn store_commit(&self, commit: &Commit) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            tx.execute(
                "INSERT OR REPLACE INTO commits (id, author_name, message, timestamp)
                 VALUES (?, ?, ?, ?)",
                params![commit.id, commit.author_name, commit.message, commit.timestamp.timestamp()],
            )?;
            tx.execute("DELETE FROM changes WHERE commit_id = ?", params![commit.id])?;

            let mut insert_change = tx.prepare(
                "INSERT INTO changes (commit_id, seq, old_path, new_path) VALUES (?, ?, ?, ?)",
            )?;
            for (seq, change) in commit.changes.iter().enumerate() {
                insert_change.execute(params![
                    commit.id,
                    seq as i64,
                    change.old_path,
                    change.new_path
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn commit_count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM commits", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
