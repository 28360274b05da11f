//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! Builders and the dataset code call store methods and never execute
//! SQL directly.

use crate::error::PipelineResult;
mod inputs;
mod panel;
use rusqlite::{params, Connection, OptionalExtension};

pub use panel::quote_ident;

pub struct PanelStore {
    conn: Connection,
}

impl PanelStore {
    pub fn open(path: &str) -> PipelineResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only for real files (:memory: ignores it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> PipelineResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> PipelineResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_inputs.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, version: &str, config_json: &str) -> PipelineResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, version, config_json) VALUES (?1, ?2, ?3)",
            params![run_id, version, config_json],
        )?;
        Ok(())
    }

    pub fn save_manifest(&self, run_id: &str, manifest_json: &str) -> PipelineResult<()> {
        self.conn.execute(
            "UPDATE run SET manifest_json = ?2 WHERE run_id = ?1",
            params![run_id, manifest_json],
        )?;
        Ok(())
    }

    pub fn manifest_json(&self, run_id: &str) -> PipelineResult<Option<String>> {
        let manifest = self
            .conn
            .query_row(
                "SELECT manifest_json FROM run WHERE run_id = ?1",
                params![run_id],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(manifest.flatten())
    }

    fn table_exists(&self, table: &str) -> PipelineResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn row_count(&self, table: &str) -> PipelineResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        Ok(self.conn.query_row(&sql, [], |row| row.get(0))?)
    }
}
