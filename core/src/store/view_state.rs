use super::MetricsStore;
use crate::{error::MetricsResult, types::Millis};
use rusqlite::{params, OptionalExtension};

impl MetricsStore {
    // ── View state ─────────────────────────────────────────────────

    pub fn put_view_state(&self, state_key: &str, payload: &str, now: Millis) -> MetricsResult<()> {
        self.conn.execute(
            "INSERT INTO view_state (state_key, payload, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(state_key) DO UPDATE SET payload = excluded.payload,
                                                  updated_at = excluded.updated_at",
            params![state_key, payload, now],
        )?;
        Ok(())
    }

    pub fn get_view_state(&self, state_key: &str) -> MetricsResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT payload FROM view_state WHERE state_key = ?1",
                params![state_key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn view_state_updated_at(&self, state_key: &str) -> MetricsResult<Option<Millis>> {
        self.conn
            .query_row(
                "SELECT updated_at FROM view_state WHERE state_key = ?1",
                params![state_key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    pub fn view_state_count(&self) -> MetricsResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM view_state", [], |row| row.get(0))
            .map_err(Into::into)
    }
}
