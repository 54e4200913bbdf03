use super::MetricsStore;
use crate::error::MetricsResult;
use rusqlite::{params, OptionalExtension};

impl MetricsStore {
    // ── Preferences ────────────────────────────────────────────────

    pub fn put_preference(&self, pref_key: &str, value: &str) -> MetricsResult<()> {
        self.conn.execute(
            "INSERT INTO preference (pref_key, value) VALUES (?1, ?2)
             ON CONFLICT(pref_key) DO UPDATE SET value = excluded.value",
            params![pref_key, value],
        )?;
        Ok(())
    }

    pub fn get_preference(&self, pref_key: &str) -> MetricsResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM preference WHERE pref_key = ?1",
                params![pref_key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }
}
