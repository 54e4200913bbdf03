//! SQLite persistence layer.
//!
//! RULE: Only the store module talks to the database.
//! Callers use store methods and never execute SQL directly.

use crate::error::{MetricsError, MetricsResult};
use rusqlite::{Connection, OpenFlags};

mod preference;
mod view_state;

pub struct MetricsStore {
    conn: Connection,
}

impl MetricsStore {
    /// Open (or create) the metrics database at `path`.
    pub fn open(path: &str) -> MetricsResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> MetricsResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> MetricsResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        Ok(())
    }
}

/// Outcome of a best-effort write.
///
/// Storage may be missing, full or read-only; none of that is ever shown to
/// the user. The failure is kept in the value so call sites decide to
/// ignore it explicitly instead of losing it in control flow.
#[derive(Debug)]
pub enum Persisted {
    Written,
    Discarded(MetricsError),
}

impl Persisted {
    pub fn from_result(result: MetricsResult<()>, what: &str) -> Self {
        match result {
            Ok(()) => Self::Written,
            Err(e) => {
                log::warn!("Could not persist {what}: {e}");
                Self::Discarded(e)
            }
        }
    }

    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written)
    }
}
