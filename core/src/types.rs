//! Shared primitive types used across the metrics core.

/// Wall-clock time in milliseconds since the Unix epoch.
pub type Millis = i64;

/// An opaque ticket identifier, always carried as text.
pub type TicketId = String;

/// The scope under which view state is persisted (a department id, or "all").
pub type ScopeId = String;

/// The scope used when no department is selected.
pub const ALL_SCOPE: &str = "all";
