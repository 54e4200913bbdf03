//! The canonical ticket shape every downstream computation works on.

use crate::types::TicketId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Routing outcome of a ticket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Success,
    Failure,
    Defaulted,
    Unknown,
}

impl Outcome {
    /// Outcomes shown as status chips, in display order.
    pub const ALL: [Outcome; 4] = [
        Outcome::Success,
        Outcome::Failure,
        Outcome::Defaulted,
        Outcome::Unknown,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Success   => "SUCCESS",
            Self::Failure   => "FAILURE",
            Self::Defaulted => "DEFAULTED",
            Self::Unknown   => "UNKNOWN",
        }
    }

    /// Resolve an upper-cased status code. Anything unrecognised is Unknown.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "SUCCESS"   => Self::Success,
            "FAILURE"   => Self::Failure,
            "DEFAULTED" => Self::Defaulted,
            _           => Self::Unknown,
        }
    }

    /// FAILURE and DEFAULTED both mean the ticket did not reach the right team.
    pub fn is_misrouted(&self) -> bool {
        matches!(self, Self::Failure | Self::Defaulted)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Outcome {
    type Err = String;

    /// Strict parse used for filter values; unlike `from_code` it rejects
    /// unrecognised input instead of mapping it to Unknown.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Outcome::from_code(s) {
            Outcome::Unknown if !s.trim().eq_ignore_ascii_case("UNKNOWN") => {
                Err(format!("unrecognised status '{s}'"))
            }
            outcome => Ok(outcome),
        }
    }
}

/// Normalized priority code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    P1,
    P2,
    #[default]
    P3,
    Sima,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::P1, Priority::P2, Priority::P3, Priority::Sima];

    pub fn code(&self) -> &'static str {
        match self {
            Self::P1   => "P1",
            Self::P2   => "P2",
            Self::P3   => "P3",
            Self::Sima => "SIMA",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unrecognised priority '{s}'"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketRecord {
    pub id:              TicketId,
    pub status:          Outcome,
    pub subject:         String,
    pub created_at:      Option<DateTime<Utc>>,
    pub priority:        Priority,
    pub department_id:   Option<String>,
    pub department_name: Option<String>,
}
