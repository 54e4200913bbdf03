//! Record normalizer: maps raw ticket objects to `TicketRecord`.
//!
//! The record source has shipped several field-naming conventions over
//! time. All alias resolution lives here; nothing downstream ever looks at
//! a raw `serde_json::Value`.
//!
//! RULE: normalize() never fails. Missing or unreadable fields degrade to
//! safe defaults (empty subject, no timestamp, P3 priority, UNKNOWN status).

use crate::record::{Outcome, Priority, TicketRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};

// ── Alias tables (precedence order) ──────────────────────────────────────────

const ID_KEYS: &[&str] = &["metricsDepartmentID", "id", "ticketId", "ticketNumber"];
const STATUS_KEYS: &[&str] = &["status", "routingStatus"];
const CREATED_KEYS: &[&str] = &["createdAt", "created_at", "timestamp", "date"];
const SUBJECT_KEYS: &[&str] = &["subject", "title"];
const PRIORITY_KEYS: &[&str] = &["priority", "priorityLevel", "severity", "priority_name"];
const PRIORITY_SUBFIELDS: &[&str] = &["code", "level", "name", "value", "label"];
const DEPARTMENT_ID_KEYS: &[&str] = &["departmentId", "departmentID"];

pub const UNKNOWN_ID: &str = "unknown";

/// Map one raw ticket object to the canonical shape.
pub fn normalize(raw: &Value) -> TicketRecord {
    let department = raw.get("department").filter(|d| d.is_object());

    TicketRecord {
        id: first_present(raw, ID_KEYS)
            .and_then(text_of)
            .unwrap_or_else(|| UNKNOWN_ID.to_string()),
        status: first_present(raw, STATUS_KEYS)
            .and_then(text_of)
            .map(|s| Outcome::from_code(&s))
            .unwrap_or(Outcome::Unknown),
        subject: first_present(raw, SUBJECT_KEYS)
            .and_then(text_of)
            .unwrap_or_default(),
        created_at: first_present(raw, CREATED_KEYS).and_then(parse_timestamp),
        priority: resolve_priority(first_present(raw, PRIORITY_KEYS)),
        department_id: first_present(raw, DEPARTMENT_ID_KEYS)
            .or_else(|| department.and_then(|d| first_present(d, &["departmentID", "id"])))
            .and_then(text_of),
        department_name: department
            .and_then(|d| d.get("departmentName"))
            .or_else(|| raw.get("departmentName"))
            .and_then(text_of),
    }
}

pub fn normalize_all(raw: &[Value]) -> Vec<TicketRecord> {
    raw.iter().map(normalize).collect()
}

/// Resolve a priority given as a string, a numeric code, or a nested object.
/// Anything unmatched is P3.
pub fn resolve_priority(raw: Option<&Value>) -> Priority {
    raw.and_then(lookup_priority_value).unwrap_or_default()
}

fn lookup_priority_value(raw: &Value) -> Option<Priority> {
    match raw {
        Value::String(s) => lookup_priority_text(s),
        Value::Number(_) => text_of(raw).and_then(|s| lookup_priority_text(&s)),
        Value::Object(map) => PRIORITY_SUBFIELDS
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(lookup_priority_value),
        _ => None,
    }
}

fn lookup_priority_text(text: &str) -> Option<Priority> {
    let compact: String = text
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();

    if compact.starts_with("sima") {
        return Some(Priority::Sima);
    }

    match compact.as_str() {
        "1" | "p1" | "critical" | "urgent" | "high" | "høj" | "hoej" | "kritisk" => Some(Priority::P1),
        "2" | "p2" | "medium" | "normal" | "mellem" => Some(Priority::P2),
        "3" | "p3" | "low" | "lav" => Some(Priority::P3),
        _ => None,
    }
}

/// Parse a creation timestamp. Zone-less inputs are read as UTC so the
/// result never depends on the machine running the code.
pub fn parse_timestamp(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::String(s) => parse_timestamp_text(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    }
}

fn parse_timestamp_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

// ── Payload flattening ───────────────────────────────────────────────────────

/// Flatten whatever the record source returned into one list of raw tickets.
///
/// Accepted shapes:
///   - a bare array of tickets
///   - an object with a `tickets` array
///   - an array of per-department envelopes, each with a `tickets` array
///
/// Envelope department ids are copied onto tickets that carry none.
pub fn flatten_payload(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items.into_iter().flat_map(flatten_entry).collect(),
        Value::Object(mut map) => match map.remove("tickets") {
            Some(Value::Array(tickets)) => tickets,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn flatten_entry(entry: Value) -> Vec<Value> {
    match entry {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("tickets") {
            Some(Value::Array(tickets)) => {
                let department_id = first_present_in(&map, DEPARTMENT_ID_KEYS).cloned();
                tickets
                    .into_iter()
                    .map(|ticket| with_department(ticket, department_id.as_ref()))
                    .collect()
            }
            Some(other) => {
                map.insert("tickets".into(), other);
                vec![Value::Object(map)]
            }
            None => vec![Value::Object(map)],
        },
        other => vec![other],
    }
}

fn with_department(mut ticket: Value, department_id: Option<&Value>) -> Value {
    if let (Some(dept), Value::Object(obj)) = (department_id, &mut ticket) {
        if first_present_in(obj, DEPARTMENT_ID_KEYS).is_none() {
            obj.insert("departmentId".into(), dept.clone());
        }
    }
    ticket
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn first_present<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    raw.as_object().and_then(|map| first_present_in(map, keys))
}

fn first_present_in<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|v| !v.is_null())
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Some(i.to_string()),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < 1e15 => Some((f as i64).to_string()),
            _ => Some(n.to_string()),
        },
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
