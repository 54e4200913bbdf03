//! Deterministic demo tickets.
//!
//! RULE: same seed, same tickets. Nothing here reads the platform RNG or
//! the wall clock; the caller passes `today`.
//!
//! The generated objects deliberately mix the field-naming conventions the
//! record source has used over time, so demos and tests exercise the
//! normalizer the same way production payloads do.

use chrono::{Days, NaiveDate, NaiveTime, TimeZone, Utc};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde_json::{json, Value};

const DEPARTMENTS: &[(u32, &str)] = &[
    (1, "Support"),
    (2, "Sales"),
    (3, "Finance"),
    (4, "Tech"),
];

const SUBJECTS: &[&str] = &[
    "Login issue",
    "Order status",
    "Billing question",
    "Password reset",
    "API integration",
    "Invoice missing",
    "Refund request",
    "New user onboarding",
    "Product demo",
    "Contract change",
    "Feature request",
    "Latency spike",
    "Export data",
];

const PRIORITY_TEXT: &[&str] = &["high", "normal", "low", "urgent", "medium", "Høj", "lav"];

/// A small seeded generator.
pub struct DemoRng {
    inner: Pcg64Mcg,
}

impl DemoRng {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n). `n` of 0 yields 0.
    pub fn below(&mut self, n: u64) -> u64 {
        if n == 0 {
            return 0;
        }
        self.inner.next_u64() % n
    }

    pub fn pick<'t, T>(&mut self, items: &'t [T]) -> &'t T {
        &items[self.below(items.len() as u64) as usize]
    }
}

/// `count` raw tickets spread over the `days` days ending at `today`.
///
/// Outcome mix: ~76% SUCCESS, ~16% FAILURE, ~6% DEFAULTED, ~2% with no
/// usable status.
pub fn generate_demo_tickets(seed: u64, count: usize, days: u32, today: NaiveDate) -> Vec<Value> {
    let mut rng = DemoRng::new(seed);
    let days = u64::from(days.max(1));

    (0..count)
        .map(|i| {
            let back = rng.below(days);
            let date = today.checked_sub_days(Days::new(back)).unwrap_or(today);
            let seconds = rng.below(86_400) as u32;
            let time = NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0).unwrap_or_default();
            let created = Utc.from_utc_datetime(&date.and_time(time));

            let roll = rng.next_f64();
            let status = if roll < 0.76 {
                "SUCCESS"
            } else if roll < 0.92 {
                "FAILURE"
            } else if roll < 0.98 {
                "DEFAULTED"
            } else {
                ""
            };

            let (dept_id, dept_name) = *rng.pick(DEPARTMENTS);
            let subject = *rng.pick(SUBJECTS);
            let id = i as u64 + 1;
            let priority_text = *rng.pick(PRIORITY_TEXT);
            let priority_level = rng.below(3) + 1;
            let severity = if rng.next_f64() < 0.1 {
                json!({ "code": "SIMA" })
            } else {
                json!({ "level": priority_level })
            };

            match i % 3 {
                0 => json!({
                    "metricsDepartmentID": id,
                    "subject": subject,
                    "createdAt": created.to_rfc3339(),
                    "status": status,
                    "departmentName": dept_name,
                    "departmentId": dept_id,
                    "priority": priority_text,
                }),
                1 => json!({
                    "ticketId": format!("T-{id:05}"),
                    "title": subject,
                    "created_at": created.format("%Y-%m-%d %H:%M:%S").to_string(),
                    "routingStatus": status.to_lowercase(),
                    "departmentID": dept_id,
                    "priorityLevel": priority_level,
                }),
                _ => json!({
                    "id": id,
                    "subject": subject,
                    "timestamp": created.timestamp_millis(),
                    "status": status,
                    "department": { "departmentID": dept_id, "departmentName": dept_name },
                    "severity": severity,
                }),
            }
        })
        .collect()
}
