use routing_metrics_core::{
    config::MetricsConfig,
    normalizer::normalize_all,
    record::{Outcome, Priority, TicketRecord},
    stats::{accuracy_percent, compute_stats, AccuracyBadge, AccuracyTrend},
};
use serde_json::{json, Value};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn record(id: usize, status: Outcome) -> TicketRecord {
    TicketRecord {
        id: id.to_string(),
        status,
        subject: format!("Ticket {id}"),
        created_at: None,
        priority: Priority::P3,
        department_id: None,
        department_name: None,
    }
}

fn records(success: usize, failure: usize, defaulted: usize) -> Vec<TicketRecord> {
    let statuses = std::iter::repeat(Outcome::Success)
        .take(success)
        .chain(std::iter::repeat(Outcome::Failure).take(failure))
        .chain(std::iter::repeat(Outcome::Defaulted).take(defaulted));
    statuses.enumerate().map(|(i, s)| record(i + 1, s)).collect()
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// The mock dataset shown before the backend is connected: 30 tickets,
/// 23 routed correctly.
#[test]
fn thirty_ticket_reference_dataset() {
    let stats = compute_stats(&records(23, 5, 2));

    assert_eq!(stats.total_tickets, 30);
    assert_eq!(stats.success_count, 23);
    assert_eq!(stats.failure_count, 5);
    assert_eq!(stats.defaulted_count, 2);
    assert_eq!(stats.incorrect_count(), 7);
    assert!(
        (stats.accuracy_percent - 76.666_666).abs() < 1e-3,
        "accuracy was {}",
        stats.accuracy_percent
    );
}

#[test]
fn empty_input_has_zero_accuracy() {
    let stats = compute_stats(&[]);
    assert_eq!(stats.total_tickets, 0);
    assert_eq!(stats.accuracy_percent, 0.0);
    assert_eq!(accuracy_percent(0, 0), 0.0);
}

#[test]
fn unknown_statuses_count_toward_total_only() {
    let mut input = records(3, 0, 0);
    input.push(record(99, Outcome::Unknown));

    let stats = compute_stats(&input);

    assert_eq!(stats.total_tickets, 4);
    assert_eq!(stats.unknown_count(), 1);
    assert_eq!(stats.incorrect_count(), 0);
    assert_eq!(stats.accuracy_percent, 75.0);
}

#[test]
fn counts_never_exceed_total_and_accuracy_stays_in_range() {
    for (s, f, d) in [(0, 0, 0), (10, 0, 0), (0, 10, 0), (1, 1, 1), (7, 2, 40)] {
        let stats = compute_stats(&records(s, f, d));
        assert!(stats.success_count + stats.failure_count + stats.defaulted_count <= stats.total_tickets);
        assert!((0.0..=100.0).contains(&stats.accuracy_percent));
    }
}

#[test]
fn stats_over_raw_aliases() {
    let raw: Vec<Value> = vec![
        json!({ "id": 1, "status": "SUCCESS" }),
        json!({ "ticketId": "T-2", "routingStatus": "success" }),
        json!({ "id": 3, "status": "FAILURE" }),
        json!({ "id": 4, "routingStatus": "defaulted" }),
    ];

    let stats = compute_stats(&normalize_all(&raw));

    assert_eq!(stats.success_count, 2);
    assert_eq!(stats.incorrect_count(), 2);
    assert_eq!(stats.accuracy_percent, 50.0);
}

#[test]
fn reported_ratio_overrides_computed_accuracy() {
    let stats = compute_stats(&records(1, 1, 0));

    assert_eq!(stats.clone().with_reported_ratio(Some(0.9)).accuracy_percent, 90.0);
    assert_eq!(stats.clone().with_reported_ratio(Some(1.7)).accuracy_percent, 100.0);
    assert_eq!(stats.clone().with_reported_ratio(Some(f64::NAN)).accuracy_percent, 50.0);
    assert_eq!(stats.with_reported_ratio(None).accuracy_decimal(), 0.5);
}

#[test]
fn badge_thresholds() {
    let thresholds = MetricsConfig::default().accuracy;

    assert_eq!(AccuracyBadge::classify(95.0, &thresholds), AccuracyBadge::Good);
    assert_eq!(AccuracyBadge::classify(90.0, &thresholds), AccuracyBadge::Good);
    assert_eq!(AccuracyBadge::classify(89.9, &thresholds), AccuracyBadge::Ok);
    assert_eq!(AccuracyBadge::classify(70.0, &thresholds), AccuracyBadge::Ok);
    assert_eq!(AccuracyBadge::classify(69.9, &thresholds), AccuracyBadge::Bad);
}

#[test]
fn trend_against_previous_reading() {
    assert_eq!(AccuracyTrend::compare(None, 80.0, 0.1), AccuracyTrend::FirstMeasurement);
    assert!(matches!(AccuracyTrend::compare(Some(80.0), 80.05, 0.1), AccuracyTrend::Steady { .. }));
    assert!(matches!(AccuracyTrend::compare(Some(80.0), 82.0, 0.1), AccuracyTrend::Up { .. }));
    assert!(matches!(AccuracyTrend::compare(Some(80.0), 75.0, 0.1), AccuracyTrend::Down { .. }));
}
