use chrono::{NaiveDate, TimeZone, Utc};
use routing_metrics_core::{
    forecast::{linear_trend_forecast, moving_average_smoothing},
    normalizer::normalize_all,
    record::{Outcome, Priority, TicketRecord},
    series::{build_daily_series, build_misrouting_series, DailyBucket},
};
use serde_json::json;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

fn ticket_at(id: usize, status: Outcome, y: i32, m: u32, d: u32, hour: u32) -> TicketRecord {
    TicketRecord {
        id: id.to_string(),
        status,
        subject: String::new(),
        created_at: Some(Utc.with_ymd_and_hms(y, m, d, hour, 0, 0).unwrap()),
        priority: Priority::P3,
        department_id: None,
        department_name: None,
    }
}

fn bucket(d: u32, accuracy: f64) -> DailyBucket {
    DailyBucket {
        date: day(d),
        total: 10,
        success_count: (accuracy / 10.0) as usize,
        accuracy,
    }
}

// ── Daily series ─────────────────────────────────────────────────────────────

#[test]
fn buckets_are_grouped_by_utc_day_and_sorted() {
    let records = vec![
        ticket_at(1, Outcome::Success, 2024, 5, 3, 9),
        ticket_at(2, Outcome::Failure, 2024, 5, 1, 23),
        ticket_at(3, Outcome::Success, 2024, 5, 1, 0),
        ticket_at(4, Outcome::Success, 2024, 5, 3, 12),
    ];

    let series = build_daily_series(&records);

    assert_eq!(series.len(), 2);
    assert_eq!(series[0].date, day(1));
    assert_eq!(series[0].total, 2);
    assert_eq!(series[0].accuracy, 50.0);
    assert_eq!(series[1].date, day(3));
    assert_eq!(series[1].accuracy, 100.0);
    assert_eq!(series[1].iso_date(), "2024-05-03");
    assert_eq!(series[1].label(), "03-05");
}

#[test]
fn offset_timestamps_land_on_their_utc_day() {
    // 23:30 at -02:00 is already the next day in UTC.
    let raw = vec![
        json!({ "id": 1, "status": "SUCCESS", "createdAt": "2024-05-01T23:30:00-02:00" }),
        json!({ "id": 2, "status": "SUCCESS", "createdAt": "2024-05-02T08:00:00Z" }),
    ];

    let series = build_daily_series(&normalize_all(&raw));

    assert_eq!(series.len(), 1);
    assert_eq!(series[0].date, day(2));
    assert_eq!(series[0].total, 2);
}

#[test]
fn records_without_timestamp_are_skipped() {
    let raw = vec![
        json!({ "id": 1, "status": "SUCCESS", "createdAt": "garbage" }),
        json!({ "id": 2, "status": "FAILURE" }),
        json!({ "id": 3, "status": "SUCCESS", "createdAt": "2024-05-04" }),
    ];

    let series = build_daily_series(&normalize_all(&raw));

    assert_eq!(series.len(), 1);
    assert_eq!(series[0].total, 1);
}

#[test]
fn every_bucket_has_at_least_one_ticket() {
    let records: Vec<TicketRecord> = (0..40)
        .map(|i| ticket_at(i, Outcome::Success, 2024, 5, 1 + (i as u32 % 9) * 3, 12))
        .collect();

    for bucket in build_daily_series(&records) {
        assert!(bucket.total > 0);
        assert!(bucket.success_count <= bucket.total);
    }
}

#[test]
fn misrouting_history_respects_inclusive_range() {
    let records = vec![
        ticket_at(1, Outcome::Failure, 2024, 5, 1, 10),
        ticket_at(2, Outcome::Defaulted, 2024, 5, 2, 10),
        ticket_at(3, Outcome::Success, 2024, 5, 2, 11),
        ticket_at(4, Outcome::Failure, 2024, 5, 3, 10),
    ];

    let history = build_misrouting_series(&records, Some(day(2)), Some(day(3)));

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].date, day(2));
    assert_eq!(history[0].misrouted_count, 1);
    assert_eq!(history[0].misrouted_percent, 50.0);
    assert_eq!(history[1].misrouted_count, 1);

    assert_eq!(build_misrouting_series(&records, None, None).len(), 3);
}

// ── Forecast ─────────────────────────────────────────────────────────────────

#[test]
fn empty_series_forecasts_nothing() {
    assert!(linear_trend_forecast(&[], 7).is_empty());
    assert!(moving_average_smoothing(&[], 7).is_empty());
}

#[test]
fn single_point_projects_flat() {
    let forecast = linear_trend_forecast(&[bucket(10, 80.0)], 7);

    assert_eq!(forecast.len(), 7);
    assert!(forecast.iter().all(|p| p.accuracy == 80.0 && p.projected));
    assert_eq!(forecast[0].date, day(11));
    assert_eq!(forecast[6].date, day(17));
}

#[test]
fn rising_series_is_clamped_at_100() {
    let forecast = linear_trend_forecast(&[bucket(1, 60.0), bucket(2, 80.0)], 2);

    assert_eq!(forecast.len(), 2);
    assert_eq!(forecast[0].accuracy, 100.0);
    assert_eq!(forecast[1].accuracy, 100.0);
    assert_eq!(forecast[0].date, day(3));
}

#[test]
fn slope_uses_only_the_endpoints() {
    // The middle dip does not affect the slope: (70 - 50) / 2 = 10 per day.
    let series = [bucket(1, 50.0), bucket(2, 0.0), bucket(3, 70.0)];

    let forecast = linear_trend_forecast(&series, 3);

    let values: Vec<f64> = forecast.iter().map(|p| p.accuracy).collect();
    assert_eq!(values, vec![80.0, 90.0, 100.0]);
}

#[test]
fn falling_series_is_clamped_at_0() {
    let forecast = linear_trend_forecast(&[bucket(1, 40.0), bucket(2, 10.0)], 3);

    let values: Vec<f64> = forecast.iter().map(|p| p.accuracy).collect();
    assert_eq!(values, vec![0.0, 0.0, 0.0]);
}

#[test]
fn forecast_dates_cross_month_boundaries() {
    let last = DailyBucket::new(NaiveDate::from_ymd_opt(2024, 2, 28).unwrap(), 4, 3);

    let forecast = linear_trend_forecast(&[last], 2);

    assert_eq!(forecast[0].date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    assert_eq!(forecast[1].date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
}

#[test]
fn zero_horizon_is_empty() {
    assert!(linear_trend_forecast(&[bucket(1, 50.0)], 0).is_empty());
}

// ── Smoothing ────────────────────────────────────────────────────────────────

#[test]
fn smoothing_keeps_length_and_dates() {
    let series: Vec<DailyBucket> = (1..=10).map(|d| bucket(d, d as f64 * 10.0)).collect();

    let smoothed = moving_average_smoothing(&series, 3);

    assert_eq!(smoothed.len(), series.len());
    for (s, b) in smoothed.iter().zip(&series) {
        assert_eq!(s.date, b.date);
        assert_eq!(s.accuracy, b.accuracy);
    }
}

#[test]
fn smoothing_uses_trailing_window() {
    let series = [bucket(1, 30.0), bucket(2, 60.0), bucket(3, 90.0), bucket(4, 0.0)];

    let smoothed: Vec<f64> = moving_average_smoothing(&series, 2)
        .iter()
        .map(|s| s.smoothed_accuracy)
        .collect();

    assert_eq!(smoothed, vec![30.0, 45.0, 75.0, 45.0]);
}

#[test]
fn smoothing_window_of_one_or_zero_is_identity() {
    let series = [bucket(1, 30.0), bucket(2, 60.0)];

    for window in [0, 1] {
        let smoothed = moving_average_smoothing(&series, window);
        assert_eq!(smoothed[0].smoothed_accuracy, 30.0);
        assert_eq!(smoothed[1].smoothed_accuracy, 60.0);
    }
}

#[test]
fn forecast_does_not_touch_its_input() {
    let series = vec![bucket(1, 60.0), bucket(2, 80.0)];
    let before = series.clone();

    let _ = linear_trend_forecast(&series, 7);
    let _ = moving_average_smoothing(&series, 7);

    assert_eq!(series, before);
}
