use routing_metrics_core::{
    filter::{
        apply_filters, clamp_page, facet_counts, paginate, total_pages, FacetDimension,
        FilterState, RoutingOutcome,
    },
    record::{Outcome, Priority, TicketRecord},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn ticket(id: &str, subject: &str, status: Outcome, priority: Priority) -> TicketRecord {
    TicketRecord {
        id: id.into(),
        status,
        subject: subject.into(),
        created_at: None,
        priority,
        department_id: None,
        department_name: None,
    }
}

fn fixture() -> Vec<TicketRecord> {
    vec![
        ticket("T-1", "Login issue", Outcome::Success, Priority::P1),
        ticket("T-2", "Billing question", Outcome::Failure, Priority::P2),
        ticket("T-3", "Password reset", Outcome::Defaulted, Priority::P3),
        ticket("T-4", "Login loop", Outcome::Success, Priority::P3),
        ticket("T-5", "Refund request", Outcome::Failure, Priority::Sima),
        ticket("T-6", "Export data", Outcome::Unknown, Priority::P2),
    ]
}

fn ids(records: &[&TicketRecord]) -> Vec<String> {
    records.iter().map(|r| r.id.clone()).collect()
}

// ── Filtering ────────────────────────────────────────────────────────────────

#[test]
fn empty_filters_are_the_identity() {
    let records = fixture();
    let filtered = apply_filters(&records, &FilterState::default());

    assert_eq!(filtered.len(), records.len());
    assert!(filtered.iter().zip(&records).all(|(a, b)| *a == b));
}

#[test]
fn search_matches_id_or_subject_case_insensitively() {
    let records = fixture();

    let by_subject = FilterState { search: "LOGIN".into(), ..FilterState::default() };
    assert_eq!(ids(&apply_filters(&records, &by_subject)), vec!["T-1", "T-4"]);

    let by_id = FilterState { search: "t-5".into(), ..FilterState::default() };
    assert_eq!(ids(&apply_filters(&records, &by_id)), vec!["T-5"]);

    let blank = FilterState { search: "   ".into(), ..FilterState::default() };
    assert!(blank.is_empty());
    assert_eq!(apply_filters(&records, &blank).len(), records.len());
}

#[test]
fn filters_combine_conjunctively_and_keep_order() {
    let records = fixture();
    let filters = FilterState {
        search: "l".into(),
        status: Some(Outcome::Success),
        priority: Some(Priority::P3),
        ..FilterState::default()
    };

    assert_eq!(ids(&apply_filters(&records, &filters)), vec!["T-4"]);
}

#[test]
fn routing_filter_splits_success_from_misrouted() {
    let records = fixture();

    let correct = FilterState { routing: Some(RoutingOutcome::Correct), ..FilterState::default() };
    assert_eq!(ids(&apply_filters(&records, &correct)), vec!["T-1", "T-4"]);

    let incorrect = FilterState { routing: Some(RoutingOutcome::Incorrect), ..FilterState::default() };
    assert_eq!(ids(&apply_filters(&records, &incorrect)), vec!["T-2", "T-3", "T-5"]);
}

#[test]
fn unknown_status_matches_neither_routing_value() {
    assert!(!RoutingOutcome::Correct.matches(Outcome::Unknown));
    assert!(!RoutingOutcome::Incorrect.matches(Outcome::Unknown));

    let records = fixture();
    let routed: usize = [RoutingOutcome::Correct, RoutingOutcome::Incorrect]
        .into_iter()
        .map(|routing| {
            let filters = FilterState { routing: Some(routing), ..FilterState::default() };
            apply_filters(&records, &filters).len()
        })
        .sum();
    assert_eq!(routed, records.len() - 1);
    assert!(ids(&apply_filters(&records, &FilterState::default())).contains(&"T-6".to_string()));
}

#[test]
fn filtered_output_is_a_subset_in_original_order() {
    let records = fixture();
    let filters = FilterState { status: Some(Outcome::Failure), ..FilterState::default() };

    let filtered = apply_filters(&records, &filters);

    let positions: Vec<usize> = filtered
        .iter()
        .map(|r| records.iter().position(|x| x == *r).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

// ── Facets ───────────────────────────────────────────────────────────────────

#[test]
fn facet_ignores_its_own_selection_but_applies_others() {
    let records = fixture();
    let filters = FilterState {
        status: Some(Outcome::Failure),
        priority: Some(Priority::P2),
        ..FilterState::default()
    };

    let status = facet_counts(&records, &filters, FacetDimension::Status);
    // Priority P2 applies: T-2 (FAILURE) and T-6 (UNKNOWN).
    assert_eq!(status.get(""), Some(2));
    assert_eq!(status.get("FAILURE"), Some(1));
    assert_eq!(status.get("SUCCESS"), Some(0));
    assert_eq!(status.get("UNKNOWN"), Some(1));

    let priority = facet_counts(&records, &filters, FacetDimension::Priority);
    // Status FAILURE applies: T-2 (P2) and T-5 (SIMA).
    assert_eq!(priority.get(""), Some(2));
    assert_eq!(priority.get("P2"), Some(1));
    assert_eq!(priority.get("SIMA"), Some(1));
    assert_eq!(priority.get("P1"), Some(0));
}

#[test]
fn all_chip_comes_first() {
    let records = fixture();
    let facets = facet_counts(&records, &FilterState::default(), FacetDimension::Priority);

    let values: Vec<&str> = facets.entries.iter().map(|e| e.value.as_str()).collect();
    assert_eq!(values, vec!["", "P1", "P2", "P3", "SIMA"]);
    assert_eq!(facets.entries[0].count, records.len());
}

#[test]
fn unknown_status_chip_only_when_present() {
    let mut records = fixture();
    records.retain(|r| r.status != Outcome::Unknown);

    let facets = facet_counts(&records, &FilterState::default(), FacetDimension::Status);

    assert_eq!(facets.get("UNKNOWN"), None);
    assert_eq!(facets.entries.len(), 4);
}

#[test]
fn search_narrows_facet_counts() {
    let records = fixture();
    let filters = FilterState { search: "login".into(), ..FilterState::default() };

    let facets = facet_counts(&records, &filters, FacetDimension::Status);

    assert_eq!(facets.get(""), Some(2));
    assert_eq!(facets.get("SUCCESS"), Some(2));
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[test]
fn total_pages_is_at_least_one() {
    assert_eq!(total_pages(0, 10), 1);
    assert_eq!(total_pages(10, 10), 1);
    assert_eq!(total_pages(11, 10), 2);
    assert_eq!(total_pages(5, 0), 5);
}

#[test]
fn out_of_range_pages_are_clamped() {
    let items: Vec<u32> = (1..=25).collect();

    let zero = paginate(&items, 0, 10);
    assert_eq!(zero.current_page, 1);
    assert_eq!(zero.items, &items[0..10]);

    let negative = paginate(&items, -4, 10);
    assert_eq!(negative.current_page, 1);

    let past_end = paginate(&items, 99, 10);
    assert_eq!(past_end.total_pages, 3);
    assert_eq!(past_end.current_page, 3);
    assert_eq!(past_end.items, &items[20..25]);

    assert_eq!(clamp_page(7, 0), 1);
}

#[test]
fn empty_input_has_one_empty_page() {
    let items: Vec<u32> = Vec::new();
    let page = paginate(&items, 3, 10);

    assert_eq!(page.total_pages, 1);
    assert_eq!(page.current_page, 1);
    assert!(page.items.is_empty());
}

#[test]
fn pages_cover_every_item_exactly_once() {
    let items: Vec<u32> = (0..23).collect();
    let pages = total_pages(items.len(), 10);

    let collected: Vec<u32> = (1..=pages as i64)
        .flat_map(|p| paginate(&items, p, 10).items.to_vec())
        .collect();

    assert_eq!(collected, items);
}

// ── Serialized form ──────────────────────────────────────────────────────────

#[test]
fn unset_filters_serialize_as_blank_strings() {
    let filters = FilterState {
        search: "login".into(),
        status: Some(Outcome::Defaulted),
        ..FilterState::default()
    };

    let value = serde_json::to_value(&filters).unwrap();

    assert_eq!(
        value,
        serde_json::json!({ "search": "login", "status": "DEFAULTED", "routing": "", "priority": "" })
    );
    let back: FilterState = serde_json::from_value(value).unwrap();
    assert_eq!(back, filters);
}
