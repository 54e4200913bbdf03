//! metrics-runner: headless driver for the routing metrics dashboard.
//!
//! Usage:
//!   metrics-runner --seed 12345 --count 120 --days 14 --cycles 3
//!   metrics-runner --input tickets.json --scope 2 --db metrics.db
//!   metrics-runner --seed 12345 --cycles 2 --export report.json
//!   metrics-runner --seed 12345 --ipc-mode
//!
//! Without --input the runner serves seeded demo tickets. Time is simulated:
//! each extra cycle advances a manual clock by the refresh interval and lets
//! the scheduler fire on its own.

use anyhow::Result;
use routing_metrics_core::{
    clock::{Clock, ManualClock, SystemClock},
    config::MetricsConfig,
    demo::generate_demo_tickets,
    filter::{FacetCounts, FacetDimension, RoutingOutcome},
    preferences::RefreshConfig,
    session::{CycleReport, DashboardSession, MetricsSnapshot, RefreshRunner},
    source::{JsonFileSource, RecordBatch, RecordSource, StaticSource},
    store::MetricsStore,
    view_state::{TicketPage, ViewMode},
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Refresh,
    Advance { ms: i64 },
    Search { term: String },
    Chip { dimension: FacetDimension, value: String },
    Routing { value: String },
    ClearFilters,
    Page { page: i64 },
    View { mode: ViewMode },
    Configure { enabled: bool, interval_ms: u64 },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState<'s> {
    session_id:   String,
    scope:        &'s str,
    now:          i64,
    last_updated: Option<String>,
    countdown:    String,
    last_error:   Option<String>,
    snapshot:     Option<&'s MetricsSnapshot>,
    tickets:      TicketPage,
}

struct RunOptions<'a> {
    seed:     u64,
    cycles:   u32,
    ipc_mode: bool,
    scope:    Option<&'a str>,
    export:   Option<&'a str>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let count = parse_arg(&args, "--count", 120usize);
    let days = parse_arg(&args, "--days", 14u32);
    let cycles = parse_arg(&args, "--cycles", 0u32);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let db = parse_str_arg(&args, "--db").unwrap_or(":memory:");
    let data_dir = parse_str_arg(&args, "--data-dir").unwrap_or("./data");
    let scope = parse_str_arg(&args, "--scope");
    let input = parse_str_arg(&args, "--input");
    let export = parse_str_arg(&args, "--export");

    let config = match MetricsConfig::load(data_dir) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Using default metrics config: {e}");
            MetricsConfig::default()
        }
    };

    if !ipc_mode {
        println!("Routing metrics runner");
        println!("  seed:      {seed}");
        println!("  db:        {db}");
        println!("  data_dir:  {data_dir}");
        println!("  scope:     {}", scope.unwrap_or("all"));
        match input {
            Some(path) => println!("  input:     {path}"),
            None => println!("  input:     demo ({count} tickets over {days} days)"),
        }
        println!();
    }

    let store = if db == ":memory:" {
        MetricsStore::in_memory()?
    } else {
        MetricsStore::open(db)?
    };
    store.migrate()?;

    let options = RunOptions {
        seed,
        cycles,
        ipc_mode,
        scope,
        export,
    };

    match input {
        Some(path) => run(&store, config, JsonFileSource::new(path), &options),
        None => {
            let today = chrono::Utc::now().date_naive();
            let tickets = generate_demo_tickets(seed, count, days, today);
            let source = StaticSource::new(RecordBatch::new(tickets));
            run(&store, config, source, &options)
        }
    }
}

fn run<S: RecordSource>(
    store: &MetricsStore,
    config: MetricsConfig,
    source: S,
    options: &RunOptions<'_>,
) -> Result<()> {
    let clock = ManualClock::starting_at(SystemClock.now_ms());
    let session = DashboardSession::open_with_clock(options.scope, config, store, clock.clone());
    let mut runner = RefreshRunner::new(clock.clone(), session, source, store);

    let first = runner.refresh_now();
    if options.ipc_mode {
        run_ipc_loop(&mut runner, &clock)?;
        runner.teardown();
        return Ok(());
    }

    print_report(&first);
    for _ in 0..options.cycles {
        clock.advance(runner.scheduler().config().interval());
        for report in runner.pump() {
            print_report(&report);
        }
    }

    print_summary(&mut runner, &clock, options.seed);
    if let Some(path) = options.export {
        export_report(&runner, path)?;
    }
    runner.teardown();
    Ok(())
}

fn export_report<S: RecordSource>(runner: &RefreshRunner<'_, ManualClock, S>, path: &str) -> Result<()> {
    let Some(report) = runner.report() else {
        log::warn!("No completed refresh; report not written to {path}");
        return Ok(());
    };
    std::fs::write(path, report.to_json()?)
        .map_err(|e| anyhow::anyhow!("Cannot write {path}: {e}"))?;
    println!();
    println!("Report written to {path} ({} tickets)", report.tickets.len());
    Ok(())
}

fn run_ipc_loop<S: RecordSource>(
    runner: &mut RefreshRunner<'_, ManualClock, S>,
    clock: &ManualClock,
) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    write_state(&mut stdout, runner, clock)?;

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {}
            IpcCommand::Refresh => {
                runner.refresh_now();
            }
            IpcCommand::Advance { ms } => {
                clock.advance(ms);
                runner.pump();
            }
            IpcCommand::Search { term } => {
                runner.session_mut().tickets_mut().set_search(term);
            }
            IpcCommand::Chip { dimension, value } => {
                runner.session_mut().tickets_mut().select_chip(dimension, &value);
            }
            IpcCommand::Routing { value } => {
                let routing = value.parse::<RoutingOutcome>().ok();
                runner.session_mut().tickets_mut().set_routing(routing);
            }
            IpcCommand::ClearFilters => {
                runner.session_mut().tickets_mut().clear_filters();
            }
            IpcCommand::Page { page } => {
                runner.session_mut().tickets_mut().go_to_page(page);
            }
            IpcCommand::View { mode } => {
                runner.session_mut().tickets_mut().set_view_mode(mode);
            }
            IpcCommand::Configure { enabled, interval_ms } => {
                runner.configure(RefreshConfig::new(enabled, interval_ms));
            }
        }
        write_state(&mut stdout, runner, clock)?;
    }
    Ok(())
}

fn write_state<S: RecordSource>(
    out: &mut impl Write,
    runner: &mut RefreshRunner<'_, ManualClock, S>,
    clock: &ManualClock,
) -> Result<()> {
    let now = clock.now_ms();
    let tickets = runner.session_mut().render_tickets();
    let countdown = runner.scheduler().countdown_label();
    let session = runner.session();

    let state = UiState {
        session_id: session.session_id().to_string(),
        scope: session.scope(),
        now,
        last_updated: session.last_updated_label(now),
        countdown,
        last_error: session.last_error().map(|e| e.to_string()),
        snapshot: session.snapshot(),
        tickets,
    };
    writeln!(out, "{}", serde_json::to_string(&state)?)?;
    out.flush()?;
    Ok(())
}

fn print_report(report: &CycleReport) {
    match report {
        CycleReport::Completed { cycle_id, tickets } => {
            println!("  cycle {cycle_id}: {tickets} tickets");
        }
        CycleReport::Failed { cycle_id, error } => {
            println!("  cycle {cycle_id}: FAILED ({error})");
        }
        CycleReport::Dropped => println!("  cycle dropped"),
    }
}

fn print_summary<S: RecordSource>(
    runner: &mut RefreshRunner<'_, ManualClock, S>,
    clock: &ManualClock,
    seed: u64,
) {
    let page = runner.session_mut().render_tickets();
    let session = runner.session();

    println!();
    println!("=== ROUTING SUMMARY ===");
    println!("  session:        {}", session.session_id());
    println!("  seed:           {seed}");
    println!("  scope:          {}", session.scope());

    let Some(snapshot) = session.snapshot() else {
        let reason = session
            .last_error()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no refresh completed".into());
        println!("  (No data: {reason})");
        return;
    };

    let stats = &snapshot.stats;
    println!("  tickets:        {}", stats.total_tickets);
    println!("  success:        {}", stats.success_count);
    println!("  failure:        {}", stats.failure_count);
    println!("  defaulted:      {}", stats.defaulted_count);
    println!("  unknown:        {}", stats.unknown_count());
    println!("  accuracy:       {:.2}% ({:?})", stats.accuracy_percent, snapshot.badge);
    println!("  trend:          {:?}", snapshot.trend);
    if let Some(label) = session.last_updated_label(clock.now_ms()) {
        println!("  last updated:   {label}");
    }
    println!("  next refresh:   {}", runner.scheduler().countdown_label());

    println!();
    println!("=== DAILY ACCURACY ===");
    if snapshot.daily.is_empty() {
        println!("  (No dated tickets)");
    }
    for (bucket, smoothed) in snapshot.daily.iter().zip(&snapshot.smoothed) {
        println!(
            "  {} | {:>3} tickets | {:6.2}% | smoothed {:6.2}%",
            bucket.label(),
            bucket.total,
            bucket.accuracy,
            smoothed.smoothed_accuracy
        );
    }

    println!();
    println!("=== FORECAST ===");
    for point in &snapshot.forecast {
        println!("  {} | {:6.2}%", point.date.format("%d-%m"), point.accuracy);
    }

    println!();
    println!(
        "=== TICKETS (page {}/{}, {} matching, {:?}) ===",
        page.current_page, page.total_pages, page.total_matching, page.view_mode
    );
    for ticket in &page.tickets {
        println!(
            "  {:<10} {:<4} {:<9} {}",
            ticket.id,
            ticket.priority.code(),
            ticket.status.code(),
            ticket.subject
        );
    }
    print_facets("status", &page.status_facets);
    print_facets("priority", &page.priority_facets);
}

fn print_facets(name: &str, facets: &FacetCounts) {
    let chips: Vec<String> = facets
        .entries
        .iter()
        .map(|e| {
            let label = if e.value.is_empty() { "all" } else { e.value.as_str() };
            format!("{label}={}", e.count)
        })
        .collect();
    println!("  {name:<9} {}", chips.join("  "));
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn parse_str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
