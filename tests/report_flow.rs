//! End-to-end report flow against a scripted data client: registry lookup,
//! execution, caching, and failure handling, with no network involved.

use std::cell::Cell;
use std::time::Duration;

use anyhow::bail;
use ga4_reporter::cache::CacheStore;
use ga4_reporter::client::{ApiHeader, ApiValue, DataClient, ReportRow, RunReportRequest, RunReportResponse};
use ga4_reporter::executor::{ExecuteError, ReportExecutor};
use ga4_reporter::registry::ReportRegistry;

const WEEK: Duration = Duration::from_secs(604_800);

/// Serves one canned city table and counts how often it is asked.
struct ScriptedClient {
    calls: Cell<usize>,
    fail: bool,
}

impl ScriptedClient {
    fn new() -> Self {
        Self { calls: Cell::new(0), fail: false }
    }

    fn failing() -> Self {
        Self { calls: Cell::new(0), fail: true }
    }
}

impl DataClient for ScriptedClient {
    fn run_report(
        &self,
        property_id: &str,
        request: &RunReportRequest,
    ) -> anyhow::Result<RunReportResponse> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            bail!("503 backend unavailable");
        }
        assert_eq!(property_id, "123");
        assert_eq!(request.dimensions[0].name, "city");
        assert_eq!(request.date_ranges[0].start_date, "2024-01-01");
        assert_eq!(request.date_ranges[0].end_date, "2024-01-07");

        Ok(RunReportResponse {
            dimension_headers: vec![ApiHeader { name: "city".into() }],
            metric_headers: vec![ApiHeader { name: "activeUsers".into() }],
            rows: vec![
                ReportRow {
                    dimension_values: vec![ApiValue { value: "London".into() }],
                    metric_values: vec![ApiValue { value: "100".into() }],
                },
                ReportRow {
                    dimension_values: vec![ApiValue { value: "Paris".into() }],
                    metric_values: vec![ApiValue { value: "42".into() }],
                },
            ],
        })
    }
}

#[test]
fn top_cities_runs_once_then_serves_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ReportRegistry::builtin();
    let executor = ReportExecutor::new(CacheStore::new(dir.path(), WEEK));
    let client = ScriptedClient::new();

    let handler = registry.resolve("top_cities").expect("builtin report");
    let first = executor
        .execute(handler, "123", "2024-01-01", "2024-01-07", &client)
        .unwrap();

    assert_eq!(first.headers, ["City", "Active Users"]);
    assert_eq!(first.rows.len(), 2);
    assert_eq!(first.rows[0], ["London", "100"]);
    assert_eq!(first.date_range.as_deref(), Some("2024-01-01 to 2024-01-07"));
    assert_eq!(client.calls.get(), 1);
    assert_eq!(executor.cache().count(), 1);

    // Identical request inside the TTL: equal result, no second API call.
    let second = executor
        .execute(handler, "123", "2024-01-01", "2024-01-07", &client)
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(client.calls.get(), 1);
}

#[test]
fn failed_run_leaves_no_cache_entry() {
    let dir = tempfile::tempdir().unwrap();
    let registry = ReportRegistry::builtin();
    let executor = ReportExecutor::new(CacheStore::new(dir.path(), WEEK));
    let client = ScriptedClient::failing();

    let handler = registry.resolve("top_cities").expect("builtin report");
    let err = executor
        .execute(handler, "123", "2024-01-01", "2024-01-07", &client)
        .unwrap_err();

    let ExecuteError::Report { key, source } = err;
    assert_eq!(key, "top_cities");
    assert!(source.to_string().contains("503"));
    assert_eq!(executor.cache().count(), 0);
}

#[test]
fn unknown_report_key_is_not_found_so_the_session_can_prompt() {
    let registry = ReportRegistry::builtin();
    assert!(registry.resolve("definitely_not_a_report").is_none());
}
