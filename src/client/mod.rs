//! Capability traits for the GA4 Data and Admin APIs, plus the wire types
//! shared by report handlers and the HTTP implementation.
//!
//! The engine only ever sees these traits; tests substitute scripted
//! implementations and never touch the network.

pub mod http;

use anyhow::Result;
use serde::{Deserialize, Serialize};

// ── Request wire types (Data API v1beta) ────────────────────────

/// A dimension by API name, e.g. "city".
#[derive(Debug, Clone, Serialize)]
pub struct Dimension {
    pub name: String,
}

impl Dimension {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string() }
    }
}

/// A metric by API name, e.g. "activeUsers".
#[derive(Debug, Clone, Serialize)]
pub struct Metric {
    pub name: String,
}

impl Metric {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string() }
    }
}

/// One contiguous date window, ISO calendar dates.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

impl DateRange {
    pub fn new(start_date: &str, end_date: &str) -> Self {
        Self {
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
        }
    }
}

/// Result ordering. GA4 accepts either a metric or a dimension ordering
/// per entry; exactly one of the two fields is set.
#[derive(Debug, Clone, Serialize)]
pub struct OrderBy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<MetricOrderBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<DimensionOrderBy>,
    pub desc: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricOrderBy {
    pub metric_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionOrderBy {
    pub dimension_name: String,
}

impl OrderBy {
    /// Descending by metric value.
    pub fn metric_desc(metric_name: &str) -> Self {
        Self {
            metric: Some(MetricOrderBy { metric_name: metric_name.to_string() }),
            dimension: None,
            desc: true,
        }
    }

    /// Ascending (alphabetical) by dimension value.
    pub fn dimension_asc(dimension_name: &str) -> Self {
        Self {
            metric: None,
            dimension: Some(DimensionOrderBy { dimension_name: dimension_name.to_string() }),
            desc: false,
        }
    }
}

/// Body of a `runReport` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReportRequest {
    pub dimensions: Vec<Dimension>,
    pub metrics: Vec<Metric>,
    pub date_ranges: Vec<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub order_bys: Vec<OrderBy>,
}

// ── Response wire types ─────────────────────────────────────────

/// A dimension or metric header in a report response.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApiHeader {
    #[serde(default)]
    pub name: String,
}

/// A single dimension or metric cell.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApiValue {
    #[serde(default)]
    pub value: String,
}

/// One row of a report response.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportRow {
    pub dimension_values: Vec<ApiValue>,
    pub metric_values: Vec<ApiValue>,
}

impl ReportRow {
    /// Dimension cell at `index`, empty string when absent.
    pub fn dimension(&self, index: usize) -> String {
        self.dimension_values
            .get(index)
            .map(|v| v.value.clone())
            .unwrap_or_default()
    }

    /// Metric cell at `index`, empty string when absent.
    pub fn metric(&self, index: usize) -> String {
        self.metric_values
            .get(index)
            .map(|v| v.value.clone())
            .unwrap_or_default()
    }
}

/// A `runReport` response, reduced to the fields the handlers consume.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RunReportResponse {
    pub dimension_headers: Vec<ApiHeader>,
    pub metric_headers: Vec<ApiHeader>,
    pub rows: Vec<ReportRow>,
}

// ── Admin API resources ─────────────────────────────────────────

/// A GA4 account resource (`accounts/123`).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Account {
    pub name: String,
    pub display_name: String,
}

/// A GA4 property resource (`properties/123`).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertySummary {
    pub name: String,
    pub display_name: String,
}

impl PropertySummary {
    /// The numeric id, i.e. the trailing segment of the resource name.
    pub fn property_id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

// ── Capability traits ───────────────────────────────────────────

/// Executes report queries (GA4 Data API).
pub trait DataClient {
    fn run_report(
        &self,
        property_id: &str,
        request: &RunReportRequest,
    ) -> Result<RunReportResponse>;
}

/// Enumerates accounts and properties (GA4 Admin API). Only used for
/// property selection and listings, never by the engine itself.
pub trait AdminClient {
    fn list_accounts(&self) -> Result<Vec<Account>>;

    /// Properties under `account_name` (an `accounts/123` resource name).
    fn list_properties(&self, account_name: &str) -> Result<Vec<PropertySummary>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_to_api_shape() {
        let request = RunReportRequest {
            dimensions: vec![Dimension::new("city")],
            metrics: vec![Metric::new("activeUsers")],
            date_ranges: vec![DateRange::new("2024-01-01", "2024-01-07")],
            limit: Some(5),
            order_bys: vec![OrderBy::metric_desc("activeUsers")],
        };
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["dateRanges"][0]["startDate"], "2024-01-01");
        assert_eq!(json["orderBys"][0]["metric"]["metricName"], "activeUsers");
        assert_eq!(json["orderBys"][0]["desc"], true);
        assert!(json["orderBys"][0].get("dimension").is_none());
        assert_eq!(json["limit"], 5);
    }

    #[test]
    fn response_tolerates_missing_fields() {
        let response: RunReportResponse = serde_json::from_str("{}").unwrap();
        assert!(response.rows.is_empty());

        let response: RunReportResponse = serde_json::from_str(
            r#"{"dimensionHeaders":[{"name":"city"}],
                "metricHeaders":[{"name":"activeUsers"}],
                "rows":[{"dimensionValues":[{"value":"London"}],
                         "metricValues":[{"value":"100"}]}]}"#,
        )
        .unwrap();
        assert_eq!(response.rows[0].dimension(0), "London");
        assert_eq!(response.rows[0].metric(0), "100");
        assert_eq!(response.rows[0].metric(5), "");
    }

    #[test]
    fn property_id_strips_resource_prefix() {
        let prop = PropertySummary {
            name: "properties/4567".into(),
            display_name: "www.example.com".into(),
        };
        assert_eq!(prop.property_id(), "4567");
    }
}
