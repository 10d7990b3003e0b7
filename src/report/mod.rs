//! Report contract and the uniform tabular result shape.
//!
//! Every report is one GA4 query wrapped behind [`ReportHandler`]; every
//! handler returns a [`TabularResult`]. The engine moves these tables
//! around (cache, renderers) without ever interpreting their cells.

pub mod channel_overview;
pub mod top_cities;
pub mod top_pages;
pub mod traffic_acquisition;
pub mod user_acquisition;
pub mod user_technology;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::client::{DataClient, RunReportResponse};

/// A finished report: a titled table of pre-formatted cells.
///
/// Cells are opaque strings; numeric values were already stringified by the
/// handler that produced them. Invariant: every row has exactly
/// `headers.len()` cells.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TabularResult {
    /// Display title, also used to derive output file names.
    pub title: String,
    /// Column headers, in display order.
    pub headers: Vec<String>,
    /// Data rows; one cell per header.
    pub rows: Vec<Vec<String>>,
    /// Verbose "start to end" window the report covered, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<String>,
}

impl TabularResult {
    /// An empty table with the given title and headers.
    pub fn new(title: impl Into<String>, headers: &[&str]) -> Self {
        Self {
            title: title.into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            date_range: None,
        }
    }

    /// True when every row has exactly one cell per header.
    pub fn is_well_formed(&self) -> bool {
        self.rows.iter().all(|row| row.len() == self.headers.len())
    }
}

/// A pluggable report.
///
/// The set of reports is open: anything implementing this trait can be
/// registered alongside the builtins.
pub trait ReportHandler {
    /// Human display name, e.g. "Top Cities".
    fn name(&self) -> &str;

    /// Stable identifier used for lookup and cache fingerprints.
    fn key(&self) -> &str;

    /// Execute the report against `client` for the given window.
    ///
    /// Dates are ISO calendar dates (`YYYY-MM-DD`). An empty row set is a
    /// valid result; errors mean the query itself failed.
    fn run(
        &self,
        property_id: &str,
        client: &dyn DataClient,
        start_date: &str,
        end_date: &str,
    ) -> Result<TabularResult>;
}

/// Name and key of a registered report, as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDescriptor {
    pub name: String,
    pub key: String,
}

/// Render a ratio metric (0.0 to 1.0) as a percentage with two decimals.
/// Unparsable values pass through untouched.
pub(crate) fn percent_or_raw(value: &str) -> String {
    match value.parse::<f64>() {
        Ok(rate) => format!("{:.2}%", rate * 100.0),
        Err(_) => value.to_string(),
    }
}

/// Flatten a response into `(headers, rows)` using the API's own header
/// names. `format_metric` sees each metric header name and raw cell value,
/// so callers can reformat individual metrics.
pub(crate) fn table_from_response(
    response: &RunReportResponse,
    format_metric: impl Fn(&str, &str) -> String,
) -> (Vec<String>, Vec<Vec<String>>) {
    let headers: Vec<String> = response
        .dimension_headers
        .iter()
        .chain(response.metric_headers.iter())
        .map(|h| h.name.clone())
        .collect();

    let rows = response
        .rows
        .iter()
        .map(|row| {
            let mut cells: Vec<String> =
                row.dimension_values.iter().map(|v| v.value.clone()).collect();
            for (i, value) in row.metric_values.iter().enumerate() {
                let header = response
                    .metric_headers
                    .get(i)
                    .map(|h| h.name.as_str())
                    .unwrap_or("");
                cells.push(format_metric(header, &value.value));
            }
            cells
        })
        .collect();

    (headers, rows)
}
