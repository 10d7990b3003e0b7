//! Top pages by screen page views.

use anyhow::Result;

use crate::client::{DataClient, DateRange, Dimension, Metric, OrderBy, RunReportRequest};
use crate::report::{ReportHandler, TabularResult};

/// The 25 most-viewed pages in the selected window.
pub struct TopPages;

impl ReportHandler for TopPages {
    fn name(&self) -> &str {
        "Top Pages"
    }

    fn key(&self) -> &str {
        "top_pages"
    }

    fn run(
        &self,
        property_id: &str,
        client: &dyn DataClient,
        start_date: &str,
        end_date: &str,
    ) -> Result<TabularResult> {
        let request = RunReportRequest {
            dimensions: vec![Dimension::new("pagePath")],
            metrics: vec![Metric::new("screenPageViews")],
            date_ranges: vec![DateRange::new(start_date, end_date)],
            limit: Some(25),
            order_bys: vec![OrderBy::metric_desc("screenPageViews")],
        };
        let response = client.run_report(property_id, &request)?;

        let mut result =
            TabularResult::new("Top 25 Pages by Views", &["Page Path", "Screen Page Views"]);
        result.date_range = Some(format!("{start_date} to {end_date}"));
        for row in &response.rows {
            result.rows.push(vec![row.dimension(0), row.metric(0)]);
        }
        Ok(result)
    }
}
