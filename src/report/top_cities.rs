//! Top cities by active users.

use anyhow::Result;

use crate::client::{DataClient, DateRange, Dimension, Metric, OrderBy, RunReportRequest};
use crate::report::{ReportHandler, TabularResult};

/// The five busiest cities by active users in the selected window.
pub struct TopCities;

impl ReportHandler for TopCities {
    fn name(&self) -> &str {
        "Top Cities"
    }

    fn key(&self) -> &str {
        "top_cities"
    }

    fn run(
        &self,
        property_id: &str,
        client: &dyn DataClient,
        start_date: &str,
        end_date: &str,
    ) -> Result<TabularResult> {
        let request = RunReportRequest {
            dimensions: vec![Dimension::new("city")],
            metrics: vec![Metric::new("activeUsers")],
            date_ranges: vec![DateRange::new(start_date, end_date)],
            limit: Some(5),
            order_bys: vec![OrderBy::metric_desc("activeUsers")],
        };
        let response = client.run_report(property_id, &request)?;

        let mut result = TabularResult::new("Top 5 Cities by Active Users", &["City", "Active Users"]);
        result.date_range = Some(format!("{start_date} to {end_date}"));
        for row in &response.rows {
            result.rows.push(vec![row.dimension(0), row.metric(0)]);
        }
        Ok(result)
    }
}
