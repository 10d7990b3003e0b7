//! User acquisition by session source/medium.

use anyhow::Result;

use crate::client::{DataClient, DateRange, Dimension, Metric, OrderBy, RunReportRequest};
use crate::report::{table_from_response, ReportHandler, TabularResult};

/// New users per session source/medium, busiest sources first. Headers come
/// from the API response.
pub struct UserAcquisition;

impl ReportHandler for UserAcquisition {
    fn name(&self) -> &str {
        "User Acquisition"
    }

    fn key(&self) -> &str {
        "user_acquisition"
    }

    fn run(
        &self,
        property_id: &str,
        client: &dyn DataClient,
        start_date: &str,
        end_date: &str,
    ) -> Result<TabularResult> {
        let request = RunReportRequest {
            dimensions: vec![Dimension::new("sessionSourceMedium")],
            metrics: vec![Metric::new("newUsers")],
            date_ranges: vec![DateRange::new(start_date, end_date)],
            limit: None,
            order_bys: vec![OrderBy::metric_desc("newUsers")],
        };
        let response = client.run_report(property_id, &request)?;

        let (headers, rows) = table_from_response(&response, |_, value| value.to_string());
        Ok(TabularResult {
            title: "User Acquisition Report".to_string(),
            headers,
            rows,
            date_range: Some(format!("{start_date} to {end_date}")),
        })
    }
}
