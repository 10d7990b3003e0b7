//! Audience technology profile: device, OS, browser.

use anyhow::Result;

use crate::client::{DataClient, DateRange, Dimension, Metric, OrderBy, RunReportRequest};
use crate::report::{percent_or_raw, table_from_response, ReportHandler, TabularResult};

/// Device category, operating system and browser usage, busiest segments
/// first. Headers come from the API response.
pub struct UserTechnology;

impl ReportHandler for UserTechnology {
    fn name(&self) -> &str {
        "User Technology"
    }

    fn key(&self) -> &str {
        "user_technology"
    }

    fn run(
        &self,
        property_id: &str,
        client: &dyn DataClient,
        start_date: &str,
        end_date: &str,
    ) -> Result<TabularResult> {
        let request = RunReportRequest {
            dimensions: vec![
                Dimension::new("deviceCategory"),
                Dimension::new("operatingSystem"),
                Dimension::new("browser"),
            ],
            metrics: vec![
                Metric::new("totalUsers"),
                Metric::new("engagedSessions"),
                Metric::new("engagementRate"),
            ],
            date_ranges: vec![DateRange::new(start_date, end_date)],
            limit: None,
            order_bys: vec![OrderBy::metric_desc("totalUsers")],
        };
        let response = client.run_report(property_id, &request)?;

        let (headers, rows) = table_from_response(&response, |header, value| {
            if header == "engagementRate" {
                percent_or_raw(value)
            } else {
                value.to_string()
            }
        });
        Ok(TabularResult {
            title: "User Technology Report".to_string(),
            headers,
            rows,
            date_range: Some(format!("{start_date} to {end_date}")),
        })
    }
}
