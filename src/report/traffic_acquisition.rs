//! Traffic acquisition with engagement and conversion metrics.

use anyhow::Result;

use crate::client::{DataClient, DateRange, Dimension, Metric, OrderBy, RunReportRequest};
use crate::report::{percent_or_raw, table_from_response, ReportHandler, TabularResult};

/// Channel and source/medium performance with engagement and conversion
/// metrics, busiest channels first. Headers come from the API response.
///
/// The conversions metric sums every conversion event configured on the
/// property.
pub struct TrafficAcquisition;

impl ReportHandler for TrafficAcquisition {
    fn name(&self) -> &str {
        "Traffic Acquisition"
    }

    fn key(&self) -> &str {
        "traffic_acquisition"
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
                Dimension::new("sessionDefaultChannelGroup"),
                Dimension::new("sessionSourceMedium"),
            ],
            metrics: vec![
                Metric::new("totalUsers"),
                Metric::new("newUsers"),
                Metric::new("engagedSessions"),
                Metric::new("engagementRate"),
                Metric::new("conversions"),
            ],
            date_ranges: vec![DateRange::new(start_date, end_date)],
            limit: None,
            order_bys: vec![OrderBy::metric_desc("totalUsers")],
        };
        let response = client.run_report(property_id, &request)?;

        // engagementRate arrives as a 0.0-1.0 ratio; show it as a percentage.
        let (headers, rows) = table_from_response(&response, |header, value| {
            if header == "engagementRate" {
                percent_or_raw(value)
            } else {
                value.to_string()
            }
        });
        Ok(TabularResult {
            title: "Traffic Acquisition Report".to_string(),
            headers,
            rows,
            date_range: Some(format!("{start_date} to {end_date}")),
        })
    }
}
