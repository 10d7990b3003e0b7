//! Channel overview: new users and engaged sessions per channel group.

use anyhow::Result;

use crate::client::{DataClient, DateRange, Dimension, Metric, OrderBy, RunReportRequest};
use crate::report::{ReportHandler, TabularResult};

/// New users and engaged sessions per default channel group, sorted
/// alphabetically by channel.
pub struct ChannelOverview;

impl ReportHandler for ChannelOverview {
    fn name(&self) -> &str {
        "Channel Overview"
    }

    fn key(&self) -> &str {
        "channel_overview"
    }

    fn run(
        &self,
        property_id: &str,
        client: &dyn DataClient,
        start_date: &str,
        end_date: &str,
    ) -> Result<TabularResult> {
        let request = RunReportRequest {
            dimensions: vec![Dimension::new("sessionDefaultChannelGroup")],
            metrics: vec![Metric::new("newUsers"), Metric::new("engagedSessions")],
            date_ranges: vec![DateRange::new(start_date, end_date)],
            limit: None,
            order_bys: vec![OrderBy::dimension_asc("sessionDefaultChannelGroup")],
        };
        let response = client.run_report(property_id, &request)?;

        let mut result = TabularResult::new(
            "Channel Overview Report",
            &["Channel", "New Users", "Engaged Sessions"],
        );
        result.date_range = Some(format!("{start_date} to {end_date}"));
        for row in &response.rows {
            result
                .rows
                .push(vec![row.dimension(0), row.metric(0), row.metric(1)]);
        }
        Ok(result)
    }
}
