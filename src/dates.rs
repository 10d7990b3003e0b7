//! Date-range resolution for report runs.
//!
//! Named relative ranges plus a custom two-date window. Every resolution
//! carries a compact label for menus and a verbose "start to end" string
//! for the output layer.

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Duration, NaiveDate};

/// A resolved reporting window, inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Compact menu label, e.g. "Last 7 Days".
    pub label: String,
}

impl ResolvedRange {
    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub fn end_str(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }

    /// The verbose "start to end" form.
    pub fn verbose(&self) -> String {
        format!("{} to {}", self.start_str(), self.end_str())
    }
}

/// The named relative ranges offered in menus, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedRange {
    Last7Days,
    Last28Days,
    Last90Days,
    /// The previous calendar month. Default when nothing is chosen.
    LastMonth,
}

impl NamedRange {
    pub const ALL: [NamedRange; 4] = [
        NamedRange::Last7Days,
        NamedRange::Last28Days,
        NamedRange::Last90Days,
        NamedRange::LastMonth,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NamedRange::Last7Days => "Last 7 Days",
            NamedRange::Last28Days => "Last 28 Days",
            NamedRange::Last90Days => "Last 90 Days",
            NamedRange::LastMonth => "Last Calendar Month",
        }
    }

    /// CLI flag value, e.g. `last-7d`.
    pub fn flag(self) -> &'static str {
        match self {
            NamedRange::Last7Days => "last-7d",
            NamedRange::Last28Days => "last-28d",
            NamedRange::Last90Days => "last-90d",
            NamedRange::LastMonth => "last-month",
        }
    }

    pub fn from_flag(value: &str) -> Option<Self> {
        NamedRange::ALL
            .into_iter()
            .find(|r| r.flag() == value.trim().to_ascii_lowercase())
    }

    /// Resolve against a fixed `today` so callers (and tests) control the
    /// clock.
    pub fn resolve(self, today: NaiveDate) -> ResolvedRange {
        let (start, end) = match self {
            NamedRange::Last7Days => (today - Duration::days(7), today),
            NamedRange::Last28Days => (today - Duration::days(28), today),
            NamedRange::Last90Days => (today - Duration::days(90), today),
            NamedRange::LastMonth => {
                let first_of_this_month =
                    NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap_or(today);
                let end = first_of_this_month - Duration::days(1);
                let start =
                    NaiveDate::from_ymd_opt(end.year(), end.month(), 1).unwrap_or(end);
                (start, end)
            }
        };
        ResolvedRange {
            start,
            end,
            label: self.label().to_string(),
        }
    }
}

/// Parse an ISO calendar date.
pub fn parse_iso(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{value}', expected YYYY-MM-DD"))
}

/// A custom window. The start must not come after the end.
pub fn custom(start: NaiveDate, end: NaiveDate) -> Result<ResolvedRange> {
    if start > end {
        bail!("Start date {start} is after end date {end}");
    }
    Ok(ResolvedRange {
        start,
        end,
        label: "Custom Range".to_string(),
    })
}
