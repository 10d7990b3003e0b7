//! ga4-reporter: run predefined GA4 reports with a local result cache.
//!
//! The interesting machinery is the execution engine: an open report
//! registry, a fingerprinted TTL disk cache, a cache-or-invoke executor,
//! and the session loop that ties property/report/date-range selection to
//! execution and output. The GA4 APIs sit behind capability traits in
//! [`client`]; renderers live in [`output`].

pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod dates;
pub mod executor;
pub mod output;
pub mod registry;
pub mod report;
pub mod session;
