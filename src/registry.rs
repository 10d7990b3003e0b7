//! Report discovery and lookup.
//!
//! The report set is an explicit registry populated at startup, kept open
//! so embedders can add their own handlers next to the builtins.

use crate::report::channel_overview::ChannelOverview;
use crate::report::top_cities::TopCities;
use crate::report::top_pages::TopPages;
use crate::report::traffic_acquisition::TrafficAcquisition;
use crate::report::user_acquisition::UserAcquisition;
use crate::report::user_technology::UserTechnology;
use crate::report::{ReportDescriptor, ReportHandler};

pub struct ReportRegistry {
    handlers: Vec<Box<dyn ReportHandler>>,
}

impl ReportRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self { handlers: Vec::new() }
    }

    /// The builtin reports, in menu order.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(TopCities));
        registry.register(Box::new(TopPages));
        registry.register(Box::new(ChannelOverview));
        registry.register(Box::new(UserAcquisition));
        registry.register(Box::new(TrafficAcquisition));
        registry.register(Box::new(UserTechnology));
        registry
    }

    pub fn register(&mut self, handler: Box<dyn ReportHandler>) {
        self.handlers.push(handler);
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Name and key of every registered report, recomputed per call.
    pub fn discover(&self) -> Vec<ReportDescriptor> {
        self.handlers
            .iter()
            .map(|h| ReportDescriptor {
                name: h.name().to_string(),
                key: h.key().to_string(),
            })
            .collect()
    }

    /// Case-insensitive lookup by key or display name. Spaces, dashes and
    /// underscores are interchangeable, so "Top Cities", "top-cities" and
    /// "top_cities" all resolve to the same handler.
    pub fn resolve(&self, name_or_key: &str) -> Option<&dyn ReportHandler> {
        let wanted = normalize(name_or_key);
        self.handlers
            .iter()
            .find(|h| normalize(h.key()) == wanted || normalize(h.name()) == wanted)
            .map(|h| h.as_ref())
    }

    /// Handler at `index` in registration order.
    pub fn get(&self, index: usize) -> Option<&dyn ReportHandler> {
        self.handlers.get(index).map(|h| h.as_ref())
    }
}

impl Default for ReportRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}
