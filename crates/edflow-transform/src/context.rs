//! Shared state for transform steps.

use std::cmp::Ordering;

use edflow_model::{EventNames, EventRecord, PipelineConfig, ProcessOrder};

/// Configuration and derived lookups handed to every transform step.
#[derive(Debug, Clone)]
pub struct TransformContext<'a> {
    pub config: &'a PipelineConfig,
    pub order: ProcessOrder,
}

impl<'a> TransformContext<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self {
            config,
            order: config.process_order(),
        }
    }

    pub fn names(&self) -> &EventNames {
        &self.config.event_names
    }

    /// Compares two events of one visit by time, then order key, then name.
    pub fn compare(&self, a: &EventRecord, b: &EventRecord) -> Ordering {
        a.event_time
            .cmp(&b.event_time)
            .then_with(|| {
                self.order
                    .key(&a.event_name)
                    .cmp(&self.order.key(&b.event_name))
            })
            .then_with(|| a.event_name.cmp(&b.event_name))
    }

    /// Stable sort of one visit's events into sequence order.
    pub fn sort_visit(&self, events: &mut [EventRecord]) {
        events.sort_by(|a, b| self.compare(a, b));
    }
}
