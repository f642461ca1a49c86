//! Canonical process identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A process step: an event name within a pathway.
///
/// Identity is the `(event_name, pathway)` pair. The `"EventName (Pathway)"`
/// form is only a display label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProcessId {
    #[serde(rename = "event")]
    pub event_name: String,
    pub pathway: String,
}

impl ProcessId {
    pub fn new(event_name: impl Into<String>, pathway: impl Into<String>) -> Self {
        Self {
            event_name: event_name.into(),
            pathway: pathway.into(),
        }
    }

    /// Display label, e.g. `Triaged (Majors)`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.event_name, self.pathway)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_joins_event_and_pathway() {
        let process = ProcessId::new("Triaged", "Majors");
        assert_eq!(process.label(), "Triaged (Majors)");
    }

    #[test]
    fn identity_ignores_label_collisions() {
        // Same label, different structure.
        let nested = ProcessId::new("Seen (Minors)", "Majors");
        let flat = ProcessId::new("Seen", "Minors) (Majors");
        assert_eq!(nested.label(), flat.label());
        assert_ne!(nested, flat);
    }
}
