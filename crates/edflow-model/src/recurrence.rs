//! Recurring background processes (repeated observations and similar).

use serde::{Deserialize, Serialize};

use crate::process::ProcessId;

/// Minimum interval, in minutes, reported for every recurrent process.
pub const RECURRENCE_MIN_INTERVAL: u32 = 5;

/// Splices a recurring process into the pathway after a trigger process.
///
/// All rules sharing a trigger form one probability split; their
/// probabilities sum to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub trigger: ProcessId,
    pub kickoff: ProcessId,
    pub probability: f64,
    pub recurrent_process: String,
}

/// Interval parameters for a recurrent process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceParameters {
    pub recurrent_process: String,
    /// Mean interval in minutes, read from the first number in the name.
    pub mean: Option<u32>,
    pub std_dev: Option<u32>,
    pub min: u32,
    pub max: Option<u32>,
}

impl RecurrenceParameters {
    /// Derives parameters from a name such as `"Obs 60 min (Majors)"`.
    pub fn from_name(recurrent_process: &str) -> Self {
        let mean = leading_number(recurrent_process);
        Self {
            recurrent_process: recurrent_process.to_string(),
            mean,
            std_dev: mean.map(|mean| (f64::from(mean) * 0.1).round() as u32),
            min: RECURRENCE_MIN_INTERVAL,
            max: None,
        }
    }
}

fn leading_number(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
