use std::path::PathBuf;

use thiserror::Error;

/// Rejected configuration. Raised before any event data is read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("recurrence probabilities for trigger {trigger} sum to {total}, expected 100")]
    RecurrenceTotal { trigger: String, total: f64 },

    #[error("recurrence probability {probability} for trigger {trigger} is outside (0, 100]")]
    RecurrenceProbability { trigger: String, probability: f64 },

    #[error("recurrence kickoff {kickoff} is used by more than one trigger")]
    RecurrenceKickoff { kickoff: String },

    #[error("invalid {name}: {value}")]
    Threshold { name: String, value: f64 },

    #[error("analysis {analysis} uses {mode} pruning without a pruning_threshold")]
    MissingThreshold { analysis: String, mode: String },

    #[error("duplicate analysis name: {name}")]
    DuplicateAnalysis { name: String },

    #[error("analysis name must not be empty")]
    EmptyAnalysisName,

    #[error("location {location} is not in location_to_pathway_map")]
    UnmappedLocation { location: String },

    #[error("location {location} maps to an empty pathway name")]
    EmptyPathway { location: String },

    #[error("name collision rule keeps and drops the same event name: {name}")]
    CollisionSelf { name: String },

    #[error("invalid timestamp_format {format}: {message}")]
    TimestampFormat { format: String, message: String },
}

impl ConfigError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
