//! Configuration for an analysis run.
//!
//! Every option has a default matching the reference deployment, so an empty
//! TOML file is a valid configuration. [`PipelineConfig::load`] parses and
//! validates in one step; nothing downstream re-checks these values.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::NaiveDate;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::order::ProcessOrder;
use crate::process::ProcessId;
use crate::recurrence::RecurrenceRule;
use crate::transition::PERCENT_TOLERANCE;

/// Equality gates for near-duplicate suppression.
///
/// When a gate is enabled, a repeat is only suppressed if the gated field
/// matches the previous occurrence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DuplicateGates {
    pub staff: bool,
    pub location: bool,
}

/// Two labels recorded for one clinical act; `drop` yields to `keep`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NameCollision {
    pub keep: String,
    pub drop: String,
}

/// Event names with special meaning to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventNames {
    pub ambulance_arrival: String,
    pub walk_in: String,
    pub discharge: String,
    pub boarding_prefix: String,
    pub opening_sentinel: String,
    pub closing_sentinel: String,
    pub observation: String,
}

impl Default for EventNames {
    fn default() -> Self {
        Self {
            ambulance_arrival: "Ambulance Arrival".to_string(),
            walk_in: "Walk-In".to_string(),
            discharge: "Discharged".to_string(),
            boarding_prefix: "Wait for Bed".to_string(),
            opening_sentinel: "Spawn".to_string(),
            closing_sentinel: "Removed".to_string(),
            observation: "Observations".to_string(),
        }
    }
}

/// Threshold-based pruning applied by an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PruningMode {
    #[default]
    None,
    /// Remove whole visits that make a rare transition, then re-aggregate.
    Visit,
    /// Remove rare edges and renormalize the survivors.
    Edge,
}

impl PruningMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Visit => "visit",
            Self::Edge => "edge",
        }
    }
}

/// Validated pruning with its threshold in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pruning {
    None,
    Visit(f64),
    Edge(f64),
}

/// One named analysis run over the resolved event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    pub name: String,
    #[serde(default)]
    pub pruning_mode: PruningMode,
    #[serde(default)]
    pub pruning_threshold: Option<f64>,
}

impl AnalysisConfig {
    pub fn unpruned(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pruning_mode: PruningMode::None,
            pruning_threshold: None,
        }
    }

    pub fn pruning(&self) -> Result<Pruning> {
        let threshold = match (self.pruning_mode, self.pruning_threshold) {
            (PruningMode::None, _) => return Ok(Pruning::None),
            (mode, None) => {
                return Err(ConfigError::MissingThreshold {
                    analysis: self.name.clone(),
                    mode: mode.as_str().to_string(),
                });
            }
            (_, Some(threshold)) => threshold,
        };
        if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
            return Err(ConfigError::Threshold {
                name: format!("pruning_threshold for analysis {}", self.name),
                value: threshold,
            });
        }
        Ok(match self.pruning_mode {
            PruningMode::Visit => Pruning::Visit(threshold),
            PruningMode::Edge => Pruning::Edge(threshold),
            PruningMode::None => Pruning::None,
        })
    }
}

/// Full configuration surface of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// chrono format of `EventTime` values.
    pub timestamp_format: String,
    /// Events strictly before this date are dropped.
    pub cutoff_date: NaiveDate,
    /// Repeats of one event name closer than this (minutes) are suppressed.
    pub repeat_time_threshold: f64,
    pub duplicate_suppression_gates: DuplicateGates,
    /// Event names kept only at their first occurrence per visit.
    pub non_repeatable_event_names: BTreeSet<String>,
    pub name_collisions: Vec<NameCollision>,
    pub event_names: EventNames,
    /// Location given to ambulance arrivals recorded without one.
    pub default_ambulance_location: String,
    pub location_to_pathway_map: BTreeMap<String, String>,
    pub excluded_event_names: BTreeSet<String>,
    pub excluded_locations: BTreeSet<String>,
    /// Admission outcome value meaning "not admitted"; such rows are ignored.
    pub non_admitted_outcome: String,
    /// Collapses specific admission destinations to a canonical label.
    pub admission_outcome_map: BTreeMap<String, String>,
    /// Tie-breaking priority per event name.
    pub process_order: BTreeMap<String, u32>,
    pub boarding_priority: u32,
    pub include_sentinels: bool,
    pub last_location_override: bool,
    pub recurrence_rules: Vec<RecurrenceRule>,
    /// Pathway fragments whose processes wait in place.
    pub wait_in_place_pathways: Vec<String>,
    /// Diagnostic requests of one visit closer than this (minutes) collapse.
    pub diagnostics_collapse_minutes: f64,
    pub analyses: Vec<AnalysisConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let names = EventNames::default();
        Self {
            timestamp_format: "%d/%m/%Y %H:%M".to_string(),
            cutoff_date: NaiveDate::from_ymd_opt(2018, 4, 1).unwrap_or_default(),
            repeat_time_threshold: 10.0,
            duplicate_suppression_gates: DuplicateGates::default(),
            non_repeatable_event_names: strings(&[
                "Triaged",
                "Discharged",
                "Booked In",
                "Ambulance Arrival",
                "Walk-In",
                "Admitted - Other Derriford Ward",
                "Admitted - MAU",
                "Admitted - SDEC",
            ]),
            name_collisions: vec![NameCollision {
                keep: "Seen By Clinician/Treated".to_string(),
                drop: "Senior Reviewed".to_string(),
            }],
            default_ambulance_location: "Ambulance".to_string(),
            location_to_pathway_map: pairs(&[
                ("Ambulance", "Majors"),
                ("Ambulatory Cubicles", "Ambulatory"),
                ("Ambulatory Waiting Area", "Ambulatory"),
                ("Majors Corridor", "Majors"),
                ("Majors Cubicles", "Majors"),
                ("Minors", "Minors"),
                ("Resus", "Resus"),
            ]),
            excluded_event_names: strings(&["Nursing Assessment", "Clinically Ready to Proceed"]),
            excluded_locations: strings(&["Paediatrics", "Plym"]),
            non_admitted_outcome: "Non-Admitted".to_string(),
            admission_outcome_map: BTreeMap::new(),
            process_order: default_process_order(&names),
            boarding_priority: 14,
            include_sentinels: false,
            last_location_override: true,
            recurrence_rules: default_recurrence_rules(),
            wait_in_place_pathways: vec!["Majors".to_string(), "Resus".to_string()],
            diagnostics_collapse_minutes: 5.0,
            analyses: vec![AnalysisConfig::unpruned("All")],
            event_names: names,
        }
    }
}

impl PipelineConfig {
    /// Reads, parses and validates a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::io(path, source))?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every option; returns the first violation found.
    pub fn validate(&self) -> Result<()> {
        validate_timestamp_format(&self.timestamp_format)?;
        check_threshold("repeat_time_threshold", self.repeat_time_threshold, None)?;
        check_threshold(
            "diagnostics_collapse_minutes",
            self.diagnostics_collapse_minutes,
            None,
        )?;

        for (location, pathway) in &self.location_to_pathway_map {
            if pathway.trim().is_empty() {
                return Err(ConfigError::EmptyPathway {
                    location: location.clone(),
                });
            }
        }
        if !self
            .location_to_pathway_map
            .contains_key(&self.default_ambulance_location)
        {
            return Err(ConfigError::UnmappedLocation {
                location: self.default_ambulance_location.clone(),
            });
        }

        for collision in &self.name_collisions {
            if collision.keep == collision.drop {
                return Err(ConfigError::CollisionSelf {
                    name: collision.keep.clone(),
                });
            }
        }

        self.validate_recurrence()?;

        let mut names = BTreeSet::new();
        for analysis in &self.analyses {
            if analysis.name.trim().is_empty() {
                return Err(ConfigError::EmptyAnalysisName);
            }
            if !names.insert(analysis.name.as_str()) {
                return Err(ConfigError::DuplicateAnalysis {
                    name: analysis.name.clone(),
                });
            }
            analysis.pruning()?;
        }
        Ok(())
    }

    fn validate_recurrence(&self) -> Result<()> {
        let mut kickoffs: BTreeMap<&ProcessId, &ProcessId> = BTreeMap::new();
        for rule in &self.recurrence_rules {
            if !rule.probability.is_finite() || rule.probability <= 0.0 || rule.probability > 100.0
            {
                return Err(ConfigError::RecurrenceProbability {
                    trigger: rule.trigger.label(),
                    probability: rule.probability,
                });
            }
            if let Some(existing) = kickoffs.insert(&rule.kickoff, &rule.trigger)
                && existing != &rule.trigger
            {
                return Err(ConfigError::RecurrenceKickoff {
                    kickoff: rule.kickoff.label(),
                });
            }
        }
        for (trigger, rules) in self.recurrence_by_trigger() {
            let total: f64 = rules.iter().map(|rule| rule.probability).sum();
            if (total - 100.0).abs() > PERCENT_TOLERANCE {
                return Err(ConfigError::RecurrenceTotal {
                    trigger: trigger.label(),
                    total,
                });
            }
        }
        Ok(())
    }

    /// Recurrence rules grouped by trigger, in configuration order per group.
    pub fn recurrence_by_trigger(&self) -> BTreeMap<ProcessId, Vec<&RecurrenceRule>> {
        let mut grouped: BTreeMap<ProcessId, Vec<&RecurrenceRule>> = BTreeMap::new();
        for rule in &self.recurrence_rules {
            grouped.entry(rule.trigger.clone()).or_default().push(rule);
        }
        grouped
    }

    /// Order-key resolver for this configuration.
    pub fn process_order(&self) -> ProcessOrder {
        ProcessOrder::new(
            self.process_order.clone(),
            self.event_names.boarding_prefix.clone(),
            self.boarding_priority,
            self.event_names.opening_sentinel.clone(),
            self.event_names.closing_sentinel.clone(),
        )
    }

    pub fn pathway_for(&self, location: &str) -> Option<&str> {
        self.location_to_pathway_map
            .get(location)
            .map(String::as_str)
    }
}

fn validate_timestamp_format(format: &str) -> Result<()> {
    if format.trim().is_empty() {
        return Err(ConfigError::TimestampFormat {
            format: format.to_string(),
            message: "format is empty".to_string(),
        });
    }
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ConfigError::TimestampFormat {
            format: format.to_string(),
            message: "unknown format specifier".to_string(),
        });
    }
    Ok(())
}

fn check_threshold(name: &str, value: f64, max: Option<f64>) -> Result<()> {
    let in_range = value.is_finite() && value >= 0.0 && max.is_none_or(|max| value <= max);
    if in_range {
        Ok(())
    } else {
        Err(ConfigError::Threshold {
            name: name.to_string(),
            value,
        })
    }
}

fn strings(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}

fn pairs(values: &[(&str, &str)]) -> BTreeMap<String, String> {
    values
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

fn default_process_order(names: &EventNames) -> BTreeMap<String, u32> {
    let ranked: [(&str, u32); 18] = [
        (names.walk_in.as_str(), 1),
        (names.ambulance_arrival.as_str(), 1),
        ("Booked In", 2),
        ("Triaged", 3),
        ("Nursing Assessment", 4),
        ("Seen By Clinician/Treated", 5),
        ("Clerked", 6),
        (names.observation.as_str(), 7),
        ("Imaging", 8),
        ("Laboratory", 9),
        ("Specialty Reviewed", 10),
        ("Senior Reviewed", 11),
        ("Clinically Ready to Proceed", 12),
        ("Decision to Admit", 13),
        (names.discharge.as_str(), 14),
        ("Admitted - Other Derriford Ward", 15),
        ("Admitted - MAU", 15),
        ("Admitted - SDEC", 15),
    ];
    ranked
        .iter()
        .map(|(name, rank)| ((*name).to_string(), *rank))
        .collect()
}

fn default_recurrence_rules() -> Vec<RecurrenceRule> {
    let splits = [
        ("Majors", 60, 85.0),
        ("Majors", 30, 15.0),
        ("Resus", 60, 60.0),
        ("Resus", 30, 40.0),
    ];
    splits
        .iter()
        .map(|(pathway, minutes, probability)| RecurrenceRule {
            trigger: ProcessId::new("Triaged", *pathway),
            kickoff: ProcessId::new(format!("Triaged {minutes} min Obs"), *pathway),
            probability: *probability,
            recurrent_process: format!("Obs {minutes} min ({pathway})"),
        })
        .collect()
}
