use std::collections::BTreeMap;

use serde::Serialize;

use super::domain::{RiskFactor, RiskLevel};

/// Lower-inclusive score bound at which a level starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelThreshold {
    pub level: RiskLevel,
    pub lower_bound: f64,
}

impl LevelThreshold {
    pub fn new(level: RiskLevel, lower_bound: f64) -> Self {
        Self { level, lower_bound }
    }
}

/// Validated factor weights and level thresholds.
///
/// Built once at start-up and shared read-only afterwards. Fields are private
/// so a constructed value always satisfies the validation rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightConfig {
    weights: BTreeMap<RiskFactor, f64>,
    thresholds: Vec<LevelThreshold>,
}

impl WeightConfig {
    pub fn new(
        weights: BTreeMap<RiskFactor, f64>,
        thresholds: Vec<LevelThreshold>,
    ) -> Result<Self, WeightConfigError> {
        validate_weights(&weights)?;
        validate_thresholds(&thresholds)?;
        Ok(Self {
            weights,
            thresholds,
        })
    }

    /// Weights and thresholds used when nothing else is configured.
    pub fn standard() -> Self {
        Self {
            weights: standard_weights(),
            thresholds: standard_thresholds(),
        }
    }

    /// Parse `factor=weight` and `LEVEL=bound` lists, e.g. from environment variables.
    ///
    /// `None` keeps the standard table for that half of the configuration.
    pub fn parse(weights: Option<&str>, thresholds: Option<&str>) -> Result<Self, WeightConfigError> {
        let weights = match weights {
            Some(raw) => parse_weights(raw)?,
            None => standard_weights(),
        };
        let thresholds = match thresholds {
            Some(raw) => parse_thresholds(raw)?,
            None => standard_thresholds(),
        };
        Self::new(weights, thresholds)
    }

    pub fn weights(&self) -> &BTreeMap<RiskFactor, f64> {
        &self.weights
    }

    pub fn thresholds(&self) -> &[LevelThreshold] {
        &self.thresholds
    }

    pub fn weight(&self, factor: RiskFactor) -> Option<f64> {
        self.weights.get(&factor).copied()
    }

    pub fn total_weight(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Highest level whose lower bound does not exceed `score`.
    pub fn level_for(&self, score: f64) -> RiskLevel {
        self.thresholds
            .iter()
            .rev()
            .find(|threshold| score >= threshold.lower_bound)
            .or_else(|| self.thresholds.first())
            .map(|threshold| threshold.level)
            .unwrap_or(RiskLevel::Minimal)
    }
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self::standard()
    }
}

fn standard_weights() -> BTreeMap<RiskFactor, f64> {
    BTreeMap::from([
        (RiskFactor::Historical, 0.25),
        (RiskFactor::SocialBuzz, 0.20),
        (RiskFactor::TrafficCelebrity, 0.15),
        (RiskFactor::EntryGate, 0.25),
        (RiskFactor::Weather, 0.05),
        (RiskFactor::EventIntelligence, 0.10),
    ])
}

fn standard_thresholds() -> Vec<LevelThreshold> {
    vec![
        LevelThreshold::new(RiskLevel::Minimal, 0.0),
        LevelThreshold::new(RiskLevel::Low, 0.3),
        LevelThreshold::new(RiskLevel::Medium, 0.6),
        LevelThreshold::new(RiskLevel::High, 0.8),
        LevelThreshold::new(RiskLevel::Critical, 0.9),
    ]
}

fn validate_weights(weights: &BTreeMap<RiskFactor, f64>) -> Result<(), WeightConfigError> {
    if weights.is_empty() {
        return Err(WeightConfigError::EmptyWeights);
    }

    for (&factor, &weight) in weights {
        if !weight.is_finite() {
            return Err(WeightConfigError::NonFiniteWeight { factor });
        }
        if weight < 0.0 {
            return Err(WeightConfigError::NegativeWeight { factor, weight });
        }
    }

    if weights.values().all(|weight| *weight == 0.0) {
        return Err(WeightConfigError::NoPositiveWeight);
    }

    let total: f64 = weights.values().sum();
    if !total.is_finite() {
        return Err(WeightConfigError::TotalWeightNotFinite);
    }

    Ok(())
}

fn validate_thresholds(thresholds: &[LevelThreshold]) -> Result<(), WeightConfigError> {
    let first = thresholds.first().ok_or(WeightConfigError::EmptyThresholds)?;
    if first.lower_bound != 0.0 {
        return Err(WeightConfigError::FirstThresholdNotZero {
            bound: first.lower_bound,
        });
    }

    for threshold in thresholds {
        if !(0.0..=1.0).contains(&threshold.lower_bound) {
            return Err(WeightConfigError::ThresholdOutOfRange {
                bound: threshold.lower_bound,
            });
        }
    }

    for pair in thresholds.windows(2) {
        if pair[1].lower_bound <= pair[0].lower_bound {
            return Err(WeightConfigError::ThresholdsNotIncreasing {
                previous: pair[0].lower_bound,
                next: pair[1].lower_bound,
            });
        }
    }

    for (index, threshold) in thresholds.iter().enumerate() {
        if thresholds[..index]
            .iter()
            .any(|earlier| earlier.level == threshold.level)
        {
            return Err(WeightConfigError::DuplicateLevel {
                level: threshold.level,
            });
        }
    }

    Ok(())
}

fn split_entries(raw: &str) -> impl Iterator<Item = Result<(&str, &str), WeightConfigError>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(key, value)| (key.trim(), value.trim()))
                .ok_or_else(|| WeightConfigError::MalformedEntry {
                    entry: entry.to_string(),
                })
        })
}

fn parse_number(key: &str, value: &str) -> Result<f64, WeightConfigError> {
    value
        .parse::<f64>()
        .map_err(|_| WeightConfigError::InvalidNumber {
            entry: format!("{key}={value}"),
        })
}

fn parse_weights(raw: &str) -> Result<BTreeMap<RiskFactor, f64>, WeightConfigError> {
    let mut weights = BTreeMap::new();
    for entry in split_entries(raw) {
        let (name, value) = entry?;
        let factor = name
            .parse::<RiskFactor>()
            .map_err(|err| WeightConfigError::UnknownFactor { name: err.0 })?;
        weights.insert(factor, parse_number(name, value)?);
    }
    Ok(weights)
}

fn parse_thresholds(raw: &str) -> Result<Vec<LevelThreshold>, WeightConfigError> {
    let mut thresholds = Vec::new();
    for entry in split_entries(raw) {
        let (name, value) = entry?;
        let level = name
            .parse::<RiskLevel>()
            .map_err(|name| WeightConfigError::UnknownLevel { name })?;
        thresholds.push(LevelThreshold::new(level, parse_number(name, value)?));
    }
    Ok(thresholds)
}

/// Invalid static risk configuration. Fatal at start-up.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightConfigError {
    #[error("at least one factor weight must be configured")]
    EmptyWeights,
    #[error("weight for {factor} must not be negative (got {weight})")]
    NegativeWeight { factor: RiskFactor, weight: f64 },
    #[error("weight for {factor} must be a finite number")]
    NonFiniteWeight { factor: RiskFactor },
    #[error("at least one factor weight must be greater than zero")]
    NoPositiveWeight,
    #[error("factor weights must sum to a finite number")]
    TotalWeightNotFinite,
    #[error("at least one level threshold must be configured")]
    EmptyThresholds,
    #[error("lowest level threshold must be 0.0 (got {bound})")]
    FirstThresholdNotZero { bound: f64 },
    #[error("level thresholds must be strictly increasing ({previous} then {next})")]
    ThresholdsNotIncreasing { previous: f64, next: f64 },
    #[error("level threshold {bound} lies outside 0.0..=1.0")]
    ThresholdOutOfRange { bound: f64 },
    #[error("level {level} appears more than once")]
    DuplicateLevel { level: RiskLevel },
    #[error("expected name=value, got '{entry}'")]
    MalformedEntry { entry: String },
    #[error("unknown risk factor '{name}'")]
    UnknownFactor { name: String },
    #[error("unknown risk level '{name}'")]
    UnknownLevel { name: String },
    #[error("'{entry}' does not hold a number")]
    InvalidNumber { entry: String },
}
