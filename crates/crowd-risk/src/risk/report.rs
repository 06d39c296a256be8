use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{RiskFactor, RiskLevel};
use super::repository::{AssessmentId, AssessmentRecord};

/// Dashboard row for a reporting factor.
#[derive(Debug, Clone, Serialize)]
pub struct FactorView {
    pub factor: RiskFactor,
    pub label: &'static str,
    pub score: f64,
    pub weight: f64,
    pub contribution: f64,
    /// Share of the overall score, `0.0..=1.0`.
    pub share: f64,
    pub rationale: String,
}

/// External representation of a stored assessment. Numbers are rounded for display.
#[derive(Debug, Clone, Serialize)]
pub struct RiskReportView {
    pub assessment_id: AssessmentId,
    pub created_at: DateTime<Utc>,
    pub location: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub event_name: String,
    pub overall_score: f64,
    pub level: RiskLevel,
    pub alert_label: &'static str,
    pub confidence: f64,
    pub factors: Vec<FactorView>,
    pub recommendations: Vec<String>,
    pub immediate_actions: Vec<String>,
    pub missing_factors: Vec<RiskFactor>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_analyzers: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored_factors: Vec<String>,
}

/// Renders stored assessments without touching the underlying values.
#[derive(Debug, Clone, Copy)]
pub struct ReportFormatter {
    decimals: i32,
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self { decimals: 2 }
    }
}

impl ReportFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decimals(decimals: u8) -> Self {
        Self {
            decimals: i32::from(decimals),
        }
    }

    fn round(&self, value: f64) -> f64 {
        let scale = 10f64.powi(self.decimals);
        (value * scale).round() / scale
    }

    pub fn view(&self, record: &AssessmentRecord) -> RiskReportView {
        let result = &record.result;
        let factors = result
            .contributions
            .iter()
            .map(|(factor, contribution)| FactorView {
                factor: *factor,
                label: factor.label(),
                score: self.round(contribution.score),
                weight: self.round(contribution.weight),
                contribution: self.round(contribution.weighted_contribution),
                share: self.round(result.contribution_share(*factor)),
                rationale: contribution.rationale.clone(),
            })
            .collect();

        RiskReportView {
            assessment_id: record.id.clone(),
            created_at: record.created_at,
            location: record.context.location.clone(),
            event_name: record.context.event_name.clone(),
            overall_score: self.round(result.overall_score),
            level: result.level,
            alert_label: result.level.alert_label(),
            confidence: self.round(result.confidence),
            factors,
            recommendations: record.recommendations.clone(),
            immediate_actions: record.immediate_actions.clone(),
            missing_factors: record.missing_factors.clone(),
            skipped_analyzers: record.skipped_analyzers.clone(),
            ignored_factors: record.ignored_factors.clone(),
        }
    }

    /// Human-readable block for terminals and chat replies.
    pub fn text(&self, record: &AssessmentRecord) -> String {
        self.view(record).to_string()
    }
}

impl fmt::Display for RiskReportView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stampede risk report {}", self.assessment_id.0)?;
        if self.event_name.is_empty() {
            writeln!(f, "Location: {}", self.location)?;
        } else {
            writeln!(f, "Location: {} ({})", self.location, self.event_name)?;
        }
        writeln!(f, "Generated: {}", self.created_at.format("%Y-%m-%d %H:%M:%S UTC"))?;

        writeln!(f, "\nOverall assessment")?;
        writeln!(f, "- Risk score: {:.2} / 1.00", self.overall_score)?;
        writeln!(f, "- Risk level: {} ({})", self.level, self.alert_label)?;
        writeln!(f, "- Confidence: {:.0}%", self.confidence * 100.0)?;

        writeln!(f, "\nRisk factors")?;
        for factor in &self.factors {
            writeln!(
                f,
                "- {}: {:.2} x {:.2} -> {:.2} ({:.0}% of score) | {}",
                factor.label,
                factor.score,
                factor.weight,
                factor.contribution,
                factor.share * 100.0,
                factor.rationale
            )?;
        }
        if !self.missing_factors.is_empty() {
            let missing: Vec<&str> = self
                .missing_factors
                .iter()
                .map(|factor| factor.label())
                .collect();
            writeln!(f, "- Not reported: {}", missing.join(", "))?;
        }

        writeln!(f, "\nRecommendations")?;
        for (index, recommendation) in self.recommendations.iter().enumerate() {
            writeln!(f, "{}. {}", index + 1, recommendation)?;
        }

        if self.immediate_actions.is_empty() {
            writeln!(f, "\nImmediate actions: none")?;
        } else {
            writeln!(f, "\nImmediate actions")?;
            for (index, action) in self.immediate_actions.iter().enumerate() {
                writeln!(f, "{}. {}", index + 1, action)?;
            }
        }

        if !self.ignored_factors.is_empty() {
            writeln!(f, "\nIgnored factor names: {}", self.ignored_factors.join(", "))?;
        }

        Ok(())
    }
}
