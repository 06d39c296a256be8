use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Independent dimension of stampede risk reported by an analyzer.
///
/// Declaration order is the fixed tie-break order used when ranking factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    Historical,
    SocialBuzz,
    TrafficCelebrity,
    EntryGate,
    Weather,
    EventIntelligence,
}

impl RiskFactor {
    pub const ALL: [RiskFactor; 6] = [
        RiskFactor::Historical,
        RiskFactor::SocialBuzz,
        RiskFactor::TrafficCelebrity,
        RiskFactor::EntryGate,
        RiskFactor::Weather,
        RiskFactor::EventIntelligence,
    ];

    /// Wire identifier, matching the serde representation.
    pub fn key(&self) -> &'static str {
        match self {
            RiskFactor::Historical => "historical",
            RiskFactor::SocialBuzz => "social_buzz",
            RiskFactor::TrafficCelebrity => "traffic_celebrity",
            RiskFactor::EntryGate => "entry_gate",
            RiskFactor::Weather => "weather",
            RiskFactor::EventIntelligence => "event_intelligence",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskFactor::Historical => "Historical incidents",
            RiskFactor::SocialBuzz => "Social media buzz",
            RiskFactor::TrafficCelebrity => "Traffic & VIP movement",
            RiskFactor::EntryGate => "Entry gate congestion",
            RiskFactor::Weather => "Weather impact",
            RiskFactor::EventIntelligence => "Live event intelligence",
        }
    }
}

impl fmt::Display for RiskFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for RiskFactor {
    type Err = UnknownFactor;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(&['-', ' '][..], "_");
        RiskFactor::ALL
            .into_iter()
            .find(|factor| factor.key() == normalized)
            .ok_or_else(|| UnknownFactor(value.trim().to_string()))
    }
}

/// Raised when a factor identifier is outside the enumerated set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown risk factor '{0}'")]
pub struct UnknownFactor(pub String);

/// Discrete risk category derived from binning the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Minimal,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 5] = [
        RiskLevel::Minimal,
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Minimal => "MINIMAL",
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }

    /// Operator-facing alert status shown next to the level.
    pub fn alert_label(&self) -> &'static str {
        match self {
            RiskLevel::Minimal => "NORMAL",
            RiskLevel::Low => "LOW ALERT",
            RiskLevel::Medium => "MODERATE ALERT",
            RiskLevel::High => "HIGH ALERT",
            RiskLevel::Critical => "IMMEDIATE ACTION REQUIRED",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        RiskLevel::ALL
            .into_iter()
            .find(|level| level.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| trimmed.to_string())
    }
}

/// One factor's score plus rationale, produced by an analyzer.
///
/// Scores are clamped into `[0.0, 1.0]` on construction. A NaN score is kept
/// as-is so the aggregator can treat it as "not reported".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartialAssessment {
    factor: RiskFactor,
    score: f64,
    rationale: String,
}

impl PartialAssessment {
    pub fn new(factor: RiskFactor, score: f64, rationale: impl Into<String>) -> Self {
        Self {
            factor,
            score: score.clamp(0.0, 1.0),
            rationale: rationale.into(),
        }
    }

    pub fn factor(&self) -> RiskFactor {
        self.factor
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn rationale(&self) -> &str {
        &self.rationale
    }
}

/// Assessment as submitted by an external caller, before the factor name is recognised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportedAssessment {
    pub factor: String,
    pub score: f64,
    #[serde(default)]
    pub rationale: String,
}

impl ReportedAssessment {
    pub fn recognize(&self) -> Result<PartialAssessment, UnknownFactor> {
        let factor = self.factor.parse::<RiskFactor>()?;
        Ok(PartialAssessment::new(factor, self.score, self.rationale.clone()))
    }
}

/// Category of gathering, used by the historical analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Religious,
    Concert,
    Sports,
    Festival,
    Political,
    Celebration,
    #[default]
    General,
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "religious" => Ok(Self::Religious),
            "concert" => Ok(Self::Concert),
            "sports" | "sport" => Ok(Self::Sports),
            "festival" => Ok(Self::Festival),
            "political" | "rally" => Ok(Self::Political),
            "celebration" => Ok(Self::Celebration),
            "general" => Ok(Self::General),
            other => Err(format!("unknown event kind '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VenueSetting {
    Indoor,
    #[default]
    Outdoor,
    Mixed,
}

impl FromStr for VenueSetting {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "indoor" => Ok(Self::Indoor),
            "outdoor" => Ok(Self::Outdoor),
            "mixed" => Ok(Self::Mixed),
            other => Err(format!("unknown venue setting '{other}'")),
        }
    }
}

/// Social media activity observed around the event.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SocialSignal {
    pub mentions: u32,
    /// Fraction of mentions with negative sentiment, `0.0..=1.0`.
    pub negative_share: f64,
    #[serde(default)]
    pub viral: bool,
    #[serde(default)]
    pub urgency_keywords: u32,
}

/// Current conditions at the venue, imperial units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub temperature_f: f64,
    #[serde(default)]
    pub precipitation_in: f64,
    #[serde(default)]
    pub wind_mph: f64,
    #[serde(default)]
    pub humidity_pct: f64,
    #[serde(default)]
    pub severe_alert: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrowdSentiment {
    #[default]
    Calm,
    Concerned,
    Agitated,
}

/// Live feed from on-site staff or monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LiveSignal {
    #[serde(default)]
    pub crowd_sentiment: CrowdSentiment,
    pub observed_attendance: Option<u32>,
    #[serde(default)]
    pub security_incidents: u32,
    #[serde(default)]
    pub unexpected_developments: bool,
}

/// Everything an analyzer may look at when scoring an event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventContext {
    pub location: String,
    #[serde(default)]
    pub event_name: String,
    #[serde(default)]
    pub event_kind: EventKind,
    #[serde(default)]
    pub setting: VenueSetting,
    #[serde(default)]
    pub expected_attendance: u32,
    #[serde(default)]
    pub venue_capacity: Option<u32>,
    #[serde(default)]
    pub gate_count: Option<u32>,
    #[serde(default)]
    pub event_date: Option<NaiveDate>,
    #[serde(default)]
    pub vip_appearance: bool,
    #[serde(default)]
    pub social: Option<SocialSignal>,
    #[serde(default)]
    pub weather: Option<WeatherObservation>,
    #[serde(default)]
    pub live: Option<LiveSignal>,
}

impl EventContext {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    pub(crate) fn location_matches(&self, terms: &[&str]) -> bool {
        let location = self.location.to_ascii_lowercase();
        terms.iter().any(|term| location.contains(term))
    }
}
