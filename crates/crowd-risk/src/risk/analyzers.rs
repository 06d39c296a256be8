//! Heuristic analyzers that turn an [`EventContext`] into partial assessments.
//!
//! Each analyzer scores a single factor. Analyzers that depend on an optional
//! signal return [`AnalyzerError::MissingSignal`] when it is absent so callers
//! can aggregate whatever subset did report.

use chrono::{Datelike, Weekday};

use super::domain::{
    CrowdSentiment, EventContext, EventKind, PartialAssessment, RiskFactor, VenueSetting,
};

/// Produces a partial assessment for one factor from an event context.
pub trait RiskAnalyzer: Send + Sync {
    fn factor(&self) -> RiskFactor;
    fn assess(&self, context: &EventContext) -> Result<PartialAssessment, AnalyzerError>;
}

/// Analyzer failure. Never fatal for an assessment as a whole.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalyzerError {
    #[error("{factor} analyzer needs {signal}")]
    MissingSignal {
        factor: RiskFactor,
        signal: &'static str,
    },
    #[error("{factor} analyzer unavailable: {reason}")]
    Unavailable { factor: RiskFactor, reason: String },
}

/// One analyzer per factor, in factor order.
pub fn standard_analyzers() -> Vec<Box<dyn RiskAnalyzer>> {
    vec![
        Box::new(HistoricalAnalyzer),
        Box::new(SocialBuzzAnalyzer),
        Box::new(TrafficCelebrityAnalyzer),
        Box::new(EntryGateAnalyzer),
        Box::new(WeatherAnalyzer),
        Box::new(EventIntelligenceAnalyzer),
    ]
}

const DISASTER_VENUES: &[&str] = &[
    "kumbh mela",
    "hajj",
    "hillsborough",
    "indiana state fair",
    "heysel",
    "love parade",
    "itaewon",
    "astroworld",
    "sabarimala",
];

const NOTABLE_VENUES: &[&str] = &[
    "madison square garden",
    "wembley",
    "times square",
    "central park",
    "golden temple",
    "vaishno devi",
    "tirupati",
];

/// Venue history combined with how volatile the kind of gathering tends to be.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoricalAnalyzer;

impl HistoricalAnalyzer {
    fn kind_multiplier(kind: EventKind) -> f64 {
        match kind {
            EventKind::Religious => 0.8,
            EventKind::Festival => 0.75,
            EventKind::Concert => 0.7,
            EventKind::Political => 0.65,
            EventKind::Sports => 0.6,
            EventKind::Celebration => 0.5,
            EventKind::General => 0.4,
        }
    }
}

impl RiskAnalyzer for HistoricalAnalyzer {
    fn factor(&self) -> RiskFactor {
        RiskFactor::Historical
    }

    fn assess(&self, context: &EventContext) -> Result<PartialAssessment, AnalyzerError> {
        let (venue_risk, category) = if context.location_matches(DISASTER_VENUES) {
            (0.9, "venue with recorded crowd disasters")
        } else if context.location_matches(NOTABLE_VENUES) {
            (0.6, "high-traffic landmark venue")
        } else {
            (0.3, "venue without notable incident history")
        };
        let multiplier = Self::kind_multiplier(context.event_kind);

        Ok(PartialAssessment::new(
            self.factor(),
            venue_risk * multiplier,
            format!(
                "{category}; {:?} gatherings weighted {multiplier:.2}",
                context.event_kind
            ),
        ))
    }
}

/// Online attention, sentiment and urgency around the event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SocialBuzzAnalyzer;

impl RiskAnalyzer for SocialBuzzAnalyzer {
    fn factor(&self) -> RiskFactor {
        RiskFactor::SocialBuzz
    }

    fn assess(&self, context: &EventContext) -> Result<PartialAssessment, AnalyzerError> {
        let social = context.social.ok_or(AnalyzerError::MissingSignal {
            factor: self.factor(),
            signal: "social media signal",
        })?;
        if !(0.0..=1.0).contains(&social.negative_share) {
            return Err(AnalyzerError::Unavailable {
                factor: self.factor(),
                reason: format!("negative share {} outside 0..=1", social.negative_share),
            });
        }

        let mut score = match social.mentions {
            m if m > 5000 => 0.4,
            m if m > 2000 => 0.3,
            m if m > 1000 => 0.2,
            m if m > 500 => 0.1,
            _ => 0.0,
        };
        if social.negative_share > 0.4 {
            score += 0.2;
        } else if social.negative_share > 0.3 {
            score += 0.1;
        }
        if social.viral {
            score += 0.3;
        }
        score += match social.urgency_keywords {
            0 => 0.0,
            1 | 2 => 0.1,
            _ => 0.2,
        };

        Ok(PartialAssessment::new(
            self.factor(),
            score,
            format!(
                "{} mentions, {:.0}% negative{}",
                social.mentions,
                social.negative_share * 100.0,
                if social.viral { ", content trending" } else { "" }
            ),
        ))
    }
}

/// Approach-road congestion and VIP arrivals.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrafficCelebrityAnalyzer;

impl RiskAnalyzer for TrafficCelebrityAnalyzer {
    fn factor(&self) -> RiskFactor {
        RiskFactor::TrafficCelebrity
    }

    fn assess(&self, context: &EventContext) -> Result<PartialAssessment, AnalyzerError> {
        let mut notes = Vec::new();
        let mut score = if context.location_matches(&["stadium", "arena", "center", "square"]) {
            notes.push("large venue with constrained approach roads");
            0.7
        } else if context.location_matches(&["downtown", "city center", "city centre"]) {
            notes.push("city-centre venue with heavy transit load");
            0.6
        } else {
            notes.push("ordinary approach traffic");
            0.3
        };

        let weekend = context
            .event_date
            .is_some_and(|date| matches!(date.weekday(), Weekday::Sat | Weekday::Sun));
        if weekend {
            score += 0.1;
            notes.push("weekend arrival peak");
        }
        if context.vip_appearance {
            score += 0.2;
            notes.push("VIP appearance announced");
        }

        Ok(PartialAssessment::new(self.factor(), score, notes.join("; ")))
    }
}

/// Gate throughput against the crowd that has to pass through.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryGateAnalyzer;

impl EntryGateAnalyzer {
    /// People per hour one gate processes, by security profile of the venue.
    fn gate_throughput(context: &EventContext) -> u32 {
        if context.location_matches(&["airport", "stadium"]) {
            600
        } else if context.location_matches(&["arena", "theater", "theatre"]) {
            900
        } else if context.location_matches(&["park", "square"]) {
            1200
        } else {
            800
        }
    }
}

impl RiskAnalyzer for EntryGateAnalyzer {
    fn factor(&self) -> RiskFactor {
        RiskFactor::EntryGate
    }

    fn assess(&self, context: &EventContext) -> Result<PartialAssessment, AnalyzerError> {
        let gates = context.gate_count.ok_or(AnalyzerError::MissingSignal {
            factor: self.factor(),
            signal: "gate count",
        })?;
        let demand = context.venue_capacity.unwrap_or(context.expected_attendance);

        if gates == 0 {
            return Ok(PartialAssessment::new(
                self.factor(),
                1.0,
                "no entry gates available",
            ));
        }

        let hourly = f64::from(gates) * f64::from(Self::gate_throughput(context));
        let hours_to_fill = f64::from(demand) / hourly;
        let score = if hours_to_fill > 2.0 {
            0.8
        } else if hours_to_fill > 1.5 {
            0.6
        } else if hours_to_fill > 1.0 {
            0.4
        } else {
            0.2
        };

        Ok(PartialAssessment::new(
            self.factor(),
            score,
            format!("{gates} gate(s) need {hours_to_fill:.1}h to admit {demand} people"),
        ))
    }
}

/// Conditions that push crowds to seek shelter or move erratically.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeatherAnalyzer;

impl RiskAnalyzer for WeatherAnalyzer {
    fn factor(&self) -> RiskFactor {
        RiskFactor::Weather
    }

    fn assess(&self, context: &EventContext) -> Result<PartialAssessment, AnalyzerError> {
        let weather = context.weather.ok_or(AnalyzerError::MissingSignal {
            factor: self.factor(),
            signal: "weather observation",
        })?;
        let readings = [
            weather.temperature_f,
            weather.precipitation_in,
            weather.wind_mph,
            weather.humidity_pct,
        ];
        if readings.iter().any(|reading| !reading.is_finite()) {
            return Err(AnalyzerError::Unavailable {
                factor: self.factor(),
                reason: "weather feed returned a non-numeric reading".to_string(),
            });
        }

        let mut score = 0.0;
        let mut notes = Vec::new();

        if weather.temperature_f > 85.0 {
            score += 0.3;
            if weather.temperature_f > 95.0 {
                score += 0.2;
            }
            notes.push("heat drives crowds into shade");
        } else if weather.temperature_f < 40.0 {
            score += 0.2;
            notes.push("cold drives crowds indoors");
        }
        if weather.precipitation_in > 0.0 {
            score += 0.4;
            if weather.precipitation_in > 0.2 {
                score += 0.3;
            }
            notes.push("rain triggers rushes to cover");
        }
        if weather.wind_mph > 20.0 {
            score += 0.2;
            if weather.wind_mph > 35.0 {
                score += 0.3;
            }
            notes.push("strong wind");
        }
        if weather.humidity_pct > 80.0 {
            score += 0.1;
        }
        if weather.severe_alert {
            score += 0.5;
            notes.push("severe weather alert in force");
        }

        score *= match context.setting {
            VenueSetting::Outdoor => 1.5,
            VenueSetting::Mixed => 1.2,
            VenueSetting::Indoor => 1.0,
        };

        let rationale = if notes.is_empty() {
            "comfortable conditions".to_string()
        } else {
            notes.join("; ")
        };
        Ok(PartialAssessment::new(self.factor(), score, rationale))
    }
}

/// Reports from the ground while the event is running.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventIntelligenceAnalyzer;

impl RiskAnalyzer for EventIntelligenceAnalyzer {
    fn factor(&self) -> RiskFactor {
        RiskFactor::EventIntelligence
    }

    fn assess(&self, context: &EventContext) -> Result<PartialAssessment, AnalyzerError> {
        let live = context.live.ok_or(AnalyzerError::MissingSignal {
            factor: self.factor(),
            signal: "live event feed",
        })?;

        let mut score = 0.0;
        let mut notes = Vec::new();

        match live.crowd_sentiment {
            CrowdSentiment::Agitated => {
                score += 0.4;
                notes.push("agitated crowd".to_string());
            }
            CrowdSentiment::Concerned => {
                score += 0.2;
                notes.push("concerned crowd".to_string());
            }
            CrowdSentiment::Calm => {}
        }

        if let Some(observed) = live.observed_attendance {
            if context.expected_attendance > 0 {
                let variance = (f64::from(observed) / f64::from(context.expected_attendance)) - 1.0;
                if variance > 0.25 {
                    score += 0.3;
                } else if variance > 0.15 {
                    score += 0.15;
                }
                if variance > 0.15 {
                    notes.push(format!("attendance {:.0}% over plan", variance * 100.0));
                }
            }
        }

        if live.security_incidents > 2 {
            score += 0.25;
        } else if live.security_incidents > 0 {
            score += 0.1;
        }
        if live.security_incidents > 0 {
            notes.push(format!("{} security incident(s)", live.security_incidents));
        }

        if live.unexpected_developments {
            score += 0.15;
            notes.push("unexpected developments on site".to_string());
        }

        let rationale = if notes.is_empty() {
            "no live concerns reported".to_string()
        } else {
            notes.join("; ")
        };
        Ok(PartialAssessment::new(self.factor(), score, rationale))
    }
}
