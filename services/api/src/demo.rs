use crate::infra::{parse_date, parse_reported_factor, InMemoryAssessmentRepository};
use chrono::NaiveDate;
use clap::Args;
use crowd_risk::config::AppConfig;
use crowd_risk::error::AppError;
use crowd_risk::risk::{
    AssessmentRecord, AssessmentRequest, CrowdSentiment, EventContext, EventKind, LiveSignal,
    ReportFormatter, ReportedAssessment, RiskAssessmentService, SocialSignal, VenueSetting,
    WeatherObservation,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// Venue or area name, matched against known high-risk locations
    #[arg(long)]
    pub(crate) location: String,
    /// Optional event title shown in the report
    #[arg(long)]
    pub(crate) event_name: Option<String>,
    /// religious, concert, sports, festival, political, celebration or general
    #[arg(long, default_value = "general")]
    pub(crate) event_kind: EventKind,
    /// indoor, outdoor or mixed
    #[arg(long, default_value = "outdoor")]
    pub(crate) setting: VenueSetting,
    /// Expected number of attendees
    #[arg(long, default_value_t = 0)]
    pub(crate) attendance: u32,
    /// Venue capacity, used instead of attendance for gate throughput
    #[arg(long)]
    pub(crate) capacity: Option<u32>,
    /// Number of entry gates
    #[arg(long)]
    pub(crate) gates: Option<u32>,
    /// Event date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// A VIP appearance has been announced
    #[arg(long)]
    pub(crate) vip: bool,
    /// Externally measured factor score as NAME=SCORE (repeatable)
    #[arg(long, value_parser = parse_reported_factor)]
    pub(crate) factor: Vec<ReportedAssessment>,
    /// Only use --factor scores, skip the built-in analyzers
    #[arg(long)]
    pub(crate) skip_analyzers: bool,
    /// Print the dashboard JSON payload instead of the text report
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print dashboard JSON payloads instead of text reports
    #[arg(long)]
    pub(crate) json: bool,
    /// Skip the insufficient-data walkthrough at the end of the demo
    #[arg(long)]
    pub(crate) skip_refusal: bool,
}

impl AssessArgs {
    fn into_request(self) -> (AssessmentRequest, bool) {
        let AssessArgs {
            location,
            event_name,
            event_kind,
            setting,
            attendance,
            capacity,
            gates,
            date,
            vip,
            factor,
            skip_analyzers,
            json,
        } = self;

        let context = EventContext {
            event_name: event_name.unwrap_or_default(),
            event_kind,
            setting,
            expected_attendance: attendance,
            venue_capacity: capacity,
            gate_count: gates,
            event_date: date,
            vip_appearance: vip,
            ..EventContext::new(location)
        };
        let request = AssessmentRequest {
            context,
            reported: factor,
            skip_analyzers,
        };
        (request, json)
    }
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = RiskAssessmentService::new(
        config.risk.clone(),
        Arc::new(InMemoryAssessmentRepository::default()),
    );

    let (request, json) = args.into_request();
    let record = service.assess(request)?;
    render_record(&record, json);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { json, skip_refusal } = args;
    let config = AppConfig::load()?;
    let service = RiskAssessmentService::new(
        config.risk.clone(),
        Arc::new(InMemoryAssessmentRepository::default()),
    );

    println!("Crowd risk demo");
    println!(
        "Risk model: {} weighted factor(s), {} level threshold(s)",
        config.risk.weights().len(),
        config.risk.thresholds().len()
    );

    for (title, request) in demo_scenarios() {
        println!("\n== {title} ==");
        match service.assess(request) {
            Ok(record) => render_record(&record, json),
            Err(err) => println!("  Assessment refused: {err}"),
        }
    }

    match service.recent(10) {
        Ok(records) => {
            println!("\nDashboard feed (newest first)");
            for record in records {
                println!(
                    "- {} {} -> {} ({:.2})",
                    record.id.0,
                    record.context.location,
                    record.result.level,
                    record.result.overall_score
                );
            }
        }
        Err(err) => println!("\nDashboard feed unavailable: {err}"),
    }

    if skip_refusal {
        return Ok(());
    }

    println!("\n== Unrecognised evidence only ==");
    let request = AssessmentRequest {
        context: EventContext::new("Unknown Venue"),
        reported: vec![ReportedAssessment {
            factor: "astrology".to_string(),
            score: 0.9,
            rationale: "not a risk factor".to_string(),
        }],
        skip_analyzers: true,
    };
    match service.assess(request) {
        Ok(record) => render_record(&record, json),
        Err(err) => println!("  Assessment refused: {err}"),
    }

    Ok(())
}

fn render_record(record: &AssessmentRecord, json: bool) {
    let formatter = ReportFormatter::new();
    if json {
        match serde_json::to_string_pretty(&formatter.view(record)) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("  Dashboard payload unavailable: {err}"),
        }
    } else {
        print!("{}", formatter.text(record));
    }
}

fn demo_scenarios() -> Vec<(&'static str, AssessmentRequest)> {
    let fair = EventContext {
        event_name: "Saturday craft fair".to_string(),
        event_kind: EventKind::General,
        setting: VenueSetting::Outdoor,
        expected_attendance: 1_500,
        gate_count: Some(4),
        weather: Some(WeatherObservation {
            temperature_f: 72.0,
            humidity_pct: 45.0,
            ..WeatherObservation::default()
        }),
        ..EventContext::new("Riverside Community Park")
    };

    let derby = EventContext {
        event_name: "City derby".to_string(),
        event_kind: EventKind::Sports,
        setting: VenueSetting::Mixed,
        expected_attendance: 48_000,
        venue_capacity: Some(52_000),
        gate_count: Some(24),
        event_date: NaiveDate::from_ymd_opt(2025, 4, 12),
        social: Some(SocialSignal {
            mentions: 2_400,
            negative_share: 0.35,
            viral: false,
            urgency_keywords: 1,
        }),
        weather: Some(WeatherObservation {
            temperature_f: 58.0,
            precipitation_in: 0.1,
            wind_mph: 12.0,
            humidity_pct: 70.0,
            severe_alert: false,
        }),
        ..EventContext::new("Metropolitan Stadium")
    };

    let pilgrimage = EventContext {
        event_name: "Basant Panchami bathing day".to_string(),
        event_kind: EventKind::Religious,
        setting: VenueSetting::Outdoor,
        expected_attendance: 300_000,
        gate_count: Some(30),
        event_date: NaiveDate::from_ymd_opt(2025, 2, 2),
        vip_appearance: true,
        social: Some(SocialSignal {
            mentions: 8_200,
            negative_share: 0.42,
            viral: true,
            urgency_keywords: 4,
        }),
        weather: Some(WeatherObservation {
            temperature_f: 97.0,
            humidity_pct: 82.0,
            ..WeatherObservation::default()
        }),
        live: Some(LiveSignal {
            crowd_sentiment: CrowdSentiment::Agitated,
            observed_attendance: Some(390_000),
            security_incidents: 3,
            unexpected_developments: true,
        }),
        ..EventContext::new("Kumbh Mela Sangam Ghat")
    };

    let mut derby_request = AssessmentRequest::new(derby);
    derby_request.reported.push(ReportedAssessment {
        factor: "event_intelligence".to_string(),
        score: 0.45,
        rationale: "stewards report rival fans mixing at the north concourse".to_string(),
    });

    vec![
        ("Community fair", AssessmentRequest::new(fair)),
        ("Stadium derby", derby_request),
        ("Pilgrimage surge", AssessmentRequest::new(pilgrimage)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowd_risk::risk::{RiskLevel, WeightConfig};

    fn service() -> RiskAssessmentService<InMemoryAssessmentRepository> {
        RiskAssessmentService::new(
            Arc::new(WeightConfig::standard()),
            Arc::new(InMemoryAssessmentRepository::default()),
        )
    }

    #[test]
    fn demo_scenarios_escalate_in_order() {
        let service = service();
        let levels: Vec<RiskLevel> = demo_scenarios()
            .into_iter()
            .map(|(_, request)| service.assess(request).expect("scenario assesses").result.level)
            .collect();

        assert_eq!(levels.len(), 3);
        assert!(levels[0] < levels[1], "{levels:?}");
        assert!(levels[1] < levels[2], "{levels:?}");
        assert!(levels[2] >= RiskLevel::High, "{levels:?}");
    }

    #[test]
    fn assess_args_build_request() {
        let args = AssessArgs {
            location: "Wembley Stadium".to_string(),
            event_name: None,
            event_kind: EventKind::Concert,
            setting: VenueSetting::Indoor,
            attendance: 90_000,
            capacity: None,
            gates: Some(20),
            date: None,
            vip: true,
            factor: vec![ReportedAssessment {
                factor: "weather".to_string(),
                score: 0.1,
                rationale: String::new(),
            }],
            skip_analyzers: false,
            json: true,
        };

        let (request, json) = args.into_request();

        assert!(json);
        assert_eq!(request.context.location, "Wembley Stadium");
        assert_eq!(request.context.gate_count, Some(20));
        assert!(request.context.vip_appearance);
        assert_eq!(request.reported.len(), 1);

        let record = service().assess(request).expect("assessment");
        assert!(record.skipped_analyzers.len() <= 2);
    }
}
