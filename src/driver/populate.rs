use crate::{
    config::{Backfill, Config},
    error::AppError,
    sensors::{
        ds::{Field, Trend},
        generator::ReadingGenerator,
    },
    time::TimeProvider,
    transport::api::{DecisionRequest, SensorApi},
    utils::truncate,
};
use tracing::{error, info, warn};

pub const PROGRESS_EVERY: usize = 10;
const RECOMMENDATION_CHARS: usize = 200;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BackfillReport {
    pub attempted: usize,
    pub sent: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PopulationReport {
    pub historical: BackfillReport,
    pub current: usize,
    pub decisions_asked: usize,
    pub decisions_answered: usize,
}

/// Older days are calm, then a dry spell, then heat.
pub fn trend_for_day(days_ago: u32) -> Trend {
    match days_ago {
        5.. => Trend::Normal,
        3..=4 => Trend::Dry,
        _ => Trend::Hot,
    }
}

fn log_send_failure(field_id: &str, e: &AppError) {
    match e {
        AppError::Status { status, body } => warn!(field_id, status, body = %body, "Reading rejected."),
        _ => warn!(field_id, error = %e, "Error sending reading."),
    }
}

/// A failed health check aborts the run before anything is sent.
pub async fn preflight(api: &impl SensorApi) -> Result<(), AppError> {
    api.health().await.map_err(|e| {
        error!(error = %e, "Server not responding. Start the server first.");
        AppError::PreFlight(e.to_string())
    })?;
    info!("Server is running.");
    Ok(())
}

pub async fn populate_historical(
    api: &impl SensorApi, generator: &mut ReadingGenerator, fields: &[Field], cfg: Backfill, now: i64,
) -> BackfillReport {
    info!(days = cfg.days, step_hours = cfg.step_hours, "Generating historical sensor data.");
    let mut report = BackfillReport::default();

    for days_ago in (1..=cfg.days).rev() {
        let trend = trend_for_day(days_ago);
        for hour in (0..24).step_by(cfg.step_hours as usize) {
            let timestamp = now - i64::from(days_ago) * 86_400 - i64::from(hour) * 3600;
            for field in fields {
                let reading = generator.api_reading(field, timestamp, trend);
                report.attempted += 1;
                match api.post_reading(reading).await {
                    Ok(()) => {
                        report.sent += 1;
                        if report.sent % PROGRESS_EVERY == 0 {
                            info!(count = report.sent, "Sent readings...");
                        }
                    }
                    Err(e) => log_send_failure(&field.id, &e),
                }
            }
        }
    }

    info!(sent = report.sent, attempted = report.attempted, "Historical data complete.");
    report
}

pub async fn populate_current(
    api: &impl SensorApi, generator: &mut ReadingGenerator, fields: &[Field], now: i64,
) -> usize {
    info!("Generating current sensor data.");
    let mut count = 0;
    for field in fields {
        let reading = generator.api_reading(field, now, Trend::Normal);
        let (moisture, temperature) = (reading.measurements.soil_moisture, reading.measurements.temperature);
        match api.post_reading(reading).await {
            Ok(()) => {
                count += 1;
                info!(
                    field_id = %field.id,
                    crop = %field.crop,
                    moisture = format!("{:.1}%", moisture),
                    temperature = format!("{:.1}°C", temperature),
                    "Current reading sent."
                );
            }
            Err(e) => log_send_failure(&field.id, &e),
        }
    }
    info!(count, "Current data sent.");
    count
}

/// Returns how many questions got an answer.
pub async fn ask_decisions(api: &impl SensorApi, questions: &[DecisionRequest]) -> usize {
    info!("Testing decision endpoint.");
    let mut answered = 0;
    for (i, question) in questions.iter().enumerate() {
        info!(n = i + 1, field_id = %question.field_id, crop = %question.crop_type, question = %question.question);
        match api.ask_decision(question.clone()).await {
            Ok(resp) => {
                answered += 1;
                info!(
                    recommendation = %truncate(&resp.recommendation, RECOMMENDATION_CHARS),
                    confidence = format!("{:.2}", resp.confidence),
                    actions = resp.actions.map(|a| a.join(", ")).unwrap_or_default(),
                    "Recommendation received."
                );
            }
            Err(AppError::Status { status, body }) => error!(status, body = %body, "Decision request rejected."),
            Err(e) => error!(error = %e, "Failed to get decision."),
        }
    }
    answered
}

/// Pre-flight, then backfill, current readings and the decision round.
pub async fn run_population(
    api: &impl SensorApi, generator: &mut ReadingGenerator, cfg: &Config, time_provider: &dyn TimeProvider,
) -> Result<PopulationReport, AppError> {
    preflight(api).await?;

    let historical = populate_historical(api, generator, &cfg.fields, cfg.backfill, time_provider.now()).await;
    let current = populate_current(api, generator, &cfg.fields, time_provider.now()).await;
    let decisions_answered = ask_decisions(api, &cfg.decisions).await;

    let report =
        PopulationReport { historical, current, decisions_asked: cfg.decisions.len(), decisions_answered };
    info!(
        historical = report.historical.sent,
        current = report.current,
        decisions = format!("{}/{}", report.decisions_answered, report.decisions_asked),
        "Data population complete."
    );
    Ok(report)
}
