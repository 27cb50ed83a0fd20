use crate::{
    error::AppError,
    sensors::{
        ds::{Field, SensorKind, SensorReading},
        generator::ReadingGenerator,
    },
    time::TimeProvider,
    transport::mqtt::Publisher,
};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SimulationReport {
    pub ticks: u64,
    pub published: u64,
    pub failed: u64,
}

pub async fn publish_reading<P: Publisher + ?Sized>(
    publisher: &P, kind: SensorKind, reading: &SensorReading,
) -> Result<(), AppError> {
    let payload = serde_json::to_vec(reading)?;
    publisher.publish(kind.topic(&reading.location.field_id), payload).await
}

fn log_published(kind: SensorKind, reading: &SensorReading) {
    match kind {
        SensorKind::Soil => info!(
            field_id = %reading.location.field_id,
            moisture = reading.value("soil_moisture").unwrap_or_default(),
            "Sent soil data."
        ),
        SensorKind::Weather => info!(
            field_id = %reading.location.field_id,
            temperature = reading.value("air_temperature").unwrap_or_default(),
            "Sent weather data."
        ),
    }
}

/// Publishes a soil and a weather reading per field every `interval` until `stop_signal` turns true
/// (or its sender goes away) or `max_ticks` ticks are done. The stop flag is checked before every
/// publish. The publisher is disconnected exactly once on the way out.
pub async fn run_simulator<P: Publisher + ?Sized>(
    publisher: &P, generator: &mut ReadingGenerator, fields: &[Field], time_provider: &dyn TimeProvider,
    mut stop_signal: watch::Receiver<bool>, interval: Duration, max_ticks: Option<u64>,
) -> SimulationReport {
    info!(fields = fields.len(), interval_secs = interval.as_secs(), "Simulating sensors.");
    let mut report = SimulationReport::default();

    'ticks: while max_ticks.map_or(true, |max| report.ticks < max) {
        let now = time_provider.now();
        for field in fields {
            for kind in [SensorKind::Soil, SensorKind::Weather] {
                if *stop_signal.borrow() {
                    break 'ticks;
                }
                let reading = generator.reading(kind, field, now);
                match publish_reading(publisher, kind, &reading).await {
                    Ok(()) => {
                        report.published += 1;
                        log_published(kind, &reading);
                    }
                    Err(e) => {
                        report.failed += 1;
                        warn!(field_id = %field.id, %kind, error = %e, "Publish failed.");
                    }
                }
            }
        }
        report.ticks += 1;

        if max_ticks.is_some_and(|max| report.ticks >= max) {
            break;
        }
        tokio::select! {
            biased;
            changed = stop_signal.changed() => {
                if changed.is_err() {
                    debug!("Stop signal sender dropped.");
                    break;
                }
            }
            _ = time_provider.sleep(interval) => {}
        }
    }

    info!(ticks = report.ticks, published = report.published, failed = report.failed, "Stopping simulator.");
    if let Err(e) = publisher.disconnect().await {
        error!(error = %e, "Error while disconnecting.");
    }
    report
}
