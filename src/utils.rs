use crate::time::TimeProvider;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use std::sync::Arc;
use tracing_subscriber::{
    fmt::{format::Writer, time::FormatTime},
    EnvFilter,
};

/// Stamps log lines with the time of the injected provider, so simulated runs log simulated time.
pub struct ProviderTime<T: TimeProvider> {
    pub time_provider: Arc<T>,
}

impl<T: TimeProvider> FormatTime for ProviderTime<T> {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", iso_timestamp(self.time_provider.now()))
    }
}

/// Installs the global subscriber. Filter comes from `RUST_LOG`, defaulting to `info`.
/// Calling it again is a no-op.
pub fn start_log<T: TimeProvider + 'static>(time_provider: Option<Arc<T>>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let _ = match time_provider {
        Some(time_provider) => builder.with_timer(ProviderTime { time_provider }).try_init(),
        None => builder.try_init(),
    };
}

pub fn ts_to_datetime(ts: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(ts, 0).single().unwrap_or_default()
}

/// ISO-8601 in UTC with a `Z` suffix, e.g. `2024-11-29T17:00:00Z`.
pub fn iso_timestamp(ts: i64) -> String {
    ts_to_datetime(ts).to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
