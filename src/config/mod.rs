pub mod run_options;

use crate::{error::AppError, sensors::ds::Field, transport::api::DecisionRequest};
use run_options::Args;
use serde::Deserialize;
use std::{fs, time::Duration};
use tracing::warn;

pub const CONFIG_FILE: &str = "./agrisim.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Api {
    pub server_url: String,
    pub api_prefix: String,
    pub health_timeout_secs: u64,
    pub post_timeout_secs: u64,
    pub decision_timeout_secs: u64,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8081".to_owned(),
            api_prefix: "/api/v1".to_owned(),
            health_timeout_secs: 2,
            post_timeout_secs: 5,
            decision_timeout_secs: 30,
        }
    }
}

impl Api {
    pub fn base_url(&self) -> String {
        format!("{}{}", self.server_url.trim_end_matches('/'), self.api_prefix)
    }

    pub fn health_url(&self) -> String {
        format!("{}/health", self.server_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Mqtt {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub keep_alive_secs: u64,
    pub connect_timeout_secs: u64,
    pub publish_timeout_secs: u64,
    pub qos: u8,
}

impl Default for Mqtt {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 1883,
            client_id: "sensor_simulator".to_owned(),
            keep_alive_secs: 60,
            connect_timeout_secs: 10,
            publish_timeout_secs: 5,
            qos: 0,
        }
    }
}

#[derive(Copy, Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Backfill {
    pub days: u32,
    pub step_hours: u32,
}

impl Default for Backfill {
    fn default() -> Self {
        Self { days: 7, step_hours: 3 }
    }
}

#[derive(Copy, Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Simulation {
    pub interval_secs: u64,
    pub seed: Option<u64>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self { interval_secs: 10, seed: None }
    }
}

impl Simulation {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

pub fn default_fields() -> Vec<Field> {
    vec![
        Field::new("field_001", "potato", 40.7128, -74.0060),
        Field::new("field_002", "tomato", 40.7580, -73.9855),
        Field::new("field_003", "corn", 40.7489, -73.9680),
    ]
}

pub fn default_decisions() -> Vec<DecisionRequest> {
    vec![
        DecisionRequest::new("field_001", "potato", "Should I irrigate my potato field? Current moisture seems low."),
        DecisionRequest::new("field_002", "tomato", "What fertilizer should I apply to my tomato plants?"),
        DecisionRequest::new("field_003", "corn", "Is the temperature suitable for corn growth right now?"),
    ]
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: Api,
    pub mqtt: Mqtt,
    pub backfill: Backfill,
    pub simulation: Simulation,
    pub fields: Vec<Field>,
    pub decisions: Vec<DecisionRequest>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: Api::default(),
            mqtt: Mqtt::default(),
            backfill: Backfill::default(),
            simulation: Simulation::default(),
            fields: default_fields(),
            decisions: default_decisions(),
        }
    }
}

impl Config {
    /// Reads the config named by `args` (defaults when the file is missing) and applies the
    /// command line overrides.
    pub fn load(args: &Args) -> Result<Self, AppError> {
        let mut config = match &args.cfg_str {
            Some(cfg_str) => Self::load_from_str(cfg_str)?,
            None if args.cfg_file.exists() => Self::load_from_str(&fs::read_to_string(&args.cfg_file)?)?,
            None => {
                warn!(path = %args.cfg_file.display(), "Config file not found. Proceeding with defaults.");
                Self::default()
            }
        };
        if args.seed.is_some() {
            config.simulation.seed = args.seed;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_str(config_str: &str) -> Result<Self, AppError> {
        Ok(toml::from_str(config_str)?)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.fields.is_empty() {
            return Err(AppError::Config("at least one field is required".to_owned()));
        }
        if !(1..=24).contains(&self.backfill.step_hours) {
            let msg = format!("backfill.step_hours must be 1..=24, got {}", self.backfill.step_hours);
            return Err(AppError::Config(msg));
        }
        if self.simulation.interval_secs == 0 {
            return Err(AppError::Config("simulation.interval_secs must be positive".to_owned()));
        }
        if self.mqtt.qos > 2 {
            return Err(AppError::Config(format!("mqtt.qos must be 0, 1 or 2, got {}", self.mqtt.qos)));
        }
        Ok(())
    }
}
