use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Pre-flight check failed: {0}")]
    PreFlight(String),
    #[error("MQTT error: {0}")]
    Mqtt(String),
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rumqttc::ClientError> for AppError {
    fn from(e: rumqttc::ClientError) -> Self {
        AppError::Mqtt(e.to_string())
    }
}

impl From<toml::de::Error> for AppError {
    fn from(e: toml::de::Error) -> Self {
        AppError::Config(e.to_string())
    }
}
