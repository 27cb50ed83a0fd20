use crate::{config::Api, error::AppError, sensors::ds::ApiReading, utils::truncate};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Response bodies quoted in errors are cut to this many characters.
pub const MAX_BODY_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub field_id: String,
    pub crop_type: String,
    pub question: String,
}

impl DecisionRequest {
    pub fn new(field_id: &str, crop_type: &str, question: &str) -> Self {
        Self { field_id: field_id.to_owned(), crop_type: crop_type.to_owned(), question: question.to_owned() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResponse {
    #[serde(default = "no_recommendation")]
    pub recommendation: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub actions: Option<Vec<String>>,
    #[serde(default)]
    pub sources: Option<Vec<String>>,
}

fn no_recommendation() -> String {
    "No recommendation".to_owned()
}

/// The REST side of the platform. Every call is a single attempt.
#[async_trait]
pub trait SensorApi: Send + Sync {
    async fn health(&self) -> Result<(), AppError>;
    async fn post_reading(&self, reading: ApiReading) -> Result<(), AppError>;
    async fn ask_decision(&self, request: DecisionRequest) -> Result<DecisionResponse, AppError>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    cfg: Api,
}

impl ApiClient {
    pub fn new(cfg: Api) -> Result<Self, AppError> {
        let client = Client::builder().build()?;
        Ok(Self { client, cfg })
    }

    pub fn base_url(&self) -> String {
        self.cfg.base_url()
    }
}

async fn expect_status(response: Response, accepted: &[StatusCode]) -> Result<Response, AppError> {
    let status = response.status();
    if accepted.contains(&status) {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::Status { status: status.as_u16(), body: truncate(&body, MAX_BODY_CHARS) })
}

#[async_trait]
impl SensorApi for ApiClient {
    async fn health(&self) -> Result<(), AppError> {
        let url = self.cfg.health_url();
        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(self.cfg.health_timeout_secs))
            .send()
            .await?;
        expect_status(response, &[StatusCode::OK]).await?;
        debug!(url = %url, "Health check passed.");
        Ok(())
    }

    async fn post_reading(&self, reading: ApiReading) -> Result<(), AppError> {
        let url = format!("{}/sensors/data", self.cfg.base_url());
        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(self.cfg.post_timeout_secs))
            .json(&reading)
            .send()
            .await?;
        expect_status(response, &[StatusCode::OK, StatusCode::CREATED]).await?;
        Ok(())
    }

    async fn ask_decision(&self, request: DecisionRequest) -> Result<DecisionResponse, AppError> {
        let url = format!("{}/decision", self.cfg.base_url());
        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(self.cfg.decision_timeout_secs))
            .json(&request)
            .send()
            .await?;
        let response = expect_status(response, &[StatusCode::OK]).await?;
        Ok(response.json::<DecisionResponse>().await?)
    }
}
