use crate::{
    error::AppError,
    sensors::ds::ApiReading,
    transport::api::{DecisionRequest, DecisionResponse, SensorApi},
};
use async_trait::async_trait;
use mockall::mock;
use tracing::trace;

mock! {
    pub SensorApi {}

    #[async_trait]
    impl SensorApi for SensorApi {
        async fn health(&self) -> Result<(), AppError>;
        async fn post_reading(&self, reading: ApiReading) -> Result<(), AppError>;
        async fn ask_decision(&self, request: DecisionRequest) -> Result<DecisionResponse, AppError>;
    }
}

pub fn canned_decision(request: &DecisionRequest) -> DecisionResponse {
    DecisionResponse {
        recommendation: format!("Looks fine for {}.", request.crop_type),
        confidence: 0.75,
        actions: Some(vec!["monitor".to_owned()]),
        sources: None,
    }
}

/// Healthy server accepting everything.
pub fn set_sensor_api0() -> MockSensorApi {
    let mut api = MockSensorApi::new();
    api.expect_health().times(0..).returning(|| Ok(()));
    api.expect_post_reading().times(0..).returning(|reading| {
        trace!(device_id = %reading.device_id, "Mocked post");
        Ok(())
    });
    api.expect_ask_decision().times(0..).returning(|request| Ok(canned_decision(&request)));
    api
}

/// Server failing its health check. Any dispatch fails the test.
pub fn set_sensor_api_down() -> MockSensorApi {
    let mut api = MockSensorApi::new();
    api.expect_health()
        .times(1)
        .returning(|| Err(AppError::Status { status: 503, body: "maintenance".to_owned() }));
    api.expect_post_reading().never();
    api.expect_ask_decision().never();
    api
}
