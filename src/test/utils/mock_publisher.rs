use crate::{error::AppError, transport::mqtt::Publisher};
use async_trait::async_trait;
use mockall::mock;
use tracing::trace;

mock! {
    pub Publisher {}

    #[async_trait]
    impl Publisher for Publisher {
        async fn publish(&self, topic: String, payload: Vec<u8>) -> Result<(), AppError>;
        async fn disconnect(&self) -> Result<(), AppError>;
    }
}

/// Accepts exactly `publishes` messages and expects a single disconnect.
pub fn set_publisher(publishes: usize) -> MockPublisher {
    let mut publisher = MockPublisher::new();
    publisher.expect_publish().times(publishes).returning(|topic, payload| {
        trace!(topic = %topic, bytes = payload.len(), "Mocked publish");
        Ok(())
    });
    publisher.expect_disconnect().times(1).returning(|| Ok(()));
    publisher
}
