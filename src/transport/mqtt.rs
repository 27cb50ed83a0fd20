use crate::{config::Mqtt, error::AppError};
use async_trait::async_trait;
use rumqttc::{AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use std::time::Duration;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, info, trace, warn};

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, topic: String, payload: Vec<u8>) -> Result<(), AppError>;
    /// Releases the broker connection.
    async fn disconnect(&self) -> Result<(), AppError>;
}

pub fn qos_from_level(level: u8) -> QoS {
    match level {
        0 => QoS::AtMostOnce,
        1 => QoS::AtLeastOnce,
        _ => QoS::ExactlyOnce,
    }
}

pub struct BrokerPublisher {
    client: AsyncClient,
    qos: QoS,
    publish_timeout: Duration,
    event_loop: Mutex<Option<JoinHandle<()>>>,
}

impl BrokerPublisher {
    /// Connects and waits for the broker's CONNACK. Fails when the broker refuses or does not
    /// answer within the connect timeout.
    pub async fn connect(cfg: &Mqtt) -> Result<Self, AppError> {
        let mut mqttoptions = MqttOptions::new(cfg.client_id.clone(), cfg.host.clone(), cfg.port);
        mqttoptions.set_keep_alive(Duration::from_secs(cfg.keep_alive_secs));

        let (client, mut event_loop) = AsyncClient::new(mqttoptions, 10);

        let connect_timeout = Duration::from_secs(cfg.connect_timeout_secs);
        tokio::time::timeout(connect_timeout, wait_for_connack(&mut event_loop)).await.map_err(|_| {
            AppError::Timeout(format!("no CONNACK from {}:{} within {:?}", cfg.host, cfg.port, connect_timeout))
        })??;
        info!(host = %cfg.host, port = cfg.port, "Connected to MQTT broker");

        let handle = tokio::spawn(drive_event_loop(event_loop));
        Ok(Self {
            client,
            qos: qos_from_level(cfg.qos),
            publish_timeout: Duration::from_secs(cfg.publish_timeout_secs),
            event_loop: Mutex::new(Some(handle)),
        })
    }
}

async fn wait_for_connack(event_loop: &mut EventLoop) -> Result<(), AppError> {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) if ack.code == ConnectReturnCode::Success => return Ok(()),
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                return Err(AppError::Mqtt(format!("connection refused: {:?}", ack.code)));
            }
            Ok(event) => trace!(?event, "MQTT event before CONNACK"),
            Err(e) => return Err(AppError::Mqtt(e.to_string())),
        }
    }
}

// rumqttc only moves packets while the event loop is polled. No reconnect on error.
async fn drive_event_loop(mut event_loop: EventLoop) {
    loop {
        match event_loop.poll().await {
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                debug!("DISCONNECT sent, event loop done.");
                break;
            }
            Ok(event) => trace!(?event, "MQTT event"),
            Err(e) => {
                warn!(error = %e, "MQTT connection lost.");
                break;
            }
        }
    }
}

#[async_trait]
impl Publisher for BrokerPublisher {
    async fn publish(&self, topic: String, payload: Vec<u8>) -> Result<(), AppError> {
        let request = self.client.publish(topic.clone(), self.qos, false, payload);
        tokio::time::timeout(self.publish_timeout, request)
            .await
            .map_err(|_| AppError::Timeout(format!("publish to {}", topic)))??;
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), AppError> {
        self.client.disconnect().await?;
        if let Some(handle) = self.event_loop.lock().await.take() {
            if tokio::time::timeout(self.publish_timeout, handle).await.is_err() {
                warn!("MQTT event loop did not finish after DISCONNECT.");
            }
        }
        info!("Disconnected from MQTT broker");
        Ok(())
    }
}
