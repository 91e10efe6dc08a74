//! Position updates from the MQTT broker.
//!
//! Every publish on the subscribed topic is decoded into a position update
//! and handed to the [`Dispatcher`]. Payloads that cannot be decoded are
//! logged, counted and dropped; they never stop the feed.

use std::{error::Error, fmt, time::Duration};

use ingestion::{
    dispatcher::Dispatcher,
    store::{BufferStore, TripStore},
    IngestionResult, Outcome,
};
use log::{debug, error, info, warn};
use model::message::decode;
use rumqttc::{
    AsyncClient, ClientError, ConnAck, ConnectReturnCode, ConnectionError, Event, EventLoop,
    MqttOptions, Packet, QoS,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use utility::env::{parse_or, var_or, EnvError};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const RETRY_DELAY: Duration = Duration::from_secs(1);
const REQUEST_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    pub broker: String,
    pub port: u16,
    pub client_id: String,
    pub topic: String,
    pub keep_alive_secs: u64,
    /// MQTT quality of service, 0 to 2.
    pub qos: u8,
}

impl FeedConfig {
    pub fn from_lookup<L>(lookup: &L) -> Result<Self, EnvError>
    where
        L: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            broker: var_or(lookup, "MQTT_BROKER", "localhost"),
            port: parse_or(lookup, "MQTT_PORT", 1883)?,
            client_id: var_or(lookup, "MQTT_CLIENT_ID", "rust_data_ingestion_client"),
            topic: var_or(lookup, "MQTT_TOPIC", "drivers_location/#"),
            keep_alive_secs: parse_or(lookup, "MQTT_KEEP_ALIVE_SECS", 5)?,
            qos: parse_or(lookup, "MQTT_QOS", 1)?,
        })
    }

    pub fn quality_of_service(&self) -> Option<QoS> {
        match self.qos {
            0 => Some(QoS::AtMostOnce),
            1 => Some(QoS::AtLeastOnce),
            2 => Some(QoS::ExactlyOnce),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum FeedError {
    Client(ClientError),
    Connection(ConnectionError),
    /// No answer from the broker within the given time.
    Timeout(Duration),
    Refused(ConnectReturnCode),
    InvalidQos(u8),
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Client(why) => write!(f, "MQTT client error: {}", why),
            Self::Connection(why) => write!(f, "MQTT connection error: {}", why),
            Self::Timeout(after) => {
                write!(f, "MQTT broker did not answer within {:?}", after)
            }
            Self::Refused(code) => write!(f, "MQTT broker refused connection: {:?}", code),
            Self::InvalidQos(qos) => write!(f, "invalid MQTT QoS {}", qos),
        }
    }
}

impl Error for FeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Client(why) => Some(why),
            Self::Connection(why) => Some(why),
            _ => None,
        }
    }
}

impl From<ClientError> for FeedError {
    fn from(why: ClientError) -> Self {
        Self::Client(why)
    }
}

impl From<ConnectionError> for FeedError {
    fn from(why: ConnectionError) -> Self {
        Self::Connection(why)
    }
}

pub struct Feed {
    client: AsyncClient,
    eventloop: EventLoop,
    topic: String,
    qos: QoS,
}

async fn wait_for_connack(eventloop: &mut EventLoop) -> Result<ConnAck, ConnectionError> {
    loop {
        if let Event::Incoming(Packet::ConnAck(connack)) = eventloop.poll().await? {
            return Ok(connack);
        }
    }
}

impl Feed {
    /// Connects to the broker and subscribes to the configured topic.
    pub async fn connect(config: &FeedConfig) -> Result<Self, FeedError> {
        let qos = config
            .quality_of_service()
            .ok_or(FeedError::InvalidQos(config.qos))?;
        let mut options =
            MqttOptions::new(config.client_id.as_str(), config.broker.as_str(), config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));
        let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);

        let connack = tokio::time::timeout(CONNECT_TIMEOUT, wait_for_connack(&mut eventloop))
            .await
            .map_err(|_| FeedError::Timeout(CONNECT_TIMEOUT))??;
        if connack.code != ConnectReturnCode::Success {
            return Err(FeedError::Refused(connack.code));
        }

        client.subscribe(config.topic.as_str(), qos).await?;
        info!(
            "Connected to MQTT broker {}:{}, subscribed to {}.",
            config.broker, config.port, config.topic
        );

        Ok(Self {
            client,
            eventloop,
            topic: config.topic.clone(),
            qos,
        })
    }

    /// Feeds received updates to `dispatcher` until `shutdown` is cancelled.
    /// Connection errors are logged and polling resumes after a short pause.
    pub async fn run<B, T>(mut self, dispatcher: Dispatcher<B, T>, shutdown: CancellationToken)
    where
        B: BufferStore,
        T: TripStore,
    {
        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => break,
                event = self.eventloop.poll() => event,
            };
            match event {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    accept(&dispatcher, &publish.topic, &publish.payload);
                }
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!("Reconnected to MQTT broker, subscribing to {} again.", self.topic);
                    if let Err(why) = self.client.try_subscribe(self.topic.as_str(), self.qos) {
                        error!("Could not subscribe to {}: {}", self.topic, why);
                    }
                }
                Ok(_) => {}
                Err(why) => {
                    error!("MQTT connection error: {}. Polling again in {:?}.", why, RETRY_DELAY);
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(RETRY_DELAY) => {}
                    }
                }
            }
        }

        info!("Message feed stopped.");
        if let Err(why) = self.client.try_disconnect() {
            debug!("Could not disconnect from MQTT broker: {}", why);
        }
    }
}

/// Decodes one payload and dispatches it. Returns `None` if the payload was
/// rejected.
pub fn accept<B, T>(
    dispatcher: &Dispatcher<B, T>,
    topic: &str,
    payload: &[u8],
) -> Option<JoinHandle<IngestionResult<Outcome>>>
where
    B: BufferStore,
    T: TripStore,
{
    match decode(payload) {
        Ok(update) => {
            debug!("Received {} update for {} on {}.", update.lifecycle, update.key, topic);
            Some(dispatcher.dispatch(update))
        }
        Err(why) => {
            dispatcher.metrics().message_rejected();
            warn!("Dropping message on {}: {}", topic, why);
            None
        }
    }
}
