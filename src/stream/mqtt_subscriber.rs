//! MQTT Subscriber feeding the forwarder
//!
//! Every publish received on the subscribed topic filters carries one message
//! envelope. Each envelope becomes one batch handed to the repository.

use crate::{
    error::{Error, Result},
    forwarder::MessageRepository,
    parsing::senml_parser,
};
use log::{debug, error, info, warn};
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use serde::Serialize;
use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

/// Configuration for MQTT subscriber
#[derive(Debug, Clone)]
pub struct MqttSubscriberConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub keep_alive_secs: u64,
    pub topics: Vec<String>,
}

impl Default for MqttSubscriberConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 1883,
            client_id: "http_forwarder".to_string(),
            keep_alive_secs: 30,
            topics: vec!["channels/#".to_string()],
        }
    }
}

/// Counters of the subscribe side
#[derive(Debug, Default)]
pub struct SubscriberStats {
    pub messages_received: AtomicU64,
    pub records_forwarded: AtomicU64,
    pub parse_errors: AtomicU64,
    pub save_errors: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriberSnapshot {
    pub messages_received: u64,
    pub records_forwarded: u64,
    pub parse_errors: u64,
    pub save_errors: u64,
}

impl SubscriberStats {
    pub fn snapshot(&self) -> SubscriberSnapshot {
        SubscriberSnapshot {
            messages_received: self.messages_received.load(Ordering::Relaxed),
            records_forwarded: self.records_forwarded.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
            save_errors: self.save_errors.load(Ordering::Relaxed),
        }
    }
}

/// MQTT Subscriber that hands decoded batches to a repository
pub struct MqttSubscriber {
    config: MqttSubscriberConfig,
    should_stop: Arc<AtomicBool>,
    stats: Arc<SubscriberStats>,
}

impl MqttSubscriber {
    pub fn new(config: MqttSubscriberConfig) -> Self {
        Self {
            config,
            should_stop: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(SubscriberStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<SubscriberStats> {
        Arc::clone(&self.stats)
    }

    /// Subscribe and forward until [`stop`](Self::stop) is called.
    ///
    /// Batches are saved one at a time, in arrival order.
    pub async fn run<R: MessageRepository>(&self, repository: &R) -> Result<()> {
        info!(
            "Starting MQTT subscriber on {}:{} for topics {:?}",
            self.config.host, self.config.port, self.config.topics
        );

        let mut mqttoptions =
            MqttOptions::new(&self.config.client_id, &self.config.host, self.config.port);
        mqttoptions.set_keep_alive(Duration::from_secs(self.config.keep_alive_secs));

        let (client, mut eventloop) = AsyncClient::new(mqttoptions, 100);

        for topic in &self.config.topics {
            client.subscribe(topic, QoS::AtLeastOnce).await.map_err(|e| {
                error!("Failed to subscribe to topic '{}': {:?}", topic, e);
                Error::Subscription(e.to_string())
            })?;
            info!("Subscribed to topic: {}", topic);
        }

        loop {
            if self.should_stop.load(Ordering::Relaxed) {
                info!("Stop signal received, shutting down MQTT subscriber");
                break;
            }

            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    self.stats.messages_received.fetch_add(1, Ordering::Relaxed);
                    let topic = String::from_utf8_lossy(publish.topic.as_ref()).into_owned();
                    self.handle_payload(&topic, &publish.payload, repository).await;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("MQTT event loop error: {:?}", e);
                    // rumqttc reconnects on the next poll
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }

        if let Err(e) = client.disconnect().await {
            debug!("MQTT disconnect failed: {:?}", e);
        }
        Ok(())
    }

    /// Decode one payload and save it as a batch. Failures are logged and counted.
    pub async fn handle_payload<R: MessageRepository>(
        &self,
        topic: &str,
        payload: &[u8],
        repository: &R,
    ) {
        let records = match senml_parser::parse_envelope(payload) {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to parse message on '{}': {}", topic, e);
                self.stats.parse_errors.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };

        match repository.save(&records).await {
            Ok(()) => {
                self.stats.records_forwarded.fetch_add(records.len() as u64, Ordering::Relaxed);
            }
            Err(e) => {
                error!("Failed to forward {} records from '{}': {}", records.len(), topic, e);
                self.stats.save_errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Stop the subscriber
    pub fn stop(&self) {
        self.should_stop.store(true, Ordering::Relaxed);
    }
}
