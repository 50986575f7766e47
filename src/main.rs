//! HTTP forwarder service
//!
//! Subscribes to SenML message envelopes on an MQTT broker and forwards every
//! batch, compacted per destination, to a remote HTTP endpoint.
//!
//! Usage:
//!   http-forwarder --remote-url http://receiver:9000 --mqtt-host broker --topics 'channels/#'

use clap::Parser;
use log::{error, info};
use senml_forwarder::{
    core::AddressKey,
    forwarder::{HttpForwarder, LoggingMiddleware, MetricsMiddleware, RepositoryMetrics},
    http::start_server,
    stream::{MqttSubscriber, MqttSubscriberConfig},
    ForwardMode, ForwarderConfig,
};
use std::{sync::Arc, time::Duration};

#[derive(Parser, Debug)]
#[command(name = "http-forwarder")]
#[command(about = "Forward SenML messages from MQTT to a remote HTTP endpoint", long_about = None)]
struct Args {
    /// Base URL of the receiving endpoint
    #[arg(long, env = "MF_HTTP_FORWARDER_REMOTE_URL", default_value = "http://localhost:9000")]
    remote_url: String,

    /// Bearer token sent to the receiving endpoint
    #[arg(long, env = "MF_HTTP_FORWARDER_REMOTE_TOKEN", default_value = "", hide_env_values = true)]
    remote_token: String,

    /// Content type label of the inbound messages
    #[arg(long, env = "MF_HTTP_FORWARDER_CONTENT_TYPE", default_value = "application/senml+json")]
    content_type: String,

    /// Request timeout in seconds
    #[arg(long, env = "MF_HTTP_FORWARDER_TIMEOUT_SECS", default_value = "30")]
    timeout_secs: u64,

    /// compact or passthrough
    #[arg(long, env = "MF_HTTP_FORWARDER_MODE", default_value = "compact")]
    mode: ForwardMode,

    /// topic-publisher or topic-publisher-protocol
    #[arg(long, env = "MF_HTTP_FORWARDER_ADDRESS_KEY", default_value = "topic-publisher-protocol")]
    address_key: AddressKey,

    /// Log filter, e.g. error, info or senml_forwarder=debug
    #[arg(long, env = "MF_HTTP_FORWARDER_LOG_LEVEL", default_value = "error")]
    log_level: String,

    /// Port of the health listener
    #[arg(short, long, env = "MF_HTTP_FORWARDER_PORT", default_value = "8990")]
    port: u16,

    #[arg(long, env = "MF_MQTT_HOST", default_value = "localhost")]
    mqtt_host: String,

    #[arg(long, env = "MF_MQTT_PORT", default_value = "1883")]
    mqtt_port: u16,

    #[arg(long, env = "MF_MQTT_CLIENT_ID", default_value = "http_forwarder")]
    mqtt_client_id: String,

    /// Topic filters to subscribe to (comma-separated)
    #[arg(short, long, env = "MF_HTTP_FORWARDER_TOPICS", default_value = "channels/#")]
    topics: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    env_logger::Builder::new().parse_filters(&args.log_level).init();

    let config = ForwarderConfig {
        content_type: args.content_type.clone(),
        ..ForwarderConfig::new(&args.remote_url)
    }
    .with_token(&args.remote_token)
    .with_timeout(Duration::from_secs(args.timeout_secs))
    .with_mode(args.mode)
    .with_address_key(args.address_key);

    let forwarder = HttpForwarder::new(config)?;
    info!(
        "Forwarding {} messages to {} ({:?} mode)",
        args.content_type, args.remote_url, args.mode
    );

    let metrics = Arc::new(RepositoryMetrics::default());
    let repository = MetricsMiddleware::new(LoggingMiddleware::new(forwarder), Arc::clone(&metrics));

    let topics: Vec<String> = args
        .topics
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    let subscriber = MqttSubscriber::new(MqttSubscriberConfig {
        host: args.mqtt_host,
        port: args.mqtt_port,
        client_id: args.mqtt_client_id,
        topics,
        ..Default::default()
    });

    let addr = format!("0.0.0.0:{}", args.port);

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install CTRL+C signal handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = subscriber.run(&repository) => {
            if let Err(e) = result {
                error!("Failed to start HTTP forwarder: {}", e);
                return Err(e.into());
            }
        }
        result = start_server(&addr, metrics, subscriber.stats()) => {
            if let Err(e) = result {
                error!("HTTP forwarder service terminated: {}", e);
                return Err(e.into());
            }
        }
        () = shutdown_signal => {
            info!("Shutdown signal received, stopping HTTP forwarder");
            subscriber.stop();
        }
    }

    Ok(())
}
