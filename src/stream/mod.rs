pub mod mqtt_subscriber;

pub use mqtt_subscriber::{MqttSubscriber, MqttSubscriberConfig, SubscriberSnapshot, SubscriberStats};
