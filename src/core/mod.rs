//! Core data structures for the SenML forwarder

/// A single typed reading as delivered by the subscribe side.
///
/// `time` and `update_time` are seconds since the epoch; an `update_time` of
/// zero means the reading carries no recurrence hint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub channel: String,
    pub subtopic: String,
    pub publisher: String,
    pub protocol: String,
    pub name: String,
    pub unit: String,
    pub time: f64,
    pub update_time: f64,
    pub value: Value,
    pub sum: Option<f64>,
}

/// Payload of a record. At most one variant is populated per reading.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Numeric(f64),
    Text(String),
    /// Opaque data, carried as the text the publisher sent (usually base64)
    Data(String),
    Boolean(bool),
    #[default]
    Absent,
}

impl Record {
    pub fn new(channel: &str, subtopic: &str, publisher: &str, name: &str, time: f64) -> Self {
        Self {
            channel: channel.to_string(),
            subtopic: subtopic.to_string(),
            publisher: publisher.to_string(),
            name: name.to_string(),
            time,
            ..Default::default()
        }
    }

    pub fn with_protocol(mut self, protocol: &str) -> Self {
        self.protocol = protocol.to_string();
        self
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }

    pub fn with_sum(mut self, sum: f64) -> Self {
        self.sum = Some(sum);
        self
    }

    pub fn with_update_time(mut self, update_time: f64) -> Self {
        self.update_time = update_time;
        self
    }
}

pub mod address;
pub mod encoding;
pub mod grouping;

pub use address::{Address, AddressKey};
pub use encoding::*;
pub use grouping::{group_records, Groups};
