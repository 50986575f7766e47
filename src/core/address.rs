//! Destination addressing for records

use crate::core::Record;

const TOPIC_ROOT: &str = "channels";

/// Which record attributes take part in the destination key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressKey {
    /// Topic and publisher only
    TopicPublisher,
    /// Topic, publisher and transport protocol
    #[default]
    TopicPublisherProtocol,
}

impl std::str::FromStr for AddressKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "topic-publisher" => Ok(AddressKey::TopicPublisher),
            "topic-publisher-protocol" => Ok(AddressKey::TopicPublisherProtocol),
            _ => Err(format!(
                "Invalid address key: {}. Use 'topic-publisher' or 'topic-publisher-protocol'",
                s
            )),
        }
    }
}

/// Grouping key of a delivery destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    pub full_topic: String,
    pub publisher: String,
    /// Empty unless the key includes the protocol
    pub protocol: String,
}

impl Address {
    /// Derive the destination of a record.
    ///
    /// The topic is `channels.<channel>.<subtopic>` with every `.` turned into
    /// `/`, so an empty subtopic keeps its trailing separator.
    pub fn resolve(record: &Record, key: AddressKey) -> Self {
        let full_topic =
            format!("{}.{}.{}", TOPIC_ROOT, record.channel, record.subtopic).replace('.', "/");
        let protocol = match key {
            AddressKey::TopicPublisher => String::new(),
            AddressKey::TopicPublisherProtocol => record.protocol.clone(),
        };

        Address { full_topic, publisher: record.publisher.clone(), protocol }
    }
}
