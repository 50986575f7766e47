//! Decoding of inbound broker messages into record batches

use crate::{
    core::{resolve_pack, Record, SenmlRecord},
    error::{Error, Result},
};
use serde::Deserialize;

const NANOS_PER_SECOND: f64 = 1e9;

/// Message as published on the broker: routing metadata plus a SenML pack.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageEnvelope {
    pub channel: String,
    #[serde(default)]
    pub subtopic: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub protocol: String,
    /// Reception time in nanoseconds since the epoch
    #[serde(default)]
    pub created: i64,
    pub payload: Vec<SenmlRecord>,
}

/// Parse a JSON envelope into the records of one batch.
pub fn parse_envelope(bytes: &[u8]) -> Result<Vec<Record>> {
    let envelope: MessageEnvelope = serde_json::from_slice(bytes)
        .map_err(|e| Error::Parse(format!("invalid message envelope: {}", e)))?;
    envelope_records(envelope)
}

/// Resolve the envelope's pack and attach its routing metadata to every reading.
///
/// Readings without a time take the envelope's creation time.
pub fn envelope_records(envelope: MessageEnvelope) -> Result<Vec<Record>> {
    if envelope.channel.is_empty() {
        return Err(Error::Parse("message has no channel".to_string()));
    }

    let created = envelope.created as f64 / NANOS_PER_SECOND;
    resolve_pack(&envelope.payload)?
        .into_iter()
        .enumerate()
        .map(|(i, reading)| {
            if reading.name.is_empty() {
                return Err(Error::Parse(format!("record {} has no name", i)));
            }

            Ok(Record {
                channel: envelope.channel.clone(),
                subtopic: envelope.subtopic.clone(),
                publisher: envelope.publisher.clone(),
                protocol: envelope.protocol.clone(),
                name: reading.name,
                unit: reading.unit,
                time: if reading.time == 0.0 { created } else { reading.time },
                update_time: reading.update_time,
                value: reading.value,
                sum: reading.sum,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;

    #[test]
    fn test_parse_envelope_resolves_pack() {
        let json = br#"{
            "channel": "45", "subtopic": "temp", "publisher": "2580", "protocol": "mqtt",
            "created": 1700000000000000000,
            "payload": [
                {"bn": "sensor:", "bu": "C", "n": "t1", "t": 1700000001, "v": 20.1},
                {"n": "t2", "vs": "ok"},
                {"n": "t3", "vb": false, "s": 3}
            ]
        }"#;

        let records = parse_envelope(json).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "sensor:t1");
        assert_eq!(records[0].unit, "C");
        assert_eq!(records[0].time, 1_700_000_001.0);
        assert_eq!(records[0].value, Value::Numeric(20.1));
        assert_eq!(records[1].time, 1_700_000_000.0);
        assert_eq!(records[1].value, Value::Text("ok".to_string()));
        assert_eq!(records[2].value, Value::Boolean(false));
        assert_eq!(records[2].sum, Some(3.0));
        assert!(records.iter().all(|r| r.channel == "45" && r.protocol == "mqtt"));
    }

    #[test]
    fn test_missing_channel_rejected() {
        let json = br#"{"channel": "", "payload": [{"n": "x", "v": 1}]}"#;
        assert!(matches!(parse_envelope(json), Err(Error::Parse(_))));
    }

    #[test]
    fn test_nameless_record_rejected() {
        let json = br#"{"channel": "1", "payload": [{"v": 1}]}"#;
        let err = parse_envelope(json).unwrap_err();
        assert!(err.to_string().contains("has no name"));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(parse_envelope(b"not json"), Err(Error::Parse(_))));
    }
}
