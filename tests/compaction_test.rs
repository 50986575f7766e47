//! Compaction codec tests
//!
//! These tests verify:
//! - Grouping partitions a batch by destination
//! - The base record of a group (name prefix, minimum time, common unit)
//! - Lossless reconstruction of every record from its encoded group

use senml_forwarder::core::{
    encode_group, extract_base, group_records, resolve_pack, Address, AddressKey, Record, Value,
    SENML_VERSION,
};
use serde_json::json;

fn reading(name: &str, time: f64, unit: &str, value: Value) -> Record {
    Record::new("45", "temp", "2580", name, time).with_unit(unit).with_value(value)
}

/// Deterministic pseudo-random batch spread over a few destinations
fn mixed_batch(size: usize) -> Vec<Record> {
    let mut seed: u64 = 0x2545_f491;
    let mut next = move || {
        seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        seed >> 33
    };

    (0..size)
        .map(|i| {
            let channel = (next() % 3).to_string();
            let subtopic = ["", "temp", "hum.room1"][(next() % 3) as usize];
            let publisher = ["2580", "2581"][(next() % 2) as usize];
            let protocol = ["mqtt", "http"][(next() % 2) as usize];
            let name = format!("urn:dev:{}:{}", next() % 4, next() % 5);
            Record::new(&channel, subtopic, publisher, &name, 1_700_000_000.0 + (next() % 1000) as f64 / 8.0)
                .with_protocol(protocol)
                .with_unit(["C", "C", "%"][(next() % 3) as usize])
                .with_value(Value::Numeric(i as f64))
        })
        .collect()
}

#[test]
fn test_grouping_partitions_batch() {
    let batch = mixed_batch(200);

    for key in [AddressKey::TopicPublisher, AddressKey::TopicPublisherProtocol] {
        let groups = group_records(&batch, key);

        let total: usize = groups.iter().map(|(_, group)| group.len()).sum();
        assert_eq!(total, batch.len());

        for (address, group) in groups.iter() {
            assert!(group.iter().all(|r| Address::resolve(r, key) == *address));

            // Order within a group follows the batch
            let positions: Vec<usize> = group
                .iter()
                .map(|r| batch.iter().position(|b| std::ptr::eq(b, *r)).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }
}

#[test]
fn test_protocol_splits_groups_only_in_richer_key() {
    let batch = vec![
        reading("a", 1.0, "C", Value::Absent).with_protocol("mqtt"),
        reading("b", 2.0, "C", Value::Absent).with_protocol("http"),
    ];
    assert_eq!(group_records(&batch, AddressKey::TopicPublisher).len(), 1);
    assert_eq!(group_records(&batch, AddressKey::TopicPublisherProtocol).len(), 2);
}

#[test]
fn test_end_to_end_scenario_pack() {
    let batch = vec![
        reading("sensor:t1", 100.0, "C", Value::Numeric(20.1)),
        reading("sensor:t2", 101.0, "C", Value::Numeric(20.3)),
        reading("sensor:t3", 99.0, "C", Value::Numeric(19.9)),
    ];

    let groups = group_records(&batch, AddressKey::TopicPublisherProtocol);
    assert_eq!(groups.len(), 1);
    let (address, group) = groups.iter().next().unwrap();
    assert_eq!(address.full_topic, "channels/45/temp");

    let pack = serde_json::to_value(encode_group(group)).unwrap();
    assert_eq!(
        pack,
        json!([
            {"bn": "sensor:", "bt": 99.0, "bu": "C", "bver": 5, "n": "t1", "t": 1.0, "v": 20.1},
            {"n": "t2", "t": 2.0, "v": 20.3},
            {"n": "t3", "v": 19.9}
        ])
    );
}

#[test]
fn test_base_fields_examples() {
    let group = vec![
        reading("a:b:c", 5.0, "km", Value::Absent),
        reading("a:b:d", 2.0, "km", Value::Absent),
        reading("a:x", 9.0, "km", Value::Absent),
    ];
    let base = extract_base(&group);
    assert_eq!(base.name.as_deref(), Some("a:"));
    assert_eq!(base.time, Some(2.0));
    assert_eq!(base.unit.as_deref(), Some("km"));
    assert_eq!(base.version, Some(SENML_VERSION));

    let singleton = extract_base(&group[..1]);
    assert!(singleton.is_empty());
}

#[test]
fn test_round_trip_recovers_every_record() {
    let groups: Vec<Vec<Record>> = vec![
        vec![
            reading("urn:dev:sensor:temp", 1_700_000_000.5, "C", Value::Numeric(21.5)),
            reading("urn:dev:sensor:hum", 1_700_000_003.25, "%RH", Value::Numeric(40.0)),
            reading("urn:dev:actuator", 1_700_000_001.0, "", Value::Boolean(true)),
        ],
        vec![
            reading("a:b", 1_700_000_002.0, "W", Value::Text("idle".to_string())),
            reading("a:b", 1_700_000_002.0, "W", Value::Data("AQID".to_string())),
        ],
        vec![
            reading("a:b:c", 1_700_000_010.0, "", Value::Absent),
            reading("a:b", 1_700_000_020.0, "", Value::Numeric(-1.0)),
            reading("a:b:c:d", 1_700_000_015.0, "", Value::Numeric(0.0)),
        ],
        vec![
            reading("temp", 1_700_000_000.0, "C", Value::Numeric(1.0)).with_sum(10.0),
            reading("hum", 1_700_000_000.125, "C", Value::Numeric(2.0)).with_update_time(60.0),
        ],
        vec![reading("lonely:sensor", 1_700_000_000.0, "V", Value::Numeric(3.3))],
    ];

    for group in &groups {
        let pack = encode_group(group);
        let decoded = resolve_pack(&pack).unwrap();
        assert_eq!(decoded.len(), group.len());

        for (original, restored) in group.iter().zip(&decoded) {
            assert_eq!(restored.name, original.name);
            assert_eq!(restored.time, original.time);
            assert_eq!(restored.unit, original.unit);
            assert_eq!(restored.value, original.value);
            assert_eq!(restored.sum, original.sum);
            assert_eq!(restored.update_time, original.update_time);
        }
    }
}

#[test]
fn test_round_trip_of_mixed_batch() {
    let batch = mixed_batch(500);
    for (_, group) in group_records(&batch, AddressKey::TopicPublisherProtocol).iter() {
        let decoded = resolve_pack(&encode_group(group)).unwrap();
        for (original, restored) in group.iter().zip(&decoded) {
            assert_eq!(restored.name, original.name);
            assert_eq!(restored.time, original.time);
            assert_eq!(restored.unit, original.unit);
        }
    }
}

#[test]
fn test_record_equal_to_base_name_has_no_name_tag() {
    let group = vec![reading("a:b", 1.0, "", Value::Absent), reading("a:b:c", 2.0, "", Value::Absent)];
    let pack = encode_group(&group);
    assert_eq!(pack[0].base_name.as_deref(), Some("a:b"));
    assert_eq!(pack[0].name, None);
    assert_eq!(pack[1].name.as_deref(), Some(":c"));
}
