use senml_forwarder::core::{encode_group, encode_uncompacted, group_records, AddressKey, Record, Value};
use std::time::Instant;

const DESTINATIONS: u64 = 16;

fn build_batch(number_records: u64) -> Vec<Record> {
    (0..number_records)
        .map(|i| {
            let channel = (i % DESTINATIONS).to_string();
            let name = format!("urn:dev:{}:sensor:{}", i % DESTINATIONS, i % 7);
            Record::new(&channel, "telemetry", "bench", &name, 1_700_000_000.0 + i as f64 / 1000.0)
                .with_protocol("mqtt")
                .with_unit("C")
                .with_value(Value::Numeric((i % 100) as f64 / 4.0))
        })
        .collect()
}

/// Time grouping, compaction and serialization of one batch
fn benchmark_compaction(number_records: u64) -> serde_json::Result<(f64, usize, usize)> {
    let batch = build_batch(number_records);

    let start = Instant::now();
    let mut compact_bytes = 0;
    for (_, group) in group_records(&batch, AddressKey::TopicPublisherProtocol).iter() {
        compact_bytes += serde_json::to_vec(&encode_group(group))?.len();
    }
    let elapsed = start.elapsed();

    let mut plain_bytes = 0;
    for (_, group) in group_records(&batch, AddressKey::TopicPublisherProtocol).iter() {
        plain_bytes += serde_json::to_vec(&encode_uncompacted(group))?.len();
    }

    Ok((elapsed.as_secs_f64(), compact_bytes, plain_bytes))
}

fn main() -> serde_json::Result<()> {
    println!("=== SenML Compaction Benchmark ===\n");

    for &number_records in &[100u64, 1_000, 10_000, 100_000] {
        let (seconds, compact_bytes, plain_bytes) = benchmark_compaction(number_records)?;
        println!("Records: {}", number_records);
        println!("  Compaction time: {:.3} ms", seconds * 1000.0);
        println!(
            "  Throughput:      {:.0} records/sec",
            if seconds > 0.0 { number_records as f64 / seconds } else { 0.0 }
        );
        println!(
            "  Payload size:    {} bytes compacted vs {} bytes plain ({:.1}% saved)",
            compact_bytes,
            plain_bytes,
            100.0 * (1.0 - compact_bytes as f64 / plain_bytes as f64)
        );
        println!();
    }

    Ok(())
}
