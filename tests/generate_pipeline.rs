//! End-to-end tests: config -> registry -> emitter -> sink format -> checker.

use chrono::{TimeZone, Utc};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use tracegen::check;
use tracegen::config::{self, GeneratorConfig};
use tracegen::generate::take_batch;
use tracegen::meta::{MetaProvider, NetworkMeta};
use tracegen::record::TransactionRecord;
use tracegen::registry::ProducerRegistry;
use tracegen::sink::write_records;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn load_config() -> GeneratorConfig {
    let config = GeneratorConfig::parse_file(testdata_path().join("tracegen.yaml"))
        .expect("should parse config");
    config::validate(&config).expect("config should be valid");
    config
}

/// Generate `config.count` records the way `tracegen generate` does.
fn generate(config: &GeneratorConfig) -> Vec<tracegen::Emission> {
    let registry = ProducerRegistry::select(&config.producers, &config.exclude)
        .expect("producers should match");
    let meta: Arc<dyn MetaProvider> = Arc::new(NetworkMeta::new(config.meta.clone()));
    let start = config.start.expect("fixture config has a start time");
    let mut emitter = registry
        .emitter(config.seed, meta, start)
        .expect("emitter should build");
    take_batch(&mut emitter, config.count).expect("generation should succeed")
}

#[test]
fn test_config_fixture() {
    let config = load_config();
    assert_eq!(config.seed, Some(1234));
    assert_eq!(config.count, 25);
    assert_eq!(config.meta.environment, "test");
    assert_eq!(
        config.start,
        Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    );
}

#[test]
fn test_generated_records_pass_check() {
    let config = load_config();
    let emissions = generate(&config);
    assert_eq!(emissions.len(), 25);

    let records: Vec<TransactionRecord> = emissions.into_iter().map(|e| e.record).collect();
    let mut buf = Vec::new();
    write_records(&mut buf, &records, false).expect("records should serialize");

    let result = check::check_reader(Cursor::new(buf), "generated").expect("check should run");
    assert_eq!(result.records, 25);
    assert!(result.passed(), "unexpected issues: {:?}", result.issues);
}

#[test]
fn test_generation_is_reproducible() {
    let config = load_config();
    let a = generate(&config);
    let b = generate(&config);

    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.producer, y.producer);
        assert_eq!(x.timestamp, y.timestamp);
        assert_eq!(x.record, y.record);
    }
}

#[test]
fn test_timestamps_flow_into_meta() {
    let config = load_config();
    let start = config.start.unwrap();

    for emission in generate(&config) {
        assert_eq!(emission.producer, "ecommerce.login");
        assert!(emission.timestamp >= start);
        assert_eq!(emission.record.meta["environment"], "test");

        let stamped = emission.record.meta["requestTime"]
            .as_str()
            .expect("include_time is on");
        let parsed = chrono::DateTime::parse_from_rfc3339(stamped).unwrap();
        assert_eq!(parsed.timestamp_millis(), emission.timestamp.timestamp_millis());
    }
}

#[test]
fn test_average_cadence_is_about_a_minute() {
    let mut config = load_config();
    config.count = 2000;
    let emissions = generate(&config);

    let first = emissions.first().unwrap().timestamp;
    let last = emissions.last().unwrap().timestamp;
    let mean_secs = (last - first).num_seconds() as f64 / (emissions.len() - 1) as f64;
    assert!((50.0..70.0).contains(&mean_secs), "mean gap {}s", mean_secs);
}
