//! Properties of the e-commerce login producer.
//!
//! Every record must carry the fixed endpoint, a 200 JSON response, fresh
//! UUID v4 identifiers and a plausible email/password request body.

use chrono::{TimeZone, Utc};
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

use tracegen::meta::{json_header, MetaProvider, NetworkMeta};
use tracegen::producer::{LoginProducer, Producer};
use tracegen::random::FakeSource;
use tracegen::record::{is_json_content_type, TransactionRecord};

const UUID_V4: &str = r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$";
const EMAIL: &str = r"^[^@\s]+@[^@\s]+\.[a-z]{2,}$";

fn producer(seed: u64) -> LoginProducer {
    let meta: Arc<dyn MetaProvider> = Arc::new(NetworkMeta::default());
    LoginProducer::new(FakeSource::seeded(seed), meta)
}

fn produce_many(seed: u64, n: usize) -> Vec<TransactionRecord> {
    let mut producer = producer(seed);
    let start = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            producer
                .produce(start + chrono::Duration::minutes(i as i64))
                .expect("produce should succeed")
        })
        .collect()
}

fn json(body: &str) -> serde_json::Value {
    serde_json::from_str(body).expect("body should be JSON")
}

#[test]
fn test_request_is_fixed_login_post() {
    for record in produce_many(1, 20) {
        assert_eq!(record.request.method, "POST");
        assert_eq!(record.request.url.host, "test-ecommerce.metlo.com");
        assert_eq!(record.request.url.path, "/login");
        assert!(record.request.url.parameters.is_empty());
        assert!(record.request.headers.is_empty());
    }
}

#[test]
fn test_response_is_json_200() {
    for record in produce_many(2, 20) {
        assert_eq!(record.response.status, 200);
        assert_eq!(record.response.headers.len(), 1);
        assert_eq!(record.response.headers[0], json_header());
        assert!(is_json_content_type(&record.response.headers[0].value));
    }
}

#[test]
fn test_response_body_has_uuid_v4_ids() {
    let uuid = Regex::new(UUID_V4).unwrap();

    for record in produce_many(3, 50) {
        let body = json(&record.response.body);
        assert_eq!(body["success"], true);
        for key in ["user_uuid", "api_key"] {
            let value = body[key].as_str().expect("id should be a string");
            assert!(uuid.is_match(value), "{} = {:?} is not a UUID v4", key, value);
        }
    }
}

#[test]
fn test_request_body_has_email_and_password() {
    let email = Regex::new(EMAIL).unwrap();

    for record in produce_many(4, 50) {
        let body = json(&record.request.body);
        let address = body["email"].as_str().expect("email should be a string");
        assert!(email.is_match(address), "{:?} is not an email", address);

        let password = body["password"].as_str().expect("password should be a string");
        assert!(!password.is_empty());
        assert_eq!(password.split_whitespace().count(), 5, "{:?}", password);
    }
}

#[test]
fn test_consecutive_calls_differ() {
    let records = produce_many(5, 100);

    let mut user_uuids = HashSet::new();
    let mut api_keys = HashSet::new();
    let mut request_bodies = HashSet::new();
    for record in &records {
        let resp = json(&record.response.body);
        user_uuids.insert(resp["user_uuid"].as_str().unwrap().to_string());
        api_keys.insert(resp["api_key"].as_str().unwrap().to_string());
        request_bodies.insert(record.request.body.clone());
    }

    assert_eq!(user_uuids.len(), records.len());
    assert_eq!(api_keys.len(), records.len());
    assert_eq!(request_bodies.len(), records.len());
}

#[test]
fn test_same_seed_same_records() {
    assert_eq!(produce_many(42, 10), produce_many(42, 10));
    assert_ne!(produce_many(42, 10), produce_many(43, 10));
}

#[test]
fn test_meta_comes_from_provider() {
    for record in produce_many(6, 5) {
        assert_eq!(record.meta["environment"], "production");
        assert_eq!(record.meta["destinationPort"], 443);
        assert!(record.meta.contains_key("source"));
    }
}

#[test]
fn test_record_serializes_to_expected_shape() {
    let record = &produce_many(7, 1)[0];
    let value = serde_json::to_value(record).unwrap();

    assert!(value["request"]["url"]["parameters"].as_array().unwrap().is_empty());
    assert!(value["request"]["headers"].as_array().unwrap().is_empty());
    assert!(value["request"]["body"].is_string());
    assert_eq!(value["response"]["status"], 200);
    assert_eq!(
        value["response"]["headers"][0]["value"],
        "application/json; charset=utf-8"
    );
    assert!(value["response"]["body"].is_string());
    assert!(value["meta"].is_object());
}
