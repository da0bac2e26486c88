//! Record metadata and shared header helpers.
//!
//! Producers never build `meta` themselves. They hand their random source and
//! the emission timestamp to a `MetaProvider` and attach whatever comes back.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::config::MetaConfig;
use crate::producer::ProduceError;
use crate::random::FakeSource;
use crate::record::{Header, Meta};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Source ports are drawn from this range.
const SOURCE_PORTS: std::ops::Range<u16> = 1000..9000;

/// The canonical JSON content-type header.
pub fn json_header() -> Header {
    Header::new("content-type", JSON_CONTENT_TYPE)
}

/// Stamps records with contextual metadata.
pub trait MetaProvider: Send + Sync {
    fn meta(&self, fake: &mut FakeSource, timestamp: DateTime<Utc>) -> Result<Meta, ProduceError>;
}

/// Network-level metadata: where the exchange came from and where it went.
#[derive(Debug, Clone)]
pub struct NetworkMeta {
    config: MetaConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NetworkMetaFields<'a> {
    environment: &'a str,
    incoming: bool,
    source: String,
    source_port: u16,
    destination: &'a str,
    destination_port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_time: Option<String>,
}

impl NetworkMeta {
    pub fn new(config: MetaConfig) -> Self {
        Self { config }
    }
}

impl Default for NetworkMeta {
    fn default() -> Self {
        Self::new(MetaConfig::default())
    }
}

impl MetaProvider for NetworkMeta {
    fn meta(&self, fake: &mut FakeSource, timestamp: DateTime<Utc>) -> Result<Meta, ProduceError> {
        let fields = NetworkMetaFields {
            environment: &self.config.environment,
            incoming: self.config.incoming,
            source: fake.ipv4(),
            source_port: fake.port(SOURCE_PORTS),
            destination: &self.config.destination,
            destination_port: self.config.destination_port,
            request_time: self
                .config
                .include_time
                .then(|| timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
        };

        match serde_json::to_value(fields)? {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(ProduceError::Meta(format!(
                "metadata must be an object, got {}",
                other
            ))),
        }
    }
}
