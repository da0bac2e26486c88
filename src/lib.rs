//! Tracegen - synthetic HTTP traffic fixtures.
//!
//! Tracegen fakes recorded API traffic for seeding and testing ingestion and
//! traffic-analysis pipelines. Each producer synthesizes one kind of call as a
//! transaction record: the request, the response, and a metadata object.
//!
//! # Architecture
//!
//! - `record`: transaction record types (the output schema)
//! - `producer`: the `Producer` capability and the built-in producers
//! - `random`: seedable random-data source injected into producers
//! - `meta`: metadata providers and shared headers
//! - `registry`: producer selection and time-ordered scheduling
//! - `sink`: stdout and HTTP collector output
//! - `check`: validation of record files
//! - `config`: YAML configuration
//!
//! # Adding a New Producer
//!
//! See `src/producer/login.rs`. Implement `Producer` and add a variant to
//! `registry::ProducerKind`.

pub mod check;
pub mod cli;
pub mod config;
pub mod generate;
pub mod logging;
pub mod meta;
pub mod producer;
pub mod random;
pub mod record;
pub mod registry;
pub mod report;
pub mod sink;

pub use check::{CheckResult, CheckRule, Issue};
pub use config::GeneratorConfig;
pub use meta::{json_header, MetaProvider, NetworkMeta};
pub use producer::{LoginProducer, ProduceError, Producer};
pub use random::FakeSource;
pub use record::{Header, TransactionRecord};
pub use registry::{Emission, Emitter, ProducerKind, ProducerRegistry};
pub use sink::{Sink, SinkError};
