//! Producers of synthetic transaction records.
//!
//! A producer turns a timestamp into one complete record. It owns the random
//! source it draws from and declares how often, on average, it should be
//! called. Scheduling lives in `crate::registry`.
//!
//! # Adding a Producer
//!
//! Implement `Producer`, then add a variant to `registry::ProducerKind` so the
//! CLI can select and build it.

pub mod login;

pub use login::LoginProducer;

use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

use crate::record::TransactionRecord;

/// Errors that can occur while producing a record.
#[derive(Error, Debug)]
pub enum ProduceError {
    #[error("failed to serialize body: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("metadata provider failed: {0}")]
    Meta(String),
    #[error("invalid emit interval: {0}")]
    InvalidInterval(String),
}

/// Something that can synthesize transaction records.
pub trait Producer: Send {
    /// Stable dotted name, e.g. `ecommerce.login`.
    fn name(&self) -> &'static str;

    /// Average time between two records from this producer.
    fn avg_emit_delta(&self) -> Duration;

    /// Build one record for the given point in time.
    fn produce(&mut self, timestamp: DateTime<Utc>) -> Result<TransactionRecord, ProduceError>;
}
