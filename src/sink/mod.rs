//! Destinations for generated records.
//!
//! - stdout: one JSON document per line, or pretty-printed
//! - http: batches POSTed to a collector endpoint

mod http;

pub use http::HttpSink;

use std::io::Write;
use thiserror::Error;

use crate::record::TransactionRecord;

/// Errors that can occur while delivering records.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("collector rejected batch with HTTP {status}")]
    Rejected { status: u16 },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where a run sends its records.
pub enum Sink {
    Stdout { pretty: bool },
    Http(HttpSink),
}

impl Sink {
    /// Deliver one batch. An empty batch is a no-op.
    pub async fn send(&self, batch: &[TransactionRecord]) -> Result<(), SinkError> {
        if batch.is_empty() {
            return Ok(());
        }
        match self {
            Sink::Stdout { pretty } => {
                let stdout = std::io::stdout();
                let mut out = stdout.lock();
                write_records(&mut out, batch, *pretty)?;
                out.flush()?;
                Ok(())
            }
            Sink::Http(http) => http.send(batch).await,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Sink::Stdout { .. } => "stdout".to_string(),
            Sink::Http(http) => http.url().to_string(),
        }
    }
}

/// Write records as JSON lines, or as indented JSON separated by newlines.
pub fn write_records<W: Write>(
    out: &mut W,
    records: &[TransactionRecord],
    pretty: bool,
) -> Result<(), SinkError> {
    for record in records {
        if pretty {
            serde_json::to_writer_pretty(&mut *out, record)?;
        } else {
            serde_json::to_writer(&mut *out, record)?;
        }
        out.write_all(b"\n")?;
    }
    Ok(())
}
