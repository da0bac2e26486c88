//! Drives an emitter into a sink.

use chrono::Utc;
use std::time::Duration;

use crate::producer::ProduceError;
use crate::record::TransactionRecord;
use crate::registry::{Emission, Emitter};
use crate::sink::Sink;

/// How many records to produce and how to deliver them.
#[derive(Debug, Clone, Copy)]
pub struct Plan {
    pub count: usize,
    pub batch_size: usize,
    /// Wait for each emission's wall-clock time and deliver it on its own.
    pub follow: bool,
}

/// Totals for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub records: usize,
    pub batches: usize,
}

/// Pull up to `n` emissions off the emitter.
pub fn take_batch(emitter: &mut Emitter, n: usize) -> Result<Vec<Emission>, ProduceError> {
    emitter.take(n).collect()
}

/// Produce `plan.count` records and deliver them.
pub async fn run(mut emitter: Emitter, sink: &Sink, plan: Plan) -> anyhow::Result<Summary> {
    let mut summary = Summary::default();
    let chunk = if plan.follow { 1 } else { plan.batch_size.max(1) };

    while summary.records < plan.count {
        if plan.follow {
            let Some(next) = emitter.peek() else {
                break;
            };
            let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            tracing::debug!(wait_ms = wait.as_millis() as u64, "waiting for next emission");
            tokio::time::sleep(wait).await;
        }

        let n = chunk.min(plan.count - summary.records);
        let emissions = take_batch(&mut emitter, n)?;
        if emissions.is_empty() {
            break;
        }

        let batch: Vec<TransactionRecord> = emissions.into_iter().map(|e| e.record).collect();
        sink.send(&batch).await?;
        summary.records += batch.len();
        summary.batches += 1;
    }

    tracing::info!(
        records = summary.records,
        batches = summary.batches,
        sink = %sink.describe(),
        "generation finished"
    );
    Ok(summary)
}
