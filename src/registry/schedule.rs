//! Emission scheduling over simulated time.
//!
//! Gaps between two records of the same producer are exponentially
//! distributed with the producer's average interval as the mean, so a merged
//! stream of many producers looks like independent Poisson traffic.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Exp};
use std::time::Duration;

use crate::producer::{ProduceError, Producer};
use crate::record::TransactionRecord;

/// One record together with who made it and when.
#[derive(Debug, Clone)]
pub struct Emission {
    pub producer: &'static str,
    pub timestamp: DateTime<Utc>,
    pub record: TransactionRecord,
}

/// Next emission time for a single producer.
#[derive(Debug, Clone)]
pub struct Schedule {
    gap: Exp<f64>,
    next: DateTime<Utc>,
}

impl Schedule {
    /// The first emission is one sampled gap after `start`.
    pub fn new(avg: Duration, start: DateTime<Utc>, rng: &mut StdRng) -> Result<Self, ProduceError> {
        let mean = avg.as_secs_f64();
        if mean <= 0.0 || !mean.is_finite() {
            return Err(ProduceError::InvalidInterval(format!("{:?}", avg)));
        }
        let gap = Exp::new(1.0 / mean).map_err(|e| ProduceError::InvalidInterval(e.to_string()))?;

        let mut schedule = Self { gap, next: start };
        schedule.advance(rng);
        Ok(schedule)
    }

    pub fn next_at(&self) -> DateTime<Utc> {
        self.next
    }

    /// Move to the emission after the current one.
    pub fn advance(&mut self, rng: &mut StdRng) {
        let millis = (self.gap.sample(rng) * 1000.0).round() as i64;
        self.next += chrono::Duration::milliseconds(millis);
    }
}

/// Merges scheduled producers into one time-ordered stream.
///
/// Never ends on its own; callers take as many emissions as they need.
pub struct Emitter {
    slots: Vec<(Box<dyn Producer>, Schedule)>,
    rng: StdRng,
}

impl Emitter {
    pub fn new(
        producers: Vec<Box<dyn Producer>>,
        start: DateTime<Utc>,
        seed: u64,
    ) -> Result<Self, ProduceError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let slots = producers
            .into_iter()
            .map(|p| {
                let schedule = Schedule::new(p.avg_emit_delta(), start, &mut rng)?;
                Ok((p, schedule))
            })
            .collect::<Result<Vec<_>, ProduceError>>()?;
        Ok(Self { slots, rng })
    }

    /// Time of the next emission, if any producer is scheduled.
    pub fn peek(&self) -> Option<DateTime<Utc>> {
        self.slots.iter().map(|(_, s)| s.next_at()).min()
    }
}

impl Iterator for Emitter {
    type Item = Result<Emission, ProduceError>;

    fn next(&mut self) -> Option<Self::Item> {
        // min_by_key keeps the first minimum, so ties go to registration order
        let (producer, schedule) = self
            .slots
            .iter_mut()
            .min_by_key(|(_, s)| s.next_at())?;

        let timestamp = schedule.next_at();
        schedule.advance(&mut self.rng);

        let name = producer.name();
        tracing::debug!(producer = name, %timestamp, "emitting record");

        Some(producer.produce(timestamp).map(|record| Emission {
            producer: name,
            timestamp,
            record,
        }))
    }
}
