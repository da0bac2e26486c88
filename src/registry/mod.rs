//! Producer registry.
//!
//! Knows every built-in producer by name, picks the ones a run asks for and
//! wires each of them to its own seeded random source:
//! - `ecommerce.login` (successful shop logins)

mod schedule;

pub use schedule::{Emission, Emitter, Schedule};

use chrono::{DateTime, Utc};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::sync::Arc;
use thiserror::Error;

use crate::meta::MetaProvider;
use crate::producer::{LoginProducer, ProduceError, Producer};
use crate::random::FakeSource;

/// Errors that can occur while selecting producers.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("invalid producer pattern: {0}")]
    InvalidPattern(#[from] globset::Error),
    #[error("no producers match the given patterns")]
    NoProducers,
}

/// The built-in producers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProducerKind {
    EcommerceLogin,
}

impl ProducerKind {
    pub const ALL: &'static [ProducerKind] = &[ProducerKind::EcommerceLogin];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProducerKind::EcommerceLogin => "ecommerce.login",
        }
    }

    /// One-line summary for `tracegen list`.
    pub fn description(&self) -> &'static str {
        match self {
            ProducerKind::EcommerceLogin => "POST /login on the test shop, returns a user uuid and api key",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ecommerce.login" => Some(ProducerKind::EcommerceLogin),
            _ => None,
        }
    }

    /// Construct a producer of this kind around the given source.
    pub fn build(&self, fake: FakeSource, meta: Arc<dyn MetaProvider>) -> Box<dyn Producer> {
        match self {
            ProducerKind::EcommerceLogin => Box::new(LoginProducer::new(fake, meta)),
        }
    }
}

impl std::fmt::Display for ProducerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An ordered selection of producers.
#[derive(Debug, Clone)]
pub struct ProducerRegistry {
    kinds: Vec<ProducerKind>,
}

impl ProducerRegistry {
    /// Every built-in producer.
    pub fn all() -> Self {
        Self {
            kinds: ProducerKind::ALL.to_vec(),
        }
    }

    /// Producers matching any `include` glob (all when empty) and no `exclude` glob.
    pub fn select(include: &[String], exclude: &[String]) -> Result<Self, RegistryError> {
        let include = if include.is_empty() {
            None
        } else {
            Some(build_glob_set(include)?)
        };
        let exclude = build_glob_set(exclude)?;

        let kinds: Vec<ProducerKind> = ProducerKind::ALL
            .iter()
            .copied()
            .filter(|k| include.as_ref().map_or(true, |set| set.is_match(k.as_str())))
            .filter(|k| !exclude.is_match(k.as_str()))
            .collect();

        if kinds.is_empty() {
            return Err(RegistryError::NoProducers);
        }
        Ok(Self { kinds })
    }

    pub fn kinds(&self) -> &[ProducerKind] {
        &self.kinds
    }

    /// Build one producer per kind plus a scheduler seed.
    ///
    /// With a master seed every derived source is deterministic. Without one
    /// everything comes from OS entropy.
    pub fn build(
        &self,
        seed: Option<u64>,
        meta: Arc<dyn MetaProvider>,
    ) -> (Vec<Box<dyn Producer>>, u64) {
        let mut master = match seed {
            Some(s) => FakeSource::seeded(s),
            None => FakeSource::from_entropy(),
        };
        let producers = self
            .kinds
            .iter()
            .map(|k| k.build(FakeSource::seeded(master.next_seed()), meta.clone()))
            .collect();
        (producers, master.next_seed())
    }

    /// Producers wired into a time-ordered emitter starting at `start`.
    pub fn emitter(
        &self,
        seed: Option<u64>,
        meta: Arc<dyn MetaProvider>,
        start: DateTime<Utc>,
    ) -> Result<Emitter, ProduceError> {
        let (producers, schedule_seed) = self.build(seed, meta);
        Emitter::new(producers, start, schedule_seed)
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, RegistryError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
