//! Seedable random-data source shared by every producer.
//!
//! Each producer owns one `FakeSource`. Seeding it makes the producer's
//! output fully reproducible, which is what the tests rely on.

use fake::faker::internet::en::{FreeEmail, IPv4};
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;
use uuid::Uuid;

pub struct FakeSource {
    rng: StdRng,
}

impl FakeSource {
    /// A source seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// A deterministic source.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Address from a free mail provider, e.g. `jdoe@gmail.com`.
    pub fn free_email(&mut self) -> String {
        FreeEmail().fake_with_rng(&mut self.rng)
    }

    /// A lorem sentence of exactly `words` words.
    pub fn sentence(&mut self, words: usize) -> String {
        Sentence(words..words + 1).fake_with_rng(&mut self.rng)
    }

    /// Random version 4 UUID drawn from this source rather than the OS.
    pub fn uuid_v4(&mut self) -> Uuid {
        uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid()
    }

    pub fn ipv4(&mut self) -> String {
        IPv4().fake_with_rng(&mut self.rng)
    }

    pub fn port(&mut self, range: Range<u16>) -> u16 {
        self.rng.gen_range(range)
    }

    /// Derive an independent seed, used to fan one master seed out to many sources.
    pub fn next_seed(&mut self) -> u64 {
        self.rng.gen()
    }
}

impl std::fmt::Debug for FakeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FakeSource").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_sources_repeat() {
        let mut a = FakeSource::seeded(7);
        let mut b = FakeSource::seeded(7);
        assert_eq!(a.free_email(), b.free_email());
        assert_eq!(a.sentence(5), b.sentence(5));
        assert_eq!(a.uuid_v4(), b.uuid_v4());
        assert_eq!(a.ipv4(), b.ipv4());
    }

    #[test]
    fn test_uuid_is_version_4() {
        let mut source = FakeSource::seeded(1);
        for _ in 0..32 {
            let id = source.uuid_v4();
            assert_eq!(id.get_version_num(), 4);
            assert_eq!(id.get_variant(), uuid::Variant::RFC4122);
        }
    }

    #[test]
    fn test_sentence_word_count() {
        let mut source = FakeSource::seeded(3);
        for _ in 0..16 {
            let sentence = source.sentence(5);
            assert_eq!(sentence.split_whitespace().count(), 5, "{:?}", sentence);
        }
    }

    #[test]
    fn test_port_in_range() {
        let mut source = FakeSource::seeded(11);
        for _ in 0..64 {
            let port = source.port(1000..9000);
            assert!((1000..9000).contains(&port));
        }
    }

    #[test]
    fn test_free_email_shape() {
        let mut source = FakeSource::seeded(5);
        let email = source.free_email();
        let (local, domain) = email.split_once('@').expect("email has an @");
        assert!(!local.is_empty());
        assert!(domain.contains('.'));
    }
}
