//! Task id generation.
//!
//! Ids are 21 characters drawn uniformly from a 64-symbol URL-safe
//! alphabet. They are not cryptographically secure and only need to stay
//! unique within one in-memory session.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const ID_LEN: usize = 21;
pub const ID_ALPHABET: &[u8; 64] =
    b"useandom-26T198340PX75pxJACKVERYMINDBUSHWOLF_GQZbfghjklqvwyzrict";

/// Source of fresh task ids.
pub trait IdSource {
    fn next_id(&mut self) -> String;
}

/// Random ids drawn from a `StdRng`.
#[derive(Debug)]
pub struct RandomIds {
    rng: StdRng,
}

impl RandomIds {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic ids, for replays and tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomIds {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl IdSource for RandomIds {
    fn next_id(&mut self) -> String {
        (0..ID_LEN)
            .map(|_| ID_ALPHABET[self.rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect()
    }
}

/// Draw ids until one is not already taken.
pub fn fresh_id(source: &mut dyn IdSource, taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = source.next_id();
        if !taken(&id) {
            return id;
        }
        tracing::debug!(id = %id, "generated id collided, redrawing");
    }
}
