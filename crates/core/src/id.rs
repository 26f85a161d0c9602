//! Node id generation for rule trees.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::rule::RuleId;

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_ID_LEN: usize = 8;

/// Source of fresh node ids.
pub trait IdGenerator {
    fn next_id(&mut self) -> RuleId;
}

/// Random 8-character base-36 ids.
#[derive(Debug)]
pub struct RandomIds {
    rng: StdRng,
}

impl RandomIds {
    pub fn new() -> Self {
        RandomIds {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible ids, for tests and fixtures.
    pub fn seeded(seed: u64) -> Self {
        RandomIds {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> RuleId {
        let id: String = (0..RANDOM_ID_LEN)
            .map(|_| ALPHABET[self.rng.gen_range(0..ALPHABET.len())] as char)
            .collect();
        RuleId::new(id)
    }
}

/// `prefix1`, `prefix2`, ... in order.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        SequentialIds {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> RuleId {
        let id = RuleId::new(format!("{}{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn random_ids_are_base36_of_fixed_length() {
        let mut ids = RandomIds::seeded(7);
        let id = ids.next_id();
        assert_eq!(id.as_str().len(), RANDOM_ID_LEN);
        assert!(id
            .as_str()
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase()));
    }

    #[test]
    fn seeded_ids_are_reproducible_and_distinct() {
        let a: Vec<_> = {
            let mut g = RandomIds::seeded(42);
            (0..50).map(|_| g.next_id()).collect()
        };
        let b: Vec<_> = {
            let mut g = RandomIds::seeded(42);
            (0..50).map(|_| g.next_id()).collect()
        };
        assert_eq!(a, b);
        let unique: HashSet<_> = a.iter().collect();
        assert_eq!(unique.len(), a.len());
    }

    #[test]
    fn sequential_ids_count_from_one() {
        let mut ids = SequentialIds::new("n");
        assert_eq!(ids.next_id().as_str(), "n1");
        assert_eq!(ids.next_id().as_str(), "n2");
    }
}
