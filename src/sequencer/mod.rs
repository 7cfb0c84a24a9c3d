//! Deterministic ordering of carrier positions.
//!
//! Without a seed, positions are visited in natural (row-major) order. With a
//! seed, they are visited in a pseudo-random permutation that both sides
//! regenerate from the seed alone.
//!
//! # Ordering version 1
//!
//! The seed is hashed into a ChaCha20 key (see [`Seed::order_key`]). Step `i`
//! of a forward Fisher-Yates shuffle draws `j = i + uniform(len - i)` and
//! swaps positions `i` and `j`. `uniform(n)` rejects raw `next_u64` outputs
//! below `n.wrapping_neg() % n` and reduces the rest modulo `n`. Every
//! quantity is a `u64`, so the order is identical on 32- and 64-bit targets
//! and does not depend on `rand`'s range sampling.

mod seed;

pub use seed::Seed;

use crate::carrier::Shape;
use crate::error::{Error, Result};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::collections::HashMap;

/// Lazy sequence of positions in `0..len`.
///
/// Only positions displaced by the shuffle are stored, so memory grows with
/// the number of positions consumed, not with the carrier size.
#[derive(Debug, Clone)]
pub struct Sequence {
    len: usize,
    next: usize,
    order: Order,
}

#[derive(Debug, Clone)]
enum Order {
    Natural,
    Shuffled {
        rng: ChaCha20Rng,
        displaced: HashMap<usize, usize>,
    },
}

/// Sequence over every element of a carrier with `shape`, shuffled when a
/// seed is given.
///
/// Codecs that address something other than single elements (element pairs,
/// payload bytes) build a [`Sequence::new`] over their own index space.
pub fn sequence(shape: &Shape, seed: Option<&Seed>) -> Sequence {
    Sequence::new(shape.len(), seed)
}

impl Sequence {
    /// Create a sequence over `len` positions.
    pub fn new(len: usize, seed: Option<&Seed>) -> Self {
        let order = match seed {
            None => Order::Natural,
            Some(seed) => Order::Shuffled {
                rng: ChaCha20Rng::from_seed(seed.order_key()),
                displaced: HashMap::new(),
            },
        };
        Self {
            len,
            next: 0,
            order,
        }
    }

    /// Total number of positions.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the sequence covers no positions at all.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Positions already produced.
    pub fn consumed(&self) -> usize {
        self.next
    }

    /// Positions still to come.
    pub fn remaining(&self) -> usize {
        self.len - self.next
    }

    /// Take exactly `n` further positions.
    pub fn take_exact(&mut self, n: usize) -> Result<Vec<usize>> {
        if n > self.remaining() {
            return Err(Error::Capacity {
                needed: n,
                available: self.remaining(),
            });
        }
        Ok(self.by_ref().take(n).collect())
    }
}

impl Iterator for Sequence {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.next >= self.len {
            return None;
        }
        let i = self.next;
        self.next += 1;

        match &mut self.order {
            Order::Natural => Some(i),
            Order::Shuffled { rng, displaced } => {
                let span = (self.len - i) as u64;
                let j = i + uniform(rng, span) as usize;
                let at_i = displaced.remove(&i).unwrap_or(i);
                let at_j = if j == i {
                    at_i
                } else {
                    let at_j = displaced.get(&j).copied().unwrap_or(j);
                    displaced.insert(j, at_i);
                    at_j
                };
                Some(at_j)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Sequence {}

/// Uniform integer in `0..n` by rejection sampling. `n` must be non-zero.
fn uniform(rng: &mut ChaCha20Rng, n: u64) -> u64 {
    let threshold = n.wrapping_neg() % n;
    loop {
        let r = rng.next_u64();
        if r >= threshold {
            return r % n;
        }
    }
}
