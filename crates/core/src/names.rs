//! Fresh-identifier pool.
//!
//! Operators that introduce labels or variables draw names from an injected
//! pool instead of a global table. Every draw removes the name, so a name is
//! never handed out twice; exhaustion is a typed error rather than silent
//! reuse.

use crate::result::{Error, Result};
use rand::rngs::StdRng;
use rand::Rng;

/// Pool of unused identifiers.
#[derive(Debug, Clone)]
pub struct NamePool {
    available: Vec<String>,
    drawn: usize,
}

impl NamePool {
    /// Builds a pool from a word list, keeping only words long enough to be
    /// unlikely to collide with short program identifiers.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let available = words
            .into_iter()
            .map(Into::into)
            .filter(|w| w.len() > 2 && w.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
            .collect();
        Self {
            available,
            drawn: 0,
        }
    }

    /// Builds a pool of `count` synthetic names (`vn_0`, `vn_1`, ...).
    pub fn synthetic(count: usize) -> Self {
        Self {
            available: (0..count).map(|i| format!("vn_{i}")).collect(),
            drawn: 0,
        }
    }

    /// Draws a fresh name at a random position, removing it from the pool.
    pub fn take(&mut self, rng: &mut StdRng) -> Result<String> {
        if self.available.is_empty() {
            return Err(Error::NamePoolExhausted(self.drawn));
        }
        let idx = rng.random_range(0..self.available.len());
        self.drawn += 1;
        Ok(self.available.swap_remove(idx))
    }

    /// Names still available.
    pub fn remaining(&self) -> usize {
        self.available.len()
    }

    /// Names handed out so far.
    pub fn drawn(&self) -> usize {
        self.drawn
    }
}
