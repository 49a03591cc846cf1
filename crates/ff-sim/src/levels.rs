//! Ring buffer of accepted time levels.

use std::collections::VecDeque;

use ff_core::Field;

use crate::error::{SimError, SimResult};

/// The most recent accepted fields, newest last.
///
/// Capacity is the memory of the steady scheme. The buffer starts from the
/// initial field and is never empty. During bootstrap it fills up;
/// afterwards every push discards exactly the oldest level.
#[derive(Debug, Clone)]
pub struct TimeLevels {
    capacity: usize,
    levels: VecDeque<Field>,
}

impl TimeLevels {
    pub fn new(capacity: usize, initial: Field) -> SimResult<Self> {
        if capacity == 0 {
            return Err(SimError::InvalidArg {
                what: "time level capacity must be positive",
            });
        }
        let mut levels = VecDeque::with_capacity(capacity);
        levels.push_back(initial);
        Ok(Self { capacity, levels })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_full(&self) -> bool {
        self.levels.len() == self.capacity
    }

    /// Accept a new level, rotating out the oldest once full.
    pub fn push(&mut self, field: Field) {
        if self.is_full() {
            self.levels.pop_front();
        }
        self.levels.push_back(field);
    }

    /// Level `k` steps back: `0` is `u_n`, `1` is `u_{n-1}`.
    pub fn back(&self, k: usize) -> Option<&Field> {
        self.levels.len().checked_sub(k + 1).map(|i| &self.levels[i])
    }

    /// The newest level `u_n`.
    pub fn current(&self) -> &Field {
        &self.levels[self.levels.len() - 1]
    }

    /// Levels from newest to oldest.
    pub fn newest_first(&self) -> impl Iterator<Item = &Field> {
        self.levels.iter().rev()
    }
}
