//! Cancellation Generations
//!
//! Superseding semantics for async checks: only one check may be "current"
//! at a time, and a late-arriving result from a superseded check must be
//! discarded, not merely ignored. Each check holds a [`CheckToken`] minted
//! from a shared [`GenerationCounter`]; the token is consulted at every
//! await point before a state update is committed.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic generation counter shared by all checks of one owner
#[derive(Debug, Default)]
pub struct GenerationCounter {
    current: Arc<AtomicU64>,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, invalidating every outstanding token
    pub fn next_token(&self) -> CheckToken {
        let generation = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        CheckToken {
            generation,
            current: Arc::clone(&self.current),
        }
    }

    /// Invalidate all outstanding tokens without starting a new check
    pub fn invalidate_all(&self) {
        self.current.fetch_add(1, Ordering::AcqRel);
    }

    /// Generation of the most recently minted token
    pub fn current_generation(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }
}

/// Token tying an async check to the generation it was started in
#[derive(Debug, Clone)]
pub struct CheckToken {
    generation: u64,
    current: Arc<AtomicU64>,
}

impl CheckToken {
    /// Whether this check is still the current one
    pub fn is_current(&self) -> bool {
        self.current.load(Ordering::Acquire) == self.generation
    }

    /// Whether a newer check has superseded this one
    pub fn is_superseded(&self) -> bool {
        !self.is_current()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_token_is_current() {
        let counter = GenerationCounter::new();
        let token = counter.next_token();
        assert!(token.is_current());
        assert_eq!(token.generation(), 1);
    }

    #[test]
    fn test_new_token_supersedes_old() {
        let counter = GenerationCounter::new();
        let first = counter.next_token();
        let second = counter.next_token();

        assert!(first.is_superseded());
        assert!(second.is_current());
    }

    #[test]
    fn test_invalidate_all() {
        let counter = GenerationCounter::new();
        let token = counter.next_token();

        counter.invalidate_all();
        assert!(token.is_superseded());
        assert_eq!(counter.current_generation(), 2);
    }
}
