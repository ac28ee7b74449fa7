//! Tunables for prime search and parameter validation

/// Miller-Rabin rounds used when nothing else is configured.
pub const DEFAULT_ROUNDS: usize = 10;

/// Settings shared by safe-prime search and DH parameter validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Miller-Rabin rounds per primality verdict
    pub rounds: usize,
    /// Upper bound on candidate draws; `None` searches until success
    pub max_attempts: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            rounds: DEFAULT_ROUNDS,
            max_attempts: None,
        }
    }
}

impl SearchConfig {
    pub fn with_rounds(mut self, rounds: usize) -> Self {
        // a zero-round test would accept anything odd
        self.rounds = rounds.max(1);
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u64>) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}
