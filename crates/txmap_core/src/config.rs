//! Map configuration.

/// What `start_transaction` does when the context already has one open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReopenPolicy {
    /// Discard the open transaction and start a fresh one.
    #[default]
    Replace,
    /// Fail with `CoreError::TransactionAlreadyOpen`, keeping the open one.
    Reject,
}

/// Configuration for creating a transactional map.
#[derive(Debug, Clone)]
pub struct Config {
    /// Behavior when a context starts a second transaction.
    pub reopen_policy: ReopenPolicy,

    /// Number of entries to pre-size the shared store for.
    pub initial_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reopen_policy: ReopenPolicy::Replace,
            initial_capacity: 0,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the re-open policy.
    #[must_use]
    pub const fn reopen_policy(mut self, policy: ReopenPolicy) -> Self {
        self.reopen_policy = policy;
        self
    }

    /// Sets the initial store capacity.
    #[must_use]
    pub const fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}
