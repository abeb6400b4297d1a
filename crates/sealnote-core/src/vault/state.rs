//! Vault lock state.
//!
//! Key derivation runs off the caller's task, so a lock can land while a
//! create or unlock is still deriving. Every attempt gets a number; a result
//! is only accepted if that attempt is still the one in progress.

use std::sync::Arc;

use crate::crypto::DerivedKey;

/// Observable vault status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultStatus {
    Locked,
    Unlocking,
    Unlocked,
}

#[derive(Debug)]
enum VaultState {
    Locked,
    Unlocking { attempt: u64 },
    Unlocked { user_id: String, key: Arc<DerivedKey> },
}

#[derive(Debug)]
pub(crate) struct StateMachine {
    state: VaultState,
    last_attempt: u64,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self {
            state: VaultState::Locked,
            last_attempt: 0,
        }
    }
}

impl StateMachine {
    pub(crate) fn status(&self) -> VaultStatus {
        match self.state {
            VaultState::Locked => VaultStatus::Locked,
            VaultState::Unlocking { .. } => VaultStatus::Unlocking,
            VaultState::Unlocked { .. } => VaultStatus::Unlocked,
        }
    }

    /// Start a new attempt. Any previously held key is dropped.
    pub(crate) fn begin(&mut self) -> u64 {
        self.last_attempt += 1;
        self.state = VaultState::Unlocking {
            attempt: self.last_attempt,
        };
        self.last_attempt
    }

    /// Accept a key for `attempt`. Returns `false` and drops the key if the
    /// attempt is stale.
    pub(crate) fn complete(&mut self, attempt: u64, user_id: &str, key: Arc<DerivedKey>) -> bool {
        if !self.is_current(attempt) {
            return false;
        }
        self.state = VaultState::Unlocked {
            user_id: user_id.to_string(),
            key,
        };
        true
    }

    /// Give up on `attempt` without a key. Stale attempts change nothing.
    pub(crate) fn abandon(&mut self, attempt: u64) {
        if self.is_current(attempt) {
            self.state = VaultState::Locked;
        }
    }

    pub(crate) fn lock(&mut self) {
        self.state = VaultState::Locked;
    }

    pub(crate) fn key(&self) -> Option<Arc<DerivedKey>> {
        match &self.state {
            VaultState::Unlocked { key, .. } => Some(Arc::clone(key)),
            _ => None,
        }
    }

    pub(crate) fn user_id(&self) -> Option<&str> {
        match &self.state {
            VaultState::Unlocked { user_id, .. } => Some(user_id),
            _ => None,
        }
    }

    /// Whether `attempt` is still the one in progress.
    pub(crate) fn is_current(&self, attempt: u64) -> bool {
        matches!(self.state, VaultState::Unlocking { attempt: current } if current == attempt)
    }
}
