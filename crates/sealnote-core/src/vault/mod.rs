//! Vault key lifecycle: creation, unlock, lock.

pub mod manager;
pub mod state;

pub use manager::{UnlockOutcome, VaultKeyManager, VALIDATION_PROBE_PLAINTEXT};
pub use state::VaultStatus;
