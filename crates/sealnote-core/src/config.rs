//! Vault configuration.
//!
//! ```toml
//! [kdf]
//! iterations = 100000
//!
//! [unlock]
//! allow_probe_bootstrap = false
//! ```
//!
//! Both sections are optional; missing values fall back to the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crypto::{DEFAULT_KDF_ITERATIONS, MIN_KDF_ITERATIONS};
use crate::error::{Result, VaultError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    #[serde(default)]
    pub kdf: KdfSection,
    #[serde(default)]
    pub unlock: UnlockSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfSection {
    /// PBKDF2 iterations for newly created vaults.
    ///
    /// Existing vaults keep the count they were created with.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

impl Default for KdfSection {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_KDF_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockSection {
    /// Accept the first passphrase for a vault that has no validation probe
    /// and seal a probe under it. Off by default: such a vault is reported
    /// as corrupted instead.
    #[serde(default)]
    pub allow_probe_bootstrap: bool,
}

fn default_iterations() -> u32 {
    DEFAULT_KDF_ITERATIONS
}

impl VaultConfig {
    pub fn with_probe_bootstrap(mut self, allow: bool) -> Self {
        self.unlock.allow_probe_bootstrap = allow;
        self
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.kdf.iterations = iterations;
        self
    }

    /// Check values that would weaken new vaults.
    pub fn validate(&self) -> Result<()> {
        if self.kdf.iterations < MIN_KDF_ITERATIONS {
            return Err(VaultError::Config(format!(
                "kdf.iterations must be at least {} (got {})",
                MIN_KDF_ITERATIONS, self.kdf.iterations
            )));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: VaultConfig = toml::from_str(contents)
            .map_err(|e| VaultError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| VaultError::Config(format!("TOML error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = VaultConfig::default();
        assert_eq!(config.kdf.iterations, DEFAULT_KDF_ITERATIONS);
        assert!(!config.unlock.allow_probe_bootstrap);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = VaultConfig::from_toml_str("").unwrap();
        assert_eq!(config, VaultConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = VaultConfig::from_toml_str(
            r#"
            [kdf]
            iterations = 250000

            [unlock]
            allow_probe_bootstrap = true
            "#,
        )
        .unwrap();

        assert_eq!(config.kdf.iterations, 250_000);
        assert!(config.unlock.allow_probe_bootstrap);
    }

    #[test]
    fn test_low_iterations_rejected() {
        let result = VaultConfig::from_toml_str("[kdf]\niterations = 1000\n");
        assert!(matches!(result, Err(VaultError::Config(_))));
    }

    #[test]
    fn test_malformed_document_rejected() {
        let result = VaultConfig::from_toml_str("[kdf]\niterations = \"lots\"\n");
        assert!(matches!(result, Err(VaultError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sealnote.toml");
        let config = VaultConfig::default().with_probe_bootstrap(true);
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        let loaded = VaultConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = VaultConfig::load(&dir.path().join("missing.toml"));
        assert!(matches!(result, Err(VaultError::Io { .. })));
    }
}
