//! Configuration module for the batch issuer worker
//!
//! Handles configuration loading from TOML files and the environment, and
//! provides structured configuration types.

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Commitment registry contract
    pub registry: RegistryConfig,

    /// Submission engine tuning
    pub issuer: IssuerConfig,

    /// Monitoring and metrics
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Deployed registry contract address
    pub address: String,
}

/// Engine tuning knobs; defaults match the production deployment profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuerConfig {
    /// Escalation factor applied to the running fee multiplier per
    /// computation
    #[serde(default = "default_fee_multiplier")]
    pub fee_multiplier: f64,

    /// Fee ceiling in gwei; no broadcast ever exceeds it
    #[serde(default = "default_fee_ceiling_gwei")]
    pub fee_ceiling_gwei: u64,

    /// Confirmations required before a transaction counts as final
    pub confirmation_threshold: u32,

    /// Deadline for one confirmation wait, in seconds
    pub transaction_timeout_secs: u64,

    /// Orchestrator-level attempts before giving up on a batch
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Fixed delay between orchestrator attempts, in seconds
    #[serde(default = "default_attempt_interval")]
    pub attempt_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Dump Prometheus metrics at the end of a run
    #[serde(default = "default_true")]
    pub enable_metrics: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enable_metrics: true,
        }
    }
}

// Default value functions
fn default_fee_multiplier() -> f64 {
    1.2
}
fn default_fee_ceiling_gwei() -> u64 {
    200
}
fn default_attempts() -> u32 {
    10
}
fn default_attempt_interval() -> u64 {
    60
}
fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` applied to the environment first
    pub fn from_file_with_env(path: &str) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_file(path)
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.registry.address.trim().is_empty(),
            "registry.address must be set"
        );
        let issuer = &self.issuer;
        anyhow::ensure!(
            issuer.fee_multiplier > 1.0,
            "issuer.fee_multiplier must be greater than 1.0, got {}",
            issuer.fee_multiplier
        );
        anyhow::ensure!(
            issuer.fee_ceiling_gwei > 0,
            "issuer.fee_ceiling_gwei must be positive"
        );
        anyhow::ensure!(
            issuer.confirmation_threshold >= 1,
            "issuer.confirmation_threshold must be at least 1"
        );
        anyhow::ensure!(
            issuer.transaction_timeout_secs > 0,
            "issuer.transaction_timeout_secs must be positive"
        );
        anyhow::ensure!(issuer.attempts >= 1, "issuer.attempts must be at least 1");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"
        [registry]
        address = "0x63a8dee69a03c70db0a6dbd91133b44e03a9e2f2"

        [issuer]
        confirmation_threshold = 12
        transaction_timeout_secs = 180
    "#;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        config.validate().unwrap();
        assert_eq!(config.issuer.fee_multiplier, 1.2);
        assert_eq!(config.issuer.fee_ceiling_gwei, 200);
        assert_eq!(config.issuer.attempts, 10);
        assert_eq!(config.issuer.attempt_interval_secs, 60);
        assert!(config.monitoring.enable_metrics);
    }

    #[test]
    fn test_required_fields_are_required() {
        let missing_threshold = r#"
            [registry]
            address = "0xfeed"

            [issuer]
            transaction_timeout_secs = 180
        "#;
        assert!(toml::from_str::<Config>(missing_threshold).is_err());
    }

    #[test]
    fn test_validation_rejects_nonsense() {
        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config.issuer.fee_multiplier = 1.0;
        assert!(config.validate().is_err());

        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config.issuer.attempts = 0;
        assert!(config.validate().is_err());

        let mut config: Config = toml::from_str(MINIMAL).unwrap();
        config.registry.address = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.issuer.confirmation_threshold, 12);
    }
}
