use crate::error::{EscrowError, Result};
use crate::types::Amount;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CANCEL_COOLDOWN: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Idle time after the last action before a stalled room may be cancelled.
    pub cancel_cooldown: Duration,
    pub min_wager: Amount,
    /// Retained from every remittance deposit.
    pub deposit_fee: Amount,
    pub start_paused: bool,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            cancel_cooldown: DEFAULT_CANCEL_COOLDOWN,
            min_wager: Amount::from_units(1),
            deposit_fee: Amount::ZERO,
            start_paused: false,
        }
    }
}

impl ProtocolConfig {
    pub fn with_deposit_fee(mut self, fee: Amount) -> Self {
        self.deposit_fee = fee;
        self
    }

    pub fn with_cancel_cooldown(mut self, cooldown: Duration) -> Self {
        self.cancel_cooldown = cooldown;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        tracing::debug!("Loaded protocol config from {}", path.display());
        Ok(config)
    }

    pub fn cooldown(&self) -> Result<chrono::Duration> {
        chrono::Duration::from_std(self.cancel_cooldown)
            .map_err(|e| EscrowError::config(format!("Cancel cooldown out of range: {}", e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.cancel_cooldown.is_zero() {
            return Err(EscrowError::config("Cancel cooldown must be greater than 0"));
        }

        if self.min_wager.is_zero() {
            return Err(EscrowError::config("Minimum wager must be greater than 0"));
        }

        self.cooldown()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ProtocolConfig::default();
        config.validate().unwrap();
        assert_eq!(config.cooldown().unwrap(), chrono::Duration::days(1));
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config = ProtocolConfig::from_json_str(r#"{ "deposit_fee": 100 }"#).unwrap();
        assert_eq!(config.deposit_fee, Amount::from_units(100));
        assert_eq!(config.cancel_cooldown, DEFAULT_CANCEL_COOLDOWN);
        assert!(!config.start_paused);
    }

    #[test]
    fn test_rejects_zero_cooldown() {
        let config = ProtocolConfig::default().with_cancel_cooldown(Duration::ZERO);
        assert!(matches!(config.validate(), Err(EscrowError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("protocol.json");
        std::fs::write(&path, r#"{ "min_wager": 5, "start_paused": true }"#).unwrap();

        let config = ProtocolConfig::load(&path).unwrap();
        assert_eq!(config.min_wager, Amount::from_units(5));
        assert!(config.start_paused);
    }
}
