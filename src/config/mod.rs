//! # Configuration Management Module
//!
//! bbsnet reads one TOML file describing this BBS, its logging, and the
//! networks it belongs to. The packet core never reads the configuration
//! itself; callers look a network up here and pass it down.
//!
//! ## Configuration File Format
//!
//! ```toml
//! [bbs]
//! name = "My BBS"
//! sysop = "SYSOP"
//!
//! [logging]
//! level = "info"
//! file = "bbsnet.log"
//!
//! [[networks]]
//! name = "testnet"
//! dir = "./data/testnet"
//! node = 1
//! app_id = 2
//! max_node = 32767
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bbsnet::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let net = config.network("testnet").expect("configured");
//!     println!("node {} stages into {}", net.node, net.dir.display());
//!     Ok(())
//! }
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::fs;

use crate::net::Network;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BbsConfig {
    pub name: String,
    pub sysop: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bbs: BbsConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub networks: Vec<Network>,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;
        config.validate()?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject duplicate network names and node numbers outside a network's range.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for net in &self.networks {
            if !names.insert(net.name.to_lowercase()) {
                return Err(anyhow!("Duplicate network name '{}'", net.name));
            }
            if net.node == 0 || net.node > net.max_node {
                return Err(anyhow!(
                    "Network '{}': node {} outside 1..={}",
                    net.name,
                    net.node,
                    net.max_node
                ));
            }
        }
        Ok(())
    }

    /// Look a network up by name, ignoring case.
    pub fn network(&self, name: &str) -> Option<&Network> {
        self.networks.iter().find(|n| n.name.eq_ignore_ascii_case(name))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bbs: BbsConfig {
                name: "bbsnet Station".to_string(),
                sysop: "SYSOP".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("bbsnet.log".to_string()),
            },
            networks: vec![Network::new("testnet", "./data/testnet", 1)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.networks, config.networks);
        assert!(back.validate().is_ok());
    }

    #[test]
    fn test_network_defaults_fill_in() {
        let text = r#"
            [bbs]
            name = "Test"
            sysop = "SYSOP"

            [logging]
            level = "debug"

            [[networks]]
            name = "FidoLike"
            dir = "/var/bbs/fidolike"
            node = 12
        "#;
        let config: Config = toml::from_str(text).unwrap();
        let net = config.network("fidolike").unwrap();
        assert_eq!(net.node, 12);
        assert_eq!(net.app_id, 2);
        assert_eq!(net.max_node, 32767);
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_duplicate_and_out_of_range_rejected() {
        let mut config = Config::default();
        config.networks.push(Network::new("TESTNET", "/tmp/other", 2));
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.networks[0].node = 0;
        assert!(config.validate().is_err());
    }
}
