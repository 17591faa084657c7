//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use rondo_types::{FederationMember, PoaParams, PublicKey};

use crate::NodeError;

/// One genesis federation member, as written in the config file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenesisMemberConfig {
    /// 64-char hex pubkey.
    pub pubkey: String,
    /// Whether the member participates in the multisig redeem script.
    #[serde(default)]
    pub multisig: bool,
}

impl GenesisMemberConfig {
    pub fn to_member(&self) -> Result<FederationMember, NodeError> {
        let pubkey = PublicKey::from_hex(&self.pubkey)
            .ok_or_else(|| NodeError::Config(format!("bad genesis pubkey: {}", self.pubkey)))?;
        Ok(FederationMember {
            pubkey,
            is_multisig: self.multisig,
        })
    }
}

/// Configuration for a Rondo governance node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Data directory for the poll log and governance snapshots.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Chain parameters; defaults to mainnet values.
    #[serde(default)]
    pub params: PoaParams,

    /// The federation roster at genesis.
    #[serde(default)]
    pub genesis_members: Vec<GenesisMemberConfig>,

    /// This node's own federation pubkey (hex), if it runs with one.
    #[serde(default)]
    pub own_key: Option<String>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./rondo_data")
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("NodeConfig is always serializable to TOML")
    }

    /// Parse the genesis roster.
    pub fn genesis_roster(&self) -> Result<Vec<FederationMember>, NodeError> {
        self.genesis_members.iter().map(|m| m.to_member()).collect()
    }

    /// Parse this node's own pubkey, if configured.
    pub fn parsed_own_key(&self) -> Result<Option<PublicKey>, NodeError> {
        match &self.own_key {
            None => Ok(None),
            Some(hex) => PublicKey::from_hex(hex)
                .map(Some)
                .ok_or_else(|| NodeError::Config(format!("bad own_key: {hex}"))),
        }
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            params: PoaParams::default(),
            genesis_members: Vec::new(),
            own_key: None,
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
