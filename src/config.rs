use anyhow::{Context as _, Result};
use block_sync::SyncConfig;
use containers::{Block, BlockHeader, BlockNumber, Bytes32};
use fork_choice::ForkChoiceKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Node configuration loaded from YAML. Every field may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub fork_choice: ForkChoiceKind,
    pub genesis: GenesisConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisConfig {
    pub difficulty: u64,
    pub timestamp: u64,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            difficulty: 1,
            timestamp: 0,
        }
    }
}

impl GenesisConfig {
    pub fn block(&self) -> Block {
        Block::new(BlockHeader {
            parent_hash: Bytes32::zero(),
            number: BlockNumber(0),
            difficulty: self.difficulty,
            timestamp: self.timestamp,
            extra_data: Vec::new(),
        })
    }
}

impl NodeConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }
}
