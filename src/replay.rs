use anyhow::{Context as _, Result};
use block_sync::ChainMessage;
use containers::Block;
use libp2p_identity::PeerId;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// One recorded block delivery. `peer` is a base58 peer id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delivery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer: Option<String>,
    pub block: Block,
}

impl Delivery {
    pub fn sender(&self) -> Result<Option<PeerId>> {
        self.peer
            .as_deref()
            .map(|peer| PeerId::from_str(peer).with_context(|| format!("invalid peer id {peer}")))
            .transpose()
    }

    pub fn into_message(self) -> Result<ChainMessage> {
        let sender = self.sender()?;
        Ok(ChainMessage::ProcessBlock {
            sender,
            block: self.block,
        })
    }
}

pub fn load_deliveries(path: &Path) -> Result<Vec<Delivery>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read replay file {}", path.display()))?;
    parse_deliveries(&contents)
        .with_context(|| format!("failed to parse replay file {}", path.display()))
}

pub fn parse_deliveries(contents: &str) -> Result<Vec<Delivery>> {
    Ok(serde_yaml::from_str(contents)?)
}
