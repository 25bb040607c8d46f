use anyhow::{anyhow, Result};
use async_trait::async_trait;
use containers::Block;
use libp2p_identity::PeerId;
use std::fmt::Display;
use tokio::sync::mpsc;

/// Input to the block processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainMessage {
    ProcessBlock {
        sender: Option<PeerId>,
        block: Block,
    },
    PeerDisconnected(PeerId),
}

impl ChainMessage {
    pub fn block_from(sender: PeerId, block: Block) -> Self {
        ChainMessage::ProcessBlock {
            sender: Some(sender),
            block,
        }
    }

    /// Block with no announcing peer, e.g. produced locally or read from a file.
    pub fn local_block(block: Block) -> Self {
        ChainMessage::ProcessBlock {
            sender: None,
            block,
        }
    }
}

impl Display for ChainMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainMessage::ProcessBlock { block, .. } => {
                write!(
                    f,
                    "ProcessBlock(number={}, hash={})",
                    block.number(),
                    block.hash().short()
                )
            }
            ChainMessage::PeerDisconnected(peer) => write!(f, "PeerDisconnected({peer})"),
        }
    }
}

#[async_trait]
pub trait ChainMessageSink<M>: Send + Sync + Clone {
    async fn send(&self, message: M) -> Result<()>;
}

#[async_trait]
impl<M: Send + 'static> ChainMessageSink<M> for mpsc::UnboundedSender<M> {
    async fn send(&self, message: M) -> Result<()> {
        mpsc::UnboundedSender::send(self, message)
            .map_err(|err| anyhow!("failed to send message to chain: {err}"))
    }
}

#[async_trait]
pub trait ChainMessageSource<T>: Send {
    async fn recv(&mut self) -> Option<T>;
}

#[async_trait]
impl<T: Send + 'static> ChainMessageSource<T> for mpsc::UnboundedReceiver<T> {
    async fn recv(&mut self) -> Option<T> {
        mpsc::UnboundedReceiver::recv(self).await
    }
}
