use anyhow::Result;
use fork_choice::Blockchain;
use std::sync::Arc;
use tracing::{debug, info};

use super::service::BlockSyncService;
use crate::types::{ChainMessage, ChainMessageSource};

/// Single consumer of chain messages.
///
/// Messages are handled strictly one at a time, in arrival order, so the
/// queue is the only writer to the service when it is used this way.
pub struct BlockProcessor<C, R>
where
    C: Blockchain,
    R: ChainMessageSource<ChainMessage>,
{
    service: Arc<BlockSyncService<C>>,
    messages: R,
    stats: ProcessorStats,
}

/// Counters kept by the processor loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorStats {
    pub blocks: u64,
    pub rejected: u64,
    pub disconnects: u64,
}

impl<C, R> BlockProcessor<C, R>
where
    C: Blockchain,
    R: ChainMessageSource<ChainMessage>,
{
    pub fn new(service: Arc<BlockSyncService<C>>, messages: R) -> Self {
        Self {
            service,
            messages,
            stats: ProcessorStats::default(),
        }
    }

    pub fn service(&self) -> &Arc<BlockSyncService<C>> {
        &self.service
    }

    /// Drain messages until every sender is gone.
    pub async fn start(&mut self) -> Result<ProcessorStats> {
        while let Some(message) = self.messages.recv().await {
            self.handle(message);
        }

        info!(
            blocks = self.stats.blocks,
            rejected = self.stats.rejected,
            "Chain message channel closed"
        );

        Ok(self.stats)
    }

    fn handle(&mut self, message: ChainMessage) {
        debug!(%message, "Handling chain message");

        match message {
            ChainMessage::ProcessBlock { sender, block } => {
                self.stats.blocks += 1;
                // Rejections are logged by the service; one bad block never stops the loop
                if self.service.process_block(sender, block).is_err() {
                    self.stats.rejected += 1;
                }
            }
            ChainMessage::PeerDisconnected(peer) => {
                self.stats.disconnects += 1;
                self.service.node_information().remove_node(&peer);
                debug!(%peer, "Forgot blocks known by disconnected peer");
            }
        }
    }
}
