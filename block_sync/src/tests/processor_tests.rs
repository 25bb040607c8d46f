use super::service_of_size;
use crate::{BlockProcessor, ChainMessage, ChainMessageSink, ProcessorStats, SyncConfig};
use anyhow::Result;
use containers::{Block, BlockGenerator};
use libp2p_identity::PeerId;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tokio::sync::mpsc;

async fn deliver<S: ChainMessageSink<ChainMessage>>(
    sink: &S,
    peer: PeerId,
    blocks: impl IntoIterator<Item = Block>,
) -> Result<()> {
    for block in blocks {
        sink.send(ChainMessage::block_from(peer, block)).await?;
    }
    Ok(())
}

#[tokio::test]
async fn test_processor_drains_queue_in_order() {
    let (service, chain) = service_of_size(4, SyncConfig::default());
    let service = Arc::new(service);
    let blocks = BlockGenerator::new().chain_from(&chain[4], 12);
    let (sender, receiver) = mpsc::unbounded_channel::<ChainMessage>();

    let mut processor = BlockProcessor::new(Arc::clone(&service), receiver);
    let handle = tokio::spawn(async move { processor.start().await });

    let peer = PeerId::random();
    deliver(&sender, peer, blocks.iter().rev().cloned()).await.unwrap();
    drop(sender);

    let stats = handle.await.unwrap().unwrap();

    assert_eq!(
        stats,
        ProcessorStats {
            blocks: 12,
            rejected: 0,
            disconnects: 0,
        }
    );
    assert_eq!(service.best_block(), blocks[11]);
    assert_eq!(service.pending_len(), 0);
    assert_eq!(service.node_information().get_blocks_by_node(&peer).len(), 12);
}

#[tokio::test]
async fn test_processor_survives_rejections_and_disconnects() {
    let (service, chain) = service_of_size(2, SyncConfig::default());
    let service = Arc::new(service);
    let good = BlockGenerator::new().child_of(&chain[2]);
    let forged = Block::from_parts(good.header.clone(), containers::Bytes32::from([7; 32]));
    let (sender, receiver) = mpsc::unbounded_channel::<ChainMessage>();

    let mut processor = BlockProcessor::new(Arc::clone(&service), receiver);
    let handle = tokio::spawn(async move { processor.start().await });

    let peer = PeerId::random();
    ChainMessageSink::send(&sender, ChainMessage::block_from(peer, forged))
        .await
        .unwrap();
    ChainMessageSink::send(&sender, ChainMessage::block_from(peer, good.clone()))
        .await
        .unwrap();
    ChainMessageSink::send(&sender, ChainMessage::PeerDisconnected(peer))
        .await
        .unwrap();
    ChainMessageSink::send(&sender, ChainMessage::local_block(good.clone()))
        .await
        .unwrap();
    drop(sender);

    let stats = handle.await.unwrap().unwrap();

    assert_eq!(stats.blocks, 3);
    assert_eq!(stats.rejected, 1);
    assert_eq!(stats.disconnects, 1);
    assert_eq!(service.best_block(), good);
    assert!(service.peers_for_block(&good.hash()).is_empty());
}

#[tokio::test]
async fn test_send_after_processor_stops_fails() {
    let (sender, receiver) = mpsc::unbounded_channel::<ChainMessage>();
    drop(receiver);

    let block = BlockGenerator::new().genesis();
    let result = ChainMessageSink::send(&sender, ChainMessage::local_block(block)).await;

    assert!(result.is_err());
}

#[test]
fn test_chain_message_display() {
    let block = BlockGenerator::new().genesis();
    let message = ChainMessage::local_block(block.clone());

    assert_eq!(
        message.to_string(),
        format!("ProcessBlock(number=0, hash={})", block.hash().short())
    );
}
