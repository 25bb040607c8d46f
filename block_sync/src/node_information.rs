use containers::Bytes32;
use libp2p_identity::PeerId;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Which peers are known to have which blocks.
///
/// Written on every delivery that names a sender and read by whatever picks
/// a peer to ask for a missing ancestor. Has its own lock, separate from the
/// chain and pending pool, so lookups never wait on a running cascade.
#[derive(Debug, Default)]
pub struct BlockNodeInformation {
    max_blocks: Option<usize>,
    table: RwLock<KnowledgeTable>,
}

#[derive(Debug, Default)]
struct KnowledgeTable {
    nodes_by_block: HashMap<Bytes32, KnownBlock>,
    blocks_by_node: HashMap<PeerId, HashSet<Bytes32>>,
    /// Last announcement sequence -> hash, least recent first
    recency: BTreeMap<u64, Bytes32>,
    next_seq: u64,
}

#[derive(Debug, Default)]
struct KnownBlock {
    nodes: HashSet<PeerId>,
    seq: u64,
}

impl BlockNodeInformation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table that forgets the least recently announced hashes past `max_blocks`.
    pub fn with_max_blocks(max_blocks: Option<usize>) -> Self {
        Self {
            max_blocks,
            table: RwLock::default(),
        }
    }

    /// Record that `node` has the block `hash`. Idempotent.
    pub fn add_block_to_node(&self, hash: Bytes32, node: PeerId) {
        let mut table = self.table.write();
        let seq = table.next_seq;
        table.next_seq += 1;

        let known = table.nodes_by_block.entry(hash).or_default();
        let previous_seq = std::mem::replace(&mut known.seq, seq);
        let is_new_hash = known.nodes.is_empty();
        known.nodes.insert(node);

        if !is_new_hash {
            table.recency.remove(&previous_seq);
        }
        table.recency.insert(seq, hash);
        table.blocks_by_node.entry(node).or_default().insert(hash);

        if let Some(max_blocks) = self.max_blocks {
            while table.nodes_by_block.len() > max_blocks {
                let Some((_, oldest)) = table.recency.pop_first() else {
                    break;
                };
                table.forget_block(&oldest);
            }
        }
    }

    /// Peers known to have `hash`; empty if none.
    pub fn get_nodes_by_block(&self, hash: &Bytes32) -> HashSet<PeerId> {
        self.table
            .read()
            .nodes_by_block
            .get(hash)
            .map(|known| known.nodes.clone())
            .unwrap_or_default()
    }

    pub fn get_blocks_by_node(&self, node: &PeerId) -> HashSet<Bytes32> {
        self.table
            .read()
            .blocks_by_node
            .get(node)
            .cloned()
            .unwrap_or_default()
    }

    /// Drop everything recorded for a disconnected peer.
    pub fn remove_node(&self, node: &PeerId) {
        let mut table = self.table.write();
        let Some(hashes) = table.blocks_by_node.remove(node) else {
            return;
        };

        for hash in hashes {
            let Some(known) = table.nodes_by_block.get_mut(&hash) else {
                continue;
            };
            known.nodes.remove(node);
            if known.nodes.is_empty() {
                let seq = known.seq;
                table.nodes_by_block.remove(&hash);
                table.recency.remove(&seq);
            }
        }
    }

    /// Number of block hashes tracked.
    pub fn len(&self) -> usize {
        self.table.read().nodes_by_block.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.read().nodes_by_block.is_empty()
    }
}

impl KnowledgeTable {
    /// Remove a hash whose recency entry was already taken.
    fn forget_block(&mut self, hash: &Bytes32) {
        let Some(known) = self.nodes_by_block.remove(hash) else {
            return;
        };
        for node in known.nodes {
            if let Some(hashes) = self.blocks_by_node.get_mut(&node) {
                hashes.remove(hash);
                if hashes.is_empty() {
                    self.blocks_by_node.remove(&node);
                }
            }
        }
    }
}
