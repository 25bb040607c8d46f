//! Pending pool for blocks that cannot be linked to the chain yet.
//!
//! Blocks whose parent is not connected wait here until the parent arrives.
//! The pool is indexed by hash, by parent hash (for the cascade that drains
//! children once a parent connects) and by number (for range release).

use containers::{Block, BlockNumber, Bytes32};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Instant;

/// A buffered block and when it was received.
#[derive(Debug, Clone)]
struct PendingEntry {
    block: Block,
    received_at: Instant,
    seq: u64,
}

/// In-memory holding area for orphan blocks.
///
/// A block lives here only while its parent is unknown to the chain. Saving
/// an already buffered hash and removing an absent one are both no-ops.
#[derive(Debug, Default, Clone)]
pub struct BlockStore {
    /// All buffered blocks, indexed by hash
    blocks: HashMap<Bytes32, PendingEntry>,

    /// Children waiting on each parent (parent hash -> child hashes)
    by_parent: HashMap<Bytes32, HashSet<Bytes32>>,

    /// Buffered hashes by block number
    by_number: BTreeMap<BlockNumber, HashSet<Bytes32>>,

    /// Arrival order (sequence -> hash), oldest first
    arrivals: BTreeMap<u64, Bytes32>,

    next_seq: u64,
}

impl BlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer a block. Returns false if the hash was already buffered.
    pub fn save_block(&mut self, block: Block) -> bool {
        let hash = block.hash();
        if self.blocks.contains_key(&hash) {
            return false;
        }

        let seq = self.next_seq;
        self.next_seq += 1;

        self.by_parent
            .entry(block.parent_hash())
            .or_default()
            .insert(hash);
        self.by_number.entry(block.number()).or_default().insert(hash);
        self.arrivals.insert(seq, hash);
        self.blocks.insert(
            hash,
            PendingEntry {
                block,
                received_at: Instant::now(),
                seq,
            },
        );

        true
    }

    /// Remove a block and all of its index entries.
    pub fn remove_block(&mut self, hash: &Bytes32) -> Option<Block> {
        let entry = self.blocks.remove(hash)?;
        let block = entry.block;

        if let Some(children) = self.by_parent.get_mut(&block.parent_hash()) {
            children.remove(hash);
            if children.is_empty() {
                self.by_parent.remove(&block.parent_hash());
            }
        }

        if let Some(hashes) = self.by_number.get_mut(&block.number()) {
            hashes.remove(hash);
            if hashes.is_empty() {
                self.by_number.remove(&block.number());
            }
        }

        self.arrivals.remove(&entry.seq);

        Some(block)
    }

    pub fn has_block(&self, hash: &Bytes32) -> bool {
        self.blocks.contains_key(hash)
    }

    pub fn get_block_by_hash(&self, hash: &Bytes32) -> Option<&Block> {
        self.blocks.get(hash).map(|entry| &entry.block)
    }

    /// Buffered blocks whose parent hash is `parent`, ordered by number then hash.
    pub fn get_blocks_by_parent_hash(&self, parent: &Bytes32) -> Vec<Block> {
        self.by_parent
            .get(parent)
            .map(|children| self.collect_sorted(children.iter()))
            .unwrap_or_default()
    }

    /// Buffered children of any of `parents`.
    pub fn get_children_of(&self, parents: &HashSet<Bytes32>) -> Vec<Block> {
        let children = parents
            .iter()
            .filter_map(|parent| self.by_parent.get(parent))
            .flatten();
        self.collect_sorted(children)
    }

    pub fn get_blocks_by_number(&self, number: BlockNumber) -> Vec<Block> {
        self.by_number
            .get(&number)
            .map(|hashes| self.collect_sorted(hashes.iter()))
            .unwrap_or_default()
    }

    /// Parent hashes that buffered blocks are waiting on and that are not
    /// buffered themselves. These are the ancestors worth requesting; the
    /// zero hash is never one.
    pub fn missing_parents(&self) -> Vec<Bytes32> {
        let mut missing: Vec<Bytes32> = self
            .by_parent
            .keys()
            .filter(|parent| !parent.is_zero() && !self.blocks.contains_key(parent))
            .copied()
            .collect();
        missing.sort();
        missing
    }

    /// Lowest buffered block number.
    pub fn minimal_height(&self) -> Option<BlockNumber> {
        self.by_number.keys().next().copied()
    }

    /// Highest buffered block number.
    pub fn maximum_height(&self) -> Option<BlockNumber> {
        self.by_number.keys().next_back().copied()
    }

    /// Remove every block numbered within `from..=to`. Returns removed hashes.
    pub fn release_range(&mut self, from: BlockNumber, to: BlockNumber) -> Vec<Bytes32> {
        if from > to {
            return Vec::new();
        }

        let hashes: Vec<Bytes32> = self
            .by_number
            .range(from..=to)
            .flat_map(|(_, hashes)| hashes.iter().copied())
            .collect();

        for hash in &hashes {
            self.remove_block(hash);
        }

        hashes
    }

    /// Remove blocks received before `cutoff`. Returns removed hashes.
    pub fn evict_received_before(&mut self, cutoff: Instant) -> Vec<Bytes32> {
        let expired: Vec<Bytes32> = self
            .blocks
            .iter()
            .filter(|(_, entry)| entry.received_at < cutoff)
            .map(|(hash, _)| *hash)
            .collect();

        for hash in &expired {
            self.remove_block(hash);
        }

        expired
    }

    /// Evict the oldest received blocks until at most `max_len` remain.
    pub fn evict_oldest(&mut self, max_len: usize) -> Vec<Bytes32> {
        let mut evicted = Vec::new();
        while self.blocks.len() > max_len {
            let Some((_, &hash)) = self.arrivals.first_key_value() else {
                break;
            };
            self.remove_block(&hash);
            evicted.push(hash);
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.by_parent.clear();
        self.by_number.clear();
        self.arrivals.clear();
    }

    fn collect_sorted<'a>(&self, hashes: impl Iterator<Item = &'a Bytes32>) -> Vec<Block> {
        let mut blocks: Vec<Block> = hashes
            .filter_map(|hash| self.get_block_by_hash(hash))
            .cloned()
            .collect();
        blocks.sort_by_key(|block| (block.number(), block.hash()));
        blocks.dedup_by_key(|block| block.hash());
        blocks
    }
}
