/// Block generation helpers for tests and local tooling.
///
/// Every generated block carries random `extra_data`, so two branches grown
/// from the same parent never produce the same hash.
use crate::{Block, BlockHeader, BlockNumber, Bytes32};

pub const DEFAULT_DIFFICULTY: u64 = 1;
pub const GENESIS_TIMESTAMP: u64 = 1_500_000_000;
pub const BLOCK_INTERVAL_SECS: u64 = 10;

#[derive(Debug, Clone, Copy)]
pub struct BlockGenerator {
    difficulty: u64,
}

impl Default for BlockGenerator {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
        }
    }
}

impl BlockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_difficulty(difficulty: u64) -> Self {
        Self { difficulty }
    }

    pub fn genesis(&self) -> Block {
        Block::new(BlockHeader {
            parent_hash: Bytes32::zero(),
            number: BlockNumber(0),
            difficulty: self.difficulty,
            timestamp: GENESIS_TIMESTAMP,
            extra_data: b"genesis".to_vec(),
        })
    }

    pub fn child_of(&self, parent: &Block) -> Block {
        Block::new(BlockHeader {
            parent_hash: parent.hash(),
            number: parent.number().next(),
            difficulty: self.difficulty,
            timestamp: parent.header.timestamp + BLOCK_INTERVAL_SECS,
            extra_data: rand::random::<[u8; 8]>().to_vec(),
        })
    }

    /// `size` blocks extending `parent`, ordered parent to tip.
    pub fn chain_from(&self, parent: &Block, size: usize) -> Vec<Block> {
        let mut blocks: Vec<Block> = Vec::with_capacity(size);
        for _ in 0..size {
            let next = self.child_of(blocks.last().unwrap_or(parent));
            blocks.push(next);
        }
        blocks
    }
}
