use crate::handlers::on_block;
use crate::helpers::Reorg;
use crate::store::Store;
use crate::weight::ChainWeight;
use containers::{Block, BlockError, BlockNumber, Bytes32};

/// Block accepted onto some branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub hash: Bytes32,
    pub number: BlockNumber,
    /// The block is the head once the connect returns.
    pub best: bool,
    pub reorg: Option<Reorg>,
}

/// Outcome of appending a block to the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectResult {
    Connected(Connection),
    AlreadyKnown,
    ParentUnknown,
    Rejected(BlockError),
}

impl ConnectResult {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectResult::Connected(_))
    }
}

/// The authoritative chain that synced blocks are appended to.
///
/// Implementations apply fork choice on every successful connect, so
/// `best_block` always reflects everything connected so far.
pub trait Blockchain: Send {
    fn try_connect(&mut self, block: Block) -> ConnectResult;

    fn best_block(&self) -> &Block;

    /// Canonical block at `number`, if the canonical chain reaches it.
    fn block_by_number(&self, number: BlockNumber) -> Option<&Block>;

    /// Connected block on any branch.
    fn block_by_hash(&self, hash: &Bytes32) -> Option<&Block>;

    fn total_weight(&self, hash: &Bytes32) -> Option<ChainWeight>;

    fn contains(&self, hash: &Bytes32) -> bool {
        self.block_by_hash(hash).is_some()
    }

    fn is_canonical(&self, hash: &Bytes32) -> bool {
        self.block_by_hash(hash)
            .and_then(|block| self.block_by_number(block.number()))
            .is_some_and(|canonical| canonical.hash() == *hash)
    }
}

impl Blockchain for Store {
    fn try_connect(&mut self, block: Block) -> ConnectResult {
        on_block(self, block)
    }

    fn best_block(&self) -> &Block {
        self.head_block()
    }

    fn block_by_number(&self, number: BlockNumber) -> Option<&Block> {
        self.canonical_block(number)
    }

    fn block_by_hash(&self, hash: &Bytes32) -> Option<&Block> {
        self.get(hash).map(|stored| &stored.block)
    }

    fn total_weight(&self, hash: &Bytes32) -> Option<ChainWeight> {
        self.get(hash).map(|stored| stored.total_weight)
    }

    fn contains(&self, hash: &Bytes32) -> bool {
        self.blocks.contains_key(hash)
    }

    fn is_canonical(&self, hash: &Bytes32) -> bool {
        Store::is_canonical(self, hash)
    }
}
