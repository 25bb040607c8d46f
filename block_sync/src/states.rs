/// Where a block stands relative to the sync service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockState {
    /// Never delivered, or delivered and later evicted from the pending pool.
    #[default]
    Unseen,

    /// Buffered in the pending pool; its parent is not connected yet.
    Pending,

    /// Accepted by the chain on some branch, but not the current head.
    Connected,

    /// Connected and the current head of the canonical chain.
    Best,
}

impl BlockState {
    /// Whether the chain has accepted the block.
    pub fn is_connected(&self) -> bool {
        matches!(self, BlockState::Connected | BlockState::Best)
    }
}
