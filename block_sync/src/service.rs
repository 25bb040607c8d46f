use containers::{Block, BlockError, BlockNumber, Bytes32};
use fork_choice::{Blockchain, ConnectResult, Connection, Reorg};
use libp2p_identity::PeerId;
use metrics::SharedMetrics;
use parking_lot::Mutex;
/// Block sync service.
///
/// Consumes blocks delivered by peers in any order and drives them into the
/// chain. Blocks whose parent is unknown wait in the pending pool; once a
/// parent connects, every buffered descendant is connected in the same call.
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::{
    block_store::BlockStore, config::SyncConfig, node_information::BlockNodeInformation,
    states::BlockState,
};

/// What happened to the delivered block itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Already part of the chain; nothing changed.
    AlreadyConnected,
    /// Buffered until `missing_parent` connects.
    Pending { missing_parent: Bytes32 },
    /// Orphan too far above the best block; dropped without buffering.
    TooAdvanced,
    /// Connected; `best` tells whether it was the head right after connecting.
    Connected { best: bool },
}

impl ProcessOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessOutcome::AlreadyConnected => "already_connected",
            ProcessOutcome::Pending { .. } => "pending",
            ProcessOutcome::TooAdvanced => "too_advanced",
            ProcessOutcome::Connected { .. } => "connected",
        }
    }
}

/// Everything one `process_block` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    pub hash: Bytes32,
    pub outcome: ProcessOutcome,
    /// Blocks connected by this call, in connect order (delivered block first).
    pub connected: Vec<Bytes32>,
    pub reorgs: Vec<Reorg>,
    /// Pending blocks dropped by pruning at the end of the call.
    pub evicted: Vec<Bytes32>,
    /// Best block once the call returned.
    pub best: Bytes32,
}

impl ProcessResult {
    fn new(hash: Bytes32, outcome: ProcessOutcome, best: Bytes32) -> Self {
        Self {
            hash,
            outcome,
            connected: Vec::new(),
            reorgs: Vec::new(),
            evicted: Vec::new(),
            best,
        }
    }

    fn record(&mut self, connection: Connection) {
        self.connected.push(connection.hash);
        self.reorgs.extend(connection.reorg);
    }
}

/// Chain and pending pool: the single mutual-exclusion domain.
struct SyncCore<C> {
    blockchain: C,
    store: BlockStore,
    processed_blocks: u64,
    connected_blocks: u64,
    evicted_blocks: u64,
}

impl<C: Blockchain> SyncCore<C> {
    fn block_state(&self, hash: &Bytes32) -> BlockState {
        if self.blockchain.best_block().hash() == *hash {
            BlockState::Best
        } else if self.blockchain.contains(hash) {
            BlockState::Connected
        } else if self.store.has_block(hash) {
            BlockState::Pending
        } else {
            BlockState::Unseen
        }
    }
}

/// Pending pool entries dropped by one pruning pass, by reason.
#[derive(Debug, Default)]
struct Evictions {
    depth: Vec<Bytes32>,
    age: Vec<Bytes32>,
    count: Vec<Bytes32>,
}

impl Evictions {
    fn by_reason(&self) -> [(&'static str, &[Bytes32]); 3] {
        [
            ("depth", self.depth.as_slice()),
            ("age", self.age.as_slice()),
            ("count", self.count.as_slice()),
        ]
    }

    fn into_hashes(self) -> Vec<Bytes32> {
        let mut hashes = self.depth;
        hashes.extend(self.age);
        hashes.extend(self.count);
        hashes
    }
}

/// Sync service coordinating the chain, the pending pool and peer knowledge.
///
/// `process_block` holds one lock over the chain and the pending pool for
/// the whole connect and cascade, so concurrent callers observe each call
/// as a single step. Peer knowledge has its own lock.
pub struct BlockSyncService<C: Blockchain> {
    core: Mutex<SyncCore<C>>,
    node_information: Arc<BlockNodeInformation>,
    config: SyncConfig,
    metrics: Option<SharedMetrics>,
}

impl<C: Blockchain> BlockSyncService<C> {
    pub fn new(
        store: BlockStore,
        blockchain: C,
        node_information: Arc<BlockNodeInformation>,
        config: SyncConfig,
    ) -> Self {
        Self {
            core: Mutex::new(SyncCore {
                blockchain,
                store,
                processed_blocks: 0,
                connected_blocks: 0,
                evicted_blocks: 0,
            }),
            node_information,
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: SharedMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Process a block delivered by `sender` (or produced locally if `None`).
    ///
    /// Structurally invalid blocks, and blocks the chain rejects, return an
    /// error without touching the chain or the pending pool. Duplicates and
    /// orphans are not errors.
    pub fn process_block(
        &self,
        sender: Option<PeerId>,
        block: Block,
    ) -> Result<ProcessResult, BlockError> {
        let started = Instant::now();
        let hash = block.hash();
        let number = block.number();

        if let Err(err) = block.validate() {
            warn!(number = number.0, hash = %hash.short(), error = %err, "Rejected malformed block");
            self.record_rejection();
            return Err(err);
        }

        let mut core = self.core.lock();
        core.processed_blocks += 1;

        if core.blockchain.contains(&hash) {
            debug!(number = number.0, hash = %hash.short(), "Block already connected");
            let best = core.blockchain.best_block().hash();
            drop(core);
            let result = ProcessResult::new(hash, ProcessOutcome::AlreadyConnected, best);
            self.record_metrics(&result, None, started);
            return Ok(result);
        }

        if let Some(peer) = sender {
            self.node_information.add_block_to_node(hash, peer);
        }

        let best_before = core.blockchain.best_block().hash();

        let mut result = match core.blockchain.try_connect(block.clone()) {
            ConnectResult::Connected(connection) => {
                // Re-delivery of a block that was waiting on its parent
                core.store.remove_block(&hash);
                let mut result = ProcessResult::new(
                    hash,
                    ProcessOutcome::Connected {
                        best: connection.best,
                    },
                    best_before,
                );
                result.record(connection);
                self.connect_descendants(&mut core, hash, &mut result);
                result
            }
            ConnectResult::AlreadyKnown => {
                ProcessResult::new(hash, ProcessOutcome::AlreadyConnected, best_before)
            }
            ConnectResult::ParentUnknown if block.is_genesis() => {
                // A genesis other than ours has no ancestor to wait for
                let err = BlockError::InvalidGenesis { hash, number };
                warn!(hash = %hash.short(), "Rejected foreign genesis block");
                drop(core);
                self.record_rejection();
                return Err(err);
            }
            ConnectResult::ParentUnknown => {
                let outcome = self.buffer(&mut core, block);
                ProcessResult::new(hash, outcome, best_before)
            }
            ConnectResult::Rejected(err) => {
                warn!(number = number.0, hash = %hash.short(), error = %err, "Chain rejected block");
                drop(core);
                self.record_rejection();
                return Err(err);
            }
        };

        result.evicted = self.prune(&mut core).into_hashes();
        core.evicted_blocks += result.evicted.len() as u64;
        core.connected_blocks += result.connected.len() as u64;

        let best = core.blockchain.best_block();
        result.best = best.hash();
        let best_number = best.number();
        let pending = core.store.len();
        drop(core);

        if result.best != best_before {
            info!(
                number = best_number.0,
                hash = %result.best.short(),
                connected = result.connected.len(),
                "New best block"
            );
        }

        self.record_metrics(&result, Some((best_number, pending)), started);

        Ok(result)
    }

    /// Connect every pending descendant of `root`, breadth first.
    ///
    /// A pending block the chain rejects is skipped and stays in the pool.
    fn connect_descendants(&self, core: &mut SyncCore<C>, root: Bytes32, result: &mut ProcessResult) {
        let mut queue = VecDeque::from([root]);

        while let Some(parent) = queue.pop_front() {
            for child in core.store.get_blocks_by_parent_hash(&parent) {
                let child_hash = child.hash();
                match core.blockchain.try_connect(child) {
                    ConnectResult::Connected(connection) => {
                        core.store.remove_block(&child_hash);
                        debug!(
                            number = connection.number.0,
                            hash = %child_hash.short(),
                            best = connection.best,
                            "Connected pending block"
                        );
                        result.record(connection);
                        queue.push_back(child_hash);
                    }
                    ConnectResult::AlreadyKnown => {
                        core.store.remove_block(&child_hash);
                    }
                    ConnectResult::ParentUnknown => {
                        debug!(hash = %child_hash.short(), parent = %parent.short(), "Pending block parent vanished");
                    }
                    ConnectResult::Rejected(err) => {
                        warn!(
                            hash = %child_hash.short(),
                            error = %err,
                            "Chain rejected pending block, leaving it pending"
                        );
                    }
                }
            }
        }
    }

    /// Buffer an orphan unless it is too far ahead of the best block.
    fn buffer(&self, core: &mut SyncCore<C>, block: Block) -> ProcessOutcome {
        let hash = block.hash();
        let number = block.number();
        let missing_parent = block.parent_hash();
        let best_number = core.blockchain.best_block().number();

        // Already buffered blocks stay pending whatever the best block did since
        if core.store.has_block(&hash) {
            return ProcessOutcome::Pending { missing_parent };
        }

        if let Some(distance) = self.config.max_distance_ahead {
            if number > best_number.saturating_add(distance) {
                debug!(
                    number = number.0,
                    best = best_number.0,
                    hash = %hash.short(),
                    "Dropped block too far ahead of best"
                );
                return ProcessOutcome::TooAdvanced;
            }
        }

        if core.store.save_block(block) {
            debug!(
                number = number.0,
                hash = %hash.short(),
                parent = %missing_parent.short(),
                pending = core.store.len(),
                "Buffered orphan block"
            );
        }

        ProcessOutcome::Pending { missing_parent }
    }

    /// Apply the configured pending pool bounds.
    fn prune(&self, core: &mut SyncCore<C>) -> Evictions {
        let mut evictions = Evictions::default();

        if let Some(depth) = self.config.max_depth_below_best {
            let best_number = core.blockchain.best_block().number();
            if let Some(limit) = best_number.0.checked_sub(depth) {
                evictions.depth = core.store.release_range(BlockNumber(0), BlockNumber(limit));
            }
        }

        if let Some(age) = self.config.max_pending_age() {
            if let Some(cutoff) = Instant::now().checked_sub(age) {
                evictions.age = core.store.evict_received_before(cutoff);
            }
        }

        if let Some(max_len) = self.config.max_pending_blocks {
            evictions.count = core.store.evict_oldest(max_len);
        }

        for (reason, hashes) in evictions.by_reason() {
            if hashes.is_empty() {
                continue;
            }
            warn!(
                reason,
                evicted = hashes.len(),
                pending = core.store.len(),
                "Evicted pending blocks"
            );
            if let Some(metrics) = &self.metrics {
                metrics.inc_evicted_blocks(reason, hashes.len() as u64);
            }
        }

        evictions
    }

    fn record_rejection(&self) {
        if let Some(metrics) = &self.metrics {
            metrics.inc_blocks_processed("rejected");
        }
    }

    fn record_metrics(
        &self,
        result: &ProcessResult,
        chain: Option<(BlockNumber, usize)>,
        started: Instant,
    ) {
        let Some(metrics) = &self.metrics else {
            return;
        };

        metrics.inc_blocks_processed(result.outcome.as_str());
        metrics.observe_block_processing_time(started.elapsed().as_secs_f64());
        if let Some((best_number, pending)) = chain {
            metrics.set_best_block_number(best_number.0 as i64);
            metrics.set_pending_blocks(pending as i64);
        }
        for reorg in &result.reorgs {
            metrics.inc_reorgs();
            metrics.observe_reorg_depth(reorg.depth as f64);
        }
    }

    pub fn best_block(&self) -> Block {
        self.core.lock().blockchain.best_block().clone()
    }

    pub fn block_by_number(&self, number: BlockNumber) -> Option<Block> {
        self.core.lock().blockchain.block_by_number(number).cloned()
    }

    pub fn block_by_hash(&self, hash: &Bytes32) -> Option<Block> {
        self.core.lock().blockchain.block_by_hash(hash).cloned()
    }

    pub fn block_state(&self, hash: &Bytes32) -> BlockState {
        self.core.lock().block_state(hash)
    }

    pub fn has_pending(&self, hash: &Bytes32) -> bool {
        self.core.lock().store.has_block(hash)
    }

    pub fn pending_len(&self) -> usize {
        self.core.lock().store.len()
    }

    /// Ancestors the pending pool is waiting on.
    pub fn missing_parents(&self) -> Vec<Bytes32> {
        self.core.lock().store.missing_parents()
    }

    pub fn peers_for_block(&self, hash: &Bytes32) -> HashSet<PeerId> {
        self.node_information.get_nodes_by_block(hash)
    }

    pub fn node_information(&self) -> &Arc<BlockNodeInformation> {
        &self.node_information
    }

    /// Run `f` against the chain while holding the sync lock.
    pub fn with_blockchain<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        f(&self.core.lock().blockchain)
    }

    /// Get sync statistics.
    pub fn get_stats(&self) -> SyncStats {
        let core = self.core.lock();
        let best = core.blockchain.best_block();

        SyncStats {
            best_number: best.number(),
            best_hash: best.hash(),
            pending_blocks: core.store.len(),
            min_pending_number: core.store.minimal_height(),
            max_pending_number: core.store.maximum_height(),
            processed_blocks: core.processed_blocks,
            connected_blocks: core.connected_blocks,
            evicted_blocks: core.evicted_blocks,
            known_blocks: self.node_information.len(),
        }
    }
}

/// Statistics about the sync service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    pub best_number: BlockNumber,
    pub best_hash: Bytes32,
    pub pending_blocks: usize,
    pub min_pending_number: Option<BlockNumber>,
    pub max_pending_number: Option<BlockNumber>,
    /// Structurally valid deliveries, duplicates included
    pub processed_blocks: u64,
    pub connected_blocks: u64,
    pub evicted_blocks: u64,
    pub known_blocks: usize,
}
