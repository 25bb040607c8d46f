use crate::{BlockNodeInformation, BlockStore, BlockSyncService, SyncConfig};
use containers::{Block, BlockGenerator};
use fork_choice::{
    get_forkchoice_store, on_block, ForkChoiceRule, HeightRule, Store, TotalDifficultyRule,
};
use std::sync::Arc;

mod node_information_tests;
mod processor_tests;
mod states_tests;

/// Sync service over a height-rule chain of `size` blocks on top of genesis.
///
/// Returns the connected chain, genesis first, so `chain[n]` has number `n`.
pub(crate) fn service_of_size(
    size: usize,
    config: SyncConfig,
) -> (BlockSyncService<Store>, Vec<Block>) {
    service_with_rule(Arc::new(HeightRule), size, config)
}

/// Same as [`service_of_size`] but the heaviest chain by total difficulty wins.
pub(crate) fn total_difficulty_service_of_size(
    size: usize,
    config: SyncConfig,
) -> (BlockSyncService<Store>, Vec<Block>) {
    service_with_rule(Arc::new(TotalDifficultyRule), size, config)
}

fn service_with_rule(
    rule: Arc<dyn ForkChoiceRule>,
    size: usize,
    config: SyncConfig,
) -> (BlockSyncService<Store>, Vec<Block>) {
    let generator = BlockGenerator::new();
    let genesis = generator.genesis();
    let mut store = get_forkchoice_store(genesis.clone(), rule).expect("valid genesis");

    let mut chain = vec![genesis.clone()];
    chain.extend(generator.chain_from(&genesis, size));
    for block in &chain[1..] {
        assert!(on_block(&mut store, block.clone()).is_connected());
    }

    let node_information = Arc::new(BlockNodeInformation::with_max_blocks(
        config.max_known_blocks,
    ));
    let service = BlockSyncService::new(BlockStore::new(), store, node_information, config);
    (service, chain)
}
