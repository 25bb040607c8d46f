//! Common test utilities for fork choice tests

#![allow(dead_code)]

use containers::{Block, BlockGenerator};
use fork_choice::*;
use std::sync::Arc;

/// Store with a fresh genesis under the height rule.
pub fn height_store() -> Store {
    let genesis = BlockGenerator::new().genesis();
    get_forkchoice_store(genesis, Arc::new(HeightRule)).expect("valid genesis")
}

/// Store with `size` canonical blocks on top of genesis.
pub fn store_of_size(size: usize) -> Store {
    let mut store = height_store();
    let genesis = store.head_block().clone();
    for block in BlockGenerator::new().chain_from(&genesis, size) {
        assert!(on_block(&mut store, block).is_connected());
    }
    store
}

pub fn connect_all(store: &mut Store, blocks: &[Block]) -> Vec<ConnectResult> {
    blocks
        .iter()
        .map(|block| on_block(store, block.clone()))
        .collect()
}
