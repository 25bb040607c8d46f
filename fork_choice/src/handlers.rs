use crate::blockchain::{ConnectResult, Connection};
use crate::helpers::HeadUpdate;
use crate::store::*;
use containers::Block;
use tracing::{debug, info};

/// Connect `block` to the store at its parent and re-run fork choice.
///
/// Nothing is mutated unless the result is `Connected`.
pub fn on_block(store: &mut Store, block: Block) -> ConnectResult {
    let hash = block.hash();

    if store.blocks.contains_key(&hash) {
        return ConnectResult::AlreadyKnown;
    }

    if let Err(err) = block.validate() {
        return ConnectResult::Rejected(err);
    }

    let parent_weight = match store.blocks.get(&block.parent_hash()) {
        Some(parent) => {
            if let Err(err) = block.validate_parent(&parent.block) {
                return ConnectResult::Rejected(err);
            }
            parent.total_weight
        }
        None => return ConnectResult::ParentUnknown,
    };

    let number = block.number();
    let total_weight = parent_weight + store.rule.block_weight(&block.header);
    store.blocks.insert(hash, StoredBlock { block, total_weight });

    let update = update_head(store, hash);
    match update {
        HeadUpdate::Extended => {
            debug!(number = number.0, hash = %hash.short(), "Extended canonical chain");
        }
        HeadUpdate::Reorganized(reorg) => {
            info!(
                number = number.0,
                new_head = %reorg.new_head.short(),
                old_head = %reorg.old_head.short(),
                ancestor = %reorg.common_ancestor.short(),
                depth = reorg.depth,
                "Chain reorganized"
            );
        }
        HeadUpdate::Unchanged => {
            debug!(
                number = number.0,
                hash = %hash.short(),
                weight = %total_weight,
                "Connected block on side branch"
            );
        }
    }

    ConnectResult::Connected(Connection {
        hash,
        number,
        best: store.head == hash,
        reorg: update.reorg(),
    })
}
