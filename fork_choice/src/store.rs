use crate::helpers::{branch_to_ancestor, find_common_ancestor, HeadUpdate, Reorg};
use crate::weight::{ChainWeight, ForkChoiceRule};
use containers::{Block, BlockError, BlockNumber, Bytes32};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

pub type Root = Bytes32;

/// A connected block together with the accumulated weight of its branch.
#[derive(Debug, Clone)]
pub struct StoredBlock {
    pub block: Block,
    pub total_weight: ChainWeight,
}

/// In-memory chain: every connected block on every branch, the current head,
/// and a number -> hash index over the canonical chain (genesis to head).
#[derive(Debug, Clone)]
pub struct Store {
    pub head: Root,
    pub genesis: Root,
    pub blocks: HashMap<Root, StoredBlock>,
    pub canonical: BTreeMap<BlockNumber, Root>,
    pub rule: Arc<dyn ForkChoiceRule>,
}

/// Initialize a store anchored at `genesis`.
pub fn get_forkchoice_store(
    genesis: Block,
    rule: Arc<dyn ForkChoiceRule>,
) -> Result<Store, BlockError> {
    genesis.validate()?;
    if !genesis.is_genesis() {
        return Err(BlockError::InvalidGenesis {
            hash: genesis.hash(),
            number: genesis.number(),
        });
    }

    let root = genesis.hash();
    let total_weight = rule.block_weight(&genesis.header);

    Ok(Store {
        head: root,
        genesis: root,
        canonical: [(genesis.number(), root)].into(),
        blocks: [(
            root,
            StoredBlock {
                block: genesis,
                total_weight,
            },
        )]
        .into(),
        rule,
    })
}

impl Store {
    pub fn head_block(&self) -> &Block {
        &self.blocks[&self.head].block
    }

    pub fn head_weight(&self) -> ChainWeight {
        self.blocks[&self.head].total_weight
    }

    pub fn head_number(&self) -> BlockNumber {
        self.head_block().number()
    }

    pub fn get(&self, root: &Root) -> Option<&StoredBlock> {
        self.blocks.get(root)
    }

    pub fn canonical_block(&self, number: BlockNumber) -> Option<&Block> {
        self.canonical
            .get(&number)
            .and_then(|root| self.blocks.get(root))
            .map(|stored| &stored.block)
    }

    pub fn is_canonical(&self, root: &Root) -> bool {
        self.blocks
            .get(root)
            .is_some_and(|stored| self.canonical.get(&stored.block.number()) == Some(root))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Decide whether `candidate`, a freshly connected block, becomes the head.
///
/// A block on top of the head always extends it. Anything else must carry
/// strictly more accumulated weight than the head; ties keep the incumbent.
pub fn update_head(store: &mut Store, candidate: Root) -> HeadUpdate {
    let Some((parent, number, weight)) = store.blocks.get(&candidate).map(|stored| {
        (
            stored.block.parent_hash(),
            stored.block.number(),
            stored.total_weight,
        )
    }) else {
        return HeadUpdate::Unchanged;
    };

    if parent == store.head {
        store.canonical.insert(number, candidate);
        store.head = candidate;
        return HeadUpdate::Extended;
    }

    if weight <= store.head_weight() {
        return HeadUpdate::Unchanged;
    }

    HeadUpdate::Reorganized(switch_to_branch(store, candidate))
}

fn switch_to_branch(store: &mut Store, new_head: Root) -> Reorg {
    let old_head = store.head;
    let ancestor = find_common_ancestor(store, old_head, new_head).unwrap_or(store.genesis);
    let ancestor_number = store.blocks[&ancestor].block.number();
    let old_number = store.head_number();

    let branch = branch_to_ancestor(store, new_head, ancestor);

    // Drop the old canonical suffix, then lay the new branch over it
    store.canonical.split_off(&ancestor_number.next());
    for root in branch.into_iter().rev() {
        let number = store.blocks[&root].block.number();
        store.canonical.insert(number, root);
    }
    store.head = new_head;

    Reorg {
        old_head,
        new_head,
        common_ancestor: ancestor,
        depth: old_number.0 - ancestor_number.0,
    }
}
