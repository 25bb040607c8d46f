use crate::store::{Root, Store};
use containers::BlockNumber;

/// Head switch from one branch to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reorg {
    pub old_head: Root,
    pub new_head: Root,
    pub common_ancestor: Root,
    /// Canonical blocks disconnected from the old chain.
    pub depth: u64,
}

/// What connecting a block did to the head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadUpdate {
    Unchanged,
    Extended,
    Reorganized(Reorg),
}

impl HeadUpdate {
    pub fn reorg(&self) -> Option<Reorg> {
        match self {
            HeadUpdate::Reorganized(reorg) => Some(*reorg),
            _ => None,
        }
    }
}

/// Deepest block that is an ancestor of (or equal to) both `a` and `b`.
///
/// Returns `None` if either root is unknown to the store.
pub fn find_common_ancestor(store: &Store, a: Root, b: Root) -> Option<Root> {
    let mut a = a;
    let mut b = b;
    let mut a_number = store.get(&a)?.block.number();
    let mut b_number = store.get(&b)?.block.number();

    // Level both cursors, then walk them down together
    while a_number > b_number {
        (a, a_number) = parent_of(store, a)?;
    }
    while b_number > a_number {
        (b, b_number) = parent_of(store, b)?;
    }
    while a != b {
        (a, _) = parent_of(store, a)?;
        (b, _) = parent_of(store, b)?;
    }

    Some(a)
}

fn parent_of(store: &Store, root: Root) -> Option<(Root, BlockNumber)> {
    let parent = store.get(&root)?.block.parent_hash();
    let number = store.get(&parent)?.block.number();
    Some((parent, number))
}

/// Blocks from `tip` back to, but not including, `ancestor`; ordered tip first.
pub fn branch_to_ancestor(store: &Store, tip: Root, ancestor: Root) -> Vec<Root> {
    let mut branch = Vec::new();
    let mut cursor = tip;
    while cursor != ancestor {
        match store.get(&cursor) {
            Some(stored) => {
                branch.push(cursor);
                cursor = stored.block.parent_hash();
            }
            None => break,
        }
    }
    branch
}
