use crate::BlockNodeInformation;
use containers::Bytes32;
use libp2p_identity::PeerId;
use pretty_assertions::assert_eq;
use std::collections::HashSet;

fn hash(byte: u8) -> Bytes32 {
    Bytes32::from([byte; 32])
}

#[test]
fn test_unknown_block_has_no_nodes() {
    let information = BlockNodeInformation::new();
    assert!(information.get_nodes_by_block(&hash(1)).is_empty());
    assert!(information.is_empty());
}

#[test]
fn test_add_block_to_node_is_idempotent() {
    let information = BlockNodeInformation::new();
    let peer = PeerId::random();

    information.add_block_to_node(hash(1), peer);
    information.add_block_to_node(hash(1), peer);

    assert_eq!(information.get_nodes_by_block(&hash(1)), HashSet::from([peer]));
    assert_eq!(information.len(), 1);
}

#[test]
fn test_multiple_nodes_per_block() {
    let information = BlockNodeInformation::new();
    let first = PeerId::random();
    let second = PeerId::random();

    information.add_block_to_node(hash(1), first);
    information.add_block_to_node(hash(1), second);
    information.add_block_to_node(hash(2), second);

    assert_eq!(
        information.get_nodes_by_block(&hash(1)),
        HashSet::from([first, second])
    );
    assert_eq!(
        information.get_blocks_by_node(&second),
        HashSet::from([hash(1), hash(2)])
    );
}

#[test]
fn test_remove_node() {
    let information = BlockNodeInformation::new();
    let leaving = PeerId::random();
    let staying = PeerId::random();

    information.add_block_to_node(hash(1), leaving);
    information.add_block_to_node(hash(1), staying);
    information.add_block_to_node(hash(2), leaving);

    information.remove_node(&leaving);

    assert_eq!(information.get_nodes_by_block(&hash(1)), HashSet::from([staying]));
    assert!(information.get_nodes_by_block(&hash(2)).is_empty());
    assert!(information.get_blocks_by_node(&leaving).is_empty());
    assert_eq!(information.len(), 1);

    // Unknown peer
    information.remove_node(&PeerId::random());
    assert_eq!(information.len(), 1);
}

#[test]
fn test_bounded_table_forgets_least_recently_announced() {
    let information = BlockNodeInformation::with_max_blocks(Some(2));
    let peer = PeerId::random();
    let other = PeerId::random();

    information.add_block_to_node(hash(1), peer);
    information.add_block_to_node(hash(2), peer);
    // Re-announcing hash 1 makes hash 2 the least recent
    information.add_block_to_node(hash(1), other);
    information.add_block_to_node(hash(3), peer);

    assert_eq!(information.len(), 2);
    assert!(information.get_nodes_by_block(&hash(2)).is_empty());
    assert_eq!(
        information.get_blocks_by_node(&peer),
        HashSet::from([hash(1), hash(3)])
    );
    assert_eq!(information.get_nodes_by_block(&hash(1)), HashSet::from([peer, other]));
}
