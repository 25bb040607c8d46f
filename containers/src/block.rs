use crate::{BlockNumber, Bytes32};
use ethereum_types::H256;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Reasons a block is refused before it can touch any chain or pool state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("block hash mismatch: claimed {claimed}, computed {computed}")]
    HashMismatch { claimed: Bytes32, computed: Bytes32 },

    #[error("block {0} names itself as parent")]
    SelfReferentialParent(Bytes32),

    #[error("block {hash} at number {number} has an invalid genesis linkage")]
    InvalidGenesis { hash: Bytes32, number: BlockNumber },

    #[error("block number {number} does not follow parent number {parent}")]
    NumberMismatch { parent: BlockNumber, number: BlockNumber },
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    pub parent_hash: Bytes32,
    pub number: BlockNumber,
    pub difficulty: u64,
    pub timestamp: u64,
    #[serde(with = "crate::serde_helpers::hex_bytes", default)]
    pub extra_data: Vec<u8>,
}

impl BlockHeader {
    /// SHA-256 over the big-endian field encoding.
    pub fn compute_hash(&self) -> Bytes32 {
        let mut hasher = Sha256::new();
        hasher.update(self.parent_hash.0.as_bytes());
        hasher.update(self.number.0.to_be_bytes());
        hasher.update(self.difficulty.to_be_bytes());
        hasher.update(self.timestamp.to_be_bytes());
        hasher.update((self.extra_data.len() as u64).to_be_bytes());
        hasher.update(&self.extra_data);
        Bytes32(H256::from_slice(hasher.finalize().as_slice()))
    }
}

/// A block as delivered by a peer: a header plus the hash it claims.
///
/// Equality and hashing go through `hash` only. A block built with
/// [`Block::new`] always carries its content hash; one built with
/// [`Block::from_parts`] (or deserialized) must pass [`Block::validate`]
/// before it is trusted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    hash: Bytes32,
}

impl Block {
    pub fn new(header: BlockHeader) -> Self {
        let hash = header.compute_hash();
        Self { header, hash }
    }

    pub fn from_parts(header: BlockHeader, hash: Bytes32) -> Self {
        Self { header, hash }
    }

    pub fn hash(&self) -> Bytes32 {
        self.hash
    }

    pub fn parent_hash(&self) -> Bytes32 {
        self.header.parent_hash
    }

    pub fn number(&self) -> BlockNumber {
        self.header.number
    }

    pub fn is_genesis(&self) -> bool {
        self.header.number == BlockNumber(0)
    }

    /// Structural integrity checks that need nothing but the block itself.
    pub fn validate(&self) -> Result<(), BlockError> {
        if self.header.parent_hash == self.hash {
            return Err(BlockError::SelfReferentialParent(self.hash));
        }

        let computed = self.header.compute_hash();
        if computed != self.hash {
            return Err(BlockError::HashMismatch {
                claimed: self.hash,
                computed,
            });
        }

        // Genesis and only genesis links to the zero hash
        if self.is_genesis() != self.header.parent_hash.is_zero() {
            return Err(BlockError::InvalidGenesis {
                hash: self.hash,
                number: self.header.number,
            });
        }

        Ok(())
    }

    /// Checks that this block sits exactly one position above `parent`.
    pub fn validate_parent(&self, parent: &Block) -> Result<(), BlockError> {
        if self.header.number != parent.number().next() {
            return Err(BlockError::NumberMismatch {
                parent: parent.number(),
                number: self.header.number,
            });
        }
        Ok(())
    }
}

impl PartialEq for Block {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for Block {}

impl Hash for Block {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn header(number: u64, parent_hash: Bytes32) -> BlockHeader {
        BlockHeader {
            parent_hash,
            number: BlockNumber(number),
            difficulty: 1,
            timestamp: 1_000 + number,
            extra_data: vec![number as u8],
        }
    }

    #[test]
    fn test_hash_is_deterministic_and_content_bound() {
        let a = Block::new(header(1, Bytes32::from([1u8; 32])));
        let b = Block::new(header(1, Bytes32::from([1u8; 32])));
        assert_eq!(a.hash(), b.hash());

        let mut changed = header(1, Bytes32::from([1u8; 32]));
        changed.extra_data = vec![0xff];
        assert_ne!(Block::new(changed).hash(), a.hash());
    }

    #[test]
    fn test_valid_blocks_pass() {
        let genesis = Block::new(header(0, Bytes32::zero()));
        assert!(genesis.validate().is_ok());

        let child = Block::new(header(1, genesis.hash()));
        assert!(child.validate().is_ok());
        assert!(child.validate_parent(&genesis).is_ok());
    }

    #[test]
    fn test_claimed_hash_must_match_content() {
        let claimed = Bytes32::from([9u8; 32]);
        let block = Block::from_parts(header(3, Bytes32::from([2u8; 32])), claimed);

        match block.validate() {
            Err(BlockError::HashMismatch { claimed: c, .. }) => assert_eq!(c, claimed),
            other => panic!("expected hash mismatch, got {other:?}"),
        }
    }

    #[rstest]
    #[case::genesis_with_parent(0, Bytes32::from([4u8; 32]))]
    #[case::non_genesis_without_parent(5, Bytes32::zero())]
    fn test_invalid_genesis_linkage(#[case] number: u64, #[case] parent: Bytes32) {
        let block = Block::new(header(number, parent));
        assert!(matches!(
            block.validate(),
            Err(BlockError::InvalidGenesis { .. })
        ));
    }

    #[test]
    fn test_self_referential_parent_rejected() {
        let mut h = header(2, Bytes32::zero());
        let fake = Bytes32::from([7u8; 32]);
        h.parent_hash = fake;
        let block = Block::from_parts(h, fake);

        assert_eq!(
            block.validate(),
            Err(BlockError::SelfReferentialParent(fake))
        );
    }

    #[test]
    fn test_number_must_follow_parent() {
        let genesis = Block::new(header(0, Bytes32::zero()));
        let skip = Block::new(header(2, genesis.hash()));
        assert_eq!(
            skip.validate_parent(&genesis),
            Err(BlockError::NumberMismatch {
                parent: BlockNumber(0),
                number: BlockNumber(2),
            })
        );
    }

    #[test]
    fn test_equality_is_by_hash() {
        let a = Block::new(header(1, Bytes32::from([1u8; 32])));
        let same_hash = Block::from_parts(header(9, Bytes32::zero()), a.hash());
        assert_eq!(a, same_hash);
    }

    #[test]
    fn test_yaml_round_trip_keeps_claimed_hash() {
        let block = Block::new(header(4, Bytes32::from([3u8; 32])));
        let yaml = serde_yaml::to_string(&block).unwrap();
        let decoded: Block = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(decoded.hash(), block.hash());
        assert_eq!(decoded.header, block.header);
        assert!(decoded.validate().is_ok());
    }
}
