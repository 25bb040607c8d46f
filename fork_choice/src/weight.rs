use containers::BlockHeader;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::sync::Arc;

/// Accumulated fork-choice weight of a branch, from genesis to some block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ChainWeight(pub u128);

impl Add for ChainWeight {
    type Output = ChainWeight;

    fn add(self, rhs: ChainWeight) -> ChainWeight {
        ChainWeight(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for ChainWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Weight contributed by a single block. A branch's weight is the sum over
/// its blocks, and the heaviest branch wins.
pub trait ForkChoiceRule: fmt::Debug + Send + Sync {
    fn block_weight(&self, header: &BlockHeader) -> ChainWeight;
}

/// Every block weighs the same, so the longest chain wins.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeightRule;

impl ForkChoiceRule for HeightRule {
    fn block_weight(&self, _header: &BlockHeader) -> ChainWeight {
        ChainWeight(1)
    }
}

/// Blocks weigh their declared difficulty, so the chain with most work wins.
#[derive(Debug, Default, Clone, Copy)]
pub struct TotalDifficultyRule;

impl ForkChoiceRule for TotalDifficultyRule {
    fn block_weight(&self, header: &BlockHeader) -> ChainWeight {
        ChainWeight(u128::from(header.difficulty))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForkChoiceKind {
    #[default]
    Height,
    TotalDifficulty,
}

impl ForkChoiceKind {
    pub fn rule(self) -> Arc<dyn ForkChoiceRule> {
        match self {
            ForkChoiceKind::Height => Arc::new(HeightRule),
            ForkChoiceKind::TotalDifficulty => Arc::new(TotalDifficultyRule),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use containers::{BlockNumber, Bytes32};

    fn header(difficulty: u64) -> BlockHeader {
        BlockHeader {
            parent_hash: Bytes32::zero(),
            number: BlockNumber(0),
            difficulty,
            timestamp: 0,
            extra_data: vec![],
        }
    }

    #[test]
    fn test_height_rule_ignores_difficulty() {
        assert_eq!(HeightRule.block_weight(&header(500)), ChainWeight(1));
    }

    #[test]
    fn test_total_difficulty_rule_uses_difficulty() {
        assert_eq!(TotalDifficultyRule.block_weight(&header(500)), ChainWeight(500));
    }

    #[test]
    fn test_weight_addition_saturates() {
        assert_eq!(ChainWeight(u128::MAX) + ChainWeight(1), ChainWeight(u128::MAX));
    }

    #[test]
    fn test_kind_parses_from_snake_case() {
        let kind: ForkChoiceKind = serde_yaml::from_str("total_difficulty").unwrap();
        assert_eq!(kind, ForkChoiceKind::TotalDifficulty);
    }
}
