use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Position of a block along the chain it belongs to. Genesis is number 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockNumber(pub u64);

impl PartialOrd for BlockNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for BlockNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl BlockNumber {
    pub fn next(self) -> BlockNumber {
        BlockNumber(self.0 + 1)
    }

    /// Number `distance` blocks above this one.
    pub fn saturating_add(self, distance: u64) -> BlockNumber {
        BlockNumber(self.0.saturating_add(distance))
    }
}

impl fmt::Display for BlockNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_number_ordering() {
        assert!(BlockNumber(7) < BlockNumber(70));
        assert_eq!(BlockNumber(7).next(), BlockNumber(8));
    }

    #[test]
    fn test_saturating_add_clamps() {
        assert_eq!(BlockNumber(u64::MAX).saturating_add(1), BlockNumber(u64::MAX));
    }
}
