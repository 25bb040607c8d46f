use ethereum_types::H256;
use hex::FromHex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bytes32(pub H256);

impl Bytes32 {
    pub fn zero() -> Self {
        Bytes32(H256::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// First four bytes in hex, for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0.as_bytes()[..4])
    }
}

impl From<[u8; 32]> for Bytes32 {
    fn from(bytes: [u8; 32]) -> Self {
        Bytes32(H256::from(bytes))
    }
}

impl FromStr for Bytes32 {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes: [u8; 32] = <[u8; 32]>::from_hex(s)?;
        Ok(Bytes32(H256::from(bytes)))
    }
}

impl fmt::Display for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0.as_bytes()))
    }
}

impl fmt::Debug for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip_accepts_prefix() {
        let hash = Bytes32::from([0xab; 32]);
        let plain: Bytes32 = hash.to_string().parse().unwrap();
        let prefixed: Bytes32 = format!("0x{hash}").parse().unwrap();
        assert_eq!(plain, hash);
        assert_eq!(prefixed, hash);
    }

    #[test]
    fn test_short_is_first_four_bytes() {
        let hash = Bytes32::from([0x0f; 32]);
        assert_eq!(hash.short(), "0f0f0f0f");
    }
}
