// Serde helpers for block files: raw byte fields are written as 0x-prefixed hex strings

/// Serialize `Vec<u8>` as a hex string, accepting input with or without `0x`.
pub mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error;

        let s = String::deserialize(deserializer)?;
        let s = s.trim_start_matches("0x");
        hex::decode(s).map_err(|err| D::Error::custom(format!("invalid hex bytes: {err}")))
    }
}
