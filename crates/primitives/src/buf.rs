//! Fixed-size byte buffers.

use std::{fmt, str::FromStr};

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// 32 byte buffer, used for block roots and state roots.
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default, BorshSerialize, BorshDeserialize,
)]
pub struct Buf32(pub [u8; 32]);

impl Buf32 {
    pub const LEN: usize = 32;

    pub const fn new(data: [u8; 32]) -> Self {
        Self(data)
    }

    pub const fn zero() -> Self {
        Self([0; 32])
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex encoding with a `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for Buf32 {
    fn from(value: [u8; 32]) -> Self {
        Self(value)
    }
}

impl From<Buf32> for [u8; 32] {
    fn from(value: Buf32) -> Self {
        value.0
    }
}

impl AsRef<[u8; 32]> for Buf32 {
    fn as_ref(&self) -> &[u8; 32] {
        &self.0
    }
}

impl AsRef<[u8]> for Buf32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Buf32 {
    type Error = BufParseError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 32] = value
            .try_into()
            .map_err(|_| BufParseError::InvalidLength(value.len()))?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for Buf32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Display for Buf32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Errors from parsing a [`Buf32`] out of text or slices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufParseError {
    #[error("invalid buffer length {0}, expected 32")]
    InvalidLength(usize),

    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl FromStr for Buf32 {
    type Err = BufParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| BufParseError::InvalidHex(e.to_string()))?;
        Self::try_from(bytes.as_slice())
    }
}

impl Serialize for Buf32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Buf32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <String as Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_display_and_parse() {
        let mut raw = [0u8; 32];
        raw[0] = 0xaa;
        raw[31] = 0x01;
        let buf = Buf32::from(raw);

        let s = buf.to_string();
        assert!(s.starts_with("0xaa"));
        assert!(s.ends_with("01"));
        assert_eq!(s.parse::<Buf32>().unwrap(), buf);

        // prefix is optional on the way in
        assert_eq!(s[2..].parse::<Buf32>().unwrap(), buf);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(
            "0xaabb".parse::<Buf32>(),
            Err(BufParseError::InvalidLength(2))
        );
        assert!(matches!(
            "0xzz".parse::<Buf32>(),
            Err(BufParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_serde_as_hex_string() {
        let buf = Buf32::from([7u8; 32]);
        let json = serde_json::to_string(&buf).unwrap();
        assert_eq!(json, format!("\"{}\"", buf.to_hex()));
        let back: Buf32 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, buf);
    }

    #[test]
    fn test_serde_rejects_bad_hex() {
        assert!(serde_json::from_str::<Buf32>("\"0x1234\"").is_err());
        assert!(serde_json::from_str::<Buf32>("\"nothex\"").is_err());

        let roots: Vec<Buf32> =
            serde_json::from_str(&format!("[\"{}\"]", Buf32::zero().to_hex())).unwrap();
        assert_eq!(roots, vec![Buf32::zero()]);
    }

    #[test]
    fn test_zero() {
        assert!(Buf32::zero().is_zero());
        assert!(!Buf32::from([1u8; 32]).is_zero());
    }
}
