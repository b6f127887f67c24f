//! Checkpoint identity types.

use std::{fmt, str::FromStr};

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    buf::{Buf32, BufParseError},
    epoch::{compute_start_slot_at_epoch, Epoch, Slot},
};

/// Separator between root and epoch in a [`CheckpointKey`].
const KEY_SEPARATOR: char = '_';

/// Identifies a checkpoint, the state at the start of `epoch` on the chain whose latest block at
/// that point is `root`.
#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    BorshSerialize,
    BorshDeserialize,
    Serialize,
    Deserialize,
)]
pub struct Checkpoint {
    epoch: Epoch,
    root: Buf32,
}

impl Checkpoint {
    pub const fn new(epoch: Epoch, root: Buf32) -> Self {
        Self { epoch, root }
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn root(&self) -> &Buf32 {
        &self.root
    }

    /// First slot of the checkpoint's epoch.
    pub fn start_slot(&self) -> Slot {
        compute_start_slot_at_epoch(self.epoch)
    }

    /// Canonical string key, `{root}_{epoch}`.
    pub fn to_key(&self) -> CheckpointKey {
        CheckpointKey(self.to_string())
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{KEY_SEPARATOR}{}", self.root, self.epoch)
    }
}

impl FromStr for Checkpoint {
    type Err = CheckpointKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (root, epoch) = s
            .rsplit_once(KEY_SEPARATOR)
            .ok_or_else(|| CheckpointKeyError::MissingSeparator(s.to_owned()))?;
        let root = root.parse()?;
        let epoch = epoch
            .parse()
            .map_err(|_| CheckpointKeyError::InvalidEpoch(epoch.to_owned()))?;
        Ok(Self { epoch, root })
    }
}

/// String form of a [`Checkpoint`], used as a persistence identifier.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct CheckpointKey(String);

impl CheckpointKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the key back into the checkpoint it was derived from.
    pub fn checkpoint(&self) -> Result<Checkpoint, CheckpointKeyError> {
        self.0.parse()
    }
}

impl fmt::Display for CheckpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&Checkpoint> for CheckpointKey {
    fn from(value: &Checkpoint) -> Self {
        value.to_key()
    }
}

impl FromStr for CheckpointKey {
    type Err = CheckpointKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cp: Checkpoint = s.parse()?;
        Ok(cp.to_key())
    }
}

impl AsRef<str> for CheckpointKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckpointKeyError {
    #[error("checkpoint key {0:?} has no separator")]
    MissingSeparator(String),

    #[error("checkpoint key has invalid root: {0}")]
    InvalidRoot(#[from] BufParseError),

    #[error("checkpoint key has invalid epoch {0:?}")]
    InvalidEpoch(String),
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_key_format() {
        let mut raw = [0u8; 32];
        raw[0] = 0xaa;
        let cp = Checkpoint::new(5, Buf32::from(raw));
        let key = cp.to_key();
        assert!(key.as_str().starts_with("0xaa"));
        assert!(key.as_str().ends_with("_5"));
        assert_eq!(key.checkpoint().unwrap(), cp);
    }

    #[test]
    fn test_start_slot() {
        let cp = Checkpoint::new(3, Buf32::zero());
        assert_eq!(cp.start_slot(), 96);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "nonsense".parse::<Checkpoint>(),
            Err(CheckpointKeyError::MissingSeparator(_))
        ));
        let root = Buf32::zero().to_hex();
        assert!(matches!(
            format!("{root}_x").parse::<Checkpoint>(),
            Err(CheckpointKeyError::InvalidEpoch(_))
        ));
        assert!(matches!(
            "0x12_4".parse::<Checkpoint>(),
            Err(CheckpointKeyError::InvalidRoot(_))
        ));
    }

    proptest! {
        #[test]
        fn test_key_parses_back(epoch in any::<u64>(), raw in any::<[u8; 32]>()) {
            let cp = Checkpoint::new(epoch, Buf32::from(raw));
            prop_assert_eq!(cp.to_key().checkpoint().unwrap(), cp);
            prop_assert_eq!(cp.to_key().as_str().parse::<CheckpointKey>().unwrap(), cp.to_key());
        }
    }
}
