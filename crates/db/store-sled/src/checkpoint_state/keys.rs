//! Key layout for the checkpoint state tree.
//!
//! Keys are the big-endian epoch followed by the raw root, so a forward scan over the tree walks
//! checkpoints in epoch order and a range ending at an epoch prefix covers every earlier epoch.

use anyhow::anyhow;
use beacon_primitives::{Buf32, Checkpoint, Epoch};

const EPOCH_LEN: usize = 8;
pub(crate) const KEY_LEN: usize = EPOCH_LEN + Buf32::LEN;

pub(crate) fn encode_key(checkpoint: &Checkpoint) -> [u8; KEY_LEN] {
    let mut out = [0u8; KEY_LEN];
    out[..EPOCH_LEN].copy_from_slice(&epoch_prefix(checkpoint.epoch()));
    out[EPOCH_LEN..].copy_from_slice(checkpoint.root().as_slice());
    out
}

pub(crate) fn decode_key(data: &[u8]) -> anyhow::Result<Checkpoint> {
    if data.len() != KEY_LEN {
        return Err(anyhow!(
            "checkpoint state key has wrong length: expected {KEY_LEN}, got {}",
            data.len()
        ));
    }
    let (epoch, root) = data.split_at(EPOCH_LEN);
    let mut epoch_buf = [0u8; EPOCH_LEN];
    epoch_buf.copy_from_slice(epoch);
    let root = Buf32::try_from(root).map_err(|e| anyhow!("checkpoint state key root: {e}"))?;
    Ok(Checkpoint::new(Epoch::from_be_bytes(epoch_buf), root))
}

/// Prefix shared by every key of `epoch`.
pub(crate) fn epoch_prefix(epoch: Epoch) -> [u8; EPOCH_LEN] {
    epoch.to_be_bytes()
}

#[cfg(test)]
mod tests {
    use beacon_test_utils::make_checkpoint;

    use super::*;

    #[test]
    fn test_key_decodes() {
        let cp = make_checkpoint(258, 4);
        let key = encode_key(&cp);
        assert_eq!(&key[..8], &258u64.to_be_bytes());
        assert_eq!(decode_key(&key).unwrap(), cp);
    }

    #[test]
    fn test_keys_sort_by_epoch() {
        let low = encode_key(&make_checkpoint(1, 255));
        let high = encode_key(&make_checkpoint(256, 0));
        assert!(low < high);
        assert!(epoch_prefix(256).as_slice() > low.as_slice());
        assert!(epoch_prefix(256).as_slice() <= high.as_slice());
    }

    #[test]
    fn test_bad_key_length() {
        assert!(decode_key(&[0u8; 12]).is_err());
    }
}
