use std::collections::{HashSet, VecDeque};

use beacon_primitives::Epoch;

/// Epochs with resident states, oldest first.
///
/// Order is first-insertion order; inserting an epoch that's already present doesn't move it.
#[derive(Debug, Default, Clone)]
pub(crate) struct EpochQueue {
    order: VecDeque<Epoch>,
    members: HashSet<Epoch>,
}

impl EpochQueue {
    /// Appends `epoch` if it's not already present. Returns whether it was added.
    pub(crate) fn insert(&mut self, epoch: Epoch) -> bool {
        if !self.members.insert(epoch) {
            return false;
        }
        self.order.push_back(epoch);
        true
    }

    /// Puts `epoch` back at the front, for undoing a [`Self::pop_front`].
    pub(crate) fn push_front(&mut self, epoch: Epoch) -> bool {
        if !self.members.insert(epoch) {
            return false;
        }
        self.order.push_front(epoch);
        true
    }

    pub(crate) fn pop_front(&mut self) -> Option<Epoch> {
        let epoch = self.order.pop_front()?;
        self.members.remove(&epoch);
        Some(epoch)
    }

    pub(crate) fn remove(&mut self, epoch: Epoch) -> bool {
        if !self.members.remove(&epoch) {
            return false;
        }
        self.order.retain(|e| *e != epoch);
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = Epoch> + '_ {
        self.order.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_order_kept() {
        let mut q = EpochQueue::default();
        assert!(q.insert(7));
        assert!(q.insert(3));
        assert!(!q.insert(7));
        assert!(q.insert(9));
        assert_eq!(q.iter().collect::<Vec<_>>(), vec![7, 3, 9]);
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn test_pop_and_restore() {
        let mut q = EpochQueue::default();
        q.insert(1);
        q.insert(2);

        let first = q.pop_front().unwrap();
        assert_eq!(first, 1);
        assert!(q.iter().all(|e| e != 1));

        assert!(q.push_front(first));
        assert!(!q.push_front(2));
        assert_eq!(q.iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_remove_middle() {
        let mut q = EpochQueue::default();
        for e in [4, 5, 6] {
            q.insert(e);
        }
        assert!(q.remove(5));
        assert!(!q.remove(5));
        assert_eq!(q.iter().collect::<Vec<_>>(), vec![4, 6]);

        q.clear();
        assert_eq!(q.len(), 0);
        assert!(q.pop_front().is_none());
    }
}
