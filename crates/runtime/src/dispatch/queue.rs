//! Tick-ordered buffer of replicated actions awaiting application.

use std::collections::{BTreeMap, BTreeSet};

use game_core::{GameCommand, PlayerId, Tick};

use super::QueueKey;
use super::lifecycle::Lifecycle;

/// A sequenced action plus the peers that confirmed receipt.
#[derive(Clone, Debug)]
pub struct QueuedAction {
    pub command: GameCommand,
    /// Wire frame exactly as broadcast; journaled and resent on join.
    pub frame: Vec<u8>,
    pub lifecycle: Lifecycle,
    acks: BTreeSet<PlayerId>,
}

impl QueuedAction {
    pub fn new(command: GameCommand, frame: Vec<u8>, lifecycle: Lifecycle) -> Self {
        Self {
            command,
            frame,
            lifecycle,
            acks: BTreeSet::new(),
        }
    }

    pub fn acked_by_all(&self, peers: &BTreeSet<PlayerId>) -> bool {
        peers.is_subset(&self.acks)
    }
}

/// Pending actions ordered by (tick, sequence).
#[derive(Debug, Default)]
pub struct ActionQueue {
    entries: BTreeMap<QueueKey, QueuedAction>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, key: QueueKey, action: QueuedAction) {
        self.entries.insert(key, action);
    }

    pub fn remove(&mut self, key: &QueueKey) -> Option<QueuedAction> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &QueueKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Records that `peer` received `key`. Returns false for unknown keys.
    pub fn ack(&mut self, key: &QueueKey, peer: PlayerId) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.acks.insert(peer);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QueueKey, &QueuedAction)> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Removes, in order, every entry due at or before `tick` that is ready.
    ///
    /// An entry is ready when every peer in `peers` acknowledged it or when
    /// its deadline `key.tick + ack_deadline` is at or before `tick`. Release
    /// stops at the first entry that is not ready so application order never
    /// skips ahead.
    pub fn release(
        &mut self,
        tick: Tick,
        peers: &BTreeSet<PlayerId>,
        ack_deadline: u64,
    ) -> Vec<(QueueKey, QueuedAction)> {
        let mut ready = Vec::new();
        for (key, entry) in &self.entries {
            if key.tick > tick {
                break;
            }
            let expired = key.tick + ack_deadline <= tick;
            if !expired && !entry.acked_by_all(peers) {
                break;
            }
            ready.push(*key);
        }

        ready
            .into_iter()
            .filter_map(|key| self.entries.remove(&key).map(|entry| (key, entry)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::TogglePauseAction;

    fn entry() -> QueuedAction {
        QueuedAction::new(GameCommand::new(TogglePauseAction), Vec::new(), Lifecycle::new())
    }

    fn peers(ids: &[u32]) -> BTreeSet<PlayerId> {
        ids.iter().copied().map(PlayerId).collect()
    }

    #[test]
    fn release_waits_for_every_connected_peer() {
        let mut queue = ActionQueue::new();
        let key = QueueKey::new(Tick(2), 0);
        queue.insert(key, entry());

        assert!(queue.release(Tick(2), &peers(&[1, 2]), 10).is_empty());

        queue.ack(&key, PlayerId(1));
        queue.ack(&key, PlayerId(2));
        let released = queue.release(Tick(2), &peers(&[1, 2]), 10);

        assert_eq!(released.len(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn deadline_releases_without_acks() {
        let mut queue = ActionQueue::new();
        queue.insert(QueueKey::new(Tick(1), 0), entry());

        assert!(queue.release(Tick(3), &peers(&[1]), 3).is_empty());
        assert_eq!(queue.release(Tick(4), &peers(&[1]), 3).len(), 1);
    }

    #[test]
    fn blocked_entry_holds_back_later_ones() {
        let mut queue = ActionQueue::new();
        let first = QueueKey::new(Tick(0), 0);
        let second = QueueKey::new(Tick(0), 1);
        queue.insert(first, entry());
        queue.insert(second, entry());
        queue.ack(&second, PlayerId(1));

        assert!(queue.release(Tick(0), &peers(&[1]), 5).is_empty());

        queue.ack(&first, PlayerId(1));
        let keys: Vec<_> = queue
            .release(Tick(0), &peers(&[1]), 5)
            .into_iter()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(keys, vec![first, second]);
    }

    #[test]
    fn future_ticks_stay_queued() {
        let mut queue = ActionQueue::new();
        queue.insert(QueueKey::new(Tick(5), 0), entry());

        assert!(queue.release(Tick(4), &BTreeSet::new(), 0).is_empty());
        assert_eq!(queue.len(), 1);
    }
}
