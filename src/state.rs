//! Last-known controller values, for replay after a mode change
//!
//! Two instances exist at runtime: the right-column button store (8 CCs,
//! replayed when leaving the mixer group) and the fader store (32 CCs across
//! the four mixer banks, replayed one bank at a time on bank entry). Both are
//! write-through over a key set fixed at start-up; values outside the key set
//! are never stored.

use std::collections::BTreeMap;

/// Write-through store of last observed values for a fixed CC set
#[derive(Debug, Clone)]
pub struct ControlStore {
    values: BTreeMap<u8, u8>,
}

impl ControlStore {
    /// Create a store over the given CC numbers, all starting at 0
    pub fn new(keys: impl IntoIterator<Item = u8>) -> Self {
        Self {
            values: keys.into_iter().map(|cc| (cc, 0)).collect(),
        }
    }

    /// Whether this store tracks the given CC
    pub fn contains(&self, cc: u8) -> bool {
        self.values.contains_key(&cc)
    }

    /// Overwrite the stored value; CCs outside the key set are ignored
    pub fn record(&mut self, cc: u8, value: u8) {
        if let Some(slot) = self.values.get_mut(&cc) {
            *slot = value;
        }
    }

    /// Last observed value for a tracked CC
    pub fn get(&self, cc: u8) -> Option<u8> {
        self.values.get(&cc).copied()
    }

    /// Stored (cc, value) pairs for every key, in ascending CC order
    pub fn replay(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.values.iter().map(|(&cc, &value)| (cc, value))
    }

    /// Stored (cc, value) pairs restricted to a CC range
    pub fn replay_range(
        &self,
        range: std::ops::Range<u8>,
    ) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.values
            .range(range)
            .map(|(&cc, &value)| (cc, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_get() {
        let mut store = ControlStore::new([89, 79, 69]);

        assert_eq!(store.get(89), Some(0));
        store.record(89, 21);
        assert_eq!(store.get(89), Some(21));

        store.record(89, 0); // unconditional overwrite
        assert_eq!(store.get(89), Some(0));
    }

    #[test]
    fn test_unknown_ccs_ignored() {
        let mut store = ControlStore::new([89]);

        store.record(42, 100);
        assert!(!store.contains(42));
        assert_eq!(store.get(42), None);
    }

    #[test]
    fn test_replay_covers_every_key() {
        let mut store = ControlStore::new([19, 29, 39]);
        store.record(29, 64);

        let replayed: Vec<_> = store.replay().collect();
        assert_eq!(replayed, vec![(19, 0), (29, 64), (39, 0)]);
    }

    #[test]
    fn test_replay_range_selects_one_bank() {
        let mut store = ControlStore::new(30..62);
        store.record(38, 12);
        store.record(45, 99);
        store.record(46, 7); // first CC of the next bank

        let bank: Vec<_> = store.replay_range(38..46).collect();
        assert_eq!(bank.len(), 8);
        assert_eq!(bank[0], (38, 12));
        assert_eq!(bank[7], (45, 99));
    }
}
