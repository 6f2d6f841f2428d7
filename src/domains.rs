use bit_set::BitSet;
use log::debug;

use crate::grid::Puzzle;
use crate::word_list::{WordId, WordList};
use crate::SlotId;

/// The current candidate words for each slot, stored as sets of word ids indexed by `SlotId`.
/// Candidates are only ever removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domains {
    by_slot: Vec<BitSet>,
}

impl Domains {
    /// Every slot starts out with the full word list.
    pub fn initialize(puzzle: &Puzzle, words: &WordList) -> Domains {
        let full: BitSet = (0..words.len()).collect();

        Domains {
            by_slot: (0..puzzle.slot_count()).map(|_| full.clone()).collect(),
        }
    }

    /// Remove every candidate whose length differs from its slot's length.
    pub fn enforce_node_consistency(&mut self, puzzle: &Puzzle, words: &WordList) {
        let mut removed = 0;

        for (slot_id, slot) in puzzle.slots().iter().enumerate() {
            let failed_words: Vec<WordId> = self.by_slot[slot_id]
                .iter()
                .filter(|&word_id| words.get(word_id).len() != slot.length)
                .collect();

            removed += failed_words.len();
            self.remove_all(slot_id, &failed_words);
        }

        debug!("Node consistency removed {} candidates", removed);
    }

    pub fn get(&self, slot_id: SlotId) -> &BitSet {
        &self.by_slot[slot_id]
    }

    pub fn len(&self, slot_id: SlotId) -> usize {
        self.by_slot[slot_id].len()
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.by_slot[slot_id].is_empty()
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.by_slot[slot_id].contains(word_id)
    }

    /// Candidates for a slot in ascending id order.
    pub fn iter(&self, slot_id: SlotId) -> impl Iterator<Item = WordId> + '_ {
        self.by_slot[slot_id].iter()
    }

    /// Total number of candidates across all slots.
    pub fn total_len(&self) -> usize {
        self.by_slot.iter().map(BitSet::len).sum()
    }

    /// Remove a batch of candidates collected beforehand.
    pub fn remove_all(&mut self, slot_id: SlotId, word_ids: &[WordId]) {
        let domain = &mut self.by_slot[slot_id];
        for &word_id in word_ids {
            domain.remove(word_id);
        }
    }

    /// True iff every candidate in `self` is also a candidate in `earlier` for the same slot.
    pub fn is_subset_of(&self, earlier: &Domains) -> bool {
        self.by_slot.len() == earlier.by_slot.len()
            && self
                .by_slot
                .iter()
                .zip(&earlier.by_slot)
                .all(|(current, before)| current.is_subset(before))
    }
}
