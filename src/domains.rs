use std::fmt::{Debug, Formatter};

use bit_set::BitSet;

use crate::grid::Puzzle;
use crate::words::WordList;
use crate::{SlotId, WordId};

/// The live set of candidate words for each slot. Domains only ever shrink, and a removal is
/// immediately visible to every later read.
#[derive(Clone)]
pub struct Domains {
    sets: Vec<BitSet>,
}

impl Debug for Domains {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.sets.iter().map(|set| set.len())).finish()
    }
}

impl Domains {
    /// Start every slot off with the complete word list as its candidates.
    pub fn new(puzzle: &Puzzle, words: &WordList) -> Domains {
        let mut full = BitSet::with_capacity(words.len());
        for word_id in 0..words.len() {
            full.insert(word_id);
        }

        Domains {
            sets: (0..puzzle.slot_count()).map(|_| full.clone()).collect(),
        }
    }

    /// Build domains from explicit candidate lists, one per slot.
    pub fn from_candidates<I>(candidates: I) -> Domains
        where
            I: IntoIterator,
            I::Item: IntoIterator<Item=WordId>,
    {
        Domains {
            sets: candidates.into_iter().map(|ids| ids.into_iter().collect()).collect(),
        }
    }

    pub fn slot_count(&self) -> usize {
        self.sets.len()
    }

    /// Candidates for the slot in ascending word id order.
    pub fn candidates(&self, slot_id: SlotId) -> impl Iterator<Item=WordId> + '_ {
        self.sets[slot_id].iter()
    }

    /// A copy of the slot's current candidates, safe to iterate while removing from the slot.
    pub fn snapshot(&self, slot_id: SlotId) -> Vec<WordId> {
        self.candidates(slot_id).collect()
    }

    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.sets[slot_id].contains(word_id)
    }

    pub fn len(&self, slot_id: SlotId) -> usize {
        self.sets[slot_id].len()
    }

    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.sets[slot_id].is_empty()
    }

    /// Remove a candidate, returning whether it was present.
    pub fn remove(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        self.sets[slot_id].remove(word_id)
    }

    /// Sum of all domain sizes.
    pub fn total(&self) -> usize {
        self.sets.iter().map(|set| set.len()).sum()
    }
}
