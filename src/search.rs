use std::cmp::Reverse;
use std::collections::HashMap;

use instant::{Duration, Instant};
use log::{debug, error, trace};

use crate::consistency::{enforce_arc_consistency, enforce_node_consistency};
use crate::domains::Domains;
use crate::error::FillFailure;
use crate::grid::Puzzle;
use crate::words::WordList;
use crate::{SlotId, WordId};

/// Settings for a fill attempt.
#[derive(Debug, Clone, Default)]
pub struct FillOptions {
    /// Give up once this much time has passed since the fill started.
    pub deadline: Option<Duration>,
}

/// A struct recording a slot assignment made during the filling process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub slot_id: SlotId,
    pub word_id: WordId,
}

/// A partial mapping from slots to words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    words: Vec<Option<WordId>>,
    assigned: usize,
}

impl Assignment {
    pub fn new(slot_count: usize) -> Assignment {
        Assignment { words: vec![None; slot_count], assigned: 0 }
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.words.get(slot_id).cloned().flatten()
    }

    /// Put a word in a slot, returning the word it replaced.
    pub fn assign(&mut self, slot_id: SlotId, word_id: WordId) -> Option<WordId> {
        let previous = self.words[slot_id].replace(word_id);
        if previous.is_none() {
            self.assigned += 1;
        }
        previous
    }

    pub fn unassign(&mut self, slot_id: SlotId) -> Option<WordId> {
        let previous = self.words[slot_id].take();
        if previous.is_some() {
            self.assigned -= 1;
        }
        previous
    }

    /// Number of slots with a word.
    pub fn len(&self) -> usize {
        self.assigned
    }

    pub fn is_empty(&self) -> bool {
        self.assigned == 0
    }

    /// Does every slot of the puzzle have a word? This only counts; it doesn't look at the words.
    pub fn is_complete(&self, puzzle: &Puzzle) -> bool {
        self.assigned == puzzle.slot_count()
    }

    /// The assigned slots in slot order.
    pub fn choices(&self) -> impl Iterator<Item=Choice> + '_ {
        self.words.iter().enumerate().filter_map(|(slot_id, word_id)| {
            word_id.map(|word_id| Choice { slot_id, word_id })
        })
    }

    /// Check the word in `slot_id` against the rest of the assignment: it has to fit the slot,
    /// not be used anywhere else, and agree with every assigned crossing slot. An empty slot is
    /// trivially consistent.
    ///
    /// A word of the wrong length is rejected, but it can only get here through a bug (domains
    /// are length-filtered before search starts), so debug builds panic on it.
    pub fn is_consistent_at(&self, puzzle: &Puzzle, words: &WordList, slot_id: SlotId) -> bool {
        let word_id = match self.get(slot_id) {
            Some(word_id) => word_id,
            None => return true,
        };
        let word = words.word(word_id);

        let length = puzzle.slot(slot_id).length;
        debug_assert_eq!(word.len(), length, "word {} doesn't fit slot {}", word.string, slot_id);
        if word.len() != length {
            error!(
                "word {} (length {}) assigned to slot {} of length {}",
                word.string, word.len(), slot_id, length,
            );
            return false;
        }

        if self.choices().any(|choice| choice.slot_id != slot_id && choice.word_id == word_id) {
            return false;
        }

        puzzle.neighbors(slot_id).iter().all(|&other_slot_id| {
            match (self.get(other_slot_id), puzzle.overlap(slot_id, other_slot_id)) {
                (Some(other_word_id), Some((cell, other_cell))) => {
                    word.char_at(cell) == words.word(other_word_id).char_at(other_cell)
                }
                _ => true,
            }
        })
    }

    /// Check every assigned slot.
    pub fn is_consistent(&self, puzzle: &Puzzle, words: &WordList) -> bool {
        self.choices().all(|choice| self.is_consistent_at(puzzle, words, choice.slot_id))
    }

    /// The assigned word strings in slot order, `None` for empty slots.
    pub fn strings<'a>(&self, words: &'a WordList) -> Vec<Option<&'a str>> {
        self.words.iter()
            .map(|word_id| word_id.map(|word_id| words.word(word_id).string.as_str()))
            .collect()
    }
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone)]
pub struct Statistics {
    /// How many search states were expanded.
    pub states: u64,

    /// How many tentative words were taken back out of a slot.
    pub backtracks: u64,
    pub duration: Duration,
}

impl Default for Statistics {
    fn default() -> Self {
        Statistics { states: 0, backtracks: 0, duration: Duration::from_millis(0) }
    }
}

/// A struct representing the results of a fill operation.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

/// Backtracking search over a puzzle whose domains have already been pruned. The domains are
/// only read from here on; all changes go into the assignment.
pub struct Filler<'a> {
    puzzle: &'a Puzzle,
    words: &'a WordList,
    domains: Domains,
    deadline: Option<Instant>,
    statistics: Statistics,
}

impl<'a> Filler<'a> {
    pub fn new(
        puzzle: &'a Puzzle,
        words: &'a WordList,
        domains: Domains,
        options: &FillOptions,
    ) -> Filler<'a> {
        Filler {
            puzzle,
            words,
            domains,
            deadline: options.deadline.map(|deadline| Instant::now() + deadline),
            statistics: Statistics::default(),
        }
    }

    /// Choose the next slot to fill: fewest remaining candidates first, then most crossings, then
    /// lowest slot id.
    pub fn select_unassigned_slot(&self, assignment: &Assignment) -> Option<SlotId> {
        (0..self.puzzle.slot_count())
            .filter(|&slot_id| assignment.get(slot_id).is_none())
            .min_by_key(|&slot_id| {
                (self.domains.len(slot_id), Reverse(self.puzzle.neighbors(slot_id).len()), slot_id)
            })
    }

    /// The slot's candidates, ordered by how many candidates each would rule out of the crossing
    /// slots' domains, fewest first. Ties keep word id order.
    pub fn order_domain_values(&self, slot_id: SlotId) -> Vec<WordId> {
        // For each crossing: which cell of ours, how big the crossing domain is, and how many of
        // its candidates have each letter in the shared cell.
        let crossing_letter_counts: Vec<(usize, usize, HashMap<char, usize>)> = self.puzzle
            .neighbors(slot_id)
            .iter()
            .filter_map(|&other_slot_id| {
                let (cell, other_cell) = self.puzzle.overlap(slot_id, other_slot_id)?;

                let mut counts: HashMap<char, usize> = HashMap::new();
                for other_word_id in self.domains.candidates(other_slot_id) {
                    if let Some(c) = self.words.word(other_word_id).char_at(other_cell) {
                        *counts.entry(c).or_insert(0) += 1;
                    }
                }

                Some((cell, self.domains.len(other_slot_id), counts))
            })
            .collect();

        let mut values = self.domains.snapshot(slot_id);
        values.sort_by_cached_key(|&word_id| {
            let word = self.words.word(word_id);

            crossing_letter_counts.iter().map(|(cell, domain_len, counts)| {
                let compatible = word.char_at(*cell)
                    .and_then(|c| counts.get(&c).cloned())
                    .unwrap_or(0);
                domain_len - compatible
            }).sum::<usize>()
        });

        values
    }

    /// Extend `assignment` until it's complete. Returns `Ok(false)` if no extension exists; the
    /// assignment is then back to what it was on entry.
    fn backtrack(&mut self, assignment: &mut Assignment) -> Result<bool, FillFailure> {
        if assignment.is_complete(self.puzzle) {
            return Ok(true);
        }

        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(FillFailure::DeadlineExceeded);
            }
        }

        self.statistics.states += 1;

        let slot_id = match self.select_unassigned_slot(assignment) {
            Some(slot_id) => slot_id,
            None => return Ok(false),
        };

        for word_id in self.order_domain_values(slot_id) {
            assignment.assign(slot_id, word_id);

            if assignment.is_consistent_at(self.puzzle, self.words, slot_id) {
                trace!(
                    "trying {} in slot {} ({} of {} filled)",
                    self.words.word(word_id).string, slot_id, assignment.len(), self.puzzle.slot_count(),
                );

                if self.backtrack(assignment)? {
                    return Ok(true);
                }
            }

            assignment.unassign(slot_id);
            self.statistics.backtracks += 1;
        }

        Ok(false)
    }

    /// Search for a complete, consistent assignment.
    pub fn fill(mut self) -> Result<FillSuccess, FillFailure> {
        let start = Instant::now();
        let mut assignment = Assignment::new(self.puzzle.slot_count());

        let found = self.backtrack(&mut assignment);
        self.statistics.duration = start.elapsed();
        debug!("search finished: {:?}", self.statistics);

        if found? {
            Ok(FillSuccess { statistics: self.statistics, assignment })
        } else {
            Err(FillFailure::Exhausted)
        }
    }
}

/// Search for a valid fill for the given grid.
pub fn find_fill(puzzle: &Puzzle, words: &WordList) -> Result<FillSuccess, FillFailure> {
    find_fill_with_options(puzzle, words, &FillOptions::default())
}

/// Search for a valid fill: prune the domains with node and arc consistency, then backtrack.
pub fn find_fill_with_options(
    puzzle: &Puzzle,
    words: &WordList,
    options: &FillOptions,
) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();

    if puzzle.slot_count() == 0 {
        return Ok(FillSuccess { statistics: Statistics::default(), assignment: Assignment::new(0) });
    }

    let mut domains = Domains::new(puzzle, words);
    enforce_node_consistency(puzzle, words, &mut domains);

    if let Err(failure) = enforce_arc_consistency(puzzle, words, &mut domains, None) {
        return Err(FillFailure::Unsatisfiable { slot: failure.slot_id });
    }
    debug!("{} candidates left after propagation", domains.total());

    let mut result = Filler::new(puzzle, words, domains, options).fill()?;
    result.statistics.duration = start.elapsed();

    Ok(result)
}
