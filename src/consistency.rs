use std::collections::{HashSet, VecDeque};

use bit_set::BitSet;
use log::{debug, trace};

use crate::domains::Domains;
use crate::grid::Puzzle;
use crate::words::WordList;
use crate::SlotId;

/// Remove every candidate whose length differs from its slot's length. Returns the number of
/// candidates removed.
pub fn enforce_node_consistency(puzzle: &Puzzle, words: &WordList, domains: &mut Domains) -> usize {
    let mut removed = 0;

    for slot in puzzle.slots() {
        for word_id in domains.snapshot(slot.id) {
            if words.word(word_id).len() != slot.length && domains.remove(slot.id, word_id) {
                removed += 1;
            }
        }
    }

    debug!("node consistency removed {} candidates", removed);

    removed
}

/// Make slot `x` arc-consistent with slot `y`: drop every candidate for `x` that has no candidate
/// in `y` agreeing with it at their shared cell. Returns whether anything was removed. Slots that
/// don't cross are left alone.
pub fn revise(
    puzzle: &Puzzle,
    words: &WordList,
    domains: &mut Domains,
    x: SlotId,
    y: SlotId,
) -> bool {
    let (x_cell, y_cell) = match puzzle.overlap(x, y) {
        Some(overlap) => overlap,
        None => return false,
    };

    // Which letters can `y` still put in the shared cell?
    let y_chars: HashSet<char> = domains.candidates(y)
        .filter_map(|word_id| words.word(word_id).char_at(y_cell))
        .collect();

    let mut revised = false;
    for word_id in domains.snapshot(x) {
        let supported = words.word(word_id).char_at(x_cell)
            .map(|c| y_chars.contains(&c))
            .unwrap_or(false);

        if !supported {
            domains.remove(x, word_id);
            revised = true;
        }
    }

    revised
}

/// Returned when arc consistency wipes out a slot's domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub slot_id: SlotId,
}

/// Counters from a successful arc consistency pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArcConsistencySuccess {
    /// How many arcs were popped from the queue.
    pub arcs_checked: usize,

    /// How many of those arcs removed at least one candidate.
    pub revisions: usize,

    /// Total candidates removed.
    pub removed: usize,
}

pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Work queue of ordered slot pairs. Tracks which arcs are already pending so that re-enqueueing
/// one is a no-op.
#[derive(Debug)]
struct ArcQueue {
    queue: VecDeque<(SlotId, SlotId)>,
    pending: BitSet,
    slot_count: usize,
}

impl ArcQueue {
    fn with_initial_queue<Arcs>(slot_count: usize, arcs: Arcs) -> ArcQueue
        where
            Arcs: IntoIterator<Item=(SlotId, SlotId)>
    {
        let mut queue = ArcQueue {
            queue: VecDeque::new(),
            pending: BitSet::with_capacity(slot_count * slot_count),
            slot_count,
        };

        // The initial arcs go in as given, duplicates included.
        for arc in arcs {
            let key = queue.key(arc);
            queue.pending.insert(key);
            queue.queue.push_back(arc);
        }

        queue
    }

    fn key(&self, (x, y): (SlotId, SlotId)) -> usize {
        x * self.slot_count + y
    }

    fn pop_front(&mut self) -> Option<(SlotId, SlotId)> {
        let arc = self.queue.pop_front()?;
        let key = self.key(arc);
        self.pending.remove(key);
        Some(arc)
    }

    fn enqueue(&mut self, arc: (SlotId, SlotId)) {
        let key = self.key(arc);
        if self.pending.insert(key) {
            self.queue.push_back(arc);
        }
    }
}

/// AC-3. Starting from `arcs` (or every pair of crossing slots, in both directions, if `arcs` is
/// `None`), revise each arc in turn; whenever a slot's domain shrinks, recheck every other slot
/// crossing it. Stops as soon as any domain becomes empty. A domain that is already empty on
/// entry (say, no word has the slot's length) fails straight away, whether or not it has
/// neighbors or appears in `arcs`.
///
/// Success only means that no domain is empty and every candidate has support in every
/// crossing slot. It does not mean a fill exists; that takes a search.
pub fn enforce_arc_consistency(
    puzzle: &Puzzle,
    words: &WordList,
    domains: &mut Domains,
    arcs: Option<Vec<(SlotId, SlotId)>>,
) -> ArcConsistencyResult {
    let slot_count = puzzle.slot_count();

    if let Some(slot_id) = (0..slot_count).find(|&slot_id| domains.is_empty(slot_id)) {
        debug!("slot {} has no candidates before arc consistency", slot_id);
        return Err(ArcConsistencyFailure { slot_id });
    }

    let mut queue = ArcQueue::with_initial_queue(
        slot_count,
        arcs.unwrap_or_else(|| puzzle.arcs()),
    );
    let mut success = ArcConsistencySuccess::default();

    while let Some((x, y)) = queue.pop_front() {
        success.arcs_checked += 1;

        let before = domains.len(x);
        if !revise(puzzle, words, domains, x, y) {
            continue;
        }

        let removed = before - domains.len(x);
        success.revisions += 1;
        success.removed += removed;
        trace!("revised slot {} against slot {}: {} removed, {} left", x, y, removed, domains.len(x));

        if domains.is_empty(x) {
            debug!("arc consistency emptied slot {} after {} arcs", x, success.arcs_checked);
            return Err(ArcConsistencyFailure { slot_id: x });
        }

        for &z in puzzle.neighbors(x) {
            if z != y {
                queue.enqueue((z, x));
            }
        }
    }

    debug!(
        "arc consistency checked {} arcs, removed {} candidates",
        success.arcs_checked, success.removed,
    );

    Ok(success)
}

/// Does every candidate of every slot have support in each crossing slot?
pub fn is_arc_consistent(puzzle: &Puzzle, words: &WordList, domains: &Domains) -> bool {
    puzzle.arcs().into_iter().all(|(x, y)| {
        let (x_cell, y_cell) = match puzzle.overlap(x, y) {
            Some(overlap) => overlap,
            None => return true,
        };

        domains.candidates(x).all(|word_id| {
            let c = words.word(word_id).char_at(x_cell);
            c.is_some() && domains.candidates(y).any(|other| words.word(other).char_at(y_cell) == c)
        })
    })
}
