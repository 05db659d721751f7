use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::Path;

use log::debug;
use smallvec::{smallvec, SmallVec};

use crate::error::{MalformedPuzzle, PuzzleError};
use crate::{SlotId, MAX_NEIGHBORS, MAX_SLOT_LENGTH};

/// Zero-indexed (row, column) coords for a cell in the grid, where row 0 is the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing. `Across` sorts before `Down`, which is the order used for
/// slots that start in the same cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

/// An across or down entry used to describe a grid slot by slot.
#[derive(Debug, Clone)]
pub struct GridEntry {
    pub loc: GridCoord,
    pub len: usize,
    pub dir: Direction,
}

impl GridEntry {
    /// Generate the coords for each cell of this entry.
    fn cell_coords(&self) -> impl Iterator<Item=GridCoord> + '_ {
        (0..self.len).map(move |cell_idx| step(self.loc, self.dir, cell_idx))
    }

    /// The coords of the last cell, or `None` if the entry is empty or runs past `usize::MAX`.
    fn last_cell(&self) -> Option<GridCoord> {
        let offset = self.len.checked_sub(1)?;
        match self.dir {
            Direction::Across => Some((self.loc.0, self.loc.1.checked_add(offset)?)),
            Direction::Down => Some((self.loc.0.checked_add(offset)?, self.loc.1)),
        }
    }
}

fn step(loc: GridCoord, dir: Direction, offset: usize) -> GridCoord {
    match dir {
        Direction::Across => (loc.0, loc.1 + offset),
        Direction::Down => (loc.0 + offset, loc.1),
    }
}

/// A crossing between one slot and another, referencing the other slot's id and the location of
/// the intersection within the other slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// A slot in the grid. Slots never change once the puzzle has been built.
pub struct Slot {
    pub id: SlotId,

    /// Clue number, shared by the across and down slots starting in the same cell.
    pub number: usize,
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,

    /// For each cell of the slot, the slot crossing it (if any).
    pub crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]>,
}

impl Slot {
    /// Generate the coords for each cell of this slot.
    pub fn cell_coords(&self) -> impl Iterator<Item=GridCoord> + '_ {
        (0..self.length).map(move |cell_idx| step(self.start_cell, self.direction, cell_idx))
    }
}

impl Debug for Slot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot")
            .field("id", &self.id)
            .field("number", &self.number)
            .field("start_cell", &self.start_cell)
            .field("direction", &self.direction)
            .field("length", &self.length)
            .finish()
    }
}

/// The immutable description of a grid: its cells, its slots, and which slots cross which.
pub struct Puzzle {
    width: usize,
    height: usize,
    fillable: Vec<Vec<bool>>,
    slots: Vec<Slot>,
    neighbors: Vec<SmallVec<[SlotId; MAX_NEIGHBORS]>>,
}

impl Debug for Puzzle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Puzzle")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("slots", &self.slots)
            .finish()
    }
}

impl Puzzle {
    /// Build a puzzle from a rectangular mask of fillable cells. Slots are the maximal runs of at
    /// least two fillable cells in each row and column.
    pub fn from_mask(mask: Vec<Vec<bool>>) -> Result<Puzzle, MalformedPuzzle> {
        let width = mask.first().map(|row| row.len()).unwrap_or(0);
        for (row, cells) in mask.iter().enumerate() {
            if cells.len() != width {
                return Err(MalformedPuzzle::NonRectangular { row, expected: width, found: cells.len() });
            }
        }
        let height = mask.len();

        fn build_runs(
            lines: impl Iterator<Item=Vec<bool>>,
            dir: Direction,
            entries: &mut Vec<GridEntry>,
        ) {
            for (line_idx, line) in lines.enumerate() {
                let mut run_start: Option<usize> = None;

                // A trailing `false` closes a run that reaches the edge.
                for (idx, &cell) in line.iter().chain(std::iter::once(&false)).enumerate() {
                    match (cell, run_start) {
                        (true, None) => run_start = Some(idx),
                        (false, Some(start)) => {
                            if idx - start > 1 {
                                let loc = match dir {
                                    Direction::Across => (line_idx, start),
                                    Direction::Down => (start, line_idx),
                                };
                                entries.push(GridEntry { loc, len: idx - start, dir });
                            }
                            run_start = None;
                        }
                        _ => {}
                    }
                }
            }
        }

        let mut entries: Vec<GridEntry> = vec![];
        build_runs(mask.iter().cloned(), Direction::Across, &mut entries);
        build_runs(
            (0..width).map(|column| mask.iter().map(|row| row[column]).collect::<Vec<bool>>()),
            Direction::Down,
            &mut entries,
        );

        Self::build(width, height, mask, entries)
    }

    /// Build a puzzle from a structure template, with `_` or `.` representing fillable cells and
    /// `#` or `█` representing blocks. Blank lines and surrounding whitespace are ignored.
    pub fn from_template(template: &str) -> Result<Puzzle, MalformedPuzzle> {
        let mask = template
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(row, line)| {
                line.chars().enumerate().map(|(column, ch)| match ch {
                    '_' | '.' => Ok(true),
                    '#' | '█' => Ok(false),
                    _ => Err(MalformedPuzzle::UnknownCell { row, column, ch }),
                }).collect::<Result<Vec<bool>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_mask(mask)
    }

    /// Read a structure template from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Puzzle, PuzzleError> {
        let template = fs::read_to_string(path)?;
        Ok(Self::from_template(&template)?)
    }

    /// Build a puzzle from an explicit list of slots. Every cell covered by an entry is
    /// considered fillable; everything else is blocked.
    pub fn from_entries(
        width: usize,
        height: usize,
        entries: &[GridEntry],
    ) -> Result<Puzzle, MalformedPuzzle> {
        let mut fillable = vec![vec![false; width]; height];
        let mut owners: HashMap<(GridCoord, Direction), usize> = HashMap::new();

        for (entry_idx, entry) in entries.iter().enumerate() {
            if entry.len == 0 {
                return Err(MalformedPuzzle::EmptySlot { entry: entry_idx });
            }
            // Entries only grow right or down, so the last cell is the one that can fall outside.
            match entry.last_cell() {
                Some((row, column)) if row < height && column < width => {}
                _ => return Err(MalformedPuzzle::SlotOutOfBounds { entry: entry_idx }),
            }
            for loc in entry.cell_coords() {
                if let Some(&first) = owners.get(&(loc, entry.dir)) {
                    return Err(MalformedPuzzle::OverlappingSlots { first, second: entry_idx });
                }
                owners.insert((loc, entry.dir), entry_idx);
                fillable[loc.0][loc.1] = true;
            }
        }

        Self::build(width, height, fillable, entries.to_vec())
    }

    /// Put the entries into canonical order, number them, and work out which cells they share.
    /// Callers must already have ruled out same-direction entries sharing a cell.
    fn build(
        width: usize,
        height: usize,
        fillable: Vec<Vec<bool>>,
        mut entries: Vec<GridEntry>,
    ) -> Result<Puzzle, MalformedPuzzle> {
        entries.sort_by_key(|entry| (entry.loc, entry.dir));

        // Clue numbers go to distinct start cells in scan order, which is the order we just
        // sorted into.
        let mut numbers: HashMap<GridCoord, usize> = HashMap::new();
        for entry in &entries {
            let next = numbers.len() + 1;
            numbers.entry(entry.loc).or_insert(next);
        }

        // Map from cell location to (entry index, cell index within entry).
        let mut cell_by_loc: HashMap<GridCoord, SmallVec<[(usize, usize); 2]>> = HashMap::new();
        for (entry_idx, entry) in entries.iter().enumerate() {
            for (cell_idx, loc) in entry.cell_coords().enumerate() {
                cell_by_loc.entry(loc).or_insert_with(|| smallvec![]).push((entry_idx, cell_idx));
            }
        }

        let mut slots: Vec<Slot> = Vec::with_capacity(entries.len());
        let mut neighbors: Vec<SmallVec<[SlotId; MAX_NEIGHBORS]>> = Vec::with_capacity(entries.len());

        for (entry_idx, entry) in entries.iter().enumerate() {
            let mut crossings: SmallVec<[Option<Crossing>; MAX_SLOT_LENGTH]> = smallvec![];
            let mut slot_neighbors: SmallVec<[SlotId; MAX_NEIGHBORS]> = smallvec![];

            for loc in entry.cell_coords() {
                let other = cell_by_loc[&loc].iter().find(|&&(e, _)| e != entry_idx);

                match other {
                    Some(&(other_slot_id, other_slot_cell)) => {
                        if entries[other_slot_id].dir == entry.dir {
                            let (first, second) = (entry_idx.min(other_slot_id), entry_idx.max(other_slot_id));
                            return Err(MalformedPuzzle::OverlappingSlots { first, second });
                        }
                        crossings.push(Some(Crossing { other_slot_id, other_slot_cell }));
                        slot_neighbors.push(other_slot_id);
                    }
                    None => crossings.push(None),
                }
            }

            slots.push(Slot {
                id: entry_idx,
                number: numbers[&entry.loc],
                start_cell: entry.loc,
                direction: entry.dir,
                length: entry.len,
                crossings,
            });
            neighbors.push(slot_neighbors);
        }

        debug!("built {}x{} puzzle with {} slots", width, height, slots.len());

        Ok(Puzzle { width, height, fillable, slots, neighbors })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_fillable(&self, loc: GridCoord) -> bool {
        self.fillable.get(loc.0).and_then(|row| row.get(loc.1)).cloned().unwrap_or(false)
    }

    /// All slots, in canonical order (so `slots()[id].id == id`).
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, slot_id: SlotId) -> &Slot {
        &self.slots[slot_id]
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// The slots crossing the given slot, in the order of the cells where they cross it.
    pub fn neighbors(&self, slot_id: SlotId) -> &[SlotId] {
        &self.neighbors[slot_id]
    }

    pub fn are_neighbors(&self, a: SlotId, b: SlotId) -> bool {
        self.overlap(a, b).is_some()
    }

    /// The offsets `(ia, ib)` at which the words in slots `a` and `b` must agree, or `None` if
    /// the slots don't cross.
    pub fn overlap(&self, a: SlotId, b: SlotId) -> Option<(usize, usize)> {
        self.slots[a].crossings.iter().enumerate().find_map(|(cell_idx, crossing)| {
            match crossing {
                Some(crossing) if crossing.other_slot_id == b => Some((cell_idx, crossing.other_slot_cell)),
                _ => None,
            }
        })
    }

    /// Every ordered pair of crossing slots, in both directions.
    pub fn arcs(&self) -> Vec<(SlotId, SlotId)> {
        self.slots.iter()
            .flat_map(|slot| self.neighbors(slot.id).iter().map(move |&other| (slot.id, other)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::error::MalformedPuzzle;
    use crate::grid::{Direction::{Across, Down}, GridEntry, Puzzle};

    #[test]
    fn test_slots_from_template() {
        let puzzle = Puzzle::from_template(
            "
            #___#
            #_##_
            #_##_
            #_##_
            #____
            ",
        ).expect("valid template");

        assert_eq!(puzzle.width(), 5);
        assert_eq!(puzzle.height(), 5);

        let summary: Vec<_> = puzzle.slots().iter()
            .map(|slot| (slot.start_cell, slot.direction, slot.length, slot.number))
            .collect();
        assert_eq!(summary, vec![
            ((0, 1), Across, 3, 1),
            ((0, 1), Down, 5, 1),
            ((1, 4), Down, 4, 2),
            ((4, 1), Across, 4, 3),
        ]);

        for (idx, slot) in puzzle.slots().iter().enumerate() {
            assert_eq!(slot.id, idx);
        }
    }

    #[test]
    fn test_overlaps_are_symmetric() {
        let puzzle = Puzzle::from_template(
            "
            #___#
            #_##_
            #_##_
            #_##_
            #____
            ",
        ).unwrap();

        assert_eq!(puzzle.overlap(0, 1), Some((0, 0)));
        assert_eq!(puzzle.overlap(1, 0), Some((0, 0)));
        assert_eq!(puzzle.overlap(1, 3), Some((4, 0)));
        assert_eq!(puzzle.overlap(3, 1), Some((0, 4)));
        assert_eq!(puzzle.overlap(2, 3), Some((3, 3)));
        assert_eq!(puzzle.overlap(0, 2), None, "slots without a shared cell");
        assert_eq!(puzzle.overlap(0, 0), None);
        assert!(!puzzle.are_neighbors(0, 3));

        assert_eq!(puzzle.neighbors(1), &[0, 3]);
        assert_eq!(puzzle.neighbors(3), &[1, 2]);
        assert_eq!(puzzle.arcs().len(), 6);
    }

    #[test]
    fn test_single_cells_are_not_slots() {
        let puzzle = Puzzle::from_template(
            "
            _#_
            ###
            _#_
            ",
        ).unwrap();

        assert_eq!(puzzle.slot_count(), 0);
        assert!(puzzle.is_fillable((0, 0)));
        assert!(!puzzle.is_fillable((0, 1)));
        assert!(!puzzle.is_fillable((7, 7)));
    }

    #[test]
    fn test_empty_template() {
        let puzzle = Puzzle::from_template("").unwrap();

        assert_eq!(puzzle.slot_count(), 0);
        assert!(puzzle.arcs().is_empty());
    }

    #[test]
    fn test_non_rectangular_mask_is_rejected() {
        let err = Puzzle::from_template(
            "
            ___
            __
            ",
        ).expect_err("ragged rows");

        assert_eq!(err, MalformedPuzzle::NonRectangular { row: 1, expected: 3, found: 2 });
    }

    #[test]
    fn test_unknown_cell_is_rejected() {
        let err = Puzzle::from_template("_x_").expect_err("unknown cell");

        assert_eq!(err, MalformedPuzzle::UnknownCell { row: 0, column: 1, ch: 'x' });
    }

    #[test]
    fn test_entries_are_sorted_and_crossed() {
        let puzzle = Puzzle::from_entries(4, 2, &[
            GridEntry { loc: (1, 0), len: 3, dir: Across },
            GridEntry { loc: (0, 2), len: 2, dir: Down },
            GridEntry { loc: (0, 1), len: 3, dir: Across },
        ]).unwrap();

        let starts: Vec<_> = puzzle.slots().iter().map(|slot| (slot.start_cell, slot.direction)).collect();
        assert_eq!(starts, vec![((0, 1), Across), ((0, 2), Down), ((1, 0), Across)]);

        assert_eq!(puzzle.overlap(0, 1), Some((1, 0)));
        assert_eq!(puzzle.overlap(2, 1), Some((2, 1)));
        assert_eq!(puzzle.overlap(0, 2), None);
        assert!(!puzzle.is_fillable((0, 0)));
        assert!(puzzle.is_fillable((1, 0)));
    }

    #[test]
    fn test_bad_entries_are_rejected() {
        assert_eq!(
            Puzzle::from_entries(3, 3, &[GridEntry { loc: (0, 0), len: 0, dir: Across }]).unwrap_err(),
            MalformedPuzzle::EmptySlot { entry: 0 },
        );
        assert_eq!(
            Puzzle::from_entries(3, 3, &[GridEntry { loc: (1, 1), len: 3, dir: Down }]).unwrap_err(),
            MalformedPuzzle::SlotOutOfBounds { entry: 0 },
        );
        assert_eq!(
            Puzzle::from_entries(4, 1, &[
                GridEntry { loc: (0, 0), len: 2, dir: Across },
                GridEntry { loc: (0, usize::MAX), len: 2, dir: Across },
            ]).unwrap_err(),
            MalformedPuzzle::SlotOutOfBounds { entry: 1 },
        );
        assert_eq!(
            Puzzle::from_entries(1, 4, &[GridEntry { loc: (usize::MAX - 1, 0), len: 3, dir: Down }])
                .unwrap_err(),
            MalformedPuzzle::SlotOutOfBounds { entry: 0 },
        );
        assert_eq!(
            Puzzle::from_entries(4, 1, &[
                GridEntry { loc: (0, 0), len: 3, dir: Across },
                GridEntry { loc: (0, 1), len: 3, dir: Across },
            ]).unwrap_err(),
            MalformedPuzzle::OverlappingSlots { first: 0, second: 1 },
        );
    }
}
