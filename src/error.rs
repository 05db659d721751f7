use std::fmt::{Display, Formatter};
use std::io;

use crate::SlotId;

/// Ways in which a grid description can be inconsistent. These are detected while building a
/// `Puzzle`, before any solving happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedPuzzle {
    /// A row of the grid has a different number of cells than the first row.
    NonRectangular { row: usize, expected: usize, found: usize },

    /// A template contained a character that is neither a fillable nor a blocked cell.
    UnknownCell { row: usize, column: usize, ch: char },

    /// An explicit entry has length zero.
    EmptySlot { entry: usize },

    /// An explicit entry runs past the edge of the grid.
    SlotOutOfBounds { entry: usize },

    /// Two explicit entries with the same direction share a cell.
    OverlappingSlots { first: usize, second: usize },
}

impl Display for MalformedPuzzle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedPuzzle::NonRectangular { row, expected, found } => write!(
                f, "row {} has {} cells, expected {}", row, found, expected,
            ),
            MalformedPuzzle::UnknownCell { row, column, ch } => write!(
                f, "unknown cell {:?} at row {}, column {}", ch, row, column,
            ),
            MalformedPuzzle::EmptySlot { entry } => write!(f, "entry {} has length 0", entry),
            MalformedPuzzle::SlotOutOfBounds { entry } => {
                write!(f, "entry {} extends past the edge of the grid", entry)
            }
            MalformedPuzzle::OverlappingSlots { first, second } => write!(
                f, "entries {} and {} run in the same direction through a shared cell", first, second,
            ),
        }
    }
}

impl std::error::Error for MalformedPuzzle {}

/// Errors raised while loading puzzle inputs.
#[derive(Debug)]
pub enum PuzzleError {
    Io(io::Error),
    Malformed(MalformedPuzzle),
}

impl Display for PuzzleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PuzzleError::Io(err) => write!(f, "failed to read input: {}", err),
            PuzzleError::Malformed(err) => write!(f, "malformed puzzle: {}", err),
        }
    }
}

impl std::error::Error for PuzzleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PuzzleError::Io(err) => Some(err),
            PuzzleError::Malformed(err) => Some(err),
        }
    }
}

impl From<io::Error> for PuzzleError {
    fn from(err: io::Error) -> Self {
        PuzzleError::Io(err)
    }
}

impl From<MalformedPuzzle> for PuzzleError {
    fn from(err: MalformedPuzzle) -> Self {
        PuzzleError::Malformed(err)
    }
}

/// Reasons a fill attempt can end without a complete assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FillFailure {
    /// Arc consistency emptied the domain of the given slot.
    Unsatisfiable { slot: SlotId },

    /// Backtracking search tried every branch without completing the grid.
    Exhausted,

    /// The configured deadline passed before the search finished.
    DeadlineExceeded,
}

impl FillFailure {
    /// Is this a definitive negative answer, as opposed to giving up early?
    pub fn is_no_solution(&self) -> bool {
        !matches!(self, FillFailure::DeadlineExceeded)
    }
}

impl Display for FillFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FillFailure::Unsatisfiable { slot } => {
                write!(f, "no solution: slot {} has no consistent words", slot)
            }
            FillFailure::Exhausted => write!(f, "no solution: search space exhausted"),
            FillFailure::DeadlineExceeded => write!(f, "deadline exceeded before a fill was found"),
        }
    }
}

impl std::error::Error for FillFailure {}
