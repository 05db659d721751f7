//! Crossword filling as a constraint satisfaction problem.
//!
//! A `Puzzle` describes the slots of a grid and where they cross. Filling it starts every slot
//! off with the whole `WordList`, prunes by length (node consistency) and by crossing letters
//! (AC-3), and then runs a backtracking search that picks slots by fewest remaining candidates
//! and tries words that rule out the fewest crossing candidates first.
//!
//! ```
//! use xwfill::{find_fill, render_grid, Puzzle, WordList};
//!
//! let puzzle = Puzzle::from_template("___\n_#_\n___").unwrap();
//! let words = WordList::new(["ton", "tip", "nab", "pub"]);
//!
//! let result = find_fill(&puzzle, &words).expect("Failed to find a fill");
//! assert_eq!(render_grid(&puzzle, &words, &result.assignment), "TON\nI█A\nPUB");
//! ```

pub mod consistency;
pub mod domains;
pub mod error;
pub mod grid;
pub mod render;
pub mod search;
pub mod words;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

/// The expected maximum number of slots crossing a single slot.
pub const MAX_NEIGHBORS: usize = MAX_SLOT_LENGTH;

/// An identifier for a given slot, based on its index in the puzzle's canonical slot order.
pub type SlotId = usize;

/// An identifier for a given word, based on its index in the `WordList`.
pub type WordId = usize;

pub use consistency::{enforce_arc_consistency, enforce_node_consistency, revise};
pub use domains::Domains;
pub use error::{FillFailure, MalformedPuzzle, PuzzleError};
pub use grid::{Direction, GridEntry, Puzzle, Slot};
pub use render::render_grid;
pub use search::{find_fill, find_fill_with_options, Assignment, FillOptions, FillSuccess, Statistics};
pub use words::WordList;
