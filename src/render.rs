use crate::grid::Puzzle;
use crate::search::Assignment;
use crate::words::WordList;

/// Character used for blocked cells.
pub const BLOCK: char = '█';

/// Lay the assignment out on the grid, one line per row. Blocked cells are drawn as `█` and
/// fillable cells without a letter as spaces. No checking is done here; if two crossing words
/// disagree, the later slot's letter wins.
pub fn render_grid(puzzle: &Puzzle, words: &WordList, assignment: &Assignment) -> String {
    let mut letters: Vec<Vec<Option<char>>> = vec![vec![None; puzzle.width()]; puzzle.height()];

    for choice in assignment.choices() {
        let slot = puzzle.slot(choice.slot_id);
        let word = words.word(choice.word_id);

        for ((row, column), &c) in slot.cell_coords().zip(word.chars.iter()) {
            letters[row][column] = Some(c);
        }
    }

    letters.iter().enumerate().map(|(row, line)| {
        line.iter().enumerate().map(|(column, letter)| {
            if puzzle.is_fillable((row, column)) {
                letter.unwrap_or(' ')
            } else {
                BLOCK
            }
        }).collect::<String>()
    }).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use crate::grid::{Direction::{Across, Down}, GridEntry, Puzzle};
    use crate::render::render_grid;
    use crate::search::{find_fill, Assignment};
    use crate::words::WordList;

    fn three_slot_puzzle() -> Puzzle {
        Puzzle::from_entries(4, 2, &[
            GridEntry { loc: (0, 1), len: 3, dir: Across },
            GridEntry { loc: (1, 0), len: 3, dir: Across },
            GridEntry { loc: (0, 2), len: 2, dir: Down },
        ]).unwrap()
    }

    #[test]
    fn test_render_complete_fill() {
        let puzzle = three_slot_puzzle();
        let words = WordList::new(["cat", "car", "at"]);

        let result = find_fill(&puzzle, &words).expect("Failed to find a fill");

        assert_eq!(render_grid(&puzzle, &words, &result.assignment), "█CAR\nCAT█");
    }

    #[test]
    fn test_render_partial_fill() {
        let puzzle = three_slot_puzzle();
        let words = WordList::new(["cat", "car", "at"]);
        let mut assignment = Assignment::new(puzzle.slot_count());

        assert_eq!(render_grid(&puzzle, &words, &assignment), "█   \n   █");

        assignment.assign(1, 2);
        assert_eq!(render_grid(&puzzle, &words, &assignment), "█ A \n  T█");
    }

    #[test]
    fn test_render_empty_grid() {
        let puzzle = Puzzle::from_template("").unwrap();

        assert_eq!(render_grid(&puzzle, &WordList::default(), &Assignment::new(0)), "");
    }
}
