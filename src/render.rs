use crate::backtracking_search::Assignment;
use crate::grid::Puzzle;
use crate::word_list::WordList;

/// Place each assigned word's letters on the grid: column increments for across slots, row
/// increments for down slots. Cells no assigned slot covers stay `None`.
pub fn letter_grid(puzzle: &Puzzle, words: &WordList, assignment: &Assignment) -> Vec<Vec<Option<char>>> {
    let grid = puzzle.grid();
    let mut letters: Vec<Vec<Option<char>>> = vec![vec![None; grid.width()]; grid.height()];

    for (slot_id, word_id) in assignment.iter() {
        let slot = puzzle.slot(slot_id);

        for ((row, col), &glyph) in slot.cells().zip(&words.get(word_id).glyphs) {
            letters[row][col] = Some(glyph);
        }
    }

    letters
}

/// Turn the given puzzle and assignment into a rendered string, one line per row. Blocks are drawn
/// as `█` and empty fillable cells as spaces.
pub fn render_grid(puzzle: &Puzzle, words: &WordList, assignment: &Assignment) -> String {
    let grid = puzzle.grid();

    letter_grid(puzzle, words, assignment)
        .iter()
        .enumerate()
        .map(|(row, letters)| {
            letters
                .iter()
                .enumerate()
                .map(|(col, letter)| match letter {
                    Some(letter) => *letter,
                    None if grid.is_fillable((row, col)) => ' ',
                    None => '█',
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use crate::backtracking_search::Assignment;
    use crate::grid::{Grid, Puzzle};
    use crate::render::{letter_grid, render_grid};
    use crate::word_list::WordList;

    fn corner_puzzle() -> Puzzle {
        Puzzle::new(Grid::from_template("___\n##_\n_#_").unwrap())
    }

    #[test]
    fn test_render_complete_assignment() {
        let puzzle = corner_puzzle();
        let words = WordList::new(["cat", "tip"]);
        let mut assignment = Assignment::new(puzzle.slot_count());
        assignment.insert(0, 0);
        assignment.insert(1, 1);

        assert_eq!(render_grid(&puzzle, &words, &assignment), "cat\n██i\n █p");
    }

    #[test]
    fn test_letter_grid_leaves_unassigned_cells_empty() {
        let puzzle = corner_puzzle();
        let words = WordList::new(["cat", "tip"]);
        let mut assignment = Assignment::new(puzzle.slot_count());
        assignment.insert(1, 1);

        let letters = letter_grid(&puzzle, &words, &assignment);

        assert_eq!(letters[0], vec![None, None, Some('t')]);
        assert_eq!(letters[2][2], Some('p'));
        assert_eq!(render_grid(&puzzle, &words, &assignment), "  t\n██i\n █p");
    }
}
