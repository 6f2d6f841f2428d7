//! Fill a crossword grid from a word list by treating it as a constraint satisfaction problem:
//! node and arc consistency prune each slot's candidates, then a backtracking search assigns one
//! word per slot so that every crossing agrees.

pub mod arc_consistency;
pub mod backtracking_search;
pub mod domains;
pub mod errors;
pub mod grid;
pub mod log;
pub mod render;
pub mod word_list;

pub use backtracking_search::{find_fill, Assignment, FillFailure, FillOptions, FillSuccess, Solver, Statistics};
pub use errors::ModelError;
pub use grid::{Direction, Grid, Puzzle, Slot};
pub use render::{letter_grid, render_grid};
pub use word_list::{Word, WordId, WordList};

/// The expected maximum number of slots appearing in a grid.
pub const MAX_SLOT_COUNT: usize = 256;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;

/// How many search states do we visit between checks of the time budget?
pub const INTERRUPT_FREQUENCY: u64 = 10;

/// An identifier for a given slot, based on its index in the puzzle's `slots()`.
pub type SlotId = usize;
