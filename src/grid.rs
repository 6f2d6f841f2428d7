use std::collections::HashMap;

use smallvec::{smallvec, SmallVec};

use crate::errors::ModelError;
use crate::{SlotId, MAX_SLOT_LENGTH};

/// Zero-indexed (row, col) coords for a cell in the grid, where row = 0 is the top row.
pub type GridCoord = (usize, usize);

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

/// A maximal run of fillable cells that holds one word. Two slots are the same slot iff all four
/// fields match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub row: usize,
    pub col: usize,
    pub length: usize,
    pub direction: Direction,
}

impl Slot {
    /// The grid cell holding the character at `idx` of this slot's word.
    pub fn cell(&self, idx: usize) -> GridCoord {
        match self.direction {
            Direction::Across => (self.row, self.col + idx),
            Direction::Down => (self.row + idx, self.col),
        }
    }

    /// Generate the coords for each cell of this slot, in word order.
    pub fn cells(self) -> impl Iterator<Item = GridCoord> {
        (0..self.length).map(move |idx| self.cell(idx))
    }
}

/// A crossing between one slot and another, referencing the other slot's id and the location of
/// the intersection within both slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub cell: usize,
    pub other_slot_id: SlotId,
    pub other_slot_cell: usize,
}

/// The fixed structural template: `true` where a letter may be placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<bool>>,
    width: usize,
}

impl Grid {
    /// Build a grid from rows of fillable flags. All rows must have the same width.
    pub fn new(rows: Vec<Vec<bool>>) -> Result<Grid, ModelError> {
        let width = rows.first().map(|row| row.len()).unwrap_or(0);

        if let Some((row, found)) = rows
            .iter()
            .map(|cells| cells.len())
            .enumerate()
            .find(|&(_, len)| len != width)
        {
            return Err(ModelError::RaggedRow { row, expected: width, found });
        }

        Ok(Grid { rows, width })
    }

    /// Build a grid from a string template, with `_` or `.` representing fillable cells and
    /// anything else (usually `#`) representing blocks.
    pub fn from_template(template: &str) -> Result<Grid, ModelError> {
        let rows: Vec<Vec<bool>> = template
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().map(|c| c == '_' || c == '.').collect())
            .collect();

        Grid::new(rows)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_fillable(&self, (row, col): GridCoord) -> bool {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .copied()
            .unwrap_or(false)
    }
}

/// Push a slot for every maximal run of at least two fillable cells in `cells`. `make_slot` turns
/// a (start index, length) pair into a slot.
fn push_runs<Cells, MakeSlot>(cells: Cells, make_slot: MakeSlot, slots: &mut Vec<Slot>)
where
    Cells: IntoIterator<Item = bool>,
    MakeSlot: Fn(usize, usize) -> Slot,
{
    let mut run_start: Option<usize> = None;
    let mut end = 0;

    for (idx, fillable) in cells.into_iter().enumerate() {
        end = idx + 1;
        match (fillable, run_start) {
            (true, None) => run_start = Some(idx),
            (false, Some(start)) => {
                if idx - start > 1 {
                    slots.push(make_slot(start, idx - start));
                }
                run_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = run_start {
        if end - start > 1 {
            slots.push(make_slot(start, end - start));
        }
    }
}

/// The grid together with everything derived from it: the slots and the crossings between them.
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct Puzzle {
    grid: Grid,
    slots: Vec<Slot>,
    crossings: Vec<SmallVec<[Crossing; MAX_SLOT_LENGTH]>>,
}

impl Puzzle {
    /// Derive slots and crossings from a grid. Across slots come first in row-major order, then
    /// down slots in column-major order; a slot's index in that order is its `SlotId`.
    pub fn new(grid: Grid) -> Puzzle {
        let mut slots: Vec<Slot> = vec![];

        for row in 0..grid.height() {
            push_runs(
                grid.rows[row].iter().copied(),
                |col, length| Slot { row, col, length, direction: Direction::Across },
                &mut slots,
            );
        }

        for col in 0..grid.width() {
            push_runs(
                (0..grid.height()).map(|row| grid.rows[row][col]),
                |row, length| Slot { row, col, length, direction: Direction::Down },
                &mut slots,
            );
        }

        // Build a map from cell location to the slots passing through it, which we can then use
        // to calculate crossings. Each cell holds at most one across and one down slot.
        let mut cell_by_loc: HashMap<GridCoord, SmallVec<[(SlotId, usize); 2]>> = HashMap::new();

        for (slot_id, slot) in slots.iter().enumerate() {
            for (cell_idx, loc) in slot.cells().enumerate() {
                cell_by_loc
                    .entry(loc)
                    .or_insert_with(|| smallvec![])
                    .push((slot_id, cell_idx));
            }
        }

        let crossings = slots
            .iter()
            .enumerate()
            .map(|(slot_id, slot)| {
                slot.cells()
                    .enumerate()
                    .flat_map(|(cell_idx, loc)| {
                        cell_by_loc[&loc]
                            .iter()
                            .filter(|&&(other_slot_id, _)| other_slot_id != slot_id)
                            .map(move |&(other_slot_id, other_slot_cell)| Crossing {
                                cell: cell_idx,
                                other_slot_id,
                                other_slot_cell,
                            })
                            .collect::<SmallVec<[Crossing; 1]>>()
                    })
                    .collect()
            })
            .collect();

        Puzzle { grid, slots, crossings }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, slot_id: SlotId) -> &Slot {
        &self.slots[slot_id]
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Look up the id of a slot by its geometry.
    pub fn slot_id(&self, slot: &Slot) -> Option<SlotId> {
        self.slots.iter().position(|candidate| candidate == slot)
    }

    pub fn crossings(&self, slot_id: SlotId) -> &[Crossing] {
        &self.crossings[slot_id]
    }

    /// Ids of every slot sharing a cell with `slot_id`.
    pub fn neighbors(&self, slot_id: SlotId) -> impl Iterator<Item = SlotId> + '_ {
        self.crossings[slot_id].iter().map(|crossing| crossing.other_slot_id)
    }

    /// Number of neighbors. An across and a down slot share at most one cell, so this is also the
    /// crossing count.
    pub fn degree(&self, slot_id: SlotId) -> usize {
        self.crossings[slot_id].len()
    }

    /// The index into each slot's word of the cell the two slots share, if any.
    pub fn overlap(&self, a: SlotId, b: SlotId) -> Option<(usize, usize)> {
        if a == b {
            return None;
        }

        self.crossings[a]
            .iter()
            .find(|crossing| crossing.other_slot_id == b)
            .map(|crossing| (crossing.cell, crossing.other_slot_cell))
    }
}
