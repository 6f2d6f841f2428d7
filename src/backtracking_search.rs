//! Depth-first backtracking search over partial assignments. Slots are chosen by fewest remaining
//! candidates (ties go to the slot crossing the most others), and candidates are tried in
//! least-constraining order.

use std::cmp::Reverse;
use std::collections::HashMap;

use bit_set::BitSet;
use instant::{Duration, Instant};
use log::{debug, trace};
use smallvec::SmallVec;
use thiserror::Error;

use crate::arc_consistency::enforce_arc_consistency;
use crate::domains::Domains;
use crate::grid::{Crossing, Puzzle, Slot};
use crate::word_list::{WordId, WordList};
use crate::{SlotId, INTERRUPT_FREQUENCY, MAX_SLOT_COUNT};

/// A partial or complete mapping from slots to chosen words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    values: SmallVec<[Option<WordId>; MAX_SLOT_COUNT]>,
    assigned: BitSet,
}

impl Assignment {
    /// An empty assignment for a puzzle with `slot_count` slots.
    pub fn new(slot_count: usize) -> Assignment {
        Assignment {
            values: (0..slot_count).map(|_| None).collect(),
            assigned: BitSet::with_capacity(slot_count),
        }
    }

    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.values[slot_id]
    }

    pub fn insert(&mut self, slot_id: SlotId, word_id: WordId) {
        self.values[slot_id] = Some(word_id);
        self.assigned.insert(slot_id);
    }

    pub fn remove(&mut self, slot_id: SlotId) -> Option<WordId> {
        self.assigned.remove(slot_id);
        self.values[slot_id].take()
    }

    pub fn is_assigned(&self, slot_id: SlotId) -> bool {
        self.assigned.contains(slot_id)
    }

    /// Number of assigned slots.
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.assigned.len() == self.values.len()
    }

    /// Assigned `(slot, word)` pairs in slot id order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, WordId)> + '_ {
        self.assigned.iter().filter_map(|slot_id| self.values[slot_id].map(|word_id| (slot_id, word_id)))
    }

    /// Resolve ids into the slots and word strings they stand for.
    pub fn entries<'w>(&self, puzzle: &Puzzle, words: &'w WordList) -> Vec<(Slot, &'w str)> {
        self.iter()
            .map(|(slot_id, word_id)| (*puzzle.slot(slot_id), words.get(word_id).string.as_str()))
            .collect()
    }
}

/// Limits on how long the search may run. The default is unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillOptions {
    pub time_limit: Option<Duration>,
    pub state_limit: Option<u64>,
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    /// Search states visited, i.e. calls into the search that had a slot left to fill.
    pub states: u64,
    /// States whose every candidate failed.
    pub backtracks: u64,
    /// Candidates removed by node and arc consistency before the search started.
    pub initial_eliminations: usize,
    pub duration: Duration,
}

/// A struct representing the results of a fill operation.
#[derive(Debug)]
pub struct FillSuccess {
    pub assignment: Assignment,
    pub statistics: Statistics,
}

/// Why no fill was returned. Neither case is a fault in the solver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FillFailure {
    #[error("No fill exists for this grid and word list")]
    Unsatisfiable,

    #[error("Search budget exceeded after {states} states ({elapsed:?})")]
    BudgetExceeded { states: u64, elapsed: Duration },
}

/// A single solving session. Owns the domains for the puzzle and mutates them in place.
pub struct Solver<'a> {
    puzzle: &'a Puzzle,
    words: &'a WordList,
    domains: Domains,
    options: FillOptions,
    statistics: Statistics,
    start: Instant,
}

impl<'a> Solver<'a> {
    pub fn new(puzzle: &'a Puzzle, words: &'a WordList, options: FillOptions) -> Solver<'a> {
        Solver {
            puzzle,
            words,
            domains: Domains::initialize(puzzle, words),
            options,
            statistics: Statistics::default(),
            start: Instant::now(),
        }
    }

    pub fn domains(&self) -> &Domains {
        &self.domains
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Enforce node and arc consistency, then search for a complete, consistent assignment.
    pub fn solve(&mut self) -> Result<Assignment, FillFailure> {
        self.start = Instant::now();
        self.statistics = Statistics::default();

        let candidates_before = self.domains.total_len();
        self.domains.enforce_node_consistency(self.puzzle, self.words);

        let arc_consistency = enforce_arc_consistency(self.puzzle, self.words, &mut self.domains, None);
        self.statistics.initial_eliminations = candidates_before - self.domains.total_len();

        if let Err(failure) = arc_consistency {
            self.statistics.duration = self.start.elapsed();
            debug!("No fill: slot {} has no candidates left", failure.emptied_slot_id);
            return Err(FillFailure::Unsatisfiable);
        }

        let mut assignment = Assignment::new(self.puzzle.slot_count());
        let filled = self.backtrack(&mut assignment);
        self.statistics.duration = self.start.elapsed();

        match filled {
            Ok(true) => {
                debug!("Filled {} slots: {:?}", assignment.len(), self.statistics);
                Ok(assignment)
            }
            Ok(false) => {
                debug!("Search exhausted: {:?}", self.statistics);
                Err(FillFailure::Unsatisfiable)
            }
            Err(failure) => {
                debug!("Search aborted: {}", failure);
                Err(failure)
            }
        }
    }

    /// Extend `assignment` to a complete fill if possible. `Ok(false)` means no completion exists
    /// from this partial state, in which case `assignment` is left as it was passed in.
    fn backtrack(&mut self, assignment: &mut Assignment) -> Result<bool, FillFailure> {
        let Some(slot_id) = self.select_unassigned_slot(assignment) else {
            return Ok(true);
        };

        self.statistics.states += 1;
        self.check_budget()?;

        for word_id in self.order_domain_values(slot_id, assignment) {
            assignment.insert(slot_id, word_id);

            if self.is_consistent_choice(assignment, slot_id) && self.backtrack(assignment)? {
                return Ok(true);
            }

            assignment.remove(slot_id);
        }

        self.statistics.backtracks += 1;
        trace!("Backtracking from slot {} with {} slots assigned", slot_id, assignment.len());

        Ok(false)
    }

    fn check_budget(&self) -> Result<(), FillFailure> {
        let states = self.statistics.states;

        let over_state_limit = self.options.state_limit.map_or(false, |limit| states > limit);
        let over_time_limit = self.options.time_limit.map_or(false, |limit| {
            (states - 1) % INTERRUPT_FREQUENCY == 0 && self.start.elapsed() >= limit
        });

        if over_state_limit || over_time_limit {
            return Err(FillFailure::BudgetExceeded { states, elapsed: self.start.elapsed() });
        }

        Ok(())
    }

    /// Choose the unassigned slot with the fewest remaining candidates, preferring the one that
    /// crosses the most slots and then the lowest id. Returns `None` once every slot is assigned.
    pub fn select_unassigned_slot(&self, assignment: &Assignment) -> Option<SlotId> {
        (0..self.puzzle.slot_count())
            .filter(|&slot_id| !assignment.is_assigned(slot_id))
            .min_by_key(|&slot_id| (self.domains.len(slot_id), Reverse(self.puzzle.degree(slot_id))))
    }

    /// The slot's candidates, ordered by how many candidates each one would rule out in unassigned
    /// crossing slots, fewest first. Ties keep id order. The domain itself isn't touched.
    pub fn order_domain_values(&self, slot_id: SlotId, assignment: &Assignment) -> Vec<WordId> {
        // For each unassigned crossing: the cell in this slot, the crossing slot's candidate count,
        // and how many of those candidates put each letter on the shared cell.
        let crossing_letter_counts: Vec<(usize, usize, HashMap<char, usize>)> = self
            .puzzle
            .crossings(slot_id)
            .iter()
            .filter(|crossing| !assignment.is_assigned(crossing.other_slot_id))
            .map(|crossing| {
                let mut counts: HashMap<char, usize> = HashMap::new();
                for word_id in self.domains.iter(crossing.other_slot_id) {
                    if let Some(&glyph) = self.words.get(word_id).glyphs.get(crossing.other_slot_cell) {
                        *counts.entry(glyph).or_insert(0) += 1;
                    }
                }
                (crossing.cell, self.domains.len(crossing.other_slot_id), counts)
            })
            .collect();

        let mut values: Vec<WordId> = self.domains.iter(slot_id).collect();

        values.sort_by_cached_key(|&word_id| {
            let word = self.words.get(word_id);

            crossing_letter_counts
                .iter()
                .map(|(cell, total, counts)| {
                    let compatible = word.glyphs.get(*cell).and_then(|glyph| counts.get(glyph)).copied().unwrap_or(0);
                    total - compatible
                })
                .sum::<usize>()
        });

        values
    }

    /// Do the words on both sides of this crossing agree? Unassigned sides agree vacuously.
    fn crossing_agrees(&self, assignment: &Assignment, slot_id: SlotId, crossing: &Crossing) -> bool {
        match (assignment.get(slot_id), assignment.get(crossing.other_slot_id)) {
            (Some(word_id), Some(other_word_id)) => {
                let glyph = self.words.get(word_id).glyphs.get(crossing.cell);
                let other_glyph = self.words.get(other_word_id).glyphs.get(crossing.other_slot_cell);
                glyph.is_some() && glyph == other_glyph
            }
            _ => true,
        }
    }

    /// True iff every pair of assigned, crossing slots agrees on the shared letter. The same word
    /// may appear in more than one slot.
    pub fn is_consistent(&self, assignment: &Assignment) -> bool {
        assignment.iter().all(|(slot_id, _)| {
            self.puzzle
                .crossings(slot_id)
                .iter()
                .all(|crossing| self.crossing_agrees(assignment, slot_id, crossing))
        })
    }

    /// `is_consistent`, checking only the crossings of `slot_id`. Enough when the assignment was
    /// consistent before `slot_id` was assigned.
    fn is_consistent_choice(&self, assignment: &Assignment, slot_id: SlotId) -> bool {
        self.puzzle
            .crossings(slot_id)
            .iter()
            .all(|crossing| self.crossing_agrees(assignment, slot_id, crossing))
    }
}

/// Search for a valid fill for the given puzzle and word list.
pub fn find_fill(puzzle: &Puzzle, words: &WordList, options: FillOptions) -> Result<FillSuccess, FillFailure> {
    let mut solver = Solver::new(puzzle, words, options);
    let assignment = solver.solve()?;

    Ok(FillSuccess {
        assignment,
        statistics: solver.statistics.clone(),
    })
}
