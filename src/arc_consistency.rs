//! Queue-based arc consistency (AC-3) over the crossings of a puzzle.

use std::collections::HashSet;

use log::debug;

use crate::domains::Domains;
use crate::grid::Puzzle;
use crate::word_list::{WordId, WordList};
use crate::SlotId;

/// An ordered pair of crossing slots `(x, y)`: revising it makes `x` consistent with `y`.
pub type SlotArc = (SlotId, SlotId);

/// Returned when propagation wipes out every candidate for a slot, which means the puzzle can't be
/// filled from these domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcConsistencyFailure {
    pub emptied_slot_id: SlotId,
}

pub type ArcConsistencyResult = Result<(), ArcConsistencyFailure>;

/// Work-list used by `enforce_arc_consistency`. Arcs are popped last-in first-out, and an arc
/// that's already waiting isn't queued a second time.
#[derive(Debug)]
struct ArcQueue {
    stack: Vec<SlotArc>,
    queued: HashSet<SlotArc>,
}

impl ArcQueue {
    fn with_initial_arcs<Arcs>(arcs: Arcs) -> ArcQueue
    where
        Arcs: IntoIterator<Item = SlotArc>,
    {
        let mut queue = ArcQueue { stack: vec![], queued: HashSet::new() };
        for arc in arcs {
            queue.enqueue(arc);
        }
        queue
    }

    fn pop(&mut self) -> Option<SlotArc> {
        let arc = self.stack.pop()?;
        self.queued.remove(&arc);
        Some(arc)
    }

    fn enqueue(&mut self, arc: SlotArc) {
        if self.queued.insert(arc) {
            self.stack.push(arc);
        }
    }
}

/// Every `(x, y)` where `y` crosses `x`.
pub fn all_arcs(puzzle: &Puzzle) -> Vec<SlotArc> {
    (0..puzzle.slot_count())
        .flat_map(|x| puzzle.neighbors(x).map(move |y| (x, y)))
        .collect()
}

/// Make `x` arc consistent with `y` by removing every candidate for `x` that doesn't share its
/// letter on the crossing cell with at least one candidate for `y`. Returns whether anything was
/// removed. Slots that don't cross are left alone.
pub fn revise(puzzle: &Puzzle, words: &WordList, domains: &mut Domains, x: SlotId, y: SlotId) -> bool {
    let Some((i, j)) = puzzle.overlap(x, y) else {
        return false;
    };

    // The letters `y` can still put on the shared cell. If `y` has no candidates this is empty and
    // every candidate for `x` goes.
    let supported: HashSet<char> = domains
        .iter(y)
        .filter_map(|word_id| words.get(word_id).glyphs.get(j).copied())
        .collect();

    let failed_words: Vec<WordId> = domains
        .iter(x)
        .filter(|&word_id| {
            words
                .get(word_id)
                .glyphs
                .get(i)
                .map_or(true, |glyph| !supported.contains(glyph))
        })
        .collect();

    if failed_words.is_empty() {
        return false;
    }

    domains.remove_all(x, &failed_words);
    true
}

/// Propagate crossing constraints until every remaining candidate has support in each crossing
/// slot. Starts from `initial_arcs` if given, otherwise from every arc in the puzzle. Fails as soon
/// as any slot runs out of candidates.
pub fn enforce_arc_consistency(
    puzzle: &Puzzle,
    words: &WordList,
    domains: &mut Domains,
    initial_arcs: Option<Vec<SlotArc>>,
) -> ArcConsistencyResult {
    let mut queue = ArcQueue::with_initial_arcs(initial_arcs.unwrap_or_else(|| all_arcs(puzzle)));
    let initial_candidates = domains.total_len();
    let mut revisions = 0;

    while let Some((x, y)) = queue.pop() {
        if !revise(puzzle, words, domains, x, y) {
            continue;
        }
        revisions += 1;

        if domains.is_empty(x) {
            debug!("Arc consistency emptied slot {} after {} revisions", x, revisions);
            return Err(ArcConsistencyFailure { emptied_slot_id: x });
        }

        // Anything crossing `x` may have just lost its support there.
        for z in puzzle.neighbors(x) {
            if z != y {
                queue.enqueue((z, x));
            }
        }
    }

    debug!(
        "Arc consistency made {} revisions, removing {} candidates",
        revisions,
        initial_candidates - domains.total_len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::arc_consistency::{all_arcs, enforce_arc_consistency, revise, ArcConsistencyFailure};
    use crate::domains::Domains;
    use crate::grid::{Grid, Puzzle};
    use crate::word_list::WordList;

    /// Slot 0 is across, slot 1 is down; the last letter of slot 0 is the first letter of slot 1.
    ///
    /// ___
    /// ##_
    /// ##_
    fn corner_puzzle() -> Puzzle {
        Puzzle::new(Grid::from_template("___\n##_\n##_").unwrap())
    }

    fn node_consistent_domains(puzzle: &Puzzle, words: &WordList) -> Domains {
        let mut domains = Domains::initialize(puzzle, words);
        domains.enforce_node_consistency(puzzle, words);
        domains
    }

    fn assert_supported(puzzle: &Puzzle, words: &WordList, domains: &Domains, x: usize, y: usize) {
        let (i, j) = puzzle.overlap(x, y).expect("slots cross");
        for word_x in domains.iter(x) {
            assert!(
                domains.iter(y).any(|word_y| words.get(word_x).glyphs[i] == words.get(word_y).glyphs[j]),
                "{} has no support in slot {}",
                words.get(word_x).string,
                y
            );
        }
    }

    #[test]
    fn test_revise_removes_unsupported_words() {
        let puzzle = corner_puzzle();
        let words = WordList::new(["cat", "dog", "tab", "gum"]);
        let mut domains = node_consistent_domains(&puzzle, &words);

        assert_eq!(puzzle.overlap(0, 1), Some((2, 0)));
        assert!(revise(&puzzle, &words, &mut domains, 0, 1));
        assert_eq!(domains.iter(0).collect::<Vec<_>>(), vec![0, 1]);

        assert!(!revise(&puzzle, &words, &mut domains, 0, 1));
        assert_supported(&puzzle, &words, &domains, 0, 1);

        // The other direction is untouched until it's revised.
        assert_eq!(domains.len(1), 4);
    }

    #[test]
    fn test_revise_against_empty_domain_removes_everything() {
        let puzzle = corner_puzzle();
        let words = WordList::new(["cat", "tab"]);
        let mut domains = node_consistent_domains(&puzzle, &words);
        domains.remove_all(1, &[0, 1]);

        assert!(revise(&puzzle, &words, &mut domains, 0, 1));
        assert!(domains.is_empty(0));
    }

    #[test]
    fn test_revise_ignores_slots_that_dont_cross() {
        let puzzle = Puzzle::new(Grid::from_template("___\n###\n___").unwrap());
        let words = WordList::new(["cat", "dog"]);
        let mut domains = node_consistent_domains(&puzzle, &words);

        assert!(!revise(&puzzle, &words, &mut domains, 0, 1));
        assert_eq!(domains.total_len(), 4);
    }

    #[test]
    fn test_arc_consistency_detects_unsatisfiable_crossing() {
        let puzzle = corner_puzzle();
        let words = WordList::new(["cat", "dog"]);
        let mut domains = node_consistent_domains(&puzzle, &words);

        assert!(matches!(
            enforce_arc_consistency(&puzzle, &words, &mut domains, None),
            Err(ArcConsistencyFailure { .. })
        ));
    }

    #[test]
    fn test_arc_consistency_is_idempotent_and_only_shrinks() {
        let puzzle = Puzzle::new(
            Grid::from_template(
                "
                #___#
                #_##_
                #_##_
                #_##_
                #____
                ",
            )
            .unwrap(),
        );
        let words = WordList::new([
            "ONE", "TWO", "SIX", "TEN", "FIVE", "NINE", "FOUR", "ZERO", "SEVEN", "EIGHT", "THREE",
        ]);
        let mut domains = node_consistent_domains(&puzzle, &words);
        let before = domains.clone();

        assert_eq!(enforce_arc_consistency(&puzzle, &words, &mut domains, None), Ok(()));
        assert!(domains.is_subset_of(&before));
        assert!(domains.total_len() < before.total_len());

        // The down slot of length five can only be SEVEN once everything is propagated.
        assert_eq!(domains.iter(2).collect::<Vec<_>>(), vec![words.id_of("SEVEN").unwrap()]);

        for (x, y) in all_arcs(&puzzle) {
            assert_supported(&puzzle, &words, &domains, x, y);
        }

        let after_first_run = domains.clone();
        assert_eq!(enforce_arc_consistency(&puzzle, &words, &mut domains, None), Ok(()));
        assert_eq!(domains, after_first_run);
    }

    #[test]
    fn test_arc_consistency_with_initial_arcs_only() {
        let puzzle = corner_puzzle();
        let words = WordList::new(["cat", "dog", "tab", "gum"]);
        let mut domains = node_consistent_domains(&puzzle, &words);

        assert_eq!(enforce_arc_consistency(&puzzle, &words, &mut domains, Some(vec![(0, 1)])), Ok(()));

        // Revising (0, 1) removed words from 0, which queues nothing since 1 is 0's only neighbor.
        assert_eq!(domains.len(0), 2);
        assert_eq!(domains.len(1), 4);
    }
}
