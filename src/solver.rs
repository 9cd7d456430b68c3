use crate::matrix::IncidenceMatrix;
use crate::{InputError, Meld, TileBag};
use serde::{Deserialize, Serialize};

/// Cross-platform time tracker for timeout handling
#[derive(Clone, Copy)]
struct TimeTracker {
    #[cfg(not(target_arch = "wasm32"))]
    start: std::time::Instant,
    #[cfg(target_arch = "wasm32")]
    start_ms: f64,
    limit_ms: Option<u64>,
}

impl TimeTracker {
    fn new(limit_ms: Option<u64>) -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            start: std::time::Instant::now(),
            #[cfg(target_arch = "wasm32")]
            start_ms: js_sys::Date::now(),
            limit_ms,
        }
    }

    fn is_expired(&self) -> bool {
        let Some(limit_ms) = self.limit_ms else {
            return false;
        };
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.start.elapsed() >= std::time::Duration::from_millis(limit_ms)
        }
        #[cfg(target_arch = "wasm32")]
        {
            let now = js_sys::Date::now();
            (now - self.start_ms) >= limit_ms as f64
        }
    }
}

/// What to report when the chosen sets use exactly the table's tiles and no
/// tile from the hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoveredTable {
    /// Succeed only while some candidate set is still unclaimed
    /// (claimed rows < total rows).
    #[default]
    SpareRow,
    /// Exact coverage is a success on its own.
    Accept,
}

/// Knobs for a single solver run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Abort the search after this many milliseconds; `None` searches to the end.
    pub time_limit_ms: Option<u64>,
    pub covered_table: CoveredTable,
}

/// Outcome of a solver run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    /// Whether the table can be rebuilt as described by `sets`
    pub solvable: bool,
    /// Chosen sets, in the order the search picked them. Empty when not solvable.
    pub sets: Vec<Meld>,
    /// False if the time limit cut the search short
    pub search_completed: bool,
    /// Number of search nodes entered
    pub nodes_visited: u64,
    /// Largest number of sets chosen along any branch
    pub depth_reached: usize,
}

/// Decide whether `table` can be rebuilt (optionally with tiles from `hand`)
/// and return one way to do it, with the default configuration.
pub fn solve(table: &TileBag, hand: &TileBag) -> Result<Solution, InputError> {
    solve_with_config(table, hand, &SolverConfig::default())
}

/// Parse tile tokens for both sides, then [`solve`].
pub fn solve_tokens<S: AsRef<str>>(table: &[S], hand: &[S]) -> Result<Solution, InputError> {
    let table = TileBag::from_tokens(table)?;
    let hand = TileBag::from_tokens(hand)?;
    solve(&table, &hand)
}

/// Validate the input, build the incidence matrix and run the backtracking search.
///
/// The search:
/// 1. Stops successfully once every table tile is accounted for, if at least
///    one hand tile was folded in (see [`CoveredTable`] for the other case).
/// 2. Otherwise picks the unsatisfied table tile found in the fewest
///    remaining sets, failing at once if that count is zero.
/// 3. Tries each remaining set containing it, in row order, and returns the
///    first branch that succeeds.
pub fn solve_with_config(
    table: &TileBag,
    hand: &TileBag,
    config: &SolverConfig,
) -> Result<Solution, InputError> {
    table.union(hand).validate()?;

    let matrix = IncidenceMatrix::build(table, hand);
    let mut search = Search::new(&matrix, table, *config);
    let root = Elimination::new(&matrix);
    let mut chosen = Vec::new();
    let step = search.explore(&root, &mut chosen);

    let (solvable, rows, search_completed) = match step {
        Step::Found(rows) => (true, rows, true),
        Step::Exhausted => (false, Vec::new(), true),
        Step::Interrupted => (false, Vec::new(), false),
    };

    log::debug!(
        "search finished: solvable={} sets={} nodes={} depth={} completed={}",
        solvable,
        rows.len(),
        search.nodes_visited,
        search.depth_reached,
        search_completed
    );
    if !search_completed {
        log::warn!(
            "search stopped after {} ms without a verdict",
            config.time_limit_ms.unwrap_or_default()
        );
    }

    Ok(Solution {
        solvable,
        sets: rows.into_iter().map(|r| matrix.rows()[r].clone()).collect(),
        search_completed,
        nodes_visited: search.nodes_visited,
        depth_reached: search.depth_reached,
    })
}

/// Per-branch elimination state. Each branch works on its own copy.
#[derive(Debug, Clone)]
struct Elimination {
    /// Rows that can no longer be chosen (including the ones already chosen
    /// whose tiles ran out).
    claimed: Vec<bool>,
    claimed_count: usize,
    /// Copies of each column's tile not yet spent by chosen sets.
    remaining: Vec<u8>,
}

impl Elimination {
    fn new(matrix: &IncidenceMatrix) -> Self {
        Elimination {
            claimed: vec![false; matrix.row_count()],
            claimed_count: 0,
            remaining: (0..matrix.column_count())
                .map(|c| matrix.available_at(c))
                .collect(),
        }
    }

    /// State after choosing `row`.
    ///
    /// Each member spends one copy. Spending the last copy drops the column
    /// and claims every row still containing it; spending the first of two
    /// copies claims nothing.
    fn choose(&self, matrix: &IncidenceMatrix, row: usize) -> Elimination {
        let mut next = self.clone();
        for &c in matrix.row_members(row) {
            match next.remaining[c] {
                // Rows holding an exhausted tile are already claimed.
                0 => {}
                1 => {
                    next.remaining[c] = 0;
                    for &r in matrix.column_rows(c) {
                        if !next.claimed[r] {
                            next.claimed[r] = true;
                            next.claimed_count += 1;
                        }
                    }
                }
                n => next.remaining[c] = n - 1,
            }
        }
        next
    }

    fn used(&self, matrix: &IncidenceMatrix, column: usize) -> u8 {
        matrix.available_at(column) - self.remaining[column]
    }
}

enum Step {
    /// Row indices of the chosen sets
    Found(Vec<usize>),
    Exhausted,
    Interrupted,
}

struct Search<'a> {
    matrix: &'a IncidenceMatrix,
    /// Copies of each column's tile lying on the table.
    required: Vec<u8>,
    table_total: u32,
    config: SolverConfig,
    timer: TimeTracker,
    nodes_visited: u64,
    depth_reached: usize,
}

impl<'a> Search<'a> {
    fn new(matrix: &'a IncidenceMatrix, table: &TileBag, config: SolverConfig) -> Self {
        let mut required = vec![0u8; matrix.column_count()];
        for (tile, count) in table.canonical_counts() {
            if let Some(c) = matrix.column_index(&tile) {
                required[c] = count;
            }
        }
        Search {
            matrix,
            required,
            table_total: table.total(),
            config,
            timer: TimeTracker::new(config.time_limit_ms),
            nodes_visited: 0,
            depth_reached: 0,
        }
    }

    fn explore(&mut self, state: &Elimination, chosen: &mut Vec<usize>) -> Step {
        if self.timer.is_expired() {
            return Step::Interrupted;
        }
        self.nodes_visited += 1;
        self.depth_reached = self.depth_reached.max(chosen.len());

        let matrix = self.matrix;

        // Coverage check
        let mut consumed = 0u32;
        let mut unsatisfied = Vec::new();
        for c in 0..matrix.column_count() {
            let used = state.used(matrix, c);
            consumed += u32::from(used);
            if used < self.required[c] {
                unsatisfied.push(c);
            }
        }

        if unsatisfied.is_empty() {
            if consumed > self.table_total {
                return Step::Found(chosen.clone());
            }
            let accepted = match self.config.covered_table {
                CoveredTable::SpareRow => state.claimed_count < matrix.row_count(),
                CoveredTable::Accept => true,
            };
            return if accepted {
                Step::Found(chosen.clone())
            } else {
                Step::Exhausted
            };
        }

        // Most constrained table tile; ties go to the lowest column.
        let open_rows = |c: usize| {
            matrix
                .column_rows(c)
                .iter()
                .filter(|&&r| !state.claimed[r])
                .count()
        };
        let mut target = unsatisfied[0];
        let mut fewest = open_rows(target);
        for &c in &unsatisfied[1..] {
            let n = open_rows(c);
            if n < fewest {
                target = c;
                fewest = n;
            }
        }
        if fewest == 0 {
            log::trace!(
                "depth {}: {} fits no remaining set",
                chosen.len(),
                matrix.columns()[target]
            );
            return Step::Exhausted;
        }
        log::trace!(
            "depth {}: branching on {} over {} sets",
            chosen.len(),
            matrix.columns()[target],
            fewest
        );

        for &row in matrix.column_rows(target) {
            if state.claimed[row] {
                continue;
            }
            let next = state.choose(matrix, row);
            chosen.push(row);
            match self.explore(&next, chosen) {
                Step::Exhausted => {}
                done => return done,
            }
            chosen.pop();
        }

        Step::Exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{JokerId, Tile};
    use std::collections::BTreeMap;

    fn bag(tokens: &[&str]) -> TileBag {
        TileBag::from_tokens(tokens).unwrap()
    }

    fn accept_exact() -> SolverConfig {
        SolverConfig {
            covered_table: CoveredTable::Accept,
            ..SolverConfig::default()
        }
    }

    fn rendered(sets: &[Meld]) -> Vec<String> {
        sets.iter()
            .map(|m| {
                m.tiles
                    .iter()
                    .map(Tile::to_string)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    /// Every property a returned solution has to satisfy.
    fn assert_consistent(table: &TileBag, hand: &TileBag, solution: &Solution) {
        let available = table.union(hand).canonical_counts();
        let mut used: BTreeMap<Tile, u8> = BTreeMap::new();
        for meld in &solution.sets {
            for tile in &meld.tiles {
                *used.entry(*tile).or_insert(0) += 1;
            }
        }
        for (tile, count) in &used {
            let limit = available.get(tile).copied().unwrap_or(0);
            assert!(*count <= limit, "{tile} used {count} times, {limit} available");
            if tile.is_joker() {
                assert_eq!(*count, 1);
            }
        }
        for (tile, needed) in table.canonical_counts() {
            let got = used.get(&tile).copied().unwrap_or(0);
            assert!(got >= needed, "table tile {tile} covered {got}/{needed}");
        }
    }

    #[test]
    fn test_exact_run_with_empty_hand_accepted() {
        let table = bag(&["1r", "2r", "3r"]);
        let hand = TileBag::new();
        let solution = solve_with_config(&table, &hand, &accept_exact()).unwrap();
        assert!(solution.solvable);
        assert_eq!(rendered(&solution.sets), vec!["1r 2r 3r"]);
        assert_consistent(&table, &hand, &solution);
    }

    #[test]
    fn test_exact_run_with_empty_hand_needs_spare_row() {
        // Choosing the only candidate claims every row.
        let solution = solve(&bag(&["1r", "2r", "3r"]), &TileBag::new()).unwrap();
        assert!(!solution.solvable);
        assert!(solution.search_completed);
        assert!(solution.sets.is_empty());
    }

    #[test]
    fn test_gap_without_wildcard_is_unsolvable() {
        for config in [SolverConfig::default(), accept_exact()] {
            let solution =
                solve_with_config(&bag(&["1r", "2r", "4r"]), &TileBag::new(), &config).unwrap();
            assert!(!solution.solvable);
            assert!(solution.search_completed);
        }
    }

    #[test]
    fn test_hand_tile_absorbed() {
        let table = bag(&["1r", "2r", "3r"]);
        let hand = bag(&["4r"]);

        let solution = solve(&table, &hand).unwrap();
        assert!(solution.solvable);
        assert_eq!(rendered(&solution.sets), vec!["1r 2r 3r 4r"]);
        assert_consistent(&table, &hand, &solution);

        let solution = solve_with_config(&table, &hand, &accept_exact()).unwrap();
        assert!(solution.solvable);
        assert_consistent(&table, &hand, &solution);
    }

    #[test]
    fn test_group_without_wildcard_when_exact_cover_accepted() {
        let table = bag(&["4b", "4n", "4r"]);
        let hand = bag(&["j"]);
        let solution = solve_with_config(&table, &hand, &accept_exact()).unwrap();
        assert!(solution.solvable);
        assert_eq!(rendered(&solution.sets), vec!["4b 4n 4r"]);
    }

    #[test]
    fn test_group_takes_wildcard_with_spare_row_rule() {
        let table = bag(&["4b", "4n", "4r"]);
        let hand = bag(&["j"]);
        let solution = solve(&table, &hand).unwrap();
        assert!(solution.solvable);
        assert_eq!(rendered(&solution.sets), vec!["4b 4n 4r ja"]);
        assert_consistent(&table, &hand, &solution);
    }

    #[test]
    fn test_single_identifier_has_no_covering_set() {
        for config in [SolverConfig::default(), accept_exact()] {
            let solution =
                solve_with_config(&bag(&["1r", "1r"]), &TileBag::new(), &config).unwrap();
            assert!(!solution.solvable);
            assert_eq!(solution.nodes_visited, 1);
        }
    }

    #[test]
    fn test_duplicate_tiles_reuse_the_same_set() {
        let table = bag(&["1r", "1r", "2r", "2r", "3r", "3r"]);
        let hand = TileBag::new();

        let solution = solve_with_config(&table, &hand, &accept_exact()).unwrap();
        assert!(solution.solvable);
        assert_eq!(rendered(&solution.sets), vec!["1r 2r 3r", "1r 2r 3r"]);
        assert_consistent(&table, &hand, &solution);

        assert!(!solve(&table, &hand).unwrap().solvable);
    }

    #[test]
    fn test_duplicate_tiles_with_hand_tile() {
        let table = bag(&["1r", "1r", "2r", "2r", "3r", "3r"]);
        let hand = bag(&["4r"]);
        let solution = solve(&table, &hand).unwrap();
        assert!(solution.solvable);
        assert_eq!(rendered(&solution.sets), vec!["1r 2r 3r", "1r 2r 3r 4r"]);
        assert_consistent(&table, &hand, &solution);
    }

    #[test]
    fn test_table_wildcard_must_be_reused() {
        let table = bag(&["5b", "5n", "j"]);
        let hand = bag(&["5o"]);
        let solution = solve(&table, &hand).unwrap();
        assert!(solution.solvable);
        assert_eq!(rendered(&solution.sets), vec!["5b 5n 5o ja"]);
        assert_consistent(&table, &hand, &solution);
    }

    #[test]
    fn test_larger_table_solution_is_consistent() {
        let table = bag(&["1r", "2r", "3r", "4r", "5r", "5b", "5n", "5o"]);
        let hand = bag(&["6r", "j", "9b"]);
        for config in [SolverConfig::default(), accept_exact()] {
            let solution = solve_with_config(&table, &hand, &config).unwrap();
            assert!(solution.solvable);
            assert!(solution.search_completed);
            assert!(solution.depth_reached >= solution.sets.len());
            assert_consistent(&table, &hand, &solution);
        }
    }

    #[test]
    fn test_two_wildcards_are_distinct() {
        let table = bag(&["7o", "8o", "j", "10b", "11b"]);
        let hand = bag(&["j"]);
        let solution = solve(&table, &hand).unwrap();
        assert!(solution.solvable);
        assert_consistent(&table, &hand, &solution);
        let jokers: Vec<Tile> = solution
            .sets
            .iter()
            .flat_map(|m| m.tiles.iter().copied())
            .filter(Tile::is_joker)
            .collect();
        assert!(jokers.contains(&Tile::Joker(JokerId::A)));
        assert!(jokers.len() <= 2);
    }

    #[test]
    fn test_empty_table() {
        let solution = solve(&TileBag::new(), &bag(&["1r", "2r", "3r"])).unwrap();
        assert!(solution.solvable);
        assert!(solution.sets.is_empty());

        let solution = solve(&TileBag::new(), &TileBag::new()).unwrap();
        assert!(!solution.solvable);
    }

    #[test]
    fn test_time_limit_interrupts() {
        let config = SolverConfig {
            time_limit_ms: Some(0),
            ..SolverConfig::default()
        };
        let solution = solve_with_config(&bag(&["1r", "2r", "3r"]), &bag(&["4r"]), &config).unwrap();
        assert!(!solution.solvable);
        assert!(!solution.search_completed);
        assert_eq!(solution.nodes_visited, 0);
    }

    #[test]
    fn test_input_errors_abort_before_search() {
        assert_eq!(
            solve_tokens(&["1r", "j", "j"], &["j"]),
            Err(InputError::TooManyWildcards { count: 3 })
        );
        assert!(matches!(
            solve_tokens(&["1x"], &[]),
            Err(InputError::InvalidColor { .. })
        ));
        assert!(matches!(
            solve_tokens(&["2r", "2r"], &["2r"]),
            Err(InputError::TooManyCopies { .. })
        ));
        assert!(solve_tokens(&["1r", "2r", "3r"], &["4r"]).unwrap().solvable);
    }

    #[test]
    fn test_choose_spends_one_copy_at_a_time() {
        let matrix = IncidenceMatrix::build(&bag(&["1r", "1r", "2r", "2r", "3r", "3r"]), &TileBag::new());
        assert_eq!(matrix.row_count(), 1);

        let root = Elimination::new(&matrix);
        let once = root.choose(&matrix, 0);
        assert_eq!(once.claimed_count, 0);
        assert_eq!(once.remaining, vec![1, 1, 1]);

        let twice = once.choose(&matrix, 0);
        assert_eq!(twice.claimed_count, 1);
        assert_eq!(twice.remaining, vec![0, 0, 0]);

        // The parent state is untouched.
        assert_eq!(root.remaining, vec![2, 2, 2]);
    }
}
