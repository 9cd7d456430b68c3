//! Enumeration of every run and group that the tiles in play could form.
//!
//! Candidates are built as patterns of [`Slot`]s first, where a wildcard is a
//! generic placeholder, and only then bound to physical joker identities.

use crate::{Color, JokerId, MAX_RANK, MIN_RANK, Meld, MeldType, Tile, TileBag};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Smallest legal run or group.
const MIN_SET_LEN: usize = 3;
/// Largest legal group (one tile per color).
const MAX_GROUP_LEN: usize = 4;

/// Member of a candidate before jokers get their identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Slot<T> {
    Real(T),
    Wild,
}

/// Generate all valid runs and groups that could be formed from `tiles`.
///
/// Only presence matters here: two copies of a tile yield the same candidates
/// as one. Groups come first (by rank), then runs (by color). Candidates with
/// the same tiles are reported once, keeping the first kind seen.
pub fn admissible_sets(tiles: &TileBag) -> Vec<Meld> {
    let wilds = tiles.wild_count().min(2);
    let jokers = JokerId::available(wilds);

    let mut by_rank: BTreeMap<u8, BTreeSet<Color>> = BTreeMap::new();
    let mut by_color: BTreeMap<Color, BTreeSet<u8>> = BTreeMap::new();
    for (tile, _) in tiles.iter() {
        if let Tile::Numbered { rank, color } = *tile {
            by_rank.entry(rank).or_default().insert(color);
            by_color.entry(color).or_default().insert(rank);
        }
    }

    let mut melds = Vec::new();
    let mut seen: HashSet<Vec<Tile>> = HashSet::new();
    let mut push = |meld: Meld, melds: &mut Vec<Meld>| {
        if seen.insert(meld.tiles.clone()) {
            melds.push(meld);
        }
    };

    for (&rank, colors) in &by_rank {
        for pattern in group_patterns(colors, wilds) {
            let slots: Vec<Slot<Tile>> = pattern
                .iter()
                .map(|slot| match *slot {
                    Slot::Real(color) => Slot::Real(Tile::new(rank, color)),
                    Slot::Wild => Slot::Wild,
                })
                .collect();
            for tiles in bind_jokers(&slots, jokers) {
                push(Meld::new(MeldType::Group, tiles), &mut melds);
            }
        }
    }

    for (&color, ranks) in &by_color {
        for pattern in run_patterns(ranks, wilds) {
            // Reattach the color; wildcards carry none.
            let slots: Vec<Slot<Tile>> = pattern
                .iter()
                .map(|slot| match *slot {
                    Slot::Real(rank) => Slot::Real(Tile::new(rank, color)),
                    Slot::Wild => Slot::Wild,
                })
                .collect();
            for tiles in bind_jokers(&slots, jokers) {
                push(Meld::new(MeldType::Run, tiles), &mut melds);
            }
        }
    }

    log::debug!(
        "enumerated {} candidate sets ({} wildcards in play)",
        melds.len(),
        wilds
    );
    melds
}

/// Run patterns for one color, as sorted slot tuples.
///
/// Ranks 1-13 are laid out as slots that are either present or empty. Every
/// window of length >= 3 whose empty slots can be filled by the available
/// wildcards is emitted, together with each variant where up to the spare
/// wildcards stand in for tiles that are present.
fn run_patterns(ranks: &BTreeSet<u8>, wilds: u8) -> Vec<Vec<Slot<u8>>> {
    let slots: Vec<Slot<u8>> = (MIN_RANK..=MAX_RANK)
        .map(|rank| {
            if ranks.contains(&rank) {
                Slot::Real(rank)
            } else {
                Slot::Wild
            }
        })
        .collect();

    let mut patterns = Vec::new();
    let mut seen = HashSet::new();

    for start in 0..slots.len() {
        let mut empties = 0u8;
        for end in start..slots.len() {
            if slots[end] == Slot::Wild {
                empties += 1;
            }
            // Growing the window to the right can never drop an empty slot.
            if empties > wilds {
                break;
            }
            if end - start + 1 < MIN_SET_LEN {
                continue;
            }
            for pattern in substitute_wilds(&slots[start..=end], wilds - empties) {
                if seen.insert(pattern.clone()) {
                    patterns.push(pattern);
                }
            }
        }
    }

    patterns
}

/// The window itself plus every way of swapping up to `spare` present
/// members for wildcards. Each result is sorted so equal sets compare equal.
fn substitute_wilds(window: &[Slot<u8>], spare: u8) -> Vec<Vec<Slot<u8>>> {
    let mut base = window.to_vec();
    base.sort_unstable();
    let mut result = vec![base];

    let present: Vec<usize> = window
        .iter()
        .enumerate()
        .filter(|(_, slot)| matches!(slot, Slot::Real(_)))
        .map(|(i, _)| i)
        .collect();

    for k in 1..=usize::from(spare) {
        for swapped in combinations(&present, k) {
            let mut variant = window.to_vec();
            for i in swapped {
                variant[i] = Slot::Wild;
            }
            variant.sort_unstable();
            result.push(variant);
        }
    }

    result
}

/// Group patterns for one rank: every 3- and 4-element combination of the
/// present colors plus one wildcard slot per available wildcard.
fn group_patterns(colors: &BTreeSet<Color>, wilds: u8) -> Vec<Vec<Slot<Color>>> {
    let mut pool: Vec<Slot<Color>> = colors.iter().map(|&c| Slot::Real(c)).collect();
    pool.extend(std::iter::repeat_n(Slot::Wild, usize::from(wilds)));

    let mut patterns = Vec::new();
    let mut seen = HashSet::new();
    for size in MIN_SET_LEN..=MAX_GROUP_LEN {
        for combo in combinations(&pool, size) {
            if seen.insert(combo.clone()) {
                patterns.push(combo);
            }
        }
    }
    patterns
}

/// Assign physical joker identities to the wildcard slots of a pattern.
///
/// With one slot and two jokers either joker could fill it, so both variants
/// are returned; every other case has exactly one binding.
fn bind_jokers(pattern: &[Slot<Tile>], jokers: &[JokerId]) -> Vec<Vec<Tile>> {
    let real: Vec<Tile> = pattern
        .iter()
        .filter_map(|slot| match slot {
            Slot::Real(tile) => Some(*tile),
            Slot::Wild => None,
        })
        .collect();
    let wild_slots = pattern.len() - real.len();

    combinations(jokers, wild_slots)
        .into_iter()
        .map(|ids| {
            let mut tiles = real.clone();
            tiles.extend(ids.into_iter().map(Tile::Joker));
            tiles
        })
        .collect()
}

/// All `k`-element combinations of `items`, in lexicographic index order.
fn combinations<T: Copy>(items: &[T], k: usize) -> Vec<Vec<T>> {
    fn recurse<T: Copy>(
        items: &[T],
        k: usize,
        start: usize,
        current: &mut Vec<T>,
        results: &mut Vec<Vec<T>>,
    ) {
        if current.len() == k {
            results.push(current.clone());
            return;
        }
        for i in start..items.len() {
            current.push(items[i]);
            recurse(items, k, i + 1, current, results);
            current.pop();
        }
    }

    if k > items.len() {
        return Vec::new();
    }
    let mut results = Vec::new();
    let mut current = Vec::with_capacity(k);
    recurse(items, k, 0, &mut current, &mut results);
    results
}
