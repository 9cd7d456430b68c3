use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub mod enumerate;
pub mod error;
pub mod json;
pub mod matrix;
pub mod solver;
#[cfg(target_arch = "wasm32")]
pub mod wasm_api;

pub use error::InputError;
pub use solver::{CoveredTable, Solution, SolverConfig, solve, solve_tokens, solve_with_config};

/// Lowest and highest rank printed on a tile.
pub const MIN_RANK: u8 = 1;
pub const MAX_RANK: u8 = 13;

/// Physical copies of each numbered tile in one set.
pub const MAX_COPIES: u8 = 2;

/// Tile color. Letters follow the input grammar: blue, black (`n`), orange, red.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Color {
    Blue,
    Black,
    Orange,
    Red,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Blue, Color::Black, Color::Orange, Color::Red];

    pub fn letter(self) -> char {
        match self {
            Color::Blue => 'b',
            Color::Black => 'n',
            Color::Orange => 'o',
            Color::Red => 'r',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'b' => Some(Color::Blue),
            'n' => Some(Color::Black),
            'o' => Some(Color::Orange),
            'r' => Some(Color::Red),
            _ => None,
        }
    }
}

/// Fixed identity of one physical wildcard.
///
/// The two jokers are never interchangeable: a candidate set names the exact
/// joker it uses, so no combination of sets can claim a joker twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JokerId {
    A,
    B,
}

impl JokerId {
    /// Identities handed out when `count` wildcards are in play.
    pub fn available(count: u8) -> &'static [JokerId] {
        match count {
            0 => &[],
            1 => &[JokerId::A],
            _ => &[JokerId::A, JokerId::B],
        }
    }
}

/// A resolved tile identifier.
///
/// Ordering puts numbered tiles first (by rank, then color) and jokers last;
/// this is the column order of the incidence matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tile {
    Numbered { rank: u8, color: Color },
    Joker(JokerId),
}

impl Tile {
    /// Create a numbered tile. Panics if `rank` is outside 1-13.
    pub fn new(rank: u8, color: Color) -> Self {
        assert!(
            (MIN_RANK..=MAX_RANK).contains(&rank),
            "Rank must be 1-13"
        );
        Tile::Numbered { rank, color }
    }

    pub fn joker(id: JokerId) -> Self {
        Tile::Joker(id)
    }

    pub fn rank(&self) -> Option<u8> {
        match self {
            Tile::Numbered { rank, .. } => Some(*rank),
            Tile::Joker(_) => None,
        }
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            Tile::Numbered { color, .. } => Some(*color),
            Tile::Joker(_) => None,
        }
    }

    pub fn is_joker(&self) -> bool {
        matches!(self, Tile::Joker(_))
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tile::Numbered { rank, color } => write!(f, "{}{}", rank, color.letter()),
            Tile::Joker(JokerId::A) => f.write_str("ja"),
            Tile::Joker(JokerId::B) => f.write_str("jb"),
        }
    }
}

/// One token of collaborator input: a numbered tile or a wildcard whose
/// physical identity has not been assigned yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileToken {
    Tile(Tile),
    Wild,
}

impl FromStr for TileToken {
    type Err = InputError;

    /// Parse `<rank><color>` ("4b", "13r") or `j`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token == "j" {
            return Ok(TileToken::Wild);
        }

        let Some(last) = token.chars().last() else {
            return Err(InputError::Empty);
        };
        let color = Color::from_letter(last).ok_or_else(|| InputError::InvalidColor {
            token: token.to_string(),
            color: last,
        })?;

        let digits = &token[..token.len() - last.len_utf8()];
        let invalid_rank = || InputError::InvalidRank {
            token: token.to_string(),
        };
        if digits.is_empty() || digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid_rank());
        }
        let rank: u8 = digits.parse().map_err(|_| invalid_rank())?;
        if !(MIN_RANK..=MAX_RANK).contains(&rank) {
            return Err(invalid_rank());
        }

        Ok(TileToken::Tile(Tile::Numbered { rank, color }))
    }
}

impl fmt::Display for TileToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileToken::Tile(tile) => fmt::Display::fmt(tile, f),
            TileToken::Wild => f.write_str("j"),
        }
    }
}

/// A multiset of tiles: numbered tiles with their copy counts plus a count of
/// unresolved wildcards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileBag {
    tiles: BTreeMap<Tile, u8>,
    wilds: u8,
}

impl TileBag {
    /// Create a new empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every token and collect them into a bag.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut bag = TileBag::new();
        for token in tokens {
            bag.add(token.as_ref().parse()?);
        }
        Ok(bag)
    }

    pub fn add(&mut self, token: TileToken) {
        match token {
            TileToken::Tile(tile) => self.add_tile(tile),
            TileToken::Wild => self.wilds = self.wilds.saturating_add(1),
        }
    }

    /// Add a tile. A resolved joker goes back into the unresolved wildcard pool.
    pub fn add_tile(&mut self, tile: Tile) {
        if tile.is_joker() {
            self.wilds = self.wilds.saturating_add(1);
        } else {
            let count = self.tiles.entry(tile).or_insert(0);
            *count = count.saturating_add(1);
        }
    }

    /// Copies of a numbered tile in the bag
    pub fn count(&self, tile: &Tile) -> u8 {
        self.tiles.get(tile).copied().unwrap_or(0)
    }

    pub fn wild_count(&self) -> u8 {
        self.wilds
    }

    /// Numbered tiles and their counts, in tile order
    pub fn iter(&self) -> impl Iterator<Item = (&Tile, &u8)> {
        self.tiles.iter()
    }

    /// Total number of physical tiles, wildcards included
    pub fn total(&self) -> u32 {
        self.tiles.values().map(|&c| u32::from(c)).sum::<u32>() + u32::from(self.wilds)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Multiset union (counts add up).
    pub fn union(&self, other: &TileBag) -> TileBag {
        let mut merged = self.clone();
        for (tile, &count) in other.iter() {
            let entry = merged.tiles.entry(*tile).or_insert(0);
            *entry = entry.saturating_add(count);
        }
        merged.wilds = merged.wilds.saturating_add(other.wilds);
        merged
    }

    /// Counts with wildcards bound to their physical identities: one wildcard
    /// becomes `ja`, two become `ja` and `jb`, each with count 1.
    pub fn canonical_counts(&self) -> BTreeMap<Tile, u8> {
        let mut counts = self.tiles.clone();
        for &id in JokerId::available(self.wilds) {
            counts.insert(Tile::Joker(id), 1);
        }
        counts
    }

    /// Reject bags that could not come from one physical tile set.
    pub fn validate(&self) -> Result<(), InputError> {
        if self.wilds > 2 {
            return Err(InputError::TooManyWildcards {
                count: u32::from(self.wilds),
            });
        }
        if let Some((tile, &count)) = self.tiles.iter().find(|(_, c)| **c > MAX_COPIES) {
            return Err(InputError::TooManyCopies {
                tile: *tile,
                count: u32::from(count),
            });
        }
        Ok(())
    }
}

impl FromIterator<TileToken> for TileBag {
    fn from_iter<T: IntoIterator<Item = TileToken>>(iter: T) -> Self {
        let mut bag = TileBag::new();
        for token in iter {
            bag.add(token);
        }
        bag
    }
}

/// Type of meld in Rummikub
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeldType {
    /// A group: same number, different colors
    Group,
    /// A run: consecutive numbers, same color
    Run,
}

/// A candidate valid set. Tiles are kept in tile order, never repeated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meld {
    pub meld_type: MeldType,
    pub tiles: Vec<Tile>,
}

impl Meld {
    /// Create a new meld; tiles are sorted into tile order.
    pub fn new(meld_type: MeldType, mut tiles: Vec<Tile>) -> Self {
        tiles.sort_unstable();
        Meld { meld_type, tiles }
    }

    pub fn contains(&self, tile: &Tile) -> bool {
        self.tiles.binary_search(tile).is_ok()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn joker_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_joker()).count()
    }
}

impl fmt::Display for Meld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.meld_type {
            MeldType::Group => "group",
            MeldType::Run => "run",
        };
        write!(f, "{kind}:")?;
        for tile in &self.tiles {
            write!(f, " {tile}")?;
        }
        Ok(())
    }
}
