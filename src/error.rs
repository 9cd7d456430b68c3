use crate::Tile;
use thiserror::Error;

/// Malformed input rejected before any search work is done.
///
/// An unsolvable position is not an error: it is reported through
/// [`crate::solver::Solution::solvable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("empty tile token")]
    Empty,

    #[error("invalid color '{color}' in tile '{token}' (expected one of b, n, o, r)")]
    InvalidColor { token: String, color: char },

    #[error("invalid rank in tile '{token}' (expected 1-13)")]
    InvalidRank { token: String },

    #[error("{count} wildcards in play, at most 2 exist")]
    TooManyWildcards { count: u32 },

    #[error("{count} copies of {tile} in play, at most 2 exist")]
    TooManyCopies { tile: Tile, count: u32 },
}
