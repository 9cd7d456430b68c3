//! Incidence matrix between candidate sets (rows) and tile identifiers (columns).

use crate::enumerate::admissible_sets;
use crate::{Meld, Tile, TileBag};
use std::collections::BTreeMap;

/// Rows are candidate sets, columns the sorted distinct tiles in play.
///
/// A cell is zero unless the column's tile belongs to the row's set, in which
/// case it holds that tile's available count (1 or 2). The matrix is built
/// once and never mutated; the solver tracks eliminations separately.
#[derive(Debug, Clone)]
pub struct IncidenceMatrix {
    columns: Vec<Tile>,
    rows: Vec<Meld>,
    /// Row-major, `rows.len() * columns.len()` cells.
    cells: Vec<u8>,
    /// Column indices of each row's members.
    members: Vec<Vec<usize>>,
    /// Row indices containing each column.
    incidence: Vec<Vec<usize>>,
    available: BTreeMap<Tile, u8>,
}

impl IncidenceMatrix {
    /// Build the matrix for everything in play: table and hand together.
    pub fn build(table: &TileBag, hand: &TileBag) -> Self {
        Self::from_tiles(&table.union(hand))
    }

    pub fn from_tiles(tiles: &TileBag) -> Self {
        let available = tiles.canonical_counts();
        let columns: Vec<Tile> = available.keys().copied().collect();
        let rows = admissible_sets(tiles);

        let width = columns.len();
        let mut cells = vec![0u8; rows.len() * width];
        let mut members = Vec::with_capacity(rows.len());
        let mut incidence = vec![Vec::new(); width];

        for (r, meld) in rows.iter().enumerate() {
            let mut row_members = Vec::with_capacity(meld.len());
            for tile in &meld.tiles {
                // Every candidate is built from tiles in play, so the lookup succeeds.
                if let Ok(c) = columns.binary_search(tile) {
                    cells[r * width + c] = available[tile];
                    row_members.push(c);
                    incidence[c].push(r);
                }
            }
            members.push(row_members);
        }

        log::debug!(
            "incidence matrix: {} rows x {} columns",
            rows.len(),
            columns.len()
        );

        IncidenceMatrix {
            columns,
            rows,
            cells,
            members,
            incidence,
            available,
        }
    }

    pub fn columns(&self) -> &[Tile] {
        &self.columns
    }

    pub fn rows(&self) -> &[Meld] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, tile: &Tile) -> Option<usize> {
        self.columns.binary_search(tile).ok()
    }

    /// Cell value; panics if either index is out of range.
    pub fn cell(&self, row: usize, column: usize) -> u8 {
        assert!(column < self.columns.len(), "column out of range");
        self.cells[row * self.columns.len() + column]
    }

    /// Column indices of the tiles in `row`, in column order.
    pub fn row_members(&self, row: usize) -> &[usize] {
        &self.members[row]
    }

    /// Row indices of the sets containing `column`, in row order.
    pub fn column_rows(&self, column: usize) -> &[usize] {
        &self.incidence[column]
    }

    /// Available count per tile (table + hand, wildcards bound to identities).
    pub fn available(&self) -> &BTreeMap<Tile, u8> {
        &self.available
    }

    pub fn available_at(&self, column: usize) -> u8 {
        self.available[&self.columns[column]]
    }
}
