//! Per-player board state: ship placement, shot resolution, and the
//! serialized grid renderings served to clients.

use shared::{Cell, Coord, ShipKind, BOARD_SIZE, ROW_LABELS};
use std::collections::HashMap;
use std::fmt;

const GRID_DIM: usize = BOARD_SIZE as usize + 1;

/// A placed ship: catalog entry, occupied cells in placement order, and
/// whether any cell is still unhit.
#[derive(Debug, Clone)]
pub struct Ship {
    pub kind: ShipKind,
    pub cells: Vec<Coord>,
    pub afloat: bool,
}

/// Rejection reasons for a placement attempt. A rejected attempt commits
/// nothing to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    OutOfBounds,
    NotAligned,
    WrongLength,
    Overlap,
    AlreadyPlaced,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            PlacementError::OutOfBounds => "endpoint outside the board",
            PlacementError::NotAligned => "endpoints are not in one row or column",
            PlacementError::WrongLength => "span does not match the ship length",
            PlacementError::Overlap => "cells already claimed by another ship",
            PlacementError::AlreadyPlaced => "ship has already been placed",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for PlacementError {}

/// Outcome of one shot at a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shot {
    Hit,
    Miss,
}

/// A player's private 10x10 grid plus ship placements. Index 0 of each
/// axis is reserved for the rendered axis labels and never holds a cell.
#[derive(Debug, Clone)]
pub struct Board {
    cells: [[Cell; GRID_DIM]; GRID_DIM],
    ships: Vec<Ship>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; GRID_DIM]; GRID_DIM],
            ships: Vec::new(),
        }
    }

    pub fn cell(&self, coord: Coord) -> Cell {
        self.cells[coord.row as usize][coord.col as usize]
    }

    fn set_cell(&mut self, coord: Coord, state: Cell) {
        self.cells[coord.row as usize][coord.col as usize] = state;
    }

    /// Places `kind` along the axis-aligned span from `a` to `b`.
    ///
    /// The span must lie in bounds, cover exactly `kind.length()` cells,
    /// and overlap no previously placed ship. On success every covered
    /// cell becomes [`Cell::Ship`] and the ordered cell list is recorded;
    /// on failure the board is untouched.
    pub fn place_ship(
        &mut self,
        kind: ShipKind,
        a: Coord,
        b: Coord,
    ) -> Result<Vec<Coord>, PlacementError> {
        if self.ships.iter().any(|s| s.kind == kind) {
            return Err(PlacementError::AlreadyPlaced);
        }
        if !a.in_bounds() || !b.in_bounds() {
            return Err(PlacementError::OutOfBounds);
        }

        let cells = span_cells(a, b)?;
        if cells.len() != kind.length() {
            return Err(PlacementError::WrongLength);
        }
        if cells.iter().any(|c| self.cell(*c) != Cell::Empty) {
            return Err(PlacementError::Overlap);
        }

        for cell in &cells {
            self.set_cell(*cell, Cell::Ship);
        }
        self.ships.push(Ship {
            kind,
            cells: cells.clone(),
            afloat: true,
        });
        Ok(cells)
    }

    /// True once all five catalog ships are placed.
    pub fn is_complete(&self) -> bool {
        self.ships.len() == ShipKind::ALL.len()
    }

    /// Resolves one shot. `Ship` cells become `Hit` and `Empty` cells
    /// become `Miss`; cells already resolved keep their state and report
    /// the outcome that first produced them.
    pub fn fire(&mut self, coord: Coord) -> Shot {
        match self.cell(coord) {
            Cell::Ship => {
                self.set_cell(coord, Cell::Hit);
                Shot::Hit
            }
            Cell::Empty => {
                self.set_cell(coord, Cell::Miss);
                Shot::Miss
            }
            Cell::Hit | Cell::Sunk => Shot::Hit,
            Cell::Miss => Shot::Miss,
        }
    }

    /// Re-evaluates every afloat ship; ships with all cells hit have
    /// their cells marked `Sunk` and are reported. Sinking is
    /// irreversible.
    pub fn sweep_sunk(&mut self) -> Vec<(ShipKind, Vec<Coord>)> {
        let mut sunk = Vec::new();
        for i in 0..self.ships.len() {
            if !self.ships[i].afloat {
                continue;
            }
            let all_hit = self.ships[i]
                .cells
                .iter()
                .all(|c| self.cell(*c) == Cell::Hit);
            if all_hit {
                let cells = self.ships[i].cells.clone();
                for cell in &cells {
                    self.set_cell(*cell, Cell::Sunk);
                }
                self.ships[i].afloat = false;
                sunk.push((self.ships[i].kind, cells));
            }
        }
        sunk
    }

    /// True once a complete board has no afloat ship left.
    pub fn all_sunk(&self) -> bool {
        self.is_complete() && self.ships.iter().all(|s| !s.afloat)
    }

    /// The labeled grid: header row `+ 1 .. 10`, then rows `A`..`J` of
    /// cell symbols, whitespace-separated and newline-joined.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(GRID_DIM);
        let header: Vec<String> = std::iter::once(ROW_LABELS[0].to_string())
            .chain((1..GRID_DIM).map(|col| col.to_string()))
            .collect();
        lines.push(header.join(" "));

        for row in 1..GRID_DIM {
            let mut tokens = vec![ROW_LABELS[row].to_string()];
            for col in 1..GRID_DIM {
                tokens.push(self.cells[row][col].symbol().to_string());
            }
            lines.push(tokens.join(" "));
        }
        lines.join("\n")
    }

    /// Ship name to wire-form cell list, the ALLY-view JSON payload.
    pub fn ship_coordinates(&self) -> HashMap<String, Vec<String>> {
        self.ships
            .iter()
            .map(|s| {
                (
                    s.kind.name().to_string(),
                    s.cells.iter().map(Coord::to_string).collect(),
                )
            })
            .collect()
    }
}

/// The ordered cells covered by the axis-aligned span from `a` to `b`,
/// walking from `a` towards `b`.
fn span_cells(a: Coord, b: Coord) -> Result<Vec<Coord>, PlacementError> {
    if a.row == b.row {
        Ok(walk(a.col, b.col).map(|col| Coord::new(a.row, col)).collect())
    } else if a.col == b.col {
        Ok(walk(a.row, b.row).map(|row| Coord::new(row, a.col)).collect())
    } else {
        Err(PlacementError::NotAligned)
    }
}

fn walk(from: u8, to: u8) -> Box<dyn Iterator<Item = u8>> {
    if from <= to {
        Box::new(from..=to)
    } else {
        Box::new((to..=from).rev())
    }
}
