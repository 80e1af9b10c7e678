//! Island topology: a rectangular grid of cells parsed from a terrain map.

use crate::cell::{Cell, Neighbor};
use biosim_core::{Direction, Error, LandscapeParams, Location, Result, Terrain};
use serde::{Deserialize, Serialize};

/// A bounded 2D grid whose outer ring is water
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Parse a map with one terrain code per cell.
    ///
    /// Leading and trailing whitespace on each line is ignored, as are blank
    /// lines. Fails if rows differ in length, if a code is not one of
    /// `W`, `D`, `H`, `L`, or if any boundary cell is not water.
    pub fn parse(map: &str, landscape: &LandscapeParams) -> Result<Self> {
        let lines: Vec<&str> = map
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let rows = lines.len();
        let cols = match lines.first() {
            Some(first) => first.chars().count(),
            None => return Err(Error::EmptyMap),
        };

        let mut cells = Vec::with_capacity(rows * cols);
        for (r, line) in lines.iter().enumerate() {
            let row = r + 1;
            let found = line.chars().count();
            if found != cols {
                return Err(Error::InconsistentRowLength {
                    row,
                    expected: cols,
                    found,
                });
            }

            for (c, code) in line.chars().enumerate() {
                let col = c + 1;
                let location = Location::new(row, col);
                let terrain = Terrain::from_code(code)
                    .ok_or(Error::UnknownTerrainCode { code, location })?;

                let on_boundary = row == 1 || row == rows || col == 1 || col == cols;
                if on_boundary && terrain != Terrain::Water {
                    return Err(Error::NonWaterBoundary(location));
                }

                cells.push(Cell::new(location, terrain, landscape));
            }
        }

        Ok(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, loc: Location) -> bool {
        (1..=self.rows).contains(&loc.row) && (1..=self.cols).contains(&loc.col)
    }

    fn loc_to_index(&self, loc: Location) -> Option<usize> {
        if self.contains(loc) {
            Some((loc.row - 1) * self.cols + (loc.col - 1))
        } else {
            None
        }
    }

    /// Get the location of the cell stored at `index`
    pub fn index_to_loc(&self, index: usize) -> Location {
        Location::new(index / self.cols + 1, index % self.cols + 1)
    }

    pub fn get(&self, loc: Location) -> Option<&Cell> {
        let index = self.loc_to_index(loc)?;
        Some(&self.cells[index])
    }

    pub fn get_mut(&mut self, loc: Location) -> Option<&mut Cell> {
        let index = self.loc_to_index(loc)?;
        Some(&mut self.cells[index])
    }

    /// The in-grid cells directly north, south, east and west of `loc`
    pub fn neighbors(&self, loc: Location) -> Vec<Neighbor> {
        Direction::all()
            .into_iter()
            .filter_map(|direction| loc.step(direction))
            .filter_map(|neighbor| self.get(neighbor))
            .map(Neighbor::of)
            .collect()
    }

    /// Cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter()
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> + '_ {
        self.cells.iter_mut()
    }

    /// Rows of cells, top to bottom
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks(self.cols)
    }
}
