use std::fmt;

use log::debug;
use ndarray::Array2;

use crate::error::CrosswordError;

mod cell;
mod cross;
mod placement;
mod projection;

pub use cell::Cell;
pub use cross::{Cross, CrossMemo, Exhaustion};
pub use placement::Placement;

/// Glyph used to render an empty cell.
pub const EMPTY_GLYPH: char = '□';
/// Glyph used to render a block cell.
pub const BLOCK_GLYPH: char = '■';

/// Letters this crate recognizes: uppercase Latin plus a small extended set.
pub const EXTENDED_ALPHABET: &str = "ÅÄÖÉ";

/// The full recognized alphabet, used by seeding to pick a uniformly
/// random starting letter.
pub const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZÅÄÖÉ";

pub fn is_valid_letter(c: char) -> bool {
    c.is_ascii_uppercase() || EXTENDED_ALPHABET.contains(c)
}

/// Which axis a placement runs along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Horizontal,
    Vertical,
}

impl Direction {
    pub fn other(self) -> Direction {
        match self {
            Direction::Horizontal => Direction::Vertical,
            Direction::Vertical => Direction::Horizontal,
        }
    }
}

/// A single grid cell coordinate. Row grows downward, column grows
/// rightward; `(0, 0)` is the top-left cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub row: isize,
    pub col: isize,
}

impl Location {
    pub fn new(row: isize, col: isize) -> Self {
        Location { row, col }
    }

    pub fn in_bounds(&self, height: isize, width: isize) -> bool {
        self.row >= 0 && self.row < height && self.col >= 0 && self.col < width
    }

    fn step(&self, delta: isize, direction: Direction) -> Location {
        match direction {
            Direction::Horizontal => Location::new(self.row, self.col + delta),
            Direction::Vertical => Location::new(self.row + delta, self.col),
        }
    }
}

/// A cell plus the axis a placement would run along from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub row: isize,
    pub col: isize,
    pub orientation: Direction,
}

impl Position {
    pub fn new(row: isize, col: isize, orientation: Direction) -> Self {
        Position { row, col, orientation }
    }

    pub fn location(&self) -> Location {
        Location::new(self.row, self.col)
    }

    /// True when this position sits on the edge the orientation cares
    /// about: first row for a vertical placement, first column for a
    /// horizontal one.
    pub fn is_edge(&self) -> bool {
        match self.orientation {
            Direction::Horizontal => self.col == 0,
            Direction::Vertical => self.row == 0,
        }
    }

    /// Move one cell forward along the placement axis.
    pub fn advance(&self) -> Position {
        let loc = self.location().step(1, self.orientation);
        Position::new(loc.row, loc.col, self.orientation)
    }

    /// Move one cell backward along the placement axis, clamped to 0.
    pub fn retreat(&self) -> Position {
        match self.orientation {
            Direction::Horizontal => Position::new(self.row, (self.col - 1).max(0), self.orientation),
            Direction::Vertical => Position::new((self.row - 1).max(0), self.col, self.orientation),
        }
    }

    /// The location `n` cells forward along the axis (n may be negative).
    pub fn offset(&self, n: isize) -> Location {
        self.location().step(n, self.orientation)
    }

    /// The location immediately before the first letter on the axis.
    pub fn before(&self) -> Location {
        self.offset(-1)
    }

    /// The location immediately after the last letter of a run of `len`
    /// on this axis.
    pub fn after(&self, len: usize) -> Location {
        self.offset(len as isize)
    }
}

/// The derived H×W cell array. A pure function of the placement list that
/// produced it: the same placements always re-derive the same grid.
#[derive(Clone)]
pub struct Grid {
    height: usize,
    width: usize,
    cells: Array2<Cell>,
}

impl Grid {
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn get(&self, location: Location) -> Option<Cell> {
        if location.row < 0 || location.col < 0 {
            return None;
        }
        self.cells
            .get((location.row as usize, location.col as usize))
            .copied()
    }

    /// Re-derive the grid from scratch given the authoritative placement
    /// list. Initializes every cell to `Empty`, writes letters for every
    /// placement, then writes the block terminators implied by pre/post
    /// flags.
    pub fn project(
        height: usize,
        width: usize,
        placements: &[Placement],
    ) -> Result<Grid, CrosswordError> {
        let mut cells = Array2::from_elem((height, width), Cell::Empty);

        for placement in placements {
            let mut location = placement.position.location();
            for letter in placement.word.chars() {
                Grid::write_cell(&mut cells, height, width, location, Cell::Letter(letter))?;
                location = location.step(1, placement.position.orientation);
            }
        }

        for placement in placements {
            let bounds = (height as isize, width as isize);
            if placement.pre {
                let before = placement.position.before();
                // A block just past the grid boundary doesn't exist - a
                // pre/post flag on the edge is simply skipped, not written.
                if before.in_bounds(bounds.0, bounds.1) {
                    Grid::write_cell(&mut cells, height, width, before, Cell::Block)?;
                }
            }
            if placement.post {
                let after = placement.position.after(placement.word.chars().count());
                if after.in_bounds(bounds.0, bounds.1) {
                    Grid::write_cell(&mut cells, height, width, after, Cell::Block)?;
                }
            }
        }

        debug!("projected grid from {} placements", placements.len());
        Ok(Grid { height, width, cells })
    }

    fn write_cell(
        cells: &mut Array2<Cell>,
        height: usize,
        width: usize,
        location: Location,
        value: Cell,
    ) -> Result<(), CrosswordError> {
        if !location.in_bounds(height as isize, width as isize) {
            return Err(CrosswordError::InvariantViolation(format!(
                "placement letter falls outside the grid at {:?}",
                location
            )));
        }
        let idx = (location.row as usize, location.col as usize);
        let existing = cells[idx];
        match (existing, value) {
            (Cell::Empty, v) => cells[idx] = v,
            (a, b) if a == b => {}
            (a, b) => {
                return Err(CrosswordError::InvariantViolation(format!(
                    "conflicting overwrite at {:?}: {:?} vs {:?}",
                    location, a, b
                )))
            }
        }
        Ok(())
    }

    pub fn row(&self, row: usize) -> Vec<Cell> {
        self.cells.row(row).to_vec()
    }

    pub fn col(&self, col: usize) -> Vec<Cell> {
        self.cells.column(col).to_vec()
    }

    /// Maximal letter runs (length >= 2) along every row, as
    /// `(start_location, text)` pairs.
    pub fn horizontal_runs(&self) -> Vec<(Location, String)> {
        let mut runs = vec![];
        for r in 0..self.height {
            runs.extend(projection::extract_runs(&self.row(r)).into_iter().map(
                |(start_col, text)| (Location::new(r as isize, start_col as isize), text),
            ));
        }
        runs
    }

    /// Maximal letter runs (length >= 2) along every column.
    pub fn vertical_runs(&self) -> Vec<(Location, String)> {
        let mut runs = vec![];
        for c in 0..self.width {
            runs.extend(projection::extract_runs(&self.col(c)).into_iter().map(
                |(start_row, text)| (Location::new(start_row as isize, c as isize), text),
            ));
        }
        runs
    }

    pub fn to_render_string(&self) -> String {
        let mut out = String::new();
        for r in 0..self.height {
            let line: Vec<String> = self
                .row(r)
                .iter()
                .map(|c| c.glyph().to_string())
                .collect();
            out.push_str(&line.join(" "));
            if r + 1 < self.height {
                out.push('\n');
            }
        }
        out
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_render_string())
    }
}
