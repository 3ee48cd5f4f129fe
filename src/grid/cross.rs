use std::collections::HashMap;

use super::{Cell, Direction, Grid, Location, Placement, Position};

/// Per-orientation exhaustion state for one cross.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exhaustion {
    None,
    Horizontal,
    Vertical,
    Both,
}

impl Default for Exhaustion {
    fn default() -> Self {
        Exhaustion::None
    }
}

impl Exhaustion {
    pub fn includes(self, orientation: Direction) -> bool {
        matches!(
            (self, orientation),
            (Exhaustion::Both, _)
                | (Exhaustion::Horizontal, Direction::Horizontal)
                | (Exhaustion::Vertical, Direction::Vertical)
        )
    }

    /// Promote the marker to also cover `orientation`.
    pub fn with(self, orientation: Direction) -> Exhaustion {
        match (self, orientation) {
            (Exhaustion::Both, _) => Exhaustion::Both,
            (Exhaustion::None, Direction::Horizontal) => Exhaustion::Horizontal,
            (Exhaustion::None, Direction::Vertical) => Exhaustion::Vertical,
            (Exhaustion::Horizontal, Direction::Horizontal) => Exhaustion::Horizontal,
            (Exhaustion::Horizontal, Direction::Vertical) => Exhaustion::Both,
            (Exhaustion::Vertical, Direction::Vertical) => Exhaustion::Vertical,
            (Exhaustion::Vertical, Direction::Horizontal) => Exhaustion::Both,
        }
    }
}

/// Which orientation(s) a word has already been tried against, at one
/// cross.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriedDirection {
    Horizontal,
    Vertical,
    Both,
}

impl TriedDirection {
    fn includes(self, orientation: Direction) -> bool {
        matches!(
            (self, orientation),
            (TriedDirection::Both, _)
                | (TriedDirection::Horizontal, Direction::Horizontal)
                | (TriedDirection::Vertical, Direction::Vertical)
        )
    }

    fn with(self, orientation: Direction) -> TriedDirection {
        match (self, orientation) {
            (TriedDirection::Both, _) => TriedDirection::Both,
            (TriedDirection::Horizontal, Direction::Horizontal) => TriedDirection::Horizontal,
            (TriedDirection::Horizontal, Direction::Vertical) => TriedDirection::Both,
            (TriedDirection::Vertical, Direction::Vertical) => TriedDirection::Vertical,
            (TriedDirection::Vertical, Direction::Horizontal) => TriedDirection::Both,
        }
    }

    fn from(orientation: Direction) -> TriedDirection {
        match orientation {
            Direction::Horizontal => TriedDirection::Horizontal,
            Direction::Vertical => TriedDirection::Vertical,
        }
    }
}

/// The state that outlives any single `Cross` derivation: which words
/// were already offered at this cell, and which orientations are known
/// to have nothing left. Owned by the crossword driver, keyed by
/// `Location`.
#[derive(Clone, Debug, Default)]
pub struct CrossMemo {
    tried: HashMap<String, TriedDirection>,
    exhausted: Exhaustion,
}

impl CrossMemo {
    pub fn new() -> Self {
        CrossMemo::default()
    }

    pub fn has_tried(&self, word: &str, orientation: Direction) -> bool {
        self.tried
            .get(word)
            .map(|d| d.includes(orientation))
            .unwrap_or(false)
    }

    pub fn record_tried(&mut self, word: &str, orientation: Direction) {
        self.tried
            .entry(word.to_string())
            .and_modify(|d| *d = d.with(orientation))
            .or_insert_with(|| TriedDirection::from(orientation));
    }

    pub fn is_exhausted(&self, orientation: Direction) -> bool {
        self.exhausted.includes(orientation)
    }

    pub fn mark_exhausted(&mut self, orientation: Direction) {
        self.exhausted = self.exhausted.with(orientation);
    }

    pub fn exhaustion(&self) -> Exhaustion {
        self.exhausted
    }
}

/// A derived view of one occupied grid cell: its content plus the room
/// available in each of the four directions along its two axes. Rebuilt
/// on demand; never stored.
#[derive(Clone, Copy, Debug)]
pub struct Cross {
    pub location: Location,
    pub content: Cell,
}

impl Cross {
    /// Build a cross at `location` if the grid holds a letter or a block
    /// there (an empty cell has nothing to cross against).
    pub fn at(grid: &Grid, location: Location) -> Option<Cross> {
        let content = grid.get(location)?;
        if content.is_empty() {
            return None;
        }
        Some(Cross { location, content })
    }

    /// Count of consecutive EMPTY cells starting one step past `location`
    /// in the given direction along `orientation`, stopping at a BLOCK or
    /// the grid edge.
    fn freedom(&self, grid: &Grid, orientation: Direction, forward: bool) -> usize {
        let position = Position::new(self.location.row, self.location.col, orientation);
        let mut count = 0isize;
        loop {
            count += 1;
            let loc = if forward {
                position.offset(count)
            } else {
                position.offset(-count)
            };
            match grid.get(loc) {
                Some(Cell::Empty) => continue,
                _ => break,
            }
        }
        (count - 1) as usize
    }

    pub fn horizontal_freedoms(&self, grid: &Grid) -> (usize, usize) {
        (
            self.freedom(grid, Direction::Horizontal, false),
            self.freedom(grid, Direction::Horizontal, true),
        )
    }

    pub fn vertical_freedoms(&self, grid: &Grid) -> (usize, usize) {
        (
            self.freedom(grid, Direction::Vertical, false),
            self.freedom(grid, Direction::Vertical, true),
        )
    }

    /// Total freedom, used by cross-hair ranking.
    pub fn total_freedom(&self, grid: &Grid, orientation: Direction) -> usize {
        let (before, after) = match orientation {
            Direction::Horizontal => self.horizontal_freedoms(grid),
            Direction::Vertical => self.vertical_freedoms(grid),
        };
        before + after
    }

    /// True when all four neighbours (both axes, both directions) are
    /// occupied - a hard barrier to gap-fill and cross-hair candidates.
    pub fn locked(&self, grid: &Grid) -> bool {
        let (h_before, h_after) = self.horizontal_freedoms(grid);
        let (v_before, v_after) = self.vertical_freedoms(grid);
        h_before == 0 && h_after == 0 && v_before == 0 && v_after == 0
    }

    /// Gap-fill lookup east of this cross: the letters bracketing a run of
    /// empty cells, if the run is followed by a letter before the row ends.
    pub fn east_gap(&self, grid: &Grid) -> Option<(char, char, usize)> {
        self.gap(grid, Direction::Horizontal)
    }

    /// Gap-fill lookup south of this cross.
    pub fn south_gap(&self, grid: &Grid) -> Option<(char, char, usize)> {
        self.gap(grid, Direction::Vertical)
    }

    fn gap(&self, grid: &Grid, orientation: Direction) -> Option<(char, char, usize)> {
        let origin = self.content.letter()?;
        let position = Position::new(self.location.row, self.location.col, orientation);
        let gap = self.freedom(grid, orientation, true);
        if gap == 0 {
            return None;
        }
        let terminator = position.offset(gap as isize + 1);
        match grid.get(terminator) {
            Some(Cell::Letter(c)) => Some((origin, c, gap)),
            _ => None,
        }
    }

    /// Whether both cells immediately flanking a hypothetical placement
    /// through this cross (one before `start`, one after the word's end)
    /// are occupied, which would forbid emitting it unless overridden.
    fn axis_locked(grid: &Grid, start: Position, len: usize) -> bool {
        let before_open = match grid.get(start.before()) {
            Some(cell) => cell.is_empty(),
            None => true,
        };
        let after_open = match grid.get(start.after(len)) {
            Some(cell) => cell.is_empty(),
            None => true,
        };
        !before_open && !after_open
    }

    fn fits_along(grid: &Grid, start: Position, word: &str) -> bool {
        for (idx, letter) in word.chars().enumerate() {
            let loc = start.offset(idx as isize);
            match grid.get(loc) {
                Some(cell) if cell.fits(letter) => {}
                _ => return false,
            }
        }
        true
    }

    fn in_bounds(grid: &Grid, start: Position, len: usize) -> bool {
        let start_loc = start.location();
        let end_loc = start.offset(len as isize - 1);
        start_loc.row >= 0
            && start_loc.col >= 0
            && start_loc.in_bounds(grid.height() as isize, grid.width() as isize)
            && end_loc.in_bounds(grid.height() as isize, grid.width() as isize)
    }

    /// Enumerate candidate placements of `word` through this cross.
    /// `restrict` narrows to one orientation; `override_locked` suppresses
    /// the locked-axis veto (used by repair); `suppress_memo` skips
    /// reading/writing the memo (also repair).
    pub fn candidates(
        &self,
        grid: &Grid,
        word: &str,
        restrict: Option<Direction>,
        override_locked: bool,
        suppress_memo: bool,
        memo: &mut CrossMemo,
    ) -> Vec<Placement> {
        let word = word.to_uppercase();
        let orientations: Vec<Direction> = match restrict {
            Some(o) => vec![o],
            None => vec![Direction::Horizontal, Direction::Vertical],
        };

        let mut out = vec![];
        for orientation in orientations {
            if !suppress_memo && memo.has_tried(&word, orientation) {
                continue;
            }

            match self.content {
                Cell::Letter(letter) => {
                    for occurrence in occurrences(&word, letter) {
                        let start = self.start_for_occurrence(occurrence, orientation);
                        if !Cross::in_bounds(grid, start, word.chars().count()) {
                            continue;
                        }
                        if !Cross::fits_along(grid, start, &word) {
                            continue;
                        }
                        if !override_locked && Cross::axis_locked(grid, start, word.chars().count()) {
                            continue;
                        }
                        out.push(Placement::new(&word, start));
                    }
                }
                Cell::Block => {
                    // Block cell: only the two placements that treat the
                    // block as a hard terminator are legal.
                    let len = word.chars().count();
                    let after_start = Position::new(self.location.row, self.location.col, orientation).advance();
                    if Cross::in_bounds(grid, after_start, len) && Cross::fits_along(grid, after_start, &word) {
                        out.push(Placement::new(&word, after_start));
                    }
                    let end_loc = self.location.step(-1, orientation);
                    let start_loc = end_loc.step(-(len as isize - 1), orientation);
                    let start = Position::new(start_loc.row, start_loc.col, orientation);
                    if Cross::in_bounds(grid, start, len) && Cross::fits_along(grid, start, &word) {
                        out.push(Placement::new(&word, start));
                    }
                }
                Cell::Empty => unreachable!("Cross::at never wraps an empty cell"),
            }

            if !suppress_memo {
                memo.record_tried(&word, orientation);
            }
        }

        out
    }

    fn start_for_occurrence(&self, occurrence: usize, orientation: Direction) -> Position {
        match orientation {
            Direction::Horizontal => {
                Position::new(self.location.row, self.location.col - occurrence as isize, orientation)
            }
            Direction::Vertical => {
                Position::new(self.location.row - occurrence as isize, self.location.col, orientation)
            }
        }
    }
}

fn occurrences(word: &str, letter: char) -> Vec<usize> {
    word.chars()
        .enumerate()
        .filter(|(_, c)| *c == letter)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Placement;

    fn small_grid(placements: &[Placement]) -> Grid {
        Grid::project(5, 5, placements).unwrap()
    }

    #[test]
    fn enumerates_both_orientations_through_shared_letter() {
        let seed = Placement::new("CAT", Position::new(2, 1, Direction::Horizontal));
        let grid = small_grid(&[seed]);
        let cross = Cross::at(&grid, Location::new(2, 3)).unwrap();
        let mut memo = CrossMemo::new();
        let candidates = cross.candidates(&grid, "ART", None, false, false, &mut memo);
        assert!(candidates.iter().any(|p| p.orientation() == Direction::Vertical));
    }

    #[test]
    fn memo_suppresses_repeat_offers_of_the_same_word() {
        let seed = Placement::new("CAT", Position::new(2, 1, Direction::Horizontal));
        let grid = small_grid(&[seed]);
        let cross = Cross::at(&grid, Location::new(2, 3)).unwrap();
        let mut memo = CrossMemo::new();
        let first = cross.candidates(&grid, "ART", None, false, false, &mut memo);
        assert!(!first.is_empty());
        let second = cross.candidates(&grid, "ART", None, false, false, &mut memo);
        assert!(second.is_empty());
    }

    #[test]
    fn suppressed_memo_ignores_prior_tries() {
        let seed = Placement::new("CAT", Position::new(2, 1, Direction::Horizontal));
        let grid = small_grid(&[seed]);
        let cross = Cross::at(&grid, Location::new(2, 3)).unwrap();
        let mut memo = CrossMemo::new();
        memo.record_tried("ART", Direction::Vertical);
        let candidates = cross.candidates(&grid, "ART", None, false, true, &mut memo);
        assert!(candidates.iter().any(|p| p.orientation() == Direction::Vertical));
    }

    #[test]
    fn locked_axis_is_vetoed_without_override() {
        // CAT sits at (3,2)-(3,4); single letters flank it on both sides,
        // so any horizontal placement that would start exactly where CAT
        // starts is locked on both ends.
        let h = Placement::new("CAT", Position::new(3, 2, Direction::Horizontal));
        let left = Placement::new("X", Position::new(3, 1, Direction::Horizontal));
        let right = Placement::new("Y", Position::new(3, 5, Direction::Horizontal));
        let grid = Grid::project(7, 7, &[h, left, right]).unwrap();
        let cross = Cross::at(&grid, Location::new(3, 3)).unwrap();

        let mut memo = CrossMemo::new();
        let vetoed = cross.candidates(&grid, "CAT", Some(Direction::Horizontal), false, true, &mut memo);
        assert!(vetoed.is_empty(), "both ends occupied should veto the placement without an override");

        let mut memo2 = CrossMemo::new();
        let overridden = cross.candidates(&grid, "CAT", Some(Direction::Horizontal), true, true, &mut memo2);
        assert!(overridden.iter().any(|p| p.start() == Location::new(3, 2)));
    }

    #[test]
    fn exhaustion_promotes_from_one_orientation_to_both() {
        let marker = Exhaustion::None.with(Direction::Horizontal);
        assert_eq!(marker, Exhaustion::Horizontal);
        let both = marker.with(Direction::Vertical);
        assert_eq!(both, Exhaustion::Both);
        assert!(both.includes(Direction::Horizontal));
        assert!(both.includes(Direction::Vertical));
    }

    #[test]
    fn east_gap_reports_pre_post_and_width() {
        let row = Placement::new("C", Position::new(1, 0, Direction::Horizontal));
        let tail = Placement::new("T", Position::new(1, 3, Direction::Horizontal));
        let grid = small_grid(&[row, tail]);
        let cross = Cross::at(&grid, Location::new(1, 0)).unwrap();
        assert_eq!(cross.east_gap(&grid), Some(('C', 'T', 2)));
    }

    #[test]
    fn east_gap_is_none_without_a_closing_letter() {
        let row = Placement::new("C", Position::new(1, 0, Direction::Horizontal));
        let grid = small_grid(&[row]);
        let cross = Cross::at(&grid, Location::new(1, 0)).unwrap();
        assert_eq!(cross.east_gap(&grid), None);
    }

    #[test]
    fn locked_requires_all_four_neighbours_occupied() {
        let h = Placement::new("CAT", Position::new(2, 1, Direction::Horizontal));
        let v = Placement::new("RAN", Position::new(1, 2, Direction::Vertical));
        let grid = small_grid(&[h, v]);
        let middle = Cross::at(&grid, Location::new(2, 2)).unwrap();
        assert!(middle.locked(&grid));
        let open_cross = Cross::at(&grid, Location::new(2, 1)).unwrap();
        assert!(!open_cross.locked(&grid));
    }
}
