use std::fmt;

use crate::crossword::Crossword;
use crate::scoring::Score;

/// An immutable snapshot of a crossword plus its score, decoupled from the
/// search loop so the CLI (or a test) can render a grid without holding a
/// live `&Crossword` borrow.
pub struct RenderSnapshot {
    rendered_grid: String,
    placement_count: usize,
    score: Score,
}

impl RenderSnapshot {
    pub fn new(crossword: &Crossword, score: Score) -> Self {
        RenderSnapshot {
            rendered_grid: crossword.grid().to_render_string(),
            placement_count: crossword.placements().len(),
            score,
        }
    }
}

impl fmt::Display for RenderSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.rendered_grid)?;
        write!(f, "{} placements, {}", self.placement_count, self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Direction, Placement, Position};
    use crate::scoring;

    #[test]
    fn display_includes_the_grid_and_placement_count() {
        let dict = crate::dictionary::Dictionary::from_words(vec![], vec!["AB"], 1);
        let mut cw = Crossword::new(2, 2);
        cw.apply(Placement::new("AB", Position::new(0, 0, Direction::Horizontal))).unwrap();
        let score = scoring::score(&cw, &dict);
        let snapshot = RenderSnapshot::new(&cw, score);
        let rendered = snapshot.to_string();
        assert!(rendered.contains('A'));
        assert!(rendered.contains("1 placements"));
    }
}
