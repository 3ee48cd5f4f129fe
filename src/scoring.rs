use std::fmt;

use crate::crossword::Crossword;
use crate::dictionary::Dictionary;

/// The components behind a grid's final score, kept separate so callers
/// can compare candidates without re-deriving each part.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Score {
    pub word_score_total: f64,
    pub average_placement_length: f64,
    pub coverage: f64,
}

impl Score {
    /// `word_score_total * average_placement_length * coverage`.
    pub fn total(&self) -> f64 {
        self.word_score_total * self.average_placement_length * self.coverage
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "score={:.2} (words={:.2}, avg_len={:.2}, coverage={:.2})",
            self.total(),
            self.word_score_total,
            self.average_placement_length,
            self.coverage
        )
    }
}

/// Score a finished (or in-progress) grid against its dictionary. Every
/// placement's dictionary score is summed regardless of whether it is
/// still a stub; a seed's bare letter contributes zero via
/// `Dictionary::score_of`.
pub fn score(crossword: &Crossword, dictionary: &Dictionary) -> Score {
    let placements = crossword.placements();
    let word_score_total: f64 = placements.iter().map(|p| dictionary.score_of(&p.word)).sum();
    let average_placement_length = if placements.is_empty() {
        0.0
    } else {
        placements.iter().map(|p| p.len() as f64).sum::<f64>() / placements.len() as f64
    };
    Score {
        word_score_total,
        average_placement_length,
        coverage: crossword.coverage(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Direction, Placement, Position};

    #[test]
    fn total_multiplies_the_three_components() {
        let s = Score {
            word_score_total: 10.0,
            average_placement_length: 4.0,
            coverage: 0.5,
        };
        assert_eq!(s.total(), 20.0);
    }

    #[test]
    fn score_of_an_empty_crossword_has_zero_average_length() {
        let cw = Crossword::new(5, 5);
        let dict = Dictionary::from_words(vec![], vec![], 1);
        let s = score(&cw, &dict);
        assert_eq!(s.average_placement_length, 0.0);
    }

    #[test]
    fn score_sums_dictionary_scores_of_every_placement() {
        let dict = Dictionary::from_words(vec!["EUREKA"], vec!["CAT"], 1);
        let mut cw = Crossword::new(5, 5);
        cw.apply(Placement::new("CAT", Position::new(1, 1, Direction::Horizontal))).unwrap();
        let s = score(&cw, &dict);
        assert!(s.word_score_total > 0.0);
    }
}
