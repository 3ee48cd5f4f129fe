use std::collections::HashMap;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::dictionary::{Dictionary, Word};
use crate::error::CrosswordError;
use crate::grid::{Cell, Cross, CrossMemo, Direction, Exhaustion, Grid, Location, Placement, Position, ALPHABET};

/// Rare letters get first pick in cross-hair ranking.
const RARE_LETTERS: &str = "ZXCFHBYQUWJÅÄÖ";
/// Cross-hair keeps only the top-ranked crosses from the priority pass.
const CROSS_HAIR_TOP_N: usize = 10;
/// Cross-hair tries at most this many dictionary words per cross; hitting
/// the limit suppresses the exhaustion marker for that cross.
const CROSS_HAIR_WORD_LIMIT: usize = 25;
/// Recursion ceiling for `repair`, to guarantee termination on pathological
/// dictionaries.
const MAX_REPAIR_DEPTH: usize = 16;

/// The driver: grid, placement list, per-cross memoization table, and the
/// pending side-effect map. The grid is always kept in sync with
/// `placements` - it is re-derived after every mutation rather than
/// patched incrementally.
pub struct Crossword {
    height: usize,
    width: usize,
    placements: Vec<Placement>,
    grid: Grid,
    cross_memo: HashMap<Location, CrossMemo>,
    side_effects: Vec<(Placement, Vec<Placement>)>,
}

impl Crossword {
    pub fn new(height: usize, width: usize) -> Self {
        let grid = Grid::project(height, width, &[]).expect("an empty placement list never conflicts");
        Crossword {
            height,
            width,
            placements: vec![],
            grid,
            cross_memo: HashMap::new(),
            side_effects: vec![],
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn side_effects(&self) -> &[(Placement, Vec<Placement>)] {
        &self.side_effects
    }

    pub fn contains_word_text(&self, text: &str) -> bool {
        let upper = text.to_uppercase();
        self.placements.iter().any(|p| p.word == upper)
    }

    /// Letter-bearing cells divided by total cells.
    pub fn coverage(&self) -> f64 {
        let mut filled = 0usize;
        for row in 0..self.height {
            for col in 0..self.width {
                let loc = Location::new(row as isize, col as isize);
                if matches!(self.grid.get(loc), Some(Cell::Letter(_))) {
                    filled += 1;
                }
            }
        }
        filled as f64 / (self.height * self.width) as f64
    }

    /// Apply a placement and report the side effects it introduced. The
    /// placement list is the only thing rolled back on a projection
    /// failure; the caller owns deciding what happens next.
    pub fn apply(&mut self, placement: Placement) -> Result<Vec<Placement>, CrosswordError> {
        let before = current_words(&self.grid);
        self.placements.push(placement.clone());

        let grid = match Grid::project(self.height, self.width, &self.placements) {
            Ok(grid) => grid,
            Err(e) => {
                self.placements.pop();
                return Err(e);
            }
        };
        self.grid = grid;

        let after = current_words(&self.grid);
        let mut effects: Vec<Placement> = after
            .into_iter()
            .filter(|word| !word.same_text_and_position(&placement))
            .filter(|word| !before.iter().any(|b| b.same_text_and_position(word)))
            .filter(|word| {
                !self
                    .side_effects
                    .iter()
                    .any(|(_, effs)| effs.iter().any(|e| e.same_text_and_position(word)))
            })
            .collect();
        effects.sort_by(|a, b| b.len().cmp(&a.len()));

        if !effects.is_empty() {
            debug!("{} introduced {} side effect(s)", placement.word, effects.len());
            self.side_effects.push((placement.clone(), effects.clone()));
        }
        Ok(effects)
    }

    /// Remove a placement and re-derive the grid, undoing its bookkeeping
    /// in lockstep.
    pub fn undo(&mut self, placement: &Placement) {
        let idx = match self.placements.iter().rposition(|p| p.same_text_and_position(placement)) {
            Some(idx) => idx,
            None => {
                warn!("undo called for a placement that isn't present: {}", placement.word);
                return;
            }
        };
        self.placements.remove(idx);
        self.side_effects.retain(|(p, _)| !p.same_text_and_position(placement));
        self.grid = Grid::project(self.height, self.width, &self.placements)
            .expect("removing a placement can only shrink the grid, never introduce a conflict");
    }

    /// Apply `placement`, then recursively repair any side effects. Rolls
    /// `placement` back (along with every trial placement made while
    /// repairing) if repair fails.
    pub fn apply_and_repair(&mut self, placement: Placement, dictionary: &Dictionary) -> bool {
        let effects = match self.apply(placement.clone()) {
            Ok(effects) => effects,
            Err(e) => {
                warn!("rejected {}: {}", placement.word, e);
                return false;
            }
        };
        if effects.is_empty() {
            return true;
        }
        match self.repair(effects, dictionary, 0) {
            Ok(_trials) => true,
            Err(()) => {
                debug!("rolling back {}: side effects could not be repaired", placement.word);
                self.undo(&placement);
                false
            }
        }
    }

    /// Depth-first, backtracking repair of a list of side-effect words.
    /// Returns the trial placements applied on success, so an outer call
    /// can fold them into its own rollback list on failure.
    fn repair(&mut self, effects: Vec<Placement>, dictionary: &Dictionary, depth: usize) -> Result<Vec<Placement>, ()> {
        if depth > MAX_REPAIR_DEPTH {
            return Err(());
        }

        let mut trials: Vec<Placement> = vec![];
        for effect in effects {
            if dictionary.contains(&effect.word) {
                continue;
            }
            if effect.len() > 3 && dictionary.compatible(&effect.word).is_empty() {
                self.rollback(&trials);
                return Err(());
            }

            let candidates = dictionary.compatible(&effect.word);
            let mut candidate_placements: Vec<Placement> = vec![];
            if let Some(cross) = Cross::at(&self.grid, effect.start()) {
                let memo = self.cross_memo.entry(effect.start()).or_default();
                for word in &candidates {
                    candidate_placements.extend(cross.candidates(
                        &self.grid,
                        &word.text,
                        Some(effect.orientation()),
                        true,
                        true,
                        memo,
                    ));
                }
            }

            let mut resolved = false;
            for candidate in candidate_placements {
                let sub_effects = match self.apply(candidate.clone()) {
                    Ok(e) => e,
                    Err(_) => continue,
                };
                if sub_effects.is_empty() {
                    trials.push(candidate);
                    resolved = true;
                    break;
                }
                match self.repair(sub_effects, dictionary, depth + 1) {
                    Ok(sub_trials) => {
                        trials.push(candidate);
                        trials.extend(sub_trials);
                        resolved = true;
                        break;
                    }
                    Err(()) => self.undo(&candidate),
                }
            }

            if !resolved {
                self.rollback(&trials);
                return Err(());
            }
        }
        Ok(trials)
    }

    fn rollback(&mut self, trials: &[Placement]) {
        for trial in trials.iter().rev() {
            self.undo(trial);
        }
    }

    /// Continue or close every stub placement.
    pub fn stub_continuations(&mut self, dictionary: &Dictionary) -> Vec<Placement> {
        let mut stubs: Vec<Placement> = self.placements.iter().filter(|p| p.is_stub()).cloned().collect();
        stubs.sort_by_key(|p| p.len());

        let mut candidates = vec![];
        for stub in stubs {
            let compatible = dictionary.compatible(&stub.word);
            if compatible.is_empty() {
                debug!("closing stub {}: no dictionary continuation", stub.word);
                self.set_stub_post(&stub);
                continue;
            }

            let orientation = stub.orientation();
            let start = stub.start();
            let exhausted = self
                .cross_memo
                .get(&start)
                .map(|m| m.is_exhausted(orientation))
                .unwrap_or(false);

            if !exhausted {
                if let Some(cross) = Cross::at(&self.grid, start) {
                    let memo = self.cross_memo.entry(start).or_default();
                    for word in &compatible {
                        candidates.extend(cross.candidates(&self.grid, &word.text, Some(orientation), false, false, memo));
                    }
                    memo.mark_exhausted(orientation);
                }
            } else {
                let after = stub.position.after(stub.len());
                let after_empty = matches!(self.grid.get(after), Some(Cell::Empty));
                if after_empty {
                    self.set_stub_post(&stub);
                } else {
                    self.retreat_stub_and_set_pre(&stub);
                }
            }
        }
        candidates
    }

    fn set_stub_post(&mut self, stub: &Placement) {
        let idx = match self.placements.iter().position(|p| p.same_text_and_position(stub)) {
            Some(idx) => idx,
            None => return,
        };
        let previous = self.placements[idx].post;
        self.placements[idx].post = true;
        match Grid::project(self.height, self.width, &self.placements) {
            Ok(grid) => self.grid = grid,
            Err(e) => {
                warn!("closing stub {} with a trailing block rejected: {}", stub.word, e);
                self.placements[idx].post = previous;
            }
        }
    }

    fn retreat_stub_and_set_pre(&mut self, stub: &Placement) {
        let idx = match self.placements.iter().position(|p| p.same_text_and_position(stub)) {
            Some(idx) => idx,
            None => return,
        };
        let previous_position = self.placements[idx].position;
        let previous_pre = self.placements[idx].pre;
        self.placements[idx].position = previous_position.retreat();
        self.placements[idx].pre = true;
        match Grid::project(self.height, self.width, &self.placements) {
            Ok(grid) => self.grid = grid,
            Err(e) => {
                warn!("retreating stub {} for a leading block rejected: {}", stub.word, e);
                self.placements[idx].position = previous_position;
                self.placements[idx].pre = previous_pre;
            }
        }
    }

    /// Gap-fit every open, unlocked, non-block cross against its east and
    /// south neighbours.
    pub fn gap_fill(&mut self, dictionary: &Dictionary) -> Vec<Placement> {
        let mut candidates = vec![];
        for row in 0..self.height {
            for col in 0..self.width {
                let loc = Location::new(row as isize, col as isize);
                let cross = match Cross::at(&self.grid, loc) {
                    Some(c) => c,
                    None => continue,
                };
                if cross.content.is_block() || cross.locked(&self.grid) {
                    continue;
                }
                if let Some((pre, post, gap)) = cross.east_gap(&self.grid) {
                    for word in dictionary.gap_fit(&pre.to_string(), &post.to_string(), gap) {
                        candidates.push(Placement::new(&word.text, Position::new(row as isize, col as isize, Direction::Horizontal)));
                    }
                }
                if let Some((pre, post, gap)) = cross.south_gap(&self.grid) {
                    for word in dictionary.gap_fit(&pre.to_string(), &post.to_string(), gap) {
                        candidates.push(Placement::new(&word.text, Position::new(row as isize, col as isize, Direction::Vertical)));
                    }
                }
            }
        }
        candidates
    }

    /// Cross-hair candidate enumeration: a rare-letter priority pass, then
    /// freedom-ranked interleaving.
    pub fn cross_hair_candidates(&mut self, dictionary: &Dictionary, rng: &mut StdRng) -> Vec<Placement> {
        let mut eligible: Vec<Location> = vec![];
        for row in 0..self.height {
            for col in 0..self.width {
                let loc = Location::new(row as isize, col as isize);
                let cross = match Cross::at(&self.grid, loc) {
                    Some(c) => c,
                    None => continue,
                };
                if cross.locked(&self.grid) {
                    continue;
                }
                let exhausted = self
                    .cross_memo
                    .get(&loc)
                    .map(|m| m.exhaustion() == Exhaustion::Both)
                    .unwrap_or(false);
                if exhausted {
                    continue;
                }
                eligible.push(loc);
            }
        }

        let mut priority = eligible.clone();
        priority.shuffle(rng);
        priority.sort_by_key(|loc| {
            let rank = self
                .grid
                .get(*loc)
                .and_then(|c| c.letter())
                .and_then(|l| RARE_LETTERS.chars().position(|r| r == l))
                .map(|i| RARE_LETTERS.chars().count() - i)
                .unwrap_or(0);
            std::cmp::Reverse(rank)
        });
        priority.truncate(CROSS_HAIR_TOP_N);

        let mut by_horizontal = eligible.clone();
        by_horizontal.sort_by_key(|loc| {
            std::cmp::Reverse(
                Cross::at(&self.grid, *loc)
                    .map(|c| c.total_freedom(&self.grid, Direction::Horizontal))
                    .unwrap_or(0),
            )
        });
        let mut by_vertical = eligible.clone();
        by_vertical.sort_by_key(|loc| {
            std::cmp::Reverse(
                Cross::at(&self.grid, *loc)
                    .map(|c| c.total_freedom(&self.grid, Direction::Vertical))
                    .unwrap_or(0),
            )
        });

        let mut ordered = priority;
        for (h, v) in by_horizontal.iter().zip(by_vertical.iter()) {
            ordered.push(*h);
            ordered.push(*v);
        }

        let mut candidates = vec![];
        for loc in ordered {
            let cross = match Cross::at(&self.grid, loc) {
                Some(c) => c,
                None => continue,
            };
            let words: Vec<&Word> = match cross.content {
                Cell::Letter(letter) => dictionary.compatible(&letter.to_string()),
                Cell::Block => dictionary.words().iter().collect(),
                Cell::Empty => continue,
            };
            let truncated = words.len() > CROSS_HAIR_WORD_LIMIT;
            let slice = if truncated { &words[..CROSS_HAIR_WORD_LIMIT] } else { &words[..] };

            let memo = self.cross_memo.entry(loc).or_default();
            for word in slice {
                candidates.extend(cross.candidates(&self.grid, &word.text, None, false, false, memo));
            }
            if !truncated {
                memo.mark_exhausted(Direction::Horizontal);
                memo.mark_exhausted(Direction::Vertical);
            }
        }
        candidates
    }

    /// Remove placements strictly contained by a longer placement at the
    /// same start position. Both a text-prefix relationship and position
    /// equality are required, never position-sensitive equality alone.
    pub fn cleanup_dwarfs(&mut self) {
        let dwarfs: Vec<Placement> = self
            .placements
            .iter()
            .filter(|candidate| self.placements.iter().any(|longer| longer.contains_dwarf(candidate)))
            .cloned()
            .collect();
        if dwarfs.is_empty() {
            return;
        }
        debug!("cleanup: removing {} dwarf placement(s)", dwarfs.len());
        for dwarf in &dwarfs {
            if let Some(idx) = self.placements.iter().position(|p| p.same_text_and_position(dwarf)) {
                self.placements.remove(idx);
            }
        }
        self.side_effects
            .retain(|(p, _)| self.placements.iter().any(|kept| kept.same_text_and_position(p)));
        self.grid = Grid::project(self.height, self.width, &self.placements)
            .expect("removing dwarfs can only shrink the grid, never introduce a conflict");
    }

    /// Anchor the grid: a uniformly random one-letter placement at a
    /// uniformly random cross, immediately extended with the first special
    /// word that fits. Returns whether the special-word extension
    /// succeeded; the one-letter anchor is always left in place.
    pub fn seed(&mut self, dictionary: &Dictionary, rng: &mut StdRng) -> bool {
        let alphabet: Vec<char> = ALPHABET.chars().collect();
        let letter = *alphabet.choose(rng).expect("alphabet is never empty");
        let row = rng.gen_range(0, self.height as isize);
        let col = rng.gen_range(0, self.width as isize);
        let loc = Location::new(row, col);

        let anchor = Placement::new(&letter.to_string(), Position::new(row, col, Direction::Horizontal));
        self.placements.push(anchor);
        self.grid = Grid::project(self.height, self.width, &self.placements).expect("seeding an empty grid never conflicts");
        info!("seeded {} at {:?}", letter, loc);

        let special_words: Vec<&Word> = dictionary.words().iter().filter(|w| w.special).collect();
        let cross = match Cross::at(&self.grid, loc) {
            Some(cross) => cross,
            None => return false,
        };

        let mut candidate_placements: Vec<Placement> = vec![];
        {
            let memo = self.cross_memo.entry(loc).or_default();
            for word in &special_words {
                candidate_placements.extend(cross.candidates(&self.grid, &word.text, None, false, false, memo));
            }
        }

        for candidate in candidate_placements {
            if self.apply_and_repair(candidate, dictionary) {
                return true;
            }
        }
        false
    }
}

/// Every maximal letter run currently in the grid, as position-bearing
/// placements with no terminator flags set. Used to diff grid states
/// before/after applying a placement.
fn current_words(grid: &Grid) -> Vec<Placement> {
    let mut words = vec![];
    for (loc, text) in grid.horizontal_runs() {
        words.push(Placement::new(&text, Position::new(loc.row, loc.col, Direction::Horizontal)));
    }
    for (loc, text) in grid.vertical_runs() {
        words.push(Placement::new(&text, Position::new(loc.row, loc.col, Direction::Vertical)));
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(special: Vec<&str>, ordinary: Vec<&str>) -> Dictionary {
        Dictionary::from_words(special, ordinary, 7)
    }

    #[test]
    fn apply_reports_no_effects_on_an_empty_grid() {
        let mut cw = Crossword::new(5, 5);
        let effects = cw.apply(Placement::new("CAT", Position::new(1, 1, Direction::Horizontal))).unwrap();
        assert!(effects.is_empty());
        assert_eq!(cw.placements().len(), 1);
    }

    #[test]
    fn apply_then_undo_restores_prior_state() {
        let mut cw = Crossword::new(5, 5);
        let placement = Placement::new("CAT", Position::new(1, 1, Direction::Horizontal));
        cw.apply(placement.clone()).unwrap();
        let grid_before = cw.grid().to_render_string();
        cw.apply(Placement::new("ART", Position::new(2, 0, Direction::Vertical))).unwrap();
        cw.undo(&Placement::new("ART", Position::new(2, 0, Direction::Vertical)));
        assert_eq!(cw.grid().to_render_string(), grid_before);
        assert_eq!(cw.placements().len(), 1);
    }

    #[test]
    fn apply_detects_a_crossing_side_effect() {
        let mut cw = Crossword::new(5, 5);
        cw.apply(Placement::new("CAT", Position::new(1, 1, Direction::Horizontal))).unwrap();
        // ART's 'A' lands exactly on CAT's 'A' (row 1, col 2); the rest of
        // ART's letters are otherwise isolated, so no new run forms.
        let effects = cw
            .apply(Placement::new("ART", Position::new(1, 2, Direction::Vertical)))
            .unwrap();
        assert!(effects.is_empty(), "ART only shares a cell with CAT, it doesn't form a new run elsewhere");
    }

    #[test]
    fn repair_accepts_a_side_effect_already_in_the_dictionary() {
        let dictionary = dict(vec![], vec!["CAT", "AR", "RT", "ART"]);
        let mut cw = Crossword::new(5, 5);
        cw.apply(Placement::new("CAT", Position::new(0, 0, Direction::Horizontal))).unwrap();
        // An isolated 'A' sits one row below CAT's own 'A' (col 1). Placing
        // ART vertically through that same column writes a fresh 'R' right
        // next to it, forming the new horizontal side effect "AR" - which
        // is itself a dictionary word, so repair must accept it as-is.
        cw.apply(Placement::new("A", Position::new(1, 0, Direction::Horizontal))).unwrap();
        let placements_before = cw.placements().len();

        let placed = cw.apply_and_repair(Placement::new("ART", Position::new(0, 1, Direction::Vertical)), &dictionary);

        assert!(placed);
        assert_eq!(cw.placements().len(), placements_before + 1, "AR needed no replacement placement");
        assert!(cw
            .side_effects()
            .iter()
            .any(|(_, effects)| effects.iter().any(|e| e.word == "AR")));
    }

    #[test]
    fn repair_rolls_back_an_unfixable_side_effect() {
        let dictionary = dict(vec![], vec!["CAT"]);
        let mut cw = Crossword::new(5, 5);
        // An isolated 'Z' sits directly above CAT's future 'T' (col 2);
        // placing CAT then forces a new two-letter vertical run "ZT" that
        // the dictionary neither contains nor can extend.
        cw.apply(Placement::new("Z", Position::new(0, 2, Direction::Horizontal))).unwrap();
        let snapshot = cw.grid().to_render_string();
        let placement_count = cw.placements().len();

        let placed = cw.apply_and_repair(Placement::new("CAT", Position::new(1, 0, Direction::Horizontal)), &dictionary);

        assert!(!placed);
        assert_eq!(cw.grid().to_render_string(), snapshot);
        assert_eq!(cw.placements().len(), placement_count);
    }

    #[test]
    fn stub_with_no_continuation_closes_with_post_flag() {
        let dictionary = dict(vec![], vec!["COWS"]);
        let mut cw = Crossword::new(5, 5);
        cw.apply(Placement::new("AT", Position::new(1, 1, Direction::Horizontal))).unwrap();
        cw.stub_continuations(&dictionary);
        let stub = cw.placements().iter().find(|p| p.word == "AT").unwrap();
        assert!(stub.post);
    }

    #[test]
    fn seed_places_a_single_letter_then_a_special_word() {
        let dictionary = dict(vec!["EUREKA"], vec![]);
        let mut cw = Crossword::new(5, 5);
        let mut rng = StdRng::seed_from_u64(1);
        cw.seed(&dictionary, &mut rng);
        assert!(!cw.placements().is_empty());
    }

    #[test]
    fn cleanup_dwarfs_removes_prefix_contained_by_a_longer_placement_at_the_same_start() {
        let mut cw = Crossword::new(5, 5);
        cw.apply(Placement::new("CAT", Position::new(1, 0, Direction::Horizontal))).unwrap();
        cw.apply(Placement::new("CATALOG", Position::new(1, 0, Direction::Horizontal))).unwrap();
        cw.cleanup_dwarfs();
        assert!(!cw.placements().iter().any(|p| p.word == "CAT"));
        assert!(cw.placements().iter().any(|p| p.word == "CATALOG"));
    }

    #[test]
    fn coverage_counts_letter_bearing_cells_only() {
        let mut cw = Crossword::new(2, 2);
        cw.apply(Placement::new("AB", Position::new(0, 0, Direction::Horizontal))).unwrap();
        assert_eq!(cw.coverage(), 0.5);
    }
}
