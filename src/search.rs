use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::crossword::Crossword;
use crate::dictionary::Dictionary;
use crate::scoring::{self, Score};

/// Chance, per batch, that an empty stub-continuation pass is followed by
/// a gap-fill attempt before falling through to cross-hair enumeration.
pub const GAP_FILL_PROBABILITY: f64 = 0.25;

/// Consecutive empty-candidate batches tolerated before giving up early,
/// a safety net against dictionaries too sparse to ever finish.
const MAX_IDLE_BATCHES: usize = 200;

/// Parameters for one `run`.
#[derive(Debug)]
pub struct SearchSettings {
    pub height: usize,
    pub width: usize,
    pub seed: u64,
    pub time_budget: Duration,
}

impl SearchSettings {
    pub fn new(height: usize, width: usize, seed: u64, time_budget: Duration) -> Self {
        SearchSettings {
            height,
            width,
            seed,
            time_budget,
        }
    }
}

/// The result of a search run: the grid reached, its score, and whether it
/// stopped because of an interrupt rather than running to completion.
pub struct SearchOutcome {
    pub crossword: Crossword,
    pub score: Score,
    pub interrupted: bool,
}

/// Run the full greedy-with-backtracking loop: seed, then repeatedly draw
/// a batch of candidates (stub continuation, gap-fill, cross-hair, in that
/// priority order) and place every one that survives repair, until the
/// time budget runs out, the caller requests an interrupt, or no batch has
/// produced a placement for `MAX_IDLE_BATCHES` rounds in a row.
pub fn run(dictionary: &Dictionary, settings: &SearchSettings, interrupt: &AtomicBool) -> SearchOutcome {
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let mut crossword = Crossword::new(settings.height, settings.width);
    let started = Instant::now();

    crossword.seed(dictionary, &mut rng);

    let mut idle_batches = 0;
    loop {
        if interrupt.load(Ordering::Relaxed) {
            info!("search interrupted after {:?}", started.elapsed());
            break;
        }
        if started.elapsed() >= settings.time_budget {
            info!("time budget of {:?} exhausted", settings.time_budget);
            break;
        }
        if idle_batches >= MAX_IDLE_BATCHES {
            info!("no placements in {} consecutive batches, stopping", MAX_IDLE_BATCHES);
            break;
        }

        let mut candidates = crossword.stub_continuations(dictionary);
        if candidates.is_empty() {
            if rng.gen_range(0.0, 1.0) < GAP_FILL_PROBABILITY {
                candidates = crossword.gap_fill(dictionary);
            }
            if candidates.is_empty() {
                candidates = crossword.cross_hair_candidates(dictionary, &mut rng);
            }
        }

        if candidates.is_empty() {
            idle_batches += 1;
            continue;
        }

        let mut placed_any = false;
        for candidate in candidates {
            if crossword.apply_and_repair(candidate, dictionary) {
                placed_any = true;
            }
        }
        crossword.cleanup_dwarfs();

        idle_batches = if placed_any { 0 } else { idle_batches + 1 };
    }

    let score = scoring::score(&crossword, dictionary);
    info!("finished with {}", score);
    SearchOutcome {
        crossword,
        score,
        interrupted: interrupt.load(Ordering::Relaxed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_places_at_least_the_seed_letter() {
        let dictionary = Dictionary::from_words(vec!["EUREKA"], vec!["CAT", "ART", "TO"], 3);
        let settings = SearchSettings::new(6, 6, 1, Duration::from_millis(200));
        let interrupt = AtomicBool::new(false);
        let outcome = run(&dictionary, &settings, &interrupt);
        assert!(!outcome.crossword.placements().is_empty());
        assert!(!outcome.interrupted);
    }

    #[test]
    fn run_stops_immediately_when_already_interrupted() {
        let dictionary = Dictionary::from_words(vec![], vec!["CAT"], 1);
        let settings = SearchSettings::new(5, 5, 1, Duration::from_secs(5));
        let interrupt = AtomicBool::new(true);
        let outcome = run(&dictionary, &settings, &interrupt);
        assert!(outcome.interrupted);
    }
}
