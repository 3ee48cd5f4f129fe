use std::collections::{HashMap, HashSet};
use std::fs;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;

use crate::error::DictionaryError;
use crate::grid::is_valid_letter;

mod word;

pub use word::Word;

/// Below this length, a failed substring query is cheap enough to cache
/// permanently as "known impossible".
const IMPOSSIBLE_CACHE_MAX_LEN: usize = 5;

/// A ranked set of known words plus the indexes needed to answer
/// membership, substring, and gap-fit queries in roughly constant time.
pub struct Dictionary {
    words: Vec<Word>,
    by_text: HashMap<String, usize>,
    letter_index: HashMap<char, HashSet<usize>>,
    substring_cache: std::cell::RefCell<HashMap<String, Vec<usize>>>,
    known_impossible: std::cell::RefCell<HashSet<String>>,
}

impl Dictionary {
    /// Loads a special list and an ordinary list, both one word per line,
    /// uppercased and stripped of newline / BLOCK / whitespace padding.
    pub fn load(special_path: &str, ordinary_path: &str, seed: u64) -> Result<Dictionary, DictionaryError> {
        let special_text = fs::read_to_string(special_path).map_err(|source| DictionaryError::Read {
            path: special_path.to_string(),
            source,
        })?;
        let ordinary_text = fs::read_to_string(ordinary_path).map_err(|source| DictionaryError::Read {
            path: ordinary_path.to_string(),
            source,
        })?;

        let special_words = clean_lines(&special_text);
        let ordinary_words = clean_lines(&ordinary_text);
        let special_count = special_words.len();
        let ordinary_count = ordinary_words.len();
        if special_count + ordinary_count == 0 {
            return Err(DictionaryError::Empty {
                special: special_count,
                ordinary: ordinary_count,
            });
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut dictionary = Dictionary::from_word_lists(special_words, ordinary_words, &mut rng);
        dictionary.build_index();
        info!(
            "loaded dictionary: {} special + {} ordinary words",
            special_count, ordinary_count
        );
        Ok(dictionary)
    }

    /// Build a dictionary directly from word lists, useful for tests that
    /// don't want to touch the filesystem.
    pub fn from_words(special: Vec<&str>, ordinary: Vec<&str>, seed: u64) -> Dictionary {
        let mut rng = StdRng::seed_from_u64(seed);
        let special = special.into_iter().map(|s| s.to_string()).collect();
        let ordinary = ordinary.into_iter().map(|s| s.to_string()).collect();
        let mut dictionary = Dictionary::from_word_lists(special, ordinary, &mut rng);
        dictionary.build_index();
        dictionary
    }

    fn from_word_lists(special: Vec<String>, ordinary: Vec<String>, rng: &mut StdRng) -> Dictionary {
        let mut words: Vec<Word> = vec![];
        for text in special {
            let score = score_special(&text);
            words.push(Word::new(text, true, score));
        }
        for text in ordinary {
            let score = score_ordinary(&text, rng);
            words.push(Word::new(text, false, score));
        }
        // High to low, ties broken by the stochastic factor baked into
        // `score` at load time.
        words.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());

        let by_text = words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.text.clone(), i))
            .collect();

        Dictionary {
            words,
            by_text,
            letter_index: HashMap::new(),
            substring_cache: std::cell::RefCell::new(HashMap::new()),
            known_impossible: std::cell::RefCell::new(HashSet::new()),
        }
    }

    /// Populate the per-letter inverted index eagerly.
    fn build_index(&mut self) {
        for (id, word) in self.words.iter().enumerate() {
            for letter in word.text.chars() {
                self.letter_index.entry(letter).or_default().insert(id);
            }
        }
        debug!("built inverted index over {} letters", self.letter_index.len());
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn contains(&self, text: &str) -> bool {
        self.by_text.contains_key(&text.to_uppercase())
    }

    /// The score a loaded word was ranked by, or `0.0` for text that isn't
    /// in the dictionary (e.g. the one-letter seed placement).
    pub fn score_of(&self, text: &str) -> f64 {
        self.by_text
            .get(&text.to_uppercase())
            .map(|&id| self.words[id].score)
            .unwrap_or(0.0)
    }

    fn ids_for_letter(&self, letter: char) -> &HashSet<usize> {
        self.letter_index.get(&letter).unwrap_or(&EMPTY_ID_SET)
    }

    /// Words containing `substring` at least once, ranked by score
    /// descending, using the per-letter index intersection then a literal
    /// filter, with memoization and a negative cache for short misses.
    pub fn compatible(&self, substring: &str) -> Vec<&Word> {
        let substring = substring.to_uppercase();
        if substring.is_empty() {
            return vec![];
        }
        if self.known_impossible.borrow().contains(&substring) {
            return vec![];
        }
        if let Some(cached) = self.substring_cache.borrow().get(&substring) {
            return cached.iter().map(|&id| &self.words[id]).collect();
        }

        let mut chars = substring.chars();
        let first = chars.next().unwrap();
        let mut candidates: HashSet<usize> = self.ids_for_letter(first).clone();
        for c in chars {
            if candidates.is_empty() {
                break;
            }
            let letter_set = self.ids_for_letter(c);
            candidates.retain(|id| letter_set.contains(id));
        }

        let mut matches: Vec<usize> = candidates
            .into_iter()
            .filter(|&id| self.words[id].contains(&substring))
            .collect();
        matches.sort_by(|&a, &b| self.words[b].score.partial_cmp(&self.words[a].score).unwrap());

        if matches.is_empty() && substring.chars().count() < IMPOSSIBLE_CACHE_MAX_LEN {
            self.known_impossible.borrow_mut().insert(substring.clone());
        }
        self.substring_cache.borrow_mut().insert(substring.clone(), matches.clone());

        matches.into_iter().map(|id| &self.words[id]).collect()
    }

    /// Words containing the pattern `pre` followed by exactly `gap`
    /// wildcard letters followed by `post`.
    pub fn gap_fit(&self, pre: &str, post: &str, gap: usize) -> Vec<&Word> {
        let pre = pre.to_uppercase();
        let post = post.to_uppercase();
        if pre.is_empty() || post.is_empty() {
            return vec![];
        }
        let pre_ids = self.ids_for_letter(pre.chars().next().unwrap());
        let post_ids = self.ids_for_letter(post.chars().next().unwrap());
        let pattern = match build_gap_regex(&pre, &post, gap) {
            Some(re) => re,
            None => return vec![],
        };

        let mut matches: Vec<&Word> = pre_ids
            .intersection(post_ids)
            .map(|&id| &self.words[id])
            .filter(|w| pattern.is_match(&w.text))
            .collect();
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        matches
    }
}

fn build_gap_regex(pre: &str, post: &str, gap: usize) -> Option<Regex> {
    let pattern = format!("{}.{{{}}}{}", regex::escape(pre), gap, regex::escape(post));
    Regex::new(&pattern).ok()
}

fn clean_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(|line| {
            line.trim()
                .trim_matches(crate::grid::BLOCK_GLYPH)
                .trim()
                .to_uppercase()
        })
        .filter(|line| !line.is_empty() && line.chars().all(is_valid_letter))
        .collect()
}

fn score_special(text: &str) -> f64 {
    (text.chars().count() as f64).powi(3)
}

fn score_ordinary(text: &str, rng: &mut StdRng) -> f64 {
    let factor: f64 = rng.gen_range(0.0, 1.0);
    factor * text.chars().count() as f64
}

lazy_static::lazy_static! {
    /// Returned by `ids_for_letter` for a letter that was never indexed
    /// (e.g. punctuation never appears in any word), so callers don't
    /// have to special-case the lookup.
    static ref EMPTY_ID_SET: HashSet<usize> = HashSet::new();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compatible_ranks_by_score_descending() {
        let dict = Dictionary::from_words(vec![], vec!["CATS", "CAT", "SCAT"], 7);
        let hits = dict.compatible("CAT");
        let texts: Vec<&str> = hits.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts.len(), 3);
        for pair in hits.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn compatible_is_case_insensitive_and_memoized() {
        let dict = Dictionary::from_words(vec![], vec!["ORDER"], 1);
        assert_eq!(dict.compatible("ord").len(), 1);
        // second call should hit the cache path and return the same answer
        assert_eq!(dict.compatible("ORD").len(), 1);
    }

    #[test]
    fn short_misses_are_cached_as_impossible() {
        let dict = Dictionary::from_words(vec![], vec!["ORDER"], 1);
        assert!(dict.compatible("ZZZZ").is_empty());
        assert!(dict.known_impossible.borrow().contains("ZZZZ"));
    }

    #[test]
    fn gap_fit_matches_exact_wildcard_span() {
        let dict = Dictionary::from_words(vec![], vec!["CARGO", "CANOE", "CAT"], 2);
        let hits = dict.gap_fit("CA", "O", 2);
        let texts: Vec<&str> = hits.iter().map(|w| w.text.as_str()).collect();
        assert!(texts.contains(&"CARGO"));
        assert!(!texts.contains(&"CAT"));
    }

    #[test]
    fn special_words_score_independent_of_seed() {
        let dict = Dictionary::from_words(vec!["EUREKA"], vec![], 42);
        let word = dict.words().iter().find(|w| w.text == "EUREKA").unwrap();
        assert_eq!(word.score, 6f64.powi(3));
    }

    #[test]
    fn score_of_unknown_text_is_zero() {
        let dict = Dictionary::from_words(vec!["EUREKA"], vec!["CAT"], 3);
        assert_eq!(dict.score_of("EUREKA"), 6f64.powi(3));
        assert_eq!(dict.score_of("ZZZ"), 0.0);
    }
}
