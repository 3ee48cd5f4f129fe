use super::{Direction, Location, Position};

/// An immutable record of a word placed at a starting cell with an
/// orientation and terminator flags.
#[derive(Clone, Debug)]
pub struct Placement {
    pub word: String,
    pub position: Position,
    pub special: bool,
    pub pre: bool,
    pub post: bool,
}

impl Placement {
    pub fn new(word: &str, position: Position) -> Self {
        Placement {
            word: word.to_uppercase(),
            position,
            special: false,
            pre: false,
            post: false,
        }
    }

    pub fn with_special(mut self, special: bool) -> Self {
        self.special = special;
        self
    }

    pub fn with_pre(mut self, pre: bool) -> Self {
        self.pre = pre;
        self
    }

    pub fn with_post(mut self, post: bool) -> Self {
        self.post = post;
        self
    }

    pub fn len(&self) -> usize {
        self.word.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.word.is_empty()
    }

    pub fn orientation(&self) -> Direction {
        self.position.orientation
    }

    pub fn start(&self) -> Location {
        self.position.location()
    }

    pub fn end(&self) -> Location {
        self.position.offset(self.len() as isize - 1)
    }

    /// Rendered length counts the terminator blocks too.
    pub fn rendered_len(&self) -> usize {
        self.len() + self.pre as usize + self.post as usize
    }

    /// A "stub" can still grow or needs closing.
    pub fn is_stub(&self) -> bool {
        self.len() >= 2 && (!self.pre || !self.post)
    }

    /// Ordinary word equality: text only.
    pub fn same_text(&self, other: &Placement) -> bool {
        self.word == other.word
    }

    /// Position-sensitive equality used by side-effect bookkeeping: same
    /// text, same position, same orientation.
    pub fn same_text_and_position(&self, other: &Placement) -> bool {
        self.same_text(other) && self.position == other.position
    }

    /// Whether `other` is strictly contained by this (longer) placement at
    /// the same start position - used by the "dwarf" cleanup pass.
    pub fn contains_dwarf(&self, other: &Placement) -> bool {
        self.position == other.position
            && other.len() < self.len()
            && self.word.starts_with(&other.word)
    }

    pub fn occurrences(&self, letter: char) -> Vec<usize> {
        self.word
            .char_indices()
            .filter(|(_, c)| *c == letter)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Direction;

    fn pos(row: isize, col: isize, dir: Direction) -> Position {
        Position::new(row, col, dir)
    }

    #[test]
    fn rendered_len_includes_terminators() {
        let p = Placement::new("CAT", pos(0, 0, Direction::Horizontal))
            .with_pre(true)
            .with_post(true);
        assert_eq!(p.rendered_len(), 5);
    }

    #[test]
    fn single_letter_never_a_stub() {
        let p = Placement::new("A", pos(0, 0, Direction::Horizontal));
        assert!(!p.is_stub());
    }

    #[test]
    fn stub_requires_missing_terminator() {
        let open = Placement::new("AT", pos(0, 0, Direction::Horizontal));
        assert!(open.is_stub());
        let closed = open.clone().with_pre(true).with_post(true);
        assert!(!closed.is_stub());
    }

    #[test]
    fn text_only_equality_ignores_position() {
        let a = Placement::new("CAT", pos(0, 0, Direction::Horizontal));
        let b = Placement::new("CAT", pos(3, 3, Direction::Vertical));
        assert!(a.same_text(&b));
        assert!(!a.same_text_and_position(&b));
    }

    #[test]
    fn dwarf_must_share_start_and_be_prefix() {
        let long = Placement::new("CATALOG", pos(0, 0, Direction::Horizontal));
        let dwarf = Placement::new("CAT", pos(0, 0, Direction::Horizontal));
        let not_dwarf = Placement::new("CAT", pos(1, 0, Direction::Horizontal));
        assert!(long.contains_dwarf(&dwarf));
        assert!(!long.contains_dwarf(&not_dwarf));
    }
}
