use thiserror::Error;

/// Errors surfaced by the crate. `Incompatible` and `Restart` (see
/// `crate::search`) never reach this type - they are scoped to the search
/// loop and handled internally.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum CrosswordError {
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("failed to read dictionary file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("dictionary contains no words after loading {special} special + {ordinary} ordinary entries")]
    Empty { special: usize, ordinary: usize },
}

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
