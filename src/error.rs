use std::fmt;

/// Status/error taxonomy for every fallible trie operation.
///
/// Mirrors the teacher's single hand-written error enum
/// (`PrefixStoreError`): "not found" is a normal outcome and lives here
/// alongside genuine failures rather than in a separate status type, so
/// callers match on one `Result` either way.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TrieError {
    /// The query target is absent. Not an error condition: distinguished
    /// from `Ok`-with-empty-result by callers that care about the
    /// difference (see `Trie::match_all`).
    NotFound,
    /// Malformed CIDR text, or a mask outside `0..=width` for the
    /// address family detected.
    InvalidInput,
    /// The arena refused the allocation (budget exhausted). Fatal for the
    /// call that triggered it; the trie is left in its prior, well-formed
    /// state.
    AllocFailed,
    /// A null/zero-length key (or other structurally invalid argument)
    /// was passed where the operation requires one.
    InvalidArg,
}

impl fmt::Display for TrieError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            TrieError::NotFound => write!(f, "Error: no matching key in the trie."),
            TrieError::InvalidInput => {
                write!(f, "Error: malformed CIDR text or out-of-range mask.")
            }
            TrieError::AllocFailed => {
                write!(f, "Error: the arena could not satisfy this allocation.")
            }
            TrieError::InvalidArg => {
                write!(f, "Error: invalid argument (null or zero-length key).")
            }
        }
    }
}

impl std::error::Error for TrieError {}

pub type TrieResult<T> = Result<T, TrieError>;
