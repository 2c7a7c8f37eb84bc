pub mod cache;
pub mod state;

use std::fmt;

/// Request key for one page of results for one term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub term: String,
    pub page: u32,
}

impl PageKey {
    pub fn new(term: impl Into<String>, page: u32) -> Self {
        Self {
            term: term.into(),
            page,
        }
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} p{}", self.term, self.page)
    }
}

/// Normalize a navigation term: trimmed, and empty means unset.
pub fn normalize_term(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}
