//! Query vocabulary: statement keywords and the argument names they accept.
//!
//! Every word is accepted in lower camel case and with a capitalized first
//! letter (`orderBy` / `OrderBy`).

use serde::Serialize;

/// `true` if `name` is `word` or `word` with its first letter capitalized.
pub fn matches_word(name: &str, word: &str) -> bool {
    if name == word {
        return true;
    }
    let mut a = name.chars();
    let mut b = word.chars();
    match (a.next(), b.next()) {
        (Some(x), Some(y)) => x == y.to_ascii_uppercase() && a.as_str() == b.as_str(),
        _ => false,
    }
}

/// Statement keywords of a query block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Keyword {
    Select,
    Cursor,
    From,
    Where,
    OrderBy,
    /// `options` and `fetchOptions`
    FetchOptions,
}

impl Keyword {
    pub fn parse(name: &str) -> Option<Self> {
        let keyword = if matches_word(name, "select") {
            Keyword::Select
        } else if matches_word(name, "cursor") {
            Keyword::Cursor
        } else if matches_word(name, "from") {
            Keyword::From
        } else if matches_word(name, "where") {
            Keyword::Where
        } else if matches_word(name, "orderBy") {
            Keyword::OrderBy
        } else if matches_word(name, "options") || matches_word(name, "fetchOptions") {
            Keyword::FetchOptions
        } else {
            return None;
        };
        Some(keyword)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Select => "select",
            Keyword::Cursor => "cursor",
            Keyword::From => "from",
            Keyword::Where => "where",
            Keyword::OrderBy => "orderBy",
            Keyword::FetchOptions => "fetchOptions",
        }
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn is_keyword(name: &str) -> bool {
    Keyword::parse(name).is_some()
}

/// Names introducing the ancestor of a query: `childOf = key`, `parent(key)`.
pub const ANCESTOR_NAMES: &[&str] = &[
    "childOf",
    "ChildOf",
    "asChildOf",
    "asChildsOf",
    "parent",
    "ancestor",
    "childsOf",
    "ChildsOf",
];

pub fn is_ancestor_name(name: &str) -> bool {
    ANCESTOR_NAMES.contains(&name)
}

/// Fetch tuning arguments of `select`, `cursor` and `fetchOptions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FetchParam {
    Limit,
    Offset,
    ChunkSize,
    PrefetchSize,
    StartCursor,
    EndCursor,
}

impl FetchParam {
    const ALL: [FetchParam; 6] = [
        FetchParam::Limit,
        FetchParam::Offset,
        FetchParam::ChunkSize,
        FetchParam::PrefetchSize,
        FetchParam::StartCursor,
        FetchParam::EndCursor,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|param| matches_word(name, param.as_str()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FetchParam::Limit => "limit",
            FetchParam::Offset => "offset",
            FetchParam::ChunkSize => "chunkSize",
            FetchParam::PrefetchSize => "prefetchSize",
            FetchParam::StartCursor => "startCursor",
            FetchParam::EndCursor => "endCursor",
        }
    }
}

impl std::fmt::Display for FetchParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_aliases() {
        assert_eq!(Keyword::parse("orderBy"), Some(Keyword::OrderBy));
        assert_eq!(Keyword::parse("OrderBy"), Some(Keyword::OrderBy));
        assert_eq!(Keyword::parse("Options"), Some(Keyword::FetchOptions));
        assert_eq!(Keyword::parse("fetchOptions"), Some(Keyword::FetchOptions));
        assert_eq!(Keyword::parse("orderby"), None);
        assert_eq!(Keyword::parse("SELECT"), None);
    }

    #[test]
    fn test_fetch_params() {
        assert_eq!(FetchParam::parse("Limit"), Some(FetchParam::Limit));
        assert_eq!(FetchParam::parse("prefetchSize"), Some(FetchParam::PrefetchSize));
        assert_eq!(FetchParam::parse("deadline"), None);
    }

    #[test]
    fn test_ancestor_names() {
        assert!(is_ancestor_name("asChildsOf"));
        assert!(!is_ancestor_name("AsChildOf"));
    }
}
