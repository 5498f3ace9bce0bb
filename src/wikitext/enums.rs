//! Enums used by the wikitext module.
//!
//! `QueryType` picks how template titles and field keys are compared when
//! looking things up in a parsed page. It implements `Display` and `FromStr`
//! so the CLI can take it as a flag.

use std::fmt;
use std::str::FromStr;

/// Strategy used when searching for templates and fields.
///
/// Every strategy trims both sides and ignores case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryType {
    /// Exact (case-insensitive) match.
    #[default]
    Exact,
    /// Prefix match (case-insensitive).
    StartsWith,
    /// Substring match (case-insensitive).
    Contains,
}

impl QueryType {
    /// Does `candidate` match `query` under this strategy? An empty query
    /// never matches.
    pub fn matches(&self, candidate: &str, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return false;
        }
        let candidate = candidate.trim().to_lowercase();
        match self {
            QueryType::Exact => candidate == query,
            QueryType::StartsWith => candidate.starts_with(&query),
            QueryType::Contains => candidate.contains(&query),
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryType::Exact => write!(f, "Exact"),
            QueryType::StartsWith => write!(f, "StartsWith"),
            QueryType::Contains => write!(f, "Contains"),
        }
    }
}

impl FromStr for QueryType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" | "eq" | "e" => Ok(QueryType::Exact),
            "startswith" | "start" | "prefix" | "s" => Ok(QueryType::StartsWith),
            "contains" | "contain" | "substr" | "c" => Ok(QueryType::Contains),
            other => Err(format!("unknown QueryType '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn querytype_fromstr_and_display() {
        assert_eq!(QueryType::from_str("exact").unwrap(), QueryType::Exact);
        assert_eq!(
            QueryType::from_str("StartsWith").unwrap(),
            QueryType::StartsWith
        );
        assert_eq!(QueryType::from_str("c").unwrap(), QueryType::Contains);
        assert!(QueryType::from_str("fuzzy").is_err());
        assert_eq!(format!("{}", QueryType::Exact), "Exact");
    }

    #[test]
    fn matching_ignores_case_and_padding() {
        assert!(QueryType::Exact.matches(" Infobox Person ", "infobox person"));
        assert!(!QueryType::Exact.matches("Infobox person", "infobox"));
        assert!(QueryType::StartsWith.matches("Infobox person", "INFOBOX"));
        assert!(QueryType::Contains.matches("Infobox person", "box pe"));
        assert!(!QueryType::Contains.matches("Infobox", "  "));
    }
}
