//! File name matching.
//!
//! Two modes are supported:
//! - `Substring` (default): the lower-cased name must contain the lower-cased
//!   keyword.
//! - `Pattern`: the keyword is a case-insensitive regular expression that may
//!   match anywhere in the name.
//!
//! A pattern that fails to compile never surfaces as an error from a search.
//! It is logged once and the matcher rejects every name.

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::error::{SearchError, SearchResult};
use crate::keyword::Keyword;

/// How keywords are compared against file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Case-insensitive substring test.
    #[default]
    Substring,

    /// Case-insensitive regular expression, unanchored.
    Pattern,
}

impl MatchMode {
    /// Returns a human-readable description of the mode.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Substring => "substring",
            Self::Pattern => "pattern",
        }
    }
}

/// Returns true when `name` contains `keyword`, ignoring case.
///
/// An empty keyword matches every name.
pub fn matches(name: &str, keyword: &str) -> bool {
    if keyword.is_empty() {
        return true;
    }
    name.to_lowercase().contains(&keyword.to_lowercase())
}

#[derive(Debug, Clone)]
enum Rule {
    Everything,
    Contains(String),
    Pattern(Regex),
    Nothing,
}

/// A keyword compiled for repeated matching against file names.
///
/// Cheap to share between walkers through an `Arc`.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    rule: Rule,
}

impl NameMatcher {
    /// Compiles a matcher, degrading an invalid pattern to "no match".
    pub fn new(keyword: &Keyword, mode: MatchMode) -> Self {
        match Self::try_new(keyword, mode) {
            Ok(matcher) => matcher,
            Err(err) => {
                tracing::warn!(keyword = %keyword, error = %err, "keyword matches nothing");
                Self {
                    rule: Rule::Nothing,
                }
            }
        }
    }

    /// Compiles a matcher, reporting an invalid pattern.
    pub fn try_new(keyword: &Keyword, mode: MatchMode) -> SearchResult<Self> {
        if keyword.is_empty() {
            return Ok(Self {
                rule: Rule::Everything,
            });
        }

        let rule = match mode {
            MatchMode::Substring => Rule::Contains(keyword.folded().to_string()),
            MatchMode::Pattern => {
                let regex = RegexBuilder::new(keyword.as_str())
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| SearchError::invalid_pattern(keyword.as_str(), e))?;
                Rule::Pattern(regex)
            }
        };

        Ok(Self { rule })
    }

    /// Checks a file name against the keyword.
    pub fn is_match(&self, name: &str) -> bool {
        match &self.rule {
            Rule::Everything => true,
            Rule::Contains(folded) => name.to_lowercase().contains(folded.as_str()),
            Rule::Pattern(regex) => regex.is_match(name),
            Rule::Nothing => false,
        }
    }
}
