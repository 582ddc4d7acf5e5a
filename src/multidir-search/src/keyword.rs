//! Search keywords.

use std::fmt;

/// A trimmed, immutable search keyword.
///
/// The lower-cased form is computed once with Unicode case folding, which
/// does not depend on the process locale. An empty keyword matches every name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Keyword {
    text: String,
    folded: String,
}

impl Keyword {
    /// Creates a keyword, trimming surrounding whitespace.
    pub fn new(text: impl AsRef<str>) -> Self {
        let text = text.as_ref().trim().to_string();
        let folded = text.to_lowercase();
        Self { text, folded }
    }

    /// The keyword as typed, without surrounding whitespace.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The lower-cased keyword used for matching.
    pub fn folded(&self) -> &str {
        &self.folded
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

impl From<&str> for Keyword {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Keyword {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&String> for Keyword {
    fn from(text: &String) -> Self {
        Self::new(text)
    }
}

impl AsRef<str> for Keyword {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
