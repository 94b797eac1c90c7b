//! Case-insensitive keyword matching over page text.

use regex::{Regex, RegexBuilder};

/// A compiled, case-insensitive keyword pattern.
///
/// Patterns are regular expressions and may use alternation, optional
/// groups, and non-ASCII literals such as `Desviación`.
#[derive(Debug, Clone)]
pub struct Keyword {
    regex: Regex,
}

impl Keyword {
    /// Compiles `pattern` for case-insensitive containment tests.
    ///
    /// # Errors
    ///
    /// Returns [`regex::Error`] if the pattern is invalid.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self { regex })
    }

    /// Returns `true` if the pattern occurs anywhere in `text`.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// The source pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

/// One-shot containment test of `pattern` against `text`, ignoring case.
///
/// # Errors
///
/// Returns [`regex::Error`] if the pattern is invalid.
pub fn matches(pattern: &str, text: &str) -> Result<bool, regex::Error> {
    Ok(Keyword::new(pattern)?.is_match(text))
}

/// Returns `true` if every keyword matches `text` (vacuously for none).
#[must_use]
pub fn all_match(keywords: &[Keyword], text: &str) -> bool {
    keywords.iter().all(|k| k.is_match(text))
}

/// Returns `true` if at least one keyword matches `text`.
#[must_use]
pub fn any_match(keywords: &[Keyword], text: &str) -> bool {
    keywords.iter().any(|k| k.is_match(text))
}
