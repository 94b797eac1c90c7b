//! Language profiles: the keyword triple used to spot the annex table.

use serde::Deserialize;

use crate::LocateError;
use crate::matcher::{Keyword, all_match, any_match};

/// Serialized form of a language profile, as written in TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileDefinition {
    /// Canonical language name as it appears in the metadata sheet.
    pub name: String,
    /// Other names that map to this profile (e.g. `"Français"`).
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Pattern a page must match to become a candidate.
    pub primary: String,
    /// Patterns that must all match on a candidate page (or the next one).
    #[serde(default)]
    pub secondary: Vec<String>,
    /// Patterns used to break ties between several candidates.
    #[serde(default)]
    pub tertiary: Vec<String>,
}

/// Parses a single profile definition from TOML.
///
/// # Errors
///
/// Returns [`LocateError::Toml`] if the document is malformed.
pub fn parse_profile_toml(name: &str, toml: &str) -> Result<ProfileDefinition, LocateError> {
    toml::from_str(toml).map_err(|source| LocateError::Toml {
        name: name.to_owned(),
        source,
    })
}

/// A compiled language profile.
#[derive(Debug, Clone)]
pub struct LanguageProfile {
    name: String,
    aliases: Vec<String>,
    primary: Keyword,
    secondary: Vec<Keyword>,
    tertiary: Vec<Keyword>,
}

impl LanguageProfile {
    /// Compiles every pattern of `definition`.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::Pattern`] naming the first invalid pattern.
    pub fn compile(definition: ProfileDefinition) -> Result<Self, LocateError> {
        let name = definition.name;
        let compile = |pattern: &String| {
            Keyword::new(pattern).map_err(|source| LocateError::Pattern {
                profile: name.clone(),
                pattern: pattern.clone(),
                source,
            })
        };

        let primary = compile(&definition.primary)?;
        let secondary = definition
            .secondary
            .iter()
            .map(compile)
            .collect::<Result<Vec<_>, _>>()?;
        let tertiary = definition
            .tertiary
            .iter()
            .map(compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name,
            aliases: definition.aliases,
            primary,
            secondary,
            tertiary,
        })
    }

    /// Builds a profile from pattern literals.
    ///
    /// # Errors
    ///
    /// Returns [`LocateError::Pattern`] if any pattern is invalid.
    pub fn from_patterns(
        name: &str,
        primary: &str,
        secondary: &[&str],
        tertiary: &[&str],
    ) -> Result<Self, LocateError> {
        let to_owned = |patterns: &[&str]| -> Vec<String> {
            patterns.iter().map(|&p| p.to_owned()).collect()
        };
        Self::compile(ProfileDefinition {
            name: name.to_owned(),
            aliases: Vec::new(),
            primary: primary.to_owned(),
            secondary: to_owned(secondary),
            tertiary: to_owned(tertiary),
        })
    }

    /// Canonical language name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alternative names for the language.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Whether any secondary patterns are configured.
    #[must_use]
    pub const fn has_secondary(&self) -> bool {
        !self.secondary.is_empty()
    }

    /// Whether any tertiary patterns are configured.
    #[must_use]
    pub const fn has_tertiary(&self) -> bool {
        !self.tertiary.is_empty()
    }

    /// Number of primary, secondary, and tertiary patterns.
    #[must_use]
    pub const fn pattern_counts(&self) -> (usize, usize, usize) {
        (1, self.secondary.len(), self.tertiary.len())
    }

    /// Tests the primary pattern.
    #[must_use]
    pub fn matches_primary(&self, text: &str) -> bool {
        self.primary.is_match(text)
    }

    /// Tests that every secondary pattern matches.
    #[must_use]
    pub fn matches_all_secondary(&self, text: &str) -> bool {
        all_match(&self.secondary, text)
    }

    /// Tests that at least one tertiary pattern matches.
    #[must_use]
    pub fn matches_any_tertiary(&self, text: &str) -> bool {
        any_match(&self.tertiary, text)
    }

    /// Tests that every secondary and every tertiary pattern matches.
    #[must_use]
    pub fn matches_all_secondary_and_tertiary(&self, text: &str) -> bool {
        all_match(&self.secondary, text) && all_match(&self.tertiary, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_compiles_toml() {
        let def = parse_profile_toml(
            "test",
            r#"
name = "English"
aliases = ["Anglais"]
primary = 'Calculation (?:.* )?pi'
secondary = ['budget', 'actual']
"#,
        )
        .unwrap();
        let profile = LanguageProfile::compile(def).unwrap();

        assert_eq!(profile.name(), "English");
        assert_eq!(profile.aliases(), ["Anglais"]);
        assert_eq!(profile.pattern_counts(), (1, 2, 0));
        assert!(!profile.has_tertiary());
        assert!(profile.matches_primary("calculation for PI-1"));
        assert!(profile.matches_all_secondary("Budget and Actual"));
        assert!(!profile.matches_any_tertiary("Budget and Actual"));
    }

    #[test]
    fn invalid_pattern_names_profile() {
        let err = LanguageProfile::from_patterns("Broken", "ok", &["(bad"], &[]).unwrap_err();
        match err {
            LocateError::Pattern {
                profile, pattern, ..
            } => {
                assert_eq!(profile, "Broken");
                assert_eq!(pattern, "(bad");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(matches!(
            parse_profile_toml("bad", "name = "),
            Err(LocateError::Toml { .. })
        ));
    }
}
